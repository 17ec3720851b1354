use anyhow::{Result, bail};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ViewMode {
    Anonymous,
    LoginPrompt,
    LoginForm,
    SignupForm,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    RequestSignIn,
    ChooseLogin,
    ChooseSignup,
    Dismiss,
    /// account created, the user still has to log in
    SignedUp,
    LoggedIn(String),
    LogOut,
}

/// Which prompt or form a channel is showing. Only explicit actions move it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    mode: ViewMode,
    user_id: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: ViewMode::Anonymous,
            user_id: None,
        }
    }
}

impl ViewState {
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn apply(&mut self, action: ViewAction) -> Result<ViewMode> {
        use ViewAction::*;
        use ViewMode::*;

        let next = match (self.mode, action) {
            (Anonymous, RequestSignIn) => LoginPrompt,
            (LoginPrompt | SignupForm, ChooseLogin) => LoginForm,
            (LoginPrompt | LoginForm, ChooseSignup) => SignupForm,
            (LoginPrompt | LoginForm | SignupForm, Dismiss) => Anonymous,
            (SignupForm, SignedUp) => LoginForm,
            (LoginForm, LoggedIn(user_id)) => {
                self.user_id = Some(user_id);
                Authenticated
            }
            (Authenticated, LogOut) => {
                self.user_id = None;
                Anonymous
            }
            (mode, action) => bail!("cannot {:?} while {}", action, mode),
        };

        log::debug!("view {} -> {}", self.mode, next);
        self.mode = next;

        Ok(next)
    }
}
