use anyhow::Result;
use inquire::{Confirm, CustomType, InquireError, Password, PasswordDisplayMode, Select, Text};

use crate::{
    agent::{Completion, FifiAgents, session::ChatSession},
    augment::topics::SUGGESTED_QUESTIONS,
    channels::{
        FifiChannel,
        view::{ViewAction, ViewMode, ViewState},
    },
    database::users::Accounts,
    error::FifiError,
};

const HELP: &str = r"
commands:
  /signin           log in or create an account to keep your chats
  /logout           sign out, the conversation starts over
  /profile          show your profile and reminders
  /info             save pregnancy weeks and baby age
  /remind <text>    add a reminder
  /suggest          suggested questions
  /history          print the conversation so far
  /help             this message
  /quit             leave
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    SignIn,
    LogOut,
    Profile,
    Info,
    Remind(String),
    Suggest,
    History,
    Help,
    Quit,
    Unknown(String),
}

impl TerminalCommand {
    /// `None` when the input is a chat message rather than a command
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let rest = input.strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "signin" | "login" => Self::SignIn,
            "logout" => Self::LogOut,
            "profile" => Self::Profile,
            "info" => Self::Info,
            "remind" => Self::Remind(arg.to_string()),
            "suggest" => Self::Suggest,
            "history" => Self::History,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        };

        Some(command)
    }
}

fn is_cancel(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

pub struct TerminalChannel<C: Completion> {
    agents: FifiAgents<C>,
    accounts: Accounts,
    view: ViewState,
}

impl<C: Completion> TerminalChannel<C> {
    pub fn new(agents: FifiAgents<C>, accounts: Accounts) -> Self {
        Self {
            agents,
            accounts,
            view: ViewState::default(),
        }
    }

    /// Runs a command, reporting store and auth failures inline so the chat
    /// carries on. Returns false when the user asked to leave.
    async fn dispatch(&mut self, command: TerminalCommand, session: &mut ChatSession) -> Result<bool> {
        match self.command(command, session).await {
            Ok(keep_going) => Ok(keep_going),
            Err(err) => {
                self.recover(err)?;
                Ok(true)
            }
        }
    }

    fn recover(&mut self, err: anyhow::Error) -> Result<()> {
        if let Some(inquire_err) = err.downcast_ref::<InquireError>() {
            if !is_cancel(inquire_err) {
                return Err(err);
            }
        } else if let Some(fifi_err) = err.downcast_ref::<FifiError>() {
            log::error!("{}", fifi_err);
            println!("Something went wrong ({fifi_err}), please try again later.");
        } else {
            return Err(err);
        }

        // an interrupted sign-in goes back to the anonymous chat
        if self.view.mode() != ViewMode::Authenticated {
            self.view = ViewState::default();
        }

        Ok(())
    }

    async fn command(&mut self, command: TerminalCommand, session: &mut ChatSession) -> Result<bool> {
        match command {
            TerminalCommand::SignIn => {
                if self.view.mode() == ViewMode::Authenticated {
                    println!("You are already signed in.");
                } else {
                    self.sign_in(session).await?;
                }
            }
            TerminalCommand::LogOut => match self.view.apply(ViewAction::LogOut) {
                Ok(_) => {
                    self.agents.detach_user(session);
                    println!("Signed out.");
                }
                Err(_) => println!("You are not signed in."),
            },
            TerminalCommand::Profile => {
                if let Some(user_id) = self.signed_in_user() {
                    let profile = self.accounts.profile(&user_id).await?;
                    println!("{}", profile.email);
                    print_banners(&profile.banners());
                }
            }
            TerminalCommand::Info => {
                if let Some(user_id) = self.signed_in_user() {
                    let current = self.accounts.profile(&user_id).await?;
                    let weeks = CustomType::<u32>::new("Weeks pregnant:")
                        .with_help_message("esc keeps the saved value")
                        .prompt_skippable()?;
                    let months = CustomType::<u32>::new("Baby age in months:")
                        .with_help_message("esc keeps the saved value")
                        .prompt_skippable()?;

                    let profile = self
                        .accounts
                        .save_info(
                            &user_id,
                            weeks.or(current.pregnancy_weeks),
                            months.or(current.baby_age_months),
                        )
                        .await?;
                    println!("Info saved.");
                    print_banners(&profile.banners());
                }
            }
            TerminalCommand::Remind(reminder) => {
                if let Some(user_id) = self.signed_in_user() {
                    match self.accounts.add_reminder(&user_id, &reminder).await {
                        Ok(_) => println!("Reminder added."),
                        Err(FifiError::Auth(msg)) => println!("{msg}"),
                        Err(err) => return Err(err.into()),
                    }
                }
            }
            TerminalCommand::Suggest => {
                for group in SUGGESTED_QUESTIONS {
                    println!("\n{}", group.category);
                    for question in group.questions {
                        println!("  - {question}");
                    }
                }
            }
            TerminalCommand::History => {
                for message in session.conversation().visible() {
                    println!("\n{}: {}", message.role, message.content);
                }
            }
            TerminalCommand::Help => println!("{HELP}"),
            TerminalCommand::Quit => return Ok(false),
            TerminalCommand::Unknown(name) => println!("unknown command /{name}, try /help"),
        }

        Ok(true)
    }

    fn signed_in_user(&self) -> Option<String> {
        let user_id = self.view.user_id().map(str::to_string);
        if user_id.is_none() {
            println!("Sign in first with /signin.");
        }

        user_id
    }

    fn credentials() -> Result<(String, String)> {
        let email = Text::new("Email:").prompt()?;
        let password = Password::new("Password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?;

        Ok((email, password))
    }

    fn retry_or_dismiss(&mut self, message: &str) -> Result<()> {
        println!("{message}");
        if !Confirm::new("Try again?").with_default(true).prompt()? {
            self.view.apply(ViewAction::Dismiss)?;
        }

        Ok(())
    }

    async fn sign_in(&mut self, session: &mut ChatSession) -> Result<()> {
        self.view.apply(ViewAction::RequestSignIn)?;

        loop {
            match self.view.mode() {
                ViewMode::LoginPrompt => {
                    let options = vec!["Log in", "Sign up", "Not now"];
                    let action = match Select::new("Sign in to keep your chats:", options).prompt()? {
                        "Log in" => ViewAction::ChooseLogin,
                        "Sign up" => ViewAction::ChooseSignup,
                        _ => ViewAction::Dismiss,
                    };
                    self.view.apply(action)?;
                }
                ViewMode::LoginForm => {
                    let (email, password) = Self::credentials()?;
                    match self.accounts.login(&email, &password).await {
                        Ok(user_id) => {
                            self.agents.attach_user(session, user_id.clone()).await;
                            self.view.apply(ViewAction::LoggedIn(user_id.clone()))?;

                            println!("Logged in successfully!");
                            print_banners(&self.accounts.profile(&user_id).await?.banners());
                        }
                        Err(FifiError::Auth(msg)) => self.retry_or_dismiss(&msg)?,
                        Err(err) => return Err(err.into()),
                    }
                }
                ViewMode::SignupForm => {
                    let (email, password) = Self::credentials()?;
                    match self.accounts.sign_up(&email, &password).await {
                        Ok(_) => {
                            println!("Account created! Please log in.");
                            self.view.apply(ViewAction::SignedUp)?;
                        }
                        Err(FifiError::Auth(msg)) => self.retry_or_dismiss(&msg)?,
                        Err(err) => return Err(err.into()),
                    }
                }
                ViewMode::Anonymous | ViewMode::Authenticated => return Ok(()),
            }
        }
    }
}

fn print_banners(banners: &[String]) {
    for banner in banners {
        println!("{banner}");
    }
}

impl<C: Completion> FifiChannel for TerminalChannel<C> {
    async fn run(&mut self) -> Result<()> {
        println!("FIFI\nCall me mommy! 🤰\n/help for commands");

        let mut session = self.agents.open_session(None).await;
        loop {
            let input = match Text::new("you:").prompt() {
                Ok(input) => input,
                Err(err) if is_cancel(&err) => break,
                Err(err) => return Err(err.into()),
            };

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            if let Some(command) = TerminalCommand::parse(input) {
                if !self.dispatch(command, &mut session).await? {
                    break;
                }
                continue;
            }

            let reply = self.agents.handle_turn(&mut session, input).await;
            println!("\nfifi: {reply}\n");
        }

        Ok(())
    }
}
