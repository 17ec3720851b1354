#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FifiError {
    Auth(String),
    Completion(String),
    Persistence(String),
    Config(String),
}

impl FifiError {
    pub fn auth(message: impl Into<String>) -> Self {
        let message = message.into();
        log::warn!("auth: {}", message);
        Self::Auth(message)
    }

    pub fn details(&self) -> &str {
        match self {
            Self::Auth(msg) | Self::Completion(msg) | Self::Persistence(msg) | Self::Config(msg) => {
                msg
            }
        }
    }
}

pub fn error<T, E: std::fmt::Display>(
    kind: fn(String) -> FifiError,
    prefix: &str,
    err: E,
) -> Result<T, FifiError> {
    log::error!("{}: {}", prefix, err);
    Err(kind(format!("{}: {}", prefix, err)))
}

impl std::fmt::Display for FifiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth(msg) => write!(f, "auth failure: {}", msg),
            Self::Completion(msg) => write!(f, "completion failure: {}", msg),
            Self::Persistence(msg) => write!(f, "persistence failure: {}", msg),
            Self::Config(msg) => write!(f, "config error: {}", msg),
        }
    }
}

impl std::error::Error for FifiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FifiError::auth("Invalid credentials.");
        assert_eq!(err.to_string(), "auth failure: Invalid credentials.");
        assert_eq!(err.details(), "Invalid credentials.");
    }

    #[test]
    fn test_error_helper_prefixes_message() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such table");
        let res: Result<(), FifiError> = error(FifiError::Persistence, "chats", io_err);

        assert_eq!(
            res.unwrap_err(),
            FifiError::Persistence("chats: no such table".into())
        );
    }
}
