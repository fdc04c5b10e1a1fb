use std::{io, result};

pub type ConsoleResult<T, E = ConsoleError> = result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// The request never got an answer (connect, timeout, body read).
    #[error("transport: {0}")]
    Transport(String),
    /// The backend answered with a non-success status.
    #[error("{}", .detail.as_deref().unwrap_or("request failed"))]
    Status { status: u16, detail: Option<String> },
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O: {0}")]
    Io(#[from] io::Error),
    #[error("config: {0}")]
    Config(String),
    #[error("{0} is required")]
    MissingField(String),
    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: String, value: String },
    #[error("{0} id:{1} not found")]
    NotFound(String, i64),
    #[error("not logged in")]
    Unauthenticated,
    #[error("request cancelled")]
    Cancelled,
    #[error("{0}")]
    Common(String),
}

impl ConsoleError {
    /// Message the backend attached to a failed request, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ConsoleError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ConsoleError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Form problems caught before anything is sent.
    pub fn is_form_error(&self) -> bool {
        matches!(
            self,
            ConsoleError::MissingField(_) | ConsoleError::InvalidNumber { .. }
        )
    }
}

impl From<toml::de::Error> for ConsoleError {
    fn from(e: toml::de::Error) -> Self {
        ConsoleError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_displays_detail() {
        let e = ConsoleError::Status {
            status: 400,
            detail: Some("Serial number already registered".to_owned()),
        };
        assert_eq!(e.to_string(), "Serial number already registered");
        assert_eq!(e.detail(), Some("Serial number already registered"));
        assert_eq!(e.status(), Some(400));

        let e = ConsoleError::Status {
            status: 502,
            detail: None,
        };
        assert_eq!(e.to_string(), "request failed");
        assert_eq!(e.detail(), None);
    }

    #[test]
    fn form_errors() {
        assert!(ConsoleError::MissingField("Name".to_owned()).is_form_error());
        assert!(!ConsoleError::Unauthenticated.is_form_error());
    }
}
