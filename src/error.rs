use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl TrackerError {
    /// Classify the error for the UI: network/server trouble, a missing
    /// product, or input the server (or the client) refused.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::NotFound(_) => ErrorKind::NotFound,
            TrackerError::Validation(_) => ErrorKind::Validation,
            TrackerError::Http(_)
            | TrackerError::Status { .. }
            | TrackerError::Io(_)
            | TrackerError::Json(_) => ErrorKind::Transport,
        }
    }

    /// Map a non-success HTTP status and its `detail` text into the taxonomy.
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            404 => TrackerError::NotFound(detail),
            400 | 422 => TrackerError::Validation(detail),
            _ => TrackerError::Status { status, detail },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    NotFound,
    Validation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Validation => "validation",
        };
        f.write_str(s)
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
