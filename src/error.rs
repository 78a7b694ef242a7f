use thiserror::Error;

/// Errors that end an httping run.
#[derive(Error, Debug)]
pub enum HttpingError {
    #[error("{0}")]
    InvalidUrl(String),

    #[error("Host {host} not found: {reason}")]
    HostNotFound { host: String, reason: String },

    #[error("Failed to set up DNS resolver: {0}")]
    Resolver(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Aborted at seq={seq}: {reason}")]
    Aborted { seq: u64, reason: String },
}

impl HttpingError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            HttpingError::InvalidUrl(_) => 2,
            HttpingError::HostNotFound { .. }
            | HttpingError::Resolver(_)
            | HttpingError::Client(_)
            | HttpingError::Aborted { .. } => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, HttpingError>;
