//! Error types for dvln-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from dvln-core
    #[error(transparent)]
    Core(#[from] dvln_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Diagnostic code reported with the message
    pub fn code(&self) -> i32 {
        match self {
            CliError::Core(e) => e.code(),
            CliError::Io(_) => dvln_core::codes::DEFAULT_ERROR,
            CliError::User { .. } => dvln_core::codes::COMMAND_LINE,
        }
    }

    /// Whether the error is reported at the fatal level
    pub fn is_fatal(&self) -> bool {
        match self {
            CliError::Core(e) => e.is_fatal(),
            CliError::Io(_) => true,
            CliError::User { .. } => false,
        }
    }
}
