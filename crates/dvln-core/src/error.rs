//! Error types for dvln-core

use std::path::PathBuf;

use crate::codes;

/// Result type for dvln-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving settings and preparing output
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Setting was never registered
    #[error("Setting not found: {name}")]
    SettingNotFound { name: String },

    /// Command line could not be processed
    #[error("{message}")]
    CommandLine { message: String },

    /// Root command ran without a subcommand
    #[error("Please use a valid subcommand (for a list: 'dvln help')")]
    NoSubcommand,

    /// User config file exists but could not be parsed
    #[error("Configuration package failed to read config {path}: {message}")]
    ConfigRead { path: PathBuf, message: String },

    /// Config file extension is not one we know how to parse
    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    /// `jobs` is neither a number nor `all`
    #[error("Jobs value should be a number or 'all', found: {value}")]
    InvalidJobs { value: String },

    /// `look` is neither `text` nor `json`
    #[error("The --look option (-L) can only be set to 'text' or 'json', found: '{value}'")]
    InvalidLook { value: String },

    /// `globs` is neither `env` nor `cfg`
    #[error("The --globs option (-G) can only be set to 'env' or 'cfg', found: '{value}'")]
    InvalidGlobs { value: String },

    /// Output level name is not one we know
    #[error("Unknown output level: {value}")]
    InvalidLevel { value: String },

    /// `serve` was requested
    #[error("Serve mode is not available yet")]
    ServeUnavailable,

    /// The `record` logfile could not be opened
    #[error("Unable to open output logfile {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another error with a usage hint for the active command appended
    #[error("{source}\n{usage}")]
    Usage {
        #[source]
        source: Box<Error>,
        usage: String,
    },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a command line error from parser output
    pub fn command_line(message: impl Into<String>) -> Self {
        Self::CommandLine {
            message: message.into(),
        }
    }

    /// Append a usage hint such as `Please run 'dvln help get' for usage`
    pub fn with_usage(self, usage: impl Into<String>) -> Self {
        Self::Usage {
            source: Box::new(self),
            usage: usage.into(),
        }
    }

    /// Numeric diagnostic code shown next to the message
    pub fn code(&self) -> i32 {
        match self {
            Error::SettingNotFound { .. } => codes::SETTING_NOT_FOUND,
            Error::CommandLine { .. } => codes::COMMAND_LINE,
            Error::NoSubcommand => codes::NO_SUBCOMMAND,
            Error::ConfigRead { .. } | Error::UnsupportedFormat { .. } => codes::CONFIG_READ,
            Error::InvalidJobs { .. } => codes::INVALID_JOBS,
            Error::InvalidLook { .. } => codes::INVALID_LOOK,
            Error::InvalidGlobs { .. } => codes::INVALID_GLOBS,
            Error::InvalidLevel { .. } => codes::DEFAULT_ERROR,
            Error::ServeUnavailable => codes::SERVE_UNAVAILABLE,
            Error::LogFile { .. } => codes::LOGFILE_OPEN,
            Error::Usage { source, .. } => source.code(),
            Error::Io(_) | Error::Json(_) => codes::DEFAULT_ERROR,
        }
    }

    /// Fatal conditions are reported at the fatal level, everything else
    /// is reported as an issue
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::ConfigRead { .. }
            | Error::UnsupportedFormat { .. }
            | Error::ServeUnavailable
            | Error::LogFile { .. }
            | Error::Io(_)
            | Error::Json(_) => true,
            Error::Usage { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_hint_keeps_inner_code() {
        let error = Error::InvalidGlobs {
            value: "bogus".to_string(),
        }
        .with_usage("Please run 'dvln help' for usage");

        assert_eq!(error.code(), codes::INVALID_GLOBS);
        assert!(!error.is_fatal());
        assert_eq!(
            error.to_string(),
            "The --globs option (-G) can only be set to 'env' or 'cfg', found: 'bogus'\n\
             Please run 'dvln help' for usage"
        );
    }

    #[test]
    fn config_read_is_fatal() {
        let error = Error::ConfigRead {
            path: PathBuf::from("/home/user/.dvlncfg/cfg.toml"),
            message: "expected `=`".to_string(),
        };

        assert!(error.is_fatal());
        assert_eq!(error.code(), codes::CONFIG_READ);
        assert!(error.to_string().contains("cfg.toml"));
    }
}
