//! Output levels

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Output level, lowest first
///
/// A destination writes a message when the message level is at or above the
/// destination threshold. `Discard` is only ever a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Verbose,
    Info,
    Note,
    Issue,
    Error,
    Fatal,
    Discard,
}

impl Level {
    /// Label written in front of a message, e.g. `Issue: ` or `Issue #2001: `
    ///
    /// Verbose and info messages carry no label.
    pub fn label(self, code: Option<i32>) -> Option<String> {
        let name = match self {
            Level::Trace => "Trace",
            Level::Debug => "Debug",
            Level::Note => "Note",
            Level::Issue => "Issue",
            Level::Error => "Error",
            Level::Fatal => "Fatal",
            Level::Verbose | Level::Info | Level::Discard => return None,
        };
        Some(match code {
            Some(code) => format!("{} #{}: ", name, code),
            None => format!("{}: ", name),
        })
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Verbose => "VERBOSE",
            Level::Info => "INFO",
            Level::Note => "NOTE",
            Level::Issue => "ISSUE",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Discard => "DISCARD",
        };
        f.write_str(name)
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "verbose" => Ok(Level::Verbose),
            "info" => Ok(Level::Info),
            "note" => Ok(Level::Note),
            "issue" => Ok(Level::Issue),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "discard" => Ok(Level::Discard),
            _ => Err(Error::InvalidLevel {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Verbose < Level::Info);
        assert!(Level::Issue < Level::Error);
        assert!(Level::Fatal < Level::Discard);
    }

    #[test]
    fn labels() {
        assert_eq!(Level::Issue.label(Some(2001)).as_deref(), Some("Issue #2001: "));
        assert_eq!(Level::Debug.label(None).as_deref(), Some("Debug: "));
        assert_eq!(Level::Info.label(Some(5)), None);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("Trace".parse::<Level>().unwrap(), Level::Trace);
        assert!("loud".parse::<Level>().is_err());
    }
}
