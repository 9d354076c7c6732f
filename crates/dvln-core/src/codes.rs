//! Numeric diagnostic codes attached to user-facing messages
//!
//! Codes show up in text output as `Issue #2004: ...` and in JSON output as
//! the `code` field of an error, warning or note.

/// Note carrying the location of the temp output logfile
pub const TEMP_LOGFILE_NOTE: i32 = 101;

/// Generic code for messages raised without a more specific one
pub const DEFAULT_ERROR: i32 = 100;

/// Command line could not be processed (unknown flag, bad value, ...)
pub const COMMAND_LINE: i32 = 2000;

/// The root command was run without a subcommand
pub const NO_SUBCOMMAND: i32 = 2001;

/// The user config file exists but could not be read
pub const CONFIG_READ: i32 = 2002;

/// `--jobs` is neither a number nor `all`
pub const INVALID_JOBS: i32 = 2003;

/// `--look` is neither `text` nor `json`
pub const INVALID_LOOK: i32 = 2004;

/// `--globs` is neither `env` nor `cfg`
pub const INVALID_GLOBS: i32 = 2005;

/// `--serve` was requested
pub const SERVE_UNAVAILABLE: i32 = 2008;

/// The `--record` logfile could not be opened
pub const LOGFILE_OPEN: i32 = 2009;

/// A setting was looked up by name without being registered
pub const SETTING_NOT_FOUND: i32 = 2010;

/// `dvln get` was run without a codebase
pub const MISSING_CODEBASE: i32 = 3001;

/// Process exit value for validation failures and failed dispatch
pub const ERROR_EXIT: i32 = 1;
