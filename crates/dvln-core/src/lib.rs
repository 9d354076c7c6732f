//! Settings resolution and output control for dvln
//!
//! This crate provides the layer every dvln command consults before it does
//! any real work:
//!
//! - **Setting registry**: names, typed defaults, descriptions, user levels and scopes
//! - **Layered resolver**: Default < Environment < ConfigFile < ExplicitCLI
//! - **Output service**: screen and logfile destinations with level thresholds
//! - **Output controller**: derives thresholds and log recording from resolved settings
//! - **Response formatting**: text or JSON rendering driven by the `look` setting
//!
//! # Architecture
//!
//! ```text
//!                      dvln-cli
//!                          |
//!   +---------+------------+-------------+----------+
//!   |         |            |             |          |
//! settings  config_file  controller   response     api
//!   |                      |             |          |
//!   +----------------------+---- output -+----------+
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dvln_core::settings::{Settings, dvln_registry};
//! use std::collections::HashMap;
//!
//! let mut env = HashMap::new();
//! env.insert("DVLN_DEBUG".to_string(), "true".to_string());
//!
//! let settings = Settings::new(dvln_registry(), env);
//! assert!(settings.get_bool("debug"));
//! ```

pub mod api;
pub mod codes;
pub mod config_file;
pub mod controller;
pub mod error;
pub mod jobs;
pub mod output;
pub mod paths;
pub mod response;
pub mod settings;

pub use api::{ApiMsg, Data, JsonStyle, Response, ResponseStore};
pub use controller::{OutputController, OutputEnv};
pub use error::{Error, Result};
pub use output::{Destination, Level, Output, PrefixFlags};
pub use response::{Look, TextStyle, Verbosity};
pub use settings::{Layer, Registry, Resolved, Scope, Setting, Settings, UserLevel, Value, ValueKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_attached_to_user_facing_errors() {
        let error = Error::InvalidLook {
            value: "xml".to_string(),
        };

        assert_eq!(error.code(), codes::INVALID_LOOK);
        let display = format!("{}", error);
        assert!(
            display.contains("'xml'"),
            "Error display should contain the rejected value, got: {}",
            display
        );
    }
}
