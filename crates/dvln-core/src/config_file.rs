//! User config file discovery and loading
//!
//! The `config` setting names either a directory, which is searched for
//! `cfg.json`, `cfg.toml`, `cfg.yaml` or `cfg.yml` (first match wins), or a
//! file that is loaded directly. The format comes from the extension.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value as JsonValue};

use crate::paths::expand_home;
use crate::settings::Settings;
use crate::{Error, Result};

/// Base name of the config file inside a config directory
pub const CONFIG_BASE_NAME: &str = "cfg";

/// Extensions searched for, in order
pub const CONFIG_EXTENSIONS: &[&str] = &["json", "toml", "yaml", "yml"];

/// Parse a config file into its top-level key/value table
pub fn load(path: &Path) -> Result<Map<String, JsonValue>> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let parse_error = |format: &str, message: String| Error::ConfigRead {
        path: path.to_path_buf(),
        message: format!("invalid {}: {}", format, message),
    };

    let value: JsonValue = match extension.as_str() {
        "toml" => toml::from_str(&content).map_err(|e| parse_error("TOML", e.to_string()))?,
        "json" => serde_json::from_str(&content).map_err(|e| parse_error("JSON", e.to_string()))?,
        "yaml" | "yml" => {
            serde_yaml::from_str(&content).map_err(|e| parse_error("YAML", e.to_string()))?
        }
        _ => return Err(Error::UnsupportedFormat { extension }),
    };

    match value {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(Map::new()),
        _ => Err(Error::ConfigRead {
            path: path.to_path_buf(),
            message: "top level must be a table of settings".to_string(),
        }),
    }
}

/// Locate the config file for a `config` value
///
/// Returns the directory the config lives in and the file, if one exists.
pub fn locate(config: &Path) -> (Option<PathBuf>, Option<PathBuf>) {
    if config.is_dir() {
        let file = CONFIG_EXTENSIONS
            .iter()
            .map(|ext| config.join(format!("{}.{}", CONFIG_BASE_NAME, ext)))
            .find(|candidate| candidate.is_file());
        (Some(config.to_path_buf()), file)
    } else if config.is_file() {
        let dir = config.parent().map(Path::to_path_buf);
        (dir, Some(config.to_path_buf()))
    } else {
        (None, None)
    }
}

/// Find and load the user config named by the `config` setting
///
/// A missing directory or file is not an error. On success the config file
/// layer of `settings` is populated and `configdir` is set.
pub fn scan_user_config(settings: &mut Settings) -> Result<Option<PathBuf>> {
    let home = settings.home_dir();
    let config = expand_home(&settings.get_string("config"), home.as_deref());

    let (dir, file) = locate(&config);
    if let Some(dir) = dir {
        settings.set("configdir", dir.display().to_string());
    }

    let Some(file) = file else {
        tracing::debug!(path = %config.display(), "No user config file found");
        return Ok(None);
    };

    tracing::debug!(path = %file.display(), "Loading user config file");
    let table = load(&file)?;
    settings.load_config(&file, table);
    Ok(Some(file))
}
