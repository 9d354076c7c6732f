//! [`TestHome`] builder for dvln test scenarios.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary home directory with a `.dvlncfg` config dir and helpers to
/// build the environment snapshot a run sees.
///
/// # Example
///
/// ```rust,no_run
/// use dvln_test_utils::TestHome;
///
/// let home = TestHome::new();
/// home.write_config("toml", "look = \"json\"\n");
/// let env = home.env(&[("DVLN_DEBUG", "true")]);
/// assert_eq!(env["HOME"], home.root().display().to_string());
/// ```
pub struct TestHome {
    temp_dir: TempDir,
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHome {
    /// Create an empty home directory with no config.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the fake home directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The default config directory, `~/.dvlncfg`.
    pub fn config_dir(&self) -> PathBuf {
        self.root().join(".dvlncfg")
    }

    /// Write `~/.dvlncfg/cfg.<extension>` and return its path.
    pub fn write_config(&self, extension: &str, content: &str) -> PathBuf {
        let dir = self.config_dir();
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("cfg.{}", extension));
        fs::write(&path, content).unwrap();
        path
    }

    /// Environment snapshot with `HOME` pointing here, no `USER`, plus the
    /// given extra variables.
    pub fn env(&self, extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("HOME".to_string(), self.root().display().to_string());
        for (key, value) in extra {
            env.insert(key.to_string(), value.to_string());
        }
        env
    }
}
