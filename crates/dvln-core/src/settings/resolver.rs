//! Layered setting resolution
//!
//! The effective value of a setting is the highest layer that supplies a
//! usable value:
//! 1. Default (from the registry)
//! 2. Environment (`DVLN_<NAME>`)
//! 3. Config file (case-insensitive top-level key)
//! 4. Explicit (flags given on the command line, or [`Settings::set`])
//!
//! Nothing is cached, every lookup walks the layers again so values set
//! between parse passes are always seen.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::registry::{Registry, Scope, Setting, UserLevel};
use super::value::{Value, ValueKind};
use crate::Result;

/// Environment variable prefix for settings
pub const ENV_PREFIX: &str = "DVLN_";

/// Source layer of a resolved value, lowest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Default,
    Environment,
    ConfigFile,
    Cli,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::Default => "default",
            Layer::Environment => "env",
            Layer::ConfigFile => "config",
            Layer::Cli => "cli",
        };
        f.write_str(name)
    }
}

/// A value together with the layer that supplied it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: Value,
    pub layer: Layer,
}

/// The per-run settings view
#[derive(Debug, Clone)]
pub struct Settings {
    registry: Registry,
    env: HashMap<String, String>,
    config: HashMap<String, serde_json::Value>,
    explicit: HashMap<String, Value>,
    config_file: Option<PathBuf>,
}

impl Settings {
    /// Create a settings view over a registry and an environment snapshot
    pub fn new(registry: Registry, env: HashMap<String, String>) -> Self {
        Self {
            registry,
            env,
            config: HashMap::new(),
            explicit: HashMap::new(),
            config_file: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register (or redefine) a setting
    pub fn register(
        &mut self,
        name: &str,
        default: impl Into<Value>,
        description: &str,
        level: UserLevel,
        scope: Scope,
    ) -> Option<Setting> {
        self.registry.register(name, default, description, level, scope)
    }

    pub fn describe(&self, name: &str) -> Result<(&str, UserLevel, Scope)> {
        self.registry.describe(name)
    }

    /// Environment variable name for a setting, e.g. `DVLN_DEBUG`
    pub fn env_key(name: &str) -> String {
        format!("{}{}", ENV_PREFIX, name.to_uppercase())
    }

    /// Raw variable from the environment snapshot
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Home directory as seen by this run
    pub fn home_dir(&self) -> Option<PathBuf> {
        crate::paths::home_dir(&self.env)
    }

    /// Resolve a setting to its value and source layer
    ///
    /// Returns `None` for names that were never registered.
    pub fn resolve(&self, name: &str) -> Option<Resolved> {
        let setting = self.registry.get(name)?;
        let key = name.to_lowercase();
        let kind = setting.default.kind();

        if setting.scope.allows(Layer::Cli) {
            if let Some(value) = self.explicit.get(&key) {
                match value.clone().coerce(kind) {
                    Some(value) => {
                        return Some(Resolved {
                            value,
                            layer: Layer::Cli,
                        });
                    }
                    None => {
                        tracing::warn!(setting = %key, value = %value, "Ignoring explicit value of wrong type")
                    }
                }
            }
        }

        if setting.scope.allows(Layer::ConfigFile) {
            if let Some(raw) = self.config.get(&key) {
                match Value::from_json(kind, raw) {
                    Some(value) => {
                        return Some(Resolved {
                            value,
                            layer: Layer::ConfigFile,
                        });
                    }
                    None => {
                        tracing::warn!(setting = %key, value = %raw, "Ignoring config file value that does not convert")
                    }
                }
            }
        }

        if setting.scope.allows(Layer::Environment) {
            let env_key = Self::env_key(&key);
            if let Some(raw) = self.env.get(&env_key) {
                match Value::parse_as(kind, raw) {
                    Some(value) => {
                        return Some(Resolved {
                            value,
                            layer: Layer::Environment,
                        });
                    }
                    None => {
                        tracing::warn!(variable = %env_key, value = %raw, "Ignoring environment value that does not convert")
                    }
                }
            }
        }

        Some(Resolved {
            value: setting.default.clone(),
            layer: Layer::Default,
        })
    }

    /// Effective value, or an empty string for unregistered names
    pub fn get(&self, name: &str) -> Value {
        self.resolve(name)
            .map(|r| r.value)
            .unwrap_or_else(|| Value::zero(ValueKind::Str))
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.resolve(name)
            .and_then(|r| r.value.coerce(ValueKind::Bool))
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn get_int(&self, name: &str) -> i64 {
        self.resolve(name)
            .and_then(|r| r.value.coerce(ValueKind::Int))
            .and_then(|v| v.as_int())
            .unwrap_or(0)
    }

    pub fn get_string(&self, name: &str) -> String {
        self.resolve(name)
            .map(|r| r.value.to_string())
            .unwrap_or_default()
    }

    /// Write the explicit layer
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.explicit.insert(name.to_lowercase(), value.into());
    }

    /// Whether a value was written to the explicit layer
    pub fn is_explicit(&self, name: &str) -> bool {
        self.explicit.contains_key(&name.to_lowercase())
    }

    /// Install the config file layer
    ///
    /// Keys are matched case-insensitively against setting names.
    pub fn load_config(
        &mut self,
        path: &Path,
        values: impl IntoIterator<Item = (String, serde_json::Value)>,
    ) {
        self.config = values
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        self.config_file = Some(path.to_path_buf());
    }

    /// Path of the config file that populated the config layer
    pub fn config_file_used(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Every registered setting with its resolved value, in name order
    pub fn entries(&self) -> Vec<(&Setting, Resolved)> {
        self.registry
            .iter()
            .filter_map(|s| self.resolve(&s.name).map(|r| (s, r)))
            .collect()
    }

    /// One line per setting: `name = value (layer)`
    pub fn dump(&self) -> String {
        self.entries()
            .into_iter()
            .map(|(s, r)| format!("{} = {:?} ({})\n", s.name.to_lowercase(), r.value.to_string(), r.layer))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register("debug", false, "debug output", UserLevel::Standard, Scope::CliGlobal);
        registry.register("jobs", "all", "parallel jobs", UserLevel::Expert, Scope::CliGlobal);
        registry.register("port", 3856i64, "serve port", UserLevel::Expert, Scope::CliGlobal);
        registry.register("pkg", "", "packages", UserLevel::Novice, Scope::CliOnlyGlobal);
        registry.register("apiver", "0.1", "api version", UserLevel::Internal, Scope::ConstGlobal);
        registry.register("screenlevel", "info", "screen level", UserLevel::Expert, Scope::BasicGlobal);
        registry
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_when_nothing_else() {
        let settings = Settings::new(registry(), HashMap::new());
        let resolved = settings.resolve("jobs").unwrap();
        assert_eq!(resolved.value, Value::from("all"));
        assert_eq!(resolved.layer, Layer::Default);
    }

    #[test]
    fn unregistered_lookups_return_zero_values() {
        let settings = Settings::new(registry(), HashMap::new());
        assert!(settings.resolve("nosuch").is_none());
        assert!(!settings.get_bool("nosuch"));
        assert_eq!(settings.get_int("nosuch"), 0);
        assert_eq!(settings.get_string("nosuch"), "");
    }

    #[test]
    fn env_value_is_typed() {
        let settings = Settings::new(registry(), env(&[("DVLN_DEBUG", "yes"), ("DVLN_PORT", "8080")]));
        assert!(settings.get_bool("debug"));
        assert_eq!(settings.get_int("port"), 8080);
        assert_eq!(settings.resolve("port").unwrap().layer, Layer::Environment);
    }

    #[test]
    fn unconvertible_env_value_falls_through() {
        let settings = Settings::new(registry(), env(&[("DVLN_PORT", "eighty")]));
        let resolved = settings.resolve("port").unwrap();
        assert_eq!(resolved.value, Value::Int(3856));
        assert_eq!(resolved.layer, Layer::Default);
    }

    #[test]
    fn config_file_keys_are_case_insensitive() {
        let mut settings = Settings::new(registry(), env(&[("DVLN_JOBS", "2")]));
        settings.load_config(
            Path::new("/tmp/cfg.json"),
            vec![("Jobs".to_string(), serde_json::json!(6))],
        );
        assert_eq!(settings.get_string("jobs"), "6");
        assert_eq!(settings.config_file_used(), Some(Path::new("/tmp/cfg.json")));
    }

    #[test]
    fn cli_only_ignores_env_and_file() {
        let mut settings = Settings::new(registry(), env(&[("DVLN_PKG", "from-env")]));
        settings.load_config(
            Path::new("cfg.toml"),
            vec![("pkg".to_string(), serde_json::json!("from-file"))],
        );
        assert_eq!(settings.get_string("pkg"), "");

        settings.set("pkg", "from-cli");
        assert_eq!(settings.get_string("pkg"), "from-cli");
    }

    #[test]
    fn const_ignores_every_override() {
        let mut settings = Settings::new(registry(), env(&[("DVLN_APIVER", "9.9")]));
        settings.load_config(
            Path::new("cfg.toml"),
            vec![("apiver".to_string(), serde_json::json!("8.8"))],
        );
        settings.set("apiver", "7.7");
        assert_eq!(settings.get_string("apiver"), "0.1");
        assert_eq!(settings.resolve("apiver").unwrap().layer, Layer::Default);
    }

    #[test]
    fn basic_global_honors_set() {
        let mut settings = Settings::new(registry(), env(&[("DVLN_SCREENLEVEL", "debug")]));
        assert_eq!(settings.get_string("screenlevel"), "debug");
        settings.set("screenlevel", "trace");
        assert_eq!(settings.get_string("screenlevel"), "trace");
    }

    #[test]
    fn dump_lists_value_and_layer() {
        let settings = Settings::new(registry(), env(&[("DVLN_DEBUG", "true")]));
        let dump = settings.dump();
        assert!(dump.contains("debug = \"true\" (env)\n"), "dump was: {}", dump);
        assert!(dump.contains("port = \"3856\" (default)\n"));
    }
}
