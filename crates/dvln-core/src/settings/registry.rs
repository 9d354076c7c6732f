//! Registry of known settings

use std::collections::BTreeMap;
use std::fmt;

use super::resolver::Layer;
use super::value::Value;
use crate::{Error, Result};

/// Minimum user experience level a setting is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UserLevel {
    Internal,
    Novice,
    Standard,
    Expert,
}

impl fmt::Display for UserLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UserLevel::Internal => "INTERNAL",
            UserLevel::Novice => "NOVICE",
            UserLevel::Standard => "STANDARD",
            UserLevel::Expert => "EXPERT",
        };
        f.write_str(name)
    }
}

/// Which layers may supply a value for a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Default only
    ConstGlobal,
    /// Default, environment and config file; never a flag
    BasicGlobal,
    /// Every layer
    CliGlobal,
    /// Default and explicit values only
    CliOnlyGlobal,
}

impl Scope {
    /// Whether a layer may supply a value under this scope
    pub fn allows(self, layer: Layer) -> bool {
        match self {
            Scope::ConstGlobal => layer == Layer::Default,
            Scope::CliOnlyGlobal => matches!(layer, Layer::Default | Layer::Cli),
            Scope::BasicGlobal | Scope::CliGlobal => true,
        }
    }

    /// Whether the setting is bound to a command line flag
    pub fn is_flag(self) -> bool {
        matches!(self, Scope::CliGlobal | Scope::CliOnlyGlobal)
    }
}

/// A registered setting
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    /// Name as spelled at registration
    pub name: String,
    pub default: Value,
    pub description: String,
    pub level: UserLevel,
    pub scope: Scope,
}

/// Settings keyed by lowercased name
///
/// All registration happens before the first lookup. Nothing guards that
/// ordering; the run sequence simply builds the registry first.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, Setting>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a setting, replacing any earlier entry with the same name
    ///
    /// Returns the replaced entry, if any.
    pub fn register(
        &mut self,
        name: &str,
        default: impl Into<Value>,
        description: &str,
        level: UserLevel,
        scope: Scope,
    ) -> Option<Setting> {
        let key = name.to_lowercase();
        let setting = Setting {
            name: name.to_string(),
            default: default.into(),
            description: description.to_string(),
            level,
            scope,
        };

        let previous = self.entries.insert(key, setting);
        if previous.is_some() {
            tracing::debug!(setting = name, "Setting redefined, last registration wins");
        }
        previous
    }

    /// Description, user level and scope of a registered setting
    pub fn describe(&self, name: &str) -> Result<(&str, UserLevel, Scope)> {
        self.get(name)
            .map(|s| (s.description.as_str(), s.level, s.scope))
            .ok_or_else(|| Error::SettingNotFound {
                name: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Option<&Setting> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Settings in name order
    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
