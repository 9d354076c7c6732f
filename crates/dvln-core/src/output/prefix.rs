//! Metadata prefixes for output lines

use std::panic::Location;

use chrono::{DateTime, Local};

/// Which pieces of metadata go in front of each message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrefixFlags {
    pub date: bool,
    pub time: bool,
    pub micro: bool,
    pub level: bool,
    pub shortfile: bool,
    pub longfile: bool,
}

impl PrefixFlags {
    /// No prefix at all, not even the level label
    pub fn none() -> Self {
        Self::default()
    }

    /// Level label only (screen default)
    pub fn level_only() -> Self {
        Self {
            level: true,
            ..Self::default()
        }
    }

    /// Date, time and level label (logfile default)
    pub fn logfile_default() -> Self {
        Self {
            date: true,
            time: true,
            level: true,
            ..Self::default()
        }
    }

    /// Everything useful when debugging: timestamps to the microsecond,
    /// level label and caller file:line
    pub fn debug() -> Self {
        Self {
            date: true,
            time: true,
            micro: true,
            level: true,
            shortfile: true,
            longfile: false,
        }
    }

    /// Parse a comma separated list such as `date,time,level`
    ///
    /// `none` or an empty string clears every flag. Unknown tokens are
    /// ignored.
    pub fn parse(spec: &str) -> Self {
        let mut flags = Self::none();
        for token in spec.split(',').map(|t| t.trim().to_lowercase()) {
            match token.as_str() {
                "date" => flags.date = true,
                "time" => flags.time = true,
                "micro" => flags.micro = true,
                "level" => flags.level = true,
                "shortfile" => flags.shortfile = true,
                "longfile" => flags.longfile = true,
                "debug" => flags = Self::debug(),
                "none" | "" => {}
                other => tracing::debug!(flag = other, "Ignoring unknown output prefix flag"),
            }
        }
        flags
    }

    /// Whether any bracketed metadata is shown
    pub fn has_metadata(&self) -> bool {
        self.date || self.time || self.micro || self.shortfile || self.longfile
    }

    /// Render the bracketed metadata, e.g. `[2026/10/19 09:15:02.123456 app.rs:42] `
    pub fn metadata(&self, now: DateTime<Local>, location: &Location<'_>) -> String {
        if !self.has_metadata() {
            return String::new();
        }

        let mut parts = Vec::new();
        if self.date {
            parts.push(now.format("%Y/%m/%d").to_string());
        }
        if self.time || self.micro {
            let time = if self.micro {
                now.format("%H:%M:%S%.6f")
            } else {
                now.format("%H:%M:%S")
            };
            parts.push(time.to_string());
        }
        if self.longfile {
            parts.push(format!("{}:{}", location.file(), location.line()));
        } else if self.shortfile {
            let file = location.file();
            let short = file.rsplit(['/', '\\']).next().unwrap_or(file);
            parts.push(format!("{}:{}", short, location.line()));
        }
        format!("[{}] ", parts.join(" "))
    }
}
