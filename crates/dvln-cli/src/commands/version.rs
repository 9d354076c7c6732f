//! `dvln version` and `dvln --version`

use chrono::{DateTime, NaiveDate};
use serde_json::json;

use dvln_core::{Look, Verbosity};

use super::emit_json;
use crate::context::RunContext;
use crate::error::Result;

/// Build details, baked in at compile time when the build provides them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub tool_version: String,
    pub api_version: String,
    pub build_date: String,
    pub exec_name: String,
    pub commit: Option<String>,
}

impl VersionInfo {
    pub fn from_context(ctx: &RunContext) -> Self {
        Self {
            tool_version: ctx.settings.get_string("toolver"),
            api_version: ctx.settings.get_string("apiver"),
            build_date: build_date(option_env!("DVLN_BUILD_DATE")),
            exec_name: ctx.exec_name.clone(),
            commit: option_env!("DVLN_COMMIT").filter(|c| !c.is_empty()).map(String::from),
        }
    }

    /// Text lines for the given verbosity
    pub fn lines(&self, verbosity: Verbosity) -> Vec<String> {
        let mut lines = vec![format!("Version: {}", self.tool_version)];
        if verbosity >= Verbosity::Regular {
            lines.push(format!("API Rev: {}", self.api_version));
            lines.push(format!("Build Date: {}", self.build_date));
        }
        if verbosity == Verbosity::Verbose {
            lines.push(format!("Exec Name: {}", self.exec_name));
            if let Some(commit) = &self.commit {
                lines.push(format!("Commit: {}", commit));
            }
        }
        lines
    }
}

/// Normalize a build timestamp to a date, `unknown` when absent or unreadable
fn build_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return "unknown".to_string();
    };
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return stamp.format("%Y-%m-%d").to_string();
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => "unknown".to_string(),
    }
}

pub fn run_version(ctx: &mut RunContext) -> Result<()> {
    let info = VersionInfo::from_context(ctx);
    let verbosity = ctx.verbosity();

    if ctx.look() == Look::Json {
        let mut item = vec![("toolVersion", json!(info.tool_version))];
        if verbosity >= Verbosity::Regular {
            item.push(("apiVersion", json!(info.api_version)));
            item.push(("buildDate", json!(info.build_date)));
        }
        if verbosity == Verbosity::Verbose {
            item.push(("execName", json!(info.exec_name)));
            if let Some(commit) = &info.commit {
                item.push(("commit", json!(commit)));
            }
        }
        return emit_json(ctx, "version", item);
    }

    for line in info.lines(verbosity) {
        let line = ctx.output.text_style().apply(&line);
        ctx.output.print(line);
    }
    Ok(())
}
