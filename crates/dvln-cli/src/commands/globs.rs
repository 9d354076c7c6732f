//! `--globs env|cfg`: list the settings a user may change

use std::str::FromStr;

use serde_json::{Map, Value as JsonValue, json};

use dvln_core::response::emit_response;
use dvln_core::settings::{Scope, Settings, UserLevel, Value};
use dvln_core::{Data, Look, Response, TextStyle, Verbosity};

use crate::context::RunContext;
use crate::error::Result;

/// Naming used for the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobsKind {
    /// `DVLN_<NAME>` environment variables
    Env,
    /// Lowercase config file keys
    Cfg,
}

impl GlobsKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GlobsKind::Env => "env",
            GlobsKind::Cfg => "cfg",
        }
    }

    fn display_name(self, name: &str) -> String {
        match self {
            GlobsKind::Env => Settings::env_key(name),
            GlobsKind::Cfg => name.to_lowercase(),
        }
    }
}

impl FromStr for GlobsKind {
    type Err = dvln_core::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "env" => Ok(GlobsKind::Env),
            "cfg" => Ok(GlobsKind::Cfg),
            other => Err(dvln_core::Error::InvalidGlobs {
                value: other.to_string(),
            }),
        }
    }
}

/// One listed setting
#[derive(Debug, Clone, PartialEq)]
pub struct GlobEntry {
    pub name: String,
    pub description: String,
    pub level: UserLevel,
    pub value: Value,
}

/// Settings a user can set from the environment or config file, in name order
pub fn collect(settings: &Settings, kind: GlobsKind) -> Vec<GlobEntry> {
    settings
        .entries()
        .into_iter()
        .filter(|(s, _)| matches!(s.scope, Scope::BasicGlobal | Scope::CliGlobal))
        .filter(|(s, _)| s.level != UserLevel::Internal)
        .map(|(s, resolved)| GlobEntry {
            name: kind.display_name(&s.name),
            description: s.description.clone(),
            level: s.level,
            value: resolved.value,
        })
        .collect()
}

/// Text listing for the given verbosity
pub fn render_text(entries: &[GlobEntry], verbosity: Verbosity, style: &TextStyle) -> String {
    let pad = style.indent(1);
    let mut text = String::new();
    for entry in entries {
        let value = style.value(&entry.value);
        text.push_str(&format!("{}:\n", entry.name));
        match verbosity {
            Verbosity::Terse => text.push_str(&format!("{}Value: {}\n", pad, value)),
            Verbosity::Regular => {
                text.push_str(&format!("{}Description: {}\n", pad, entry.description));
                text.push_str(&format!("{}Value:       {}\n", pad, value));
            }
            Verbosity::Verbose => {
                text.push_str(&format!("{}Description: {}\n", pad, entry.description));
                text.push_str(&format!("{}Use Level:   {}\n", pad, entry.level));
                text.push_str(&format!("{}Value:       {}\n", pad, value));
            }
        }
    }
    style.apply(&text)
}

fn json_data(entries: &[GlobEntry], kind: GlobsKind, verbosity: Verbosity) -> Data<JsonValue> {
    let mut fields = vec!["(name)"];
    if verbosity >= Verbosity::Regular {
        fields.push("description");
    }
    if verbosity == Verbosity::Verbose {
        fields.push("useLevel");
    }
    fields.push("value");

    let items = entries
        .iter()
        .map(|entry| {
            let mut body = Map::new();
            if verbosity >= Verbosity::Regular {
                body.insert("description".to_string(), json!(entry.description));
            }
            if verbosity == Verbosity::Verbose {
                body.insert("useLevel".to_string(), json!(entry.level.to_string()));
            }
            body.insert("value".to_string(), json!(entry.value));
            let mut item = Map::new();
            item.insert(entry.name.clone(), JsonValue::Object(body));
            JsonValue::Object(item)
        })
        .collect();

    Data::new(kind.as_str(), verbosity.as_str())
        .with_fields(fields)
        .with_start_index(1)
        .with_items(items)
}

/// Dump the settings in the configured look
pub fn run_globs(ctx: &mut RunContext, kind: GlobsKind) -> Result<()> {
    let verbosity = ctx.verbosity();
    let entries = collect(&ctx.settings, kind);

    if ctx.look() == Look::Json {
        let response = Response::new(ctx.settings.get_string("apiver"), "dvlnGlobs")
            .with_data(json_data(&entries, kind, verbosity));
        emit_response(&mut ctx.output, response)?;
        return Ok(());
    }

    let text = render_text(&entries, verbosity, ctx.output.text_style());
    ctx.output.print_raw(text);
    Ok(())
}
