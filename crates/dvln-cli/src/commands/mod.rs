//! Command implementations for dvln

pub mod get;
pub mod globs;
pub mod help;
pub mod pull;
pub mod update;
pub mod version;

pub use get::run_get;
pub use globs::{GlobsKind, run_globs};
pub use help::run_help;
pub use pull::run_pull;
pub use update::run_update;
pub use version::run_version;

use clap::ArgMatches;
use serde_json::{Map, Value as JsonValue};

use dvln_core::response::emit_response;
use dvln_core::{Data, Response};

use crate::cli::HELP_COMMAND;
use crate::context::RunContext;
use crate::error::Result;

/// Run whatever the dispatch parse matched
pub fn dispatch(ctx: &mut RunContext, matches: &ArgMatches) -> Result<()> {
    let matched = matches.subcommand();

    if ctx.settings.get_bool("help") {
        let topic: Vec<String> = matched.map(|(name, _)| name.to_string()).into_iter().collect();
        return run_help(ctx, &topic);
    }

    let Some((name, sub)) = matched else {
        return Err(dvln_core::Error::NoSubcommand.into());
    };
    ctx.output.debug(format!("Initialization done, firing up {}", name));

    match name {
        HELP_COMMAND => {
            let topics: Vec<String> = sub
                .get_many::<String>("command")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            run_help(ctx, &topics)
        }
        "get" => run_get(ctx),
        "pull" => run_pull(ctx),
        "update" => run_update(ctx),
        "version" => run_version(ctx),
        other => Err(dvln_core::Error::command_line(format!("Error: unknown command \"{}\"", other))
            .with_usage(ctx.usage_hint())
            .into()),
    }
}

/// Print one JSON response for a subcommand
///
/// The response context is `dvln` plus the capitalized kind (`dvlnGet`)
/// and the single item holds `fields` in order.
pub(crate) fn emit_json(ctx: &mut RunContext, kind: &str, item: Vec<(&str, JsonValue)>) -> Result<()> {
    let fields: Vec<String> = item.iter().map(|(name, _)| name.to_string()).collect();
    let item: Map<String, JsonValue> = item.into_iter().map(|(k, v)| (k.to_string(), v)).collect();

    let data = Data::new(kind, ctx.verbosity().as_str())
        .with_fields(fields)
        .with_items(vec![JsonValue::Object(item)]);
    let response = Response::new(ctx.settings.get_string("apiver"), response_context(kind)).with_data(data);
    emit_response(&mut ctx.output, response)?;
    Ok(())
}

fn response_context(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => format!("dvln{}{}", first.to_uppercase(), chars.as_str()),
        None => "dvln".to_string(),
    }
}

/// Comma separated package selector as a list
pub(crate) fn package_list(pkg: &str) -> Vec<String> {
    pkg.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}
