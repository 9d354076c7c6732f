//! The run sequence from raw arguments to subcommand
//!
//! ```text
//! first pass -> early adjust -> config scan -> final adjust
//!   -> command rebuild -> final prep -> dispatch parse -> subcommand
//!   -> post-execution note
//! ```

use dvln_core::config_file::scan_user_config;
use dvln_core::jobs::{available_parallelism, resolve_jobs};
use dvln_core::response::install_json_formatter;
use dvln_core::{Error, Level, Look};

use crate::binder;
use crate::cli;
use crate::commands::{self, GlobsKind};
use crate::context::RunContext;
use crate::error::Result;
use crate::logging;

/// Run dvln with `args` (executable name first) and return the exit value
pub fn execute(ctx: &mut RunContext, args: &[String]) -> i32 {
    let code = match run_stages(ctx, args) {
        Ok(code) => code,
        Err(err) => ctx.fail(err),
    };
    ctx.finish();
    code
}

fn run_stages(ctx: &mut RunContext, args: &[String]) -> Result<i32> {
    if args.len() > 1 {
        match binder::push_cli_opts(&mut ctx.settings, args) {
            Ok(name) => {
                if ctx.current_command.is_none() {
                    ctx.current_command = Some(name);
                }
            }
            Err(err) => return Err(err.with_usage(ctx.usage_hint()).into()),
        }
    }
    ctx.step("init complete");

    ctx.controller.adjust(&mut ctx.settings, &mut ctx.output)?;

    let scanned = scan_user_config(&mut ctx.settings);
    sync_formatter(ctx);
    scanned?;

    ctx.controller.adjust(&mut ctx.settings, &mut ctx.output)?;
    sync_formatter(ctx);

    let command = cli::build_command(&ctx.settings);

    if let Some(code) = final_prep(ctx)? {
        ctx.step("complete");
        return Ok(code);
    }

    if let Err(e) = logging::init(ctx.output.screen_threshold(), ctx.controller.extended_screen()) {
        ctx.output.trace(format!("Tracing subscriber already installed: {}", e));
    }
    ctx.step("config loaded and output prepared");

    let matches = command
        .try_get_matches_from(args)
        .map_err(|e| binder::command_line_error(&e).with_usage(ctx.usage_hint()))?;
    commands::dispatch(ctx, &matches)?;
    ctx.output.debug("Command dispatch completed successfully");

    ctx.step("dispatch complete");
    ctx.step("complete");
    Ok(0)
}

/// Keep the JSON formatter in step with the resolved look
fn sync_formatter(ctx: &mut RunContext) {
    match ctx.look() {
        Look::Json => {
            let api_version = ctx.settings.get_string("apiver");
            install_json_formatter(&mut ctx.output, &api_version);
        }
        Look::Text => ctx.output.clear_formatters(),
    }
}

/// Checks and informational exits that run before dispatch
///
/// Returns the exit value when the run is already complete.
fn final_prep(ctx: &mut RunContext) -> Result<Option<i32>> {
    let used = ctx.settings.config_file_used().map(|p| p.display().to_string());
    match used {
        Some(path) => ctx.output.debug(format!("Used config file: {}", path)),
        None => ctx.output.debug("No config file used"),
    }

    let hint = ctx.usage_hint();
    ctx.jobs = resolve_jobs(&ctx.settings.get_string("jobs"), available_parallelism())
        .map_err(|e| e.with_usage(hint.clone()))?;

    if ctx.settings.get_bool("serve") {
        return Err(Error::ServeUnavailable.into());
    }

    let look = Look::from_settings(&ctx.settings).map_err(|e| e.with_usage(hint.clone()))?;
    if look == Look::Json && ctx.settings.get_bool("interact") {
        ctx.output.debug("Interactive prompting is not available with the json look");
        ctx.output.debug("Setting interact to false");
        ctx.settings.set("interact", false);
    }

    if ctx.settings.get_bool("version") {
        commands::run_version(ctx)?;
        return Ok(Some(0));
    }

    if ctx.output.screen_threshold() == Level::Trace || ctx.output.logfile_threshold() == Level::Trace {
        let dump = ctx.settings.dump();
        for line in dump.lines() {
            ctx.output.trace(format!("Setting: {}", line));
        }
    }

    let globs = ctx.settings.get_string("globs");
    match globs.as_str() {
        "" | "skip" => Ok(None),
        other => {
            let kind: GlobsKind = other.parse().map_err(|e: Error| e.with_usage(hint))?;
            commands::run_globs(ctx, kind)?;
            Ok(Some(0))
        }
    }
}
