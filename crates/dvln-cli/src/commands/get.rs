//! `dvln get`: fetch packages for a codebase and devline

use serde_json::json;

use dvln_core::{Look, codes};

use super::{emit_json, package_list};
use crate::context::RunContext;
use crate::error::Result;

/// Report what would be fetched
///
/// A missing codebase is reported as an issue but does not stop the run.
pub fn run_get(ctx: &mut RunContext) -> Result<()> {
    let codebase = ctx.settings.get_string("codebase");
    let devline = ctx.settings.get_string("devline");
    let packages = package_list(&ctx.settings.get_string("pkg"));
    let wkspcdir = ctx.settings.get_string("wkspcdir");

    if codebase.is_empty() {
        ctx.output.issue(
            Some(codes::MISSING_CODEBASE),
            "No codebase given, use --codebase (-c), the config file or DVLN_CODEBASE",
        );
    }

    if ctx.look() == Look::Json {
        return emit_json(
            ctx,
            "get",
            vec![
                ("codebase", json!(codebase)),
                ("devline", json!(devline)),
                ("pkg", json!(packages)),
                ("wkspcdir", json!(wkspcdir)),
                ("jobs", json!(ctx.jobs)),
            ],
        );
    }

    ctx.output.verbose(format!("Workspace directory: {}", wkspcdir));
    ctx.output.print(format!("Getting packages from codebase {}, devline {}", codebase, devline));
    if !packages.is_empty() {
        ctx.output.print(format!("Selected packages: {}", packages.join(", ")));
    }
    Ok(())
}
