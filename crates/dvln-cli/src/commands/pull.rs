//! `dvln pull`: bring a workspace up to date with its devline

use serde_json::json;

use dvln_core::Look;

use super::{emit_json, package_list};
use crate::context::RunContext;
use crate::error::Result;

pub fn run_pull(ctx: &mut RunContext) -> Result<()> {
    let devline = ctx.settings.get_string("devline");
    let packages = package_list(&ctx.settings.get_string("pkg"));

    if ctx.look() == Look::Json {
        return emit_json(
            ctx,
            "pull",
            vec![("devline", json!(devline)), ("pkg", json!(packages))],
        );
    }

    ctx.output.print(format!("Pulling packages based on devline {}", devline));
    if !packages.is_empty() {
        ctx.output.print(format!("Selected packages: {}", packages.join(", ")));
    }
    Ok(())
}
