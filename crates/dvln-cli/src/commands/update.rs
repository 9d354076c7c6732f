//! `dvln update`: update packages in place or from a devline

use serde_json::json;

use dvln_core::Look;

use super::{emit_json, package_list};
use crate::context::RunContext;
use crate::error::Result;

pub fn run_update(ctx: &mut RunContext) -> Result<()> {
    let devline = ctx.settings.get_string("devline");
    let packages = package_list(&ctx.settings.get_string("pkg"));

    if ctx.look() == Look::Json {
        return emit_json(
            ctx,
            "update",
            vec![("devline", json!(devline)), ("pkg", json!(packages))],
        );
    }

    if devline.is_empty() {
        ctx.output.print("Updating packages based on the workspace's current devline");
    } else {
        ctx.output.print(format!("Updating packages based on devline {}", devline));
    }
    if !packages.is_empty() {
        ctx.output.print(format!("Selected packages: {}", packages.join(", ")));
    }
    Ok(())
}
