//! `dvln help [command]` and `--help`

use dvln_core::response::show_cli_output;

use crate::cli::{self, TOOL_NAME};
use crate::context::RunContext;
use crate::error::Result;

/// Help text for the command named by `topics`, or the root command
///
/// The tree is built from the current settings so the defaults shown are
/// the resolved values.
pub fn render_help(ctx: &RunContext, topics: &[String]) -> Result<String> {
    let mut command = cli::build_command(&ctx.settings);
    command.build();

    let mut current = &mut command;
    for topic in topics {
        current = match current.find_subcommand_mut(topic) {
            Some(sub) => sub,
            None => {
                return Err(dvln_core::Error::command_line(format!(
                    "Unknown help topic \"{}\"",
                    topic
                ))
                .with_usage(format!("Please run '{} help' for usage", TOOL_NAME))
                .into());
            }
        };
    }
    Ok(current.render_long_help().to_string())
}

pub fn run_help(ctx: &mut RunContext, topics: &[String]) -> Result<()> {
    let text = render_help(ctx, topics)?;
    show_cli_output(&mut ctx.output, &ctx.settings, &text)?;
    Ok(())
}
