//! dvln command line tool
//!
//! Multi-package development line and workspace management. This binary
//! wires the settings engine and output service from `dvln-core` to the
//! command tree and subcommands.

mod analysis;
mod app;
mod binder;
mod cli;
mod commands;
mod context;
mod error;
mod logging;

use std::collections::HashMap;

use colored::Colorize;

use context::RunContext;
use error::{CliError, Result};

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let args = std::env::args_os()
        .map(|arg| {
            arg.into_string()
                .map_err(|bad| CliError::user(format!("Argument is not valid UTF-8: {}", bad.to_string_lossy())))
        })
        .collect::<Result<Vec<String>>>()?;
    let env: HashMap<String, String> = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect();

    let exec_name = args.first().cloned().unwrap_or_else(|| cli::TOOL_NAME.to_string());
    let mut ctx = RunContext::new(env, dvln_core::Output::stdio(), exec_name);
    Ok(app::execute(&mut ctx, &args))
}
