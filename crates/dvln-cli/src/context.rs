//! Per-invocation state
//!
//! One [`RunContext`] is created in `main` and passed down to every stage
//! and subcommand. Nothing about a run lives in globals.

use std::collections::HashMap;

use dvln_core::settings::{Settings, dvln_registry};
use dvln_core::{Look, Output, OutputController, Verbosity};

use crate::analysis::Timer;
use crate::cli::TOOL_NAME;
use crate::error::CliError;

/// Everything one run of dvln needs
pub struct RunContext {
    pub settings: Settings,
    pub output: Output,
    pub controller: OutputController,
    /// Command that ends up running, set by the first successful parse
    pub current_command: Option<String>,
    /// `argv[0]` as invoked
    pub exec_name: String,
    /// Effective job count once `jobs` has been validated
    pub jobs: usize,
    pub timer: Timer,
}

impl RunContext {
    pub fn new(env: HashMap<String, String>, output: Output, exec_name: impl Into<String>) -> Self {
        Self {
            settings: Settings::new(dvln_registry(), env),
            output,
            controller: OutputController::new(),
            current_command: None,
            exec_name: exec_name.into(),
            jobs: 1,
            timer: Timer::start(),
        }
    }

    /// Resolved look, text when the setting is not valid (yet)
    pub fn look(&self) -> Look {
        Look::from_settings(&self.settings).unwrap_or(Look::Text)
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_settings(&self.settings)
    }

    /// Name of the running command, the tool name until one is known
    pub fn command_name(&self) -> &str {
        self.current_command.as_deref().unwrap_or(TOOL_NAME)
    }

    /// Hint appended to usage problems
    pub fn usage_hint(&self) -> String {
        match self.command_name() {
            TOOL_NAME => format!("Please run '{} help' for usage", TOOL_NAME),
            name => format!("Please run '{} help {}' for usage", TOOL_NAME, name),
        }
    }

    /// Print a timing checkpoint when `analysis` is on
    #[track_caller]
    pub fn step(&mut self, label: &str) {
        if self.settings.get_bool("analysis") {
            let line = self.timer.checkpoint(label);
            self.output.info(line);
        }
    }

    /// Report an error that ends the run and return the exit value
    ///
    /// Fatal conditions are reported at fatal level, everything else as an
    /// issue. The look decides whether this is text or a JSON document.
    #[track_caller]
    pub fn fail(&mut self, err: CliError) -> i32 {
        let code = Some(err.code());
        let text = err.to_string();
        if err.is_fatal() {
            self.output.fatal(code, text)
        } else {
            self.output.issue_exit(code, text)
        }
    }

    /// Post-execution step: show the temp logfile note and flush
    pub fn finish(&mut self) {
        if self.look() == Look::Text {
            if let Some(note) = self.controller.take_exit_note() {
                self.output.note_to_diag(note);
            }
        }
        self.output.flush();
    }
}
