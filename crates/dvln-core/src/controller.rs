//! Output thresholds and log recording derived from resolved settings
//!
//! [`OutputController::adjust`] runs twice per invocation: once right after
//! the tolerant flag pass so debugging and recording start as early as
//! possible, and again after the config file has been loaded.

use std::path::PathBuf;

use crate::api::{ApiMsg, JsonStyle};
use crate::codes;
use crate::output::{Destination, Level, Output, PrefixFlags};
use crate::paths::{abbreviate_home, expand_home};
use crate::response::{Look, TextStyle};
use crate::settings::{Settings, parse_bool};
use crate::{Error, Result};

/// Screen prefix flags override
pub const SCREEN_FLAGS_VAR: &str = "DVLN_SCREEN_FLAGS";
/// Logfile prefix flags override
pub const LOGFILE_FLAGS_VAR: &str = "DVLN_LOGFILE_FLAGS";
/// Comma separated source path filter for debug and trace output
pub const DEBUG_SCOPE_VAR: &str = "DVLN_DEBUG_SCOPE";
/// `screen`, `logfile` or `both`: where dying messages get a backtrace
pub const STACK_TRACE_VAR: &str = "DVLN_STACK_TRACE_CONFIG";
/// `on` or `off`: repeat prefix metadata on each line of multi-line messages
pub const SMART_PREFIX_VAR: &str = "DVLN_PKG_OUT_SMART_FLAGS_PREFIX";
/// Set to `1` to keep anything from reaching the logfile
pub const LOGFILE_OFF_VAR: &str = "DVLN_LOGFILE_OFF";

/// Prefix of temp logfile names
pub const TEMP_LOG_PREFIX: &str = "dvln.";

/// Output control variables from the environment
///
/// Each is optional. The value `none` means explicitly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputEnv {
    pub screen_flags: Option<String>,
    pub logfile_flags: Option<String>,
    pub debug_scope: Option<String>,
    pub stack_trace: Option<String>,
    pub smart_prefix: Option<String>,
}

impl OutputEnv {
    pub fn from_settings(settings: &Settings) -> Self {
        let read = |key: &str| {
            settings
                .env_var(key)
                .filter(|v| !v.is_empty())
                .map(|v| if v == "none" { String::new() } else { v.to_string() })
        };
        Self {
            screen_flags: read(SCREEN_FLAGS_VAR),
            logfile_flags: read(LOGFILE_FLAGS_VAR),
            debug_scope: read(DEBUG_SCOPE_VAR),
            stack_trace: read(STACK_TRACE_VAR),
            smart_prefix: read(SMART_PREFIX_VAR),
        }
    }

    /// Push the overrides into the output service
    pub fn apply(&self, output: &mut Output) {
        if let Some(flags) = &self.screen_flags {
            output.set_screen_flags(PrefixFlags::parse(flags));
        }
        if let Some(flags) = &self.logfile_flags {
            output.set_logfile_flags(PrefixFlags::parse(flags));
        }
        if let Some(scope) = &self.debug_scope {
            output.set_debug_scope(scope);
        }
        if let Some(config) = &self.stack_trace {
            output.set_stack_trace(config.parse::<Destination>().ok());
        }
        if let Some(on) = self.smart_prefix.as_deref().and_then(parse_bool) {
            output.set_smart_prefix(on);
        }
    }
}

/// Per-run state of the output controller
#[derive(Debug, Default)]
pub struct OutputController {
    temp_log: Option<PathBuf>,
    exit_note: Option<String>,
    extended_screen: bool,
}

impl OutputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive thresholds, prefixes and log recording from the settings
    pub fn adjust(&mut self, settings: &mut Settings, output: &mut Output) -> Result<()> {
        let env = OutputEnv::from_settings(settings);

        let screen_level = settings.get_string("screenlevel");
        let threshold = screen_level.parse::<Level>().unwrap_or_else(|_| {
            tracing::warn!(value = %screen_level, "Unknown screen level, using info");
            Level::Info
        });
        output.set_screen_threshold(threshold);

        let debug = settings.get_bool("debug");
        let verbose = settings.get_bool("verbose");
        let mut trace_prefix = false;
        if debug && verbose {
            output.set_screen_threshold(Level::Trace);
            output.set_logfile_threshold(Level::Trace);
            trace_prefix = env.screen_flags.is_none();
        } else if debug {
            output.set_screen_threshold(Level::Debug);
            output.set_logfile_threshold(Level::Debug);
        } else if verbose {
            output.set_screen_threshold(Level::Verbose);
            output.set_logfile_threshold(Level::Verbose);
        } else if settings.get_bool("quiet") {
            output.set_screen_threshold(Level::Error);
        }

        if trace_prefix {
            output.set_screen_flags(PrefixFlags::debug());
        } else if env.screen_flags.is_none() {
            output.set_screen_flags(PrefixFlags::level_only());
        }
        env.apply(output);
        let flags = output.screen_flags();
        self.extended_screen = flags.shortfile || flags.longfile;

        output.set_json_style(JsonStyle::from_settings(settings));
        output.set_text_style(TextStyle::from_settings(settings));

        let record = settings.get_string("record");
        if !record.is_empty() && record != "off" {
            let look = Look::from_settings(settings).unwrap_or(Look::Text);
            if record == "temp" || record == "tmp" {
                if self.temp_log.is_none() {
                    let path = self.temp_log(output)?;
                    let note = format!("Temp output logfile: {}", path.display());
                    settings.set("record", path.display().to_string());
                    match look {
                        Look::Json => output.store_mut().set_note(ApiMsg::new(
                            note,
                            codes::TEMP_LOGFILE_NOTE,
                            Level::Note,
                        )),
                        Look::Text => self.exit_note = Some(note),
                    }
                }
            } else {
                let home = settings.home_dir();
                let path = expand_home(&record, home.as_deref());
                output.set_logfile(&path)?;
                let brief = abbreviate_home(&path, home.as_deref());
                if brief != record {
                    settings.set("record", brief);
                }
            }

            if output.logfile_threshold() == Level::Discard {
                let level = settings.get_string("logfilelevel");
                let threshold = level.parse::<Level>().unwrap_or_else(|_| {
                    tracing::warn!(value = %level, "Unknown logfile level, using info");
                    Level::Info
                });
                output.set_logfile_threshold(threshold);
            }
        }

        if settings.env_var(LOGFILE_OFF_VAR) == Some("1") {
            output.set_logfile_threshold(Level::Discard);
        }

        if matches!(Look::from_settings(settings), Ok(Look::Json)) {
            if let Some(note) = self.exit_note.take() {
                output
                    .store_mut()
                    .set_note(ApiMsg::new(note, codes::TEMP_LOGFILE_NOTE, Level::Note));
            }
        }

        Ok(())
    }

    /// Allocate the temp logfile for this run, or return the one already open
    pub fn temp_log(&mut self, output: &mut Output) -> Result<PathBuf> {
        if let Some(path) = &self.temp_log {
            return Ok(path.clone());
        }

        let (_, path) = tempfile::Builder::new()
            .prefix(TEMP_LOG_PREFIX)
            .suffix(".log")
            .tempfile()?
            .keep()
            .map_err(|e| Error::LogFile {
                path: std::env::temp_dir(),
                source: e.error,
            })?;
        tracing::debug!(path = %path.display(), "Temp output logfile allocated");
        output.set_logfile(&path)?;
        self.temp_log = Some(path.clone());
        Ok(path)
    }

    /// Note to show once the command has finished, if any
    pub fn exit_note(&self) -> Option<&str> {
        self.exit_note.as_deref()
    }

    pub fn take_exit_note(&mut self) -> Option<String> {
        self.exit_note.take()
    }

    /// Whether screen lines carry file and line metadata
    pub fn extended_screen(&self) -> bool {
        self.extended_screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::dvln_registry;
    use dvln_test_utils::CaptureBuffer;
    use rstest::rstest;
    use std::collections::HashMap;
    use std::io;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::new(dvln_registry(), env)
    }

    fn output() -> Output {
        Output::new(Box::new(io::sink()), Box::new(io::sink()))
    }

    #[test]
    fn defaults_leave_info_and_no_logfile() {
        let mut s = settings(&[]);
        let mut out = output();
        OutputController::new().adjust(&mut s, &mut out).unwrap();
        assert_eq!(out.screen_threshold(), Level::Info);
        assert_eq!(out.logfile_threshold(), Level::Discard);
        assert!(out.logfile_path().is_none());
    }

    #[test]
    fn debug_and_verbose_give_trace_with_extended_prefix() {
        let mut s = settings(&[]);
        s.set("debug", true);
        s.set("verbose", true);
        let mut out = output();
        let mut controller = OutputController::new();
        controller.adjust(&mut s, &mut out).unwrap();
        assert_eq!(out.screen_threshold(), Level::Trace);
        assert_eq!(out.logfile_threshold(), Level::Trace);
        assert_eq!(out.screen_flags(), PrefixFlags::debug());
        assert!(controller.extended_screen());
    }

    #[rstest]
    #[case::nothing(false, false, false, Level::Info, Level::Discard)]
    #[case::debug(true, false, false, Level::Debug, Level::Debug)]
    #[case::verbose(false, true, false, Level::Verbose, Level::Verbose)]
    #[case::debug_verbose(true, true, false, Level::Trace, Level::Trace)]
    #[case::quiet(false, false, true, Level::Error, Level::Discard)]
    #[case::debug_beats_quiet(true, false, true, Level::Debug, Level::Debug)]
    #[case::verbose_beats_quiet(false, true, true, Level::Verbose, Level::Verbose)]
    fn thresholds_follow_output_flags(
        #[case] debug: bool,
        #[case] verbose: bool,
        #[case] quiet: bool,
        #[case] screen: Level,
        #[case] logfile: Level,
    ) {
        let mut s = settings(&[]);
        s.set("debug", debug);
        s.set("verbose", verbose);
        s.set("quiet", quiet);
        let mut out = output();
        OutputController::new().adjust(&mut s, &mut out).unwrap();
        assert_eq!(out.screen_threshold(), screen);
        assert_eq!(out.logfile_threshold(), logfile);
    }

    #[rstest]
    #[case::files("get.rs, app.rs", &["get.rs", "app.rs"])]
    #[case::none("none", &[])]
    fn debug_scope_is_forwarded(#[case] value: &str, #[case] expected: &[&str]) {
        let mut s = settings(&[(DEBUG_SCOPE_VAR, value)]);
        let mut out = output();
        out.set_debug_scope("stale.rs");
        OutputController::new().adjust(&mut s, &mut out).unwrap();
        assert_eq!(out.debug_scope(), expected);
    }

    #[rstest]
    #[case::screen("screen", Some(Destination::Screen))]
    #[case::both("both", Some(Destination::Both))]
    #[case::none("none", None)]
    fn stack_trace_config_is_forwarded(#[case] value: &str, #[case] expected: Option<Destination>) {
        let mut s = settings(&[(STACK_TRACE_VAR, value)]);
        let mut out = output();
        out.set_stack_trace(Some(Destination::Logfile));
        OutputController::new().adjust(&mut s, &mut out).unwrap();
        assert_eq!(out.stack_trace(), expected);
    }

    #[rstest]
    #[case::off("off", false)]
    #[case::on("on", true)]
    #[case::none("none", true)]
    fn smart_prefix_is_forwarded(#[case] value: &str, #[case] expected: bool) {
        let mut s = settings(&[(SMART_PREFIX_VAR, value)]);
        let mut out = output();
        OutputController::new().adjust(&mut s, &mut out).unwrap();
        assert_eq!(out.smart_prefix(), expected);
    }

    #[test]
    fn dying_message_gets_configured_trace() {
        let mut s = settings(&[(STACK_TRACE_VAR, "screen")]);
        let screen = CaptureBuffer::new();
        let mut out = Output::new(Box::new(screen.clone()), Box::new(io::sink()));
        OutputController::new().adjust(&mut s, &mut out).unwrap();

        out.issue(Some(3001), "not dying");
        assert_eq!(screen.contents(), "Issue #3001: not dying\n");

        screen.clear();
        out.fatal(Some(2008), "Serve mode is not available yet");
        let contents = screen.contents();
        assert!(contents.starts_with("Fatal #2008: Serve mode is not available yet\n"));
        assert!(contents.lines().count() > 1, "no trace in {}", contents);
    }

    #[test]
    fn format_settings_reach_the_output() {
        let mut s = settings(&[
            ("DVLN_JSONRAW", "true"),
            ("DVLN_JSONPREFIX", "#"),
            ("DVLN_TEXTINDENTLEVEL", "3"),
        ]);
        let mut out = output();
        OutputController::new().adjust(&mut s, &mut out).unwrap();
        assert!(out.json_style().raw);
        assert_eq!(out.json_style().prefix, "#");
        assert_eq!(out.json_style().indent, 2);
        assert_eq!(out.text_style().indent, 3);
        assert!(!out.text_style().humanize);
    }

    #[test]
    fn screen_flags_none_suppresses_trace_prefix() {
        let mut s = settings(&[("DVLN_SCREEN_FLAGS", "none")]);
        s.set("debug", true);
        s.set("verbose", true);
        let mut out = output();
        let mut controller = OutputController::new();
        controller.adjust(&mut s, &mut out).unwrap();
        assert_eq!(out.screen_flags(), PrefixFlags::none());
        assert!(!controller.extended_screen());
    }

    #[test]
    fn quiet_only_touches_screen() {
        let mut s = settings(&[("DVLN_QUIET", "1")]);
        let mut out = output();
        OutputController::new().adjust(&mut s, &mut out).unwrap();
        assert_eq!(out.screen_threshold(), Level::Error);
        assert_eq!(out.logfile_threshold(), Level::Discard);
    }

    #[test]
    fn temp_log_is_allocated_once() {
        let mut s = settings(&[]);
        s.set("record", "tmp");
        let mut out = output();
        let mut controller = OutputController::new();

        controller.adjust(&mut s, &mut out).unwrap();
        let first = s.get_string("record");
        controller.adjust(&mut s, &mut out).unwrap();
        let second = s.get_string("record");

        assert_eq!(first, second);
        assert!(first.contains("dvln."), "record was {}", first);
        assert_eq!(controller.temp_log(&mut out).unwrap(), PathBuf::from(&first));
        assert_eq!(controller.exit_note(), Some(format!("Temp output logfile: {}", first).as_str()));
        assert_eq!(out.logfile_threshold(), Level::Info);

        let _ = std::fs::remove_file(first);
    }

    #[test]
    fn temp_log_note_is_stored_in_json_look() {
        let mut s = settings(&[("DVLN_LOOK", "json")]);
        s.set("record", "temp");
        let mut out = output();
        let mut controller = OutputController::new();
        controller.adjust(&mut s, &mut out).unwrap();

        assert!(controller.exit_note().is_none());
        let note = out.store().note().unwrap();
        assert_eq!(note.code, codes::TEMP_LOGFILE_NOTE);
        assert_eq!(note.level, "NOTE");

        let _ = std::fs::remove_file(s.get_string("record"));
    }

    #[test]
    fn named_record_under_home_is_abbreviated() {
        let home = tempfile::TempDir::new().unwrap();
        let home_str = home.path().display().to_string();
        let mut s = settings(&[("HOME", home_str.as_str())]);
        s.set("record", "~/run.log");
        let mut out = output();
        OutputController::new().adjust(&mut s, &mut out).unwrap();

        assert_eq!(out.logfile_path(), Some(home.path().join("run.log").as_path()));
        assert_eq!(s.get_string("record"), "~/run.log");
    }

    #[test]
    fn logfile_off_forces_discard() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("x.log").display().to_string();
        let mut s = settings(&[("DVLN_LOGFILE_OFF", "1")]);
        s.set("record", log.as_str());
        let mut out = output();
        OutputController::new().adjust(&mut s, &mut out).unwrap();
        assert_eq!(out.logfile_threshold(), Level::Discard);
    }

    #[test]
    fn unopenable_record_is_a_logfile_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let bad = dir.path().join("missing").join("x.log").display().to_string();
        let mut s = settings(&[]);
        s.set("record", bad.as_str());
        let mut out = output();
        let err = OutputController::new().adjust(&mut s, &mut out).unwrap_err();
        assert_eq!(err.code(), codes::LOGFILE_OPEN);
    }
}
