//! Leveled output to the screen and an optional logfile
//!
//! Every user-visible line goes through [`Output`]. Each destination has its
//! own threshold and prefix flags. A [`MessageFormatter`] registered for a
//! level may rewrite or suppress messages at that level, which is how JSON
//! mode captures issues and errors.

mod level;
mod prefix;

pub use level::Level;
pub use prefix::PrefixFlags;

use std::backtrace::Backtrace;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::api::{JsonStyle, ResponseStore};
use crate::codes::ERROR_EXIT;
use crate::response::TextStyle;
use crate::{Error, Result};

/// Output destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Screen,
    Logfile,
    Both,
}

impl Destination {
    pub fn includes_screen(self) -> bool {
        matches!(self, Destination::Screen | Destination::Both)
    }

    pub fn includes_logfile(self) -> bool {
        matches!(self, Destination::Logfile | Destination::Both)
    }
}

impl FromStr for Destination {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "screen" => Ok(Destination::Screen),
            "logfile" => Ok(Destination::Logfile),
            "both" => Ok(Destination::Both),
            other => Err(format!("unknown destination: {}", other)),
        }
    }
}

/// A message on its way to the destinations
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    pub level: Level,
    pub code: Option<i32>,
    /// Whether the run ends after this message
    pub dying: bool,
}

/// What a formatter decided to do with a message
#[derive(Debug, Clone, PartialEq)]
pub struct Formatted {
    pub text: String,
    /// Destinations that must not receive the message
    pub suppress: Option<Destination>,
    /// Write the text without native prefixes
    pub raw: bool,
}

impl Formatted {
    /// Leave the message untouched
    pub fn unchanged(message: &Message) -> Self {
        Self {
            text: message.text.clone(),
            suppress: None,
            raw: false,
        }
    }
}

/// Hook that may rewrite messages at the levels it is registered for
pub trait MessageFormatter: Send + Sync {
    fn format(&self, message: &Message, store: &mut ResponseStore) -> Formatted;
}

struct Logfile {
    path: PathBuf,
    file: File,
}

/// Screen and logfile writer with per-destination thresholds
pub struct Output {
    screen: Box<dyn Write + Send>,
    diag: Box<dyn Write + Send>,
    logfile: Option<Logfile>,
    screen_threshold: Level,
    logfile_threshold: Level,
    screen_flags: PrefixFlags,
    logfile_flags: PrefixFlags,
    smart_prefix: bool,
    debug_scope: Vec<String>,
    stack_trace: Option<Destination>,
    formatters: BTreeMap<Level, Arc<dyn MessageFormatter>>,
    store: ResponseStore,
    json_style: JsonStyle,
    text_style: TextStyle,
}

impl Output {
    /// Output writing to the given screen and diagnostic writers
    pub fn new(screen: Box<dyn Write + Send>, diag: Box<dyn Write + Send>) -> Self {
        Self {
            screen,
            diag,
            logfile: None,
            screen_threshold: Level::Info,
            logfile_threshold: Level::Discard,
            screen_flags: PrefixFlags::level_only(),
            logfile_flags: PrefixFlags::logfile_default(),
            smart_prefix: true,
            debug_scope: Vec::new(),
            stack_trace: None,
            formatters: BTreeMap::new(),
            store: ResponseStore::default(),
            json_style: JsonStyle::default(),
            text_style: TextStyle::default(),
        }
    }

    /// Output writing to stdout, with diagnostics on stderr
    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn screen_threshold(&self) -> Level {
        self.screen_threshold
    }

    pub fn set_screen_threshold(&mut self, level: Level) {
        self.screen_threshold = level;
    }

    pub fn logfile_threshold(&self) -> Level {
        self.logfile_threshold
    }

    pub fn set_logfile_threshold(&mut self, level: Level) {
        self.logfile_threshold = level;
    }

    pub fn screen_flags(&self) -> PrefixFlags {
        self.screen_flags
    }

    pub fn set_screen_flags(&mut self, flags: PrefixFlags) {
        self.screen_flags = flags;
    }

    pub fn logfile_flags(&self) -> PrefixFlags {
        self.logfile_flags
    }

    pub fn set_logfile_flags(&mut self, flags: PrefixFlags) {
        self.logfile_flags = flags;
    }

    /// Repeat the bracketed metadata on every line of multi-line messages
    /// (on by default); off puts it on the first line only
    pub fn set_smart_prefix(&mut self, on: bool) {
        self.smart_prefix = on;
    }

    pub fn smart_prefix(&self) -> bool {
        self.smart_prefix
    }

    pub fn json_style(&self) -> &JsonStyle {
        &self.json_style
    }

    pub fn set_json_style(&mut self, style: JsonStyle) {
        self.json_style = style;
    }

    pub fn text_style(&self) -> &TextStyle {
        &self.text_style
    }

    pub fn set_text_style(&mut self, style: TextStyle) {
        self.text_style = style;
    }

    /// Restrict trace and debug output to callers whose source path contains
    /// one of the comma separated tokens (empty means no restriction)
    pub fn set_debug_scope(&mut self, scope: &str) {
        self.debug_scope = scope
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
    }

    pub fn debug_scope(&self) -> &[String] {
        &self.debug_scope
    }

    /// Append a backtrace to dying messages for these destinations
    pub fn set_stack_trace(&mut self, destination: Option<Destination>) {
        self.stack_trace = destination;
    }

    pub fn stack_trace(&self) -> Option<Destination> {
        self.stack_trace
    }

    /// Open (create or append) a logfile
    ///
    /// Opening the file that is already open does nothing.
    pub fn set_logfile(&mut self, path: &Path) -> Result<()> {
        if self.logfile_path() == Some(path) {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| Error::LogFile {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "Output logfile opened");
        self.logfile = Some(Logfile {
            path: path.to_path_buf(),
            file,
        });
        Ok(())
    }

    pub fn logfile_path(&self) -> Option<&Path> {
        self.logfile.as_ref().map(|l| l.path.as_path())
    }

    /// Register a formatter for one level
    pub fn set_formatter(&mut self, level: Level, formatter: Arc<dyn MessageFormatter>) {
        self.formatters.insert(level, formatter);
    }

    pub fn has_formatter(&self, level: Level) -> bool {
        self.formatters.contains_key(&level)
    }

    pub fn clear_formatters(&mut self) {
        self.formatters.clear();
    }

    /// Note and warning waiting for the next JSON response
    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ResponseStore {
        &mut self.store
    }

    #[track_caller]
    pub fn trace(&mut self, text: impl AsRef<str>) {
        self.emit(Level::Trace, None, text.as_ref(), false);
    }

    #[track_caller]
    pub fn debug(&mut self, text: impl AsRef<str>) {
        self.emit(Level::Debug, None, text.as_ref(), false);
    }

    #[track_caller]
    pub fn verbose(&mut self, text: impl AsRef<str>) {
        self.emit(Level::Verbose, None, text.as_ref(), false);
    }

    #[track_caller]
    pub fn info(&mut self, text: impl AsRef<str>) {
        self.emit(Level::Info, None, text.as_ref(), false);
    }

    /// Plain output at info level
    #[track_caller]
    pub fn print(&mut self, text: impl AsRef<str>) {
        self.emit(Level::Info, None, text.as_ref(), false);
    }

    #[track_caller]
    pub fn note(&mut self, code: Option<i32>, text: impl AsRef<str>) {
        self.emit(Level::Note, code, text.as_ref(), false);
    }

    #[track_caller]
    pub fn issue(&mut self, code: Option<i32>, text: impl AsRef<str>) {
        self.emit(Level::Issue, code, text.as_ref(), false);
    }

    #[track_caller]
    pub fn error(&mut self, code: Option<i32>, text: impl AsRef<str>) {
        self.emit(Level::Error, code, text.as_ref(), false);
    }

    /// Report an issue that ends the run; returns the exit value
    #[track_caller]
    pub fn issue_exit(&mut self, code: Option<i32>, text: impl AsRef<str>) -> i32 {
        self.emit(Level::Issue, code, text.as_ref(), true);
        ERROR_EXIT
    }

    /// Report an error that ends the run; returns the exit value
    #[track_caller]
    pub fn error_exit(&mut self, code: Option<i32>, text: impl AsRef<str>) -> i32 {
        self.emit(Level::Error, code, text.as_ref(), true);
        ERROR_EXIT
    }

    /// Report a fatal condition; returns the exit value
    #[track_caller]
    pub fn fatal(&mut self, code: Option<i32>, text: impl AsRef<str>) -> i32 {
        self.emit(Level::Fatal, code, text.as_ref(), true);
        ERROR_EXIT
    }

    /// Info level output written without any prefix, used for JSON documents
    #[track_caller]
    pub fn print_raw(&mut self, text: impl AsRef<str>) {
        self.dispatch(Level::Info, None, text.as_ref(), false, true);
    }

    /// Write a note straight to the diagnostic writer, bypassing thresholds
    pub fn note_to_diag(&mut self, text: impl AsRef<str>) {
        let line = with_newline(&format!("Note: {}", text.as_ref()));
        let _ = self.diag.write_all(line.as_bytes());
        let _ = self.diag.flush();
    }

    pub fn flush(&mut self) {
        let _ = self.screen.flush();
        if let Some(logfile) = self.logfile.as_mut() {
            let _ = logfile.file.flush();
        }
    }

    /// Route one message to the destinations that accept it
    ///
    /// Write failures are dropped; there is nowhere left to report them.
    #[track_caller]
    pub fn emit(&mut self, level: Level, code: Option<i32>, text: &str, dying: bool) {
        self.dispatch(level, code, text, dying, false);
    }

    #[track_caller]
    fn dispatch(&mut self, level: Level, code: Option<i32>, text: &str, dying: bool, raw: bool) {
        let location = Location::caller();

        if level <= Level::Debug && !self.in_debug_scope(location) {
            return;
        }

        let to_screen = level >= self.screen_threshold;
        let to_logfile = self.logfile.is_some() && level >= self.logfile_threshold;
        if !to_screen && !to_logfile && !dying {
            return;
        }

        let message = Message {
            text: text.to_string(),
            level,
            code,
            dying,
        };
        let formatted = match self.formatters.get(&level) {
            Some(formatter) if !raw => formatter.format(&message, &mut self.store),
            _ => Formatted {
                raw,
                ..Formatted::unchanged(&message)
            },
        };
        let suppress = formatted.suppress;
        let trace = if dying && self.stack_trace.is_some() {
            Some(Backtrace::force_capture().to_string())
        } else {
            None
        };
        let now = chrono::Local::now();

        if to_screen && !suppress.is_some_and(Destination::includes_screen) {
            let mut line = render(&formatted, &message, self.screen_flags, self.smart_prefix, now, location);
            // a raw document must stay intact on screen
            let screen_trace = !formatted.raw && self.wants_trace(Destination::Screen);
            if let Some(trace) = trace.as_deref().filter(|_| screen_trace) {
                line.push_str(&with_newline(trace));
            }
            let _ = self.screen.write_all(line.as_bytes());
            let _ = self.screen.flush();
        }

        if to_logfile && !suppress.is_some_and(Destination::includes_logfile) {
            let mut line = render(&formatted, &message, self.logfile_flags, self.smart_prefix, now, location);
            if let Some(trace) = trace.as_deref().filter(|_| self.wants_trace(Destination::Logfile)) {
                line.push_str(&with_newline(trace));
            }
            if let Some(logfile) = self.logfile.as_mut() {
                let _ = logfile.file.write_all(line.as_bytes());
            }
        }
    }

    fn in_debug_scope(&self, location: &Location<'_>) -> bool {
        self.debug_scope.is_empty()
            || self
                .debug_scope
                .iter()
                .any(|token| location.file().contains(token.as_str()))
    }

    fn wants_trace(&self, destination: Destination) -> bool {
        match (self.stack_trace, destination) {
            (Some(configured), Destination::Screen) => configured.includes_screen(),
            (Some(configured), Destination::Logfile) => configured.includes_logfile(),
            _ => false,
        }
    }
}

fn render(
    formatted: &Formatted,
    message: &Message,
    flags: PrefixFlags,
    smart: bool,
    now: chrono::DateTime<chrono::Local>,
    location: &Location<'_>,
) -> String {
    if formatted.raw {
        return with_newline(&formatted.text);
    }
    let metadata = flags.metadata(now, location);
    let mut line = metadata.clone();
    if flags.level {
        if let Some(label) = message.level.label(message.code) {
            line.push_str(&label);
        }
    }
    if smart && !metadata.is_empty() {
        let mut lines = formatted.text.lines();
        line.push_str(lines.next().unwrap_or_default());
        for rest in lines {
            line.push('\n');
            line.push_str(&metadata);
            line.push_str(rest);
        }
    } else {
        line.push_str(&formatted.text);
    }
    with_newline(&line)
}

fn with_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{}\n", text)
    }
}
