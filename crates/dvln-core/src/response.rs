//! Text or JSON rendering of command output
//!
//! The `look` setting picks the rendering. In JSON mode issues and errors
//! are captured by [`JsonLookFormatter`] so the client always receives a
//! single well formed JSON document.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::api::{ApiMsg, Data, JsonStyle, Response, ResponseStore};
use crate::output::{Destination, Formatted, Level, Message, MessageFormatter, Output};
use crate::settings::{Settings, Value};
use crate::{Error, Result};

/// Context string of usage/help responses
pub const HELP_CONTEXT: &str = "dvlnHelp";

/// Output rendering selected by the `look` setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Look {
    Text,
    Json,
}

impl Look {
    /// Validate the resolved `look` setting
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.get_string("look").parse()
    }
}

impl FromStr for Look {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(Look::Text),
            "json" => Ok(Look::Json),
            other => Err(Error::InvalidLook {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Look {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Look::Text => "text",
            Look::Json => "json",
        })
    }
}

/// How much detail to put in output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Terse,
    Regular,
    Verbose,
}

impl Verbosity {
    /// `verbose` beats `terse`; neither gives regular
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.get_bool("verbose") {
            Verbosity::Verbose
        } else if settings.get_bool("terse") {
            Verbosity::Terse
        } else {
            Verbosity::Regular
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verbosity::Terse => "terse",
            Verbosity::Regular => "regular",
            Verbosity::Verbose => "verbose",
        }
    }
}

/// Layout of structured text output
///
/// `humanize` groups the digits of integers, `indent` is the width of one
/// nesting level and `prefix` starts every line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStyle {
    pub humanize: bool,
    pub indent: usize,
    pub prefix: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            humanize: false,
            indent: 2,
            prefix: String::new(),
        }
    }
}

impl TextStyle {
    /// Style from `texthumanize`, `textindentlevel` and `textprefix`
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            humanize: settings.get_bool("texthumanize"),
            indent: usize::try_from(settings.get_int("textindentlevel")).unwrap_or(0),
            prefix: settings.get_string("textprefix"),
        }
    }

    /// Leading whitespace for `depth` nesting levels
    pub fn indent(&self, depth: usize) -> String {
        " ".repeat(self.indent * depth)
    }

    /// A setting value as shown to people
    pub fn value(&self, value: &Value) -> String {
        match value {
            Value::Int(n) if self.humanize => group_digits(*n),
            other => other.to_string(),
        }
    }

    /// Put the prefix in front of every line of `text`
    pub fn apply(&self, text: &str) -> String {
        if self.prefix.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        for line in text.split_inclusive('\n') {
            out.push_str(&self.prefix);
            out.push_str(line);
        }
        out
    }
}

fn group_digits(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    for (index, c) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Captures issues, errors and fatals while in JSON mode
///
/// Non-dying messages become the stored warning and are kept off both
/// destinations. Dying messages are replaced by a complete JSON error
/// response written without prefixes.
#[derive(Debug, Clone)]
pub struct JsonLookFormatter {
    api_version: String,
    style: JsonStyle,
}

impl JsonLookFormatter {
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            style: JsonStyle::default(),
        }
    }

    pub fn with_style(mut self, style: JsonStyle) -> Self {
        self.style = style;
        self
    }
}

impl MessageFormatter for JsonLookFormatter {
    fn format(&self, message: &Message, store: &mut ResponseStore) -> Formatted {
        if message.level < Level::Issue {
            return Formatted::unchanged(message);
        }

        let problem = ApiMsg::new(
            &message.text,
            message.code.unwrap_or(crate::codes::DEFAULT_ERROR),
            message.level,
        );

        if message.dying {
            let response: Response<JsonValue> =
                Response::error(&self.api_version, problem).with_stored(store);
            match response.to_json_with(&self.style) {
                Ok(text) => Formatted {
                    text,
                    suppress: None,
                    raw: true,
                },
                Err(_) => Formatted::unchanged(message),
            }
        } else {
            store.set_warning(problem);
            Formatted {
                text: String::new(),
                suppress: Some(Destination::Both),
                raw: true,
            }
        }
    }
}

/// Register the JSON formatter for the issue, error and fatal levels
///
/// Error documents use the output's current JSON style.
pub fn install_json_formatter(output: &mut Output, api_version: &str) {
    let formatter = Arc::new(JsonLookFormatter::new(api_version).with_style(output.json_style().clone()));
    for level in [Level::Issue, Level::Error, Level::Fatal] {
        output.set_formatter(level, formatter.clone());
    }
}

/// Invoking user, if the environment says who that is
pub fn user_id(env: &HashMap<String, String>) -> Option<String> {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|key| env.get(*key))
        .find(|v| !v.is_empty())
        .cloned()
}

/// Embed the stored note and warning in a response and print it
pub fn emit_response<T: Serialize>(output: &mut Output, response: Response<T>) -> Result<()> {
    let response = response.with_stored(output.store_mut());
    let json = response.to_json_with(output.json_style())?;
    output.print_raw(json);
    Ok(())
}

/// Show usage or help text in the configured look
///
/// Text look prints it verbatim. JSON look wraps it in a `usage` response
/// with the help text, the active record log and the invoking user.
pub fn show_cli_output(output: &mut Output, settings: &Settings, text: &str) -> Result<()> {
    let look = Look::from_settings(settings).unwrap_or(Look::Text);
    if look == Look::Text {
        let text = output.text_style().apply(text);
        output.print_raw(text);
        return Ok(());
    }

    let mut fields = vec!["helpMsg".to_string()];
    let mut item = Map::new();
    item.insert("helpMsg".to_string(), JsonValue::String(text.to_string()));

    let record = settings.get_string("record");
    if !record.is_empty() && record != "off" {
        fields.push("recordLog".to_string());
        item.insert("recordLog".to_string(), JsonValue::String(record));
    }
    if let Some(user) = user_id(settings.env()) {
        fields.push("userId".to_string());
        item.insert("userId".to_string(), JsonValue::String(user));
    }

    let verbosity = Verbosity::from_settings(settings);
    let data = Data::new("usage", verbosity.as_str())
        .with_fields(fields)
        .with_items(vec![JsonValue::Object(item)]);
    let response = Response::new(settings.get_string("apiver"), HELP_CONTEXT).with_data(data);
    emit_response(output, response)
}
