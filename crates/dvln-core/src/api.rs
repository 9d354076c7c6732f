//! JSON response envelope
//!
//! ```text
//! { "apiVersion": "0.1", "context": "dvlnHelp",
//!   "data": { "id": 0, "kind": "usage", "verbosity": "regular",
//!             "fields": [...], "startIndex": 1, "items": [...] },
//!   "error": {...}, "note": {...}, "warning": {...} }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::output::Level;
use crate::settings::Settings;
use crate::Result;

/// Layout of JSON responses
///
/// Raw output is a single compact line. Otherwise each nesting level is
/// indented by `indent` spaces and every line after the first starts
/// with `prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonStyle {
    pub indent: usize,
    pub raw: bool,
    pub prefix: String,
}

impl Default for JsonStyle {
    fn default() -> Self {
        Self {
            indent: 2,
            raw: false,
            prefix: String::new(),
        }
    }
}

impl JsonStyle {
    /// Style from `jsonindentlevel`, `jsonraw` and `jsonprefix`
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            indent: usize::try_from(settings.get_int("jsonindentlevel")).unwrap_or(0),
            raw: settings.get_bool("jsonraw"),
            prefix: settings.get_string("jsonprefix"),
        }
    }

    /// Serialize `value` in this style, with a trailing newline
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        if self.raw {
            let mut json = serde_json::to_string(value)?;
            json.push('\n');
            return Ok(json);
        }

        let indent = " ".repeat(self.indent);
        let mut buf = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
        value.serialize(&mut serializer)?;
        let pretty = String::from_utf8_lossy(&buf);

        let mut json = String::with_capacity(pretty.len());
        for (index, line) in pretty.lines().enumerate() {
            if index > 0 {
                json.push_str(&self.prefix);
            }
            json.push_str(line);
            json.push('\n');
        }
        Ok(json)
    }
}

/// A message carried in a response's `error`, `note` or `warning`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMsg {
    pub message: String,
    pub code: i32,
    pub level: String,
}

impl ApiMsg {
    pub fn new(message: impl Into<String>, code: i32, level: Level) -> Self {
        Self {
            message: message.into().trim_end().to_string(),
            code,
            level: level.to_string(),
        }
    }
}

/// Note and warning waiting to be embedded in the next response
///
/// Only one of each is kept; a later warning replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseStore {
    note: Option<ApiMsg>,
    warning: Option<ApiMsg>,
}

impl ResponseStore {
    pub fn set_note(&mut self, note: ApiMsg) {
        self.note = Some(note);
    }

    pub fn set_warning(&mut self, warning: ApiMsg) {
        self.warning = Some(warning);
    }

    pub fn note(&self) -> Option<&ApiMsg> {
        self.note.as_ref()
    }

    pub fn warning(&self) -> Option<&ApiMsg> {
        self.warning.as_ref()
    }

    /// Remove and return the stored note and warning
    pub fn take(&mut self) -> (Option<ApiMsg>, Option<ApiMsg>) {
        (self.note.take(), self.warning.take())
    }
}

/// The `data` section of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data<T> {
    pub id: i64,
    pub kind: String,
    pub verbosity: String,
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start_index: Option<u32>,
    pub items: Vec<T>,
}

impl<T> Data<T> {
    pub fn new(kind: impl Into<String>, verbosity: impl Into<String>) -> Self {
        Self {
            id: 0,
            kind: kind.into(),
            verbosity: verbosity.into(),
            fields: Vec::new(),
            start_index: None,
            items: Vec::new(),
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_start_index(mut self, index: u32) -> Self {
        self.start_index = Some(index);
        self
    }

    pub fn with_items(mut self, items: Vec<T>) -> Self {
        self.items = items;
        self
    }
}

/// A complete JSON response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    pub api_version: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Data<T>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ApiMsg>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<ApiMsg>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub warning: Option<ApiMsg>,
}

impl<T: Serialize> Response<T> {
    pub fn new(api_version: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            context: context.into(),
            data: None,
            error: None,
            note: None,
            warning: None,
        }
    }

    /// Response carrying only an error
    pub fn error(api_version: impl Into<String>, error: ApiMsg) -> Self {
        let mut response = Self::new(api_version, "");
        response.error = Some(error);
        response
    }

    pub fn with_data(mut self, data: Data<T>) -> Self {
        self.data = Some(data);
        self
    }

    /// Move the stored note and warning into this response
    pub fn with_stored(mut self, store: &mut ResponseStore) -> Self {
        let (note, warning) = store.take();
        self.note = note;
        self.warning = warning;
        self
    }

    /// Pretty printed JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        self.to_json_with(&JsonStyle::default())
    }

    pub fn to_json_with(&self, style: &JsonStyle) -> Result<String> {
        style.render(self)
    }
}
