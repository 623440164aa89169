//! Common utility functions for lens output
//!
//! Shared output format selection and the serialization helpers every view
//! of the registry goes through.

use crate::error::{RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unified output format for all registry views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty table with borders (default)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Compact JSON (single line)
    Json,
    /// Pretty-printed JSON with indentation
    JsonPretty,
    /// JSON Lines format (one JSON object per line)
    JsonLine,
    /// Pipe-separated values with header
    Psv,
}

impl OutputFormat {
    /// Check if this is a JSON variant
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Check if this is a table variant
    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table | Self::Markdown)
    }

    /// Get a list of all format names for help text
    pub fn all_names() -> &'static [&'static str] {
        &[
            "table",
            "markdown",
            "json",
            "json-pretty",
            "json-line",
            "psv",
        ]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
            Self::JsonLine => write!(f, "json-line"),
            Self::Psv => write!(f, "psv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "pretty" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "json-pretty" | "jsonpretty" => Ok(Self::JsonPretty),
            "json-line" | "jsonline" | "jsonl" | "ndjson" => Ok(Self::JsonLine),
            "psv" | "pipe" => Ok(Self::Psv),
            _ => Err(format!(
                "Unknown output format '{}'. Valid formats: {}",
                s,
                Self::all_names().join(", ")
            )),
        }
    }
}

/// Serialize a list for one of the JSON formats
///
/// `JsonLine` writes one object per line; any non-JSON format falls back to
/// compact JSON.
pub fn to_json_list<T: Serialize>(items: &[T], format: OutputFormat) -> RegistryResult<String> {
    let rendered = match format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(items),
        OutputFormat::JsonLine => items
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()
            .map(|lines| lines.join("\n")),
        _ => serde_json::to_string(items),
    };
    rendered.map_err(|e| RegistryError::Render(e.to_string()))
}

/// Serialize a single value for one of the JSON formats
pub fn to_json_value<T: Serialize>(item: &T, format: OutputFormat) -> RegistryResult<String> {
    let rendered = match format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(item),
        _ => serde_json::to_string(item),
    };
    rendered.map_err(|e| RegistryError::Render(e.to_string()))
}

/// Make a field safe for pipe-separated output
pub fn psv_field(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
