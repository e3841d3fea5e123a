//! Error types for the A2UI wire protocol

use thiserror::Error;

/// Result type for protocol operations
pub type ProtocolResult<T> = Result<T, ValidationError>;

/// A transport line that could not be decoded into JSON
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Invalid JSON on line {line}, column {column}: {message}")]
    InvalidJson {
        line: usize,
        column: usize,
        message: String,
        raw: String,
    },

    #[error("Invalid UTF-8 on line {line}")]
    InvalidUtf8 { line: usize },
}

impl ParseError {
    pub fn invalid_json(line: usize, err: &serde_json::Error, raw: impl Into<String>) -> Self {
        Self::InvalidJson {
            line,
            column: err.column(),
            message: err.to_string(),
            raw: raw.into(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            ParseError::InvalidJson { line, .. } => *line,
            ParseError::InvalidUtf8 { line } => *line,
        }
    }
}

/// A well-formed JSON value that is not a usable server message
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Message must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("Message has no type field and no recognised envelope key")]
    MissingDiscriminant,

    #[error("{message_type} is missing required field '{field}'")]
    MissingField { message_type: String, field: String },

    #[error("Invalid {message_type}: {reason}")]
    InvalidMessage { message_type: String, reason: String },

    #[error("Invalid component '{id}': {reason}")]
    InvalidComponent { id: String, reason: String },
}

impl ValidationError {
    pub fn missing_field(message_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            message_type: message_type.into(),
            field: field.into(),
        }
    }

    pub fn invalid_message(message_type: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidMessage {
            message_type: message_type.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_component(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidComponent {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Per-line failure reported by the stream parser. Never aborts the stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Line {line}: {source}")]
    Validation {
        line: usize,
        raw: String,
        source: ValidationError,
    },
}

impl StreamError {
    pub fn line(&self) -> usize {
        match self {
            StreamError::Parse(err) => err.line(),
            StreamError::Validation { line, .. } => *line,
        }
    }

    /// Raw text of the offending line, when it was valid UTF-8
    pub fn raw(&self) -> Option<&str> {
        match self {
            StreamError::Parse(ParseError::InvalidJson { raw, .. }) => Some(raw),
            StreamError::Parse(ParseError::InvalidUtf8 { .. }) => None,
            StreamError::Validation { raw, .. } => Some(raw),
        }
    }
}

/// Returns a short name for the JSON kind of `value`, for error messages
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Pretty-print stream errors against the offending lines using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_errors(filename: &str, errors: &[StreamError]) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let mut output = Vec::new();

    for error in errors {
        let Some(raw) = error.raw() else {
            output.extend_from_slice(format!("Error: {}\n", error).as_bytes());
            continue;
        };

        let (span, label) = match error {
            StreamError::Parse(ParseError::InvalidJson {
                column, message, ..
            }) => {
                let start = column.saturating_sub(1).min(raw.len());
                let end = (start + 1).min(raw.len());
                (start..end, message.clone())
            }
            StreamError::Validation { source, .. } => (0..raw.len(), source.to_string()),
            StreamError::Parse(ParseError::InvalidUtf8 { .. }) => (0..0, String::new()),
        };

        let report = Report::build(ReportKind::Error, filename, span.start)
            .with_message(format!("line {}: {}", error.line(), error))
            .with_label(
                Label::new((filename, span))
                    .with_color(Color::Red)
                    .with_message(label),
            )
            .finish();

        if let Err(err) = report.write((filename, Source::from(raw)), &mut output) {
            tracing::warn!(error = %err, "Failed to render error report");
        }
    }

    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}
