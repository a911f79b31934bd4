//! Error types for BIM ingestion.

use crate::format::FileFormat;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the parser factory and the format parsers.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The path does not resolve to a file.
    #[error("file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The detector could not classify the input.
    #[error("unknown format{}", describe_path(.path.as_deref()))]
    UnknownFormat { path: Option<PathBuf> },

    /// The format is recognized but has no parser implementation.
    #[error("unsupported format: {format} files are recognized but no parser is available")]
    UnsupportedFormat { format: FileFormat },

    /// The file is readable but fails structural validation.
    #[error("malformed input: {message}")]
    MalformedInput { message: String },

    /// Failed to read the file from disk.
    #[error("failed to read file '{path}': {source}")]
    ParseFailure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The extraction engine failed for a reason unrelated to the input's structure.
    #[error("extraction engine failed: {message}")]
    Extraction { message: String },
}

impl ParseError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ParseError::MalformedInput {
            message: message.into(),
        }
    }

    /// Category of the failure, for callers that branch on it.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            ParseError::FileNotFound { .. } => FailureKind::FileNotFound,
            ParseError::UnknownFormat { .. } => FailureKind::UnknownFormat,
            ParseError::UnsupportedFormat { .. } => FailureKind::UnsupportedFormat,
            ParseError::MalformedInput { .. } => FailureKind::MalformedInput,
            ParseError::ParseFailure { .. } | ParseError::Extraction { .. } => {
                FailureKind::ParseFailure
            }
        }
    }
}

fn describe_path(path: Option<&Path>) -> String {
    path.map(|p| format!(" for '{}'", p.display()))
        .unwrap_or_default()
}

/// Coarse failure category of a [`ParseError`] or [`ExportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    FileNotFound,
    UnknownFormat,
    UnsupportedFormat,
    MalformedInput,
    ParseFailure,
    ExportFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::FileNotFound => "file-not-found",
            FailureKind::UnknownFormat => "unknown-format",
            FailureKind::UnsupportedFormat => "unsupported-format",
            FailureKind::MalformedInput => "malformed-input",
            FailureKind::ParseFailure => "parse-failure",
            FailureKind::ExportFailure => "export-failure",
        };
        f.write_str(name)
    }
}

/// Errors reported by an extraction engine.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The content violates the format's structure.
    #[error("{0}")]
    Malformed(String),

    /// The engine itself failed.
    #[error("{0}")]
    Engine(String),
}

impl From<ExtractionError> for ParseError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Malformed(message) => ParseError::MalformedInput { message },
            ExtractionError::Engine(message) => ParseError::Extraction { message },
        }
    }
}

/// Errors raised when building an element attribute bag.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributeError {
    /// Attribute keys must be non-empty.
    #[error("attribute key must not be empty")]
    EmptyKey,
}

/// Errors that can occur when exporting data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the file.
    #[error("failed to write data: {message}")]
    WriteError { message: String },

    /// Failed to serialize data to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },
}

impl ExportError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        FailureKind::ExportFailure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_errors_map_to_parse_error_kinds() {
        let malformed: ParseError = ExtractionError::Malformed("no DATA section".into()).into();
        assert_eq!(malformed.kind(), FailureKind::MalformedInput);
        assert_eq!(malformed.to_string(), "malformed input: no DATA section");

        let engine: ParseError = ExtractionError::Engine("out of memory".into()).into();
        assert_eq!(engine.kind(), FailureKind::ParseFailure);
    }

    #[test]
    fn unsupported_and_unknown_are_distinct() {
        let unsupported = ParseError::UnsupportedFormat {
            format: FileFormat::Dgn,
        };
        let unknown = ParseError::UnknownFormat {
            path: Some(PathBuf::from("notes.txt")),
        };
        assert_eq!(unsupported.kind(), FailureKind::UnsupportedFormat);
        assert_eq!(unknown.kind(), FailureKind::UnknownFormat);
        assert!(unsupported.to_string().contains("DGN"));
        assert_eq!(unknown.to_string(), "unknown format for 'notes.txt'");
        assert_eq!(
            ParseError::UnknownFormat { path: None }.to_string(),
            "unknown format"
        );
    }

    #[test]
    fn failure_kind_names() {
        assert_eq!(FailureKind::FileNotFound.to_string(), "file-not-found");
        assert_eq!(FailureKind::MalformedInput.to_string(), "malformed-input");
        assert_eq!(FailureKind::ExportFailure.to_string(), "export-failure");
    }

    #[test]
    fn export_errors_have_their_own_kind() {
        let err = ExportError::WriteError {
            message: "disk full".into(),
        };
        assert_eq!(err.kind(), FailureKind::ExportFailure);
        assert_eq!(err.to_string(), "failed to write data: disk full");
    }
}
