//! Error types for the account-credentials crate.
//!
//! Generation and required-field validation never fail; these enums cover
//! reading and writing the documents that feed them.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or saving a settings document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file at '{path}': {message}")]
    IoError {
        /// Path to the settings file.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The settings file could not be written.
    #[error("failed to write settings file at '{path}': {message}")]
    WriteError {
        /// Path that was being written.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The settings JSON is malformed.
    #[error("invalid settings JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The settings could not be serialised.
    #[error("failed to serialise settings: {message}")]
    SerializeError {
        /// Description of the serialisation error.
        message: String,
    },

    /// A mandatory format template is missing or blank.
    #[error("settings field '{field}' must not be empty")]
    EmptyFormat {
        /// Document key of the blank template.
        field: &'static str,
    },
}

/// Errors that can occur when loading a field record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The record file could not be read.
    #[error("failed to read record file at '{path}': {message}")]
    IoError {
        /// Path to the record file.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The record JSON is malformed or holds unsupported values.
    #[error("invalid record JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },
}
