//! Error types for the preview CLI.

use thiserror::Error;

use crate::error::{RecordError, SettingsError};

/// Errors surfaced while loading inputs or rendering a preview.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    /// Configuration could not be loaded from arguments, environment, or files.
    #[error("configuration error: {message}")]
    Config {
        /// Loader error message.
        message: String,
    },
    /// A required path was not configured.
    #[error("missing required flag: {flag}")]
    MissingPath {
        /// Flag that was not supplied.
        flag: &'static str,
    },
    /// A configured path is not valid UTF-8.
    #[error("path for {flag} is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Flag the path was supplied for.
        flag: &'static str,
        /// Lossy rendering of the path.
        path: String,
    },
    /// A path does not name a file.
    #[error("path for {flag} does not name a file: {path}")]
    NotAFile {
        /// Flag the path was supplied for.
        flag: &'static str,
        /// Offending path.
        path: String,
    },
    /// The directory holding an input file could not be opened.
    #[error("failed to open directory '{path}': {message}")]
    OpenDirectory {
        /// Directory path.
        path: String,
        /// Error message from the OS.
        message: String,
    },
    /// The configured locale is not supported.
    #[error("unsupported locale '{value}' (expected en or fr)")]
    UnsupportedLocale {
        /// Locale value supplied.
        value: String,
    },
    /// The settings document could not be loaded.
    #[error("settings error: {source}")]
    Settings {
        /// Underlying settings error.
        #[from]
        #[source]
        source: SettingsError,
    },
    /// The field record could not be loaded.
    #[error("record error: {source}")]
    Record {
        /// Underlying record error.
        #[from]
        #[source]
        source: RecordError,
    },
    /// Strict mode found placeholders nothing resolved.
    #[error("unresolved placeholders: {}", placeholders.join(", "))]
    UnresolvedPlaceholders {
        /// Placeholders left in the credentials, in order of appearance.
        placeholders: Vec<String>,
    },
    /// The outcome could not be rendered.
    #[error("failed to render preview: {message}")]
    Render {
        /// Serialiser error message.
        message: String,
    },
}
