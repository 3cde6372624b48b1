//! CLI support for previewing generated accounts.
//!
//! The preview reads a settings document and one field record, validates the
//! record, and shows the account entry the console would store. The binary
//! delegates to these functions so they can be exercised in tests without
//! spawning a subprocess.

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use mockable::Clock;
use tracing::{info, warn};

pub use config::{PreviewConfig, load_config};
pub use error::CliError;

use crate::account::{AccountComposer, AccountEntry};
use crate::record::FieldRecord;
use crate::settings::TemplateSettings;
use crate::validation::ValidationReport;

/// Result of a preview run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// The record passed validation and an entry was composed.
    Created(AccountEntry),
    /// The record is missing required fields.
    Rejected(ValidationReport),
}

impl PreviewOutcome {
    /// Returns `true` when an entry was composed.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Loads the configured inputs and prepares the account entry.
///
/// # Errors
///
/// Returns [`CliError`] when a path is missing or unreadable, either document
/// fails to parse, the locale is unsupported, or strict mode finds
/// unresolved placeholders in the generated credentials.
pub fn run_preview(
    config: &PreviewConfig,
    clock: Arc<dyn Clock>,
) -> Result<PreviewOutcome, CliError> {
    let locale = config.locale()?;

    let (settings_dir, settings_file) = open_parent(config.settings_path()?, "--settings-path")?;
    let settings = TemplateSettings::from_file(&settings_dir, &settings_file)?;

    let (record_dir, record_file) = open_parent(config.record_path()?, "--record-path")?;
    let record = FieldRecord::from_file(&record_dir, &record_file)?;

    let composer = AccountComposer::new(clock);
    let entry = match composer.prepare_in(&record, &settings, locale) {
        Ok(entry) => entry,
        Err(report) => {
            info!(missing = report.len(), "record rejected");
            return Ok(PreviewOutcome::Rejected(report));
        }
    };

    let unresolved = entry.credentials().unresolved();
    if !unresolved.is_empty() {
        if config.strict {
            return Err(CliError::UnresolvedPlaceholders {
                placeholders: unresolved.into_iter().map(str::to_owned).collect(),
            });
        }
        warn!(placeholders = ?unresolved, "credentials contain unresolved placeholders");
    }

    info!(username = %entry.credentials().username, "account preview composed");
    Ok(PreviewOutcome::Created(entry))
}

/// Renders an outcome for display.
///
/// Created entries render as pretty-printed JSON; rejections render one
/// `field: message` line per missing field.
///
/// # Errors
///
/// Returns [`CliError::Render`] if the entry cannot be serialised.
pub fn render_outcome(outcome: &PreviewOutcome) -> Result<String, CliError> {
    match outcome {
        PreviewOutcome::Created(entry) => {
            serde_json::to_string_pretty(entry).map_err(|e| CliError::Render {
                message: e.to_string(),
            })
        }
        PreviewOutcome::Rejected(report) => Ok(report.to_string()),
    }
}

fn open_parent(path: &Path, flag: &'static str) -> Result<(Dir, Utf8PathBuf), CliError> {
    let utf8 = Utf8Path::from_path(path).ok_or_else(|| CliError::NonUtf8Path {
        flag,
        path: path.to_string_lossy().into_owned(),
    })?;
    let file_name = utf8.file_name().ok_or_else(|| CliError::NotAFile {
        flag,
        path: utf8.to_string(),
    })?;
    let parent = match utf8.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        CliError::OpenDirectory {
            path: parent.to_string(),
            message: e.to_string(),
        }
    })?;
    Ok((dir, Utf8PathBuf::from(file_name)))
}
