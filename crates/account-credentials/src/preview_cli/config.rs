//! Preview configuration loaded via OrthoConfig.

use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use super::error::CliError;
use crate::validation::Locale;

/// Inputs for a credential preview.
///
/// Values come from `--flag` arguments, `ACCOUNT_CREDENTIALS_*` environment
/// variables, or a configuration file, in OrthoConfig's usual precedence.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACCOUNT_CREDENTIALS")]
pub struct PreviewConfig {
    /// Path to the template settings JSON document.
    pub settings_path: Option<PathBuf>,
    /// Path to the field record JSON document.
    pub record_path: Option<PathBuf>,
    /// Language for validation messages (`en` or `fr`).
    pub locale: Option<String>,
    /// Fail when credentials still contain placeholders.
    #[ortho_config(default = false)]
    pub strict: bool,
}

impl PreviewConfig {
    /// Return the settings path.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingPath`] when no path was configured.
    pub fn settings_path(&self) -> Result<&Path, CliError> {
        self.settings_path
            .as_deref()
            .ok_or(CliError::MissingPath {
                flag: "--settings-path",
            })
    }

    /// Return the record path.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingPath`] when no path was configured.
    pub fn record_path(&self) -> Result<&Path, CliError> {
        self.record_path.as_deref().ok_or(CliError::MissingPath {
            flag: "--record-path",
        })
    }

    /// Return the configured locale, falling back to English.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::UnsupportedLocale`] for codes other than English
    /// or French.
    pub fn locale(&self) -> Result<Locale, CliError> {
        self.locale.as_deref().map_or(Ok(Locale::default()), |code| {
            Locale::from_code(code).ok_or_else(|| CliError::UnsupportedLocale {
                value: code.to_owned(),
            })
        })
    }
}

/// Loads [`PreviewConfig`] from `args`, the environment, and config files.
///
/// The first item of `args` is the program name.
///
/// # Errors
///
/// Returns [`CliError::Config`] when arguments or sources fail to parse.
pub fn load_config<I, T>(args: I) -> Result<PreviewConfig, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    PreviewConfig::load_from_iter(args).map_err(|error| CliError::Config {
        message: error.to_string(),
    })
}
