//! Template settings document.
//!
//! The console keeps one "rules" document holding the username and password
//! templates, the email policy, and the list of required form fields. This
//! module parses that document, applies the checks the settings form
//! enforces, and writes edits back atomically.

use camino::Utf8Path;
use cap_std::fs::Dir;
use serde::{Deserialize, Serialize};

use crate::atomic_io::write_atomic;
use crate::error::SettingsError;

const USERNAME_FORMAT_KEY: &str = "usernameFormat";
const PASSWORD_FORMAT_KEY: &str = "passwordFormat";

/// Site-wide templates used to derive account credentials.
///
/// # Example
///
/// ```
/// use account_credentials::TemplateSettings;
///
/// let json = r#"{
///     "usernameFormat": "{FIRST3}{lastname}{REF}",
///     "passwordFormat": "{FIRST2}success{SucAcc}@",
///     "emailDomain": "sucadm1.com",
///     "requiredFields": ["firstname", "lastname"]
/// }"#;
///
/// let settings = TemplateSettings::from_json(json).expect("valid settings");
/// assert_eq!(settings.email_format(), None);
/// assert_eq!(settings.email_domain(), Some("sucadm1.com"));
/// assert!(settings.is_required("lastname"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSettings {
    username_format: String,
    password_format: String,
    email_format: Option<String>,
    email_domain: Option<String>,
    allow_manual_date: bool,
    required_fields: Vec<String>,
}

impl TemplateSettings {
    /// Creates settings with the given username and password templates.
    ///
    /// No email template or domain is set and no fields are required.
    /// Blank templates are accepted here but refused when saving.
    #[must_use]
    pub fn new(username_format: impl Into<String>, password_format: impl Into<String>) -> Self {
        Self {
            username_format: username_format.into(),
            password_format: password_format.into(),
            email_format: None,
            email_domain: None,
            allow_manual_date: false,
            required_fields: Vec::new(),
        }
    }

    /// Sets an explicit email template. A blank template clears it.
    #[must_use]
    pub fn with_email_format(mut self, email_format: impl Into<String>) -> Self {
        self.email_format = non_blank(Some(email_format.into()));
        self
    }

    /// Sets the email domain used by the fallback address. A blank domain
    /// clears it.
    #[must_use]
    pub fn with_email_domain(mut self, email_domain: impl Into<String>) -> Self {
        self.email_domain = non_blank(Some(email_domain.into()));
        self
    }

    /// Replaces the required field list.
    #[must_use]
    pub fn with_required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Allows records to carry their own display date.
    #[must_use]
    pub fn with_manual_dates(mut self, allow: bool) -> Self {
        self.allow_manual_date = allow;
        self
    }

    /// Parses settings from the JSON document.
    ///
    /// Keys the document may also carry, such as a store-assigned `id`, are
    /// ignored. Blank `emailFormat` and `emailDomain` values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if:
    /// - The JSON is malformed or has wrongly typed values
    /// - `usernameFormat` or `passwordFormat` is missing or blank
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let raw: RawTemplateSettings =
            serde_json::from_str(json).map_err(|e| SettingsError::ParseError {
                message: e.to_string(),
            })?;

        Self::from_raw(raw)
    }

    /// Loads settings from a JSON file inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file cannot be read or parsed.
    pub fn from_file(dir: &Dir, path: &Utf8Path) -> Result<Self, SettingsError> {
        let contents = dir
            .read_to_string(path)
            .map_err(|e| SettingsError::IoError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Self::from_json(&contents)
    }

    fn from_raw(raw: RawTemplateSettings) -> Result<Self, SettingsError> {
        let username_format =
            non_blank(raw.username_format).ok_or(SettingsError::EmptyFormat {
                field: USERNAME_FORMAT_KEY,
            })?;
        let password_format =
            non_blank(raw.password_format).ok_or(SettingsError::EmptyFormat {
                field: PASSWORD_FORMAT_KEY,
            })?;

        Ok(Self {
            username_format,
            password_format,
            email_format: non_blank(raw.email_format),
            email_domain: non_blank(raw.email_domain),
            allow_manual_date: raw.allow_manual_date.unwrap_or_default(),
            required_fields: raw.required_fields.unwrap_or_default(),
        })
    }

    /// Serialises the settings to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::EmptyFormat`] if the username or password
    /// template is blank, since [`TemplateSettings::from_json`] would refuse
    /// the document, and [`SettingsError::SerializeError`] if serialisation
    /// fails.
    pub fn to_json_pretty(&self) -> Result<String, SettingsError> {
        self.ensure_formats()?;
        let document = SettingsDocument {
            username_format: &self.username_format,
            password_format: &self.password_format,
            email_format: self.email_format.as_deref(),
            email_domain: self.email_domain.as_deref(),
            allow_manual_date: self.allow_manual_date,
            required_fields: &self.required_fields,
        };
        serde_json::to_string_pretty(&document).map_err(|e| SettingsError::SerializeError {
            message: e.to_string(),
        })
    }

    /// Writes the settings to `path` inside `dir`, replacing it atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if serialisation or the write fails.
    pub fn write_to_file(&self, dir: &Dir, path: &Utf8Path) -> Result<(), SettingsError> {
        let json = self.to_json_pretty()?;
        write_atomic(dir, path, &json)
    }

    fn ensure_formats(&self) -> Result<(), SettingsError> {
        for (field, template) in [
            (USERNAME_FORMAT_KEY, &self.username_format),
            (PASSWORD_FORMAT_KEY, &self.password_format),
        ] {
            if template.trim().is_empty() {
                return Err(SettingsError::EmptyFormat { field });
            }
        }
        Ok(())
    }

    /// Marks `field` as required or optional.
    ///
    /// Marking a field required twice keeps a single entry; marking it
    /// optional drops every entry with that name.
    pub fn set_required(&mut self, field: &str, required: bool) {
        if required {
            if !self.is_required(field) {
                self.required_fields.push(field.to_owned());
            }
        } else {
            self.required_fields.retain(|existing| existing != field);
        }
    }

    /// Returns `true` when `field` is in the required list.
    #[must_use]
    pub fn is_required(&self, field: &str) -> bool {
        self.required_fields.iter().any(|existing| existing == field)
    }

    /// Returns the username template.
    #[must_use]
    pub fn username_format(&self) -> &str {
        &self.username_format
    }

    /// Returns the password template.
    #[must_use]
    pub fn password_format(&self) -> &str {
        &self.password_format
    }

    /// Returns the explicit email template, if one is set.
    #[must_use]
    pub fn email_format(&self) -> Option<&str> {
        self.email_format.as_deref()
    }

    /// Returns the email domain, if one is set.
    #[must_use]
    pub fn email_domain(&self) -> Option<&str> {
        self.email_domain.as_deref()
    }

    /// Returns `true` when records may carry their own display date.
    #[must_use]
    pub const fn allows_manual_date(&self) -> bool {
        self.allow_manual_date
    }

    /// Returns the required field names in stored order.
    #[must_use]
    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Raw JSON representation for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTemplateSettings {
    username_format: Option<String>,
    password_format: Option<String>,
    email_format: Option<String>,
    email_domain: Option<String>,
    allow_manual_date: Option<bool>,
    required_fields: Option<Vec<String>>,
}

/// Borrowed JSON representation for serialization.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsDocument<'a> {
    username_format: &'a str,
    password_format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_format: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_domain: Option<&'a str>,
    allow_manual_date: bool,
    required_fields: &'a [String],
}
