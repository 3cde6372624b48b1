//! Composition of a validated record into an account entry.
//!
//! The composer is the single entry point the console uses when an account
//! form is submitted: it enforces the required fields named by the settings,
//! renders credentials, and stamps the entry with its creation time from an
//! injected clock.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::Serialize;
use tracing::{debug, warn};

use crate::credentials::GeneratedCredentials;
use crate::generator::generate_credentials;
use crate::record::{FieldRecord, FieldValue};
use crate::settings::TemplateSettings;
use crate::validation::{Locale, ValidationReport, validate_required_fields_in};

const MIDDLENAME_KEY: &str = "middlename";
const DISPLAY_DATE_KEY: &str = "displayDate";
const MIDDLENAME_PLACEHOLDER: &str = "none";
const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Keys the entry sets itself; same-named record fields are dropped.
const COMPOSED_KEYS: [&str; 6] = [
    "username",
    "password",
    "email",
    MIDDLENAME_KEY,
    DISPLAY_DATE_KEY,
    "createdAt",
];

/// One account ready to be stored.
///
/// Serialises as a single flat camelCase object holding the remaining record
/// fields, the credentials, `middlename`, `displayDate` (`YYYY-MM-DD`), and
/// `createdAt` (RFC 3339).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountEntry {
    #[serde(flatten)]
    fields: FieldRecord,
    #[serde(flatten)]
    credentials: GeneratedCredentials,
    middlename: String,
    display_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl AccountEntry {
    /// Record fields carried over, without the composed keys.
    #[must_use]
    pub const fn fields(&self) -> &FieldRecord {
        &self.fields
    }

    /// Generated credentials.
    #[must_use]
    pub const fn credentials(&self) -> &GeneratedCredentials {
        &self.credentials
    }

    /// Middle name, or `"none"` when the record had none.
    #[must_use]
    pub fn middlename(&self) -> &str {
        &self.middlename
    }

    /// Date shown in the account list.
    #[must_use]
    pub const fn display_date(&self) -> NaiveDate {
        self.display_date
    }

    /// Creation time taken from the composer's clock.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Builds [`AccountEntry`] values from submitted records.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use account_credentials::{AccountComposer, FieldRecord, TemplateSettings};
/// use mockable::DefaultClock;
///
/// let composer = AccountComposer::new(Arc::new(DefaultClock));
/// let settings = TemplateSettings::new("{first3}{lastname}", "{FIRST2}@")
///     .with_required_fields(["firstname", "lastname"]);
///
/// let rejected = composer.prepare(&FieldRecord::new(), &settings);
/// assert_eq!(rejected.map_err(|report| report.len()), Err(2));
///
/// let record: FieldRecord = [("firstname", "Jean".into()), ("lastname", "Dupont".into())]
///     .into_iter()
///     .collect();
/// let entry = composer.prepare(&record, &settings).expect("valid record");
/// assert_eq!(entry.credentials().username, "jeadupont");
/// assert_eq!(entry.middlename(), "none");
/// ```
#[derive(Clone)]
pub struct AccountComposer {
    clock: Arc<dyn Clock>,
}

impl AccountComposer {
    /// Creates a composer that timestamps entries with `clock`.
    #[must_use]
    pub const fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Validates `record` with English messages and composes an entry.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationReport`] when a required field is missing.
    pub fn prepare(
        &self,
        record: &FieldRecord,
        settings: &TemplateSettings,
    ) -> Result<AccountEntry, ValidationReport> {
        self.prepare_in(record, settings, Locale::default())
    }

    /// Validates `record` against the settings' required fields, then
    /// generates credentials and composes the entry.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationReport`], with messages in `locale`, when a
    /// required field is missing. Credentials are not generated in that case.
    pub fn prepare_in(
        &self,
        record: &FieldRecord,
        settings: &TemplateSettings,
        locale: Locale,
    ) -> Result<AccountEntry, ValidationReport> {
        let report = validate_required_fields_in(record, settings.required_fields(), locale);
        if !report.is_valid() {
            debug!(missing = report.len(), "record failed required-field checks");
            return Err(report);
        }
        let credentials = generate_credentials(record, settings);
        Ok(self.compose(record, credentials, settings))
    }

    /// Composes an entry from a record and credentials already generated
    /// for it. No validation is performed.
    #[must_use]
    pub fn compose(
        &self,
        record: &FieldRecord,
        credentials: GeneratedCredentials,
        settings: &TemplateSettings,
    ) -> AccountEntry {
        let created_at = self.clock.utc();
        let display_date = settings
            .allows_manual_date()
            .then(|| manual_display_date(record))
            .flatten()
            .unwrap_or_else(|| created_at.date_naive());

        let middlename = record
            .get(MIDDLENAME_KEY)
            .filter(|value| value.is_present())
            .map_or_else(|| MIDDLENAME_PLACEHOLDER.to_owned(), FieldValue::render);

        let fields = record
            .iter()
            .filter(|(key, _)| !COMPOSED_KEYS.contains(key))
            .map(|(key, value)| (key, value.clone()))
            .collect();

        AccountEntry {
            fields,
            credentials,
            middlename,
            display_date,
            created_at,
        }
    }
}

fn manual_display_date(record: &FieldRecord) -> Option<NaiveDate> {
    let raw = record
        .get(DISPLAY_DATE_KEY)
        .filter(|value| value.is_present())?
        .render();
    NaiveDate::parse_from_str(raw.trim(), DISPLAY_DATE_FORMAT)
        .inspect_err(|error| {
            warn!(value = %raw, error = %error, "ignoring unparseable display date");
        })
        .ok()
}
