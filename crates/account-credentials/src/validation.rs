//! Required-field validation run before credentials are generated.
//!
//! A field counts as missing when it is absent, an empty string, or the
//! number zero. The check mirrors the form's truthiness rule rather than a
//! strict null check, so `{"lead": 0}` fails a `lead` requirement.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::record::{FieldRecord, FieldValue};

/// Language used for validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// French.
    Fr,
}

impl Locale {
    /// Parses a language tag such as `en`, `fr`, or `fr-CA`.
    ///
    /// Only the primary subtag is considered and matching ignores case.
    ///
    /// # Examples
    ///
    /// ```
    /// use account_credentials::Locale;
    ///
    /// assert_eq!(Locale::from_code("fr-CA"), Some(Locale::Fr));
    /// assert_eq!(Locale::from_code("EN"), Some(Locale::En));
    /// assert_eq!(Locale::from_code("de"), None);
    /// ```
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.trim().split(['-', '_']).next().unwrap_or_default();
        if primary.eq_ignore_ascii_case("en") {
            Some(Self::En)
        } else if primary.eq_ignore_ascii_case("fr") {
            Some(Self::Fr)
        } else {
            None
        }
    }

    /// Message reported for a missing required field.
    #[must_use]
    pub const fn required_field_message(self) -> &'static str {
        match self {
            Self::En => "This field is required.",
            Self::Fr => "Ce champ est obligatoire.",
        }
    }
}

/// Field name to error message for every failed requirement.
///
/// An empty report means the record is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: BTreeMap<String, String>,
}

impl ValidationReport {
    /// Returns `true` when no field failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` when no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message recorded for `field`, if it failed.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Iterates failed fields and their messages in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, message) in self.iter() {
            writeln!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Checks `record` against `required` using English messages.
///
/// See [`validate_required_fields_in`].
///
/// # Examples
///
/// ```
/// use account_credentials::{FieldRecord, validate_required_fields};
///
/// let empty = FieldRecord::new();
/// let report = validate_required_fields(&empty, &["firstname", "lastname"]);
/// assert_eq!(report.len(), 2);
/// assert_eq!(report.message_for("firstname"), Some("This field is required."));
///
/// let record: FieldRecord = [("firstname", "Jo".into())].into_iter().collect();
/// assert!(validate_required_fields(&record, &["firstname"]).is_valid());
/// ```
#[must_use]
pub fn validate_required_fields<S: AsRef<str>>(
    record: &FieldRecord,
    required: &[S],
) -> ValidationReport {
    validate_required_fields_in(record, required, Locale::default())
}

/// Checks `record` against `required`, rendering messages in `locale`.
///
/// Names are checked in the order given and duplicates are harmless. Fields
/// not listed are never checked, so an empty list always yields an empty
/// report.
#[must_use]
pub fn validate_required_fields_in<S: AsRef<str>>(
    record: &FieldRecord,
    required: &[S],
    locale: Locale,
) -> ValidationReport {
    let errors = required
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|field| !record.get(field).is_some_and(FieldValue::is_present))
        .map(|field| (field.to_owned(), locale.required_field_message().to_owned()))
        .collect();
    ValidationReport { errors }
}

#[cfg(test)]
mod tests {
    //! Covers truthiness, locale selection, and report rendering.

    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn record() -> FieldRecord {
        [
            ("firstname", FieldValue::from("Jo")),
            ("lastname", FieldValue::from("")),
            ("lead", FieldValue::from(0_i64)),
            ("leg", FieldValue::from(3_i64)),
        ]
        .into_iter()
        .collect()
    }

    #[rstest]
    #[case("firstname", true)]
    #[case("leg", true)]
    #[case("lastname", false)]
    #[case("lead", false)]
    #[case("middlename", false)]
    fn applies_truthiness(record: FieldRecord, #[case] field: &str, #[case] valid: bool) {
        let report = validate_required_fields(&record, &[field]);
        assert_eq!(report.is_valid(), valid);
    }

    #[rstest]
    fn empty_requirement_list_is_always_valid(record: FieldRecord) {
        let none: [&str; 0] = [];
        assert!(validate_required_fields(&record, &none).is_valid());
        assert!(validate_required_fields(&FieldRecord::new(), &none).is_valid());
    }

    #[rstest]
    fn duplicates_report_once(record: FieldRecord) {
        let report = validate_required_fields(&record, &["lead", "lead", "lastname"]);
        assert_eq!(report.len(), 2);
    }

    #[rstest]
    fn unlisted_fields_are_ignored(record: FieldRecord) {
        let report = validate_required_fields(&record, &["firstname"]);
        assert!(report.message_for("lastname").is_none());
    }

    #[test]
    fn accepts_owned_field_lists() {
        let required = vec!["firstname".to_owned()];
        let report = validate_required_fields(&FieldRecord::new(), &required);
        assert_eq!(
            report.message_for("firstname"),
            Some("This field is required.")
        );
    }

    #[rstest]
    fn renders_messages_in_locale(record: FieldRecord) {
        let report = validate_required_fields_in(&record, &["lead"], Locale::Fr);
        assert_eq!(report.message_for("lead"), Some("Ce champ est obligatoire."));
    }

    #[rstest]
    #[case("en", Some(Locale::En))]
    #[case(" en-GB ", Some(Locale::En))]
    #[case("fr_FR", Some(Locale::Fr))]
    #[case("FR", Some(Locale::Fr))]
    #[case("", None)]
    #[case("es", None)]
    fn parses_locale_codes(#[case] code: &str, #[case] expected: Option<Locale>) {
        assert_eq!(Locale::from_code(code), expected);
    }

    #[test]
    fn displays_one_line_per_field() {
        let report = validate_required_fields(&FieldRecord::new(), &["lastname", "firstname"]);
        assert_eq!(
            report.to_string(),
            "firstname: This field is required.\nlastname: This field is required.\n"
        );
    }

    #[test]
    fn serializes_as_a_flat_map() {
        let report = validate_required_fields(&FieldRecord::new(), &["ref"]);
        let json = serde_json::to_string(&report).expect("serialize report");
        assert_eq!(json, r#"{"ref":"This field is required."}"#);
    }
}
