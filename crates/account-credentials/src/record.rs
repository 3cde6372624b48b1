//! Field records supplied by the account form.
//!
//! A record is a flat, ordered set of named values. Values are either text or
//! numbers and render the way the console displays them: numbers in plain
//! base-10 without grouping, integral values without a fraction, and very
//! large or very small magnitudes in exponent form (`1e+21`, `1e-7`).

use std::fmt;

use camino::Utf8Path;
use cap_std::fs::Dir;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

use crate::error::RecordError;

/// A single value in a [`FieldRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Free text as typed into the form.
    Text(String),
    /// A numeric field such as `lead` or `ref`.
    Number(Number),
}

impl FieldValue {
    /// Renders the value as it appears inside generated text.
    ///
    /// # Examples
    ///
    /// ```
    /// use account_credentials::FieldValue;
    ///
    /// assert_eq!(FieldValue::from(42_i64).render(), "42");
    /// assert_eq!(FieldValue::from("Smith").render(), "Smith");
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => render_number(number),
        }
    }

    /// Returns `true` when the value counts as filled in.
    ///
    /// Empty text and numeric zero are treated as missing, matching how the
    /// form reports blank inputs.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Number(number) => number.as_f64().is_some_and(|value| value != 0.0),
        }
    }
}

fn render_number(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    let Some(value) = number.as_f64() else {
        return number.to_string();
    };
    if value == 0.0 {
        // Covers negative zero as well.
        return "0".to_owned();
    }
    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        return exponent_form(value);
    }
    if value.fract() == 0.0 {
        return format!("{value:.0}");
    }
    value.to_string()
}

/// Shortest digits with an explicit exponent sign, as in `1e+21` or `1.5e-7`.
fn exponent_form(value: f64) -> String {
    let formatted = format!("{value:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Number(number) => number.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}

struct FieldValueVisitor;

impl Visitor<'_> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a string or number")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(FieldValue::from(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(FieldValue::Text(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(FieldValue::from(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(FieldValue::from(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Number::from_f64(value)
            .map(FieldValue::Number)
            .ok_or_else(|| E::custom(format!("non-finite number {value}")))
    }
}

/// An ordered record of named form fields.
///
/// Insertion order is kept because it decides which key wins when two keys
/// differ only by case. Inserting an existing key replaces its value in
/// place.
///
/// # Example
///
/// ```
/// use account_credentials::FieldRecord;
///
/// let record = FieldRecord::from_json(r#"{"firstname": "Jo", "lead": 3}"#)
///     .expect("valid record");
///
/// assert_eq!(record.text("firstname"), "Jo");
/// assert_eq!(record.text("lead"), "3");
/// assert_eq!(record.text("phone"), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    entries: Vec<(String, FieldValue)>,
}

impl FieldRecord {
    /// Creates an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parses a record from a flat JSON object of strings and numbers.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::ParseError`] if the JSON is malformed, is not an
    /// object, or holds values other than strings and numbers.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        serde_json::from_str(json).map_err(|e| RecordError::ParseError {
            message: e.to_string(),
        })
    }

    /// Loads a record from a JSON file inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the file cannot be read or parsed.
    pub fn from_file(dir: &Dir, path: &Utf8Path) -> Result<Self, RecordError> {
        let contents = dir
            .read_to_string(path)
            .map_err(|e| RecordError::IoError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Self::from_json(&contents)
    }

    /// Sets `key` to `value`, replacing any existing value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let owned_key = key.into();
        let field_value = value.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| *existing == owned_key)
        {
            entry.1 = field_value;
            return;
        }
        self.entries.push((owned_key, field_value));
    }

    /// Removes `key` and returns its value, if present.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let position = self.entries.iter().position(|(existing, _)| existing == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Returns the value stored under exactly `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Returns the rendered value for `key`, or an empty string when absent.
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(FieldValue::render).unwrap_or_default()
    }

    /// Iterates over the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the record holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for FieldRecord {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for FieldRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldRecordVisitor)
    }
}

struct FieldRecordVisitor;

impl<'de> Visitor<'de> for FieldRecordVisitor {
    type Value = FieldRecord;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an object of string or number fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut record = FieldRecord::new();
        while let Some((key, value)) = access.next_entry::<String, FieldValue>()? {
            record.insert(key, value);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    //! Covers value rendering, truthiness, and record ordering.

    use rstest::rstest;

    use super::*;

    fn number(json: &str) -> FieldValue {
        FieldValue::Number(serde_json::from_str(json).expect("valid number"))
    }

    #[rstest]
    #[case("42", "42")]
    #[case("-7", "-7")]
    #[case("42.0", "42")]
    #[case("-0.0", "0")]
    #[case("3.5", "3.5")]
    #[case("1234567", "1234567")]
    #[case("18446744073709551615", "18446744073709551615")]
    #[case("1e20", "100000000000000000000")]
    #[case("1e21", "1e+21")]
    #[case("-1.5e300", "-1.5e+300")]
    #[case("0.000001", "0.000001")]
    #[case("1e-7", "1e-7")]
    #[case("-2.5e-8", "-2.5e-8")]
    fn numbers_render_like_the_form_displays_them(#[case] json: &str, #[case] expected: &str) {
        assert_eq!(number(json).render(), expected);
    }

    #[rstest]
    #[case(FieldValue::from(""), false)]
    #[case(FieldValue::from("x"), true)]
    #[case(FieldValue::from(" "), true)]
    #[case(FieldValue::from(0_i64), false)]
    #[case(FieldValue::from(5_u64), true)]
    fn presence_follows_form_truthiness(#[case] value: FieldValue, #[case] expected: bool) {
        assert_eq!(value.is_present(), expected);
    }

    #[test]
    fn float_zero_is_missing() {
        assert!(!number("0.0").is_present());
    }

    #[test]
    fn parsing_keeps_document_order() {
        let record =
            FieldRecord::from_json(r#"{"zeta": "z", "alpha": "a", "Mid": 1}"#).expect("valid");

        let keys: Vec<&str> = record.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "Mid"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut record: FieldRecord = [("a", FieldValue::from("1")), ("b", FieldValue::from("2"))]
            .into_iter()
            .collect();

        record.insert("a", "3");

        let pairs: Vec<(&str, String)> = record.iter().map(|(k, v)| (k, v.render())).collect();
        assert_eq!(pairs, vec![("a", "3".to_owned()), ("b", "2".to_owned())]);
    }

    #[test]
    fn remove_returns_the_value() {
        let mut record = FieldRecord::new();
        record.insert("phone", "555-1234");

        assert_eq!(record.remove("phone"), Some(FieldValue::from("555-1234")));
        assert!(record.is_empty());
        assert_eq!(record.remove("phone"), None);
    }

    #[rstest]
    #[case::null(r#"{"middlename": null}"#)]
    #[case::boolean(r#"{"active": true}"#)]
    #[case::nested(r#"{"address": {"city": "Lyon"}}"#)]
    #[case::array(r#"["firstname"]"#)]
    #[case::malformed("not json")]
    fn rejects_unsupported_documents(#[case] json: &str) {
        let result = FieldRecord::from_json(json);
        assert!(matches!(result, Err(RecordError::ParseError { .. })));
    }

    #[test]
    fn serializes_as_a_flat_object() {
        let record: FieldRecord = [
            ("firstname", FieldValue::from("Jo")),
            ("lead", FieldValue::from(3_i64)),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&record).expect("serialize");
        assert_eq!(json, r#"{"firstname":"Jo","lead":3}"#);
    }
}
