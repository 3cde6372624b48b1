//! Placeholder substitution for credential templates.
//!
//! Templates are rendered in two ordered passes. Built-in placeholders with
//! derived values (`{FIRST2}`, `{lastname}`, `{REF}`, ...) are resolved first:
//! an exact-case sweep over the table, then a case-insensitive sweep so an
//! unexpected spelling such as `{Lastname}` still resolves. Whatever remains
//! is then matched against the record's own keys, case-insensitively.
//!
//! Every pattern is built from escaped placeholder text and replacements are
//! inserted literally, so neither field names nor field values are ever read
//! as regex syntax. Placeholders nothing resolves stay in the output as-is.

use std::sync::OnceLock;

use regex::{NoExpand, Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::credentials::GeneratedCredentials;
use crate::record::{FieldRecord, FieldValue};
use crate::settings::TemplateSettings;

/// Domain used by the fallback email address when settings name none.
pub const DEFAULT_EMAIL_DOMAIN: &str = "example.com";

/// A placeholder whose value is derived from the record and settings.
struct Builtin {
    token: &'static str,
    derive: fn(&FieldRecord, &TemplateSettings) -> Option<String>,
}

/// Table order matters for the case-insensitive sweep: the first entry
/// matching a spelling wins, so `{First2}` takes the original-case prefix.
const BUILTINS: [Builtin; 11] = [
    Builtin {
        token: "{FIRST2}",
        derive: |record, _| Some(first_name_prefix(record, 2)),
    },
    Builtin {
        token: "{FIRST3}",
        derive: |record, _| Some(first_name_prefix(record, 3)),
    },
    Builtin {
        token: "{first2}",
        derive: |record, _| Some(first_name_prefix(record, 2).to_lowercase()),
    },
    Builtin {
        token: "{first3}",
        derive: |record, _| Some(first_name_prefix(record, 3).to_lowercase()),
    },
    Builtin {
        token: "{firstname}",
        derive: |record, _| Some(record.text("firstname").to_lowercase()),
    },
    Builtin {
        token: "{lastname}",
        derive: |record, _| Some(record.text("lastname").to_lowercase()),
    },
    Builtin {
        token: "{SucAcc}",
        derive: |record, _| field_verbatim(record, "sucAcc"),
    },
    Builtin {
        token: "{REF}",
        derive: |record, _| field_verbatim(record, "ref"),
    },
    Builtin {
        token: "{lead}",
        derive: |record, _| field_verbatim(record, "lead"),
    },
    Builtin {
        token: "{leg}",
        derive: |record, _| field_verbatim(record, "leg"),
    },
    Builtin {
        token: "{emailDomain}",
        derive: |_, settings| settings.email_domain().map(str::to_owned),
    },
];

fn first_name_prefix(record: &FieldRecord, count: usize) -> String {
    record.text("firstname").chars().take(count).collect()
}

fn field_verbatim(record: &FieldRecord, key: &str) -> Option<String> {
    record.get(key).map(FieldValue::render)
}

/// Exact and case-insensitive matchers for one built-in token.
struct BuiltinPatterns {
    exact: Regex,
    any_case: Regex,
}

static BUILTIN_PATTERNS: OnceLock<Vec<BuiltinPatterns>> = OnceLock::new();

fn builtin_patterns() -> &'static [BuiltinPatterns] {
    BUILTIN_PATTERNS.get_or_init(|| {
        BUILTINS
            .iter()
            .map(|builtin| {
                let literal = regex::escape(builtin.token);
                let exact = Regex::new(&literal).unwrap_or_else(|error| {
                    panic!("pattern for {} failed to compile: {error}", builtin.token)
                });
                let any_case = RegexBuilder::new(&literal)
                    .case_insensitive(true)
                    .build()
                    .unwrap_or_else(|error| {
                        panic!("pattern for {} failed to compile: {error}", builtin.token)
                    });
                BuiltinPatterns { exact, any_case }
            })
            .collect()
    })
}

/// Substitutions prepared once per call and applied to every template.
struct Substitutions<'p> {
    builtins: Vec<(&'p BuiltinPatterns, String)>,
    fields: Vec<(Regex, String)>,
}

impl Substitutions<'static> {
    fn prepare(record: &FieldRecord, settings: &TemplateSettings) -> Self {
        let builtins = BUILTINS
            .iter()
            .zip(builtin_patterns())
            .filter_map(|(builtin, patterns)| {
                (builtin.derive)(record, settings).map(|value| (patterns, value))
            })
            .collect();

        let fields = record
            .iter()
            .filter_map(|(key, value)| field_pattern(key).map(|pattern| (pattern, value.render())))
            .collect();

        Self { builtins, fields }
    }
}

impl Substitutions<'_> {
    fn render(&self, template: &str) -> String {
        let mut output = template.to_owned();
        for (patterns, value) in &self.builtins {
            output = replace_literal(&patterns.exact, &output, value);
        }
        for (patterns, value) in &self.builtins {
            output = replace_literal(&patterns.any_case, &output, value);
        }
        for (pattern, value) in &self.fields {
            output = replace_literal(pattern, &output, value);
        }
        output
    }
}

/// Compiled size cap for one record-key pattern.
const FIELD_PATTERN_SIZE_LIMIT: usize = 1 << 20;

fn field_pattern(key: &str) -> Option<Regex> {
    if key.is_empty() || key.contains(['{', '}']) {
        return None;
    }
    let literal = regex::escape(&format!("{{{key}}}"));
    RegexBuilder::new(&literal)
        .case_insensitive(true)
        .size_limit(FIELD_PATTERN_SIZE_LIMIT)
        .build()
        .inspect_err(|error| {
            warn!(
                key_len = key.len(),
                error = %error,
                "skipping field placeholder that cannot be matched"
            );
        })
        .ok()
}

fn replace_literal(pattern: &Regex, text: &str, value: &str) -> String {
    pattern.replace_all(text, NoExpand(value)).into_owned()
}

fn fallback_email(record: &FieldRecord, settings: &TemplateSettings) -> String {
    let first = record.text("firstname").to_lowercase();
    let initial: String = record
        .text("lastname")
        .to_lowercase()
        .chars()
        .take(1)
        .collect();
    let domain = settings.email_domain().unwrap_or(DEFAULT_EMAIL_DOMAIN);
    format!("{first}{initial}@{domain}")
}

/// Derives a username, password, and email from `settings` for `record`.
///
/// The username and password come from their templates. The email comes
/// from the email template when one is set, otherwise it is the lowercased
/// first name, the lowercased first letter of the last name, `@`, and the
/// configured domain (or [`DEFAULT_EMAIL_DOMAIN`]).
///
/// Built-in placeholders:
///
/// | Placeholder | Value |
/// |---|---|
/// | `{FIRST2}` / `{FIRST3}` | first 2 / 3 characters of `firstname` |
/// | `{first2}` / `{first3}` | the same, lowercased |
/// | `{firstname}` / `{lastname}` | the field, lowercased |
/// | `{SucAcc}` `{REF}` `{lead}` `{leg}` | `sucAcc`, `ref`, `lead`, `leg` verbatim |
/// | `{emailDomain}` | the configured email domain |
///
/// Any other `{key}` naming a record field is replaced with that field's
/// value. The function never fails: missing names derive empty strings and
/// unknown placeholders pass through. Validate the record first with
/// [`crate::validate_required_fields`].
///
/// # Example
///
/// ```
/// use account_credentials::{FieldRecord, TemplateSettings, generate_credentials};
///
/// let settings = TemplateSettings::new("{phone}-user", "{unknown}");
/// let record: FieldRecord = [("phone", "555-1234".into())].into_iter().collect();
///
/// let credentials = generate_credentials(&record, &settings);
/// assert_eq!(credentials.username, "555-1234-user");
/// assert_eq!(credentials.password, "{unknown}");
/// assert_eq!(credentials.email, "@example.com");
/// ```
#[must_use]
pub fn generate_credentials(
    record: &FieldRecord,
    settings: &TemplateSettings,
) -> GeneratedCredentials {
    let substitutions = Substitutions::prepare(record, settings);
    debug!(
        builtins = substitutions.builtins.len(),
        fields = substitutions.fields.len(),
        "rendering credential templates"
    );

    let email = match settings.email_format() {
        Some(template) => substitutions.render(template),
        None => fallback_email(record, settings),
    };

    GeneratedCredentials {
        username: substitutions.render(settings.username_format()),
        password: substitutions.render(settings.password_format()),
        email,
    }
}
