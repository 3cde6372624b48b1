//! Template-based credential generation for the account console.
//!
//! The console collects a record of named fields for each prospective
//! account and derives a username, password, and email from site-wide format
//! templates. This crate holds that derivation together with the
//! required-field check that must pass before it runs. It has no knowledge of
//! the record store or the form that feed it.
//!
//! # Overview
//!
//! The crate supports:
//!
//! - Rendering `{placeholder}` templates against a field record, with
//!   built-in derived placeholders taking precedence over plain fields
//! - Validating records against a configurable list of required fields
//! - Loading, editing, and atomically saving the template settings document
//! - Composing a validated record and its credentials into an account entry
//!
//! # Example
//!
//! ```
//! use account_credentials::{
//!     FieldRecord, TemplateSettings, generate_credentials, validate_required_fields,
//! };
//!
//! let settings = TemplateSettings::new("{FIRST3}{lastname}{REF}", "{first2}!{SucAcc}")
//!     .with_email_domain("example.org");
//! let record: FieldRecord = [
//!     ("firstname", "Alice".into()),
//!     ("lastname", "Smith".into()),
//!     ("ref", 42_i64.into()),
//!     ("sucAcc", 7_i64.into()),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert!(validate_required_fields(&record, &["firstname", "lastname"]).is_valid());
//!
//! let credentials = generate_credentials(&record, &settings);
//! assert_eq!(credentials.username, "Alismith42");
//! assert_eq!(credentials.password, "al!7");
//! assert_eq!(credentials.email, "alices@example.org");
//! ```

mod account;
mod atomic_io;
mod credentials;
mod error;
mod generator;
pub mod preview_cli;
mod record;
mod settings;
mod validation;

pub use account::{AccountComposer, AccountEntry};
pub use credentials::{GeneratedCredentials, unresolved_placeholders};
pub use error::{RecordError, SettingsError};
pub use generator::{DEFAULT_EMAIL_DOMAIN, generate_credentials};
pub use record::{FieldRecord, FieldValue};
pub use settings::TemplateSettings;
pub use validation::{
    Locale, ValidationReport, validate_required_fields, validate_required_fields_in,
};
