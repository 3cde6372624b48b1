//! Integration tests for loading and saving the settings document.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

mod test_support;

use account_credentials::{SettingsError, TemplateSettings};
use camino::Utf8Path;
use rstest::{fixture, rstest};
use test_support::{open_parent_dir, unique_temp_path, write_temp_file};

const RULES_JSON: &str = r#"{
    "id": "rules",
    "usernameFormat": "{FIRST3}{lastname}{REF}",
    "passwordFormat": "{FIRST2}success{SucAcc}@",
    "emailFormat": "",
    "emailDomain": "sucadm1.com",
    "allowManualDate": true,
    "requiredFields": ["firstname", "lastname", "lead"]
}"#;

#[fixture]
fn rules_path() -> camino::Utf8PathBuf {
    write_temp_file("settings", "rules.json", RULES_JSON).expect("write rules")
}

fn file_name(path: &Utf8Path) -> &Utf8Path {
    Utf8Path::new(path.file_name().expect("file name"))
}

#[rstest]
fn loads_settings_from_a_directory_handle(rules_path: camino::Utf8PathBuf) {
    let dir = open_parent_dir(&rules_path).expect("open dir");

    let settings = TemplateSettings::from_file(&dir, file_name(&rules_path)).expect("load");

    assert_eq!(settings.username_format(), "{FIRST3}{lastname}{REF}");
    assert_eq!(settings.email_format(), None);
    assert_eq!(settings.email_domain(), Some("sucadm1.com"));
    assert!(settings.allows_manual_date());
    assert_eq!(settings.required_fields(), ["firstname", "lastname", "lead"]);
}

#[rstest]
fn edits_survive_an_atomic_save(rules_path: camino::Utf8PathBuf) {
    let dir = open_parent_dir(&rules_path).expect("open dir");
    let name = file_name(&rules_path);
    let mut settings = TemplateSettings::from_file(&dir, name).expect("load");

    settings.set_required("lead", false);
    settings.set_required("phone", true);
    settings.set_required("phone", true);
    settings.write_to_file(&dir, name).expect("save");

    let reloaded = TemplateSettings::from_file(&dir, name).expect("reload");
    assert_eq!(reloaded, settings);
    assert_eq!(reloaded.required_fields(), ["firstname", "lastname", "phone"]);

    let leftovers: Vec<String> = dir
        .entries()
        .expect("list dir")
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|entry_name| entry_name.contains(".tmp."))
        .collect();
    assert!(leftovers.is_empty(), "staged files left behind: {leftovers:?}");
}

#[test]
fn saving_creates_a_new_document() {
    let path = unique_temp_path("settings-new", "rules.json").expect("temp path");
    let dir = open_parent_dir(&path).expect("open dir");
    let settings = TemplateSettings::new("{first3}{lastname}", "{FIRST2}@")
        .with_email_format("{firstname}.{lastname}@{emailDomain}")
        .with_email_domain("corp.example");

    settings
        .write_to_file(&dir, file_name(&path))
        .expect("save");

    let json = dir.read_to_string(file_name(&path)).expect("read back");
    assert!(json.contains("\"usernameFormat\": \"{first3}{lastname}\""));
    assert!(json.contains("\"emailFormat\""));
    let reloaded = TemplateSettings::from_json(&json).expect("parse");
    assert_eq!(reloaded, settings);
}

#[test]
fn missing_file_reports_its_path() {
    let path = unique_temp_path("settings-missing", "absent.json").expect("temp path");
    let dir = open_parent_dir(&path).expect("open dir");

    let err = TemplateSettings::from_file(&dir, file_name(&path)).expect_err("missing file");

    assert!(matches!(err, SettingsError::IoError { ref path, .. } if path == "absent.json"));
}

#[test]
fn saving_outside_the_directory_is_rejected() {
    let path = unique_temp_path("settings-escape", "rules.json").expect("temp path");
    let dir = open_parent_dir(&path).expect("open dir");
    let settings = TemplateSettings::new("u", "p");

    let err = settings
        .write_to_file(&dir, Utf8Path::new("../rules.json"))
        .expect_err("escape rejected");

    assert!(matches!(err, SettingsError::WriteError { .. }));
}

#[rstest]
fn blank_templates_are_refused_on_save(rules_path: camino::Utf8PathBuf) {
    let dir = open_parent_dir(&rules_path).expect("open dir");
    let name = file_name(&rules_path);
    let blank = TemplateSettings::new("", "  ");

    let err = blank.write_to_file(&dir, name).expect_err("blank refused");

    assert_eq!(
        err,
        SettingsError::EmptyFormat {
            field: "usernameFormat"
        }
    );
    let kept = TemplateSettings::from_file(&dir, name).expect("original still loads");
    assert_eq!(kept.username_format(), "{FIRST3}{lastname}{REF}");
}
