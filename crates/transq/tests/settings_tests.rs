//! Table-driven tests for settings loading and validation.

use transq::config::{load_settings, load_settings_from_str, EngineMode};
use transq::error::ConfigError;
use transq::paths::PathCase;

/// Represents a single settings loading test case.
struct SettingsTestCase {
    name: &'static str,
    json: &'static str,
    should_succeed: bool,
    /// Expected error substring (if should_succeed is false).
    expected_error: Option<&'static str>,
}

const SETTINGS_TESTS: &[SettingsTestCase] = &[
    SettingsTestCase {
        name: "minimal",
        json: r#"{"version": "1.0"}"#,
        should_succeed: true,
        expected_error: None,
    },
    SettingsTestCase {
        name: "full",
        json: r#"{
            "version": "1.0",
            "dataDir": "/var/lib/transq",
            "pathCase": "insensitive",
            "knownProviders": ["openai", "relay"],
            "knownModels": ["house-model"],
            "historyFile": "/var/lib/transq/history.json",
            "defaults": {
                "modelPath": "/models/m.gguf",
                "ctxSize": 8192,
                "temperature": 0.3,
                "engineMode": "pipeline",
                "cacheDir": "/cache"
            }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    SettingsTestCase {
        name: "wrong_version",
        json: r#"{"version": "2.0"}"#,
        should_succeed: false,
        expected_error: Some("Unsupported settings version"),
    },
    SettingsTestCase {
        name: "temperature_out_of_range",
        json: r#"{"version": "1.0", "defaults": {"temperature": 3.5}}"#,
        should_succeed: false,
        expected_error: Some("Temperature must be between 0 and 2"),
    },
    SettingsTestCase {
        name: "zero_context",
        json: r#"{"version": "1.0", "defaults": {"ctxSize": 0}}"#,
        should_succeed: false,
        expected_error: Some("Context size"),
    },
    SettingsTestCase {
        name: "empty_provider",
        json: r#"{"version": "1.0", "knownProviders": ["openai", " "]}"#,
        should_succeed: false,
        expected_error: Some("Provider name at index 1 is empty"),
    },
    SettingsTestCase {
        name: "not_json",
        json: "version: 1.0",
        should_succeed: false,
        expected_error: None,
    },
];

#[test]
fn test_settings_table() {
    for case in SETTINGS_TESTS {
        let result = load_settings_from_str(case.json);
        assert_eq!(
            result.is_ok(),
            case.should_succeed,
            "case '{}' returned {:?}",
            case.name,
            result.as_ref().err()
        );
        if let (Err(e), Some(expected)) = (&result, case.expected_error) {
            assert!(
                e.to_string().contains(expected),
                "case '{}': '{}' does not contain '{}'",
                case.name,
                e,
                expected
            );
        }
    }
}

#[test]
fn test_full_settings_values() {
    let settings = load_settings_from_str(SETTINGS_TESTS[1].json).unwrap();
    assert_eq!(settings.path_case, PathCase::Insensitive);
    assert_eq!(settings.known_providers, vec!["openai", "relay"]);
    assert_eq!(settings.defaults.ctx_size, 8192);
    assert_eq!(settings.defaults.engine_mode, EngineMode::Pipeline);
    assert_eq!(settings.defaults.concurrency, 1);
    assert_eq!(
        settings.storage_dir(),
        std::path::PathBuf::from("/var/lib/transq")
    );
}

#[test]
fn test_load_settings_missing_file() {
    let temp = tempfile::TempDir::new().unwrap();
    let err = load_settings(temp.path().join("settings.json")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}
