//! Preset file format and round trips through the public API.

#![allow(clippy::unwrap_used)]

use pattern_analyzer_core::{
    AnalysisRequest, AnalysisType, ConnectionDescriptor, Credentials, Dialect, PresetStore,
};

fn oracle_request() -> AnalysisRequest {
    let descriptor = ConnectionDescriptor::new(Dialect::Oracle, "ora.internal", "ORCLPDB1")
        .with_port(1522)
        .with_credentials(Credentials::new(
            "scott".to_string(),
            Some("tiger".to_string()),
        ));
    AnalysisRequest::new(descriptor, AnalysisType::Regex)
        .with_column("HR", "EMPLOYEES", "EMAIL")
        .with_regex_pattern(r"^[A-Z]+$")
        .with_limit(250)
}

#[tokio::test]
async fn test_preset_file_is_a_list_of_named_requests() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presets.json");
    let store = PresetStore::new(&path);

    store.save("emails", &oracle_request()).await.unwrap();

    let raw = tokio::fs::read_to_string(&path).await.unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = document.as_array().unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "emails");
    assert_eq!(entries[0]["request"]["analysis_type"], "regex");
    assert_eq!(entries[0]["request"]["connection"]["dialect"], "oracle");
    assert_eq!(entries[0]["request"]["limit"], 250);
    assert!(entries[0]["saved_at"].is_string());
    assert!(!raw.contains("tiger"));
}

#[tokio::test]
async fn test_preset_reload_in_new_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presets.json");

    PresetStore::new(&path)
        .save("emails", &oracle_request())
        .await
        .unwrap();

    let reloaded = PresetStore::new(&path).get("emails").await.unwrap().unwrap();
    let mut expected = oracle_request();
    expected.connection.credentials.set_password(None);

    assert_eq!(reloaded.request, expected);
}
