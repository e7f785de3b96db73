use std::fs;
use std::time::Duration;

use assert_matches::assert_matches;

use gene_annotator::config::{Config, ConfigLoader};
use gene_annotator::error::GannotError;

#[test]
fn defaults_apply_when_fields_missing() {
    let resolved = ConfigLoader::resolve_config(Config::default());
    assert_eq!(resolved.max_batch_size, 200);
    assert!(resolved.uniprot_enabled);
    assert!(resolved.ncbi_enabled);
    assert_eq!(resolved.retry.max_attempts, 5);
    assert_eq!(resolved.retry.base_backoff, Duration::from_secs(1));
    assert_eq!(resolved.request_timeout, Duration::from_secs(30));
    assert_eq!(resolved.request_delay, Duration::from_millis(100));
    assert!(resolved.batch_deadline.is_none());
}

#[test]
fn resolve_reads_file_overrides() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("gannot.json");
    fs::write(
        &path,
        r#"{
            "max_batch_size": 10,
            "ncbi_fallback_enabled": false,
            "retry_max_attempts": 2,
            "base_backoff_ms": 250,
            "batch_deadline_secs": 60
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(resolved.max_batch_size, 10);
    assert!(resolved.uniprot_enabled);
    assert!(!resolved.ncbi_enabled);
    assert_eq!(resolved.retry.max_attempts, 2);
    assert_eq!(resolved.retry.base_backoff, Duration::from_millis(250));
    assert_eq!(resolved.batch_deadline, Some(Duration::from_secs(60)));
}

#[test]
fn unknown_fields_are_ignored() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("gannot.json");
    fs::write(&path, r#"{ "max_batch_size": 5, "comment": "local override" }"#).unwrap();

    let resolved = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(resolved.max_batch_size, 5);
}

#[test]
fn missing_explicit_config_is_an_error() {
    let err = ConfigLoader::resolve(Some("/definitely/not/here/gannot.json")).unwrap_err();
    assert_matches!(err, GannotError::ConfigRead(_));
}

#[test]
fn invalid_json_is_a_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("gannot.json");
    fs::write(&path, "{ not json").unwrap();

    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();
    assert_matches!(err, GannotError::ConfigParse(_));
}
