// ==========================
// tests/unit/config_tests.rs
// ==========================
//! Unit tests for the configuration module
use backend_lib::config::{Settings, StorageBackend};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_settings_default() {
    let settings = Settings::default();

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.storage.path, PathBuf::from("data"));
    assert_eq!(settings.storage.backend, StorageBackend::FlatFile);
    assert_eq!(settings.auth_rate_limit.max_attempts, 5);
    assert_eq!(settings.auth_rate_limit.lockout_secs, 300);
}

#[test]
fn test_load_config_from_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config_content = r#"
        [server]
        host = "0.0.0.0"
        port = 8888

        [storage]
        backend = "memory"
        path = "test_data"

        [hashing]
        log_n = 10
        r = 8
        p = 1
    "#;
    fs::write(&config_path, config_content).unwrap();

    let settings = Settings::load_from(&config_path).unwrap();
    assert_eq!(settings.server.port, 8888);
    assert_eq!(settings.bind_addr().unwrap().to_string(), "0.0.0.0:8888");
    assert_eq!(settings.storage.backend, StorageBackend::Memory);
    assert_eq!(settings.storage.path, PathBuf::from("test_data"));
    assert_eq!(settings.hashing.log_n, 10);
}

#[test]
fn test_unknown_backend_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[storage]\nbackend = \"mongo\"\npath = \"x\"\n").unwrap();

    assert!(Settings::load_from(&config_path).is_err());
}

#[test]
fn test_shipped_default_config_is_valid() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../config/default.toml");
    let settings = Settings::load_from(path).unwrap();
    assert_eq!(settings.storage.backend, StorageBackend::FlatFile);
    assert_eq!(settings.session.ttl_secs, 604_800);
}
