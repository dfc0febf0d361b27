use fhub_kernel::config::{ConfigError, load_config, load_config_with_env};
use fhub_kernel::domain::config::FilesConfig;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("fhub.toml");
    fs::write(
        &path,
        r#"
[storage]
root = "/srv/files"

[links]
secret = "from-file"
ttl_seconds = 600
"#,
    )
    .unwrap();
    path
}

#[test]
fn file_values_fill_over_defaults() {
    let dir = TempDir::new().unwrap();
    let cfg: FilesConfig = load_config_with_env(Some(write_config(&dir)), Some(Default::default())).unwrap();

    assert_eq!(cfg.storage.root, std::path::PathBuf::from("/srv/files"));
    assert_eq!(cfg.storage.max_file_size, 5 * 1024 * 1024);
    assert_eq!(cfg.links.secret, "from-file");
    assert_eq!(cfg.links.ttl_seconds, 600);
    assert_eq!(cfg.cache.ttl_seconds, 120);
}

#[test]
fn environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let env = [
        ("FHUB__LINKS__SECRET", "from-env"),
        ("FHUB__STORAGE__MAX_FILE_SIZE", "2048"),
        ("FHUB__LINKS__CACHE_TTL_SECONDS", "60"),
        ("OTHER__LINKS__TTL_SECONDS", "1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect();

    let cfg: FilesConfig = load_config_with_env(Some(write_config(&dir)), Some(env)).unwrap();

    assert_eq!(cfg.links.secret, "from-env");
    assert_eq!(cfg.storage.max_file_size, 2048);
    assert_eq!(cfg.links.cache_ttl_seconds, Some(60));
    assert_eq!(cfg.links.ttl_seconds, 600);
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = load_config::<FilesConfig>(Some(dir.path().join("absent.toml")));

    let err = result.unwrap_err();
    assert!(matches!(err, ConfigError::Config { .. }));
    assert!(err.to_string().contains("Failed to build config"));
}
