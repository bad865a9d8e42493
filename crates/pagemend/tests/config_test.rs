use pagemend::config::{self, ConfigError, LOCAL_FILE};
use std::io::Write;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
scheduler:
  interval_ms: 1000
images:
  cdn_domains:
    - "cdn.example.net"
    "#
    )
    .unwrap();

    let config = config::read(file.path())
        .await
        .expect("Failed to load config from file");

    assert_eq!(config.scheduler.interval_ms, 1000);
    assert_eq!(config.images.cdn_domains, vec!["cdn.example.net".to_string()]);
    assert_eq!(config.images.recovery_attribute, "data-original-src");
}

#[tokio::test]
async fn test_empty_file_gives_defaults() {
    let file = NamedTempFile::new().unwrap();
    let config = config::read(file.path()).await.unwrap();
    assert_eq!(config.scheduler.interval_ms, 30000);
}

#[tokio::test]
async fn test_explicit_path_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    let err = config::load(Some(missing.as_path())).await.unwrap_err();
    assert!(matches!(err, ConfigError::Io { ref path, .. } if path == &missing));
}

#[tokio::test]
async fn test_invalid_yaml_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "scheduler: [not, a, map]").unwrap();
    let err = config::read(file.path()).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    let message = err.to_string();
    assert!(message.starts_with("Failed to parse"));
    assert!(message.contains(&file.path().display().to_string()));
}

#[test]
fn test_search_starts_in_working_directory() {
    let paths = config::search_paths();
    assert_eq!(paths[0], std::path::PathBuf::from(LOCAL_FILE));
    if dirs::home_dir().is_some() {
        assert_eq!(paths.len(), 2);
        assert!(paths[1].ends_with(".pagemend/config.yaml"));
    }
}
