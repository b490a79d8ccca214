// Tests for configuration loading

use anyhow::Result;
use speech_bridge::{Config, SessionConfig};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_defaults_without_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let missing = temp_dir.path().join("absent");

    let cfg = Config::load(missing.to_str().unwrap())?;

    assert_eq!(cfg.service.port, 9099);
    assert_eq!(cfg.service.http_port, None);
    assert_eq!(cfg.provider.task, "transcribe");
    assert!(cfg.provider.use_vad);
    assert_eq!(cfg.catalog.codecs, vec!["ulaw", "slin16"]);
    assert!(cfg.session.push_results);

    Ok(())
}

#[test]
fn test_file_overrides_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("bridge.toml");

    fs::write(
        &path,
        r#"
[service]
port = 9200

[provider]
url = "ws://engine:9090"
model = "large-v3"

[catalog]
codecs = ["slin16"]
languages = ["de-DE", "en-US"]

[session]
push_results = false
"#,
    )?;

    let cfg = Config::load(path.to_str().unwrap())?;

    assert_eq!(cfg.service.port, 9200);
    assert_eq!(cfg.service.bind, "0.0.0.0");
    assert_eq!(cfg.provider.url, "ws://engine:9090");
    assert_eq!(cfg.provider.model, "large-v3");
    assert!(!cfg.session.push_results);

    let session = SessionConfig::from_config(&cfg)?;
    assert_eq!(session.catalogs.codecs.default_value(), "slin16");
    assert_eq!(session.catalogs.languages.default_value(), "de-DE");
    assert!(!session.push_results);

    Ok(())
}

#[test]
fn test_empty_catalog_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("bridge.toml");

    fs::write(&path, "[catalog]\ncodecs = []\n")?;

    let cfg = Config::load(path.to_str().unwrap())?;
    assert!(SessionConfig::from_config(&cfg).is_err());

    Ok(())
}
