//! TOML configuration on disk.

use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use cato::actors::PlaybackSettings;
use cato::diagnostics::SeverityWeights;
use cato::{Config, Error};

#[test]
fn test_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = assert_ok!(Config::load_from(&dir.path().join("cato.toml")));
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("cato.toml");

    let mut config = Config::default();
    config.timeline.exponent = 0.3;
    config.playback.speed = 12.0;
    config.playback.looping = true;
    config.diagnostics.bottleneck_threshold = 4;
    config.weights = SeverityWeights {
        critical: 40,
        high: 20,
        medium: 10,
        low: 5,
    };

    assert_ok!(config.save_to(&path));
    assert!(path.exists());
    let loaded = assert_ok!(Config::load_from(&path));
    assert_eq!(loaded, config);
    assert_eq!(loaded.analyzer().bottleneck_threshold, 4);
}

#[test]
fn test_partial_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cato.toml");
    std::fs::write(&path, "[weights]\ncritical = 50\n\n[playback]\ntick_interval_ms = 40\n").unwrap();

    let config = assert_ok!(Config::load_from(&path));
    assert_eq!(config.weights.critical, 50);
    assert_eq!(config.weights.high, 15);
    assert_eq!(config.playback.tick_interval_ms, 40);
    assert_eq!(config.timeline.exponent, 0.4);

    let settings = PlaybackSettings::from(&config.playback);
    assert_eq!(settings.tick_interval, std::time::Duration::from_millis(40));
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cato.toml");

    std::fs::write(&path, "[timeline]\nexponent = -0.5\n").unwrap();
    assert!(matches!(assert_err!(Config::load_from(&path)), Error::Validation(_)));

    std::fs::write(&path, "not = [valid").unwrap();
    assert!(matches!(assert_err!(Config::load_from(&path)), Error::TomlParse(_)));
}

#[test]
fn test_config_path_is_under_cato_dir() {
    if let (Ok(dir), Ok(path)) = (Config::cato_dir(), Config::config_path()) {
        assert!(dir.ends_with(".cato"));
        assert_eq!(path, dir.join("cato.toml"));
    }
}
