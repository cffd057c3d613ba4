//! Configuration loading and root folder resolution
//!
//! Tests touching ADDRMAP_ROOT_FOLDER are #[serial] so they do not race on
//! the process environment.

use addrmap_common::config::{
    load_toml_config, CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
    DEFAULT_GEOCODER_URL, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();
    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root = RootFolderResolver::new().resolve();
    assert_eq!(root, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_priority_order() {
    env::remove_var(ROOT_FOLDER_ENV);

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/addrmap-from-toml")),
        ..TomlConfig::default()
    };

    // TOML beats the compiled default
    let root = RootFolderResolver::new().with_toml(&toml).resolve();
    assert_eq!(root, PathBuf::from("/tmp/addrmap-from-toml"));

    // Environment beats TOML
    env::set_var(ROOT_FOLDER_ENV, "/tmp/addrmap-from-env");
    let root = RootFolderResolver::new().with_toml(&toml).resolve();
    assert_eq!(root, PathBuf::from("/tmp/addrmap-from-env"));

    // CLI beats everything
    let root = RootFolderResolver::new()
        .with_toml(&toml)
        .with_cli_arg(Some(PathBuf::from("/tmp/addrmap-from-cli")))
        .resolve();
    assert_eq!(root, PathBuf::from("/tmp/addrmap-from-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_toml_config(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.geocoder.base_url, DEFAULT_GEOCODER_URL);
    assert_eq!(config.geocoder.rate_limit_ms, 1000);
    assert_eq!(config.map.zoom_delta, 0.01);
    assert!(config.location.is_none());
}

#[test]
fn test_partial_config_keeps_defaults_for_missing_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/data/addrmap"

[geocoder]
base_url = "http://localhost:8080"

[location]
latitude = -23.55
longitude = -46.63
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/data/addrmap")));
    assert_eq!(config.geocoder.base_url, "http://localhost:8080");
    assert_eq!(config.geocoder.timeout_secs, 30);
    assert_eq!(config.logging.level, "info");

    let location = config.location.unwrap();
    assert_eq!(location.latitude, -23.55);
    assert_eq!(location.longitude, -46.63);
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = [").unwrap();

    assert!(load_toml_config(&path).is_err());
}

#[test]
fn test_non_positive_zoom_delta_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[map]\nzoom_delta = 0.0\n").unwrap();

    assert!(load_toml_config(&path).is_err());
}

#[test]
fn test_initializer_creates_nested_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("a").join("b");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.store_path(), root.join("store"));
}
