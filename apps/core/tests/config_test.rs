use histfind_core::config::{self, Browser, Config, ConfigError, SearchEngine};
use histfind_core::query::MAX_RESULTS;

#[test]
fn accepts_default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.browser, Browser::Firefox);
    assert_eq!(cfg.max_results as usize, MAX_RESULTS);
    assert_eq!(cfg.search_engine, SearchEngine::Google);
    assert_eq!(cfg.browser_app(), "firefox");
    assert!(cfg.config_path.to_string_lossy().contains("histfind"));
    assert!(config::validate(&cfg).is_ok());
}

#[test]
fn rejects_max_results_out_of_range() {
    let too_many = Config {
        max_results: 31,
        ..Default::default()
    };
    assert!(config::validate(&too_many).is_err());

    let none = Config {
        max_results: 0,
        ..Default::default()
    };
    assert!(config::validate(&none).is_err());
}

#[test]
fn missing_file_loads_defaults_at_requested_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.config_path, path);
    assert_eq!(cfg.browser, Browser::Firefox);
    assert!(!path.exists());
}

#[test]
fn parses_partial_toml_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "browser = \"zen\"\nsearch_engine = \"duckduckgo\"\nprofile_dir = \"/tmp/zen/abc.default\"\nmax_results = 10\n",
    )
    .unwrap();

    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.browser, Browser::Zen);
    assert_eq!(cfg.search_engine, SearchEngine::Duckduckgo);
    assert_eq!(cfg.max_results, 10);
    assert_eq!(cfg.browser_app(), "zen");
    assert_eq!(
        cfg.profile_dir.as_deref(),
        Some(std::path::Path::new("/tmp/zen/abc.default"))
    );
}

#[test]
fn invalid_values_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    std::fs::write(&path, "browser = \"netscape\"\n").unwrap();
    assert!(matches!(config::load(Some(&path)), Err(ConfigError::Parse(_))));

    std::fs::write(&path, "max_results = 500\n").unwrap();
    assert!(matches!(config::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

#[test]
fn save_then_load_preserves_preferences() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        browser: Browser::Librewolf,
        browser_app: Some("/opt/librewolf/librewolf".to_string()),
        search_engine: SearchEngine::Brave,
        max_results: 12,
        config_path: dir.path().join("nested").join("config.toml"),
        ..Default::default()
    };

    config::save(&cfg).unwrap();
    let loaded = config::load(Some(&cfg.config_path)).unwrap();
    assert_eq!(loaded, cfg);
    assert_eq!(loaded.browser_app(), "/opt/librewolf/librewolf");
}

#[test]
fn blank_browser_app_falls_back_to_browser_default() {
    let cfg = Config {
        browser: Browser::Floorp,
        browser_app: Some("   ".to_string()),
        ..Default::default()
    };
    assert_eq!(cfg.browser_app(), "floorp");
}
