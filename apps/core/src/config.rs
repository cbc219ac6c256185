use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::query::MAX_RESULTS;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Firefox,
    Zen,
    Librewolf,
    Floorp,
    Waterfox,
}

impl Browser {
    pub fn label(self) -> &'static str {
        match self {
            Self::Firefox => "Firefox",
            Self::Zen => "Zen",
            Self::Librewolf => "LibreWolf",
            Self::Floorp => "Floorp",
            Self::Waterfox => "Waterfox",
        }
    }

    pub fn default_app(self) -> &'static str {
        match self {
            Self::Firefox => "firefox",
            Self::Zen => "zen",
            Self::Librewolf => "librewolf",
            Self::Floorp => "floorp",
            Self::Waterfox => "waterfox",
        }
    }

    /// Directory holding the browser's profile folders on this platform.
    pub fn default_profiles_root(self) -> Option<PathBuf> {
        if cfg!(any(target_os = "windows", target_os = "macos")) {
            let vendor = match self {
                Self::Firefox if cfg!(target_os = "windows") => "Mozilla/Firefox",
                Self::Firefox => "Firefox",
                Self::Zen => "zen",
                Self::Librewolf => "librewolf",
                Self::Floorp => "Floorp",
                Self::Waterfox => "Waterfox",
            };
            return dirs::data_dir().map(|base| base.join(vendor).join("Profiles"));
        }

        let dot_dir = match self {
            Self::Firefox => ".mozilla/firefox",
            Self::Zen => ".zen",
            Self::Librewolf => ".librewolf",
            Self::Floorp => ".floorp",
            Self::Waterfox => ".waterfox",
        };
        dirs::home_dir().map(|home| home.join(dot_dir))
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "firefox" => Some(Self::Firefox),
            "zen" => Some(Self::Zen),
            "librewolf" => Some(Self::Librewolf),
            "floorp" => Some(Self::Floorp),
            "waterfox" => Some(Self::Waterfox),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    Google,
    Duckduckgo,
    Bing,
    Brave,
    Startpage,
}

impl SearchEngine {
    /// URL prefix the percent-encoded query text is appended to.
    pub fn url_prefix(self) -> &'static str {
        match self {
            Self::Google => "https://www.google.com/search?q=",
            Self::Duckduckgo => "https://duckduckgo.com/?q=",
            Self::Bing => "https://www.bing.com/search?q=",
            Self::Brave => "https://search.brave.com/search?q=",
            Self::Startpage => "https://www.startpage.com/do/search?q=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: Browser,
    pub profile_dir: Option<PathBuf>,
    pub profiles_root: Option<PathBuf>,
    pub history_db_path: Option<PathBuf>,
    pub browser_app: Option<String>,
    pub search_engine: SearchEngine,
    pub max_results: u16,
    pub log_level: String,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: Browser::Firefox,
            profile_dir: None,
            profiles_root: None,
            history_db_path: None,
            browser_app: None,
            search_engine: SearchEngine::Google,
            max_results: MAX_RESULTS as u16,
            log_level: "info".to_string(),
            config_path: stable_app_data_dir().join(CONFIG_FILE_NAME),
        }
    }
}

impl Config {
    pub fn browser_app(&self) -> &str {
        self.browser_app
            .as_deref()
            .map(str::trim)
            .filter(|app| !app.is_empty())
            .unwrap_or_else(|| self.browser.default_app())
    }

    pub fn profiles_root(&self) -> Option<PathBuf> {
        self.profiles_root
            .clone()
            .or_else(|| self.browser.default_profiles_root())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Parse(error) => write!(f, "parse error: {error}"),
            Self::Serialize(error) => write!(f, "serialize error: {error}"),
            Self::Invalid(error) => write!(f, "invalid config: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialize(value)
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("histfind")
}

/// Reads the config at `path` (or the stable default location). A missing
/// file yields the defaults with `config_path` pointing at where it would be.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| stable_app_data_dir().join(CONFIG_FILE_NAME));

    let mut cfg = match std::fs::read_to_string(&config_path) {
        Ok(raw) => toml::from_str::<Config>(&raw)?,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(error) => return Err(error.into()),
    };
    cfg.config_path = config_path;

    validate(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    validate(cfg).map_err(ConfigError::Invalid)?;
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let encoded = toml::to_string_pretty(cfg)?;
    std::fs::write(&cfg.config_path, encoded)?;
    Ok(())
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.max_results == 0 || cfg.max_results as usize > MAX_RESULTS {
        return Err(format!("max_results must be between 1 and {MAX_RESULTS}"));
    }

    if cfg.config_path.as_os_str().is_empty() {
        return Err("config_path is required".into());
    }

    if let Some(path) = &cfg.history_db_path {
        if path.as_os_str().is_empty() {
            return Err("history_db_path must not be empty when set".into());
        }
    }

    if cfg.log_level.trim().is_empty() {
        return Err("log_level is required".into());
    }

    Ok(())
}
