use crate::error::{KisaanError, Result};
use crate::logic::RankingPolicy;
use crate::models::{DataMode, Location};
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MOCK_DATA_ENV: &str = "KISAAN_USE_MOCK_DATA";
pub const DATA_DIR_ENV: &str = "KISAAN_DATA_DIR";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub openweathermap: Option<OpenWeatherMapConfig>,
    #[serde(default)]
    pub weatherapi: Option<WeatherApiConfig>,
    #[serde(default)]
    pub openmeteo: OpenMeteoConfig,
    #[serde(default)]
    pub nominatim: NominatimConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
}

/// Starting location, New Delhi unless configured.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: "New Delhi, Delhi".into(),
            latitude: 28.6139,
            longitude: 77.2090,
        }
    }
}

impl LocationConfig {
    pub fn to_location(&self) -> Location {
        Location::new(self.name.clone(), self.latitude, self.longitude)
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    pub api_key: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct WeatherApiConfig {
    pub api_key: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl std::fmt::Debug for WeatherApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiConfig")
            .field("api_key", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenMeteoConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NominatimConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default)]
    pub mode: DataMode,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_minutes: i64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            mode: DataMode::RealTime,
            cache_ttl_minutes: default_cache_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdvisorConfig {
    /// Replacement crop catalog. The builtin one is used when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: u8,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            min_confidence: default_min_confidence(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl AdvisorConfig {
    pub fn policy(&self) -> RankingPolicy {
        RankingPolicy {
            inclusion_threshold: self.min_confidence.min(100),
            max_suggestions: self.max_suggestions,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_user_agent() -> String {
    format!(
        "kisaan/{} (crop advisory terminal app)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_cache_ttl() -> i64 {
    crate::cache::DEFAULT_TTL_MINUTES
}

fn default_min_confidence() -> u8 {
    RankingPolicy::default().inclusion_threshold
}

fn default_max_suggestions() -> usize {
    RankingPolicy::default().max_suggestions
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(KisaanError::Config(format!(
                "Config file not found at {:?}. Run `kisaan init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| KisaanError::Config(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_yaml(&config_str)?;
        config.apply_env_overrides();
        tracing::info!("Loaded configuration from {}", config_path.display());

        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(config_override: Option<PathBuf>) -> Result<Self> {
        if Self::exists(config_override.as_ref()) {
            return Self::load(config_override);
        }
        tracing::warn!("No configuration found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);
        serde_yaml::from_str(&content)
            .map_err(|e| KisaanError::Config(format!("Failed to parse config: {}", e)))
    }

    /// True when the environment forces mock data, overriding any saved mode.
    pub fn mock_forced_by_env() -> bool {
        mock_requested(std::env::var(MOCK_DATA_ENV).ok().as_deref())
    }

    fn apply_env_overrides(&mut self) {
        if Self::mock_forced_by_env() {
            tracing::info!("{} set, forcing mock data", MOCK_DATA_ENV);
            self.data.mode = DataMode::Mock;
        }
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("kisaan").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/kisaan/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| KisaanError::Config("Cannot determine config directory".into()))?
            .join("kisaan");
        Ok(config_dir.join("config.yaml"))
    }

    pub fn openweathermap_key(&self) -> Option<&str> {
        self.openweathermap
            .as_ref()
            .filter(|c| c.enabled)
            .and_then(|c| usable_key(&c.api_key))
    }

    pub fn weatherapi_key(&self) -> Option<&str> {
        self.weatherapi
            .as_ref()
            .filter(|c| c.enabled)
            .and_then(|c| usable_key(&c.api_key))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("No configuration found. Let's set up Kisaan!");
        println!();

        let defaults = LocationConfig::default();

        println!("Farm location");
        let name: String = Input::new()
            .with_prompt("  Place name")
            .default(defaults.name.clone())
            .interact_text()
            .map_err(|e| KisaanError::Config(format!("Input error: {}", e)))?;

        let latitude: f64 = Input::new()
            .with_prompt("  Latitude")
            .default(defaults.latitude)
            .interact_text()
            .map_err(|e| KisaanError::Config(format!("Input error: {}", e)))?;

        let longitude: f64 = Input::new()
            .with_prompt("  Longitude")
            .default(defaults.longitude)
            .interact_text()
            .map_err(|e| KisaanError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("OpenWeatherMap (leave API key blank to skip)");
        let owm_api_key: String = Password::new()
            .with_prompt("  API key")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| KisaanError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("WeatherAPI.com (leave API key blank to skip)");
        let weatherapi_key: String = Password::new()
            .with_prompt("  API key")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| KisaanError::Config(format!("Input error: {}", e)))?;

        println!();

        let openweathermap = (!owm_api_key.is_empty()).then(|| OpenWeatherMapConfig {
            api_key: owm_api_key,
            enabled: true,
        });
        let weatherapi = (!weatherapi_key.is_empty()).then(|| WeatherApiConfig {
            api_key: weatherapi_key,
            enabled: true,
        });

        let mode = if openweathermap.is_none() && weatherapi.is_none() {
            println!("No weather API keys given, starting in mock data mode.");
            DataMode::Mock
        } else {
            DataMode::RealTime
        };

        let config = Config {
            location: LocationConfig {
                name,
                latitude,
                longitude,
            },
            openweathermap,
            weatherapi,
            data: DataConfig {
                mode,
                ..Default::default()
            },
            ..Default::default()
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| KisaanError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# Kisaan Configuration\n# Generated by `kisaan init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        substitute_vars(content, |name| std::env::var(name).ok())
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| KisaanError::Config("Cannot determine data directory".into()))?
            .join("kisaan");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("kisaan.db"))
    }

    pub fn log_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("kisaan.log"))
    }
}

fn mock_requested(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes")
    )
}

/// Replace `${VAR}` placeholders using `lookup`. Unknown variables are left as is.
/// Blank keys and `${VAR}` placeholders left by an unset variable count as missing.
fn usable_key(key: &str) -> Option<&str> {
    let key = key.trim();
    (!key.is_empty() && !key.starts_with("${")).then_some(key)
}

fn substitute_vars(content: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
        Ok(re) => re,
        Err(_) => return content.to_string(),
    };

    re.replace_all(content, |caps: &regex_lite::Captures| {
        lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}
