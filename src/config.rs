use crate::error::{FarmOpsError, Result};
use dialoguer::{Input, Password, Select};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub farm: FarmConfig,
    pub openweathermap: Option<OpenWeatherMapConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FarmConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub area_hectares: Option<f64>,
    pub default_spray_type: String,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    pub api_key: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(FarmOpsError::Config(format!(
                "Config file not found at {:?}. Run `farmops init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| FarmOpsError::Config(format!("Failed to read config: {}", e)))?;

        // Substitute environment variables
        let config_str = Self::substitute_env_vars(&config_str);

        let config: Config = serde_yaml::from_str(&config_str)
            .map_err(|e| FarmOpsError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        // Try current directory first
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        // Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("farmops").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        // Return XDG path as the default (will trigger "not found" in load)
        let default_path = dirs::config_dir()
            .ok_or_else(|| FarmOpsError::Config("Cannot determine config directory".into()))?
            .join("farmops")
            .join("config.yaml");
        Ok(default_path)
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/farmops/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FarmOpsError::Config("Cannot determine config directory".into()))?
            .join("farmops");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub async fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("No configuration found. Let's set up FarmOps!");
        println!();

        // --- Farm Profile ---
        println!("Farm Profile");
        let farm_name: String = Input::new()
            .with_prompt("  Farm name")
            .default("Home Farm".into())
            .interact_text()
            .map_err(|e| FarmOpsError::Config(format!("Input error: {}", e)))?;

        let spray_options = ["herbicide", "fungicide", "insecticide"];
        let spray_idx = Select::new()
            .with_prompt("  Default spray type")
            .items(&spray_options)
            .default(0)
            .interact()
            .map_err(|e| FarmOpsError::Config(format!("Input error: {}", e)))?;

        println!();

        // --- OpenWeatherMap (optional) ---
        println!("OpenWeatherMap (leave API key blank to skip forecasts)");
        let owm_api_key: String = Password::new()
            .with_prompt("  API key")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| FarmOpsError::Config(format!("Input error: {}", e)))?;

        println!();

        // --- Farm location ---
        println!("Farm location");
        let mut coordinates: Option<(f64, f64)> = None;

        if !owm_api_key.is_empty() {
            let query: String = Input::new()
                .with_prompt("  Search by place name (blank to enter coordinates)")
                .default(String::new())
                .allow_empty(true)
                .interact_text()
                .map_err(|e| FarmOpsError::Config(format!("Input error: {}", e)))?;

            if !query.is_empty() {
                coordinates = Self::search_coordinates(&owm_api_key, &query).await?;
            }
        }

        let (latitude, longitude) = match coordinates {
            Some(coords) => coords,
            None => {
                let latitude: f64 = Input::new()
                    .with_prompt("  Latitude")
                    .default(41.5868)
                    .interact_text()
                    .map_err(|e| FarmOpsError::Config(format!("Input error: {}", e)))?;

                let longitude: f64 = Input::new()
                    .with_prompt("  Longitude")
                    .default(-93.6250)
                    .interact_text()
                    .map_err(|e| FarmOpsError::Config(format!("Input error: {}", e)))?;

                (latitude, longitude)
            }
        };

        println!();

        let openweathermap = if owm_api_key.is_empty() {
            None
        } else {
            Some(OpenWeatherMapConfig {
                api_key: owm_api_key,
                enabled: true,
            })
        };

        let config = Config {
            farm: FarmConfig {
                name: farm_name,
                latitude,
                longitude,
                area_hectares: None,
                default_spray_type: spray_options[spray_idx].to_string(),
            },
            openweathermap,
        };

        // Write to default config path
        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| FarmOpsError::Config(format!("Failed to serialize config: {}", e)))?;

        // Write with a header comment
        let content = format!(
            "# FarmOps Configuration\n# Generated by `farmops init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    /// Geocode a place name and let the user pick from the candidates.
    /// Returns None when the search finds nothing, so the caller can fall
    /// back to manual coordinate entry.
    async fn search_coordinates(api_key: &str, query: &str) -> Result<Option<(f64, f64)>> {
        use crate::datasources::OpenWeatherMapClient;

        let client = OpenWeatherMapClient::new(
            OpenWeatherMapConfig {
                api_key: api_key.to_string(),
                enabled: true,
            },
            0.0,
            0.0,
        );

        let locations = match client.search_locations(query).await {
            Ok(locations) => locations,
            Err(e) => {
                println!("  Location search failed: {}", e);
                return Ok(None);
            }
        };

        if locations.is_empty() {
            println!("  No locations matched '{}'", query);
            return Ok(None);
        }

        let items: Vec<String> = locations
            .iter()
            .map(|l| format!("{} ({:.4}, {:.4})", l.describe(), l.latitude, l.longitude))
            .collect();

        let idx = Select::new()
            .with_prompt("  Select location")
            .items(&items)
            .default(0)
            .interact()
            .map_err(|e| FarmOpsError::Config(format!("Input error: {}", e)))?;

        Ok(Some((locations[idx].latitude, locations[idx].longitude)))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        // Then check env var
        if let Ok(dir) = std::env::var("FARMOPS_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        // Use XDG data directory
        let data_dir = dirs::data_dir()
            .ok_or_else(|| FarmOpsError::Config("Cannot determine data directory".into()))?
            .join("farmops");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("farmops.db"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            farm: FarmConfig {
                name: "Home Farm".into(),
                latitude: 41.5868,
                longitude: -93.6250,
                area_hectares: None,
                default_spray_type: "herbicide".into(),
            },
            openweathermap: None,
        }
    }
}
