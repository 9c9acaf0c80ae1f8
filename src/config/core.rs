use super::ParmapConfig;
use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use std::path::Path;
use tracing::{debug, warn};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

impl ParmapConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    pub fn load_with_custom_config(custom_config: Option<&str>) -> Result<Self> {
        let config: ParmapConfig = Self::figment(custom_config)
            .extract()
            .context("Failed to read parmap configuration")?;
        config.validate()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Layered provider chain, lowest priority first
    pub fn figment(custom_config: Option<&str>) -> Figment {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // Embedded defaults

        // If custom config is specified, use only that + defaults + env vars
        if let Some(custom_path) = custom_config {
            if !Path::new(custom_path).exists() {
                warn!("Config file {} not found, using defaults", custom_path);
            }
            figment = match Path::new(custom_path).extension().and_then(|e| e.to_str()) {
                Some("json") => figment.merge(Json::file(custom_path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(custom_path)),
                _ => figment.merge(Toml::file(custom_path)),
            };
        } else {
            let user = Self::user_config_base();
            figment = figment
                // User config - support multiple formats
                .merge(Toml::file(format!("{user}.toml")))
                .merge(Json::file(format!("{user}.json")))
                .merge(Yaml::file(format!("{user}.yaml")))
                // Project config - support multiple formats
                .merge(Toml::file("parmap.toml"))
                .merge(Json::file("parmap.json"))
                .merge(Yaml::file("parmap.yaml"));
        }

        // Environment variables always have highest priority
        figment.merge(Env::prefixed("PARMAP_").split("__"))
    }

    /// Render the merged configuration
    pub fn render(&self, format: &str) -> Result<String> {
        match format {
            "json" => Ok(serde_json::to_string_pretty(self)?),
            "toml" => Ok(toml::to_string_pretty(self)?),
            other => anyhow::bail!("Unsupported config format '{other}' (expected toml or json)"),
        }
    }

    fn user_config_base() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{home}/.config/parmap/config"),
            Err(_) => "~/.config/parmap/config".to_string(),
        }
    }
}
