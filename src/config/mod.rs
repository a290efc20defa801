pub mod model;

use anyhow::{Context, Result};
use std::path::PathBuf;

pub use model::ClientConfig;

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crabwire")
        .join("config.toml")
}

pub fn load_config() -> Result<ClientConfig> {
    let path = config_path();
    if !path.exists() {
        return Ok(ClientConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: ClientConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

pub fn save_config(config: &ClientConfig) -> Result<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config).with_context(|| "Failed to serialize config")?;
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
}
