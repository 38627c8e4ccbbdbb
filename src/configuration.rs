use config::Config;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::*;

use crate::pid::PidConfig;
use crate::swerve_module::ModuleConfig;

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// Gearing shared by all four modules.
    #[serde(default)]
    pub module: ModuleConfig,
    #[serde(default)]
    pub drive_pid: PidConfig,
    #[serde(default)]
    pub turn_pid: PidConfig,
}

impl AppConfig {
    pub fn load_config(config: &Option<PathBuf>) -> anyhow::Result<Self> {
        let settings = if let Some(config) = config {
            info!("Using configuration from {:?}", config);
            Config::builder()
                .add_source(config::Environment::with_prefix("APP"))
                .add_source(config::File::with_name(
                    config
                        .to_str()
                        .ok_or_else(|| anyhow::anyhow!("Failed to convert path"))?,
                ))
                .build()?
        } else {
            info!("Using default configuration");
            Config::builder()
                .add_source(config::Environment::with_prefix("APP"))
                .add_source(config::File::with_name("config/settings"))
                .build()?
        };

        Ok(settings.try_deserialize()?)
    }
}
