use crate::config::AppConfig;
use crate::errors::{HarnessError, HarnessResult};
use clap::Args;
use std::path::PathBuf;
use tracing::warn;

#[derive(Args)]
pub struct ShowConfigCommand {
    /// Configuration file path (defaults to ./fsm-harness.toml discovery)
    #[arg(long)]
    config_path: Option<PathBuf>,
}

impl ShowConfigCommand {
    pub fn run(&self) -> HarnessResult<()> {
        let app_config = match AppConfig::load_from(self.config_path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                if self.config_path.is_some() {
                    return Err(HarnessError::Config(e.to_string()));
                }
                warn!("Failed to load configuration: {}", e);
                AppConfig::get_defaults()
            }
        };

        let rendered = toml::to_string_pretty(&app_config)
            .map_err(|e| HarnessError::Config(format!("TOML render error: {}", e)))?;
        println!("{}", rendered);
        Ok(())
    }
}
