//! Init command implementation

use std::path::PathBuf;

use anyhow::Result;
use donow::config::Config;

/// Write the commented default config to `config_path` or ~/.donow/config.toml
pub fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);
    Config::write_default(&config_path, force)?;
    println!("Created: {}", config_path.display());
    Ok(())
}
