//! CLI command implementations

pub mod init;
pub mod maintenance;
pub mod serve;
pub mod user;

use std::path::{Path, PathBuf};

use anyhow::Result;
use donow::config::Config;
use donow::store::Store;

/// Load config and apply a `--db` override
pub fn load_config(config_path: Option<&Path>, db: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(db) = db {
        config.storage.db_path = Some(db);
    }
    Ok(config)
}

/// Open the record store the config points at
pub fn open_store(config: &Config) -> Result<Store> {
    Store::open(&config.storage.db_path())
}
