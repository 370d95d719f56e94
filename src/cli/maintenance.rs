//! One-off maintenance commands

use anyhow::Result;

use donow::config::Config;
use donow::report::system_views;
use donow::stats::StatsRecorder;

/// Recompute cached stats for every task of every user
pub fn recalc_command(config: &Config) -> Result<()> {
    let store = super::open_store(config)?;
    let updated = StatsRecorder::new(store).recalculate_all(None)?;
    println!("Recalculated stats for {} task(s)", updated);
    Ok(())
}

/// Drop and re-seed the built-in report views
pub fn reset_views_command(config: &Config) -> Result<()> {
    let store = super::open_store(config)?;
    let seeded = store.reset_system_views(&system_views())?;
    println!("Reset {} system view(s)", seeded);
    Ok(())
}
