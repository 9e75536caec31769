//! Timer-driven sync command.

use std::time::Duration;

use console::style;
use tokio::{
   signal,
   time::{self, MissedTickBehavior},
};

use crate::{
   Error, Result,
   cmd::{CliEngine, sync},
   config::Config,
   error::ConfigError,
};

/// Runs a pass now and then every interval until Ctrl+C. A pass that has
/// started always runs to completion.
pub async fn execute(
   engine: &CliEngine,
   cfg: &Config,
   interval_mins: Option<u64>,
   force: bool,
) -> Result<()> {
   if !cfg.sync_enabled && !force {
      println!(
         "{}",
         style("Auto sync is disabled; set sync_enabled = true or pass --force").yellow()
      );
      return Ok(());
   }

   let period = interval_mins.map_or_else(
      || cfg.auto_sync_interval(),
      |mins| Duration::from_secs(mins.saturating_mul(60)),
   );
   if period.is_zero() {
      return Err(ConfigError::Invalid("sync interval must be at least one minute".into()).into());
   }

   let mut ticker = time::interval(period);
   ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

   println!(
      "{}",
      style(format!("Syncing every {} minutes", period.as_secs() / 60)).green()
   );
   println!("{}", style("Press Ctrl+C to stop").dim());

   loop {
      tokio::select! {
         _ = signal::ctrl_c() => {
            println!("\n{}", style("Stopping auto sync").yellow());
            return Ok(());
         }
         _ = ticker.tick() => {
            match sync::run_pass(engine, false).await {
               Ok(result) => sync::print_summary(&result),
               Err(e @ Error::NotConfigured(_)) => return Err(e),
               Err(e) => tracing::error!("sync pass failed: {e}"),
            }
         }
      }
   }
}
