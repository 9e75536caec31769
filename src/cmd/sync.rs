//! One-shot sync command.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{Result, cmd::CliEngine, types::SyncResult};

/// Executes a single sync pass and prints its summary.
pub async fn execute(engine: &CliEngine, json: bool) -> Result<()> {
   let result = run_pass(engine, !json).await?;
   if json {
      println!("{}", serde_json::to_string_pretty(&result)?);
   } else {
      print_summary(&result);
   }
   Ok(())
}

/// Runs one pass, optionally rendering a progress bar over its batches.
pub async fn run_pass(engine: &CliEngine, show_progress: bool) -> Result<SyncResult> {
   if !show_progress {
      return engine.sync(&mut ()).await;
   }

   let mut pb = ProgressBar::new(0);
   pb.set_style(
      ProgressStyle::default_bar()
         .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
         .unwrap_or_else(|_| ProgressStyle::default_bar())
         .progress_chars("█▓░"),
   );
   engine.sync(&mut pb).await
}

pub fn print_summary(result: &SyncResult) {
   println!(
      "{} {} synced or up to date, {} failed, {} skipped",
      style("●").green(),
      result.successful,
      result.failed,
      result.skipped
   );
   for failure in &result.errors {
      println!("  {} {}: {}", style("✗").red(), failure.file, style(&failure.error).dim());
   }
}
