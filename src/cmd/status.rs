//! Sync status command.
//!
//! Shows how many notes a pass would embed, without calling the remote
//! service.

use console::style;
use serde::Serialize;

use crate::{Result, cmd::CliEngine};

#[derive(Debug, Serialize)]
struct StatusReport {
   vault:          String,
   namespace:      String,
   markdown_files: usize,
   ignored:        usize,
   up_to_date:     usize,
   pending:        Vec<String>,
}

pub async fn execute(engine: &CliEngine, json: bool) -> Result<()> {
   let plan = engine.plan().await?;
   let report = StatusReport {
      vault:          engine.vault().root().display().to_string(),
      namespace:      engine.namespace().to_string(),
      markdown_files: plan.markdown_files,
      ignored:        plan.ignored,
      up_to_date:     plan.changes.current.len(),
      pending:        plan.changes.stale.into_iter().map(|f| f.path).collect(),
   };

   if json {
      println!("{}", serde_json::to_string_pretty(&report)?);
      return Ok(());
   }

   println!("{}", style(&report.vault).bold());
   println!("  namespace:   {}", report.namespace);
   println!("  notes:       {}", report.markdown_files);
   println!("  ignored:     {}", report.ignored);
   println!("  up to date:  {}", style(report.up_to_date).green());
   println!("  pending:     {}", style(report.pending.len()).yellow());
   for path in &report.pending {
      println!("    {}", style(path).dim());
   }
   Ok(())
}
