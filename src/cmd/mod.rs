//! CLI command implementations for notesync.
//!
//! The binary is the scheduler the sync core expects: it runs a pass on
//! demand or on a timer and reports the result.

pub mod delete;
pub mod status;
pub mod sync;
pub mod vector_id;
pub mod watch;

use std::path::Path;

use crate::{
   config::Config,
   embed::AssistantClient,
   sync::{SyncEngine, SyncOptions},
   vault::LocalVault,
};

/// Engine wired to a local vault directory and the HTTP embedding service.
pub type CliEngine = SyncEngine<LocalVault, AssistantClient>;

pub fn open_engine(root: &Path, cfg: &Config) -> CliEngine {
   SyncEngine::new(
      LocalVault::new(root),
      AssistantClient::from_config(cfg),
      SyncOptions::from_config(cfg),
   )
}
