//! Per-note sync state, persisted one JSON file per [`VectorId`].

use chrono::{Datelike, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::{
   Result,
   identity::VectorId,
   types::TrackedFile,
   vault::Vault,
};

/// Default sync-state directory, relative to the vault root.
pub const DEFAULT_SYNC_DIR: &str = ".cloudflare-ai/sync";

/// Metadata attached to a note's embedding and kept in its sync state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteMetadata {
   #[serde(default)]
   pub file_name:      String,
   #[serde(default)]
   pub extension:      String,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub created:        Option<i64>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub created_year:   Option<i32>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub created_month:  Option<u32>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub modified:       Option<i64>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub modified_year:  Option<i32>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub modified_month: Option<u32>,
}

impl NoteMetadata {
   /// Derives metadata from a file. Zero timestamps count as absent; year and
   /// month (1-based) are taken in local time.
   pub fn from_file(file: &TrackedFile) -> Self {
      let created = year_month(file.stat.ctime);
      let modified = year_month(file.stat.mtime);
      Self {
         file_name:      file.name.clone(),
         extension:      file.extension.clone(),
         created:        created.map(|_| file.stat.ctime),
         created_year:   created.map(|(y, _)| y),
         created_month:  created.map(|(_, m)| m),
         modified:       modified.map(|_| file.stat.mtime),
         modified_year:  modified.map(|(y, _)| y),
         modified_month: modified.map(|(_, m)| m),
      }
   }
}

fn year_month(epoch_ms: i64) -> Option<(i32, u32)> {
   if epoch_ms == 0 {
      return None;
   }
   let date = Local.timestamp_millis_opt(epoch_ms).single()?;
   Some((date.year(), date.month()))
}

/// Persisted record of a note's last successful embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
   pub id:            VectorId,
   pub path:          String,
   /// Wall-clock time of the sync, epoch milliseconds.
   pub last_sync:     i64,
   /// The note's modification time when it was synced.
   pub last_modified: i64,
   #[serde(default)]
   pub metadata:      NoteMetadata,
   /// Raw vectors are not kept locally; always written empty.
   #[serde(default)]
   pub vectors:       Vec<Vec<f32>>,
}

impl SyncState {
   pub fn new(id: VectorId, file: &TrackedFile, metadata: NoteMetadata) -> Self {
      Self {
         id,
         path: file.path.clone(),
         last_sync: Utc::now().timestamp_millis(),
         last_modified: file.stat.mtime,
         metadata,
         vectors: Vec::new(),
      }
   }
}

/// Key/value store of [`SyncState`] records on top of a vault's blob storage.
///
/// The state directory is created on first access. Writes for different ids
/// are independent; there is no transaction across notes.
pub struct SyncStateStore {
   dir:   String,
   ready: OnceCell<()>,
}

impl SyncStateStore {
   pub fn new(dir: impl Into<String>) -> Self {
      let dir = dir.into().trim_end_matches('/').to_string();
      Self { dir, ready: OnceCell::new() }
   }

   pub fn dir(&self) -> &str {
      &self.dir
   }

   pub fn state_path(&self, id: &VectorId) -> String {
      format!("{}/{id}.json", self.dir)
   }

   async fn ensure_dir(&self, vault: &(impl Vault + ?Sized)) -> Result<()> {
      self
         .ready
         .get_or_try_init(|| async {
            if !vault.exists(&self.dir).await? {
               tracing::debug!("creating sync state directory {}", self.dir);
               vault.mkdir(&self.dir).await?;
            }
            Ok::<(), crate::Error>(())
         })
         .await
         .map(|_| ())
   }

   /// Loads the state for `id`. Missing, unreadable or corrupt records all
   /// read as `None`; the latter two are logged.
   pub async fn load(&self, vault: &(impl Vault + ?Sized), id: &VectorId) -> Option<SyncState> {
      match self.try_load(vault, id).await {
         Ok(state) => state,
         Err(e) => {
            tracing::warn!(vector_id = %id, error = %e, "failed to read sync state");
            None
         },
      }
   }

   async fn try_load(
      &self,
      vault: &(impl Vault + ?Sized),
      id: &VectorId,
   ) -> Result<Option<SyncState>> {
      self.ensure_dir(vault).await?;
      let path = self.state_path(id);
      if !vault.exists(&path).await? {
         return Ok(None);
      }
      let content = vault.read_blob(&path).await?;
      Ok(Some(serde_json::from_str(&content)?))
   }

   /// Writes `state` under its own id, replacing any previous record.
   pub async fn save(&self, vault: &(impl Vault + ?Sized), state: &SyncState) -> Result<()> {
      self.ensure_dir(vault).await?;
      let content = serde_json::to_string_pretty(state)?;
      vault.write_blob(&self.state_path(&state.id), &content).await
   }
}

impl Default for SyncStateStore {
   fn default() -> Self {
      Self::new(DEFAULT_SYNC_DIR)
   }
}
