//! Note synchronization engine.
//!
//! A pass lists the vault's markdown notes, drops ignored folders, counts the
//! notes whose stored state is current, and runs the rest through the
//! embedding pipeline in fixed-size batches. Per-note failures are folded into
//! the [`SyncResult`]; only a missing remote configuration fails the pass.

use std::{error::Error as _, time::Duration};

use indicatif::ProgressBar;

use crate::{
   Error, Result,
   batch::{BatchScheduler, Settled},
   change::{self, ChangeSet, IgnoredFolders, is_current},
   config::Config,
   embed::{EmbeddingApi, EmbeddingRequest},
   identity::VectorId,
   state::{NoteMetadata, SyncState, SyncStateStore},
   types::{SyncFailure, SyncResult, TrackedFile},
   vault::Vault,
};

/// Options for a [`SyncEngine`], usually derived from [`Config`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
   pub ignored_folders: IgnoredFolders,
   pub batch_size:      usize,
   /// Remote namespace; the vault name when unset.
   pub namespace:       Option<String>,
   pub sync_dir:        String,
   /// Upper bound for one create-embedding call.
   pub request_timeout: Option<Duration>,
}

impl Default for SyncOptions {
   fn default() -> Self {
      Self::from_config(&Config::default())
   }
}

impl SyncOptions {
   pub fn from_config(cfg: &Config) -> Self {
      Self {
         ignored_folders: IgnoredFolders::new(&cfg.ignored_folders),
         batch_size:      cfg.batch_size,
         namespace:       cfg.namespace.clone(),
         sync_dir:        cfg.sync_dir.clone(),
         request_timeout: cfg.request_timeout(),
      }
   }
}

/// What happened to one note in a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
   /// The note was embedded and its state written.
   Synced,
   /// The note's state turned out to be current when re-checked.
   AlreadyCurrent,
   /// The note is empty or whitespace only.
   EmptyContent,
   /// The remote service answered with an empty result.
   EmptyReply,
   Failed(String),
}

/// Milestones of a sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
   Started { pending: usize, up_to_date: usize, batches: usize },
   BatchSettled { batch: usize, batches: usize, processed: usize, pending: usize },
   Completed(SyncResult),
}

/// Trait for receiving sync progress updates
pub trait SyncProgressCallback: Send {
   fn progress(&mut self, event: SyncEvent);
}

impl<F: FnMut(SyncEvent) + Send> SyncProgressCallback for F {
   fn progress(&mut self, event: SyncEvent) {
      self(event);
   }
}

impl SyncProgressCallback for () {
   fn progress(&mut self, _event: SyncEvent) {}
}

impl SyncProgressCallback for ProgressBar {
   fn progress(&mut self, event: SyncEvent) {
      match event {
         SyncEvent::Started { pending, up_to_date, .. } => {
            self.set_length(pending as u64);
            self.set_position(0);
            self.set_message(format!(
               "Starting sync for {pending} files ({up_to_date} already up to date)"
            ));
         },
         SyncEvent::BatchSettled { batch, batches, processed, .. } => {
            self.set_position(processed as u64);
            self.set_message(format!("batch {batch}/{batches}"));
         },
         SyncEvent::Completed(_) => self.finish_with_message("Sync completed"),
      }
   }
}

/// Candidate notes of a vault, split by sync need. Computed without any
/// remote call.
#[derive(Debug)]
pub struct SyncPlan {
   pub markdown_files: usize,
   pub ignored:        usize,
   pub changes:        ChangeSet,
}

/// Engine for synchronizing vault notes to the remote embedding index
pub struct SyncEngine<V: Vault, E: EmbeddingApi> {
   vault:     V,
   embedder:  E,
   state:     SyncStateStore,
   scheduler: BatchScheduler,
   options:   SyncOptions,
}

impl<V, E> SyncEngine<V, E>
where
   V: Vault,
   E: EmbeddingApi,
{
   pub fn new(vault: V, embedder: E, options: SyncOptions) -> Self {
      Self {
         state: SyncStateStore::new(options.sync_dir.clone()),
         scheduler: BatchScheduler::new(options.batch_size),
         vault,
         embedder,
         options,
      }
   }

   pub const fn vault(&self) -> &V {
      &self.vault
   }

   pub const fn embedder(&self) -> &E {
      &self.embedder
   }

   pub const fn state(&self) -> &SyncStateStore {
      &self.state
   }

   pub fn namespace(&self) -> &str {
      self
         .options
         .namespace
         .as_deref()
         .unwrap_or_else(|| self.vault.name())
   }

   fn validate(&self) -> Result<()> {
      if !self.embedder.is_configured() {
         return Err(Error::NotConfigured("missing api url or api key"));
      }
      Ok(())
   }

   /// Lists the candidate notes and classifies them against stored state.
   pub async fn plan(&self) -> Result<SyncPlan> {
      let files = self.vault.markdown_files().await?;
      let markdown_files = files.len();
      let candidates = change::candidates(files, &self.options.ignored_folders);
      let ignored = markdown_files - candidates.len();
      let changes = ChangeSet::detect(&self.vault, &self.state, candidates).await;
      Ok(SyncPlan { markdown_files, ignored, changes })
   }

   /// Runs one sync pass.
   ///
   /// Fails only when the embedding service is not configured, checked
   /// before any I/O, or when the vault cannot be listed at all.
   pub async fn sync(&self, callback: &mut dyn SyncProgressCallback) -> Result<SyncResult> {
      self.validate()?;

      let SyncPlan { changes, .. } = self.plan().await?;
      let pending = changes.stale.len();
      let batches = self.scheduler.batch_count(pending);
      let mut result = SyncResult { successful: changes.current.len(), ..Default::default() };

      tracing::info!(
         "starting sync for {pending} files ({} already up to date)",
         changes.current.len()
      );
      callback.progress(SyncEvent::Started {
         pending,
         up_to_date: changes.current.len(),
         batches,
      });

      let mut processed = 0usize;
      self
         .scheduler
         .run(
            &changes.stale,
            |file| self.sync_file(file),
            |settled| {
               let batch = settled.number;
               processed += settled.items.len();
               fold_batch(&mut result, settled);
               callback.progress(SyncEvent::BatchSettled {
                  batch,
                  batches,
                  processed,
                  pending,
               });
            },
         )
         .await;

      tracing::info!(
         successful = result.successful,
         failed = result.failed,
         skipped = result.skipped,
         "sync completed"
      );
      callback.progress(SyncEvent::Completed(result.clone()));
      Ok(result)
   }

   /// Processes one note, turning every error into [`FileOutcome::Failed`].
   pub async fn sync_file(&self, file: &TrackedFile) -> FileOutcome {
      match self.try_sync_file(file).await {
         Ok(outcome) => outcome,
         Err(e) => {
            tracing::error!(path = %file.path, error = %error_chain(&e), "failed to process note");
            FileOutcome::Failed(e.to_string())
         },
      }
   }

   async fn try_sync_file(&self, file: &TrackedFile) -> Result<FileOutcome> {
      tracing::debug!(path = %file.path, "processing note");

      let content = self.vault.read(file).await?;
      if is_blank(&content) {
         tracing::warn!(path = %file.path, "skipping empty note");
         return Ok(FileOutcome::EmptyContent);
      }

      // Another writer may have stored state since the pass was planned.
      let id = VectorId::from_file_name(&file.name);
      if is_current(self.state.load(&self.vault, &id).await.as_ref(), file) {
         tracing::debug!(path = %file.path, "note unchanged, skipping");
         return Ok(FileOutcome::AlreadyCurrent);
      }

      let metadata = NoteMetadata::from_file(file);
      let request =
         EmbeddingRequest::note(file.name.clone(), content, metadata.clone(), self.namespace());

      if self.create_embedding(&request).await?.is_none() {
         tracing::warn!(path = %file.path, "skipping note, no embedding returned");
         return Ok(FileOutcome::EmptyReply);
      }

      self
         .state
         .save(&self.vault, &SyncState::new(id, file, metadata))
         .await?;
      tracing::debug!(path = %file.path, "note synced");
      Ok(FileOutcome::Synced)
   }

   async fn create_embedding(&self, request: &EmbeddingRequest) -> Result<Option<serde_json::Value>> {
      let call = self.embedder.create_embedding(request);
      match self.options.request_timeout {
         Some(after) => tokio::time::timeout(after, call)
            .await
            .map_err(|_| Error::Timeout { op: "create embedding", after })?,
         None => call.await,
      }
   }
}

/// Blank means only whitespace, counting a byte-order mark as whitespace.
fn is_blank(content: &str) -> bool {
   content
      .trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
      .is_empty()
}

fn fold_batch(result: &mut SyncResult, settled: Settled<'_, TrackedFile, FileOutcome>) {
   for (file, outcome) in settled.items.iter().zip(settled.outcomes) {
      match outcome {
         Ok(FileOutcome::Synced | FileOutcome::AlreadyCurrent) => result.successful += 1,
         Ok(FileOutcome::EmptyContent | FileOutcome::EmptyReply) => result.skipped += 1,
         Ok(FileOutcome::Failed(error)) => {
            result.failed += 1;
            result.errors.push(SyncFailure { file: file.path.clone(), error });
         },
         Err(panic) => {
            tracing::error!(path = %file.path, "failed to sync note: {panic}");
            result.failed += 1;
            result.errors.push(SyncFailure {
               file:  file.path.clone(),
               error: Error::Panicked(panic).to_string(),
            });
         },
      }
   }
}

fn error_chain(e: &Error) -> String {
   let mut out = e.to_string();
   let mut source = e.source();
   while let Some(cause) = source {
      // Transparent wrappers already render their cause.
      let cause_msg = cause.to_string();
      if !out.ends_with(&cause_msg) {
         out.push_str(": ");
         out.push_str(&cause_msg);
      }
      source = cause.source();
   }
   out
}
