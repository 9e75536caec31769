#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Arc;

use notesync::{
   embed::DummyEmbedder,
   sync::{SyncEngine, SyncOptions},
   types::{FileStat, TrackedFile},
   vault::MemoryVault,
};

pub type TestEngine = SyncEngine<Arc<MemoryVault>, Arc<DummyEmbedder>>;

pub const VAULT_NAME: &str = "Test Vault";

pub struct Harness {
   pub vault:    Arc<MemoryVault>,
   pub embedder: Arc<DummyEmbedder>,
   pub engine:   TestEngine,
}

impl Harness {
   pub fn new() -> Self {
      Self::with_options(SyncOptions::default())
   }

   pub fn with_options(options: SyncOptions) -> Self {
      Self::with_embedder(DummyEmbedder::new(), options)
   }

   pub fn with_embedder(embedder: DummyEmbedder, options: SyncOptions) -> Self {
      let vault = Arc::new(MemoryVault::new(VAULT_NAME));
      let embedder = Arc::new(embedder);
      let engine = SyncEngine::new(Arc::clone(&vault), Arc::clone(&embedder), options);
      Self { vault, embedder, engine }
   }

   /// Adds a note whose content names it, with a fixed creation time.
   pub fn note(&self, path: &str, mtime: i64) -> TrackedFile {
      self.vault.insert(path, &format!("# {path}\n\nbody"), stat(mtime))
   }

   /// Adds `count` notes `note-00.md`, `note-01.md`, ...
   pub fn notes(&self, count: usize) -> Vec<TrackedFile> {
      (0..count).map(|i| self.note(&format!("note-{i:02}.md"), 1_000 + i as i64)).collect()
   }
}

pub const fn stat(mtime: i64) -> FileStat {
   FileStat { ctime: 1_700_000_000_000, mtime }
}
