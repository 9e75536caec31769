//! In-memory vault for tests and tooling.

use std::collections::{BTreeMap, HashMap, HashSet};

use parking_lot::Mutex;

use crate::{
   Result,
   types::{FileStat, TrackedFile},
   vault::Vault,
};

#[derive(Debug, Clone)]
struct MemoryNote {
   file:    TrackedFile,
   content: String,
}

#[derive(Debug, Default)]
struct Inner {
   notes:        BTreeMap<String, MemoryNote>,
   blobs:        HashMap<String, String>,
   dirs:         HashSet<String>,
   failing_read: HashSet<String>,
   blob_writes:  usize,
}

/// A vault held entirely in memory. Notes are listed in path order.
#[derive(Debug)]
pub struct MemoryVault {
   name:  String,
   inner: Mutex<Inner>,
}

impl MemoryVault {
   pub fn new(name: impl Into<String>) -> Self {
      Self { name: name.into(), inner: Mutex::default() }
   }

   /// Adds or replaces a note. Any file type may be inserted; non-markdown
   /// entries are left out of [`Vault::markdown_files`].
   pub fn insert(&self, path: &str, content: &str, stat: FileStat) -> TrackedFile {
      let file = TrackedFile::new(path, stat);
      self.inner.lock().notes.insert(
         path.to_string(),
         MemoryNote { file: file.clone(), content: content.to_string() },
      );
      file
   }

   /// Rewrites a note's content and moves its modification time.
   pub fn update(&self, path: &str, content: &str, mtime: i64) {
      if let Some(note) = self.inner.lock().notes.get_mut(path) {
         note.content = content.to_string();
         note.file.stat.mtime = mtime;
      }
   }

   pub fn remove(&self, path: &str) {
      self.inner.lock().notes.remove(path);
   }

   /// Makes every read of the note at `path` fail.
   pub fn fail_reads(&self, path: &str) {
      self.inner.lock().failing_read.insert(path.to_string());
   }

   pub fn blob(&self, path: &str) -> Option<String> {
      self.inner.lock().blobs.get(path).cloned()
   }

   pub fn set_blob(&self, path: &str, content: &str) {
      self
         .inner
         .lock()
         .blobs
         .insert(path.to_string(), content.to_string());
   }

   pub fn blob_paths(&self) -> Vec<String> {
      let mut paths: Vec<String> = self.inner.lock().blobs.keys().cloned().collect();
      paths.sort();
      paths
   }

   pub fn has_dir(&self, path: &str) -> bool {
      self.inner.lock().dirs.contains(path)
   }

   pub fn blob_writes(&self) -> usize {
      self.inner.lock().blob_writes
   }
}

fn not_found(path: &str) -> crate::Error {
   std::io::Error::new(std::io::ErrorKind::NotFound, format!("no such file: {path}")).into()
}

#[async_trait::async_trait]
impl Vault for MemoryVault {
   fn name(&self) -> &str {
      &self.name
   }

   async fn markdown_files(&self) -> Result<Vec<TrackedFile>> {
      Ok(self
         .inner
         .lock()
         .notes
         .values()
         .filter(|n| n.file.is_markdown())
         .map(|n| n.file.clone())
         .collect())
   }

   async fn read(&self, file: &TrackedFile) -> Result<String> {
      let inner = self.inner.lock();
      if inner.failing_read.contains(&file.path) {
         return Err(std::io::Error::other(format!("read failed: {}", file.path)).into());
      }
      inner
         .notes
         .get(&file.path)
         .map(|n| n.content.clone())
         .ok_or_else(|| not_found(&file.path))
   }

   async fn exists(&self, path: &str) -> Result<bool> {
      let inner = self.inner.lock();
      Ok(inner.blobs.contains_key(path) || inner.dirs.contains(path))
   }

   async fn read_blob(&self, path: &str) -> Result<String> {
      self
         .inner
         .lock()
         .blobs
         .get(path)
         .cloned()
         .ok_or_else(|| not_found(path))
   }

   async fn write_blob(&self, path: &str, content: &str) -> Result<()> {
      let mut inner = self.inner.lock();
      inner.blobs.insert(path.to_string(), content.to_string());
      inner.blob_writes += 1;
      Ok(())
   }

   async fn mkdir(&self, path: &str) -> Result<()> {
      self.inner.lock().dirs.insert(path.to_string());
      Ok(())
   }
}
