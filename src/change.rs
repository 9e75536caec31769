//! Change detection: which notes are candidates, and which of those are stale.

use crate::{
   identity::VectorId,
   state::{SyncState, SyncStateStore},
   types::TrackedFile,
   vault::Vault,
};

/// Folder prefixes excluded from sync.
///
/// Matching is case-insensitive with `\` read as `/`. A note is excluded only
/// when its path starts with `<folder>/`, so `Archive2/note.md` survives an
/// ignored `archive`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoredFolders {
   prefixes: Vec<String>,
}

impl IgnoredFolders {
   pub fn new<I, S>(folders: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: AsRef<str>,
   {
      let prefixes = folders
         .into_iter()
         .map(|f| format!("{}/", normalize(f.as_ref())))
         .collect();
      Self { prefixes }
   }

   /// Parses a comma-separated folder list, dropping empty entries.
   pub fn parse_list(list: &str) -> Vec<String> {
      list
         .split(',')
         .filter(|s| !s.is_empty())
         .map(str::to_string)
         .collect()
   }

   pub fn is_empty(&self) -> bool {
      self.prefixes.is_empty()
   }

   pub fn contains(&self, path: &str) -> bool {
      let path = normalize(path);
      self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
   }
}

fn normalize(path: &str) -> String {
   path.to_lowercase().replace('\\', "/")
}

/// Keeps the markdown notes outside ignored folders, in their original order.
pub fn candidates(files: Vec<TrackedFile>, ignored: &IgnoredFolders) -> Vec<TrackedFile> {
   files
      .into_iter()
      .filter(|f| !ignored.contains(&f.path))
      .filter(TrackedFile::is_markdown)
      .collect()
}

/// A note is current iff it has state and the recorded modification time
/// equals the note's current one exactly.
pub fn is_current(state: Option<&SyncState>, file: &TrackedFile) -> bool {
   state.is_some_and(|s| s.last_modified == file.stat.mtime)
}

/// Candidates split by whether they need a sync.
#[derive(Debug, Default)]
pub struct ChangeSet {
   pub stale:   Vec<TrackedFile>,
   pub current: Vec<TrackedFile>,
}

impl ChangeSet {
   /// Classifies each candidate against its stored state, preserving order.
   pub async fn detect<V>(vault: &V, state: &SyncStateStore, files: Vec<TrackedFile>) -> Self
   where
      V: Vault + ?Sized,
   {
      let mut changes = Self::default();
      for file in files {
         let id = VectorId::from_file_name(&file.name);
         let stored = state.load(vault, &id).await;
         if is_current(stored.as_ref(), &file) {
            changes.current.push(file);
         } else {
            changes.stale.push(file);
         }
      }
      changes
   }
}
