use serde::{Deserialize, Serialize};

/// Extension of the notes that take part in sync.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Creation and modification times of a vault file, epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
   pub ctime: i64,
   pub mtime: i64,
}

/// A file as reported by the host vault. The sync core only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedFile {
   /// Vault-relative path with `/` separators, unique within the vault.
   pub path:      String,
   /// Final path component, including the extension.
   pub name:      String,
   /// Extension without the leading dot.
   pub extension: String,
   pub stat:      FileStat,
}

impl TrackedFile {
   /// Builds a tracked file from a vault-relative path, deriving name and
   /// extension the way the host vault reports them.
   pub fn new(path: impl Into<String>, stat: FileStat) -> Self {
      let path = path.into();
      let name = path.rsplit('/').next().unwrap_or(&path).to_string();
      let extension = match name.rsplit_once('.') {
         Some((stem, ext)) if !stem.is_empty() => ext.to_string(),
         _ => String::new(),
      };
      Self { path, name, extension, stat }
   }

   pub fn is_markdown(&self) -> bool {
      self.extension == MARKDOWN_EXTENSION
   }
}

/// One note that failed during a sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
   pub file:  String,
   pub error: String,
}

/// Result summary from a sync pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
   /// Notes embedded in this pass plus notes that were already up to date.
   pub successful: usize,
   pub failed:     usize,
   /// Notes neither synced nor failed: empty content or an empty remote reply.
   #[serde(default)]
   pub skipped:    usize,
   pub errors:     Vec<SyncFailure>,
}

impl SyncResult {
   pub const fn total(&self) -> usize {
      self.successful + self.failed + self.skipped
   }
}
