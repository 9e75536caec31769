//! Vault backed by a directory on the local file system.

use std::{
   path::{Component, Path, PathBuf},
   sync::atomic::{AtomicU64, Ordering},
   time::{SystemTime, UNIX_EPOCH},
};

use walkdir::WalkDir;

use crate::{
   Error, Result,
   types::{FileStat, TrackedFile},
   vault::Vault,
};

/// Distinguishes concurrent writes to the same blob within one process.
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct LocalVault {
   root: PathBuf,
   name: String,
}

impl LocalVault {
   pub fn new(root: impl Into<PathBuf>) -> Self {
      let root = root.into();
      let root = root.canonicalize().unwrap_or(root);
      let name = root
         .file_name()
         .and_then(|n| n.to_str())
         .unwrap_or("vault")
         .to_string();
      Self { root, name }
   }

   /// Overrides the vault name reported as the remote namespace.
   pub fn with_name(mut self, name: impl Into<String>) -> Self {
      self.name = name.into();
      self
   }

   pub fn root(&self) -> &Path {
      &self.root
   }

   /// Resolves a vault-relative blob path, refusing anything that would
   /// escape the vault root.
   fn resolve(&self, rel: &str) -> Result<PathBuf> {
      let rel_path = Path::new(rel);
      let escapes = rel_path
         .components()
         .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
      if rel.is_empty() || escapes {
         return Err(Error::InvalidStatePath(rel.to_string()));
      }
      Ok(self.root.join(rel_path))
   }

   fn scan(root: &Path) -> Vec<TrackedFile> {
      let mut files = Vec::new();
      let walker = WalkDir::new(root)
         .follow_links(false)
         .into_iter()
         .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

      for entry in walker {
         let entry = match entry {
            Ok(e) => e,
            Err(e) => {
               tracing::warn!("skipping unreadable vault entry: {e}");
               continue;
            },
         };
         if !entry.file_type().is_file() {
            continue;
         }

         let Some(path_key) = path_key(root, entry.path()) else {
            tracing::warn!("skipping non-utf8 path: {}", entry.path().display());
            continue;
         };
         let file = TrackedFile::new(path_key, FileStat::default());
         if !file.is_markdown() {
            continue;
         }

         let stat = match entry.metadata() {
            Ok(meta) => FileStat {
               ctime: meta.created().map(epoch_millis).unwrap_or(0),
               mtime: meta.modified().map(epoch_millis).unwrap_or(0),
            },
            Err(e) => {
               tracing::warn!("failed to stat {}: {e}", entry.path().display());
               continue;
            },
         };
         files.push(TrackedFile { stat, ..file });
      }

      files.sort_by(|a, b| a.path.cmp(&b.path));
      files
   }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
   name.to_str().is_some_and(|n| n.starts_with('.'))
}

fn path_key(root: &Path, path: &Path) -> Option<String> {
   let relative = path.strip_prefix(root).ok()?;
   let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
   Some(parts?.join("/"))
}

fn epoch_millis(time: SystemTime) -> i64 {
   time
      .duration_since(UNIX_EPOCH)
      .map_or(0, |d| d.as_millis() as i64)
}

#[async_trait::async_trait]
impl Vault for LocalVault {
   fn name(&self) -> &str {
      &self.name
   }

   async fn markdown_files(&self) -> Result<Vec<TrackedFile>> {
      let root = self.root.clone();
      tokio::task::spawn_blocking(move || Self::scan(&root))
         .await
         .map_err(|e| Error::Panicked(e.to_string()))
   }

   /// Invalid UTF-8 sequences are replaced rather than failing the read.
   async fn read(&self, file: &TrackedFile) -> Result<String> {
      let path = self.resolve(&file.path)?;
      let bytes = tokio::fs::read(path).await?;
      Ok(String::from_utf8_lossy(&bytes).into_owned())
   }

   async fn exists(&self, path: &str) -> Result<bool> {
      let path = self.resolve(path)?;
      Ok(tokio::fs::try_exists(path).await?)
   }

   async fn read_blob(&self, path: &str) -> Result<String> {
      let path = self.resolve(path)?;
      Ok(tokio::fs::read_to_string(path).await?)
   }

   async fn write_blob(&self, path: &str, content: &str) -> Result<()> {
      let dest = self.resolve(path)?;
      if let Some(parent) = dest.parent() {
         tokio::fs::create_dir_all(parent).await?;
      }

      let tmp_name = format!(
         "{}.tmp-{}-{}",
         dest
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("state.json"),
         std::process::id(),
         TMP_SEQ.fetch_add(1, Ordering::Relaxed)
      );
      let tmp_path = dest.with_file_name(tmp_name);
      tokio::fs::write(&tmp_path, content).await?;
      if let Err(e) = tokio::fs::rename(&tmp_path, &dest).await {
         let _ = tokio::fs::remove_file(&tmp_path).await;
         return Err(e.into());
      }
      Ok(())
   }

   async fn mkdir(&self, path: &str) -> Result<()> {
      let path = self.resolve(path)?;
      Ok(tokio::fs::create_dir_all(path).await?)
   }
}
