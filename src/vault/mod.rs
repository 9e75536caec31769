//! Host vault abstraction: note enumeration, note reads and small blob storage.

mod local;
mod memory;

use std::sync::Arc;

pub use local::LocalVault;
pub use memory::MemoryVault;

use crate::{Result, types::TrackedFile};

/// The host file store the sync core runs against.
///
/// Blob paths are vault-relative and `/`-separated. They hold the sync-state
/// records and never point at notes.
#[async_trait::async_trait]
pub trait Vault: Send + Sync {
   /// Identifying name of the vault, used as the remote namespace.
   fn name(&self) -> &str;

   /// Lists every markdown note in the vault.
   async fn markdown_files(&self) -> Result<Vec<TrackedFile>>;

   /// Reads the full text of a note.
   async fn read(&self, file: &TrackedFile) -> Result<String>;

   async fn exists(&self, path: &str) -> Result<bool>;

   async fn read_blob(&self, path: &str) -> Result<String>;

   async fn write_blob(&self, path: &str, content: &str) -> Result<()>;

   async fn mkdir(&self, path: &str) -> Result<()>;
}

#[async_trait::async_trait]
impl<T: Vault + ?Sized> Vault for Arc<T> {
   fn name(&self) -> &str {
      (**self).name()
   }

   async fn markdown_files(&self) -> Result<Vec<TrackedFile>> {
      (**self).markdown_files().await
   }

   async fn read(&self, file: &TrackedFile) -> Result<String> {
      (**self).read(file).await
   }

   async fn exists(&self, path: &str) -> Result<bool> {
      (**self).exists(path).await
   }

   async fn read_blob(&self, path: &str) -> Result<String> {
      (**self).read_blob(path).await
   }

   async fn write_blob(&self, path: &str, content: &str) -> Result<()> {
      (**self).write_blob(path, content).await
   }

   async fn mkdir(&self, path: &str) -> Result<()> {
      (**self).mkdir(path).await
   }
}
