//! Vector identifier derivation.
//!
//! A [`VectorId`] is the first 32 characters of a note's file name, base64
//! encoded. It is both the sync-state key and the identifier of the note's
//! vector in the remote index. The derivation is lossy: two names sharing the
//! same leading 32 characters map to the same id and are treated as one
//! tracked note. Existing sync-state files are keyed by this exact encoding,
//! so it must not be swapped for a hash without migrating them.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// Number of leading characters of the file name that take part in the id.
pub const VECTOR_ID_NAME_CHARS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorId(String);

impl VectorId {
   /// Derives the id for a file name.
   ///
   /// Names made only of Latin-1 characters are encoded one byte per
   /// character, which is what ids written by earlier releases used. Any
   /// other name is encoded as UTF-8.
   pub fn from_file_name(name: &str) -> Self {
      let head: Vec<char> = name.chars().take(VECTOR_ID_NAME_CHARS).collect();
      let bytes: Vec<u8> = if head.iter().all(|&c| (c as u32) <= 0xFF) {
         head.iter().map(|&c| c as u32 as u8).collect()
      } else {
         head.iter().collect::<String>().into_bytes()
      };
      Self(STANDARD.encode(bytes))
   }

   /// Wraps an id that was derived earlier, e.g. read back from the remote
   /// index.
   pub fn from_encoded(id: impl Into<String>) -> Self {
      Self(id.into())
   }

   pub fn as_str(&self) -> &str {
      &self.0
   }

   pub fn into_string(self) -> String {
      self.0
   }
}

impl fmt::Display for VectorId {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(&self.0)
   }
}

impl AsRef<str> for VectorId {
   fn as_ref(&self) -> &str {
      &self.0
   }
}

impl From<VectorId> for String {
   fn from(id: VectorId) -> Self {
      id.0
   }
}
