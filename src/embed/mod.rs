//! Remote embedding service contract.

pub mod dummy;
pub mod http;

use std::sync::Arc;

pub use dummy::DummyEmbedder;
pub use http::AssistantClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, identity::VectorId, state::NoteMetadata};

/// Type tag sent with every note embedding.
pub const NOTE_TYPE: &str = "note";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagOptions {
   pub namespace: String,
}

/// Body of a create-embedding call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingRequest {
   pub title:       String,
   pub content:     String,
   #[serde(rename = "type")]
   pub kind:        String,
   pub metadata:    NoteMetadata,
   pub rag_options: RagOptions,
}

impl EmbeddingRequest {
   pub fn note(
      title: impl Into<String>,
      content: impl Into<String>,
      metadata: NoteMetadata,
      namespace: impl Into<String>,
   ) -> Self {
      Self {
         title: title.into(),
         content: content.into(),
         kind: NOTE_TYPE.to_string(),
         metadata,
         rag_options: RagOptions { namespace: namespace.into() },
      }
   }
}

/// The remote service that stores note embeddings.
///
/// Both calls go over the network and may fail at any time.
#[async_trait::async_trait]
pub trait EmbeddingApi: Send + Sync {
   /// Creates (or replaces) a note's embedding. `Ok(None)` means the service
   /// answered with an empty result and nothing was stored.
   async fn create_embedding(&self, request: &EmbeddingRequest) -> Result<Option<Value>>;

   /// Deletes the embeddings stored under `ids`.
   async fn delete_embeddings(&self, ids: &[VectorId]) -> Result<Value>;

   /// Whether the service has what it needs to accept calls.
   fn is_configured(&self) -> bool;
}

#[async_trait::async_trait]
impl<T: EmbeddingApi + ?Sized> EmbeddingApi for Arc<T> {
   async fn create_embedding(&self, request: &EmbeddingRequest) -> Result<Option<Value>> {
      (**self).create_embedding(request).await
   }

   async fn delete_embeddings(&self, ids: &[VectorId]) -> Result<Value> {
      (**self).delete_embeddings(ids).await
   }

   fn is_configured(&self) -> bool {
      (**self).is_configured()
   }
}

/// JSON truthiness: `null`, `false`, `0` and `""` are empty replies.
pub fn is_truthy(value: &Value) -> bool {
   match value {
      Value::Null => false,
      Value::Bool(b) => *b,
      Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
      Value::String(s) => !s.is_empty(),
      Value::Array(_) | Value::Object(_) => true,
   }
}
