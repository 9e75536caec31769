//! Lightweight deterministic embedding service for tests and tooling.

use std::{collections::HashSet, time::Duration};

use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::{
   Error,
   embed::{EmbeddingApi, EmbeddingRequest},
   error::Result,
   identity::VectorId,
};

#[derive(Debug, Default)]
struct Script {
   calls:     Vec<EmbeddingRequest>,
   deleted:   Vec<VectorId>,
   failing:   HashSet<String>,
   empty:     HashSet<String>,
   panicking: HashSet<String>,
   in_flight: usize,
   peak:      usize,
}

/// Records every call and answers from a script keyed by note title.
#[derive(Debug)]
pub struct DummyEmbedder {
   configured: bool,
   latency:    Option<Duration>,
   script:     Mutex<Script>,
}

impl Default for DummyEmbedder {
   fn default() -> Self {
      Self::new()
   }
}

impl DummyEmbedder {
   pub fn new() -> Self {
      Self { configured: true, latency: None, script: Mutex::default() }
   }

   /// An embedder that reports itself as not configured.
   pub fn unconfigured() -> Self {
      Self { configured: false, ..Self::new() }
   }

   /// Delays every create call, keeping it in flight across a timer.
   pub fn with_latency(mut self, latency: Duration) -> Self {
      self.latency = Some(latency);
      self
   }

   /// Makes create calls for `title` fail with a server error.
   pub fn fail_on(&self, title: &str) {
      self.script.lock().failing.insert(title.to_string());
   }

   /// Makes create calls for `title` answer with an empty result.
   pub fn empty_on(&self, title: &str) {
      self.script.lock().empty.insert(title.to_string());
   }

   /// Makes create calls for `title` panic.
   pub fn panic_on(&self, title: &str) {
      self.script.lock().panicking.insert(title.to_string());
   }

   pub fn calls(&self) -> Vec<EmbeddingRequest> {
      self.script.lock().calls.clone()
   }

   pub fn call_count(&self) -> usize {
      self.script.lock().calls.len()
   }

   pub fn titles(&self) -> Vec<String> {
      self.script.lock().calls.iter().map(|c| c.title.clone()).collect()
   }

   pub fn deleted(&self) -> Vec<VectorId> {
      self.script.lock().deleted.clone()
   }

   /// Highest number of create calls that were in flight at once.
   pub fn peak_in_flight(&self) -> usize {
      self.script.lock().peak
   }
}

#[async_trait::async_trait]
impl EmbeddingApi for DummyEmbedder {
   async fn create_embedding(&self, request: &EmbeddingRequest) -> Result<Option<Value>> {
      {
         let mut script = self.script.lock();
         script.calls.push(request.clone());
         script.in_flight += 1;
         script.peak = script.peak.max(script.in_flight);
      }

      match self.latency {
         Some(latency) => tokio::time::sleep(latency).await,
         None => tokio::task::yield_now().await,
      }

      let mut script = self.script.lock();
      script.in_flight -= 1;
      if script.panicking.contains(&request.title) {
         drop(script);
         panic!("embedder panicked on {}", request.title);
      }
      if script.failing.contains(&request.title) {
         return Err(Error::Remote {
            op:     "create embedding",
            status: 500,
            reason: "Internal Server Error".to_string(),
         });
      }
      if script.empty.contains(&request.title) {
         return Ok(None);
      }
      Ok(Some(json!({ "success": true, "title": request.title })))
   }

   async fn delete_embeddings(&self, ids: &[VectorId]) -> Result<Value> {
      self.script.lock().deleted.extend(ids.iter().cloned());
      Ok(json!({ "success": true, "deleted": ids.len() }))
   }

   fn is_configured(&self) -> bool {
      self.configured
   }
}
