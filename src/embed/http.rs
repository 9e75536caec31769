//! HTTP client for the assistant service's embedding endpoints.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};

use crate::{
   Error, Result,
   config::Config,
   embed::{EmbeddingApi, EmbeddingRequest, is_truthy},
   error::HttpError,
   identity::VectorId,
};

pub const DEFAULT_API_URL: &str = "https://assistant.nicholasgriffin.workers.dev";

const INSERT_EMBEDDING_PATH: &str = "/apps/insert-embedding";
const DELETE_EMBEDDINGS_PATH: &str = "/apps/delete-embeddings";

#[derive(Debug, Clone)]
pub struct AssistantClient {
   client:   reqwest::Client,
   base_url: String,
   api_key:  Option<String>,
   timeout:  Option<Duration>,
}

impl AssistantClient {
   pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
      let base_url = base_url.into().trim_end_matches('/').to_string();
      let api_key = api_key.filter(|k| !k.is_empty());
      Self { client: reqwest::Client::new(), base_url, api_key, timeout: None }
   }

   pub fn from_config(cfg: &Config) -> Self {
      Self::new(cfg.api_url.clone(), cfg.resolved_api_key()).with_timeout(cfg.request_timeout())
   }

   /// Bounds every request; `None` lets a request run until the server answers.
   pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
      self.timeout = timeout;
      self
   }

   pub fn base_url(&self) -> &str {
      &self.base_url
   }

   async fn post(&self, op: &'static str, path: &str, body: &impl Serialize) -> Result<Value> {
      let Some(api_key) = self.api_key.as_deref() else {
         return Err(Error::NotConfigured("missing api key"));
      };

      let mut request = self
         .client
         .post(format!("{}{path}", self.base_url))
         .bearer_auth(api_key)
         .json(body);
      if let Some(timeout) = self.timeout {
         request = request.timeout(timeout);
      }

      let response = request.send().await.map_err(|e| self.request_error(op, e))?;

      let status = response.status();
      if !status.is_success() {
         let reason = status
            .canonical_reason()
            .map_or_else(|| status.as_str().to_string(), str::to_string);
         return Err(Error::Remote { op, status: status.as_u16(), reason });
      }

      let bytes = response.bytes().await.map_err(|e| match self.request_error(op, e) {
         Error::Http(HttpError::Request(e)) => Error::Http(HttpError::ReadResponse(e)),
         other => other,
      })?;
      if bytes.iter().all(u8::is_ascii_whitespace) {
         return Ok(Value::Null);
      }
      Ok(serde_json::from_slice(&bytes)?)
   }

   fn request_error(&self, op: &'static str, e: reqwest::Error) -> Error {
      match self.timeout {
         Some(after) if e.is_timeout() => Error::Timeout { op, after },
         _ => e.into(),
      }
   }
}

#[async_trait::async_trait]
impl EmbeddingApi for AssistantClient {
   async fn create_embedding(&self, request: &EmbeddingRequest) -> Result<Option<Value>> {
      let reply = self
         .post("create embedding", INSERT_EMBEDDING_PATH, request)
         .await?;
      Ok(is_truthy(&reply).then_some(reply))
   }

   async fn delete_embeddings(&self, ids: &[VectorId]) -> Result<Value> {
      self
         .post("delete embedding", DELETE_EMBEDDINGS_PATH, &json!({ "ids": ids }))
         .await
   }

   fn is_configured(&self) -> bool {
      !self.base_url.is_empty() && self.api_key.is_some()
   }
}
