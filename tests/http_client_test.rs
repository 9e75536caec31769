use notesync::{
   Error,
   embed::{AssistantClient, EmbeddingApi, EmbeddingRequest},
   identity::VectorId,
   state::NoteMetadata,
};
use serde_json::{Value, json};
use tokio::{
   io::{AsyncReadExt, AsyncWriteExt},
   net::TcpListener,
   sync::oneshot,
   task::JoinHandle,
};

/// A request as seen by the mock server.
#[derive(Debug)]
struct Captured {
   request_line: String,
   headers:      Vec<(String, String)>,
   body:         Value,
}

impl Captured {
   fn header(&self, name: &str) -> Option<&str> {
      self
         .headers
         .iter()
         .find(|(k, _)| k.eq_ignore_ascii_case(name))
         .map(|(_, v)| v.as_str())
   }
}

/// Serves exactly one request with a canned reply.
async fn serve_once(status: &'static str, reply: &'static str) -> (String, oneshot::Receiver<Captured>, JoinHandle<()>) {
   let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
   let url = format!("http://{}", listener.local_addr().expect("addr"));
   let (tx, rx) = oneshot::channel();

   let handle = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.expect("accept");
      let mut buf = Vec::new();
      let mut chunk = [0u8; 4096];
      let header_end = loop {
         let n = socket.read(&mut chunk).await.expect("read");
         assert!(n > 0, "connection closed before headers");
         buf.extend_from_slice(&chunk[..n]);
         if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
         }
      };

      let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
      let mut lines = head.split("\r\n").filter(|l| !l.is_empty());
      let request_line = lines.next().unwrap_or_default().to_string();
      let headers: Vec<(String, String)> = lines
         .filter_map(|l| l.split_once(':'))
         .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
         .collect();
      let length: usize = headers
         .iter()
         .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
         .and_then(|(_, v)| v.parse().ok())
         .unwrap_or(0);
      while buf.len() < header_end + length {
         let n = socket.read(&mut chunk).await.expect("read body");
         assert!(n > 0, "connection closed before body");
         buf.extend_from_slice(&chunk[..n]);
      }
      let body = serde_json::from_slice(&buf[header_end..header_end + length]).unwrap_or(Value::Null);

      let response = format!(
         "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
         reply.len()
      );
      socket.write_all(response.as_bytes()).await.expect("write");
      socket.shutdown().await.ok();
      let _ = tx.send(Captured { request_line, headers, body });
   });

   (url, rx, handle)
}

fn request() -> EmbeddingRequest {
   let metadata = NoteMetadata {
      file_name: "idea.md".into(),
      extension: "md".into(),
      ..NoteMetadata::default()
   };
   EmbeddingRequest::note("idea.md", "# Idea", metadata, "Personal")
}

#[tokio::test]
async fn create_embedding_posts_note_with_bearer_auth() {
   let (url, rx, server) = serve_once("200 OK", r#"{"success":true,"id":"aWRlYS5tZA=="}"#).await;
   let client = AssistantClient::new(format!("{url}/"), Some("secret".into()));

   let reply = client.create_embedding(&request()).await.expect("create");
   assert_eq!(reply, Some(json!({ "success": true, "id": "aWRlYS5tZA==" })));

   let seen = rx.await.expect("captured");
   server.await.expect("server");
   assert_eq!(seen.request_line, "POST /apps/insert-embedding HTTP/1.1");
   assert_eq!(seen.header("authorization"), Some("Bearer secret"));
   assert!(seen.header("content-type").is_some_and(|v| v.starts_with("application/json")));
   assert_eq!(
      seen.body,
      json!({
         "title": "idea.md",
         "content": "# Idea",
         "type": "note",
         "metadata": { "fileName": "idea.md", "extension": "md" },
         "ragOptions": { "namespace": "Personal" },
      })
   );
}

#[tokio::test]
async fn falsy_replies_are_empty_results() {
   for reply in ["", "null", "false", "0", "\"\""] {
      let (url, _rx, server) = serve_once("200 OK", reply).await;
      let client = AssistantClient::new(url, Some("k".into()));
      let result = client.create_embedding(&request()).await.expect("create");
      assert_eq!(result, None, "reply {reply:?}");
      server.await.expect("server");
   }
}

#[tokio::test]
async fn server_errors_surface_as_remote_failures() {
   let (url, _rx, server) = serve_once("500 Internal Server Error", "{}").await;
   let client = AssistantClient::new(url, Some("k".into()));

   let err = client.create_embedding(&request()).await.expect_err("must fail");
   server.await.expect("server");
   assert!(matches!(err, Error::Remote { status: 500, .. }));
   assert_eq!(err.to_string(), "failed to create embedding: Internal Server Error");
}

#[tokio::test]
async fn delete_embeddings_posts_ids() {
   let (url, rx, server) = serve_once("200 OK", r#"{"success":true}"#).await;
   let client = AssistantClient::new(url, Some("k".into()));
   let ids = [VectorId::from_file_name("a.md"), VectorId::from_file_name("b.md")];

   let reply = client.delete_embeddings(&ids).await.expect("delete");
   assert_eq!(reply, json!({ "success": true }));

   let seen = rx.await.expect("captured");
   server.await.expect("server");
   assert_eq!(seen.request_line, "POST /apps/delete-embeddings HTTP/1.1");
   assert_eq!(seen.body, json!({ "ids": ["YS5tZA==", "Yi5tZA=="] }));
}

#[tokio::test]
async fn missing_key_fails_without_a_request() {
   let client = AssistantClient::new("http://127.0.0.1:9", None);
   assert!(!client.is_configured());
   let err = client.create_embedding(&request()).await.expect_err("must fail");
   assert!(matches!(err, Error::NotConfigured(_)));
}
