//! Remote embedding deletion command.

use console::style;

use crate::{
   Error, Result,
   embed::{AssistantClient, EmbeddingApi},
   identity::VectorId,
};

/// Deletes remote embeddings. `targets` are note file names unless `raw` is
/// set, in which case they are already-encoded vector ids.
pub async fn execute(client: &AssistantClient, targets: &[String], raw: bool) -> Result<()> {
   if !client.is_configured() {
      return Err(Error::NotConfigured("missing api url or api key"));
   }

   let ids: Vec<VectorId> = targets
      .iter()
      .map(|t| {
         if raw {
            VectorId::from_encoded(t.clone())
         } else {
            VectorId::from_file_name(t)
         }
      })
      .collect();

   let reply = client.delete_embeddings(&ids).await?;
   tracing::debug!("delete reply: {reply}");
   println!("{} requested deletion of {} embeddings", style("●").green(), ids.len());
   Ok(())
}
