//! Incremental sync of a note vault into a remote embedding index.
//!
//! [`sync::SyncEngine`] is the entry point: it decides which notes changed
//! since their last recorded sync, embeds those in bounded batches, and
//! persists per-note state so repeated passes are incremental.

pub mod batch;
pub mod change;
pub mod cmd;
pub mod config;
pub mod embed;
pub mod error;
pub mod identity;
pub mod state;
pub mod sync;
pub mod types;
pub mod vault;

pub use error::{Error, Result};
