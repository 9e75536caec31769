//! Fixed-size batch scheduling with per-item failure isolation.
//!
//! Items are split into contiguous batches. Every item of a batch is polled
//! concurrently on the calling task, and the next batch starts only after all
//! of the current batch's items have settled. Peak fan-out is therefore the
//! batch size.

use std::{any::Any, future::Future, panic::AssertUnwindSafe};

use futures::{FutureExt, future::join_all};

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// A batch whose items have all settled.
#[derive(Debug)]
pub struct Settled<'a, T, O> {
   /// 1-based position of this batch.
   pub number:   usize,
   pub total:    usize,
   pub items:    &'a [T],
   /// One entry per item, in item order. `Err` carries the panic message of
   /// an item whose processing panicked.
   pub outcomes: Vec<Result<O, String>>,
}

#[derive(Debug, Clone, Copy)]
pub struct BatchScheduler {
   batch_size: usize,
}

impl Default for BatchScheduler {
   fn default() -> Self {
      Self::new(DEFAULT_BATCH_SIZE)
   }
}

impl BatchScheduler {
   /// Creates a scheduler; a zero batch size is raised to one.
   pub const fn new(batch_size: usize) -> Self {
      let batch_size = if batch_size == 0 { 1 } else { batch_size };
      Self { batch_size }
   }

   pub const fn batch_size(&self) -> usize {
      self.batch_size
   }

   pub const fn batch_count(&self, len: usize) -> usize {
      len.div_ceil(self.batch_size)
   }

   /// Sizes of the batches `len` items are split into.
   pub fn plan(&self, len: usize) -> Vec<usize> {
      (0..self.batch_count(len))
         .map(|i| (len - i * self.batch_size).min(self.batch_size))
         .collect()
   }

   /// Drives `items` through `process` batch by batch, handing each settled
   /// batch to `on_settled` before the next one starts.
   pub async fn run<'a, T, O, F, Fut>(
      &self,
      items: &'a [T],
      process: F,
      mut on_settled: impl FnMut(Settled<'a, T, O>),
   ) where
      F: Fn(&'a T) -> Fut,
      Fut: Future<Output = O>,
   {
      let total = self.batch_count(items.len());
      for (index, batch) in items.chunks(self.batch_size).enumerate() {
         tracing::debug!("processing sync batch {}/{}", index + 1, total);

         let outcomes = join_all(
            batch
               .iter()
               .map(|item| AssertUnwindSafe(process(item)).catch_unwind()),
         )
         .await
         .into_iter()
         .map(|r| r.map_err(panic_message))
         .collect();

         on_settled(Settled { number: index + 1, total, items: batch, outcomes });
      }
   }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
   if let Some(s) = payload.downcast_ref::<&str>() {
      (*s).to_string()
   } else if let Some(s) = payload.downcast_ref::<String>() {
      s.clone()
   } else {
      "unknown panic".to_string()
   }
}
