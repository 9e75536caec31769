//! Prints the vector id and state path derived for file names.

use crate::{identity::VectorId, state::SyncStateStore};

pub fn execute(names: &[String], state: &SyncStateStore) {
   for name in names {
      let id = VectorId::from_file_name(name);
      println!("{name}\t{id}\t{}", state.state_path(&id));
   }
}
