mod support;

use std::collections::HashMap;

use notesync::{
   batch::BatchScheduler,
   identity::{VECTOR_ID_NAME_CHARS, VectorId},
};
use proptest::{
   prelude::*,
   test_runner::{Config, RngAlgorithm, TestRng, TestRunner},
};
use support::{Harness, stat};

#[derive(Debug, Clone)]
enum Op {
   Add { name: String, blank: bool },
   Touch { name: String },
   Blank { name: String },
   Delete { name: String },
   Sync,
}

fn note_name_strategy() -> impl Strategy<Value = String> {
   (0usize..5).prop_map(|i| format!("note{i}.md"))
}

fn op_strategy() -> impl Strategy<Value = Op> {
   prop_oneof![
      (note_name_strategy(), any::<bool>()).prop_map(|(name, blank)| Op::Add { name, blank }),
      note_name_strategy().prop_map(|name| Op::Touch { name }),
      note_name_strategy().prop_map(|name| Op::Blank { name }),
      note_name_strategy().prop_map(|name| Op::Delete { name }),
      Just(Op::Sync),
   ]
}

/// A note as the model sees it: current mtime and whether it has content.
#[derive(Debug, Clone, Copy)]
struct ModelNote {
   mtime: i64,
   blank: bool,
}

#[test]
fn sync_fuzz_invariants_fixed_seed() {
   let seed = [7u8; 32];
   let mut runner = TestRunner::new_with_rng(
      Config { cases: 32, max_shrink_iters: 0, ..Config::default() },
      TestRng::from_seed(RngAlgorithm::ChaCha, &seed),
   );
   let strategy = prop::collection::vec(op_strategy(), 1..16);

   runner
      .run(&strategy, |ops| {
         tokio_test::block_on(async {
            let h = Harness::new();
            let mut clock = 1_000i64;
            let mut notes: HashMap<String, ModelNote> = HashMap::new();
            let mut synced: HashMap<String, i64> = HashMap::new();

            for op in ops.into_iter().chain([Op::Sync]) {
               clock += 1;
               match op {
                  Op::Add { name, blank } => {
                     let content = if blank { "  \n".to_string() } else { format!("# {name}") };
                     h.vault.insert(&name, &content, stat(clock));
                     notes.insert(name, ModelNote { mtime: clock, blank });
                  },
                  Op::Touch { name } => {
                     if let Some(note) = notes.get_mut(&name) {
                        h.vault.update(&name, &format!("# {name} {clock}"), clock);
                        *note = ModelNote { mtime: clock, blank: false };
                     }
                  },
                  Op::Blank { name } => {
                     if let Some(note) = notes.get_mut(&name) {
                        h.vault.update(&name, "\t", clock);
                        *note = ModelNote { mtime: clock, blank: true };
                     }
                  },
                  Op::Delete { name } => {
                     h.vault.remove(&name);
                     notes.remove(&name);
                  },
                  Op::Sync => {
                     let expected: Vec<String> = notes
                        .iter()
                        .filter(|(name, note)| synced.get(*name) != Some(&note.mtime))
                        .filter(|(_, note)| !note.blank)
                        .map(|(name, _)| name.clone())
                        .collect();
                     let blank_stale = notes
                        .iter()
                        .filter(|(name, note)| synced.get(*name) != Some(&note.mtime) && note.blank)
                        .count();

                     let before = h.embedder.call_count();
                     let result = h.engine.sync(&mut ()).await.expect("sync");
                     let sent = h.embedder.call_count() - before;

                     assert_eq!(sent, expected.len(), "remote calls in pass");
                     assert_eq!(result.failed, 0);
                     assert_eq!(result.skipped, blank_stale);
                     assert_eq!(result.total(), notes.len());
                     for name in expected {
                        let mtime = notes[&name].mtime;
                        synced.insert(name, mtime);
                     }
                  },
               }
            }

            // A pass right after a pass sends nothing new.
            let before = h.embedder.call_count();
            h.engine.sync(&mut ()).await.expect("repeat sync");
            assert_eq!(h.embedder.call_count(), before);
         });
         Ok(())
      })
      .expect("fuzz run");
}

proptest! {
   #[test]
   fn vector_id_depends_only_on_leading_characters(
      head in "[a-zA-Z0-9 _.-]{32}",
      tail_a in "[a-z]{0,12}",
      tail_b in "[a-z]{0,12}",
   ) {
      let a = VectorId::from_file_name(&format!("{head}{tail_a}"));
      let b = VectorId::from_file_name(&format!("{head}{tail_b}"));
      prop_assert_eq!(a, b);
   }

   #[test]
   fn vector_id_is_injective_for_short_names(a in "[a-z0-9.]{1,32}", b in "[a-z0-9.]{1,32}") {
      prop_assume!(a != b);
      prop_assert_ne!(VectorId::from_file_name(&a), VectorId::from_file_name(&b));
   }

   #[test]
   fn vector_id_length_tracks_truncated_name(name in "\\PC{0,64}") {
      let id = VectorId::from_file_name(&name);
      let chars = name.chars().count().min(VECTOR_ID_NAME_CHARS);
      let bytes: usize = if name.chars().take(VECTOR_ID_NAME_CHARS).all(|c| (c as u32) <= 0xFF) {
         chars
      } else {
         name.chars().take(VECTOR_ID_NAME_CHARS).map(char::len_utf8).sum()
      };
      prop_assert_eq!(id.as_str().len(), bytes.div_ceil(3) * 4);
   }

   #[test]
   fn batch_plan_covers_items_in_bounded_chunks(len in 0usize..200, size in 0usize..16) {
      let scheduler = BatchScheduler::new(size);
      let plan = scheduler.plan(len);
      prop_assert_eq!(plan.iter().sum::<usize>(), len);
      prop_assert_eq!(plan.len(), scheduler.batch_count(len));
      prop_assert!(plan.iter().all(|&n| n >= 1 && n <= scheduler.batch_size()));
      if let Some((last, full)) = plan.split_last() {
         prop_assert!(full.iter().all(|&n| n == scheduler.batch_size()));
         prop_assert!(*last >= 1);
      }
   }
}
