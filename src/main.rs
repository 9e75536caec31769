use std::path::PathBuf;

use clap::{Parser, Subcommand};
use notesync::{
   Result,
   change::IgnoredFolders,
   cmd,
   config::Config,
   embed::AssistantClient,
   state::SyncStateStore,
};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the notesync application
#[derive(Parser)]
#[command(name = "notesync")]
#[command(about = "Keep a note vault in sync with a remote embedding index")]
#[command(version)]
struct Cli {
   #[arg(long, global = true, env = "NOTESYNC_VAULT", help = "Vault directory (default: cwd)")]
   vault: Option<PathBuf>,

   #[command(subcommand)]
   command: Cmd,
}

/// Available subcommands for notesync
#[derive(Subcommand)]
enum Cmd {
   #[command(about = "Run one sync pass")]
   Sync {
      #[arg(long, help = "Comma-separated folders to ignore (replaces config)")]
      ignore: Option<String>,

      #[arg(long, help = "Notes embedded concurrently per batch")]
      batch_size: Option<usize>,

      #[arg(long, help = "JSON output")]
      json: bool,
   },

   #[command(about = "Sync now and then on a fixed interval")]
   Watch {
      #[arg(long, help = "Minutes between passes (default: auto_sync_interval_mins)")]
      interval: Option<u64>,

      #[arg(long, help = "Run even when sync_enabled is false")]
      force: bool,

      #[arg(long, help = "Comma-separated folders to ignore (replaces config)")]
      ignore: Option<String>,
   },

   #[command(about = "Show which notes the next pass would embed")]
   Status {
      #[arg(long, help = "Comma-separated folders to ignore (replaces config)")]
      ignore: Option<String>,

      #[arg(long, help = "JSON output")]
      json: bool,
   },

   #[command(name = "delete-embeddings", about = "Delete remote embeddings")]
   DeleteEmbeddings {
      #[arg(required = true, help = "Note file names (or vector ids with --raw)")]
      targets: Vec<String>,

      #[arg(long, help = "Treat targets as already-encoded vector ids")]
      raw: bool,
   },

   #[command(name = "vector-id", about = "Print the vector id derived for file names")]
   VectorId {
      #[arg(required = true)]
      names: Vec<String>,
   },
}

#[tokio::main]
async fn main() {
   let cli = Cli::parse();
   if let Err(err) = run(cli).await {
      eprintln!("{err}");
      std::process::exit(err.exit_code());
   }
}

async fn run(cli: Cli) -> Result<()> {
   let root = match cli.vault {
      Some(path) => path,
      None => std::env::current_dir()?,
   };
   let mut cfg = Config::load(Some(&root))?;

   tracing_subscriber::fmt()
      .with_env_filter(
         EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)),
      )
      .init();

   match cli.command {
      Cmd::Sync { ignore, batch_size, json } => {
         apply_ignore(&mut cfg, ignore);
         if let Some(size) = batch_size {
            cfg.batch_size = size;
         }
         cfg.validate()?;
         cmd::sync::execute(&cmd::open_engine(&root, &cfg), json).await
      },
      Cmd::Watch { interval, force, ignore } => {
         apply_ignore(&mut cfg, ignore);
         cmd::watch::execute(&cmd::open_engine(&root, &cfg), &cfg, interval, force).await
      },
      Cmd::Status { ignore, json } => {
         apply_ignore(&mut cfg, ignore);
         cmd::status::execute(&cmd::open_engine(&root, &cfg), json).await
      },
      Cmd::DeleteEmbeddings { targets, raw } => {
         cmd::delete::execute(&AssistantClient::from_config(&cfg), &targets, raw).await
      },
      Cmd::VectorId { names } => {
         cmd::vector_id::execute(&names, &SyncStateStore::new(cfg.sync_dir.clone()));
         Ok(())
      },
   }
}

fn apply_ignore(cfg: &mut Config, ignore: Option<String>) {
   if let Some(list) = ignore {
      cfg.ignored_folders = IgnoredFolders::parse_list(&list);
   }
}
