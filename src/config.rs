//! Configuration for the remote service, sync behaviour and paths.

use std::{
   fs,
   path::{Path, PathBuf},
   time::Duration,
};

use directories::BaseDirs;
use figment::{
   Figment,
   providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::{
   batch::DEFAULT_BATCH_SIZE,
   embed::http::DEFAULT_API_URL,
   error::{ConfigError, Result},
   state::DEFAULT_SYNC_DIR,
};

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "ASSISTANT_API_KEY";

pub const MAX_BATCH_SIZE: usize = 64;

/// Application configuration loaded from config files and environment variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
   pub api_url: String,
   pub api_key: String,

   pub ignored_folders:         Vec<String>,
   pub batch_size:              usize,
   /// Per-call timeout for remote requests; 0 disables it.
   pub request_timeout_ms:      u64,
   /// Remote namespace; defaults to the vault's name.
   pub namespace:               Option<String>,
   pub sync_dir:                String,
   pub sync_enabled:            bool,
   pub auto_sync_interval_mins: u64,

   pub log_level: String,
}

impl Default for Config {
   fn default() -> Self {
      Self {
         api_url:                 DEFAULT_API_URL.to_string(),
         api_key:                 String::new(),
         ignored_folders:         Vec::new(),
         batch_size:              DEFAULT_BATCH_SIZE,
         request_timeout_ms:      0,
         namespace:               None,
         sync_dir:                DEFAULT_SYNC_DIR.to_string(),
         sync_enabled:            false,
         auto_sync_interval_mins: 30,
         log_level:               "error".to_string(),
      }
   }
}

impl Config {
   /// Loads defaults, then the global config file, then `.notesync.toml` in
   /// the vault (if given), then `NOTESYNC_*` environment variables.
   pub fn load(vault_root: Option<&Path>) -> Result<Self> {
      let global = ensure_global_config()?;
      let mut figment =
         Figment::from(Serialized::defaults(Self::default())).merge(Toml::file(global));

      if let Some(root) = vault_root {
         let vault_path = vault_config_path(root);
         if vault_path.exists() {
            figment = figment.merge(Toml::file(vault_path));
         }
      }

      let cfg: Self = figment
         .merge(Env::prefixed("NOTESYNC_").lowercase(true))
         .extract()
         .map_err(|e| ConfigError::Parse(Box::new(e)))?;
      cfg.validate()?;
      Ok(cfg)
   }

   pub fn validate(&self) -> Result<()> {
      if self.batch_size > MAX_BATCH_SIZE {
         return Err(
            ConfigError::Invalid(format!(
               "batch_size {} exceeds hard cap {MAX_BATCH_SIZE}",
               self.batch_size
            ))
            .into(),
         );
      }
      if self.sync_dir.trim_matches('/').is_empty() {
         return Err(ConfigError::Invalid("sync_dir must not be empty".to_string()).into());
      }
      if !matches!(self.log_level.as_str(), "debug" | "info" | "warn" | "error") {
         return Err(
            ConfigError::Invalid(format!("unknown log_level {:?}", self.log_level)).into(),
         );
      }
      Ok(())
   }

   /// The configured API key, falling back to [`API_KEY_ENV`].
   pub fn resolved_api_key(&self) -> Option<String> {
      if !self.api_key.is_empty() {
         return Some(self.api_key.clone());
      }
      std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
   }

   pub const fn request_timeout(&self) -> Option<Duration> {
      if self.request_timeout_ms == 0 {
         None
      } else {
         Some(Duration::from_millis(self.request_timeout_ms))
      }
   }

   pub const fn auto_sync_interval(&self) -> Duration {
      Duration::from_secs(self.auto_sync_interval_mins.saturating_mul(60))
   }

   fn create_default_config(path: &Path) {
      if let Some(parent) = path.parent() {
         let _ = fs::create_dir_all(parent);
      }
      if let Ok(toml) = toml::to_string_pretty(&Self::default()) {
         let _ = fs::write(path, toml);
      }
   }
}

pub fn vault_config_path(root: &Path) -> PathBuf {
   root.join(".notesync.toml")
}

/// Returns the base directory for notesync configuration
pub fn base_dir() -> Result<PathBuf> {
   BaseDirs::new()
      .map(|d| d.home_dir().join(".notesync"))
      .or_else(|| {
         std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(".notesync"))
      })
      .ok_or_else(|| ConfigError::GetUserDirectories.into())
}

pub fn config_file_path() -> Result<PathBuf> {
   Ok(base_dir()?.join("config.toml"))
}

fn ensure_global_config() -> Result<PathBuf> {
   let path = config_file_path()?;
   if !path.exists() {
      Config::create_default_config(&path);
   }
   Ok(path)
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn defaults_match_plugin_settings() {
      let cfg = Config::default();
      assert_eq!(cfg.batch_size, 5);
      assert_eq!(cfg.sync_dir, ".cloudflare-ai/sync");
      assert_eq!(cfg.auto_sync_interval(), Duration::from_secs(30 * 60));
      assert_eq!(cfg.request_timeout(), None);
      assert!(!cfg.sync_enabled);
      assert!(cfg.validate().is_ok());
   }

   #[test]
   fn validate_rejects_out_of_range_values() {
      let cfg = Config { batch_size: MAX_BATCH_SIZE + 1, ..Config::default() };
      assert!(cfg.validate().is_err());
      let cfg = Config { sync_dir: "/".into(), ..Config::default() };
      assert!(cfg.validate().is_err());
      let cfg = Config { log_level: "loud".into(), ..Config::default() };
      assert!(cfg.validate().is_err());
   }

   #[test]
   fn vault_file_overrides_defaults() {
      figment::Jail::expect_with(|jail| {
         jail.create_file(
            ".notesync.toml",
            "batch_size = 3\nignored_folders = [\"Archive\", \"Templates\"]\nrequest_timeout_ms = 2500\n",
         )?;
         jail.set_env("NOTESYNC_NAMESPACE", "work");
         let cfg: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(vault_config_path(jail.directory())))
            .merge(Env::prefixed("NOTESYNC_").lowercase(true))
            .extract()?;
         assert_eq!(cfg.batch_size, 3);
         assert_eq!(cfg.ignored_folders, vec!["Archive", "Templates"]);
         assert_eq!(cfg.request_timeout(), Some(Duration::from_millis(2500)));
         assert_eq!(cfg.namespace.as_deref(), Some("work"));
         Ok(())
      });
   }
}
