//! Configuration for the `casefile` binary.
//!
//! Layers, lowest precedence first: built-in defaults, the TOML file given
//! with `--config` (optional), then `CASEFILE_*` environment variables
//! (`CASEFILE_STORE_PATH`, `CASEFILE_STORE__PAGE_SIZE`).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use casefile_store_sqlite::StoreOptions;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path: PathBuf,
  #[serde(default)]
  pub store:      StoreOptions,
}

impl CliConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::load_with(path, environment())
  }

  fn load_with(path: &Path, env: config::Environment) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("store_path", "casefile.db")?
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(env)
      .build()
      .context("failed to read config file")?;

    let mut cfg: CliConfig = settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// `CASEFILE_` prefix, `__` between nested keys, numbers parsed.
fn environment() -> config::Environment {
  config::Environment::with_prefix("CASEFILE")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn env_of(vars: &[(&str, &str)]) -> config::Environment {
    let vars: HashMap<String, String> = vars
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    environment().source(Some(vars))
  }

  fn missing_file() -> &'static Path { Path::new("/nonexistent/casefile.toml") }

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let cfg = CliConfig::load_with(missing_file(), env_of(&[])).unwrap();
    assert_eq!(cfg.store_path, PathBuf::from("casefile.db"));
    assert_eq!(cfg.store.page_size, StoreOptions::default().page_size);
  }

  #[test]
  fn environment_overrides_store_settings() {
    let env = env_of(&[
      ("CASEFILE_STORE_PATH", "/tmp/from-env.db"),
      ("CASEFILE_STORE__PAGE_SIZE", "7"),
    ]);
    let cfg = CliConfig::load_with(missing_file(), env).unwrap();
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/from-env.db"));
    assert_eq!(cfg.store.page_size, 7);
  }

  #[test]
  fn file_values_are_read_and_environment_wins() {
    let path = std::env::temp_dir()
      .join(format!("casefile-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(
      &path,
      "store_path = \"/srv/casefile.db\"\n\n[store]\npage_size = 32\n",
    )
    .unwrap();

    let from_file = CliConfig::load_with(&path, env_of(&[])).unwrap();
    assert_eq!(from_file.store_path, PathBuf::from("/srv/casefile.db"));
    assert_eq!(from_file.store.page_size, 32);

    let env = env_of(&[("CASEFILE_STORE__PAGE_SIZE", "5")]);
    let overridden = CliConfig::load_with(&path, env).unwrap();
    assert_eq!(overridden.store_path, PathBuf::from("/srv/casefile.db"));
    assert_eq!(overridden.store.page_size, 5);

    std::fs::remove_file(&path).unwrap();
  }

  #[test]
  fn plain_paths_are_left_alone() {
    assert_eq!(expand_tilde(Path::new("/var/lib/casefile.db")), PathBuf::from("/var/lib/casefile.db"));
    assert_eq!(expand_tilde(Path::new("relative.db")), PathBuf::from("relative.db"));
  }
}
