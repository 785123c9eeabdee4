use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tally_ingest::{FetchMode, FetchOptions, DEFAULT_BASE_URL};

use crate::state::{ensure_tally_home, tally_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub source: SourceSection,
    pub fetch: FetchSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceSection {
    /// Pages are read from `{base_url}/{n}.json`
    pub base_url: String,
    /// Per-page request timeout
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchSection {
    /// "concurrent" or "sequential"
    pub mode: String,
    pub concurrency: usize,
    pub max_pages: u32,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            mode: "concurrent".to_string(),
            concurrency: 4,
            max_pages: 10_000,
        }
    }
}

impl Config {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs.max(1))
    }

    pub fn fetch_options(&self) -> Result<FetchOptions> {
        let mode = match self.fetch.mode.trim().to_ascii_lowercase().as_str() {
            "sequential" => FetchMode::Sequential,
            "concurrent" => FetchMode::Concurrent {
                concurrency: self.fetch.concurrency.max(1),
            },
            other => bail!("unknown fetch mode {other:?} (expected \"concurrent\" or \"sequential\")"),
        };
        Ok(FetchOptions {
            mode,
            page_timeout: self.page_timeout(),
            max_pages: self.fetch.max_pages.max(1),
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = ensure_tally_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let p = save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[fetch]
mode = "sequential"
"#,
        )
        .unwrap();
        assert_eq!(cfg.source.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.fetch.concurrency, 4);
        assert_eq!(cfg.fetch_options().unwrap().mode, FetchMode::Sequential);
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back, Config::default());
    }

    #[test]
    fn test_fetch_options_from_config() {
        let mut cfg = Config::default();
        cfg.source.timeout_secs = 0;
        cfg.fetch.concurrency = 0;
        let opts = cfg.fetch_options().unwrap();
        assert_eq!(opts.page_timeout, Duration::from_secs(1));
        assert_eq!(opts.mode, FetchMode::Concurrent { concurrency: 1 });

        cfg.fetch.mode = "threaded".to_string();
        assert!(cfg.fetch_options().is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let cfg = load_config_from(Path::new("/nonexistent/tally/config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }
}
