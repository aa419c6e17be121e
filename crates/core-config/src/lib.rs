//! Configuration loading and parsing.
//!
//! Parses `brlx.toml` (or an override path provided by the binary):
//! - `[expansion] policy = "none" | "selection" | "all"` (default `selection`)
//! - `[expansion] uncontracted = <bool>` (default `true`); when false the
//!   uncontracted backend is not wired in and no expansion happens.
//! - `[translate] timeout_ms = <u64>` (optional). The raw value is retained;
//!   `Config::resolve` derives the effective timeout, treating `0` as "wait
//!   indefinitely".
//!
//! Unknown fields are ignored and an unparsable file falls back to defaults
//! so a broken config never prevents braille output.

use anyhow::Result;
use core_braille::ExpansionPolicy;
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "brlx.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct ExpansionConfig {
    #[serde(default)]
    pub policy: ExpansionPolicy,
    #[serde(default = "ExpansionConfig::default_uncontracted")]
    pub uncontracted: bool,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            policy: ExpansionPolicy::default(),
            uncontracted: Self::default_uncontracted(),
        }
    }
}

impl ExpansionConfig {
    const fn default_uncontracted() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TranslateConfig {
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub expansion: ExpansionConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,                // original file string (optional)
    pub file: ConfigFile,                   // parsed (or default) data
    pub effective_timeout: Option<Duration>, // resolved by `resolve`
}

/// Best-effort config path: working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("brlx").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default().resolved());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            file,
            effective_timeout: None,
        }
        .resolved()),
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default().resolved())
        }
    }
}

impl Config {
    /// Derive effective values from the raw file. Returns the effective timeout.
    pub fn resolve(&mut self) -> Option<Duration> {
        let effective = match self.file.translate.timeout_ms {
            Some(0) => {
                info!(target: "config", raw = 0u64, "translate_timeout_zero_disabled");
                None
            }
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        };
        self.effective_timeout = effective;
        effective
    }

    fn resolved(mut self) -> Self {
        self.resolve();
        self
    }

    pub fn policy(&self) -> ExpansionPolicy {
        self.file.expansion.policy
    }

    pub fn uncontracted_enabled(&self) -> bool {
        self.file.expansion.uncontracted
    }
}
