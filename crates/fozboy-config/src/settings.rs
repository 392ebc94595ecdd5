use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub const DEFAULT_IMAGE_PATH: &str = "./tui/test-gbc-fitted.png";

/// Top-level schema of `config.toml`. Every section is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub input: InputConfig,
    pub image: ImageConfig,
}

/// How key releases are detected and how fast the release timer runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InputConfig {
    pub policy: InputPolicyKind,
    pub tick_hz: u32,
    pub release_ticks: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            policy: InputPolicyKind::Auto,
            tick_hz: 60,
            release_ticks: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicyKind {
    /// Probe the terminal for release events at startup.
    #[default]
    Auto,
    Edge,
    Timeout,
}

impl FromStr for InputPolicyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "edge" => Ok(Self::Edge),
            "timeout" => Ok(Self::Timeout),
            other => bail!("unknown input policy {other:?} (expected auto, edge or timeout)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ImageConfig {
    pub path: PathBuf,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_IMAGE_PATH),
        }
    }
}

impl Config {
    /// Parse and validate config TOML.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;

        Self::from_toml_str(&raw).with_context(|| format!("invalid config at {}", path.display()))
    }

    /// Load from [`config_path`], falling back to defaults when no file
    /// exists, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::from_path(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(
            std::env::var("FOZBOY_INPUT").ok().as_deref(),
            std::env::var_os("FOZBOY_IMAGE").map(PathBuf::from),
        );
        Ok(config)
    }

    /// Apply override values. An unparseable policy is ignored so a typo in
    /// the environment cannot stop the program from starting.
    pub fn apply_overrides(&mut self, policy: Option<&str>, image: Option<PathBuf>) {
        if let Some(policy) = policy.and_then(|raw| raw.parse::<InputPolicyKind>().ok()) {
            self.input.policy = policy;
        }
        if let Some(path) = image.filter(|p| !p.as_os_str().is_empty()) {
            self.image.path = path;
        }
    }

    /// Validate semantic constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.input.tick_hz == 0 || self.input.tick_hz > 1000 {
            bail!(
                "input.tick_hz must be between 1 and 1000, got {}",
                self.input.tick_hz
            );
        }
        if self.input.release_ticks == 0 {
            bail!("input.release_ticks must be at least 1");
        }
        if self.image.path.as_os_str().is_empty() {
            bail!("image.path must not be empty");
        }
        Ok(())
    }
}

/// Return the config file path.
///
/// Precedence: `FOZBOY_CONFIG` env var > `<config_dir>/fozboy/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("FOZBOY_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("fozboy").join("config.toml"))
}
