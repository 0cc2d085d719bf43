//! `noteplace` configuration.
//!
//! The engine never reads process-wide settings: callers hand a
//! [`RemoteConfig`] snapshot to each entry point.

use std::{fmt, path::Path, path::PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::PlaceError;

/// Top-level settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
  /// Remote vault connection.
  #[serde(default)]
  pub remote: RemoteConfig,
  /// Logging settings.
  #[serde(default)]
  pub logging: LoggingConfig
}

impl Settings {
  /// Load settings from a JSON file.
  ///
  /// # Errors
  ///
  /// Returns an IO or parse error.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let data = std::fs::read_to_string(path)
      .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
  }
}

/// What to do when an existence probe is neither a success nor a clean 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmbiguousExistencePolicy {
  /// Treat the target as absent and carry on (may create a file during an outage).
  #[default]
  TreatAsAbsent,
  /// Fail the placement before any mutating request is sent.
  Abort
}

/// Read-only snapshot of the remote integration settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
  /// Integration switch.
  #[serde(default = "RemoteConfig::default_enabled")]
  pub enabled: bool,
  /// Service root, e.g. `https://127.0.0.1:27124`.
  #[serde(default)]
  pub base_url: String,
  /// Bearer credential.
  #[serde(default)]
  pub api_key: String,
  /// Number of suffixed candidates tried by the collision-avoidance namer.
  #[serde(default = "RemoteConfig::default_collision_limit")]
  pub collision_limit: u32,
  /// Handling of ambiguous existence probes.
  #[serde(default)]
  pub on_ambiguous: AmbiguousExistencePolicy
}

impl RemoteConfig {
  /// Upper bound on suffixed candidates, so a `create` probes at most 1000 paths.
  pub const MAX_COLLISION_LIMIT: u32 = 999;

  const fn default_enabled() -> bool {
    true
  }

  const fn default_collision_limit() -> u32 {
    Self::MAX_COLLISION_LIMIT
  }

  /// Enabled config pointing at `base_url` with `api_key`.
  #[must_use]
  pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      api_key: api_key.into(),
      ..Self::default()
    }
  }

  /// Availability gate. Pure, no I/O.
  ///
  /// # Errors
  ///
  /// [`PlaceError::Unavailable`] naming the first missing piece.
  pub fn availability(&self) -> Result<(), PlaceError> {
    if !self.enabled {
      return Err(PlaceError::Unavailable("integration is disabled".to_string()));
    }
    if self.base_url.trim().is_empty() {
      return Err(PlaceError::Unavailable("base URL is not configured".to_string()));
    }
    if self.api_key.trim().is_empty() {
      return Err(PlaceError::Unavailable("API key is not configured".to_string()));
    }
    Ok(())
  }

  /// `true` when [`Self::availability`] passes.
  #[must_use]
  pub fn is_available(&self) -> bool {
    self.availability().is_ok()
  }

  /// Collision limit clamped to [`Self::MAX_COLLISION_LIMIT`].
  #[must_use]
  pub fn collision_limit(&self) -> u32 {
    self.collision_limit.min(Self::MAX_COLLISION_LIMIT)
  }
}

impl Default for RemoteConfig {
  fn default() -> Self {
    Self {
      enabled: Self::default_enabled(),
      base_url: String::new(),
      api_key: String::new(),
      collision_limit: Self::default_collision_limit(),
      on_ambiguous: AmbiguousExistencePolicy::default()
    }
  }
}

// The credential stays out of logs.
impl fmt::Debug for RemoteConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RemoteConfig")
      .field("enabled", &self.enabled)
      .field("base_url", &self.base_url)
      .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
      .field("collision_limit", &self.collision_limit)
      .field("on_ambiguous", &self.on_ambiguous)
      .finish()
  }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
  /// Log level.
  #[serde(default = "LoggingConfig::default_level")]
  pub level: String,
  /// Log file path.
  pub log_file: Option<PathBuf>
}

impl LoggingConfig {
  fn default_level() -> String {
    "info".to_string()
  }
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: Self::default_level(),
      log_file: None
    }
  }
}
