//! Vault REST API models (serde).

use noteplace_core::Position;
use serde::{Deserialize, Serialize};

/// Body of a `PATCH` merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergeEnvelope<'a> {
  /// Text to merge in.
  pub content: &'a str,
  /// `"start"` or `"end"`.
  pub position: Position
}

/// API error body, when the service sends one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
  /// Numeric error code.
  #[serde(rename = "errorCode")]
  pub error_code: Option<u32>,
  /// Human-readable message.
  pub message: Option<String>
}

/// Service root response (`GET /`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
  /// `"OK"` when healthy.
  #[serde(default)]
  pub status: String,
  /// Whether the bearer credential was accepted.
  #[serde(default)]
  pub authenticated: bool
}
