//! Failure taxonomy of a placement attempt.

use thiserror::Error;

/// Why a placement (or connection test) failed.
///
/// Every variant is local to one invocation. Nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceError {
  /// Integration disabled or incompletely configured. No network call was made.
  #[error("remote vault is unavailable: {0}")]
  Unavailable(String),

  /// DNS, TLS, timeout, refused connection and friends.
  #[error("{0}")]
  Transport(String),

  /// The service answered with a non-success status.
  #[error("HTTP {status}: {body}")]
  Rejected {
    /// Numeric HTTP status.
    status: u16,
    /// Response body text, verbatim.
    body: String
  },

  /// A probe could not tell whether the target exists and the configured
  /// policy refuses to guess.
  #[error("could not determine whether {path} exists: {reason}")]
  AmbiguousExistence {
    /// Target that was probed.
    path: String,
    /// Status or transport message returned by the probe.
    reason: String
  },

  /// The request itself cannot be turned into a remote operation.
  #[error("invalid request: {0}")]
  InvalidRequest(String)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_rejected_message_embeds_status_and_body() {
    let e = PlaceError::Rejected {
      status: 500,
      body: "boom".to_string()
    };
    assert_eq!(e.to_string(), "HTTP 500: boom");
  }

  #[test]
  fn test_transport_message_is_passed_through() {
    let e = PlaceError::Transport("connection refused".to_string());
    assert_eq!(e.to_string(), "connection refused");
  }
}
