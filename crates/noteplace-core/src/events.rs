//! Placement event hooks for UI layers (connection-test dialogs, toasts, logs).

use crate::model::{ExistenceState, OperationPlan, OperationResult, RemoteDocumentRef};

/// Placement event handler.
///
/// Every method has a no-op default, so implementors override only what
/// they need.
#[allow(unused_variables)]
pub trait PlacementEvents: Send + Sync + 'static {
  /// An existence probe completed.
  fn on_probe(&self, target: &RemoteDocumentRef, state: &ExistenceState) {}

  /// A plan was resolved and is about to be executed.
  fn on_planned(&self, plan: &OperationPlan) {}

  /// A placement or connection test finished.
  fn on_finished(&self, result: &OperationResult) {}

  /// Something failed.
  fn on_error(&self, message: &str) {}
}

/// Empty handler (tests, CLI without UI).
pub struct NoopEvents;

impl PlacementEvents for NoopEvents {}
