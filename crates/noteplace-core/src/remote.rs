//! Remote trait: the seam between the placement engine and the note service.
//!
//! The resolver decides WHAT to send; the remote decides HOW it travels.

use std::future::Future;

use crate::{
  error::PlaceError,
  model::{ExistenceState, OperationPlan, RemoteDocumentRef}
};

/// A note-storage service reachable over the network.
pub trait Remote: Send + Sync + 'static {
  /// Authenticated reachability check against the service root.
  ///
  /// Diagnostic only; placement never calls it.
  fn test_connection(&self) -> impl Future<Output = Result<(), PlaceError>> + Send;

  /// Does `target` currently hold a document?
  ///
  /// Never fails: success is [`ExistenceState::Present`], a clean not-found
  /// is [`ExistenceState::Absent`], everything else (other statuses,
  /// transport errors) is [`ExistenceState::Unknown`].
  fn exists(&self, target: &RemoteDocumentRef) -> impl Future<Output = ExistenceState> + Send;

  /// Issue exactly one request for `plan`. No retries.
  fn execute(&self, plan: OperationPlan) -> impl Future<Output = Result<(), PlaceError>> + Send;

  /// Remote name for logs.
  fn name(&self) -> &'static str;
}
