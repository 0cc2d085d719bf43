//! Test utilities: `MockRemote` and `RecordingEvents`.

#![allow(clippy::expect_used)]

use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering}
  },
  time::Duration
};

use crate::{
  error::PlaceError,
  events::PlacementEvents,
  model::{
    ExistenceState, HttpMethod, OperationPlan, OperationResult, Payload, Position,
    RemoteDocumentRef
  }
};

/// In-memory remote for unit testing the resolver.
///
/// Keeps documents in a map, applies executed plans to it, and records every
/// probe and plan for subsequent assertions.
#[derive(Default)]
pub struct MockRemote {
  /// Stored documents.
  documents: Mutex<HashMap<RemoteDocumentRef, String>>,
  /// Targets whose probe is ambiguous, with the reported reason.
  ambiguous: Mutex<HashMap<RemoteDocumentRef, String>>,
  /// Report every target as present.
  everything_present: AtomicBool,
  /// Recorded probes.
  probes: Mutex<Vec<RemoteDocumentRef>>,
  /// Recorded executed plans.
  executed: Mutex<Vec<OperationPlan>>,
  /// Number of `test_connection()` calls.
  connection_checks: AtomicUsize,
  /// Error returned by `test_connection()` (if set).
  connection_error: Mutex<Option<PlaceError>>,
  /// Error returned by `execute()` (if set).
  execute_error: Mutex<Option<PlaceError>>
}

impl MockRemote {
  /// Empty remote.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed a document.
  pub fn add_document(&self, vault: Option<&str>, path: &str, content: &str) {
    self
      .documents
      .lock()
      .expect("lock")
      .insert(RemoteDocumentRef::new(vault, path), content.to_string());
  }

  /// Read a document back.
  #[must_use]
  pub fn document(&self, vault: Option<&str>, path: &str) -> Option<String> {
    self
      .documents
      .lock()
      .expect("lock")
      .get(&RemoteDocumentRef::new(vault, path))
      .cloned()
  }

  /// Make probes of `path` ambiguous.
  pub fn set_ambiguous(&self, vault: Option<&str>, path: &str, reason: &str) {
    self
      .ambiguous
      .lock()
      .expect("lock")
      .insert(RemoteDocumentRef::new(vault, path), reason.to_string());
  }

  /// Report every probed target as present.
  pub fn set_everything_present(&self, on: bool) {
    self.everything_present.store(on, Ordering::Relaxed);
  }

  /// Fail `test_connection()` with `error`.
  pub fn fail_connection(&self, error: PlaceError) {
    *self.connection_error.lock().expect("lock") = Some(error);
  }

  /// Fail `execute()` with `error`.
  pub fn fail_execute(&self, error: PlaceError) {
    *self.execute_error.lock().expect("lock") = Some(error);
  }

  /// Number of probes.
  pub fn probe_count(&self) -> usize {
    self.probes.lock().expect("lock").len()
  }

  /// Executed plans, in order.
  pub fn executed(&self) -> Vec<OperationPlan> {
    self.executed.lock().expect("lock").clone()
  }

  /// Number of `test_connection()` calls.
  pub fn connection_checks(&self) -> usize {
    self.connection_checks.load(Ordering::Relaxed)
  }
}

impl crate::remote::Remote for MockRemote {
  async fn test_connection(&self) -> Result<(), PlaceError> {
    self.connection_checks.fetch_add(1, Ordering::Relaxed);
    match self.connection_error.lock().expect("lock").clone() {
      Some(e) => Err(e),
      None => Ok(())
    }
  }

  async fn exists(&self, target: &RemoteDocumentRef) -> ExistenceState {
    self.probes.lock().expect("lock").push(target.clone());

    if let Some(reason) = self.ambiguous.lock().expect("lock").get(target) {
      return ExistenceState::Unknown(reason.clone());
    }
    if self.everything_present.load(Ordering::Relaxed)
      || self.documents.lock().expect("lock").contains_key(target)
    {
      ExistenceState::Present
    } else {
      ExistenceState::Absent
    }
  }

  async fn execute(&self, plan: OperationPlan) -> Result<(), PlaceError> {
    self.executed.lock().expect("lock").push(plan.clone());

    if let Some(e) = self.execute_error.lock().expect("lock").clone() {
      return Err(e);
    }

    let mut docs = self.documents.lock().expect("lock");
    match (plan.method, plan.payload) {
      (HttpMethod::Post | HttpMethod::Put, Payload::Raw { body }) => {
        docs.insert(plan.target, body);
      }
      (HttpMethod::Patch, Payload::Merge { content, position }) => {
        let Some(existing) = docs.get_mut(&plan.target) else {
          return Err(PlaceError::Rejected {
            status: 404,
            body: "not found".to_string()
          });
        };
        match position {
          Position::Start => existing.insert_str(0, &content),
          Position::End => existing.push_str(&content)
        }
      }
      (method, _) => {
        return Err(PlaceError::Rejected {
          status: 400,
          body: format!("unexpected payload for {method}")
        });
      }
    }
    Ok(())
  }

  fn name(&self) -> &'static str {
    "mock"
  }
}

/// Event handler that records all calls. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingEvents {
  /// Recorded `on_probe(target, state)` calls.
  pub probe_calls: Arc<Mutex<Vec<(RemoteDocumentRef, ExistenceState)>>>,
  /// Recorded `on_planned(plan)` calls.
  pub planned_calls: Arc<Mutex<Vec<OperationPlan>>>,
  /// Recorded `on_finished(result)` calls.
  pub finished_calls: Arc<Mutex<Vec<OperationResult>>>,
  /// Recorded `on_error(message)` calls.
  pub error_calls: Arc<Mutex<Vec<String>>>
}

impl RecordingEvents {
  /// Empty recorder.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of `on_probe` calls.
  pub fn probe_count(&self) -> usize {
    self.probe_calls.lock().expect("lock").len()
  }

  /// Plans seen by `on_planned`.
  pub fn planned(&self) -> Vec<OperationPlan> {
    self.planned_calls.lock().expect("lock").clone()
  }

  /// Results seen by `on_finished`.
  pub fn finished(&self) -> Vec<OperationResult> {
    self.finished_calls.lock().expect("lock").clone()
  }

  /// Messages seen by `on_error`.
  pub fn errors(&self) -> Vec<String> {
    self.error_calls.lock().expect("lock").clone()
  }
}

impl PlacementEvents for RecordingEvents {
  fn on_probe(&self, target: &RemoteDocumentRef, state: &ExistenceState) {
    self
      .probe_calls
      .lock()
      .expect("lock")
      .push((target.clone(), state.clone()));
  }

  fn on_planned(&self, plan: &OperationPlan) {
    self.planned_calls.lock().expect("lock").push(plan.clone());
  }

  fn on_finished(&self, result: &OperationResult) {
    self.finished_calls.lock().expect("lock").push(result.clone());
  }

  fn on_error(&self, message: &str) {
    self.error_calls.lock().expect("lock").push(message.to_string());
  }
}

/// Default timeout for async tests (10 seconds).
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Wrap an async test body with a timeout and status output.
///
/// Usage:
/// ```ignore
/// #[tokio::test]
/// async fn test_foo() {
///     with_timeout("test_foo", async {
///         // test body
///     }).await;
/// }
/// ```
#[allow(clippy::panic)]
pub async fn with_timeout<F, T>(test_name: &str, f: F) -> T
where
  F: std::future::Future<Output = T>
{
  eprintln!("[TEST] Starting: {test_name}");
  let result = tokio::time::timeout(TEST_TIMEOUT, f)
    .await
    .unwrap_or_else(|_| panic!("[TEST] {test_name} timed out after {TEST_TIMEOUT:?}"));
  eprintln!("[TEST] Completed: {test_name}");
  result
}
