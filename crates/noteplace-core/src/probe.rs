//! Existence probing with the ambiguity policy applied.

use tracing::{debug, warn};

use crate::{
  config::AmbiguousExistencePolicy,
  error::PlaceError,
  events::PlacementEvents,
  model::{ExistenceState, RemoteDocumentRef},
  remote::Remote
};

/// Wraps [`Remote::exists`] for one placement attempt.
pub struct Prober<'a, R> {
  remote: &'a R,
  events: &'a dyn PlacementEvents,
  policy: AmbiguousExistencePolicy
}

impl<'a, R: Remote> Prober<'a, R> {
  /// Create a prober.
  #[must_use]
  pub fn new(
    remote: &'a R,
    events: &'a dyn PlacementEvents,
    policy: AmbiguousExistencePolicy
  ) -> Self {
    Self {
      remote,
      events,
      policy
    }
  }

  /// Probe `target`. States are never cached; every call hits the remote.
  ///
  /// # Errors
  ///
  /// [`PlaceError::AmbiguousExistence`] for an unknown state under
  /// [`AmbiguousExistencePolicy::Abort`].
  pub async fn observe(&self, target: &RemoteDocumentRef) -> Result<ExistenceState, PlaceError> {
    let state = self.remote.exists(target).await;
    self.events.on_probe(target, &state);

    match (&state, self.policy) {
      (ExistenceState::Unknown(reason), AmbiguousExistencePolicy::Abort) => {
        warn!(target = %target, reason = %reason, "ambiguous existence, aborting");
        Err(PlaceError::AmbiguousExistence {
          path: target.to_string(),
          reason: reason.clone()
        })
      }
      (ExistenceState::Unknown(reason), AmbiguousExistencePolicy::TreatAsAbsent) => {
        warn!(target = %target, reason = %reason, "ambiguous existence, treating as absent");
        Ok(state)
      }
      _ => {
        debug!(target = %target, ?state, "probed");
        Ok(state)
      }
    }
  }
}
