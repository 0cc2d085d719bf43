//! Placement resolver: behavior state machine plus execution.
//!
//! ```text
//! gate ─► normalize ─► branch on behavior ─► probe / reserve ─► plan ─► execute
//! ```
//!
//! Probe and write are separate requests with nothing held in between, so
//! the [`PlanBasis`] reported in a result may be stale when the write lands.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::{
  config::RemoteConfig,
  error::PlaceError,
  events::{NoopEvents, PlacementEvents},
  model::{
    ExistenceState, HttpMethod, OperationPlan, OperationResult, Payload, PlanBasis, Placement,
    PlacementRequest, Position, RemoteDocumentRef, SaveBehavior
  },
  naming,
  probe::Prober,
  remote::Remote
};

/// Entry point: places documents on one remote using one config snapshot.
///
/// Holds no per-placement state; concurrent calls do not interfere (and are
/// not coordinated either).
pub struct Placer<R: Remote> {
  config: RemoteConfig,
  remote: Arc<R>,
  events: Arc<dyn PlacementEvents>
}

impl<R: Remote> Placer<R> {
  /// Create a placer.
  #[must_use]
  pub fn new(config: RemoteConfig, remote: R) -> Self {
    Self {
      config,
      remote: Arc::new(remote),
      events: Arc::new(NoopEvents)
    }
  }

  /// Attach an event handler.
  #[must_use]
  pub fn with_events(mut self, events: impl PlacementEvents) -> Self {
    self.events = Arc::new(events);
    self
  }

  /// Config snapshot in use.
  #[must_use]
  pub fn config(&self) -> &RemoteConfig {
    &self.config
  }

  /// Underlying remote.
  #[must_use]
  pub fn remote(&self) -> &R {
    &self.remote
  }

  /// Availability gate.
  #[must_use]
  pub fn is_available(&self) -> bool {
    self.config.is_available()
  }

  /// Connection test for settings screens.
  pub async fn test_connection(&self) -> OperationResult {
    let outcome = match self.config.availability() {
      Ok(()) => self.remote.test_connection().await,
      Err(e) => Err(e)
    };

    let result = match outcome {
      Ok(()) => {
        info!(remote = self.remote.name(), "connection ok");
        OperationResult::ok(None)
      }
      Err(e) => {
        self.events.on_error(&e.to_string());
        OperationResult::failed(&e, None)
      }
    };
    self.events.on_finished(&result);
    result
  }

  /// Place `request` now.
  pub async fn place(&self, request: &PlacementRequest) -> OperationResult {
    self.place_at(request, Utc::now()).await
  }

  /// Place `request` as if the clock read `now` (daily name, timestamp fallback).
  pub async fn place_at(&self, request: &PlacementRequest, now: DateTime<Utc>) -> OperationResult {
    let plan = match self.plan_at(request, now).await {
      Ok(plan) => plan,
      Err(e) => return self.finish_failed(&e, None)
    };

    self.events.on_planned(&plan);
    let placement = plan.placement();

    match self.remote.execute(plan).await {
      Ok(()) => {
        info!(
          method = %placement.method,
          target = %placement.target,
          behavior = %request.behavior,
          "note placed"
        );
        let result = OperationResult::ok(Some(placement));
        self.events.on_finished(&result);
        result
      }
      Err(e) => {
        error!(
          method = %placement.method,
          target = %placement.target,
          error = %e,
          "placement failed"
        );
        self.finish_failed(&e, Some(placement))
      }
    }
  }

  /// Resolve `request` without sending the mutating request. Probes still run.
  ///
  /// # Errors
  ///
  /// Configuration, invalid-request, or (under the abort policy)
  /// ambiguous-existence failures.
  pub async fn plan(&self, request: &PlacementRequest) -> Result<OperationPlan, PlaceError> {
    self.plan_at(request, Utc::now()).await
  }

  /// [`Self::plan`] against a fixed clock.
  ///
  /// # Errors
  ///
  /// See [`Self::plan`].
  pub async fn plan_at(
    &self,
    request: &PlacementRequest,
    now: DateTime<Utc>
  ) -> Result<OperationPlan, PlaceError> {
    self.config.availability()?;

    let destination = request.destination();
    let prober = Prober::new(&*self.remote, &*self.events, self.config.on_ambiguous);
    let body = request.body.clone();

    let plan = match request.behavior {
      SaveBehavior::AppendDaily | SaveBehavior::PrependDaily => {
        // The service owns the daily namespace: vault root, caller directory ignored.
        let target = RemoteDocumentRef::new(
          destination.vault(),
          naming::daily_note_path(now.date_naive())
        );
        let state = prober.observe(&target).await?;
        merge_or_create(target, state, merge_position(request.behavior), body)
      }
      SaveBehavior::AppendSpecific | SaveBehavior::PrependSpecific => {
        let target = destination.note_ref()?;
        let state = prober.observe(&target).await?;
        merge_or_create(target, state, merge_position(request.behavior), body)
      }
      SaveBehavior::Overwrite => OperationPlan::new(
        HttpMethod::Put,
        destination.note_ref()?,
        Payload::Raw { body },
        PlanBasis::Unconditional
      ),
      SaveBehavior::Create => {
        let reservation =
          naming::reserve(&prober, &destination, self.config.collision_limit(), now).await?;
        OperationPlan::new(
          HttpMethod::Post,
          reservation.target,
          Payload::Raw { body },
          reservation.basis
        )
      }
    };

    debug!(
      behavior = %request.behavior,
      method = %plan.method,
      target = %plan.target,
      content_type = plan.content_type.mime(),
      "plan resolved"
    );
    Ok(plan)
  }

  fn finish_failed(&self, e: &PlaceError, placement: Option<Placement>) -> OperationResult {
    self.events.on_error(&e.to_string());
    let result = OperationResult::failed(e, placement);
    self.events.on_finished(&result);
    result
  }
}

fn merge_position(behavior: SaveBehavior) -> Position {
  behavior.merge_position().unwrap_or(Position::End)
}

/// Absent (or unknown) targets are created with the whole body; append vs
/// prepend only matters once there is something to merge into.
fn merge_or_create(
  target: RemoteDocumentRef,
  state: ExistenceState,
  position: Position,
  body: String
) -> OperationPlan {
  if state.is_present() {
    OperationPlan::new(
      HttpMethod::Patch,
      target,
      Payload::Merge {
        content: body,
        position
      },
      PlanBasis::Observed(state)
    )
  } else {
    OperationPlan::new(
      HttpMethod::Post,
      target,
      Payload::Raw { body },
      PlanBasis::Observed(state)
    )
  }
}
