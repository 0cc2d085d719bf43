//! noteplace-core — note placement reconciliation engine.
//!
//! Contains:
//! - `RemoteConfig` — read-only configuration snapshot and availability gate
//! - `Remote` trait — seam to the note-storage service (probe, execute, connection test)
//! - `naming` — sanitizing, directory normalization, collision-avoidance namer
//! - `Placer` — behavior state machine: request → plan → one mutating request
//! - `PlacementEvents` — hooks for UI layers
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   caller     │ ──► │    Placer    │ ──► │    Remote    │
//! │ (CLI / UI)   │     │ (gate+plan)  │     │ (REST, mock) │
//! └──────────────┘     └──────┬───────┘     └──────▲───────┘
//!                             │                    │
//!                      ┌──────▼───────┐            │
//!                      │ Prober/namer │ ───────────┘
//!                      │ (GET probes) │
//!                      └──────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod naming;
pub mod probe;
pub mod remote;
pub mod resolver;
#[doc(hidden)]
pub mod test_utils;

pub use config::{AmbiguousExistencePolicy, LoggingConfig, RemoteConfig, Settings};
pub use error::PlaceError;
pub use events::{NoopEvents, PlacementEvents};
pub use model::{
  ContentType, Destination, ExistenceState, HttpMethod, OperationPlan, OperationResult, Payload,
  Placement, PlacementRequest, PlanBasis, Position, RemoteDocumentRef, SaveBehavior
};
pub use remote::Remote;
pub use resolver::Placer;
