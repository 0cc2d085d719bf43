//! Placement data model.
//!
//! Everything here lives for one placement attempt: built by the resolver,
//! consumed by the remote, then dropped.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::PlaceError, naming};

/// Caller-declared intent for placing a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaveBehavior {
  /// New note, suffixed on collision.
  #[default]
  Create,
  /// Append to the named note (create it if missing).
  AppendSpecific,
  /// Prepend to the named note (create it if missing).
  PrependSpecific,
  /// Replace the named note unconditionally.
  Overwrite,
  /// Append to today's daily note (create it if missing).
  AppendDaily,
  /// Prepend to today's daily note (create it if missing).
  PrependDaily
}

impl SaveBehavior {
  /// Every behavior, in declaration order.
  pub const ALL: [Self; 6] = [
    Self::Create,
    Self::AppendSpecific,
    Self::PrependSpecific,
    Self::Overwrite,
    Self::AppendDaily,
    Self::PrependDaily
  ];

  /// Wire tag.
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Create => "create",
      Self::AppendSpecific => "append-specific",
      Self::PrependSpecific => "prepend-specific",
      Self::Overwrite => "overwrite",
      Self::AppendDaily => "append-daily",
      Self::PrependDaily => "prepend-daily"
    }
  }

  /// Targets today's daily note instead of the caller's destination.
  #[must_use]
  pub const fn is_daily(self) -> bool {
    matches!(self, Self::AppendDaily | Self::PrependDaily)
  }

  /// Merge position for the append/prepend family.
  #[must_use]
  pub const fn merge_position(self) -> Option<Position> {
    match self {
      Self::AppendSpecific | Self::AppendDaily => Some(Position::End),
      Self::PrependSpecific | Self::PrependDaily => Some(Position::Start),
      Self::Create | Self::Overwrite => None
    }
  }
}

impl fmt::Display for SaveBehavior {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SaveBehavior {
  type Err = PlaceError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    Self::ALL
      .into_iter()
      .find(|b| b.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| PlaceError::InvalidRequest(format!("unknown save behavior {s:?}")))
  }
}

/// Where a merge lands inside an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
  /// Before the existing content.
  Start,
  /// After the existing content.
  End
}

/// Caller-supplied destination after normalization.
///
/// `directory` is empty or ends with exactly one `/`; `note_name` has been
/// through [`naming::sanitize_note_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
  vault: Option<String>,
  directory: String,
  note_name: String
}

impl Destination {
  /// Normalize raw caller input.
  #[must_use]
  pub fn new(vault: Option<&str>, directory: &str, note_name: &str) -> Self {
    Self {
      vault: vault
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string),
      directory: naming::normalize_directory(directory),
      note_name: naming::sanitize_note_name(note_name)
    }
  }

  /// Vault identifier, if any.
  #[must_use]
  pub fn vault(&self) -> Option<&str> {
    self.vault.as_deref()
  }

  /// Normalized directory (`""` or `"a/b/"`).
  #[must_use]
  pub fn directory(&self) -> &str {
    &self.directory
  }

  /// Sanitized note name.
  #[must_use]
  pub fn note_name(&self) -> &str {
    &self.note_name
  }

  /// The unsuffixed target `<directory><note_name>.md`.
  ///
  /// # Errors
  ///
  /// [`PlaceError::InvalidRequest`] when nothing is left of the note name.
  pub fn note_ref(&self) -> Result<RemoteDocumentRef, PlaceError> {
    if self.note_name.is_empty() {
      return Err(PlaceError::InvalidRequest(
        "note name is empty after sanitizing".to_string()
      ));
    }
    Ok(RemoteDocumentRef::new(
      self.vault(),
      naming::candidate_path(&self.directory, &self.note_name, None)
    ))
  }
}

/// Fully resolved remote document: optional vault plus vault-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RemoteDocumentRef {
  vault: Option<String>,
  path: String
}

impl RemoteDocumentRef {
  /// Build a reference.
  #[must_use]
  pub fn new(vault: Option<&str>, path: impl Into<String>) -> Self {
    Self {
      vault: vault.map(str::to_string),
      path: path.into()
    }
  }

  /// Vault identifier, if any.
  #[must_use]
  pub fn vault(&self) -> Option<&str> {
    self.vault.as_deref()
  }

  /// Vault-relative path including the `.md` extension.
  #[must_use]
  pub fn path(&self) -> &str {
    &self.path
  }
}

impl fmt::Display for RemoteDocumentRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.vault {
      Some(v) => write!(f, "{v}:{}", self.path),
      None => f.write_str(&self.path)
    }
  }
}

/// Outcome of one existence probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "kebab-case")]
pub enum ExistenceState {
  /// Success status: a document is there.
  Present,
  /// Clean `404`: authoritative negative.
  Absent,
  /// Anything else. Carries the status line or transport message.
  Unknown(String)
}

impl ExistenceState {
  /// Only [`Self::Present`] counts as present; `Unknown` reads as absent.
  #[must_use]
  pub const fn is_present(&self) -> bool {
    matches!(self, Self::Present)
  }
}

/// Mutating HTTP method of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
  /// Create with full content.
  Post,
  /// Unconditional overwrite.
  Put,
  /// Partial merge.
  Patch
}

impl HttpMethod {
  /// Method name on the wire.
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Post => "POST",
      Self::Put => "PUT",
      Self::Patch => "PATCH"
    }
  }
}

impl fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Payload {
  /// Document body sent as-is.
  Raw {
    /// Full markdown text.
    body: String
  },
  /// JSON envelope `{content, position}` for a partial update.
  Merge {
    /// Text to merge in.
    content: String,
    /// Start or end of the existing document.
    position: Position
  }
}

impl Payload {
  /// Content type matching the payload shape.
  #[must_use]
  pub const fn content_type(&self) -> ContentType {
    match self {
      Self::Raw { .. } => ContentType::Markdown,
      Self::Merge { .. } => ContentType::Json
    }
  }
}

/// Content-type hint attached to a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
  /// `text/markdown`.
  Markdown,
  /// `application/json`.
  Json
}

impl ContentType {
  /// MIME string.
  #[must_use]
  pub const fn mime(self) -> &'static str {
    match self {
      Self::Markdown => "text/markdown",
      Self::Json => "application/json"
    }
  }
}

/// Remote state a plan was derived from.
///
/// Probe and write are two separate requests, so an observed state may be
/// stale by the time the write lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanBasis {
  /// No probe: the write does not depend on remote state.
  Unconditional,
  /// Decided from this probe result.
  Observed(ExistenceState),
  /// Collision search exhausted; timestamp-suffixed name used without a probe.
  TimestampFallback
}

/// One resolved remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationPlan {
  /// HTTP method.
  pub method: HttpMethod,
  /// Target document.
  pub target: RemoteDocumentRef,
  /// Request body.
  pub payload: Payload,
  /// Content-type hint, derived from `payload`.
  pub content_type: ContentType,
  /// Remote state the plan relies on.
  pub basis: PlanBasis
}

impl OperationPlan {
  /// Build a plan; the content type follows the payload.
  #[must_use]
  pub fn new(
    method: HttpMethod,
    target: RemoteDocumentRef,
    payload: Payload,
    basis: PlanBasis
  ) -> Self {
    Self {
      method,
      content_type: payload.content_type(),
      target,
      payload,
      basis
    }
  }

  /// Summary kept after the plan itself is consumed.
  #[must_use]
  pub fn placement(&self) -> Placement {
    Placement {
      method: self.method,
      target: self.target.clone(),
      basis: self.basis.clone()
    }
  }
}

/// What was sent where, and on what basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
  /// HTTP method.
  pub method: HttpMethod,
  /// Target document.
  pub target: RemoteDocumentRef,
  /// Remote state the write relied on.
  pub basis: PlanBasis
}

/// Terminal result of a placement or connection test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
  /// Whether the operation succeeded.
  pub success: bool,
  /// Failure message.
  pub error: Option<String>,
  /// Set once a plan was executed, successfully or not.
  pub placement: Option<Placement>
}

impl OperationResult {
  /// Success.
  #[must_use]
  pub const fn ok(placement: Option<Placement>) -> Self {
    Self {
      success: true,
      error: None,
      placement
    }
  }

  /// Failure carrying `error`'s message.
  #[must_use]
  pub fn failed(error: &PlaceError, placement: Option<Placement>) -> Self {
    Self {
      success: false,
      error: Some(error.to_string()),
      placement
    }
  }
}

/// Inbound call: a finished document and where/how to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRequest {
  /// Finished document body.
  pub body: String,
  /// Note name before sanitizing.
  pub note_name: String,
  /// Directory inside the vault, `/`-separated.
  pub directory: String,
  /// Vault identifier.
  pub vault: Option<String>,
  /// Save behavior.
  pub behavior: SaveBehavior
}

impl PlacementRequest {
  /// `create` request at the vault root.
  #[must_use]
  pub fn new(body: impl Into<String>, note_name: impl Into<String>) -> Self {
    Self {
      body: body.into(),
      note_name: note_name.into(),
      directory: String::new(),
      vault: None,
      behavior: SaveBehavior::default()
    }
  }

  /// Set the directory.
  #[must_use]
  pub fn directory(mut self, directory: impl Into<String>) -> Self {
    self.directory = directory.into();
    self
  }

  /// Set the vault.
  #[must_use]
  pub fn vault(mut self, vault: impl Into<String>) -> Self {
    self.vault = Some(vault.into());
    self
  }

  /// Set the behavior.
  #[must_use]
  pub const fn behavior(mut self, behavior: SaveBehavior) -> Self {
    self.behavior = behavior;
    self
  }

  /// Normalized destination.
  #[must_use]
  pub fn destination(&self) -> Destination {
    Destination::new(self.vault.as_deref(), &self.directory, &self.note_name)
  }
}
