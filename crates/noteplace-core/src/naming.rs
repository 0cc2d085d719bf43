//! Remote path construction and collision-avoidance naming.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::{
  error::PlaceError,
  model::{Destination, PlanBasis, RemoteDocumentRef},
  probe::Prober,
  remote::Remote
};

/// Extension of every remote document.
pub const NOTE_EXTENSION: &str = "md";

/// Characters the remote filesystem (or its link syntax) cannot carry in a file name.
const ILLEGAL_NAME_CHARS: &[char] = &[
  '\\', '/', ':', '*', '?', '"', '<', '>', '|', '#', '^', '[', ']'
];

/// Strip characters illegal in a remote file name.
///
/// Whitespace runs collapse to one space, the ends are trimmed, and leading
/// dots are dropped so the note cannot become hidden.
#[must_use]
pub fn sanitize_note_name(name: &str) -> String {
  let cleaned: String = name
    .chars()
    .filter(|c| !ILLEGAL_NAME_CHARS.contains(c) && !c.is_control())
    .collect();

  cleaned
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
    .trim_start_matches('.')
    .trim_start()
    .to_string()
}

/// `""` stays empty; anything else ends with exactly one `/`.
///
/// Leading separators are dropped: remote paths are vault-relative.
#[must_use]
pub fn normalize_directory(directory: &str) -> String {
  let trimmed = directory.trim().trim_matches('/');
  if trimmed.is_empty() {
    String::new()
  } else {
    format!("{trimmed}/")
  }
}

/// `<directory><base><suffix>.md`, suffix rendered as `" <n>"`.
#[must_use]
pub fn candidate_path(directory: &str, base: &str, suffix: Option<i64>) -> String {
  match suffix {
    Some(n) => format!("{directory}{base} {n}.{NOTE_EXTENSION}"),
    None => format!("{directory}{base}.{NOTE_EXTENSION}")
  }
}

/// Daily note path at the vault root: `YYYY-MM-DD.md`.
#[must_use]
pub fn daily_note_path(date: NaiveDate) -> String {
  format!("{}.{NOTE_EXTENSION}", date.format("%Y-%m-%d"))
}

/// A target the namer considers free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
  /// Chosen target.
  pub target: RemoteDocumentRef,
  /// Probe result behind the choice, or the timestamp fallback.
  pub basis: PlanBasis
}

/// Find the first free `<base>.md`, `<base> 1.md`, … `<base> <limit>.md`.
///
/// When every candidate is taken, returns `<base> <epoch millis>.md`
/// without probing it.
///
/// # Errors
///
/// Only when the prober refuses an ambiguous answer.
pub async fn reserve<R: Remote>(
  prober: &Prober<'_, R>,
  destination: &Destination,
  limit: u32,
  now: DateTime<Utc>
) -> Result<Reservation, PlaceError> {
  let first = destination.note_ref()?;
  let state = prober.observe(&first).await?;
  if !state.is_present() {
    return Ok(Reservation {
      target: first,
      basis: PlanBasis::Observed(state)
    });
  }

  for n in 1..=limit {
    let target = RemoteDocumentRef::new(
      destination.vault(),
      candidate_path(destination.directory(), destination.note_name(), Some(i64::from(n)))
    );
    let state = prober.observe(&target).await?;
    if !state.is_present() {
      debug!(target = %target, attempt = n, "collision avoided");
      return Ok(Reservation {
        target,
        basis: PlanBasis::Observed(state)
      });
    }
  }

  let stamp = now.timestamp_millis();
  let target = RemoteDocumentRef::new(
    destination.vault(),
    candidate_path(destination.directory(), destination.note_name(), Some(stamp))
  );
  warn!(target = %target, limit, "collision search exhausted, using timestamp suffix");

  Ok(Reservation {
    target,
    basis: PlanBasis::TimestampFallback
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::{
    config::AmbiguousExistencePolicy, events::NoopEvents, model::ExistenceState,
    test_utils::MockRemote
  };

  #[test]
  fn test_sanitize_strips_illegal_characters() {
    assert_eq!(sanitize_note_name("What? A \"quote\": <tag>|x"), "What A quote tagx");
    assert_eq!(sanitize_note_name("a/b\\c"), "abc");
    assert_eq!(sanitize_note_name("[[Link]] #tag ^block"), "Link tag block");
  }

  #[test]
  fn test_sanitize_collapses_whitespace_and_leading_dots() {
    assert_eq!(sanitize_note_name("  Daily \t  Log\n"), "Daily Log");
    assert_eq!(sanitize_note_name("..hidden"), "hidden");
    assert_eq!(sanitize_note_name(". spaced"), "spaced");
    assert_eq!(sanitize_note_name("v1.2 notes"), "v1.2 notes");
  }

  #[test]
  fn test_normalize_directory() {
    assert_eq!(normalize_directory(""), "");
    assert_eq!(normalize_directory("  "), "");
    assert_eq!(normalize_directory("/"), "");
    assert_eq!(normalize_directory("Logs"), "Logs/");
    assert_eq!(normalize_directory("Logs/"), "Logs/");
    assert_eq!(normalize_directory("Logs///"), "Logs/");
    assert_eq!(normalize_directory("/Work/Logs"), "Work/Logs/");
  }

  #[test]
  fn test_candidate_and_daily_paths() {
    assert_eq!(candidate_path("Logs/", "Note", None), "Logs/Note.md");
    assert_eq!(candidate_path("", "Note", Some(3)), "Note 3.md");

    let date = NaiveDate::from_ymd_opt(2024, 3, 7).expect("date");
    assert_eq!(daily_note_path(date), "2024-03-07.md");
  }

  fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).single().expect("time")
  }

  #[tokio::test]
  async fn test_reserve_returns_unsuffixed_when_free() {
    let remote = MockRemote::new();
    let prober = Prober::new(&remote, &NoopEvents, AmbiguousExistencePolicy::TreatAsAbsent);
    let dest = Destination::new(Some("Main"), "Logs", "Note");

    let r = reserve(&prober, &dest, 999, fixed_now()).await.expect("reserve");
    assert_eq!(r.target.path(), "Logs/Note.md");
    assert_eq!(r.basis, PlanBasis::Observed(ExistenceState::Absent));
    assert_eq!(remote.probe_count(), 1);
  }

  #[tokio::test]
  async fn test_reserve_skips_taken_candidates() {
    let remote = MockRemote::new();
    remote.add_document(Some("Main"), "Logs/Note.md", "a");
    remote.add_document(Some("Main"), "Logs/Note 1.md", "b");
    let prober = Prober::new(&remote, &NoopEvents, AmbiguousExistencePolicy::TreatAsAbsent);
    let dest = Destination::new(Some("Main"), "Logs", "Note");

    let r = reserve(&prober, &dest, 999, fixed_now()).await.expect("reserve");
    assert_eq!(r.target.path(), "Logs/Note 2.md");
    assert_eq!(remote.probe_count(), 3);
  }

  #[tokio::test]
  async fn test_reserve_falls_back_to_timestamp() {
    let remote = MockRemote::new();
    remote.set_everything_present(true);
    let prober = Prober::new(&remote, &NoopEvents, AmbiguousExistencePolicy::TreatAsAbsent);
    let dest = Destination::new(None, "", "Note");
    let now = fixed_now();

    let r = reserve(&prober, &dest, 999, now).await.expect("reserve");
    assert_eq!(r.target.path(), format!("Note {}.md", now.timestamp_millis()));
    assert_eq!(r.basis, PlanBasis::TimestampFallback);
    // Unsuffixed candidate plus 999 suffixes; the fallback is not probed.
    assert_eq!(remote.probe_count(), 1000);
  }

  #[tokio::test]
  async fn test_reserve_honours_smaller_limit() {
    let remote = MockRemote::new();
    remote.set_everything_present(true);
    let prober = Prober::new(&remote, &NoopEvents, AmbiguousExistencePolicy::TreatAsAbsent);
    let dest = Destination::new(None, "", "Note");

    let r = reserve(&prober, &dest, 3, fixed_now()).await.expect("reserve");
    assert_eq!(r.basis, PlanBasis::TimestampFallback);
    assert_eq!(remote.probe_count(), 4);
  }

  #[tokio::test]
  async fn test_reserve_takes_ambiguous_candidate_as_free() {
    let remote = MockRemote::new();
    remote.set_ambiguous(None, "Note.md", "HTTP 503: busy");
    let prober = Prober::new(&remote, &NoopEvents, AmbiguousExistencePolicy::TreatAsAbsent);
    let dest = Destination::new(None, "", "Note");

    let r = reserve(&prober, &dest, 999, fixed_now()).await.expect("reserve");
    assert_eq!(r.target.path(), "Note.md");
    assert_eq!(
      r.basis,
      PlanBasis::Observed(ExistenceState::Unknown("HTTP 503: busy".to_string()))
    );
  }
}
