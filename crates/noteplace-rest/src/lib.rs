//! noteplace-rest — REST remote for `noteplace`.
//!
//! Implements `noteplace_core::Remote` over the vault HTTP API:
//!
//! | Call | Request |
//! |------|---------|
//! | connection test | `GET /` |
//! | existence probe | `GET /vault/{vault}/{path}` |
//! | create | `POST /vault/{vault}/{path}` (raw markdown) |
//! | overwrite | `PUT /vault/{vault}/{path}` (raw markdown) |
//! | merge | `PATCH /vault/{vault}/{path}` (`{content, position}`) |

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod models;

pub use client::RestRemote;

use anyhow::Context;
use noteplace_core::{Placer, RemoteConfig};

/// Build a [`Placer`] talking to the service described by `config`.
///
/// # Errors
///
/// Returns an error if the config does not pass the availability gate or
/// the HTTP client cannot be built.
pub fn connect(config: RemoteConfig) -> anyhow::Result<Placer<RestRemote>> {
  config.availability()?;
  let remote = RestRemote::new(&config.base_url, &config.api_key)
    .context("building vault HTTP client")?;
  Ok(Placer::new(config, remote))
}
