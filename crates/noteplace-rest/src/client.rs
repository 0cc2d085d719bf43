//! Vault REST API HTTP client.

use std::time::Instant;

use noteplace_core::{
  ExistenceState, HttpMethod, OperationPlan, Payload, PlaceError, Remote, RemoteDocumentRef
};
use reqwest::{
  StatusCode,
  header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue}
};
use tracing::{debug, error, trace, warn};

use crate::models::{ErrorResponse, MergeEnvelope, ServiceStatus};

/// Vault REST API client.
pub struct RestRemote {
  /// reqwest HTTP client (bearer header preset).
  c: reqwest::Client,
  /// Base URL (without trailing `/`).
  base: String
}

impl RestRemote {
  /// Creates a client for the service at `base_url`.
  ///
  /// # Errors
  ///
  /// Returns an error if the input parameters are empty or the HTTP client cannot be built.
  pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
    if base_url.trim().is_empty() {
      anyhow::bail!("base_url must not be empty");
    }
    if api_key.trim().is_empty() {
      anyhow::bail!("api_key must not be empty");
    }

    let mut h = HeaderMap::new();
    h.insert(
      AUTHORIZATION,
      HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
        .map_err(|e| anyhow::anyhow!("invalid api_key: {e}"))?
    );

    Ok(Self {
      c: reqwest::Client::builder()
        .default_headers(h)
        .no_proxy()
        .build()?,
      base: base_url.trim().trim_end_matches('/').to_string()
    })
  }

  /// Base URL in use.
  #[must_use]
  pub fn base_url(&self) -> &str {
    &self.base
  }

  /// `<base>/vault/<vault>/<path>`, each piece percent-encoded on its own.
  ///
  /// The vault segment is omitted when there is none.
  #[must_use]
  pub fn document_url(&self, target: &RemoteDocumentRef) -> String {
    let path = urlencoding::encode(target.path());
    match target.vault() {
      Some(vault) => format!("{}/vault/{}/{path}", self.base, urlencoding::encode(vault)),
      None => format!("{}/vault/{path}", self.base)
    }
  }

  /// Execute a request; return status and body text.
  async fn send(&self, r: reqwest::RequestBuilder) -> Result<(StatusCode, String), PlaceError> {
    let rq = r
      .build()
      .map_err(|e| PlaceError::InvalidRequest(e.to_string()))?;

    let start = Instant::now();
    debug!(method = %rq.method(), url = %rq.url(), "vault request");

    let resp = self.c.execute(rq).await.map_err(Self::transport)?;
    let st = resp.status();
    let txt = resp.text().await.map_err(Self::transport)?;

    debug!(
      status = st.as_u16(),
      ms = start.elapsed().as_millis(),
      bytes = txt.len(),
      "vault response"
    );

    if tracing::enabled!(tracing::Level::TRACE) {
      let mut n = 4096usize.min(txt.len());
      while !txt.is_char_boundary(n) {
        n -= 1;
      }
      trace!(status = st.as_u16(), body = %&txt[..n], "vault response body");
    }

    Ok((st, txt))
  }

  /// Transport failure with its whole cause chain, e.g.
  /// `error sending request ...: tcp connect error: Connection refused`.
  fn transport(e: reqwest::Error) -> PlaceError {
    PlaceError::Transport(format!("{:#}", anyhow::Error::from(e)))
  }

  /// Turn a non-success status into [`PlaceError::Rejected`].
  fn rejected(status: StatusCode, body: String) -> PlaceError {
    let e: Option<ErrorResponse> = serde_json::from_str(&body).ok();
    error!(
      status = status.as_u16(),
      error_code = e.as_ref().and_then(|x| x.error_code),
      "vault error"
    );

    PlaceError::Rejected {
      status: status.as_u16(),
      body
    }
  }
}

impl Remote for RestRemote {
  async fn test_connection(&self) -> Result<(), PlaceError> {
    let (st, body) = self.send(self.c.get(format!("{}/", self.base))).await?;
    if !st.is_success() {
      return Err(Self::rejected(st, body));
    }

    if let Ok(status) = serde_json::from_str::<ServiceStatus>(&body)
      && !status.authenticated
    {
      warn!(status = %status.status, "service reachable but did not confirm authentication");
    }
    Ok(())
  }

  async fn exists(&self, target: &RemoteDocumentRef) -> ExistenceState {
    match self.send(self.c.get(self.document_url(target))).await {
      Ok((st, _)) if st.is_success() => ExistenceState::Present,
      Ok((st, _)) if st == StatusCode::NOT_FOUND => ExistenceState::Absent,
      Ok((st, body)) => {
        debug!(target = %target, status = st.as_u16(), "existence probe inconclusive");
        ExistenceState::Unknown(format!("HTTP {}: {body}", st.as_u16()))
      }
      Err(e) => {
        debug!(target = %target, error = %e, "existence probe inconclusive");
        ExistenceState::Unknown(e.to_string())
      }
    }
  }

  async fn execute(&self, plan: OperationPlan) -> Result<(), PlaceError> {
    let url = self.document_url(&plan.target);
    let r = match plan.method {
      HttpMethod::Post => self.c.post(url),
      HttpMethod::Put => self.c.put(url),
      HttpMethod::Patch => self.c.patch(url)
    };
    let r = r.header(CONTENT_TYPE, plan.content_type.mime());
    let r = match plan.payload {
      Payload::Raw { body } => r.body(body),
      Payload::Merge { content, position } => r.json(&MergeEnvelope {
        content: &content,
        position
      })
    };

    let (st, body) = self.send(r).await?;
    if st.is_success() {
      Ok(())
    } else {
      Err(Self::rejected(st, body))
    }
  }

  fn name(&self) -> &'static str {
    "rest"
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new_rejects_blank_inputs() {
    assert!(RestRemote::new("", "k").is_err());
    assert!(RestRemote::new("http://h", "  ").is_err());
    assert!(RestRemote::new("http://h", "bad\nkey").is_err());
  }

  #[test]
  fn test_base_url_loses_trailing_slash() {
    let r = RestRemote::new("http://127.0.0.1:27123/", "k").expect("client");
    assert_eq!(r.base_url(), "http://127.0.0.1:27123");
  }

  #[test]
  fn test_document_url_encodes_each_piece() {
    let r = RestRemote::new("http://h", "k").expect("client");

    assert_eq!(
      r.document_url(&RemoteDocumentRef::new(Some("Main"), "Logs/Daily Log.md")),
      "http://h/vault/Main/Logs%2FDaily%20Log.md"
    );
    assert_eq!(
      r.document_url(&RemoteDocumentRef::new(Some("My Vault"), "a&b.md")),
      "http://h/vault/My%20Vault/a%26b.md"
    );
    assert_eq!(
      r.document_url(&RemoteDocumentRef::new(None, "2024-05-17.md")),
      "http://h/vault/2024-05-17.md"
    );
  }
}
