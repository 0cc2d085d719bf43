//! Mock vault REST API on axum.
//!
//! Provides `FakeVaultApi::spawn()` — starts an HTTP server on a random port
//! that stores documents by raw (still percent-encoded) request path and
//! records every request it sees.

#![allow(clippy::expect_used)]
#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use axum::{
  Json, Router,
  body::Bytes,
  extract::State,
  http::{HeaderMap, Method, StatusCode, Uri, header},
  response::{IntoResponse, Response}
};
use serde::Deserialize;
use tokio::sync::RwLock;

/// Token the fake accepts.
pub const TOKEN: &str = "test-token";

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
  pub method: String,
  pub path: String,
  pub authorization: Option<String>,
  pub content_type: Option<String>,
  pub body: String
}

/// Internal state of the fake API.
#[derive(Debug, Default)]
pub struct FakeState {
  /// Documents keyed by raw request path, e.g. `/vault/Main/Logs%2FNote.md`.
  pub documents: RwLock<HashMap<String, String>>,
  /// Every request, in arrival order.
  pub requests: RwLock<Vec<RecordedRequest>>,
  /// Forced responses: `(method, raw path)` -> `(status, body)`.
  pub scripted: RwLock<HashMap<(String, String), (u16, String)>>
}

impl FakeState {
  /// Seed a document at a raw path.
  pub async fn add_document(&self, path: &str, content: &str) {
    self
      .documents
      .write()
      .await
      .insert(path.to_string(), content.to_string());
  }

  /// Current content at a raw path.
  pub async fn document(&self, path: &str) -> Option<String> {
    self.documents.read().await.get(path).cloned()
  }

  /// Force `method path` to answer with `status` and `body`.
  pub async fn script(&self, method: &str, path: &str, status: u16, body: &str) {
    self.scripted.write().await.insert(
      (method.to_string(), path.to_string()),
      (status, body.to_string())
    );
  }

  /// Snapshot of recorded requests.
  pub async fn requests(&self) -> Vec<RecordedRequest> {
    self.requests.read().await.clone()
  }

  /// Recorded requests with the given method.
  pub async fn requests_with(&self, method: &str) -> Vec<RecordedRequest> {
    self
      .requests
      .read()
      .await
      .iter()
      .filter(|r| r.method == method)
      .cloned()
      .collect()
  }
}

/// Fake vault API — start and get base URL + state.
pub struct FakeVaultApi;

impl FakeVaultApi {
  /// Start a fake API server on a random port.
  pub async fn spawn() -> (String, Arc<FakeState>) {
    let state = Arc::new(FakeState::default());

    let app = Router::new().fallback(handle).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
      .await
      .expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    let base_url = format!("http://{addr}");

    tokio::spawn(async move {
      axum::serve(listener, app).await.expect("serve");
    });

    (base_url, state)
  }
}

/// Base URL of a port nobody listens on (bind, read the address, drop).
pub async fn dead_base_url() -> String {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
    .await
    .expect("bind");
  let addr = listener.local_addr().expect("local_addr");
  drop(listener);
  format!("http://{addr}")
}

#[derive(Deserialize)]
struct MergeBody {
  content: String,
  position: String
}

fn api_error(status: StatusCode, code: u32, message: &str) -> Response {
  (
    status,
    Json(serde_json::json!({ "errorCode": code, "message": message }))
  )
    .into_response()
}

async fn handle(
  State(state): State<Arc<FakeState>>,
  method: Method,
  uri: Uri,
  headers: HeaderMap,
  body: Bytes
) -> Response {
  let path = uri.path().to_string();
  let header_str = |name: header::HeaderName| {
    headers
      .get(name)
      .and_then(|v| v.to_str().ok())
      .map(str::to_string)
  };
  let body = String::from_utf8_lossy(&body).into_owned();

  state.requests.write().await.push(RecordedRequest {
    method: method.to_string(),
    path: path.clone(),
    authorization: header_str(header::AUTHORIZATION),
    content_type: header_str(header::CONTENT_TYPE),
    body: body.clone()
  });

  if let Some((status, text)) = state
    .scripted
    .read()
    .await
    .get(&(method.to_string(), path.clone()))
    .cloned()
  {
    let status = StatusCode::from_u16(status).expect("status");
    return (status, text).into_response();
  }

  let expected = format!("Bearer {TOKEN}");
  if header_str(header::AUTHORIZATION).as_deref() != Some(expected.as_str()) {
    return api_error(StatusCode::UNAUTHORIZED, 40101, "Authorization required.");
  }

  if path == "/" && method == Method::GET {
    return Json(serde_json::json!({ "status": "OK", "authenticated": true })).into_response();
  }

  if !path.starts_with("/vault/") {
    return api_error(StatusCode::NOT_FOUND, 40400, "Not found.");
  }

  let mut docs = state.documents.write().await;
  match method {
    Method::GET => match docs.get(&path) {
      Some(content) => content.clone().into_response(),
      None => api_error(StatusCode::NOT_FOUND, 40400, "File does not exist.")
    },
    Method::POST => {
      docs.entry(path).or_default().push_str(&body);
      StatusCode::NO_CONTENT.into_response()
    }
    Method::PUT => {
      docs.insert(path, body);
      StatusCode::NO_CONTENT.into_response()
    }
    Method::PATCH => {
      let Ok(merge) = serde_json::from_str::<MergeBody>(&body) else {
        return api_error(StatusCode::BAD_REQUEST, 40000, "Invalid merge body.");
      };
      let Some(existing) = docs.get_mut(&path) else {
        return api_error(StatusCode::NOT_FOUND, 40400, "File does not exist.");
      };
      match merge.position.as_str() {
        "start" => existing.insert_str(0, &merge.content),
        "end" => existing.push_str(&merge.content),
        _ => return api_error(StatusCode::BAD_REQUEST, 40001, "Invalid position.")
      }
      StatusCode::OK.into_response()
    }
    _ => StatusCode::METHOD_NOT_ALLOWED.into_response()
  }
}
