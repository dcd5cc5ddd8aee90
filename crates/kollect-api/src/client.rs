// Aggregator backend HTTP client
//
// Wraps `reqwest::Client` with kollect URL construction and response
// decoding. Endpoint groups (status, configure, chat) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ActionReply;
use crate::transport::TransportConfig;

const BODY_PREVIEW: usize = 200;

/// Error body shape used by the configure/disconnect/chat endpoints.
///
/// Handlers are inconsistent about the field name, so both are accepted.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Raw HTTP client for the kollect aggregator backend.
///
/// Every endpoint lives under `{base_url}/api/`. Read endpoints return
/// decoded payloads; action endpoints return an [`ActionReply`] or an
/// [`Error::Rejected`] carrying the backend's human-readable message.
#[derive(Debug, Clone)]
pub struct KollectClient {
    http: reqwest::Client,
    base_url: Url,
    /// Request timeout the client was built with, when known.
    timeout: Option<Duration>,
}

impl KollectClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `http://localhost:8080`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: Some(transport.timeout),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: None,
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build `{base}/api/{path}`, tolerating a trailing slash on the base.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a request, reporting client-side timeouts as [`Error::Timeout`].
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        request.send().await.map_err(|e| self.transport_error(e))
    }

    async fn text(&self, resp: reqwest::Response) -> Result<String, Error> {
        resp.text().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        match self.timeout {
            Some(timeout) if err.is_timeout() => Error::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            },
            _ => Error::Transport(err),
        }
    }

    /// Send a GET request to a read endpoint and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {url}");

        let resp = self.send(self.http.get(url)).await?;
        let status = resp.status();
        let body = self.text(resp).await?;

        if !status.is_success() {
            return Err(Error::Backend {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        decode(&body)
    }

    /// Send a POST with a JSON body to an action endpoint.
    pub(crate) async fn post_action<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ActionReply, Error> {
        let url = self.api_url(path)?;
        debug!("POST {url}");

        let resp = self.send(self.http.post(url).json(body)).await?;
        self.action_reply(resp).await
    }

    /// Send a body-less POST to an action endpoint.
    pub(crate) async fn post_empty(&self, path: &str) -> Result<ActionReply, Error> {
        let url = self.api_url(path)?;
        debug!("POST {url}");

        let resp = self.send(self.http.post(url)).await?;
        self.action_reply(resp).await
    }

    /// Send a multipart form to an action endpoint.
    pub(crate) async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<ActionReply, Error> {
        let url = self.api_url(path)?;
        debug!("POST {url} (multipart)");

        let resp = self.send(self.http.post(url).multipart(form)).await?;
        self.action_reply(resp).await
    }

    /// Send a POST with a JSON body and decode a JSON reply.
    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {url}");

        let resp = self.send(self.http.post(url).json(body)).await?;
        let status = resp.status();
        let text = self.text(resp).await?;

        if !status.is_success() {
            return Err(Error::Rejected {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        decode(&text)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn action_reply(&self, resp: reqwest::Response) -> Result<ActionReply, Error> {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Error::Rejected {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        trace!(%status, "action accepted");
        // Success bodies are free-form; only a `message` field is meaningful.
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);
        Ok(ActionReply { message })
    }
}

/// Decode a JSON body, keeping a preview of it on failure.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

/// Extract the human-readable message from an error body.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(msg) = parsed.error.or(parsed.message) {
            return msg;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.to_string()
    } else {
        preview(trimmed).to_owned()
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
