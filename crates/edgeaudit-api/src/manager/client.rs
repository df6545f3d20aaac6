// Manager API HTTP client
//
// Wraps `reqwest::Client` with manager-specific URL construction, XSRF token
// handling and `{ data: [...] }` envelope unwrapping. Endpoint groups (auth,
// devices) are implemented as inherent methods in sibling modules to keep
// this one focused on transport mechanics.

use std::sync::RwLock;

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::manager::models::ManagerResponse;
use crate::transport::TransportConfig;

/// Header carrying the anti-CSRF token on every request after login.
pub(crate) const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Raw HTTP client for the SD-WAN manager REST API.
///
/// Session state is a `JSESSIONID` cookie (held by the client's cookie jar)
/// plus an XSRF token fetched right after login. All read methods return the
/// unwrapped `data` payload.
pub struct ManagerClient {
    http: reqwest::Client,
    base_url: Url,
    /// XSRF token from `GET /dataservice/client/token`. Older managers don't
    /// expose the endpoint, in which case no header is sent.
    xsrf_token: RwLock<Option<String>>,
}

impl ManagerClient {
    /// Client for the manager rooted at `base_url`
    /// (e.g. `https://vmanage.example.net/`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::with_client(transport.build_client()?, base_url))
    }

    /// Create a manager client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            xsrf_token: RwLock::new(None),
        }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── XSRF token management ─────────────────────────────────────────

    pub(crate) fn set_xsrf_token(&self, token: Option<String>) {
        debug!(present = token.is_some(), "storing XSRF token");
        if let Ok(mut guard) = self.xsrf_token.write() {
            *guard = token;
        }
    }

    /// Whether an XSRF token has been captured for this session.
    pub fn has_xsrf_token(&self) -> bool {
        self.xsrf_token
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Apply the stored XSRF token to a request builder.
    pub(crate) fn apply_xsrf(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.xsrf_token.read().ok().and_then(|guard| guard.clone());
        match token {
            Some(token) => builder.header(XSRF_HEADER, token),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a path relative to the manager root.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Build a `dataservice` URL: `{base}/dataservice/{path}`.
    pub(crate) fn dataservice_url(&self, path: &str) -> Result<Url, Error> {
        self.url(&format!("dataservice/{}", path.trim_start_matches('/')))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the `data` envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        debug!("GET {}", url);

        let builder = self.apply_xsrf(self.http.get(url));
        let resp = builder.send().await.map_err(Error::Transport)?;

        Self::parse_envelope(resp).await
    }

    /// Parse the `{ data: [...] }` envelope.
    ///
    /// The manager answers an expired session with its HTML login page and
    /// HTTP 200, so an HTML body is treated as [`Error::SessionExpired`].
    async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Vec<T>, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Api {
                status: status.as_u16(),
                message: "insufficient permissions".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if looks_like_html(&body) {
            trace!("manager returned an HTML page instead of JSON");
            return Err(Error::SessionExpired);
        }

        let envelope: ManagerResponse<T> =
            serde_json::from_str(&body).map_err(|e| Error::Payload {
                message: format!("{e} (body preview: {:?})", preview(&body)),
            })?;

        Ok(envelope.data)
    }
}

/// The manager serves its login form on failed or expired auth.
pub(crate) fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start();
    head.starts_with('<') && head.get(..200).unwrap_or(head).to_ascii_lowercase().contains("html")
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
