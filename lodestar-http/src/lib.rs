//! JSON transport for the ranking provider.
//!
//! One base URL, bearer or custom-header auth, per-request timeouts, and a
//! bounded retry loop for transient failures (network errors, 429, 5xx) with
//! exponential backoff that honors `Retry-After`. Everything this crate logs
//! is safe to ship: authorization values never reach an event field and
//! response bodies are clipped to a short snippet. Set `LODESTAR_HTTP_RAW=1`
//! to additionally log full request/response bodies while debugging a
//! provider.
//!
//! ```no_run
//! # async fn demo() -> Result<(), lodestar_http::HttpError> {
//! use lodestar_http::{Auth, HttpClient, RequestOpts};
//!
//! let client = HttpClient::new("https://api.example.com/v1/")?;
//! let models: serde_json::Value = client
//!     .get_json("models", RequestOpts { auth: Auth::Bearer("sk-demo"), ..Default::default() })
//!     .await?;
//! # Ok(()) }
//! ```

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, trace, warn};

/// Response bodies are clipped to this many bytes in errors and log events.
const SNIPPET_LIMIT: usize = 500;
const BASE_BACKOFF: Duration = Duration::from_millis(200);
/// Minimum wait after a 429 that carried no `Retry-After` header.
const RATE_LIMIT_FLOOR: Duration = Duration::from_millis(1100);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

/// How a request authenticates. The default is no auth at all.
///
/// ```
/// use lodestar_http::Auth;
///
/// assert_eq!(Auth::default().kind(), "none");
/// assert_eq!(Auth::Bearer("sk-demo").kind(), "bearer");
/// ```
#[derive(Clone, Debug, Default)]
pub enum Auth<'a> {
    /// `Authorization: Bearer <token>`; the token is cleaned before use.
    Bearer(&'a str),
    /// A custom header such as `X-Api-Key`.
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    #[default]
    None,
}

impl Auth<'_> {
    /// Label safe for log fields; never the secret itself.
    pub fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::Header { .. } => "header",
            Auth::None => "none",
        }
    }
}

/// Per-request overrides; anything left unset falls back to the client's
/// defaults.
///
/// ```
/// use lodestar_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(5)),
///     ..Default::default()
/// };
/// assert!(opts.retries.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Auth<'a>,
    pub headers: Option<HeaderMap>,
}

/// JSON client anchored to one provider base URL.
#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

/// One completed HTTP exchange, body fully read.
struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    elapsed: Duration,
}

impl Reply {
    fn request_id(&self) -> &str {
        ["x-request-id", "x-correlation-id"]
            .into_iter()
            .find_map(|name| self.headers.get(name)?.to_str().ok())
            .unwrap_or("-")
    }

    fn is_transient(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS || self.status.is_server_error()
    }

    fn retry_wait(&self, attempt: usize) -> Duration {
        if let Some(secs) = retry_after_secs(&self.headers) {
            return Duration::from_secs(secs);
        }
        let wait = backoff(attempt);
        if self.status == StatusCode::TOO_MANY_REQUESTS {
            wait.max(RATE_LIMIT_FLOOR)
        } else {
            wait
        }
    }
}

impl HttpClient {
    /// Build a client for `base`. Defaults: 15 s timeout, 2 retries.
    ///
    /// ```no_run
    /// use lodestar_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com/v1/")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.max_retries, 2);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 2,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// GET `path` (joined onto the base URL) and decode the JSON reply.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json::<(), T>(Method::GET, path, None, opts).await
    }

    /// POST `body` as JSON to `path` and decode the JSON reply.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(Method::POST, path, Some(body), opts).await
    }

    async fn request_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| HttpError::Build(format!("body serialization failed: {e}")))?;
        let budget = opts.retries.unwrap_or(self.max_retries);
        let timeout = opts.timeout.unwrap_or(self.default_timeout);

        if raw_logging() {
            if let Some(bytes) = payload.as_deref() {
                debug!(
                    target: "lodestar.http.raw",
                    path,
                    body = %String::from_utf8_lossy(bytes),
                    "request body"
                );
            }
        }

        let mut attempt = 0usize;
        loop {
            attempt += 1;
            debug!(
                target: "lodestar.http",
                method = %method,
                path,
                attempt,
                budget,
                timeout_ms = timeout.as_millis() as u64,
                auth = opts.auth.kind(),
                "sending request"
            );

            let reply = match self
                .send_once(&method, &url, payload.as_deref(), &opts, timeout)
                .await
            {
                Ok(reply) => reply,
                // Timeouts surface as send errors and are retried the same way.
                Err(HttpError::Network(message)) if attempt <= budget => {
                    let wait = backoff(attempt);
                    warn!(
                        target: "lodestar.http",
                        path,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        %message,
                        "network failure, retrying"
                    );
                    sleep(wait).await;
                    continue;
                }
                Err(other) => return Err(other),
            };

            let snippet = clip(&reply.body);
            debug!(
                target: "lodestar.http",
                path,
                status = %reply.status,
                elapsed_ms = reply.elapsed.as_millis() as u64,
                body_len = reply.body.len(),
                request_id = reply.request_id(),
                "response received"
            );
            trace!(target: "lodestar.http", path, body = %snippet, "response body");
            if raw_logging() {
                debug!(
                    target: "lodestar.http.raw",
                    path,
                    status = %reply.status,
                    body = %String::from_utf8_lossy(&reply.body),
                    "response body"
                );
            }

            if reply.status.is_success() {
                return serde_json::from_slice(&reply.body).map_err(|e| {
                    warn!(
                        target: "lodestar.http",
                        path,
                        error = %e,
                        body = %snippet,
                        "undecodable response body"
                    );
                    HttpError::Decode(e.to_string(), snippet)
                });
            }

            if reply.is_transient() && attempt <= budget {
                let wait = reply.retry_wait(attempt);
                warn!(
                    target: "lodestar.http",
                    path,
                    status = %reply.status,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    "transient server failure, retrying"
                );
                sleep(wait).await;
                continue;
            }

            let message = error_message(&reply.body, &snippet);
            let request_id = reply.request_id().to_string();
            warn!(
                target: "lodestar.http",
                path,
                status = %reply.status,
                %message,
                %request_id,
                "request failed"
            );
            return Err(HttpError::Api {
                status: reply.status,
                message,
                request_id,
            });
        }
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        payload: Option<&[u8]>,
        opts: &RequestOpts<'_>,
        timeout: Duration,
    ) -> Result<Reply, HttpError> {
        let mut request = self.inner.request(method.clone(), url.clone()).timeout(timeout);
        if let Some(bytes) = payload {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(bytes.to_vec());
        }
        if let Some(extra) = &opts.headers {
            request = request.headers(extra.clone());
        }
        request = match &opts.auth {
            Auth::Bearer(token) => request.bearer_auth(clean_token(token)?),
            Auth::Header { name, value } => request.header(name, value),
            Auth::None => request,
        };

        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?
            .to_vec();
        Ok(Reply {
            status,
            headers,
            body,
            elapsed: started.elapsed(),
        })
    }
}

fn raw_logging() -> bool {
    matches!(
        std::env::var("LODESTAR_HTTP_RAW").as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn backoff(attempt: usize) -> Duration {
    let doublings = attempt.saturating_sub(1).min(10) as u32;
    BASE_BACKOFF * 2u32.pow(doublings)
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers.get(RETRY_AFTER)?.to_str().ok()?.parse().ok()
}

/// Pull a human-readable message out of a provider error body. OpenAI wraps
/// it as `{"error":{"message":..}}`; gateways often use flat
/// `message`/`detail`/`error` fields.
fn error_message(body: &[u8], fallback: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Inner,
    }
    #[derive(Deserialize)]
    struct Inner {
        message: String,
    }
    #[derive(Deserialize)]
    struct Flat {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(wrapped) = serde_json::from_slice::<Envelope>(body) {
        return wrapped.error.message;
    }
    if let Ok(flat) = serde_json::from_slice::<Flat>(body) {
        for candidate in [flat.message, flat.detail, flat.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    fallback.to_string()
}

fn clip(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= SNIPPET_LIMIT {
        return text.into_owned();
    }
    // The cut must land on a char boundary.
    let mut cut = SNIPPET_LIMIT;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}

/// Strip the whitespace and quote wrapping that keys pick up when pasted from
/// shells and dotfiles, then reject anything that cannot live in a header.
fn clean_token(raw: &str) -> Result<String, HttpError> {
    let stripped = raw.trim().trim_matches(['"', '\'']);
    let token: String = stripped.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if token.is_empty() {
        return Err(HttpError::Build("auth token is empty".into()));
    }
    if !token.is_ascii() || token.bytes().any(|b| b < 0x20 || b == 0x7f) {
        return Err(HttpError::Build(
            "auth token contains bytes that cannot appear in a header".into(),
        ));
    }
    HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| HttpError::Build(format!("auth token rejected: {e}")))?;
    Ok(token)
}
