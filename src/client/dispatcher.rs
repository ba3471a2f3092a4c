use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, HttpError};

/// Placeholder for calls that carry no request body.
pub const NO_BODY: Option<&'static ()> = None;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Performs single JSON exchanges against the backend.
///
/// Knows nothing about sessions: the bearer token, if any, is handed in per call.
/// Never retries.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    base: String,
    client: reqwest::Client,
}

impl Dispatcher {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Self::with_client(&config.api_url, client)
    }

    pub fn with_client(base: &str, client: reqwest::Client) -> ClientResult<Self> {
        Url::parse(base).map_err(|e| ClientError::InvalidUrl { url: base.to_string(), reason: e.to_string() })?;
        Ok(Self { base: base.trim_end_matches('/').to_string(), client })
    }

    pub fn base(&self) -> &str { &self.base }

    /// Absolute URL for `path`; the path (including any query string) is appended as-is.
    pub fn url_for(&self, path: &str) -> ClientResult<Url> {
        let raw = if path.starts_with('/') || path.is_empty() {
            format!("{}{}", self.base, path)
        } else {
            format!("{}/{}", self.base, path)
        };
        Url::parse(&raw).map_err(|e| ClientError::InvalidUrl { url: raw.clone(), reason: e.to_string() })
    }

    /// Send a request and decode the success body as `T`.
    pub async fn send<B, T>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self.exchange(method, path, body, bearer).await?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            error!(
                target: "pantry::http",
                "{} {}: response does not match expected shape: {} (body: {})",
                method.as_str(), path, e, String::from_utf8_lossy(&bytes)
            );
            ClientError::Decode { path: path.to_string(), source: e }
        })
    }

    /// Send a request whose success body carries nothing the caller needs.
    pub async fn send_no_content<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.exchange(method, path, body, bearer).await.map(|_| ())
    }

    async fn exchange<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> ClientResult<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url_for(path)?;
        debug!(target: "pantry::http", "{} {} bearer={}", method.as_str(), url, bearer.is_some());

        let mut req = self.client
            .request(method.to_reqwest(), url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = bearer {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::config("access token contains characters not allowed in a header"))?;
            req = req.header(AUTHORIZATION, value);
        }
        if let Some(b) = body {
            let payload = serde_json::to_vec(b).map_err(|e| ClientError::Encode { path: path.to_string(), source: e })?;
            req = req.body(payload);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?.to_vec();
        debug!(target: "pantry::http", "{} {} -> {}", method.as_str(), path, status.as_u16());

        if !status.is_success() {
            return Err(rejection(status, &bytes));
        }
        Ok(bytes)
    }
}

/// Map a non-success response to `RemoteRejection`. Bodies that are not the
/// backend's `{"message": ...}` shape fall back to the raw text, then to the
/// status' reason phrase.
fn rejection(status: StatusCode, bytes: &[u8]) -> ClientError {
    let message = match serde_json::from_slice::<HttpError>(bytes) {
        Ok(e) => e.message,
        Err(_) => {
            let text = String::from_utf8_lossy(bytes).trim().to_string();
            if text.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text
            }
        }
    };
    warn!(target: "pantry::http", "remote rejection {}: {}", status.as_u16(), message);
    ClientError::RemoteRejection { status: status.as_u16(), message }
}
