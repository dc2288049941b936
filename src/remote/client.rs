//! HTTP client for the card service API
//!
//! All endpoints wrap their payload in a `{success, message, data}`
//! envelope; a 2xx status with `success: false` is still an application
//! error. Transport failures map to `Connectivity`, everything else the
//! server says to `Remote`.

use crate::card::{Card, Statistics};
use crate::error::{Result, SyncError};
use crate::remote::RemoteSource;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("cardsync/", env!("CARGO_PKG_VERSION"));

/// Standard response envelope of the card service
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

/// Card service client over HTTP/JSON
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    /// Build a client for the service at `base_url` with a fixed
    /// connect/read timeout applied to every request.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a reqwest transport error onto the engine taxonomy. Timeouts
    /// and connect failures (unreachable, refused, DNS) are recoverable
    /// connectivity errors; anything else the transport reports about a
    /// reachable server is a protocol problem.
    fn transport(err: reqwest::Error) -> SyncError {
        if err.is_timeout() || err.is_connect() {
            SyncError::Connectivity(err.to_string())
        } else {
            SyncError::Remote(err.to_string())
        }
    }

    /// Surface a non-2xx status as a protocol error, preferring the
    /// server's own message when the error body parses
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<Envelope<serde_json::Value>>().await {
            Ok(envelope) if !envelope.message.is_empty() => envelope.message,
            _ => format!("Server error: {status}"),
        };
        Err(SyncError::Remote(message))
    }

    /// Unwrap a response envelope that carries a payload
    async fn unwrap_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        let envelope: Envelope<T> = response.json().await.map_err(Self::transport)?;
        if !envelope.success {
            return Err(SyncError::Remote(envelope.message));
        }
        envelope
            .data
            .ok_or_else(|| SyncError::Remote("response envelope missing data".into()))
    }

    /// Unwrap a confirmation-only envelope. Deletes answer with
    /// `data: null`, so only the success flag counts here.
    async fn confirm_envelope(response: reqwest::Response) -> Result<()> {
        let response = Self::check_status(response).await?;
        let envelope: Envelope<serde_json::Value> =
            response.json().await.map_err(Self::transport)?;
        if envelope.success {
            Ok(())
        } else {
            Err(SyncError::Remote(envelope.message))
        }
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn list_cards(&self, offset: u32, limit: u32, search: &str) -> Result<Vec<Card>> {
        debug!(offset, limit, search, "GET /api/v1/cards");
        let response = self
            .http
            .get(self.url("/api/v1/cards"))
            .query(&[("skip", offset.to_string()), ("limit", limit.to_string())])
            .query(&[("search", search)])
            .send()
            .await
            .map_err(Self::transport)?;
        Self::unwrap_envelope(response).await
    }

    async fn get_card(&self, id: i64) -> Result<Card> {
        let response = self
            .http
            .get(self.url(&format!("/api/v1/cards/{id}")))
            .send()
            .await
            .map_err(Self::transport)?;
        Self::unwrap_envelope(response).await
    }

    async fn create_card(&self, card: &Card) -> Result<Card> {
        let response = self
            .http
            .post(self.url("/api/v1/cards"))
            .json(card)
            .send()
            .await
            .map_err(Self::transport)?;
        Self::unwrap_envelope(response).await
    }

    async fn update_card(&self, id: i64, card: &Card) -> Result<Card> {
        let response = self
            .http
            .put(self.url(&format!("/api/v1/cards/{id}")))
            .json(card)
            .send()
            .await
            .map_err(Self::transport)?;
        Self::unwrap_envelope(response).await
    }

    async fn delete_card(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/api/v1/cards/{id}")))
            .send()
            .await
            .map_err(Self::transport)?;
        Self::confirm_envelope(response).await
    }

    async fn get_statistics(&self) -> Result<Statistics> {
        let response = self
            .http
            .get(self.url("/api/v1/cards/statistics"))
            .send()
            .await
            .map_err(Self::transport)?;
        Self::unwrap_envelope(response).await
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .http
            .get(self.url("/health"))
            .send()
            .await
            .map_err(Self::transport)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(SyncError::Remote(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }
}
