//! `reqwest` wrapper that runs every outgoing call inside an `outgoing_http` span
//! and forwards the current request id, when one is known.

use serde::Serialize;
use std::time::Duration;
use tracing::{field, Instrument, Level};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Client with a total request timeout.
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self::new(reqwest::Client::builder().timeout(timeout).build()?))
    }

    pub async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let span = tracing::span!(
            Level::INFO,
            "outgoing_http",
            http.method = %req.method(),
            http.host = req.url().host_str().unwrap_or(""),
            http.path = req.url().path(),
            http.status_code = field::Empty,
            error = field::Empty,
        );

        async {
            let started = std::time::Instant::now();
            let result = self.inner.execute(req).await;
            let span = tracing::Span::current();
            match &result {
                Ok(resp) => {
                    span.record("http.status_code", resp.status().as_u16());
                    if resp.status().is_client_error() || resp.status().is_server_error() {
                        span.record("error", true);
                    }
                    tracing::debug!(
                        status = resp.status().as_u16(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "outgoing request finished"
                    );
                }
                Err(e) => {
                    span.record("error", true);
                    tracing::warn!(error = %e, "outgoing request failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    pub async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        let req = self.inner.get(url).build()?;
        self.execute(req).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        request_id: Option<&str>,
    ) -> reqwest::Result<reqwest::Response> {
        let mut builder = self.inner.post(url).json(body);
        if let Some(id) = request_id {
            builder = builder.header(REQUEST_ID_HEADER, id);
        }
        self.execute(builder.build()?).await
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}
