use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use thiserror::Error;

use crate::config::Config;
use crate::models::PeriodToken;

#[derive(Debug, Error)]
pub enum SourceErrorKind {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("{0}")]
    Other(String),
}

/// The statistics page could not be fetched for `period`.
#[derive(Debug, Error)]
#[error("failed to fetch statistics for {period}: {kind}")]
pub struct ExternalSourceError {
    pub period: PeriodToken,
    #[source]
    pub kind: SourceErrorKind,
}

impl ExternalSourceError {
    pub fn new(period: PeriodToken, kind: impl Into<SourceErrorKind>) -> Self {
        Self {
            period,
            kind: kind.into(),
        }
    }

    pub fn other(period: PeriodToken, message: impl Into<String>) -> Self {
        Self::new(period, SourceErrorKind::Other(message.into()))
    }
}

/// Where statistics pages come from.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Returns the raw page body for one period.
    async fn fetch_page(&self, period: &PeriodToken) -> Result<String, ExternalSourceError>;
}

/// Fetches pages from the statistics endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
    base_url: String,
    stat_key: String,
}

impl HttpPageSource {
    pub fn new(client: Client, base_url: impl Into<String>, stat_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            stat_key: stat_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = create_stat_client(config)?;
        Ok(Self::new(client, &config.stat_base_url, &config.stat_key))
    }
}

pub fn create_stat_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("request_stats/", env!("CARGO_PKG_VERSION"))),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("text/html,*/*"));

    Client::builder()
        .default_headers(headers)
        .timeout(config.http_timeout())
        .build()
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, period: &PeriodToken) -> Result<String, ExternalSourceError> {
        let day = period.to_string();
        tracing::debug!("GET {} day={}", self.base_url, day);

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("h", self.stat_key.as_str()), ("day", day.as_str())])
            .send()
            .await
            .map_err(|e| ExternalSourceError::new(*period, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ExternalSourceError::new(
                *period,
                SourceErrorKind::Status(status.as_u16()),
            ));
        }

        resp.text()
            .await
            .map_err(|e| ExternalSourceError::new(*period, e))
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{Router, extract::RawQuery, http::StatusCode, routing::get};

    use super::*;
    use crate::config::DEFAULT_STAT_KEY;

    fn p(s: &str) -> PeriodToken {
        s.parse().unwrap()
    }

    async fn spawn_upstream() -> SocketAddr {
        let app = Router::new()
            .route(
                "/stat.php",
                get(|RawQuery(query): RawQuery| async move { query.unwrap_or_default() }),
            )
            .route(
                "/broken.php",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    // bypasses any HTTP_PROXY in the environment so requests stay on loopback
    fn source_for(addr: SocketAddr, path: &str) -> HttpPageSource {
        let client = Client::builder()
            .no_proxy()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap();
        HttpPageSource::new(client, format!("http://{addr}{path}"), DEFAULT_STAT_KEY)
    }

    #[tokio::test]
    async fn sends_key_and_period_as_query() {
        let addr = spawn_upstream().await;
        let source = source_for(addr, "/stat.php");

        let body = source.fetch_page(&p("2024-01")).await.unwrap();
        assert_eq!(body, "h=gUCUN8klV1IFTvce&day=2024-01");

        let body = source.fetch_page(&p("2024-01-15")).await.unwrap();
        assert_eq!(body, "h=gUCUN8klV1IFTvce&day=2024-01-15");
    }

    #[tokio::test]
    async fn error_status_becomes_a_source_error() {
        let addr = spawn_upstream().await;
        let source = source_for(addr, "/broken.php");

        let err = source.fetch_page(&p("2024-01")).await.unwrap_err();
        assert_eq!(err.period, p("2024-01"));
        assert!(matches!(err.kind, SourceErrorKind::Status(500)));
        assert_eq!(err.kind.to_string(), "upstream returned HTTP 500");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = source_for(addr, "/stat.php")
            .fetch_page(&p("2024-01"))
            .await
            .unwrap_err();
        assert!(matches!(err.kind, SourceErrorKind::Transport(_)));
    }
}
