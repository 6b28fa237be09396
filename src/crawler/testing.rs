//! Scripted page source for exercising the crawler without network access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::source::{ExternalSourceError, PageSource};
use crate::models::PeriodToken;

#[derive(Debug, Clone)]
enum Script {
    Page(String),
    Fail,
}

/// Serves canned pages keyed by period string; unknown periods fail.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    scripts: HashMap<String, Script>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A minimal statistics page whose target cell holds `cell`.
    pub fn stat_page(cell: &str) -> String {
        format!(
            "<html><body><table>\
             <tr><th>Key</th><th>Name</th><th>Requests</th></tr>\
             <tr><td>gUCUN8klV1IFTvce</td><td>stat</td><td> {cell} </td></tr>\
             </table></body></html>"
        )
    }

    pub fn page(mut self, period: &str, body: impl Into<String>) -> Self {
        self.scripts.insert(period.to_string(), Script::Page(body.into()));
        self
    }

    pub fn count(self, period: &str, requests: u64) -> Self {
        self.page(period, Self::stat_page(&requests.to_string()))
    }

    pub fn failing(mut self, period: &str) -> Self {
        self.scripts.insert(period.to_string(), Script::Fail);
        self
    }

    pub fn delay(mut self, period: &str, delay: Duration) -> Self {
        self.delays.insert(period.to_string(), delay);
        self
    }

    /// Number of `fetch_page` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent `fetch_page` calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(&self, period: &PeriodToken) -> Result<String, ExternalSourceError> {
        let key = period.to_string();
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(&key).copied().unwrap_or(Duration::from_millis(1));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.scripts.get(&key) {
            Some(Script::Page(body)) => Ok(body.clone()),
            Some(Script::Fail) => Err(ExternalSourceError::other(*period, "connection reset")),
            None => Err(ExternalSourceError::other(*period, "no page scripted")),
        }
    }
}
