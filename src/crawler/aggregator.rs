use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use super::fetcher;
use super::source::{ExternalSourceError, PageSource};
use crate::models::{PartialRangeResult, PeriodEntry, PeriodOutcome, PeriodToken, RangeResult};

const MAX_CONCURRENCY: usize = 64;

type FetchHandle = JoinHandle<Result<PeriodOutcome, ExternalSourceError>>;

/// Fans single-period fetches out over a range, at most `concurrency` at a time.
///
/// Results always come back in the order of the input periods.
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn PageSource>,
    concurrency: usize,
}

impl Aggregator {
    pub fn new(source: Arc<dyn PageSource>, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.clamp(1, MAX_CONCURRENCY),
        }
    }

    pub fn source(&self) -> &dyn PageSource {
        self.source.as_ref()
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn spawn_all(&self, periods: &[PeriodToken]) -> Vec<(PeriodToken, FetchHandle)> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        periods
            .iter()
            .map(|&period| {
                let semaphore = semaphore.clone();
                let source = self.source.clone();
                let handle = tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| ExternalSourceError::other(period, "fetch limiter closed"))?;
                    fetcher::fetch_outcome(source.as_ref(), period).await
                });
                (period, handle)
            })
            .collect()
    }

    /// Fetches every period; any failure fails the whole range.
    ///
    /// Fetches already dispatched when a failure surfaces are left to finish.
    pub async fn aggregate(&self, periods: &[PeriodToken]) -> Result<RangeResult, ExternalSourceError> {
        tracing::info!(
            "Fetching {} periods with concurrency {}",
            periods.len(),
            self.concurrency
        );

        let mut records = Vec::with_capacity(periods.len());
        for (period, handle) in self.spawn_all(periods) {
            let outcome = joined(period, handle).await?;
            records.push(outcome.into_record());
        }

        Ok(RangeResult { records })
    }

    /// Fetches every period and reports each outcome in place.
    pub async fn aggregate_partial(&self, periods: &[PeriodToken]) -> PartialRangeResult {
        let mut entries = Vec::with_capacity(periods.len());
        for (period, handle) in self.spawn_all(periods) {
            let entry = match joined(period, handle).await {
                Ok(outcome) => PeriodEntry::Ok {
                    day: outcome.day,
                    requests: outcome.outcome.requests(),
                    anomaly: outcome.outcome.is_anomaly(),
                },
                Err(e) => PeriodEntry::Failed {
                    day: period,
                    error: e.kind.to_string(),
                },
            };
            entries.push(entry);
        }

        let result = PartialRangeResult { entries };
        if result.failed_count() > 0 {
            tracing::warn!(
                "{} of {} periods failed",
                result.failed_count(),
                result.entries.len()
            );
        }
        result
    }
}

async fn joined(period: PeriodToken, handle: FetchHandle) -> Result<PeriodOutcome, ExternalSourceError> {
    match handle.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Fetch task for {} did not complete: {}", period, e);
            Err(ExternalSourceError::other(period, format!("fetch task failed: {e}")))
        }
    }
}
