use serde::{Deserialize, Serialize};

use super::period::PeriodToken;

/// Request count for one period, as served to clients.
///
/// `requests == 0` covers both a genuine zero and a page that did not yield a
/// number. Use [`PeriodOutcome`] when the two must be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub day: PeriodToken,
    pub requests: u64,
}

/// What the target table cell yielded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellOutcome {
    Count(u64),
    Anomaly { text: String },
}

impl CellOutcome {
    /// Collapses anomalies to zero.
    pub fn requests(&self) -> u64 {
        match self {
            CellOutcome::Count(n) => *n,
            CellOutcome::Anomaly { .. } => 0,
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, CellOutcome::Anomaly { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodOutcome {
    pub day: PeriodToken,
    pub outcome: CellOutcome,
}

impl PeriodOutcome {
    pub fn into_record(self) -> RequestRecord {
        RequestRecord {
            day: self.day,
            requests: self.outcome.requests(),
        }
    }
}

/// Records in chronological order, one per enumerated period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeResult {
    pub records: Vec<RequestRecord>,
}

impl RangeResult {
    /// Sum of all counts, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.requests))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PeriodEntry {
    Ok {
        day: PeriodToken,
        requests: u64,
        anomaly: bool,
    },
    Failed {
        day: PeriodToken,
        error: String,
    },
}

impl PeriodEntry {
    pub fn day(&self) -> PeriodToken {
        match self {
            PeriodEntry::Ok { day, .. } | PeriodEntry::Failed { day, .. } => *day,
        }
    }
}

/// Per-period outcomes of a range fetch that kept going past failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartialRangeResult {
    pub entries: Vec<PeriodEntry>,
}

impl PartialRangeResult {
    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, PeriodEntry::Failed { .. }))
            .count()
    }

    /// Sum over the periods that were fetched, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.entries.iter().fold(0u64, |acc, e| match e {
            PeriodEntry::Ok { requests, .. } => acc.saturating_add(*requests),
            PeriodEntry::Failed { .. } => acc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PeriodToken {
        s.parse().unwrap()
    }

    #[test]
    fn anomaly_coalesces_to_zero() {
        let outcome = PeriodOutcome {
            day: p("2024-04"),
            outcome: CellOutcome::Anomaly { text: "n/a".into() },
        };
        assert_eq!(
            outcome.into_record(),
            RequestRecord { day: p("2024-04"), requests: 0 }
        );
    }

    #[test]
    fn record_serializes_as_day_and_requests() {
        let record = RequestRecord { day: p("2024-04"), requests: 12345 };
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json, serde_json::json!({"day": "2024-04", "requests": 12345}));
    }

    #[test]
    fn totals_skip_failed_entries() {
        let partial = PartialRangeResult {
            entries: vec![
                PeriodEntry::Ok { day: p("2024-01"), requests: 5, anomaly: false },
                PeriodEntry::Failed { day: p("2024-02"), error: "timeout".into() },
                PeriodEntry::Ok { day: p("2024-03"), requests: 7, anomaly: false },
            ],
        };
        assert_eq!(partial.total(), 12);
        assert_eq!(partial.failed_count(), 1);

        let json = serde_json::to_value(&partial.entries[1]).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["day"], "2024-02");
    }

    #[test]
    fn huge_counts_saturate_the_totals() {
        let range = RangeResult {
            records: vec![
                RequestRecord { day: p("2024-01"), requests: u64::MAX },
                RequestRecord { day: p("2024-02"), requests: u64::MAX },
            ],
        };
        assert_eq!(range.total(), u64::MAX);

        let partial = PartialRangeResult {
            entries: vec![
                PeriodEntry::Ok { day: p("2024-01"), requests: u64::MAX, anomaly: false },
                PeriodEntry::Ok { day: p("2024-02"), requests: 1, anomaly: false },
            ],
        };
        assert_eq!(partial.total(), u64::MAX);
    }
}
