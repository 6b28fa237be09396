use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{PartialRangeResult, PeriodEntry, PeriodToken, RangeResult, RequestRecord};
use crate::utils::date::month_count;

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub day: Option<String>,
}

impl DayQuery {
    pub fn period(&self) -> Result<PeriodToken, AppError> {
        let day = required(self.day.as_deref(), "day")?;
        parse_period(day, "day")
    }
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub partial: Option<String>,
}

impl RangeQuery {
    /// Checks both bounds before anything is fetched.
    pub fn bounds(&self, max_months: usize) -> Result<(PeriodToken, PeriodToken), AppError> {
        let start = parse_period(required(self.start.as_deref(), "start")?, "start")?;
        let end = parse_period(required(self.end.as_deref(), "end")?, "end")?;

        if start.month_token() > end.month_token() {
            return Err(AppError::invalid(format!(
                "start ({start}) must not be after end ({end})"
            )));
        }
        let months = month_count(start, end);
        if months > max_months {
            return Err(AppError::invalid(format!(
                "range spans {months} months; at most {max_months} are allowed"
            )));
        }
        Ok((start, end))
    }

    pub fn is_partial(&self) -> Result<bool, AppError> {
        match self.partial.as_deref().map(str::trim) {
            None | Some("") | Some("false") | Some("0") => Ok(false),
            Some("true") | Some("1") => Ok(true),
            Some(other) => Err(AppError::invalid(format!(
                "partial: expected true or false, got `{other}`"
            ))),
        }
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::invalid(format!("missing `{name}` query parameter"))),
    }
}

fn parse_period(value: &str, name: &str) -> Result<PeriodToken, AppError> {
    value
        .parse()
        .map_err(|e| AppError::invalid(format!("{name}: {e}")))
}

#[derive(Debug, Serialize)]
pub struct RangeResponse {
    pub records: Vec<RequestRecord>,
    pub total: u64,
}

impl From<RangeResult> for RangeResponse {
    fn from(result: RangeResult) -> Self {
        Self {
            total: result.total(),
            records: result.records,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PartialRangeResponse {
    pub entries: Vec<PeriodEntry>,
    pub total: u64,
    pub failed: usize,
}

impl From<PartialRangeResult> for PartialRangeResponse {
    fn from(result: PartialRangeResult) -> Self {
        Self {
            total: result.total(),
            failed: result.failed_count(),
            entries: result.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: Option<&str>, end: Option<&str>) -> RangeQuery {
        RangeQuery {
            start: start.map(String::from),
            end: end.map(String::from),
            partial: None,
        }
    }

    #[test]
    fn missing_bounds_are_rejected() {
        assert!(range(None, Some("2024-01")).bounds(240).is_err());
        assert!(range(Some("2024-01"), Some("  ")).bounds(240).is_err());
        assert!(DayQuery { day: None }.period().is_err());
    }

    #[test]
    fn partial_flag_accepts_booleans_only() {
        let mut query = range(Some("2024-01"), Some("2024-02"));
        assert!(!query.is_partial().unwrap());
        for (raw, expected) in [("true", true), ("1", true), ("false", false), ("0", false), ("", false)] {
            query.partial = Some(raw.to_string());
            assert_eq!(query.is_partial().unwrap(), expected, "{raw:?}");
        }
        query.partial = Some("yes".to_string());
        assert!(matches!(query.is_partial(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn reversed_and_oversized_ranges_are_rejected() {
        assert!(range(Some("2024-02"), Some("2024-01")).bounds(240).is_err());
        assert!(range(Some("2000-01"), Some("2024-01")).bounds(12).is_err());
        let (start, end) = range(Some("2023-11"), Some("2024-02")).bounds(240).unwrap();
        assert_eq!((start.to_string(), end.to_string()), ("2023-11".into(), "2024-02".into()));
    }
}
