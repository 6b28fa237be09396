mod period;
mod record;

pub use period::{PeriodParseError, PeriodToken};
pub use record::{
    CellOutcome, PartialRangeResult, PeriodEntry, PeriodOutcome, RangeResult, RequestRecord,
};
