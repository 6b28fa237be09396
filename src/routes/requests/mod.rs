mod handler;
mod model;

pub use handler::{export_range, get_range, get_requests};
pub use model::{DayQuery, PartialRangeResponse, RangeQuery, RangeResponse};
