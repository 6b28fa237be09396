mod aggregator;
pub mod fetcher;
mod source;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use aggregator::Aggregator;
pub use fetcher::{extract_cell, fetch, fetch_outcome};
pub use source::{
    ExternalSourceError, HttpPageSource, PageSource, SourceErrorKind, create_stat_client,
};
