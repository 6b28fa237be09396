use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::source::{ExternalSourceError, PageSource};
use crate::models::{CellOutcome, PeriodOutcome, PeriodToken, RequestRecord};

// The count lives in the first table: second row, third cell.
const ROW_INDEX: usize = 1;
const CELL_INDEX: usize = 2;

static TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Pulls the request count out of a statistics page.
pub fn extract_cell(html: &str) -> CellOutcome {
    let document = Html::parse_document(html);

    let text = document
        .select(&TABLE)
        .next()
        .and_then(|table| table.select(&ROW).nth(ROW_INDEX))
        .and_then(|row| row.select(&CELL).nth(CELL_INDEX))
        .map(|cell| cell.text().collect::<String>().trim().to_string());

    match text {
        Some(text) => match text.parse::<u64>() {
            Ok(count) => CellOutcome::Count(count),
            Err(_) => CellOutcome::Anomaly { text },
        },
        None => CellOutcome::Anomaly {
            text: String::new(),
        },
    }
}

/// One outbound request for `period`, with parse anomalies kept tagged.
pub async fn fetch_outcome(
    source: &dyn PageSource,
    period: PeriodToken,
) -> Result<PeriodOutcome, ExternalSourceError> {
    let body = source.fetch_page(&period).await.map_err(|e| {
        tracing::error!("Failed to fetch statistics page: {}", e);
        e
    })?;

    let outcome = extract_cell(&body);
    if let CellOutcome::Anomaly { text } = &outcome {
        tracing::warn!("Could not parse request count for {}: {:?}", period, text);
    }

    Ok(PeriodOutcome {
        day: period,
        outcome,
    })
}

/// Like [`fetch_outcome`], but an unparsable page reads as zero requests.
pub async fn fetch(
    source: &dyn PageSource,
    period: PeriodToken,
) -> Result<RequestRecord, ExternalSourceError> {
    fetch_outcome(source, period).await.map(PeriodOutcome::into_record)
}
