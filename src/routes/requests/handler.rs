use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};

use super::model::{DayQuery, PartialRangeResponse, RangeQuery, RangeResponse};
use crate::{
    AppState,
    crawler::fetch,
    error::AppError,
    export::{self, ReportGrid},
    models::{PeriodToken, RangeResult, RequestRecord},
    result::ApiResponse,
    utils::{date::months_in_range, success_to_api_response},
};

// GET /requests?day=
pub async fn get_requests(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<ApiResponse<RequestRecord>>, AppError> {
    let period = query.period()?;
    let record = fetch(state.aggregator.source(), period).await?;
    Ok(success_to_api_response(record))
}

// GET /requests/range?start=&end=[&partial=true]
pub async fn get_range(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Response, AppError> {
    let (start, end) = query.bounds(state.config.max_range_months)?;
    let partial = query.is_partial()?;
    let periods = months_in_range(start, end);

    if partial {
        let partial = state.aggregator.aggregate_partial(&periods).await;
        return Ok(success_to_api_response(PartialRangeResponse::from(partial)).into_response());
    }

    let result = fetch_range(&state, start, end, &periods).await?;
    Ok(success_to_api_response(RangeResponse::from(result)).into_response())
}

// GET /requests/export?start=&end=
pub async fn export_range(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Response, AppError> {
    let (start, end) = query.bounds(state.config.max_range_months)?;
    let periods = months_in_range(start, end);
    let result = fetch_range(&state, start, end, &periods).await?;

    let grid = ReportGrid::build(&result.records);
    let bytes = export::write_xlsx(&grid, &start, &end)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::file_name(&start, &end)
    );

    Ok((
        [
            (header::CONTENT_TYPE, export::XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn fetch_range(
    state: &AppState,
    start: PeriodToken,
    end: PeriodToken,
    periods: &[PeriodToken],
) -> Result<RangeResult, AppError> {
    state.aggregator.aggregate(periods).await.map_err(|e| {
        tracing::error!("Range {} to {} failed: {}", start, end, e);
        AppError::RangeUpstream
    })
}
