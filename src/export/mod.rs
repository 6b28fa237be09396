use std::collections::{BTreeMap, BTreeSet};

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use thiserror::Error;

use crate::models::{PeriodToken, RequestRecord};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// 0-based position of the first block: row 3, column B
const FIRST_ROW: u32 = 2;
const FIRST_COL: u16 = 1;

/// Reporting years run July through June.
const FIRST_MONTH: u32 = 7;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportCell {
    /// `YYYYMM`
    pub month_key: u32,
    pub requests: u64,
}

/// One July–June block, starting in July of `start_year`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportYear {
    pub start_year: i32,
    pub cells: Vec<ReportCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportGrid {
    pub years: Vec<ReportYear>,
}

fn reporting_year(period: &PeriodToken) -> i32 {
    if period.month_number() >= FIRST_MONTH {
        period.year()
    } else {
        period.year() - 1
    }
}

impl ReportGrid {
    /// Lays records out by reporting year; months without a record read 0.
    pub fn build(records: &[RequestRecord]) -> Self {
        let mut by_month: BTreeMap<u32, u64> = BTreeMap::new();
        let mut years = BTreeSet::new();

        for record in records {
            let count = by_month.entry(record.day.month_key()).or_default();
            *count = count.saturating_add(record.requests);
            years.insert(reporting_year(&record.day));
        }

        let years = years
            .into_iter()
            .map(|start_year| {
                let cells = (0..12)
                    .map(|offset| {
                        let month = (FIRST_MONTH - 1 + offset) % 12 + 1;
                        let year = if month >= FIRST_MONTH { start_year } else { start_year + 1 };
                        let month_key = year as u32 * 100 + month;
                        ReportCell {
                            month_key,
                            requests: by_month.get(&month_key).copied().unwrap_or(0),
                        }
                    })
                    .collect();
                ReportYear { start_year, cells }
            })
            .collect();

        Self { years }
    }
}

pub fn sheet_name(start: &PeriodToken, end: &PeriodToken) -> String {
    format!("{start}_to_{end}_Report")
}

pub fn file_name(start: &PeriodToken, end: &PeriodToken) -> String {
    format!("monthly_requests_{start}_to_{end}_report.xlsx")
}

/// Renders the grid as an xlsx workbook: a date row and a count row per
/// reporting year.
pub fn write_xlsx(
    grid: &ReportGrid,
    start: &PeriodToken,
    end: &PeriodToken,
) -> Result<Vec<u8>, ExportError> {
    let format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::Black)
        .set_align(FormatAlign::Right)
        .set_align(FormatAlign::VerticalCenter);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(start, end))?;

    let mut row = FIRST_ROW;
    for year in &grid.years {
        for (i, cell) in year.cells.iter().enumerate() {
            let col = FIRST_COL + i as u16;
            worksheet.write_number_with_format(row, col, cell.month_key, &format)?;
            worksheet.write_number_with_format(row + 1, col, cell.requests as f64, &format)?;
        }
        row += 2;
    }

    Ok(workbook.save_to_buffer()?)
}
