// XLSX export of a processing report

use crate::domain::{Cell, ProcessingReport, RecordSet, StandardizerError, StandardizerResult, SummaryTable};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};
use std::path::Path;

pub const MONTHLY_SHEET: &str = "Summary per Month";
pub const DISTRICT_SHEET: &str = "Annual Summary";
pub const RAW_SHEET: &str = "Merged Raw Data";

const HEADER_BACKGROUND: u32 = 0xD7E4BC;
const COLUMN_WIDTH: f64 = 18.0;
/// Columns A through Z get the fixed width
const WIDE_COLUMNS: u16 = 26;

/// Write the monthly summary, district summary and cleaned records as three sheets
pub fn write_workbook(report: &ProcessingReport, path: &Path) -> StandardizerResult<()> {
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_BACKGROUND))
        .set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();

    let sheet = new_sheet(&mut workbook, MONTHLY_SHEET)?;
    write_summary(sheet, &report.monthly, &header_format)?;

    let sheet = new_sheet(&mut workbook, DISTRICT_SHEET)?;
    write_summary(sheet, &report.by_district, &header_format)?;

    let sheet = new_sheet(&mut workbook, RAW_SHEET)?;
    write_records(sheet, &report.cleaned, &header_format)?;

    workbook
        .save(path)
        .map_err(|e| StandardizerError::export(format!("Failed to save {}: {}", path.display(), e)))?;

    tracing::info!("Wrote workbook {}", path.display());
    Ok(())
}

fn new_sheet<'a>(workbook: &'a mut Workbook, name: &str) -> StandardizerResult<&'a mut Worksheet> {
    let sheet = workbook
        .add_worksheet()
        .set_name(name)
        .map_err(|e| StandardizerError::export(format!("Failed to create sheet '{name}': {e}")))?;

    for col in 0..WIDE_COLUMNS {
        sheet
            .set_column_width(col, COLUMN_WIDTH)
            .map_err(|e| StandardizerError::export(format!("Failed to set column {col} width: {e}")))?;
    }
    Ok(sheet)
}

fn write_summary(sheet: &mut Worksheet, table: &SummaryTable, header_format: &Format) -> StandardizerResult<()> {
    write_header(sheet, &table.headers(), header_format)?;

    for (idx, row) in table.rows.iter().enumerate() {
        let r = idx as u32 + 1;
        for (c, cell) in row.cells().into_iter().enumerate() {
            let c = c as u16;
            let written = match cell {
                Cell::Text(text) => sheet.write_string(r, c, text),
                Cell::Count(n) => sheet.write_number(r, c, n as f64),
                Cell::Ratio(v) => sheet.write_number(r, c, v),
            };
            written.map_err(|e| StandardizerError::export(format!("Failed to write cell ({r}, {c}): {e}")))?;
        }
    }
    Ok(())
}

fn write_records(sheet: &mut Worksheet, records: &RecordSet, header_format: &Format) -> StandardizerResult<()> {
    write_header(sheet, &records.columns, header_format)?;

    for (idx, row) in records.rows().enumerate() {
        let r = idx as u32 + 1;
        for (c, value) in row.into_iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            sheet
                .write_string(r, c as u16, value)
                .map_err(|e| StandardizerError::export(format!("Failed to write cell ({r}, {c}): {e}")))?;
        }
    }
    Ok(())
}

fn write_header(sheet: &mut Worksheet, headers: &[String], format: &Format) -> StandardizerResult<()> {
    for (c, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, c as u16, header, format)
            .map_err(|e| StandardizerError::export(format!("Failed to write header '{header}': {e}")))?;
    }
    Ok(())
}
