// Excel / OpenDocument reading

use super::Grid;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use std::path::Path;

/// Read the first worksheet of a workbook into a grid of display text
pub fn read_first_sheet(path: &Path) -> Result<Grid, String> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| format!("Failed to open Excel file: {e}"))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "Excel file contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{sheet_name}': {e}"))?;

    let grid: Grid = range.rows().map(|row| row.iter().map(cell_text).collect()).collect();
    if grid.is_empty() {
        return Err(format!("Sheet '{sheet_name}' is empty"));
    }

    tracing::debug!("Sheet '{}' of {}: {} rows", sheet_name, path.display(), grid.len());
    Ok(grid)
}

/// Render a cell the way it would be typed into a CSV
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Integers without decimals
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Data::Float(n) => n.to_string(),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => serial_to_text(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Excel 1900-system serial date to ISO text
fn serial_to_text(serial: f64) -> String {
    let Some(base) = NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return serial.to_string();
    };
    let days = serial.floor() as i64;
    let seconds = ((serial - serial.floor()) * 86_400.0).round() as i64;
    let datetime = base.and_hms_opt(0, 0, 0).map(|midnight| {
        midnight + Duration::days(days) + Duration::seconds(seconds)
    });

    match datetime {
        Some(dt) if seconds == 0 => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => serial.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(25.0)), "25");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(19)), "19");
        assert_eq!(cell_text(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_text(&Data::String("GUSA".into())), "GUSA");
    }

    #[test]
    fn test_serial_dates() {
        assert_eq!(serial_to_text(45292.0), "2024-01-01");
        assert_eq!(serial_to_text(45292.5), "2024-01-01 12:00:00");
    }

    #[test]
    fn test_workbook_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("records.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Address").unwrap();
        sheet.write_string(0, 1, "Age").unwrap();
        sheet.write_string(1, 0, "Gusa").unwrap();
        sheet.write_number(1, 1, 19.0).unwrap();
        workbook.save(&path).unwrap();

        let grid = read_first_sheet(&path).unwrap();
        assert_eq!(grid[0], vec!["Address", "Age"]);
        assert_eq!(grid[1], vec!["Gusa", "19"]);
    }
}
