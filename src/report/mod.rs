//! Report generation with multiple output formats
//!
//! Architecture: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - ProcessingReport (domain) is converted to terminal tables, JSON, CSV or a workbook
//! - Each formatter encapsulates the rules for its specific output format
//! - Summary values stay numeric until the formatter decides how to print them

pub mod workbook;

use crate::domain::{
    Cell, ProcessingReport, RecordSet, StandardizerError, StandardizerResult, SummaryTable,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub use workbook::write_workbook;

/// Supported output formats for processing reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned tables for the terminal
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// Comma separated summary tables
    Csv,
}

impl OutputFormat {
    /// Parse format from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "csv"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Include the per-district summary
    pub show_district: bool,
    /// Include the per-month summary
    pub show_monthly: bool,
    /// Decimal places for percentages in the human format
    pub percent_precision: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            use_colors: true,
            show_district: true,
            show_monthly: true,
            percent_precision: 1,
        }
    }
}

/// Main report formatter that dispatches to specific formatters
pub struct ReportFormatter {
    options: ReportOptions,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}

impl ReportFormatter {
    /// Create a new report formatter with options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format a processing report in the specified format
    pub fn format_report(&self, report: &ProcessingReport, format: OutputFormat) -> StandardizerResult<String> {
        match format {
            OutputFormat::Human => Ok(self.format_human(report)),
            OutputFormat::Json => self.format_json(report),
            OutputFormat::Csv => self.format_csv(report),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &ProcessingReport,
        format: OutputFormat,
        mut writer: W,
    ) -> StandardizerResult<()> {
        let formatted = self.format_report(report, format)?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    /// Tables selected by the options, monthly first
    fn selected<'a>(&self, report: &'a ProcessingReport) -> Vec<&'a SummaryTable> {
        let mut tables = Vec::new();
        if self.options.show_monthly {
            tables.push(&report.monthly);
        }
        if self.options.show_district {
            tables.push(&report.by_district);
        }
        tables
    }

    /// Format report as aligned plain-text tables
    fn format_human(&self, report: &ProcessingReport) -> String {
        let mut output = String::new();

        output.push_str(&self.bold("Birth Records Summary"));
        output.push('\n');
        for source in &report.sources {
            output.push_str(&format!("  {} ({} rows)\n", source.path.display(), source.rows));
        }

        let stats = &report.resolution;
        output.push_str(&format!(
            "{} records: {} resolved, {} missing, {} transient\n",
            report.record_count(),
            self.green(&stats.resolved.to_string()),
            self.yellow(&stats.missing.to_string()),
            self.yellow(&stats.transient.to_string()),
        ));

        for table in self.selected(report) {
            output.push('\n');
            output.push_str(&self.bold(&format!("By {}", table.label.header())));
            output.push('\n');
            if table.is_empty() {
                output.push_str("  (no data)\n");
                continue;
            }
            output.push_str(&self.render_table(table));
        }

        output
    }

    fn render_table(&self, table: &SummaryTable) -> String {
        let headers = table.headers();
        let body: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| row.cells().iter().map(|cell| self.cell_text(cell)).collect())
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &body {
            for (w, text) in widths.iter_mut().zip(row) {
                *w = (*w).max(text.chars().count());
            }
        }

        let mut output = String::new();
        output.push_str(&pad_line(&headers, &widths));
        output.push_str(&pad_line(
            &widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>(),
            &widths,
        ));
        for row in &body {
            output.push_str(&pad_line(row, &widths));
        }
        output
    }

    fn cell_text(&self, cell: &Cell) -> String {
        match cell {
            Cell::Text(text) => text.clone(),
            Cell::Count(n) => n.to_string(),
            Cell::Ratio(v) => format!("{:.*}%", self.options.percent_precision, v * 100.0),
        }
    }

    /// Format report in JSON format
    fn format_json(&self, report: &ProcessingReport) -> StandardizerResult<String> {
        let json_report = serde_json::json!({
            "sources": report.sources,
            "records": report.record_count(),
            "columns": report.cleaned.columns,
            "resolution": report.resolution,
            "monthly": self.options.show_monthly.then_some(&report.monthly),
            "by_district": self.options.show_district.then_some(&report.by_district),
            "config_fingerprint": report.config_fingerprint,
            "generated_at": report.generated_at.to_rfc3339(),
        });

        serde_json::to_string_pretty(&json_report)
            .map_err(|e| StandardizerError::export(format!("JSON serialization failed: {}", e)))
    }

    /// Format the selected summary tables as CSV, separated by a blank line
    fn format_csv(&self, report: &ProcessingReport) -> StandardizerResult<String> {
        let mut parts = Vec::new();
        for table in self.selected(report) {
            parts.push(summary_csv(table)?);
        }
        Ok(parts.join("\n"))
    }

    fn bold(&self, text: &str) -> String {
        self.paint(text, Style::Bold)
    }

    fn green(&self, text: &str) -> String {
        self.paint(text, Style::Green)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(text, Style::Yellow)
    }

    #[cfg(feature = "colors")]
    fn paint(&self, text: &str, style: Style) -> String {
        use colored::Colorize;
        if !self.options.use_colors {
            return text.to_string();
        }
        match style {
            Style::Bold => text.bold().to_string(),
            Style::Green => text.green().to_string(),
            Style::Yellow => text.yellow().to_string(),
        }
    }

    #[cfg(not(feature = "colors"))]
    fn paint(&self, text: &str, _style: Style) -> String {
        text.to_string()
    }
}

#[derive(Debug, Clone, Copy)]
enum Style {
    Bold,
    Green,
    Yellow,
}

fn pad_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = cells
        .iter()
        .zip(widths)
        .map(|(text, &w)| format!("{text:<w$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let trimmed = line.trim_end().len();
    line.truncate(trimmed);
    line.push('\n');
    line
}

/// Render a summary table as CSV text with ratios as fractions
pub fn summary_csv(table: &SummaryTable) -> StandardizerResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.headers()).map_err(csv_error)?;
    for row in &table.rows {
        let fields: Vec<String> = row
            .cells()
            .into_iter()
            .map(|cell| match cell {
                Cell::Text(text) => text,
                Cell::Count(n) => n.to_string(),
                Cell::Ratio(v) => v.to_string(),
            })
            .collect();
        writer.write_record(&fields).map_err(csv_error)?;
    }
    finish_csv(writer)
}

/// Render the cleaned records as CSV text
pub fn records_csv(records: &RecordSet) -> StandardizerResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&records.columns).map_err(csv_error)?;
    for row in records.rows() {
        writer.write_record(row).map_err(csv_error)?;
    }
    finish_csv(writer)
}

/// Write each report table to `dir` as its own CSV file
pub fn write_csv_dir(report: &ProcessingReport, dir: &Path) -> StandardizerResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let outputs = [
        ("summary_per_month.csv", summary_csv(&report.monthly)?),
        ("annual_summary.csv", summary_csv(&report.by_district)?),
        ("merged_raw_data.csv", records_csv(&report.cleaned)?),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (name, content) in outputs {
        let path = dir.join(name);
        fs::write(&path, content)?;
        tracing::debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> StandardizerResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| StandardizerError::export(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| StandardizerError::export(format!("CSV output is not UTF-8: {}", e)))
}

fn csv_error(e: csv::Error) -> StandardizerError {
    StandardizerError::export(format!("CSV write failed: {}", e))
}
