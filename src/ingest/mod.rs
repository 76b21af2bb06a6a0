//! Reading uploaded record files into record sets
//!
//! Architecture: Infrastructure Layer - Ingest turns files on disk into domain record sets
//! - Delimited text and spreadsheet formats are parsed into a raw grid of strings
//! - Headers are normalized and renamed once, here, before the domain sees them
//! - Parse failures are reported per file and never reach the resolver or aggregator

pub mod delimited;
pub mod spreadsheet;

use crate::config::ColumnConfig;
use crate::domain::{Record, RecordSet, SourceInfo, StandardizerError, StandardizerResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions read as delimited text
pub const DELIMITED_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

/// Extensions read through the spreadsheet reader
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// A rectangular grid of cell text; the first row holds headers
pub type Grid = Vec<Vec<String>>;

/// A parsed input file
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub source: SourceInfo,
    pub records: RecordSet,
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Delimiter sniffed from content
    Delimited,
    /// Tab separated
    Tsv,
    /// Excel or OpenDocument workbook
    Spreadsheet,
}

impl InputFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if ext == "tsv" {
            Some(Self::Tsv)
        } else if DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Delimited)
        } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Spreadsheet)
        } else {
            None
        }
    }
}

/// Reads input files and normalizes their headers
#[derive(Debug, Clone)]
pub struct Ingestor {
    columns: ColumnConfig,
}

impl Ingestor {
    pub fn new(columns: ColumnConfig) -> Self {
        Self { columns }
    }

    /// Read a single file into a record set
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> StandardizerResult<SourceTable> {
        let path = path.as_ref();
        let file = path.display().to_string();

        let format = InputFormat::from_path(path).ok_or_else(|| {
            StandardizerError::ingest(&file, "unsupported file type (expected CSV, TSV or Excel)")
        })?;

        let bytes = fs::read(path)
            .map_err(|e| StandardizerError::ingest(&file, format!("failed to read file: {e}")))?;
        let sha256 = format!("{:x}", Sha256::digest(&bytes));

        let grid = match format {
            InputFormat::Delimited => delimited::parse(&delimited::decode(bytes), None),
            InputFormat::Tsv => delimited::parse(&delimited::decode(bytes), Some(b'\t')),
            InputFormat::Spreadsheet => spreadsheet::read_first_sheet(path),
        }
        .map_err(|message| StandardizerError::ingest(&file, message))?;

        let records = self.grid_to_records(grid);
        tracing::debug!(
            "Read {} rows and {} columns from {}",
            records.len(),
            records.columns.len(),
            file
        );

        Ok(SourceTable {
            source: SourceInfo { path: path.to_path_buf(), rows: records.len(), sha256 },
            records,
        })
    }

    /// Convert a raw grid into records keyed by normalized header
    pub fn grid_to_records(&self, grid: Grid) -> RecordSet {
        let mut rows = grid.into_iter();
        let Some(mut header_row) = rows.next() else {
            return RecordSet::default();
        };
        let data: Grid = rows.collect();

        // Cells past the header row get unnamed columns of their own
        let width = data.iter().map(Vec::len).max().unwrap_or(0);
        if width > header_row.len() {
            header_row.resize(width, String::new());
        }

        let headers = self.normalize_headers(&header_row);
        let mut set = RecordSet::new(headers.clone());

        for row in data {
            let record: Record = headers
                .iter()
                .zip(row.into_iter().chain(std::iter::repeat(String::new())))
                .map(|(header, value)| (header.clone(), value))
                .collect();
            set.records.push(record);
        }

        set
    }

    /// Normalize headers, naming blanks and disambiguating duplicates
    pub fn normalize_headers(&self, raw: &[String]) -> Vec<String> {
        let mut headers: Vec<String> = Vec::with_capacity(raw.len());
        for (idx, cell) in raw.iter().enumerate() {
            let mut header = self.columns.normalize_header(cell);
            if header.is_empty() {
                header = format!("UNNAMED: {idx}");
            }
            if headers.contains(&header) {
                let mut n = 1;
                while headers.contains(&format!("{header}.{n}")) {
                    n += 1;
                }
                header = format!("{header}.{n}");
            }
            headers.push(header);
        }
        headers
    }
}

/// Expand file and directory arguments into the list of files to ingest.
///
/// Directories are walked recursively; files inside them are kept when their
/// extension is supported and, if `include` is non-empty, their path matches
/// one of the glob patterns. Explicit file arguments are always kept.
pub fn discover_inputs(paths: &[PathBuf], include: &[String]) -> StandardizerResult<Vec<PathBuf>> {
    let patterns = include
        .iter()
        .map(|p| {
            glob::Pattern::new(p)
                .map_err(|e| StandardizerError::config(format!("Invalid include pattern '{p}': {e}")))
        })
        .collect::<StandardizerResult<Vec<_>>>()?;

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable entry under {}: {}", path.display(), e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|p| InputFormat::from_path(p).is_some())
                .filter(|p| patterns.is_empty() || patterns.iter().any(|g| g.matches_path(p)))
                .collect();
            found.sort();
            files.extend(found);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(StandardizerError::ingest(path.display().to_string(), "file not found"));
        }
    }
    Ok(files)
}
