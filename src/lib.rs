//! Records Standardizer - Address normalization and summary statistics for birth records
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Pure domain logic separated from file formats and presentation
//! - Configuration is loaded once and handed to each service explicitly
//! - The Standardizer facade runs ingest, merge, clean and summarize in order

pub mod aggregate;
pub mod config;
pub mod domain;
pub mod ingest;
pub mod patterns;
pub mod report;
pub mod resolver;

// Re-export main types for convenient access
pub use domain::{
    GroupLabel, ProcessingReport, Record, RecordSet, ResolutionStats, ResolvedAddress, SourceInfo,
    StandardizerError, StandardizerResult, SummaryRow, SummaryTable, MISSING, TRANSIENT,
};

pub use config::{ConfigBuilder, StandardizerConfig};

pub use aggregate::{Aggregator, GroupBy};

pub use ingest::{discover_inputs, Ingestor, SourceTable};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use resolver::AddressResolver;

use std::path::{Path, PathBuf};

/// Main entry point tying ingest, resolution and aggregation together
#[derive(Debug, Clone)]
pub struct Standardizer {
    config: StandardizerConfig,
    ingestor: Ingestor,
    resolver: AddressResolver,
    aggregator: Aggregator,
}

impl Standardizer {
    /// Create a standardizer with the given configuration
    pub fn new_with_config(config: StandardizerConfig) -> StandardizerResult<Self> {
        config.validate()?;
        let resolver = AddressResolver::new(&config.taxonomy)?;
        let aggregator = Aggregator::new(&config);
        let ingestor = Ingestor::new(config.columns.clone());

        Ok(Self { config, ingestor, resolver, aggregator })
    }

    /// Create a standardizer with the built-in taxonomy
    pub fn new() -> StandardizerResult<Self> {
        Self::new_with_config(StandardizerConfig::default())
    }

    /// Create a standardizer loading configuration from file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> StandardizerResult<Self> {
        let config = StandardizerConfig::load_from_file(path)?;
        Self::new_with_config(config)
    }

    pub fn config(&self) -> &StandardizerConfig {
        &self.config
    }

    pub fn resolver(&self) -> &AddressResolver {
        &self.resolver
    }

    /// Resolve a single address pair
    pub fn resolve(&self, address: &str, specific_address: &str) -> ResolvedAddress {
        self.resolver.resolve(address, specific_address)
    }

    /// Read every file, failing on the first one that cannot be parsed
    pub fn read_files(&self, files: &[PathBuf]) -> StandardizerResult<Vec<SourceTable>> {
        files.iter().map(|file| self.ingestor.read_file(file)).collect()
    }

    /// Concatenate record sets in order
    pub fn merge(&self, sets: Vec<RecordSet>) -> RecordSet {
        let merged = RecordSet::concat(sets);
        tracing::info!("Merged {} records with {} columns", merged.len(), merged.columns.len());
        merged
    }

    /// Replace each address with its resolution and drop PII columns.
    ///
    /// Records are left unresolved when the address column is absent; the
    /// district summary over them is then empty.
    pub fn clean(&self, records: &RecordSet) -> (RecordSet, ResolutionStats) {
        let columns = &self.config.columns;
        let mut cleaned = records.clone();
        let mut stats = ResolutionStats::default();

        if cleaned.has_column(&columns.address) {
            for record in &mut cleaned.records {
                let resolved =
                    self.resolver.resolve(record.get(&columns.address), record.get(&columns.specific_address));
                stats.add(&resolved);
                record.set(columns.address.clone(), resolved.as_str());
            }
            tracing::info!(
                "Resolved {} addresses: {} matched, {} missing, {} transient",
                stats.total(),
                stats.resolved,
                stats.missing,
                stats.transient
            );
        } else {
            tracing::warn!("Column '{}' not found; addresses left unresolved", columns.address);
        }

        cleaned.drop_columns(&columns.pii);
        (cleaned, stats)
    }

    /// Monthly and per-district summaries of cleaned records
    pub fn summarize(&self, cleaned: &RecordSet) -> (SummaryTable, SummaryTable) {
        let monthly = self.aggregator.summarize(cleaned, &GroupBy::Month);
        let by_district = self.aggregator.summarize(cleaned, &GroupBy::District);
        (monthly, by_district)
    }

    /// Summarize by a caller-chosen column, which must exist
    pub fn summarize_by(&self, cleaned: &RecordSet, group_by: &GroupBy) -> StandardizerResult<SummaryTable> {
        let column = group_by.column(&self.config.columns);
        if !cleaned.has_column(column) {
            return Err(StandardizerError::missing_column(column));
        }
        Ok(self.aggregator.summarize(cleaned, group_by))
    }

    /// Full run over files and directories
    pub fn process_paths<P: AsRef<Path>>(&self, paths: &[P]) -> StandardizerResult<ProcessingReport> {
        let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        let files = discover_inputs(&paths, &[])?;
        if files.is_empty() {
            return Err(StandardizerError::ingest(
                paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "),
                "no supported input files found",
            ));
        }

        let tables = self.read_files(&files)?;
        let (sources, sets): (Vec<SourceInfo>, Vec<RecordSet>) =
            tables.into_iter().map(|t| (t.source, t.records)).unzip();

        let mut report = self.process_record_sets(sets);
        report.sources = sources;
        Ok(report)
    }

    /// Full run over record sets already in memory
    pub fn process_record_sets(&self, sets: Vec<RecordSet>) -> ProcessingReport {
        let merged = self.merge(sets);
        let (cleaned, resolution) = self.clean(&merged);
        let (monthly, by_district) = self.summarize(&cleaned);

        ProcessingReport {
            sources: Vec::new(),
            cleaned,
            monthly,
            by_district,
            resolution,
            config_fingerprint: Some(self.config.fingerprint()),
            generated_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const JANUARY: &str = "\
NAME,ADDRESS,SPECIFIC ADDRESS,GENDER,WGT. IN GRAMS,PLACE OF DELIVERY,ATTENDANT,AGE,GOV/PRI,MONTH
Ana,Gusa,Zone 1,F,GREATER THAN 2500,HOSPITAL,MD,17,GOV,JANUARY
Bea,Purok 2,Calaanan,M,LESSER THAN 2500,HOME,HILOT,24,PRI,JANUARY
Cid,,,F,,,,,,JANUARY
";

    const FEBRUARY: &str = "\
Name,Address,Gender,Month
Dee,Gusa,F,FEBRUARY
Eve,Somewhere Else,M,FEBRUARY
";

    fn write_inputs(dir: &TempDir) -> Vec<PathBuf> {
        let jan = dir.path().join("jan.csv");
        let feb = dir.path().join("feb.csv");
        fs::write(&jan, JANUARY).unwrap();
        fs::write(&feb, FEBRUARY).unwrap();
        vec![jan, feb]
    }

    #[test]
    fn test_process_paths_end_to_end() {
        let dir = TempDir::new().unwrap();
        let standardizer = Standardizer::new().unwrap();
        let report = standardizer.process_paths(&write_inputs(&dir)).unwrap();

        assert_eq!(report.sources.len(), 2);
        assert_eq!(report.record_count(), report.sources.iter().map(|s| s.rows).sum::<usize>());
        assert_eq!(report.record_count(), 5);

        assert_eq!(report.resolution, ResolutionStats { resolved: 3, missing: 1, transient: 1 });

        let addresses: Vec<&str> = report.cleaned.records.iter().map(|r| r.get("ADDRESS")).collect();
        assert_eq!(addresses, vec!["GUSA", "CANITOAN", MISSING, "GUSA", TRANSIENT]);

        assert_eq!(report.by_district.groups(), vec!["CANITOAN", "GUSA", TRANSIENT]);
        assert_eq!(report.by_district.row("GUSA").unwrap().total, 2);
        assert_eq!(report.monthly.groups(), vec!["JANUARY", "FEBRUARY"]);
        assert_eq!(report.monthly.row("JANUARY").unwrap().total, 3);
        assert!(report.config_fingerprint.is_some());
    }

    #[test]
    fn test_district_totals_match_resolution_counts() {
        let dir = TempDir::new().unwrap();
        let standardizer = Standardizer::new().unwrap();
        let report = standardizer.process_paths(&write_inputs(&dir)).unwrap();

        for row in &report.by_district.rows {
            let resolved = report
                .cleaned
                .records
                .iter()
                .filter(|r| r.get("ADDRESS") == row.group)
                .count();
            assert_eq!(row.total, resolved, "group {}", row.group);
        }
    }

    #[test]
    fn test_pii_columns_removed() {
        let dir = TempDir::new().unwrap();
        let standardizer = Standardizer::new().unwrap();
        let report = standardizer.process_paths(&write_inputs(&dir)).unwrap();

        assert_eq!(
            report.cleaned.columns,
            vec![
                "ADDRESS",
                "GENDER",
                "WGT. IN GRAMS",
                "PLACE_OF_DELIVERY",
                "ATTENDANT",
                "AGE",
                "GOV/PRI",
                "MONTH"
            ]
        );
        for record in &report.cleaned.records {
            assert!(!record.contains("NAME"));
            assert!(!record.contains("SPECIFIC ADDRESS"));
        }
    }

    #[test]
    fn test_recleaning_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let standardizer = Standardizer::new().unwrap();
        let report = standardizer.process_paths(&write_inputs(&dir)).unwrap();

        let (again, stats) = standardizer.clean(&report.cleaned);
        assert_eq!(again, report.cleaned);
        assert_eq!(stats, report.resolution);

        let (_, by_district) = standardizer.summarize(&again);
        assert_eq!(by_district, report.by_district);
    }

    #[test]
    fn test_missing_address_column_gives_empty_district_summary() {
        let mut set = RecordSet::new(vec!["MONTH".into(), "GENDER".into()]);
        set.push(Record::new().with("MONTH", "MARCH").with("GENDER", "F"));

        let report = Standardizer::new().unwrap().process_record_sets(vec![set]);
        assert!(report.by_district.is_empty());
        assert_eq!(report.resolution.total(), 0);
        assert_eq!(report.monthly.groups(), vec!["MARCH"]);
        assert_eq!(report.monthly.row("MARCH").unwrap().female, 1);
    }

    #[test]
    fn test_summarize_by_field() {
        let dir = TempDir::new().unwrap();
        let standardizer = Standardizer::new().unwrap();
        let report = standardizer.process_paths(&write_inputs(&dir)).unwrap();

        let by_sector = standardizer
            .summarize_by(&report.cleaned, &GroupBy::Field("GOV/PRI".into()))
            .unwrap();
        assert_eq!(by_sector.groups(), vec!["GOV", "PRI"]);
        assert_eq!(by_sector.row("GOV").unwrap().government, 1);

        let err = standardizer
            .summarize_by(&report.cleaned, &GroupBy::Field("RELIGION".into()))
            .unwrap_err();
        assert!(matches!(err, StandardizerError::MissingColumn { .. }));
    }

    #[test]
    fn test_malformed_file_aborts_run() {
        let dir = TempDir::new().unwrap();
        let mut inputs = write_inputs(&dir);
        let broken = dir.path().join("broken.xlsx");
        fs::write(&broken, "not a workbook").unwrap();
        inputs.push(broken);

        let err = Standardizer::new().unwrap().process_paths(&inputs).unwrap_err();
        assert!(matches!(err, StandardizerError::Ingest { .. }));
    }

    #[test]
    fn test_blank_rows_count_as_missing_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gaps.csv");
        fs::write(&path, "ADDRESS,MONTH\nGUSA,JANUARY\n,\nBULUA,MARCH\n").unwrap();

        let report = Standardizer::new().unwrap().process_paths(&[path]).unwrap();
        assert_eq!(report.record_count(), 3);
        assert_eq!(report.sources[0].rows, 3);
        assert_eq!(report.resolution.missing, 1);
        assert_eq!(report.resolution.resolved, 2);
        assert_eq!(report.cleaned.records[1].get("ADDRESS"), MISSING);
        assert_eq!(report.by_district.groups(), vec!["BULUA", "GUSA"]);
    }

    #[test]
    fn test_empty_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Standardizer::new().unwrap().process_paths(&[dir.path()]).unwrap_err();
        assert!(err.to_string().contains("no supported input files"));
    }

    #[test]
    fn test_from_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records_standardizer.yaml");
        let config = ConfigBuilder::new().districts(["NORTH"]).alias("PIER", "NORTH").build().unwrap();
        fs::write(&path, config.to_yaml().unwrap()).unwrap();

        let standardizer = Standardizer::from_config_file(&path).unwrap();
        assert_eq!(standardizer.config().fingerprint(), config.fingerprint());
        assert_eq!(standardizer.resolve("Pier 3", ""), ResolvedAddress::District("NORTH".into()));
    }

    #[test]
    fn test_custom_taxonomy() {
        let config = ConfigBuilder::new()
            .districts(["NORTH", "SOUTH"])
            .alias("HARBOR", "SOUTH")
            .build()
            .unwrap();
        let standardizer = Standardizer::new_with_config(config).unwrap();

        assert_eq!(standardizer.resolve("Harbor Road", ""), ResolvedAddress::District("SOUTH".into()));
        assert_eq!(standardizer.resolve("North", ""), ResolvedAddress::District("NORTH".into()));
        assert_eq!(standardizer.resolve("Gusa", ""), ResolvedAddress::Transient);
    }
}
