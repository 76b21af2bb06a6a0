//! Results of one upload-to-report cycle
//!
//! Architecture: Aggregate Root - ProcessingReport owns everything a run produces
//! - Source provenance, the cleaned table and both summaries travel together
//! - Nothing here is persisted between runs

use super::{RecordSet, ResolvedAddress, SummaryTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a record set came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub rows: usize,
    /// SHA-256 of the file bytes, hex encoded
    pub sha256: String,
}

/// Count of address resolution outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub resolved: usize,
    pub missing: usize,
    pub transient: usize,
}

impl ResolutionStats {
    /// Record one outcome
    pub fn add(&mut self, outcome: &ResolvedAddress) {
        match outcome {
            ResolvedAddress::District(_) => self.resolved += 1,
            ResolvedAddress::Missing => self.missing += 1,
            ResolvedAddress::Transient => self.transient += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.resolved + self.missing + self.transient
    }
}

/// Everything produced from one set of uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingReport {
    /// Input files in the order they were merged
    pub sources: Vec<SourceInfo>,
    /// Merged records with addresses resolved and PII removed
    pub cleaned: RecordSet,
    /// Summary grouped by month
    pub monthly: SummaryTable,
    /// Summary grouped by resolved district
    pub by_district: SummaryTable,
    pub resolution: ResolutionStats,
    pub config_fingerprint: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl ProcessingReport {
    /// Total number of merged records
    pub fn record_count(&self) -> usize {
        self.cleaned.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_stats() {
        let mut stats = ResolutionStats::default();
        stats.add(&ResolvedAddress::District("GUSA".into()));
        stats.add(&ResolvedAddress::District("BULUA".into()));
        stats.add(&ResolvedAddress::Missing);
        stats.add(&ResolvedAddress::Transient);

        assert_eq!(stats.resolved, 2);
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.transient, 1);
        assert_eq!(stats.total(), 4);
    }
}
