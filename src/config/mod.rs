//! Configuration loading and management for the records standardizer
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML structures are converted to clean domain objects
//! - The barangay taxonomy and keyword categories are embedded defaults, not globals
//! - A single immutable configuration value is handed to the resolver and aggregator

use crate::domain::{StandardizerError, StandardizerResult, MISSING};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizerConfig {
    /// Configuration format version
    pub version: String,
    /// Reference taxonomy of districts and sub-district aliases
    pub taxonomy: TaxonomyConfig,
    /// Trigger terms for every keyword category
    pub keywords: KeywordConfig,
    /// Canonical column names, header renames and PII columns
    #[serde(default)]
    pub columns: ColumnConfig,
}

/// Reference taxonomy. Order of both lists is the scan order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    /// Named districts in declared order
    pub districts: Vec<String>,
    /// Numerically named districts appended after the named ones
    #[serde(default)]
    pub numbered_districts: Option<NumberedDistricts>,
    /// Sub-district aliases, checked before any district
    #[serde(default)]
    pub aliases: Vec<AliasEntry>,
    /// Literal tokens that stand for an absent value
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<String>,
}

/// A run of districts named `{prefix} 1` through `{prefix} {count}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedDistricts {
    pub prefix: String,
    pub count: u32,
}

/// Sub-district alias owned by a canonical district
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub alias: String,
    pub district: String,
}

/// Trigger terms per keyword category, matched as case-insensitive substrings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Threshold used for the weight column headers
    #[serde(default = "default_weight_threshold")]
    pub weight_threshold_grams: u32,
    pub weight_above: Vec<String>,
    pub weight_below: Vec<String>,
    pub hospital: Vec<String>,
    pub health_center: Vec<String>,
    pub lying_in: Vec<String>,
    pub physician: Vec<String>,
    pub midwife_nurse: Vec<String>,
    pub government: Vec<String>,
}

/// Canonical field names as they appear after header normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub address: String,
    pub specific_address: String,
    pub sex: String,
    pub weight: String,
    pub place_of_delivery: String,
    pub attendant: String,
    pub age: String,
    pub sector: String,
    pub month: String,
    /// Header spelling variants mapped to canonical names, applied in order
    pub renames: Vec<ColumnRename>,
    /// Columns removed from the cleaned table
    pub pii: Vec<String>,
}

/// A single header rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub from: String,
    pub to: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        let rename = |from: &str, to: &str| ColumnRename { from: from.into(), to: to.into() };
        Self {
            address: "ADDRESS".into(),
            specific_address: "SPECIFIC ADDRESS".into(),
            sex: "GENDER".into(),
            weight: "WGT. IN GRAMS".into(),
            place_of_delivery: "PLACE_OF_DELIVERY".into(),
            attendant: "ATTENDANT".into(),
            age: "AGE".into(),
            sector: "GOV/PRI".into(),
            month: "MONTH".into(),
            renames: vec![
                rename("PLACE OF DELIVERY", "PLACE_OF_DELIVERY"),
                rename("DATE OF BIRTH", "DATE"),
                rename("MOTHER'S NAME", "MOTHER_NAME"),
            ],
            pii: vec!["NAME".into(), "MOTHER_NAME".into(), "SPECIFIC ADDRESS".into()],
        }
    }
}

impl ColumnConfig {
    /// Normalize a raw header: uppercase, trim, then apply the rename table
    pub fn normalize_header(&self, raw: &str) -> String {
        let header = raw.trim().to_uppercase();
        self.renames
            .iter()
            .find(|r| r.from == header)
            .map(|r| r.to.clone())
            .unwrap_or(header)
    }
}

impl TaxonomyConfig {
    /// Every district in scan order: named first, then numbered
    pub fn all_districts(&self) -> Vec<String> {
        let mut all: Vec<String> = self.districts.clone();
        if let Some(numbered) = &self.numbered_districts {
            all.extend((1..=numbered.count).map(|i| format!("{} {}", numbered.prefix, i)));
        }
        all
    }
}

impl StandardizerConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> StandardizerResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            StandardizerError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            StandardizerError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> StandardizerResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| StandardizerError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Built-in Cagayan de Oro taxonomy and City Health Office keyword lists
    pub fn with_defaults() -> Self {
        let words = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let alias = |alias: &str, district: &str| AliasEntry {
            alias: alias.into(),
            district: district.into(),
        };

        Self {
            version: "1.0".to_string(),
            taxonomy: TaxonomyConfig {
                districts: words(&[
                    "AGUSAN", "BAIKINGON", "BALUBAL", "BALULANG", "BAYABAS", "BAYANGA",
                    "BESIGAN", "BONBON", "BUGO", "BUHUAWEN", "BULUA", "CAMAMAN-AN",
                    "CANITOAN", "CARMEN", "CONSOLACION", "CUGMAN", "DANSOLIHON",
                    "F.S. CATANICO", "GUSA", "INDAHAG", "IPONAN", "KAUSWAGAN", "LAPASAN",
                    "LUMBAMBIA", "LUMBIA", "MACABALAN", "MACASANDIG", "MAGSAYSAY",
                    "MAMBUAYA", "NAZARETH", "PAGALUNGAN", "PAGATPAT", "PATAG", "PIGSAG-AN",
                    "PUERTO", "PUNTOD", "SAN SIMON", "TABLON", "TAGLIMAO", "TAGPANGI",
                    "TIGNAPOLOAN", "TUBURAN", "TUMPAGON",
                ]),
                numbered_districts: Some(NumberedDistricts {
                    prefix: "BARANGAY".into(),
                    count: 40,
                }),
                aliases: vec![
                    alias("CALAANAN", "CANITOAN"),
                    alias("PASIL", "KAUSWAGAN"),
                    alias("AGORA", "LAPASAN"),
                    alias("MACANHAN", "CARMEN"),
                    alias("ORO HABITAT", "CANITOAN"),
                ],
                placeholders: default_placeholders(),
            },
            keywords: KeywordConfig {
                weight_threshold_grams: default_weight_threshold(),
                weight_above: words(&["GREATER", "2500"]),
                weight_below: words(&["LESSER", "2500", "<"]),
                hospital: words(&["HOSP"]),
                health_center: words(&["HC", "HEALTH CENTER"]),
                lying_in: words(&["LYING"]),
                physician: words(&["MD", "PHYSICIAN"]),
                midwife_nurse: words(&["MIDWIFE", "RHM", "PHN"]),
                government: words(&["GOV"]),
            },
            columns: ColumnConfig::default(),
        }
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> StandardizerResult<()> {
        // Check version compatibility
        if !["1.0"].contains(&self.version.as_str()) {
            return Err(StandardizerError::config(format!(
                "Unsupported configuration version: {}. Supported versions: 1.0",
                self.version
            )));
        }

        let districts = self.taxonomy.all_districts();
        let mut seen = HashSet::new();
        for district in &districts {
            if district.trim().is_empty() {
                return Err(StandardizerError::config("District names must not be empty"));
            }
            if !seen.insert(district.trim().to_uppercase()) {
                return Err(StandardizerError::config(format!(
                    "Duplicate district '{district}' in taxonomy"
                )));
            }
        }

        let mut aliases = HashSet::new();
        for entry in &self.taxonomy.aliases {
            if entry.alias.trim().is_empty() {
                return Err(StandardizerError::config("Alias names must not be empty"));
            }
            if !aliases.insert(entry.alias.as_str()) {
                return Err(StandardizerError::config(format!(
                    "Duplicate alias '{}' in taxonomy",
                    entry.alias
                )));
            }
            if !seen.contains(&entry.district.trim().to_uppercase()) {
                return Err(StandardizerError::config(format!(
                    "Alias '{}' points at unknown district '{}'",
                    entry.alias, entry.district
                )));
            }
            if seen.contains(&entry.alias.trim().to_uppercase()) {
                tracing::warn!(
                    "Alias '{}' is also a district name; it will always resolve to '{}'",
                    entry.alias,
                    entry.district
                );
            }
        }

        for (category, terms) in self.keywords.categories() {
            if terms.iter().any(|t| t.is_empty()) {
                return Err(StandardizerError::config(format!(
                    "Keyword category '{category}' contains an empty term"
                )));
            }
        }

        // Numeric weight terms name the threshold the report headers print
        let threshold = self.keywords.weight_threshold_grams;
        for term in self.keywords.weight_above.iter().chain(&self.keywords.weight_below) {
            if let Ok(grams) = term.trim().parse::<u32>() {
                if grams != threshold {
                    return Err(StandardizerError::config(format!(
                        "Weight term '{term}' does not match weight_threshold_grams {threshold}"
                    )));
                }
            }
        }

        // Skilled total is the sum of both attendant counts, so a shared term would
        // double count every record it matches.
        let physician: HashSet<String> =
            self.keywords.physician.iter().map(|t| t.to_uppercase()).collect();
        if let Some(shared) = self
            .keywords
            .midwife_nurse
            .iter()
            .find(|t| physician.contains(&t.to_uppercase()))
        {
            return Err(StandardizerError::config(format!(
                "Attendant term '{shared}' is listed as both physician and midwife/nurse"
            )));
        }

        Ok(())
    }

    /// Convert to YAML for display or saving
    pub fn to_yaml(&self) -> StandardizerResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| StandardizerError::config(format!("Failed to serialize config: {e}")))
    }

    /// Create a fingerprint of the configuration, stamped onto reports
    pub fn fingerprint(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();

        // Order is semantically load-bearing for the taxonomy, so hash in declared order
        self.version.hash(&mut hasher);
        self.taxonomy.all_districts().hash(&mut hasher);
        for entry in &self.taxonomy.aliases {
            entry.alias.hash(&mut hasher);
            entry.district.hash(&mut hasher);
        }
        self.taxonomy.placeholders.hash(&mut hasher);

        self.keywords.weight_threshold_grams.hash(&mut hasher);
        for (category, terms) in self.keywords.categories() {
            category.hash(&mut hasher);
            terms.hash(&mut hasher);
        }

        self.columns.address.hash(&mut hasher);
        self.columns.month.hash(&mut hasher);
        self.columns.pii.hash(&mut hasher);

        format!("{:x}", hasher.finish())
    }
}

impl KeywordConfig {
    /// Category name and its terms, in report order
    pub fn categories(&self) -> [(&'static str, &[String]); 8] {
        [
            ("weight_above", self.weight_above.as_slice()),
            ("weight_below", self.weight_below.as_slice()),
            ("hospital", self.hospital.as_slice()),
            ("health_center", self.health_center.as_slice()),
            ("lying_in", self.lying_in.as_slice()),
            ("physician", self.physician.as_slice()),
            ("midwife_nurse", self.midwife_nurse.as_slice()),
            ("government", self.government.as_slice()),
        ]
    }
}

impl Default for StandardizerConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_placeholders() -> Vec<String> {
    ["NAN", "NONE", "NULL", "N/A", "#N/A", MISSING].iter().map(|s| s.to_string()).collect()
}

fn default_weight_threshold() -> u32 {
    2500
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: StandardizerConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self { config: StandardizerConfig::default() }
    }

    /// Replace the named district list, dropping numbered districts and aliases
    pub fn districts<I, S>(mut self, districts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.taxonomy.districts = districts.into_iter().map(Into::into).collect();
        self.config.taxonomy.numbered_districts = None;
        self.config.taxonomy.aliases.clear();
        self
    }

    /// Add a sub-district alias after the existing ones
    pub fn alias(mut self, alias: impl Into<String>, district: impl Into<String>) -> Self {
        self.config
            .taxonomy
            .aliases
            .push(AliasEntry { alias: alias.into(), district: district.into() });
        self
    }

    /// Build the final configuration
    pub fn build(self) -> StandardizerResult<StandardizerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = StandardizerConfig::default();
        config.validate().unwrap();

        let districts = config.taxonomy.all_districts();
        assert_eq!(districts.len(), 43 + 40);
        assert_eq!(districts[0], "AGUSAN");
        assert_eq!(districts[43], "BARANGAY 1");
        assert_eq!(districts.last().unwrap(), "BARANGAY 40");
    }

    #[test]
    fn test_default_attendant_terms_are_disjoint() {
        let keywords = StandardizerConfig::default().keywords;
        for md in &keywords.physician {
            for mw in &keywords.midwife_nurse {
                assert!(!mw.contains(md.as_str()), "{mw} contains {md}");
                assert!(!md.contains(mw.as_str()), "{md} contains {mw}");
            }
        }
    }

    #[test]
    fn test_yaml_round_trip_preserves_order() {
        let config = StandardizerConfig::default();
        let yaml = config.to_yaml().unwrap();
        let loaded = StandardizerConfig::load_from_str(&yaml).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.fingerprint(), config.fingerprint());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("records_standardizer.yaml");
        fs::write(
            &path,
            r#"
version: "1.0"
taxonomy:
  districts: [NORTH, SOUTH]
  aliases:
    - { alias: HILLTOP, district: NORTH }
keywords:
  weight_above: [GREATER]
  weight_below: [LESSER]
  hospital: [HOSP]
  health_center: [HC]
  lying_in: [LYING]
  physician: [MD]
  midwife_nurse: [MIDWIFE]
  government: [GOV]
"#,
        )
        .unwrap();

        let config = StandardizerConfig::load_from_file(&path).unwrap();
        assert_eq!(config.taxonomy.all_districts(), vec!["NORTH", "SOUTH"]);
        assert_eq!(config.keywords.weight_threshold_grams, 2500);
        assert!(config.taxonomy.placeholders.contains(&"NAN".to_string()));
        assert_eq!(config.columns, ColumnConfig::default());
    }

    #[test]
    fn test_rejects_bad_version() {
        let mut config = StandardizerConfig::default();
        config.version = "2.0".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_alias() {
        let result = ConfigBuilder::new()
            .districts(["NORTH"])
            .alias("HILL", "NORTH")
            .alias("HILL", "NORTH")
            .build();
        assert!(matches!(result, Err(StandardizerError::Configuration { .. })));
    }

    #[test]
    fn test_rejects_alias_to_unknown_district() {
        let result = ConfigBuilder::new().districts(["NORTH"]).alias("HILL", "SOUTH").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_shared_attendant_term() {
        let mut config = StandardizerConfig::default();
        config.keywords.midwife_nurse.push("md".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("both physician and midwife"));
    }

    #[test]
    fn test_alias_equal_to_district_is_accepted() {
        ConfigBuilder::new().districts(["NORTH", "SOUTH"]).alias("SOUTH", "NORTH").build().unwrap();
    }

    #[test]
    fn test_alias_district_lookup_ignores_case() {
        let config = ConfigBuilder::new().districts(["North", "South"]).alias("HILL", " NORTH ").build();
        assert!(config.is_ok());

        let result = ConfigBuilder::new().districts(["North", "NORTH"]).build();
        assert!(result.unwrap_err().to_string().contains("Duplicate district"));
    }

    #[test]
    fn test_weight_terms_follow_threshold() {
        let mut config = StandardizerConfig::default();
        config.keywords.weight_threshold_grams = 2000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'2500'"));

        config.keywords.weight_above = vec!["GREATER".into(), "2000".into()];
        config.keywords.weight_below = vec!["LESSER".into(), "2000".into(), "<".into()];
        config.validate().unwrap();
    }

    #[test]
    fn test_header_normalization() {
        let columns = ColumnConfig::default();
        assert_eq!(columns.normalize_header("  place of delivery "), "PLACE_OF_DELIVERY");
        assert_eq!(columns.normalize_header("Mother's Name"), "MOTHER_NAME");
        assert_eq!(columns.normalize_header("wgt. in grams"), "WGT. IN GRAMS");
        assert_eq!(columns.normalize_header("Address"), "ADDRESS");
    }

    #[test]
    fn test_fingerprint_tracks_alias_order() {
        let a = ConfigBuilder::new()
            .districts(["NORTH", "SOUTH"])
            .alias("HILL", "NORTH")
            .alias("RIVER", "SOUTH")
            .build()
            .unwrap();
        let b = ConfigBuilder::new()
            .districts(["NORTH", "SOUTH"])
            .alias("RIVER", "SOUTH")
            .alias("HILL", "NORTH")
            .build()
            .unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
