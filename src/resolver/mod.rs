//! Address resolution against the barangay taxonomy
//!
//! Architecture: Domain Service - AddressResolver maps noisy address text to one canonical label
//! - Aliases are scanned before districts, each in declared order; first match wins
//! - Matching is whole-word and exact, never fuzzy
//! - Resolution is a pure function of its inputs and the compiled taxonomy

use crate::config::TaxonomyConfig;
use crate::domain::{ResolvedAddress, StandardizerResult};
use crate::patterns::WordPattern;

/// Compiled, immutable view of the taxonomy used for resolution
#[derive(Debug, Clone)]
pub struct AddressResolver {
    /// (alias pattern, owning district) in declared order
    aliases: Vec<(WordPattern, String)>,
    /// District patterns in declared order
    districts: Vec<WordPattern>,
    /// Uppercased tokens that stand for an absent value
    placeholders: Vec<String>,
}

impl AddressResolver {
    /// Compile the taxonomy into ordered matchers
    pub fn new(taxonomy: &TaxonomyConfig) -> StandardizerResult<Self> {
        let aliases = taxonomy
            .aliases
            .iter()
            .map(|entry| {
                Ok((WordPattern::new(&entry.alias)?, entry.district.trim().to_uppercase()))
            })
            .collect::<StandardizerResult<Vec<_>>>()?;

        let districts = taxonomy
            .all_districts()
            .iter()
            .map(|d| WordPattern::new(d))
            .collect::<StandardizerResult<Vec<_>>>()?;

        tracing::debug!(
            "Address resolver compiled with {} aliases and {} districts",
            aliases.len(),
            districts.len()
        );

        Ok(Self {
            aliases,
            districts,
            placeholders: taxonomy.placeholders.iter().map(|p| p.trim().to_uppercase()).collect(),
        })
    }

    /// Resolve an address / specific-address pair to a district or sentinel
    pub fn resolve(&self, address: &str, specific_address: &str) -> ResolvedAddress {
        let search_text = self.search_text(address, specific_address);
        if search_text.is_empty() {
            return ResolvedAddress::Missing;
        }

        if let Some((_, district)) = self.aliases.iter().find(|(alias, _)| alias.is_match(&search_text)) {
            return ResolvedAddress::District(district.clone());
        }

        self.districts
            .iter()
            .find(|district| district.is_match(&search_text))
            .map(|district| ResolvedAddress::District(district.word().to_string()))
            .unwrap_or(ResolvedAddress::Transient)
    }

    /// Normalized, space-joined text that resolution scans
    pub fn search_text(&self, address: &str, specific_address: &str) -> String {
        let address = self.normalize(address);
        let specific = self.normalize(specific_address);
        format!("{address} {specific}").trim().to_string()
    }

    /// District names in scan order
    pub fn districts(&self) -> impl Iterator<Item = &str> {
        self.districts.iter().map(WordPattern::word)
    }

    /// (alias, district) pairs in scan order
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(alias, district)| (alias.word(), district.as_str()))
    }

    fn normalize(&self, text: &str) -> String {
        let upper = text.trim().to_uppercase();
        if self.placeholders.iter().any(|p| *p == upper) {
            String::new()
        } else {
            upper
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigBuilder, StandardizerConfig};
    use rstest::rstest;

    fn default_resolver() -> AddressResolver {
        AddressResolver::new(&StandardizerConfig::default().taxonomy).unwrap()
    }

    fn district(name: &str) -> ResolvedAddress {
        ResolvedAddress::District(name.to_string())
    }

    #[rstest]
    #[case("CALAANAN", "", "CANITOAN")]
    #[case("PASIL", "", "KAUSWAGAN")]
    #[case("AGORA", "", "LAPASAN")]
    #[case("MACANHAN", "", "CARMEN")]
    #[case("ORO HABITAT", "", "CANITOAN")]
    #[case("", "purok 2 oro habitat", "CANITOAN")]
    fn test_alias_resolves_to_owner(
        #[case] address: &str,
        #[case] specific: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(default_resolver().resolve(address, specific), district(expected));
    }

    #[test]
    fn test_every_alias_resolves_to_its_owner() {
        let resolver = default_resolver();
        let pairs: Vec<(String, String)> =
            resolver.aliases().map(|(a, d)| (a.to_string(), d.to_string())).collect();
        for (alias, owner) in pairs {
            assert_eq!(resolver.resolve(&alias, ""), district(&owner), "alias {alias}");
        }
    }

    #[test]
    fn test_every_district_resolves_to_itself() {
        let resolver = default_resolver();
        let names: Vec<String> = resolver.districts().map(str::to_string).collect();
        for name in names {
            assert_eq!(resolver.resolve(&format!("ZONE 4 {name}"), ""), district(&name));
        }
    }

    #[rstest]
    #[case("bulua", "", "BULUA")]
    #[case("  Gusa ", "Purok 7", "GUSA")]
    #[case("", "lapasan zone 1", "LAPASAN")]
    #[case("BARANGAY 10", "", "BARANGAY 10")]
    #[case("BARANGAY 1", "", "BARANGAY 1")]
    #[case("Brgy Camaman-an", "", "CAMAMAN-AN")]
    fn test_district_resolution(
        #[case] address: &str,
        #[case] specific: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(default_resolver().resolve(address, specific), district(expected));
    }

    #[rstest]
    #[case("", "")]
    #[case("   ", "")]
    #[case("nan", "None")]
    #[case("NULL", "")]
    #[case("MISSING", "")]
    fn test_empty_text_is_missing(#[case] address: &str, #[case] specific: &str) {
        assert_eq!(default_resolver().resolve(address, specific), ResolvedAddress::Missing);
    }

    #[rstest]
    #[case("MANILA", "")]
    #[case("GUSAWAN", "")]
    #[case("BULUAA", "")]
    #[case("TRANSIENT", "")]
    #[case("KAUSWAGN", "")]
    fn test_unmatched_text_is_transient(#[case] address: &str, #[case] specific: &str) {
        assert_eq!(default_resolver().resolve(address, specific), ResolvedAddress::Transient);
    }

    #[test]
    fn test_placeholder_only_replaces_whole_field() {
        let resolver = default_resolver();
        assert_eq!(resolver.search_text("nan", "GUSA"), "GUSA");
        assert_eq!(resolver.resolve("NANA", ""), ResolvedAddress::Transient);
    }

    #[test]
    fn test_alias_takes_priority_over_district() {
        // "PASIL" is inside Kauswagan but the text also names Bulua
        assert_eq!(default_resolver().resolve("BULUA", "PASIL"), district("KAUSWAGAN"));
    }

    #[test]
    fn test_first_district_in_declared_order_wins() {
        let resolver = default_resolver();
        assert_eq!(resolver.resolve("LAPASAN", "GUSA"), district("GUSA"));
        assert_eq!(resolver.resolve("GUSA", "LAPASAN"), district("GUSA"));
    }

    #[test]
    fn test_alternate_taxonomy() {
        let config = ConfigBuilder::new()
            .districts(["NORTH", "SOUTH"])
            .alias("HILLTOP", "SOUTH")
            .build()
            .unwrap();
        let resolver = AddressResolver::new(&config.taxonomy).unwrap();

        assert_eq!(resolver.resolve("north", ""), district("NORTH"));
        assert_eq!(resolver.resolve("hilltop north", ""), district("SOUTH"));
        assert_eq!(resolver.resolve("GUSA", ""), ResolvedAddress::Transient);
    }

    #[test]
    fn test_resolution_is_stable_on_resolved_values() {
        let resolver = default_resolver();
        for raw in ["AGORA", "BULUA", "MANILA", ""] {
            let first = resolver.resolve(raw, "");
            let second = resolver.resolve(first.as_str(), "");
            assert_eq!(first, second, "raw {raw:?}");
        }
    }
}
