//! Grouped aggregation of cleaned birth records into summary tables
//!
//! Architecture: Domain Service - Aggregator derives public-health statistics per group
//! - Each free-text field is tested against an explicit keyword category
//! - Categories are deliberately non-exclusive; see the per-field notes below
//! - Groups are ordered chronologically for months and lexicographically otherwise

use crate::config::{ColumnConfig, KeywordConfig, StandardizerConfig};
use crate::domain::{GroupLabel, Record, RecordSet, SummaryRow, SummaryTable, MISSING};
use crate::patterns::KeywordSet;
use std::collections::HashMap;

/// Month names in calendar order, used to sort month groups
pub const MONTHS: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

/// Placeholders plus the empty value and the missing sentinel
fn excluded_groups(placeholders: &[String]) -> Vec<String> {
    let mut excluded = vec![String::new(), MISSING.to_string()];
    for placeholder in placeholders {
        let upper = placeholder.trim().to_uppercase();
        if !excluded.contains(&upper) {
            excluded.push(upper);
        }
    }
    excluded
}

/// Which field a summary is grouped by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupBy {
    /// The month column, ordered chronologically
    Month,
    /// The resolved address column
    District,
    /// Any other column, ordered lexicographically
    Field(String),
}

impl GroupBy {
    /// Column name this selector reads
    pub fn column<'a>(&'a self, columns: &'a ColumnConfig) -> &'a str {
        match self {
            Self::Month => &columns.month,
            Self::District => &columns.address,
            Self::Field(name) => name,
        }
    }

    /// Label for the first summary column
    pub fn label(&self) -> GroupLabel {
        match self {
            Self::Month => GroupLabel::Month,
            Self::District => GroupLabel::Barangay,
            Self::Field(_) => GroupLabel::Field,
        }
    }
}

/// Position of a month label in the calendar, or `None` when unrecognized
pub fn month_index(label: &str) -> Option<usize> {
    let upper = label.trim().to_uppercase();
    MONTHS.iter().position(|m| *m == upper)
}

/// Proportion with the convention that an empty denominator yields 0
pub fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Maternal age bands; the last band is open-ended upward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBand {
    TenToFourteen,
    FifteenToNineteen,
    TwentyToTwentyFour,
    TwentyFiveAndOver,
}

impl AgeBand {
    /// Band for a free-text age; unparseable or out-of-band ages yield `None`
    pub fn classify(raw: &str) -> Option<Self> {
        let age: f64 = raw.trim().parse().ok().filter(|a: &f64| a.is_finite())?;
        if (10.0..=14.0).contains(&age) {
            Some(Self::TenToFourteen)
        } else if (15.0..=19.0).contains(&age) {
            Some(Self::FifteenToNineteen)
        } else if (20.0..=24.0).contains(&age) {
            Some(Self::TwentyToTwentyFour)
        } else if age >= 25.0 {
            Some(Self::TwentyFiveAndOver)
        } else {
            None
        }
    }
}

/// Keyword categories compiled from configuration
#[derive(Debug, Clone)]
struct Categories {
    weight_above: KeywordSet,
    weight_below: KeywordSet,
    hospital: KeywordSet,
    health_center: KeywordSet,
    lying_in: KeywordSet,
    physician: KeywordSet,
    midwife_nurse: KeywordSet,
    government: KeywordSet,
}

impl Categories {
    fn new(keywords: &KeywordConfig) -> Self {
        let categories = Self {
            weight_above: KeywordSet::new("weight_above", &keywords.weight_above),
            weight_below: KeywordSet::new("weight_below", &keywords.weight_below),
            hospital: KeywordSet::new("hospital", &keywords.hospital),
            health_center: KeywordSet::new("health_center", &keywords.health_center),
            lying_in: KeywordSet::new("lying_in", &keywords.lying_in),
            physician: KeywordSet::new("physician", &keywords.physician),
            midwife_nurse: KeywordSet::new("midwife_nurse", &keywords.midwife_nurse),
            government: KeywordSet::new("government", &keywords.government),
        };
        for set in categories.all() {
            tracing::debug!("Keyword category {}: {}", set.name(), set.terms().join(", "));
        }
        categories
    }

    fn all(&self) -> [&KeywordSet; 8] {
        [
            &self.weight_above,
            &self.weight_below,
            &self.hospital,
            &self.health_center,
            &self.lying_in,
            &self.physician,
            &self.midwife_nurse,
            &self.government,
        ]
    }

    fn is_facility(&self, place: &str) -> bool {
        self.hospital.matches(place)
            || self.health_center.matches(place)
            || self.lying_in.matches(place)
    }
}

/// Aggregation engine producing one summary row per group
#[derive(Debug, Clone)]
pub struct Aggregator {
    columns: ColumnConfig,
    categories: Categories,
    weight_threshold_grams: u32,
    /// Uppercased group values never emitted as summary rows
    excluded: Vec<String>,
}

impl Aggregator {
    /// Build an aggregator from configuration
    pub fn new(config: &StandardizerConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            categories: Categories::new(&config.keywords),
            weight_threshold_grams: config.keywords.weight_threshold_grams,
            excluded: excluded_groups(&config.taxonomy.placeholders),
        }
    }

    fn is_excluded(&self, value: &str) -> bool {
        let upper = value.trim().to_uppercase();
        self.excluded.iter().any(|x| *x == upper)
    }

    /// Summarize `records` grouped by `group_by`.
    ///
    /// A grouping column absent from the record set yields an empty table, so
    /// other summaries over the same records can still be produced.
    pub fn summarize(&self, records: &RecordSet, group_by: &GroupBy) -> SummaryTable {
        let column = group_by.column(&self.columns);
        let mut table = SummaryTable::empty(group_by.label(), self.weight_threshold_grams);

        if !records.has_column(column) {
            tracing::warn!(
                "Column '{}' not found; {} summary is empty",
                column,
                group_by.label().header()
            );
            return table;
        }

        let mut groups: HashMap<&str, Vec<&Record>> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for record in &records.records {
            let value = record.get(column).trim();
            if self.is_excluded(value) {
                continue;
            }
            groups
                .entry(value)
                .or_insert_with(|| {
                    order.push(value);
                    Vec::new()
                })
                .push(record);
        }

        match group_by {
            GroupBy::Month => order.sort_by_key(|g| month_index(g).unwrap_or(MONTHS.len())),
            _ => order.sort_unstable(),
        }

        for group in order {
            let subset = &groups[group];
            if subset.is_empty() {
                continue;
            }
            table.rows.push(self.summarize_group(group, subset));
        }

        tracing::info!(
            "{} summary: {} groups from {} records",
            group_by.label().header(),
            table.len(),
            records.len()
        );
        table
    }

    /// Compute every statistic for one group's records
    pub fn summarize_group(&self, group: &str, subset: &[&Record]) -> SummaryRow {
        let cols = &self.columns;
        let cats = &self.categories;
        let total = subset.len();
        let count = |pred: &dyn Fn(&Record) -> bool| subset.iter().filter(|&&r| pred(r)).count();

        // Sex: leading letter; blanks and other codes count toward neither
        let male = count(&|r| sex_initial(r.get(&cols.sex)) == Some('M'));
        let female = count(&|r| sex_initial(r.get(&cols.sex)) == Some('F'));

        // Weight: a descriptor may trigger both sides when it carries the threshold value
        let weight_above = count(&|r| cats.weight_above.matches(r.get(&cols.weight)));
        let weight_below = count(&|r| cats.weight_below.matches(r.get(&cols.weight)));

        // Facility: the total is its own inclusive pass, not the sum of the three
        let place = &cols.place_of_delivery;
        let hospital = count(&|r| cats.hospital.matches(r.get(place)));
        let health_center = count(&|r| cats.health_center.matches(r.get(place)));
        let lying_in = count(&|r| cats.lying_in.matches(r.get(place)));
        let total_facility = count(&|r| cats.is_facility(r.get(place)));

        // Attendant: the two term lists are disjoint, so skilled is their sum
        let physician = count(&|r| cats.physician.matches(r.get(&cols.attendant)));
        let midwife_nurse = count(&|r| cats.midwife_nurse.matches(r.get(&cols.attendant)));
        let total_skilled = physician + midwife_nurse;

        let band = |b: AgeBand| count(&|r| AgeBand::classify(r.get(&cols.age)) == Some(b));
        let age_10_14 = band(AgeBand::TenToFourteen);
        let age_15_19 = band(AgeBand::FifteenToNineteen);
        let age_20_24 = band(AgeBand::TwentyToTwentyFour);
        let age_25_plus = band(AgeBand::TwentyFiveAndOver);

        // Private is everything not matched as government
        let government = count(&|r| cats.government.matches(r.get(&cols.sector)));

        SummaryRow {
            group: group.to_string(),
            male,
            female,
            total,
            weight_above,
            weight_below,
            hospital,
            health_center,
            lying_in,
            total_facility,
            home_other: total - total_facility,
            facility_rate: ratio(total_facility, total),
            physician,
            midwife_nurse,
            total_skilled,
            non_skilled: total.saturating_sub(total_skilled),
            skilled_rate: ratio(total_skilled, total),
            age_10_14,
            age_15_19,
            age_20_24,
            age_25_plus,
            teenage_rate: ratio(age_10_14 + age_15_19, total),
            government,
            private: total - government,
        }
    }
}

fn sex_initial(raw: &str) -> Option<char> {
    raw.trim_start().chars().next().map(|c| c.to_ascii_uppercase())
}
