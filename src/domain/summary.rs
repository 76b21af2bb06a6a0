//! Summary rows produced by the aggregation engine
//!
//! A SummaryRow is a pure derived aggregate: it keeps no reference to the
//! records it was computed from.

use serde::{Deserialize, Serialize};

/// What kind of value the summary is grouped by, used for the label column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupLabel {
    Month,
    Barangay,
    Field,
}

impl GroupLabel {
    /// Header of the first summary column
    pub fn header(self) -> &'static str {
        match self {
            Self::Month => "Month",
            Self::Barangay => "Barangay",
            Self::Field => "Group",
        }
    }
}

/// One summary row per distinct group value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub group: String,
    pub male: usize,
    pub female: usize,
    pub total: usize,

    pub weight_above: usize,
    pub weight_below: usize,

    pub hospital: usize,
    pub health_center: usize,
    pub lying_in: usize,
    /// Records matching at least one facility category
    pub total_facility: usize,
    pub home_other: usize,
    pub facility_rate: f64,

    pub physician: usize,
    pub midwife_nurse: usize,
    pub total_skilled: usize,
    pub non_skilled: usize,
    pub skilled_rate: f64,

    pub age_10_14: usize,
    pub age_15_19: usize,
    pub age_20_24: usize,
    pub age_25_plus: usize,
    pub teenage_rate: f64,

    pub government: usize,
    pub private: usize,
}

/// A typed cell for tabular output
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Count(usize),
    /// A proportion in `[0, 1]`
    Ratio(f64),
}

impl SummaryRow {
    /// Cells in the fixed report column order (see [`SummaryTable::headers`])
    pub fn cells(&self) -> Vec<Cell> {
        use Cell::{Count, Ratio};
        vec![
            Cell::Text(self.group.clone()),
            Count(self.male),
            Count(self.female),
            Count(self.total),
            Count(self.weight_above),
            Count(self.weight_below),
            Count(self.total),
            Count(self.hospital),
            Count(self.health_center),
            Count(self.lying_in),
            Count(self.total_facility),
            Count(self.home_other),
            Count(self.total),
            Ratio(self.facility_rate),
            Count(self.physician),
            Count(self.midwife_nurse),
            Count(self.total_skilled),
            Count(self.non_skilled),
            Count(self.total),
            Ratio(self.skilled_rate),
            Count(self.age_10_14),
            Count(self.age_15_19),
            Count(self.age_20_24),
            Count(self.age_25_plus),
            Count(self.total),
            Ratio(self.teenage_rate),
            Count(self.government),
            Count(self.private),
            Count(self.total),
        ]
    }
}

/// An ordered summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub label: GroupLabel,
    /// Birth weight threshold in grams, shown in the weight headers
    pub weight_threshold_grams: u32,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Create an empty table
    pub fn empty(label: GroupLabel, weight_threshold_grams: u32) -> Self {
        Self { label, weight_threshold_grams, rows: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Find the row for a group value
    pub fn row(&self, group: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.group == group)
    }

    /// Group values in table order
    pub fn groups(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.group.as_str()).collect()
    }

    /// Column headers in report order
    pub fn headers(&self) -> Vec<String> {
        let t = self.weight_threshold_grams;
        let weight_above = format!(">{t}g");
        let weight_below = format!("<{t}g");
        let columns: [&str; 28] = [
            "Male",
            "Female",
            "Total Count",
            &weight_above,
            &weight_below,
            "Total W",
            "Hospital",
            "Health Center",
            "Lying-In",
            "Total Facility",
            "Home/Other",
            "Total P",
            "% FBD",
            "MD/Physician",
            "Midwife/Nurse",
            "Total Skilled",
            "Non-Skilled",
            "Total A",
            "% SBA",
            "10-14Y",
            "15-19Y",
            "20-24Y",
            "25+Y",
            "Total Age",
            "% Teenage",
            "Govt",
            "Private",
            "Total G",
        ];
        std::iter::once(self.label.header())
            .chain(columns)
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_align_with_cells() {
        let table = SummaryTable {
            label: GroupLabel::Month,
            weight_threshold_grams: 2500,
            rows: vec![SummaryRow { group: "JANUARY".into(), total: 3, ..Default::default() }],
        };

        let headers = table.headers();
        assert_eq!(headers.len(), table.rows[0].cells().len());
        assert_eq!(headers[0], "Month");
        assert_eq!(headers[4], ">2500g");
        assert_eq!(headers[5], "<2500g");
        assert_eq!(headers[13], "% FBD");
        assert_eq!(headers[28], "Total G");
    }

    #[test]
    fn test_total_columns_repeat_total() {
        let row = SummaryRow { group: "GUSA".into(), total: 7, ..Default::default() };
        let cells = row.cells();
        for idx in [3, 6, 12, 18, 24, 28] {
            assert_eq!(cells[idx], Cell::Count(7), "column {idx}");
        }
    }

    #[test]
    fn test_table_lookup() {
        let table = SummaryTable {
            label: GroupLabel::Barangay,
            weight_threshold_grams: 2500,
            rows: vec![
                SummaryRow { group: "BULUA".into(), ..Default::default() },
                SummaryRow { group: "GUSA".into(), ..Default::default() },
            ],
        };
        assert_eq!(table.groups(), vec!["BULUA", "GUSA"]);
        assert!(table.row("GUSA").is_some());
        assert!(table.row("LAPASAN").is_none());
        assert_eq!(table.headers()[0], "Barangay");
    }
}
