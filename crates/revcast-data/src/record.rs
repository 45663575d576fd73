//! Company records and the in-memory dataset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column holding marketing spend.
pub const MARKETING_SPEND: &str = "Marketing_Spend";
/// Column holding R&D spend.
pub const RD_SPEND: &str = "R&D_Spend";
/// Column holding administration costs.
pub const ADMINISTRATION_COSTS: &str = "Administration_Costs";
/// Column holding the employee head-count.
pub const NUMBER_OF_EMPLOYEES: &str = "Number_of_Employees";
/// Column holding the region label.
pub const REGION: &str = "Region";
/// Column holding annual revenue (the target).
pub const REVENUE: &str = "Revenue";

/// Numeric feature columns, in the order they enter the feature vector.
pub const NUMERIC_COLUMNS: [&str; 4] = [
    MARKETING_SPEND,
    RD_SPEND,
    ADMINISTRATION_COSTS,
    NUMBER_OF_EMPLOYEES,
];

/// Every column a dataset file must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    MARKETING_SPEND,
    RD_SPEND,
    ADMINISTRATION_COSTS,
    NUMBER_OF_EMPLOYEES,
    REGION,
    REVENUE,
];

/// The five raw inputs describing one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFeatures {
    /// Marketing spend
    pub marketing_spend: f64,

    /// R&D spend
    pub rd_spend: f64,

    /// Administration costs
    pub administration_costs: f64,

    /// Number of employees
    pub employee_count: u32,

    /// Region label, kept verbatim
    pub region: String,
}

impl CompanyFeatures {
    /// Create a new feature set.
    pub fn new(
        marketing_spend: f64,
        rd_spend: f64,
        administration_costs: f64,
        employee_count: u32,
        region: impl Into<String>,
    ) -> Self {
        Self {
            marketing_spend,
            rd_spend,
            administration_costs,
            employee_count,
            region: region.into(),
        }
    }

    /// Numeric features in [`NUMERIC_COLUMNS`] order.
    pub fn numeric_values(&self) -> [f64; 4] {
        [
            self.marketing_spend,
            self.rd_spend,
            self.administration_costs,
            f64::from(self.employee_count),
        ]
    }
}

/// One training observation: features plus the revenue target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Input features
    pub features: CompanyFeatures,

    /// Annual revenue
    pub revenue: f64,
}

impl CompanyRecord {
    /// Create a new record.
    pub const fn new(features: CompanyFeatures, revenue: f64) -> Self {
        Self { features, revenue }
    }
}

/// Ordered collection of company records sharing one schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<CompanyRecord>,
}

impl Dataset {
    /// Build a dataset from records that were validated elsewhere.
    pub const fn from_records(records: Vec<CompanyRecord>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in file order.
    pub fn records(&self) -> &[CompanyRecord] {
        &self.records
    }

    /// Iterate over the feature part of every record.
    pub fn features(&self) -> impl Iterator<Item = &CompanyFeatures> {
        self.records.iter().map(|r| &r.features)
    }

    /// Revenue targets in file order.
    pub fn revenues(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.revenue).collect()
    }

    /// Mean revenue, or 0.0 for an empty dataset.
    pub fn mean_revenue(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.records.iter().map(|r| r.revenue).sum::<f64>() / self.records.len() as f64
    }

    /// Smallest and largest revenue, or `None` for an empty dataset.
    pub fn revenue_range(&self) -> Option<(f64, f64)> {
        self.records.iter().map(|r| r.revenue).fold(None, |acc, v| {
            Some(acc.map_or((v, v), |(lo, hi): (f64, f64)| (lo.min(v), hi.max(v))))
        })
    }

    /// Number of records per region label.
    pub fn region_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.features.region.clone()).or_insert(0) += 1;
        }
        counts
    }
}
