//! CSV dataset loader.

use crate::error::{DataError, Result};
use crate::record::{
    ADMINISTRATION_COSTS, CompanyFeatures, CompanyRecord, Dataset, MARKETING_SPEND,
    NUMBER_OF_EMPLOYEES, RD_SPEND, REGION, REQUIRED_COLUMNS, REVENUE,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{debug, info};

/// Load a company dataset from a CSV file.
///
/// # Errors
/// * [`DataError::NotFound`] if `path` does not resolve to a file
/// * [`DataError::Schema`] if any required column is missing
/// * [`DataError::InvalidRecord`] if a row breaks the record schema
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DataError::Io(e),
    })?;

    let dataset = read_dataset(file)?;
    info!(path = %path.display(), records = dataset.len(), "loaded dataset");
    Ok(dataset)
}

/// Read a company dataset from any CSV source with a header row.
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = ColumnIndex::locate(&headers)?;

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        records.push(columns.parse(&row)?);
    }

    Ok(Dataset::from_records(records))
}

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    marketing_spend: usize,
    rd_spend: usize,
    administration_costs: usize,
    employee_count: usize,
    region: usize,
    revenue: usize,
}

impl ColumnIndex {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| find(name).is_none())
            .map(|name| (*name).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataError::Schema { missing });
        }

        for extra in headers.iter().filter(|h| !REQUIRED_COLUMNS.contains(h)) {
            debug!(column = extra, "ignoring extra dataset column");
        }

        // Every lookup below succeeded in the check above.
        let index = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            marketing_spend: index(MARKETING_SPEND),
            rd_spend: index(RD_SPEND),
            administration_costs: index(ADMINISTRATION_COSTS),
            employee_count: index(NUMBER_OF_EMPLOYEES),
            region: index(REGION),
            revenue: index(REVENUE),
        })
    }

    fn parse(&self, row: &StringRecord) -> Result<CompanyRecord> {
        let line = row.position().map_or(0, |p| p.line());
        let field = FieldReader { row, line };

        let features = CompanyFeatures {
            marketing_spend: field.amount(self.marketing_spend, MARKETING_SPEND)?,
            rd_spend: field.amount(self.rd_spend, RD_SPEND)?,
            administration_costs: field.amount(self.administration_costs, ADMINISTRATION_COSTS)?,
            employee_count: field.count(self.employee_count, NUMBER_OF_EMPLOYEES)?,
            region: field.text(self.region, REGION)?.to_string(),
        };
        let revenue = field.number(self.revenue, REVENUE)?;

        Ok(CompanyRecord::new(features, revenue))
    }
}

/// Typed access to the fields of one CSV row.
struct FieldReader<'a> {
    row: &'a StringRecord,
    line: u64,
}

impl FieldReader<'_> {
    fn invalid(&self, column: &str, reason: impl Into<String>) -> DataError {
        DataError::InvalidRecord {
            line: self.line,
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    fn text(&self, index: usize, column: &str) -> Result<&str> {
        match self.row.get(index) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(self.invalid(column, "missing value")),
        }
    }

    fn number(&self, index: usize, column: &str) -> Result<f64> {
        let raw = self.text(index, column)?;
        let value: f64 = raw
            .parse()
            .map_err(|_| self.invalid(column, format!("not a number: '{}'", raw)))?;
        if !value.is_finite() {
            return Err(self.invalid(column, format!("non-finite value: '{}'", raw)));
        }
        Ok(value)
    }

    fn amount(&self, index: usize, column: &str) -> Result<f64> {
        let value = self.number(index, column)?;
        if value < 0.0 {
            return Err(self.invalid(column, format!("negative value: {}", value)));
        }
        Ok(value)
    }

    fn count(&self, index: usize, column: &str) -> Result<u32> {
        let value = self.amount(index, column)?;
        if value.fract() != 0.0 {
            return Err(self.invalid(column, format!("not a whole number: {}", value)));
        }
        if value > f64::from(u32::MAX) {
            return Err(self.invalid(column, format!("out of range: {}", value)));
        }
        Ok(value as u32)
    }
}
