//! CSV ingestion and cleaning
//!
//! Loading is strict about the four critical metric columns and lenient about
//! everything else: other configured columns only produce a warning, numeric
//! cells that do not parse become zero, and rows without spend are dropped.

use adsage_utils::error::DataError;
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::record::{AdRecord, Dataset};

/// Columns without which no analysis is possible.
pub const CRITICAL_COLUMNS: [&str; 4] = ["spend", "revenue", "roas", "ctr"];

/// Loads ads exports, checking them against the configured column list.
#[derive(Debug, Clone)]
pub struct DataLoader {
    required_columns: Vec<String>,
}

impl DataLoader {
    #[must_use]
    pub fn new<S: Into<String>>(required_columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            required_columns: required_columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Load and clean the CSV file at `path`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the file does not exist, `Csv` when it cannot be read,
    /// and `MissingRequiredData` when a critical column is absent.
    pub fn load(&self, path: &Path) -> Result<Dataset, DataError> {
        info!(path = %path.display(), "Loading data");

        if !path.exists() {
            return Err(DataError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let file = std::fs::File::open(path).map_err(|e| DataError::Csv(e.to_string()))?;
        self.load_from_reader(file)
    }

    /// Load and clean CSV text from any reader.
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<Dataset, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| DataError::Csv(e.to_string()))?
            .clone();
        let columns: Vec<String> = headers.iter().map(str::to_string).collect();

        self.check_columns(&columns)?;

        let index = ColumnIndex::new(&headers);
        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row.map_err(|e| DataError::Csv(e.to_string()))?;
            records.push(index.to_record(&row));
        }
        info!(rows = records.len(), columns = columns.len(), "Loaded CSV");

        let total = records.len();
        records.retain(|r| r.spend > 0.0);
        let removed = total - records.len();
        if removed > 0 {
            info!(removed, "Removed rows with zero spend");
        }

        Ok(Dataset::new(columns, records))
    }

    fn check_columns(&self, columns: &[String]) -> Result<(), DataError> {
        let present = |name: &str| columns.iter().any(|c| c == name);

        let missing: Vec<&str> = self
            .required_columns
            .iter()
            .map(String::as_str)
            .filter(|name| !present(name))
            .collect();
        if !missing.is_empty() {
            warn!(missing = ?missing, "Dataset is missing configured columns");
        }

        let missing_critical: Vec<String> = CRITICAL_COLUMNS
            .iter()
            .filter(|name| !present(name))
            .map(|name| (*name).to_string())
            .collect();
        if !missing_critical.is_empty() {
            return Err(DataError::MissingRequiredData {
                columns: missing_critical,
            });
        }

        debug!("Column validation passed");
        Ok(())
    }
}

/// Header name to position lookup for one file.
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn new(headers: &StringRecord) -> Self {
        let mut positions = HashMap::new();
        for (pos, name) in headers.iter().enumerate() {
            positions.entry(name.to_string()).or_insert(pos);
        }
        Self { positions }
    }

    fn text<'r>(&self, row: &'r StringRecord, name: &str) -> &'r str {
        self.positions
            .get(name)
            .and_then(|&pos| row.get(pos))
            .map_or("", str::trim)
    }

    fn number(&self, row: &StringRecord, name: &str) -> f64 {
        parse_number(self.text(row, name))
    }

    fn to_record(&self, row: &StringRecord) -> AdRecord {
        AdRecord {
            date: parse_date(self.text(row, "date")),
            campaign_name: self.text(row, "campaign_name").to_string(),
            adset_name: self.text(row, "adset_name").to_string(),
            spend: self.number(row, "spend"),
            impressions: self.number(row, "impressions"),
            clicks: self.number(row, "clicks"),
            ctr: self.number(row, "ctr"),
            purchases: self.number(row, "purchases"),
            revenue: self.number(row, "revenue"),
            roas: self.number(row, "roas"),
            creative_type: self.text(row, "creative_type").to_string(),
            creative_message: self.text(row, "creative_message").to_string(),
            audience_type: self.text(row, "audience_type").to_string(),
            platform: self.text(row, "platform").to_string(),
            country: self.text(row, "country").to_string(),
        }
    }
}

fn parse_number(raw: &str) -> f64 {
    raw.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
