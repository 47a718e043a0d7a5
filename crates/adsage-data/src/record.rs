use chrono::NaiveDate;
use serde::Serialize;

/// One cleaned row of an ads performance export.
///
/// Text columns absent from the source file are empty strings; numeric columns
/// absent or unparseable are `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdRecord {
    pub date: Option<NaiveDate>,
    pub campaign_name: String,
    pub adset_name: String,
    pub spend: f64,
    pub impressions: f64,
    pub clicks: f64,
    /// Click-through rate as a fraction.
    pub ctr: f64,
    pub purchases: f64,
    pub revenue: f64,
    pub roas: f64,
    pub creative_type: String,
    pub creative_message: String,
    pub audience_type: String,
    pub platform: String,
    pub country: String,
}

/// Cleaned dataset plus the column names the source carried.
///
/// Column presence is kept separately from the rows so the pipeline can check
/// its precondition on what the export actually contained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<AdRecord>,
}

impl Dataset {
    #[must_use]
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>, records: Vec<AdRecord>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            records,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn records(&self) -> &[AdRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Names from `expected` that the dataset does not carry, in the given order.
    #[must_use]
    pub fn missing_columns<'a, I>(&self, expected: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        expected
            .into_iter()
            .filter(|name| !self.has_column(name))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_preserves_order() {
        let dataset = Dataset::new(["spend", "ctr"], Vec::new());
        assert_eq!(
            dataset.missing_columns(["spend", "revenue", "roas", "ctr"]),
            ["revenue", "roas"]
        );
        assert!(dataset.is_empty());
    }
}
