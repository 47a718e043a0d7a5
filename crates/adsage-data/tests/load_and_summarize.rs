//! Loading a CSV export from disk through to the summary and creative segments.

use adsage_config::{DEFAULT_REQUIRED_COLUMNS, Thresholds};
use adsage_data::{
    DataError, DataLoader, ensure_critical_columns, low_ctr_campaigns, successful_patterns,
    summarize,
};
use std::io::Write;
use tempfile::NamedTempFile;

const EXPORT: &str = "\
date,campaign_name,adset_name,spend,impressions,clicks,ctr,purchases,revenue,roas,creative_type,creative_message,audience_type,platform,country
2025-03-01,Summer Sale,Prospecting,140,9000,81,0.009,6,294,2.1,Image,Beat the heat with summer savings,Broad,Facebook,US
2025-03-01,Winter Promo,Retargeting,165,9500,266,0.028,16,759,4.6,Video,Stay warm with exclusive winter deals,Lookalike,Instagram,US
2025-03-09,Summer Sale,Prospecting,150,9100,73,0.008,5,270,1.8,Image,Beat the heat with summer savings,Broad,Facebook,US
2025-03-09,Winter Promo,Retargeting,170,9600,278,0.029,17,799,4.7,Video,Stay warm with exclusive winter deals,Lookalike,Instagram,US
2025-03-10,Paused Test,Test,0,0,0,0,0,0,0,Image,Paused,Broad,Facebook,US
";

fn write_export(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_export_loads_and_summarizes() {
    let file = write_export(EXPORT);
    let dataset = DataLoader::new(DEFAULT_REQUIRED_COLUMNS)
        .load(file.path())
        .unwrap();

    assert_eq!(dataset.len(), 4, "zero-spend row is dropped");
    assert!(ensure_critical_columns(&dataset).is_ok());

    let thresholds = Thresholds::default();
    let summary = summarize(&dataset, &thresholds).unwrap();
    assert_eq!(summary.overview.unique_campaigns, 2);
    assert_eq!(summary.overview.date_range.unwrap().days, 8);
    assert_eq!(summary.performance_metrics.total_spend, 625.0);
    assert_eq!(summary.underperformers.count_low_ctr, 2);
    assert_eq!(summary.underperformers.count_low_roas, 2);

    let time = summary.time_analysis.as_ref().unwrap();
    assert_eq!(time.recent_week.total_spend, 320.0);
    assert_eq!(time.previous_week.total_spend, 305.0);

    let targets = low_ctr_campaigns(&dataset, &thresholds);
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].campaign_name, "Summer Sale");
    assert_eq!(targets[0].spend, 290.0);

    let patterns = successful_patterns(&dataset, &thresholds).unwrap();
    assert_eq!(patterns.best_creative_types[0].name, "Video");
    assert!(patterns.top_themes.contains(&"winter".to_string()));

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["overview"]["date_range"]["start"], "2025-03-01");
}

#[test]
fn test_export_without_roas_is_rejected() {
    let without_roas = "date,campaign_name,spend,revenue,ctr\n2025-03-01,Summer Sale,140,294,0.009\n";
    let file = write_export(without_roas);

    let err = DataLoader::new(DEFAULT_REQUIRED_COLUMNS)
        .load(file.path())
        .unwrap_err();
    match err {
        DataError::MissingRequiredData { columns } => assert_eq!(columns, ["roas"]),
        other => panic!("expected MissingRequiredData, got {other:?}"),
    }
}
