//! Tests for error types

use seedstat::config::PipelineConfig;
use seedstat::significance::StatsError;
use seedstat::{Error, JobError};

#[test]
fn test_config_error() {
    let error = Error::Config("metric list is empty".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid configuration"));
    assert!(error_str.contains("metric list is empty"));
}

#[test]
fn test_log_dir_not_found_error() {
    let error = Error::LogDirNotFound("/no/such/dir".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Log directory not found"));
    assert!(error_str.contains("--log-dir"));
}

#[test]
fn test_storage_error() {
    let error = Error::StorageError("file not found".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Storage error"));
    assert!(error_str.contains("file not found"));
}

#[test]
fn test_invalid_input_error() {
    let error = Error::InvalidInput("k must be greater than 0".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid input"));
    assert!(error_str.contains("k must be greater than 0"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<PipelineConfig>("{ not json").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").starts_with("JSON error"));
}

#[test]
fn test_job_error_labels() {
    assert_eq!(JobError::NoResultBlock.label(), "no_result_block");
    assert_eq!(JobError::MissingTestSection.label(), "missing_test_section");
    assert_eq!(
        JobError::MissingMetric("ndcg@20".to_string()).label(),
        "missing_metric"
    );
    assert_eq!(
        JobError::InvalidNumber {
            metric: "recall@10".to_string(),
            raw: "0.1.2".to_string()
        }
        .label(),
        "invalid_number"
    );
    assert_eq!(JobError::Unreadable("denied".to_string()).label(), "unreadable");
}

#[test]
fn test_job_error_display() {
    let error = JobError::MissingMetric("ndcg@20".to_string());
    assert_eq!(format!("{error}"), "metric `ndcg@20` missing from test section");
}

#[test]
fn test_stats_error_markers() {
    assert_eq!(
        StatsError::ZeroBaselineMean.to_string(),
        "undefined (zero baseline mean)"
    );
    assert_eq!(
        StatsError::InsufficientData {
            baseline: 1,
            challenger: 3
        }
        .to_string(),
        "insufficient data"
    );
    assert_eq!(StatsError::ZeroVariance.to_string(), "undefined (zero variance)");
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> seedstat::Result<i32> {
        Err(Error::InvalidInput("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
