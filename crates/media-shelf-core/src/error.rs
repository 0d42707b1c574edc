use media_shelf_config::ConfigError;
use media_shelf_models::Record;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("invalid metrics configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A fault in a single record. Never aborts a batch: the record is left out
/// of the operation that hit the fault and reported back as a `SkippedRecord`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordFault {
    #[error("record has no title")]
    MissingTitle,

    #[error("malformed {field}: {value}")]
    MalformedField { field: &'static str, value: String },
}

/// A record left out of a result, with the reason shown to the user.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkippedRecord {
    pub title: String,
    pub file_path: String,
    pub reason: String,
}

impl SkippedRecord {
    pub fn new(record: &Record, fault: &RecordFault) -> Self {
        Self {
            title: record.title.clone(),
            file_path: record.file_path.clone(),
            reason: fault.to_string(),
        }
    }
}

/// Ratings live on the 0-5 scale; anything else cannot be aggregated or compared.
pub fn check_rating(record: &Record) -> Result<(), RecordFault> {
    match record.rating {
        Some(rating) if !rating.is_finite() || !(0.0..=5.0).contains(&rating) => {
            Err(RecordFault::MalformedField {
                field: "rating",
                value: rating.to_string(),
            })
        }
        _ => Ok(()),
    }
}

pub fn check_title(record: &Record) -> Result<(), RecordFault> {
    if record.title.trim().is_empty() {
        Err(RecordFault::MissingTitle)
    } else {
        Ok(())
    }
}
