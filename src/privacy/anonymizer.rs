//! Symptom report anonymization
//!
//! Turns a raw report into a record that is safe to persist and share:
//! the subject identifier becomes a salted one-way digest, the pincode is
//! the only location kept, and every direct identifier is dropped.

use crate::privacy::hasher::{salted_digest, OneWayHash, Salt, Sha256Hash};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reported severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Symptom report as submitted, possibly carrying direct identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSymptomReport {
    pub subject_id: String,
    pub symptom_type: String,
    pub severity: Severity,
    pub pincode: String,
    /// Unix milliseconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_address: Option<String>,
}

/// Privacy-safe symptom record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymizedSymptomRecord {
    pub hashed_subject_id: String,
    pub symptom_type: String,
    pub severity: Severity,
    pub pincode: String,
    /// Unix milliseconds
    pub timestamp: i64,
    /// Occurrences this record stands for; absent means one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl AnonymizedSymptomRecord {
    /// Occurrence weight used by aggregation
    pub fn weight(&self) -> u64 {
        self.count.unwrap_or(1)
    }

    /// UTC calendar date of the report, if the timestamp is representable
    pub fn date(&self) -> Option<NaiveDate> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp).map(|dt| dt.date_naive())
    }
}

/// Anonymizer bound to a hash primitive and the process-wide salt.
#[derive(Clone)]
pub struct Anonymizer {
    hasher: Arc<dyn OneWayHash>,
    salt: Salt,
}

impl Anonymizer {
    pub fn new(hasher: Arc<dyn OneWayHash>, salt: Salt) -> Self {
        Self { hasher, salt }
    }

    /// SHA-256 anonymizer
    pub fn sha256(salt: Salt) -> Self {
        Self::new(Arc::new(Sha256Hash), salt)
    }

    pub fn hasher(&self) -> &dyn OneWayHash {
        self.hasher.as_ref()
    }

    /// Anonymize a single report.
    pub fn anonymize(&self, report: &RawSymptomReport) -> AnonymizedSymptomRecord {
        anonymize_with(self.hasher.as_ref(), report, &self.salt)
    }
}

/// Anonymize a report with SHA-256.
pub fn anonymize(report: &RawSymptomReport, salt: &Salt) -> AnonymizedSymptomRecord {
    anonymize_with(&Sha256Hash, report, salt)
}

/// Anonymize a report with an explicit hash primitive.
pub fn anonymize_with(
    hasher: &dyn OneWayHash,
    report: &RawSymptomReport,
    salt: &Salt,
) -> AnonymizedSymptomRecord {
    AnonymizedSymptomRecord {
        hashed_subject_id: salted_digest(hasher, &report.subject_id, salt),
        symptom_type: report.symptom_type.clone(),
        severity: report.severity,
        pincode: report.pincode.clone(),
        timestamp: report.timestamp,
        count: None,
    }
}
