//! Symptom report intake
//!
//! Every report takes the same path: anonymize, validate, store. A
//! report that fails validation is dropped on its own; the rest of a
//! batch still goes through.

use crate::error::{Error, Result};
use crate::privacy::{AnonymizedSymptomRecord, Anonymizer, PrivacyValidator, RawSymptomReport};
use crate::surveillance::aggregator::{RegionAggregate, RegionAggregator, RegionKey};
use crate::surveillance::store::{query_with_retry, RetryPolicy, SymptomStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Report dropped from a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedReport {
    /// Position in the submitted batch
    pub index: usize,
    /// Violating field, for privacy rejections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub reason: String,
}

/// Result of a batch submission
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub accepted: usize,
    pub rejected: Vec<RejectedReport>,
}

/// Anonymize-validate-store pipeline plus regional queries
pub struct IntakePipeline {
    anonymizer: Anonymizer,
    validator: PrivacyValidator,
    store: Arc<dyn SymptomStore>,
    aggregator: RegionAggregator,
    retry: RetryPolicy,
}

impl IntakePipeline {
    /// Build a pipeline; the validator follows the anonymizer's digest length.
    pub fn new(anonymizer: Anonymizer, store: Arc<dyn SymptomStore>, retry: RetryPolicy) -> Self {
        let validator = PrivacyValidator::for_hasher(anonymizer.hasher());
        Self {
            anonymizer,
            validator,
            store,
            aggregator: RegionAggregator,
            retry,
        }
    }

    pub fn store(&self) -> &Arc<dyn SymptomStore> {
        &self.store
    }

    /// Anonymize, validate and persist one report.
    pub async fn submit(&self, report: &RawSymptomReport) -> Result<AnonymizedSymptomRecord> {
        check_report(report)?;

        let record = self.anonymizer.anonymize(report);
        self.validator.validate(&record)?;
        self.store.put(&record).await?;

        tracing::debug!(
            pincode = %record.pincode,
            symptom = %record.symptom_type,
            severity = %record.severity,
            "Symptom report stored"
        );
        Ok(record)
    }

    /// Submit each report independently.
    ///
    /// Validation and privacy failures reject only the offending report.
    /// A storage failure aborts the batch, since later puts would fail too.
    pub async fn submit_batch(&self, reports: &[RawSymptomReport]) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();

        for (index, report) in reports.iter().enumerate() {
            match self.submit(report).await {
                Ok(_) => outcome.accepted += 1,
                Err(e @ (Error::Validation(_) | Error::PrivacyViolation { .. })) => {
                    outcome.rejected.push(RejectedReport {
                        index,
                        field: e.violating_field().map(str::to_string),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if !outcome.rejected.is_empty() {
            tracing::warn!(
                accepted = outcome.accepted,
                rejected = outcome.rejected.len(),
                "Symptom batch partially rejected"
            );
        }
        Ok(outcome)
    }

    /// Load and aggregate a region's records.
    pub async fn region_aggregate(&self, key: &RegionKey) -> Result<RegionAggregate> {
        let records = query_with_retry(self.store.as_ref(), key, &self.retry).await?;
        Ok(self.aggregator.aggregate(key, &records))
    }
}

fn check_report(report: &RawSymptomReport) -> Result<()> {
    if report.subject_id.trim().is_empty() {
        return Err(Error::Validation("subjectId must not be empty".to_string()));
    }
    if report.symptom_type.trim().is_empty() {
        return Err(Error::Validation("symptomType must not be empty".to_string()));
    }
    if report.pincode.trim().is_empty() {
        return Err(Error::Validation("pincode must not be empty".to_string()));
    }
    if DateTime::<Utc>::from_timestamp_millis(report.timestamp).is_none() {
        return Err(Error::Validation(format!(
            "timestamp {} is outside the representable date range",
            report.timestamp
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::{Salt, Severity};
    use crate::surveillance::store::MemorySymptomStore;
    use chrono::NaiveDate;

    // 2026-03-01T10:00:00Z
    const MARCH_1_10AM: i64 = 1_772_359_200_000;

    fn pipeline() -> IntakePipeline {
        IntakePipeline::new(
            Anonymizer::sha256(Salt::new("intake-test-salt-abcdef")),
            Arc::new(MemorySymptomStore::new()),
            RetryPolicy::default(),
        )
    }

    fn report(subject: &str, symptom: &str) -> RawSymptomReport {
        RawSymptomReport {
            subject_id: subject.to_string(),
            symptom_type: symptom.to_string(),
            severity: Severity::Medium,
            pincode: "560034".to_string(),
            timestamp: MARCH_1_10AM,
            name: Some("Asha".to_string()),
            phone: Some("+91 90000 00000".to_string()),
            email: None,
            full_address: None,
        }
    }

    fn march_1() -> RegionKey {
        RegionKey::single_day("560034", NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_submit_stores_anonymized_record() {
        let p = pipeline();
        let record = p.submit(&report("user-1", "fever")).await.unwrap();
        assert_eq!(record.hashed_subject_id.len(), 64);
        assert_ne!(record.hashed_subject_id, "user-1");

        let stored = p.store().query(&march_1()).await.unwrap();
        assert_eq!(stored, vec![record]);
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_fields() {
        let p = pipeline();
        assert!(matches!(
            p.submit(&report(" ", "fever")).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            p.submit(&report("user-1", "")).await,
            Err(Error::Validation(_))
        ));
        assert!(p.store().query(&march_1()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_unrepresentable_timestamp() {
        let p = pipeline();
        for timestamp in [i64::MAX, i64::MIN] {
            let mut raw = report("user-1", "fever");
            raw.timestamp = timestamp;
            let err = p.submit(&raw).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
        assert!(p.store().query(&march_1()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_rejects_only_bad_reports() {
        let p = pipeline();
        let reports = vec![
            report("user-1", "fever"),
            report("", "fever"),
            report("user-2", "cough"),
        ];
        let outcome = p.submit_batch(&reports).await.unwrap();
        assert_eq!(outcome.accepted, 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].index, 1);
        assert!(outcome.rejected[0].field.is_none());
    }

    #[tokio::test]
    async fn test_region_aggregate_counts_submissions() {
        let p = pipeline();
        for (subject, symptom) in [("u1", "fever"), ("u2", "fever"), ("u3", "cough")] {
            p.submit(&report(subject, symptom)).await.unwrap();
        }
        let agg = p.region_aggregate(&march_1()).await.unwrap();
        assert_eq!(agg.count("fever"), 2);
        assert_eq!(agg.count("cough"), 1);
        assert_eq!(agg.total, 3);
    }
}
