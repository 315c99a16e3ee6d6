//! Regional symptom aggregation
//!
//! Folds anonymized records for one pincode and date window into
//! per-symptom occurrence counts. The fold is a commutative sum over a
//! `BTreeMap`, so input order never changes the result.

use crate::error::{Error, Result};
use crate::privacy::AnonymizedSymptomRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Partition prefix for region keys in the symptom store
pub const REGION_PREFIX: &str = "REGION#";

/// Region and inclusive UTC date window an aggregate is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionKey {
    pub pincode: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl RegionKey {
    pub fn new(pincode: impl Into<String>, from: NaiveDate, to: NaiveDate) -> Result<Self> {
        let pincode = pincode.into().trim().to_string();
        if pincode.is_empty() {
            return Err(Error::Validation("pincode must not be empty".to_string()));
        }
        if from > to {
            return Err(Error::Validation(format!(
                "date range is inverted: {} > {}",
                from, to
            )));
        }
        Ok(Self { pincode, from, to })
    }

    /// Key covering a single day
    pub fn single_day(pincode: impl Into<String>, date: NaiveDate) -> Result<Self> {
        Self::new(pincode, date, date)
    }

    /// Store partition key (`REGION#<pincode>`)
    pub fn partition_key(&self) -> String {
        partition_key(&self.pincode)
    }

    /// Whether a record falls inside this region and window
    pub fn contains(&self, record: &AnonymizedSymptomRecord) -> bool {
        record.pincode == self.pincode
            && record
                .date()
                .map(|d| self.from <= d && d <= self.to)
                .unwrap_or(false)
    }
}

/// Store partition key for a pincode
pub fn partition_key(pincode: &str) -> String {
    format!("{}{}", REGION_PREFIX, pincode)
}

/// Store sort key for a date (`yyyy-mm-dd`, sorts chronologically)
pub fn sort_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Per-symptom counts for one region key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionAggregate {
    #[serde(flatten)]
    pub key: RegionKey,
    pub counts: BTreeMap<String, u64>,
    pub total: u64,
}

impl RegionAggregate {
    pub fn empty(key: RegionKey) -> Self {
        Self {
            key,
            counts: BTreeMap::new(),
            total: 0,
        }
    }

    /// Count for one symptom type (0 when absent)
    pub fn count(&self, symptom_type: &str) -> u64 {
        self.counts.get(symptom_type).copied().unwrap_or(0)
    }

    /// Merge another partial aggregate for the same key into this one.
    pub fn merge(&mut self, other: &RegionAggregate) {
        for (symptom, count) in &other.counts {
            add(&mut self.counts, symptom, *count);
        }
        self.total = self.total.saturating_add(other.total);
    }
}

/// Stateless region aggregator
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionAggregator;

impl RegionAggregator {
    /// Aggregate records for `key`. Records outside the key are skipped.
    pub fn aggregate<'a, I>(&self, key: &RegionKey, records: I) -> RegionAggregate
    where
        I: IntoIterator<Item = &'a AnonymizedSymptomRecord>,
    {
        let mut aggregate = RegionAggregate::empty(key.clone());
        let mut skipped = 0usize;

        for record in records {
            if !key.contains(record) {
                skipped += 1;
                continue;
            }
            let weight = record.weight();
            add(&mut aggregate.counts, &record.symptom_type, weight);
            aggregate.total = aggregate.total.saturating_add(weight);
        }

        if skipped > 0 {
            tracing::debug!(
                region = %key.partition_key(),
                skipped,
                "Skipped records outside the aggregation window"
            );
        }

        aggregate
    }
}

/// Aggregate records for `key` with the default aggregator.
pub fn aggregate<'a, I>(key: &RegionKey, records: I) -> RegionAggregate
where
    I: IntoIterator<Item = &'a AnonymizedSymptomRecord>,
{
    RegionAggregator.aggregate(key, records)
}

fn add(counts: &mut BTreeMap<String, u64>, symptom: &str, weight: u64) {
    let entry = counts.entry(symptom.to_string()).or_insert(0);
    *entry = entry.saturating_add(weight);
}
