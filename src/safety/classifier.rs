//! Emergency safety classifier
//!
//! Scans free text for emergency trigger phrases before anything else
//! touches it. A match short-circuits the request with a canned advisory;
//! no match passes the text through untouched.
//!
//! `classify` is total: malformed or missing input degrades to
//! `NoEmergency` instead of erroring, so a bad request can never keep an
//! advisory from being shown for a good one.

use crate::config::{MatchMode, SafetyConfig};
use crate::error::{Error, Result};
use crate::safety::advisory::LocalizedAdvisory;
use crate::safety::keywords::{EmergencyKeywordTable, KeywordCategory};
use regex::Regex;

/// Log target for detection records
pub const DETECTION_LOG_TARGET: &str = "healthsignal::safety::detection";

/// Region hint logged when the caller has none
pub const UNKNOWN_REGION: &str = "unknown";

/// Characters of a region hint kept in detection logs (postal district)
const REGION_HINT_PREFIX: usize = 3;

/// Outcome of a safety check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyCheckResult {
    /// No trigger phrase found; continue normal processing
    NoEmergency,
    /// At least one trigger phrase found
    Emergency {
        /// Every matched phrase, in table order
        matched_keywords: Vec<String>,
        /// Canned advisory for the requested language
        advisory_text: &'static str,
        /// Distinct categories of the matched phrases, in table order
        categories: Vec<KeywordCategory>,
    },
}

impl SafetyCheckResult {
    pub fn is_emergency(&self) -> bool {
        matches!(self, Self::Emergency { .. })
    }

    /// Matched phrases; empty when there is no emergency
    pub fn matched_keywords(&self) -> &[String] {
        match self {
            Self::Emergency {
                matched_keywords, ..
            } => matched_keywords,
            Self::NoEmergency => &[],
        }
    }

    /// Distinct categories of the matched phrases
    pub fn categories(&self) -> &[KeywordCategory] {
        match self {
            Self::Emergency { categories, .. } => categories,
            Self::NoEmergency => &[],
        }
    }

    /// Advisory text, present only for emergencies
    pub fn advisory_text(&self) -> Option<&'static str> {
        match self {
            Self::Emergency { advisory_text, .. } => Some(advisory_text),
            Self::NoEmergency => None,
        }
    }
}

enum Matcher {
    Substring,
    WordBoundary(Vec<Regex>),
}

/// Keyword-based emergency classifier.
///
/// Holds only read-only configuration; share it behind an `Arc`.
pub struct SafetyClassifier {
    table: EmergencyKeywordTable,
    advisory: LocalizedAdvisory,
    matcher: Matcher,
}

impl Default for SafetyClassifier {
    fn default() -> Self {
        Self {
            table: EmergencyKeywordTable::builtin(),
            advisory: LocalizedAdvisory::default(),
            matcher: Matcher::Substring,
        }
    }
}

impl SafetyClassifier {
    /// Create a classifier from an explicit table and advisory set.
    pub fn new(
        table: EmergencyKeywordTable,
        advisory: LocalizedAdvisory,
        mode: MatchMode,
    ) -> Result<Self> {
        let matcher = match mode {
            MatchMode::Substring => Matcher::Substring,
            MatchMode::WordBoundary => {
                let patterns = table
                    .entries()
                    .iter()
                    .map(|entry| {
                        Regex::new(&format!(r"\b{}\b", regex::escape(&entry.phrase))).map_err(
                            |e| {
                                Error::Config(format!(
                                    "Invalid keyword pattern '{}': {}",
                                    entry.phrase, e
                                ))
                            },
                        )
                    })
                    .collect::<Result<Vec<_>>>()?;
                Matcher::WordBoundary(patterns)
            }
        };

        Ok(Self {
            table,
            advisory,
            matcher,
        })
    }

    /// Create a classifier from configuration
    pub fn from_config(config: &SafetyConfig) -> Result<Self> {
        Self::new(
            EmergencyKeywordTable::with_extra(&config.extra_keywords),
            LocalizedAdvisory::builtin(&config.default_language),
            config.match_mode,
        )
    }

    pub fn table(&self) -> &EmergencyKeywordTable {
        &self.table
    }

    pub fn advisory(&self) -> &LocalizedAdvisory {
        &self.advisory
    }

    /// Classify text for emergency risk.
    pub fn classify(&self, text: &str, language_code: &str) -> SafetyCheckResult {
        if text.trim().is_empty() {
            return SafetyCheckResult::NoEmergency;
        }

        let text_lower = text.to_lowercase();
        let mut matched_keywords = Vec::new();
        let mut categories = Vec::new();

        for (idx, entry) in self.table.entries().iter().enumerate() {
            let hit = match &self.matcher {
                Matcher::Substring => text_lower.contains(entry.phrase.as_str()),
                Matcher::WordBoundary(patterns) => patterns[idx].is_match(&text_lower),
            };
            if hit {
                matched_keywords.push(entry.phrase.clone());
                if !categories.contains(&entry.category) {
                    categories.push(entry.category);
                }
            }
        }

        if matched_keywords.is_empty() {
            return SafetyCheckResult::NoEmergency;
        }

        tracing::debug!(
            keyword_count = matched_keywords.len(),
            language = language_code,
            "Emergency keywords matched"
        );

        SafetyCheckResult::Emergency {
            matched_keywords,
            advisory_text: self.advisory.for_language(language_code),
            categories,
        }
    }

    /// Classify untyped input; anything but a string is not an emergency.
    pub fn classify_value(
        &self,
        text: Option<&serde_json::Value>,
        language_code: &str,
    ) -> SafetyCheckResult {
        match text {
            Some(serde_json::Value::String(s)) => self.classify(s, language_code),
            _ => SafetyCheckResult::NoEmergency,
        }
    }

    /// Build the detection log payload.
    ///
    /// Only phrases that exist in the keyword table survive, lowercased,
    /// so caller text can never reach the log through this path. The
    /// region hint is cut to its postal-district prefix.
    pub fn detection_record(
        &self,
        matched_keywords: &[String],
        region_hint: Option<&str>,
    ) -> DetectionRecord {
        let keywords = matched_keywords
            .iter()
            .filter(|k| self.table.category_of(k).is_some())
            .map(|k| k.to_lowercase())
            .collect();
        DetectionRecord {
            keywords,
            region: coarse_region(region_hint),
        }
    }

    /// Emit a structured detection log entry. Never fails.
    pub fn record_detection(&self, matched_keywords: &[String], region_hint: Option<&str>) {
        log_detection(&self.detection_record(matched_keywords, region_hint));
    }
}

/// Detection log payload: the keyword list and a coarse region, nothing else
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRecord {
    pub keywords: Vec<String>,
    pub region: String,
}

fn log_detection(record: &DetectionRecord) {
    tracing::warn!(
        target: DETECTION_LOG_TARGET,
        keywords = %record.keywords.join(","),
        keyword_count = record.keywords.len(),
        region = %record.region,
        "Emergency keywords detected"
    );
}

fn coarse_region(region_hint: Option<&str>) -> String {
    match region_hint.map(str::trim) {
        Some(hint) if !hint.is_empty() => hint.chars().take(REGION_HINT_PREFIX).collect(),
        _ => UNKNOWN_REGION.to_string(),
    }
}
