//! Emergency keyword table
//!
//! Trigger phrases are language-agnostic: every entry is checked no
//! matter which advisory language the caller asked for. Entries are
//! stored lowercased and deduplicated, in a fixed order that also fixes
//! the order of `matched_keywords` in a classification result.

use serde::{Deserialize, Serialize};

/// Clinical category of a trigger phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    Cardiac,
    Respiratory,
    Neurological,
    Trauma,
    Psychiatric,
    Other,
}

impl std::fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cardiac => write!(f, "cardiac"),
            Self::Respiratory => write!(f, "respiratory"),
            Self::Neurological => write!(f, "neurological"),
            Self::Trauma => write!(f, "trauma"),
            Self::Psychiatric => write!(f, "psychiatric"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Built-in trigger phrases
const DEFAULT_KEYWORDS: &[(&str, KeywordCategory)] = &[
    // Cardiac
    ("chest pain", KeywordCategory::Cardiac),
    ("heart attack", KeywordCategory::Cardiac),
    ("cardiac arrest", KeywordCategory::Cardiac),
    ("crushing chest", KeywordCategory::Cardiac),
    ("pain spreading to my arm", KeywordCategory::Cardiac),
    ("heart stopped", KeywordCategory::Cardiac),
    ("सीने में दर्द", KeywordCategory::Cardiac),
    ("दिल का दौरा", KeywordCategory::Cardiac),
    // Respiratory
    ("can't breathe", KeywordCategory::Respiratory),
    ("cannot breathe", KeywordCategory::Respiratory),
    ("difficulty breathing", KeywordCategory::Respiratory),
    ("shortness of breath", KeywordCategory::Respiratory),
    ("not breathing", KeywordCategory::Respiratory),
    ("choking", KeywordCategory::Respiratory),
    ("lips turning blue", KeywordCategory::Respiratory),
    ("सांस नहीं", KeywordCategory::Respiratory),
    // Neurological
    ("stroke", KeywordCategory::Neurological),
    ("seizure", KeywordCategory::Neurological),
    ("unconscious", KeywordCategory::Neurological),
    ("passed out", KeywordCategory::Neurological),
    ("slurred speech", KeywordCategory::Neurological),
    ("face drooping", KeywordCategory::Neurological),
    ("sudden numbness", KeywordCategory::Neurological),
    ("worst headache", KeywordCategory::Neurological),
    ("बेहोश", KeywordCategory::Neurological),
    // Trauma
    ("severe bleeding", KeywordCategory::Trauma),
    ("heavy bleeding", KeywordCategory::Trauma),
    ("head injury", KeywordCategory::Trauma),
    ("severe burn", KeywordCategory::Trauma),
    ("road accident", KeywordCategory::Trauma),
    ("broken bone", KeywordCategory::Trauma),
    // Psychiatric
    ("suicide", KeywordCategory::Psychiatric),
    ("suicidal", KeywordCategory::Psychiatric),
    ("kill myself", KeywordCategory::Psychiatric),
    ("end my life", KeywordCategory::Psychiatric),
    ("self harm", KeywordCategory::Psychiatric),
    ("want to die", KeywordCategory::Psychiatric),
    ("आत्महत्या", KeywordCategory::Psychiatric),
    // Other
    ("overdose", KeywordCategory::Other),
    ("poisoning", KeywordCategory::Other),
    ("anaphylaxis", KeywordCategory::Other),
    ("severe allergic reaction", KeywordCategory::Other),
    ("vomiting blood", KeywordCategory::Other),
    ("coughing up blood", KeywordCategory::Other),
    ("severe pain", KeywordCategory::Other),
    ("snake bite", KeywordCategory::Other),
];

/// A single trigger phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyKeyword {
    /// Lowercased trigger phrase
    pub phrase: String,
    /// Clinical category
    pub category: KeywordCategory,
}

/// Immutable, ordered set of emergency trigger phrases.
///
/// Built once at startup and shared read-only; there is no API to mutate
/// a table after construction.
#[derive(Debug, Clone)]
pub struct EmergencyKeywordTable {
    entries: Vec<EmergencyKeyword>,
}

impl Default for EmergencyKeywordTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EmergencyKeywordTable {
    /// Build a table from phrases, lowercasing and dropping blanks and duplicates.
    pub fn new(entries: impl IntoIterator<Item = (String, KeywordCategory)>) -> Self {
        let mut table: Vec<EmergencyKeyword> = Vec::new();
        for (phrase, category) in entries {
            let phrase = phrase.trim().to_lowercase();
            if phrase.is_empty() || table.iter().any(|e| e.phrase == phrase) {
                continue;
            }
            table.push(EmergencyKeyword { phrase, category });
        }
        Self { entries: table }
    }

    /// The built-in table
    pub fn builtin() -> Self {
        Self::new(
            DEFAULT_KEYWORDS
                .iter()
                .map(|(phrase, category)| (phrase.to_string(), *category)),
        )
    }

    /// The built-in table plus extra phrases (categorised as `Other`)
    pub fn with_extra(extra: &[String]) -> Self {
        Self::new(
            DEFAULT_KEYWORDS
                .iter()
                .map(|(phrase, category)| (phrase.to_string(), *category))
                .chain(extra.iter().map(|p| (p.clone(), KeywordCategory::Other))),
        )
    }

    pub fn entries(&self) -> &[EmergencyKeyword] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Category of a phrase, if present
    pub fn category_of(&self, phrase: &str) -> Option<KeywordCategory> {
        let phrase = phrase.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.phrase == phrase)
            .map(|e| e.category)
    }
}
