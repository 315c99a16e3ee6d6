//! Emergency safety classification
//!
//! Fixed-keyword triage that runs ahead of any downstream processing:
//! - `keywords`: immutable trigger phrase table, grouped by clinical category
//! - `advisory`: canned per-language emergency messages
//! - `classifier`: matching, fallback and detection logging
//!
//! ```text
//! user text → SafetyClassifier ─┬─ Emergency → advisory (bypass everything else)
//!                               └─ NoEmergency → pass through
//! ```

pub mod advisory;
pub mod classifier;
pub mod handler;
pub mod keywords;

pub use advisory::{LocalizedAdvisory, AMBULANCE_NUMBER, EMERGENCY_NUMBER};
pub use classifier::{DetectionRecord, SafetyCheckResult, SafetyClassifier};
pub use handler::{safety_router, SafetyState};
pub use keywords::{EmergencyKeyword, EmergencyKeywordTable, KeywordCategory};
