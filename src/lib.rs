//! Health Signal - constitution scoring, emergency triage and privacy-safe
//! symptom surveillance
//!
//! The deterministic core behind a consumer health assistant and its
//! public-health dashboard. Everything here is pure or talks to storage
//! through a narrow trait; no cloud SDK is involved.
//!
//! ## Architecture
//!
//! ```text
//!  questionnaire ──► ScoringEngine ──► ConstitutionProfile
//!
//!  free text ──────► SafetyClassifier ─┬─► Emergency (advisory + detection log)
//!                                      └─► NoEmergency (pass through)
//!
//!  symptom report ─► Anonymizer ─► PrivacyValidator ─► SymptomStore
//!                                                         │
//!                                    RegionAggregator ◄───┘
//!                                           │
//!                                           ▼
//!                                    RegionAggregate (dashboard)
//! ```
//!
//! ## Modules
//!
//! - [`scoring`]: vata / pitta / kapha profile from weighted answers
//! - [`safety`]: emergency keyword classifier and localized advisories
//! - [`privacy`]: salted one-way hashing, anonymization, record validation
//! - [`surveillance`]: symptom storage and regional aggregation
//! - [`api`]: unified HTTP router
//! - [`config`]: configuration management

pub mod api;
pub mod config;
pub mod error;
pub mod privacy;
pub mod safety;
pub mod scoring;
pub mod surveillance;

pub use config::HealthSignalConfig;
pub use error::{Error, Result};
