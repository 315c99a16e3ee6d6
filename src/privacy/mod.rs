//! Privacy-safe symptom reporting
//!
//! Strips personal data from symptom reports before they reach storage
//! or any reporting surface:
//! - `hasher`: one-way hash capability and the process-wide salt
//! - `anonymizer`: raw report → anonymized record
//! - `validator`: last-line guard against forbidden fields
//!
//! ```text
//! RawSymptomReport → Anonymizer → PrivacyValidator ─┬─ ok → persist
//!                                                   └─ PrivacyViolation → reject record
//! ```

pub mod anonymizer;
pub mod hasher;
pub mod validator;

pub use anonymizer::{
    anonymize, anonymize_with, AnonymizedSymptomRecord, Anonymizer, RawSymptomReport, Severity,
};
pub use hasher::{is_hex_digest, salted_digest, OneWayHash, Salt, Sha256Hash};
pub use validator::{PrivacyValidator, FORBIDDEN_FIELDS, SUBJECT_ID_FIELDS};
