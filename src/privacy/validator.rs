//! Privacy guard for outgoing records
//!
//! Runs after anonymization and before anything is persisted or sent
//! across a boundary. Works on the serialized JSON form, so it sees
//! exactly what would be written, whatever Rust type produced it.
//!
//! A failure rejects that one record; callers decide what happens to the
//! rest of a batch.

use crate::error::{Error, Result};
use crate::privacy::hasher::{is_hex_digest, OneWayHash};
use serde::Serialize;
use serde_json::Value;

/// Keys that must never appear on a record, at any depth
pub const FORBIDDEN_FIELDS: &[&str] = &[
    "name",
    "phone",
    "email",
    "address",
    "fullAddress",
    "full_address",
];

/// Keys treated as subject identifiers; their values must be digests
pub const SUBJECT_ID_FIELDS: &[&str] = &[
    "subjectId",
    "subject_id",
    "hashedSubjectId",
    "hashed_subject_id",
    "userId",
    "user_id",
];

/// Rejects records carrying direct identifiers or unhashed subject ids.
#[derive(Debug, Clone, Copy)]
pub struct PrivacyValidator {
    digest_hex_len: usize,
}

impl PrivacyValidator {
    /// Validator expecting identifiers of `digest_hex_len` hex characters
    pub fn new(digest_hex_len: usize) -> Self {
        Self { digest_hex_len }
    }

    /// Validator matching a hash primitive's digest length
    pub fn for_hasher(hasher: &dyn OneWayHash) -> Self {
        Self::new(hasher.digest_hex_len())
    }

    /// Validate any serializable record.
    ///
    /// Returns `Ok(true)` when the record is clean; never returns `Ok(false)`.
    pub fn validate<T: Serialize>(&self, record: &T) -> Result<bool> {
        let value = serde_json::to_value(record)?;
        self.validate_value(&value)
    }

    /// Validate an already-serialized record.
    pub fn validate_value(&self, record: &Value) -> Result<bool> {
        if !record.is_object() {
            return Err(Error::privacy_violation(
                "<record>",
                "record must be a JSON object",
            ));
        }
        self.check(record, "")?;
        Ok(true)
    }

    fn check(&self, value: &Value, path: &str) -> Result<()> {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let field = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };

                    if FORBIDDEN_FIELDS.contains(&key.as_str()) {
                        tracing::warn!(field = %field, "Privacy violation: forbidden field");
                        return Err(Error::privacy_violation(
                            field,
                            "direct identifier must be removed before storage",
                        ));
                    }

                    if SUBJECT_ID_FIELDS.contains(&key.as_str()) {
                        let hashed = child
                            .as_str()
                            .map(|s| is_hex_digest(s, self.digest_hex_len))
                            .unwrap_or(false);
                        if !hashed {
                            tracing::warn!(field = %field, "Privacy violation: unhashed identifier");
                            return Err(Error::privacy_violation(
                                field,
                                format!(
                                    "identifier must be a {}-character hex digest",
                                    self.digest_hex_len
                                ),
                            ));
                        }
                    }

                    self.check(child, &field)?;
                }
                Ok(())
            }
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    self.check(item, &format!("{}[{}]", path, idx))?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
