//! Input validation for identifiers and rating payloads
//!
//! Every check here runs before any store access, so a rejected request
//! never mutates the item store or the rating ledger.

use thiserror::Error;
use uuid::Uuid;

/// Length of a hyphenated UUID (8-4-4-4-12)
const HYPHENATED_UUID_LEN: usize = 36;

/// Validation failure for a client-supplied value
///
/// Each variant maps to a stable wire code via [`ValidationError::code`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Body is not shaped like a rating request
    #[error("Malformed payload: {0}")]
    Payload(String),

    /// Item id is empty or contains characters outside `[A-Za-z0-9_-]`
    #[error("Item id must contain only letters, digits, '-' or '_': {0:?}")]
    ItemIdFormat(String),

    /// Rating value other than +1 / -1
    #[error("Rating value must be 1 or -1, got {0}")]
    Value(i64),

    /// User id present but not a hyphenated UUID
    #[error("User id is not a UUID: {0:?}")]
    UserIdFormat(String),

    /// Unknown locale code
    #[error("Unsupported language: {0:?}")]
    Locale(String),
}

impl ValidationError {
    /// Wire code reported in `{ "error": <code> }` payloads
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::Payload(_) => "invalid_payload",
            ValidationError::ItemIdFormat(_) => "invalid_id_format",
            ValidationError::Value(_) => "invalid_value",
            ValidationError::UserIdFormat(_) => "invalid_user_id_format",
            ValidationError::Locale(_) => "invalid_lang",
        }
    }
}

/// Check an item identifier against the allow-list pattern `^[A-Za-z0-9_-]+$`
pub fn validate_item_id(id: &str) -> Result<(), ValidationError> {
    let well_formed = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::ItemIdFormat(id.to_string()))
    }
}

/// Parse a user identifier, accepting only the hyphenated UUID form
///
/// `Uuid::parse_str` also accepts simple, braced and URN forms; those are
/// rejected here by length.
pub fn validate_user_id(raw: &str) -> Result<Uuid, ValidationError> {
    if raw.len() != HYPHENATED_UUID_LEN {
        return Err(ValidationError::UserIdFormat(raw.to_string()));
    }
    Uuid::parse_str(raw).map_err(|_| ValidationError::UserIdFormat(raw.to_string()))
}
