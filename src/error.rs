//! Error types for formkit.
//!
//! Validation failures are data, not exceptions: field parsers produce
//! human-readable messages, and filling a form folds them into an
//! [`ErrorSet`] with a designated first error for focus-on-submit behavior.
//! The only `std::error::Error` type here is [`UploadError`], the failure
//! side of the asynchronous file upload contract.

use crate::types::FieldId;

/// A validation failure attached to exactly one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// The field the message belongs to.
    pub field: FieldId,
    /// Human-readable message, ready for display.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(field: FieldId, message: impl Into<String>) -> Self {
        FieldError {
            field,
            message: message.into(),
        }
    }
}

/// The aggregate error produced by one fill pass.
///
/// Guarantees at least one error exists: the `first` error drives
/// focus-on-submit, the rest are available for a summary. Ordering follows
/// composition order, so the first error always belongs to the earliest
/// composed failing field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorSet {
    first: FieldError,
    rest: Vec<FieldError>,
}

impl ErrorSet {
    /// An error set holding a single field error.
    pub fn single(field: FieldId, message: impl Into<String>) -> Self {
        ErrorSet {
            first: FieldError::new(field, message),
            rest: Vec::new(),
        }
    }

    /// The designated first error (earliest composed failing field).
    pub fn first(&self) -> &FieldError {
        &self.first
    }

    /// All errors after the first, in composition order.
    pub fn rest(&self) -> &[FieldError] {
        &self.rest
    }

    /// Total number of errors (always at least one).
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// Always `false`: the set holds at least one error by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Merge a later error set into this one.
    ///
    /// `self` is the earlier-composed side, so its first error stays the
    /// overall first; all of `later`'s errors are appended in order.
    pub fn join(mut self, later: ErrorSet) -> Self {
        self.rest.push(later.first);
        self.rest.extend(later.rest);
        self
    }

    /// Iterate over every error, first included.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    /// All messages in order, for a summary display.
    pub fn messages(&self) -> Vec<&str> {
        self.iter().map(|e| e.message.as_str()).collect()
    }
}

/// Failure side of the asynchronous file upload contract.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// The transport failed before the server produced a verdict.
    #[error("upload transport failed: {0}")]
    Transport(String),

    /// The server rejected the file.
    #[error("upload rejected: {0}")]
    Rejected(String),

    /// The file exceeds the configured size limit.
    #[error("file exceeds maximum size of {max_bytes} bytes")]
    TooLarge {
        /// The configured limit.
        max_bytes: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_set_join_keeps_earlier_first() {
        let a = ErrorSet::single(FieldId::new("name"), "required");
        let b = ErrorSet::single(FieldId::new("age"), "not a number");
        let joined = a.join(b);
        assert_eq!(joined.first().field.as_str(), "name");
        assert_eq!(joined.first().message, "required");
        assert_eq!(joined.rest().len(), 1);
        assert_eq!(joined.rest()[0].message, "not a number");
        assert_eq!(joined.len(), 2);
        assert!(!joined.is_empty());
    }

    #[test]
    fn test_error_set_join_preserves_order() {
        let a = ErrorSet::single(FieldId::new("a"), "m1")
            .join(ErrorSet::single(FieldId::new("b"), "m2"));
        let c = ErrorSet::single(FieldId::new("c"), "m3")
            .join(ErrorSet::single(FieldId::new("d"), "m4"));
        let joined = a.join(c);
        assert_eq!(joined.messages(), vec!["m1", "m2", "m3", "m4"]);
    }

    #[test]
    fn test_upload_error_display() {
        let err = UploadError::TooLarge { max_bytes: 1024 };
        assert_eq!(err.to_string(), "file exceeds maximum size of 1024 bytes");
        let err = UploadError::Transport("connection reset".into());
        assert_eq!(err.to_string(), "upload transport failed: connection reset");
    }
}
