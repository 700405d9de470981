//! Field-level validation errors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error codes carried in JSON error bodies.
pub mod error_codes {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const RESOURCE_NOT_FOUND: &str = "resource_not_found";
    pub const AUTHENTICATION_REQUIRED: &str = "authentication_required";
    pub const PERMISSION_DENIED: &str = "permission_denied";
    pub const CONFLICT: &str = "conflict";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// A rejected value of a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Wire name of the field, e.g. `newPassword`.
    pub field: String,
    /// Machine-readable error code.
    pub code: String,
    /// User-facing message.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collects field errors while a form is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Errors {
    errors: Vec<FieldError>,
}

impl Errors {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a rejected field value.
    pub fn reject_value(
        &mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors.push(FieldError {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        });
    }

    /// Returns true if any field was rejected.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if the given field was rejected.
    pub fn has_field_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Errors recorded for one field.
    pub fn field_errors<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// All recorded errors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts the collector into a result, failing if any field was rejected.
    pub fn into_result(self) -> Result<(), Errors> {
        if self.has_errors() {
            Err(self)
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for Errors {}
