//! Descriptor and input validation
//!
//! Provides the validation toolkit used by the resolver:
//! - field-level checks with machine-readable codes
//! - error/warning channels (warnings never fail a build)
//! - reverse-domain identifier validation for Android namespaces
//!
//! # Example
//!
//! ```rust,ignore
//! use renormind_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("android.application_id", &descriptor.android.application_id)
//!     .reverse_domain("android.application_id", &descriptor.android.application_id)
//!     .validate();
//!
//! if !result.is_valid() {
//!     for error in result.errors() {
//!         eprintln!("Validation error: {}", error);
//!     }
//! }
//! ```

use crate::error::{Error, ErrorCode, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Reverse-domain identifier: dot-separated segments, each starting with a
/// letter, at least two segments. Matches what AGP accepts for namespaces.
static REVERSE_DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap());

/// Check whether a string is a valid reverse-domain identifier
pub fn is_reverse_domain(value: &str) -> bool {
    REVERSE_DOMAIN_RE.is_match(value)
}

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Machine-readable code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Convert to Result, attributing the failure to the first error's code
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        let code = self
            .errors
            .first()
            .map(|e| code_for(&e.code))
            .unwrap_or(ErrorCode::ValidationError);
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        Err(Error::new(
            code,
            format!("Validation failed: {}", messages.join("; ")),
        ))
    }
}

/// Map a field-level validation code onto the error taxonomy
fn code_for(code: &str) -> ErrorCode {
    match code {
        "REQUIRED" => ErrorCode::MissingField,
        "REVERSE_DOMAIN" => ErrorCode::InvalidIdentifier,
        "SDK_ORDER" => ErrorCode::SdkOrderViolation,
        "PLUGIN_UNRESOLVED" => ErrorCode::PluginUnresolved,
        "PLUGIN_ORDER" => ErrorCode::PluginOrderViolation,
        "DESUGARING" => ErrorCode::DesugaringMismatch,
        "VERSION_CODE" => ErrorCode::InvalidVersionCode,
        "SIGNING_CONFIG" => ErrorCode::SigningConfigMissing,
        "DEPENDENCY" => ErrorCode::DependencyUnresolved,
        _ => ErrorCode::ValidationError,
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate a reverse-domain identifier (namespace, application id)
    pub fn reverse_domain(mut self, field: &str, value: &str) -> Self {
        if !is_reverse_domain(value) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Must be a reverse-domain identifier (e.g. com.example.app)".to_string(),
                code: "REVERSE_DOMAIN".to_string(),
                expected: Some("segment(.segment)+, segments start with a letter".to_string()),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate a numeric range
    pub fn range<T: PartialOrd + std::fmt::Display>(
        mut self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if value < min || value > max {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be between {} and {}", min, max),
                code: "RANGE".to_string(),
                expected: Some(format!("{} - {}", min, max)),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate that a value is in a list of allowed values
    pub fn one_of(mut self, field: &str, value: &str, allowed: &[&str]) -> Self {
        if !allowed.contains(&value) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be one of: {}", allowed.join(", ")),
                code: "ONE_OF".to_string(),
                expected: Some(allowed.join(", ")),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Add a custom validation; the closure returns (code, message) on failure
    pub fn custom<F>(mut self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<(&'static str, String)>,
    {
        if let Some((code, message)) = f() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message,
                code: code.to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Add a warning (non-blocking)
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result.add_warning(ValidationError {
                field: field.to_string(),
                message: message.to_string(),
                code: "WARNING".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}
