//! Structured error handling for the build tooling
//!
//! This module provides structured error types with:
//! - Detailed error context
//! - Recovery suggestions
//! - Error codes for programmatic handling
//! - Serializable error reports
//!
//! Every failure class of the descriptor pipeline (schema, provider,
//! validation, signing, dependency resolution, Gradle hand-off) maps to a
//! distinct code so a failed build is always attributable to one cause.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    Unknown = 1000,
    Internal = 1001,
    Timeout = 1003,

    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,
    InvalidPath = 2003,

    // Descriptor errors (3xxx)
    DescriptorError = 3000,
    DescriptorNotFound = 3001,
    DescriptorParseError = 3002,
    MissingField = 3003,
    InvalidFieldValue = 3004,

    // Version provider errors (4xxx)
    ProviderError = 4000,
    ProviderFileNotFound = 4001,
    ProviderParseError = 4002,
    MissingInjectedValue = 4003,

    // Process errors (5xxx)
    ProcessError = 5000,
    CommandNotFound = 5001,
    CommandFailed = 5002,

    // Validation errors (6xxx)
    ValidationError = 6000,
    InvalidIdentifier = 6001,
    SdkOrderViolation = 6002,
    PluginUnresolved = 6003,
    PluginOrderViolation = 6004,
    DesugaringMismatch = 6005,
    InvalidVersionCode = 6006,

    // Resolution errors (7xxx)
    ResolutionError = 7000,
    SigningConfigMissing = 7001,
    DependencyUnresolved = 7002,

    // Platform errors (8xxx)
    PlatformError = 8000,
    GradleError = 8001,
    JdkError = 8002,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Descriptor",
            4 => "Provider",
            5 => "Process",
            6 => "Validation",
            7 => "Resolution",
            8 => "Platform",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    // Convenience constructors

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }

    pub fn descriptor(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DescriptorError, message)
    }

    pub fn descriptor_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::DescriptorNotFound,
            format!("Build descriptor not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .renormind-build.toml file or use --config to specify a path")
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderError, message)
    }

    pub fn missing_injected_value(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingInjectedValue,
            format!(
                "No value for '{}': not pinned in the descriptor and not supplied by the version provider",
                field
            ),
        )
        .with_suggestion(format!(
            "Pin '{}' in the descriptor or point --flutter-properties at the generated Flutter properties file",
            field
        ))
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProcessError, message)
    }

    pub fn command_not_found(cmd: &str) -> Self {
        Self::new(
            ErrorCode::CommandNotFound,
            format!("Command not found: {}", cmd),
        )
        .with_suggestion(format!("Install {} and ensure it's in your PATH", cmd))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn sdk_order(min_sdk: u32, target_sdk: u32, compile_sdk: u32) -> Self {
        Self::new(
            ErrorCode::SdkOrderViolation,
            format!(
                "SDK levels out of order: minSdk={} targetSdk={} compileSdk={} (required: minSdk <= targetSdk <= compileSdk)",
                min_sdk, target_sdk, compile_sdk
            ),
        )
        .with_suggestion("Raise the higher bound or lower the offending SDK level; values are never clamped")
    }

    pub fn signing_config_missing(build_type: &str, name: &str) -> Self {
        Self::new(
            ErrorCode::SigningConfigMissing,
            format!(
                "Build type '{}' references signing config '{}' which is not declared",
                build_type, name
            ),
        )
        .with_suggestion(format!(
            "Declare [signing.{}] in the descriptor or reference the built-in 'debug' config",
            name
        ))
    }

    pub fn gradle(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GradleError, message)
    }
}

/// Serializable error report for logging and machine consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub code_str: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const DESCRIPTOR_ERROR: i32 = 3;
    pub const PROVIDER_ERROR: i32 = 4;
    pub const GRADLE_ERROR: i32 = 5;
    pub const TIMEOUT: i32 = 124;
    pub const COMMAND_NOT_FOUND: i32 = 127;
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::Internal, format!("JSON error: {}", err)).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(
            ErrorCode::DescriptorParseError,
            format!("TOML parse error: {}", err),
        )
        .with_source(err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::new(ErrorCode::Internal, format!("Regex error: {}", err)).with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::DescriptorNotFound.to_string(), "E3001");
        assert_eq!(ErrorCode::SdkOrderViolation.to_string(), "E6002");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::MissingInjectedValue.category(), "Provider");
        assert_eq!(ErrorCode::SigningConfigMissing.category(), "Resolution");
        assert_eq!(ErrorCode::GradleError.category(), "Platform");
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::descriptor_not_found("/path/to/file")
            .with_context("While loading the build descriptor");

        assert_eq!(err.code, ErrorCode::DescriptorNotFound);
        assert!(err.context.is_some());
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_sdk_order_message_carries_all_three_levels() {
        let err = Error::sdk_order(24, 23, 34);
        assert_eq!(err.code, ErrorCode::SdkOrderViolation);
        assert!(err.message.contains("minSdk=24"));
        assert!(err.message.contains("targetSdk=23"));
        assert!(err.message.contains("compileSdk=34"));
    }

    #[test]
    fn test_error_report_serialization() {
        let err = Error::signing_config_missing("release", "upload")
            .with_context("During descriptor resolution");

        let report = err.to_report();
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("E7001"));
        assert!(json.contains("Resolution"));
    }
}
