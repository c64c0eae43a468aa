// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Core error type for pcidev operations
///
/// Name derivation itself never fails. Errors only come from the edges:
/// reading descriptor files, (de)serializing records, and validating them.
#[derive(Error, Debug, Diagnostic)]
pub enum PcidevError {
    /// Input could not be read
    #[error("Failed to read input {path}: {message}")]
    #[diagnostic(
        code(pcidev::input_error),
        help("Check that the file exists and is readable by the current user")
    )]
    InputError {
        #[allow(unused)]
        path: String,
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(
        code(pcidev::serialization_error),
        help("Ensure the document is valid JSON or YAML and matches the device descriptor shape")
    )]
    SerializationError {
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation failed
    #[error("Validation failed for {resource_type}: {details}")]
    #[diagnostic(
        code(pcidev::validation_failed),
        help("{help_text}")
    )]
    ValidationFailed {
        #[allow(unused)]
        resource_type: String,
        #[allow(unused)]
        details: String,
        #[allow(unused)]
        help_text: String,
    },
}

/// Result type alias for pcidev operations
pub type Result<T> = std::result::Result<T, PcidevError>;

impl PcidevError {
    /// Create an InputError
    pub fn input_error(
        path: impl Into<String>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::InputError {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a SerializationError
    pub fn serialization_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source,
        }
    }

    /// Create a ValidationFailed error
    pub fn validation_failed(
        resource_type: impl Into<String>,
        details: impl Into<String>,
        help_text: impl Into<String>,
    ) -> Self {
        Self::ValidationFailed {
            resource_type: resource_type.into(),
            details: details.into(),
            help_text: help_text.into(),
        }
    }
}
