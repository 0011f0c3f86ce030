//! Error types for device selection and dispatch.
//!
//! This module defines the errors reported by the selector (bad device
//! tokens), by the dispatch layer (operations or hyperparameters with no
//! backend on the effective device) and by model artifact handling.

use thiserror::Error;

/// Errors that can occur while selecting a device or dispatching to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Device token is not recognized.
    ///
    /// Raised synchronously by the call that received the token; the
    /// selector state is left untouched.
    #[error("Invalid device type '{token}': expected 'cpu' or 'gpu'")]
    InvalidDevice {
        /// The rejected token
        token: String,
    },

    /// A hyperparameter value has no backend on the effective device.
    ///
    /// No automatic fallback to another device is attempted.
    #[error(
        "{estimator}.{operation} does not support {parameter}={value} on {device}"
    )]
    UnsupportedParameter {
        /// Name of the estimator
        estimator: String,
        /// Operation that was requested
        operation: String,
        /// Effective device at call time
        device: String,
        /// Hyperparameter name
        parameter: String,
        /// Offending value, rendered as JSON
        value: String,
    },

    /// The operation itself has no backend on the effective device.
    #[error("{estimator}.{operation} is not available on {device}")]
    UnsupportedOperation {
        /// Name of the estimator
        estimator: String,
        /// Operation that was requested
        operation: String,
        /// Effective device at call time
        device: String,
    },

    /// Model artifact could not be encoded or decoded.
    #[error("Serialization failed: {reason}")]
    Serialization {
        /// Underlying serializer message
        reason: String,
    },

    /// Model artifact is well formed but cannot be used.
    #[error("Incompatible model artifact: {reason}")]
    IncompatibleArtifact {
        /// Description of the incompatibility
        reason: String,
    },

    /// Reading or writing an artifact failed.
    #[error("I/O error: {reason}")]
    Io {
        /// Underlying I/O message
        reason: String,
    },
}

impl DeviceError {
    /// Create an InvalidDevice error for the given token.
    pub fn invalid_device<S: Into<String>>(token: S) -> Self {
        Self::InvalidDevice {
            token: token.into(),
        }
    }

    /// Create an UnsupportedParameter error.
    pub fn unsupported_parameter<E, O, D, P, V>(
        estimator: E,
        operation: O,
        device: D,
        parameter: P,
        value: V,
    ) -> Self
    where
        E: Into<String>,
        O: std::fmt::Display,
        D: std::fmt::Display,
        P: Into<String>,
        V: std::fmt::Display,
    {
        Self::UnsupportedParameter {
            estimator: estimator.into(),
            operation: operation.to_string(),
            device: device.to_string(),
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Create an UnsupportedOperation error.
    pub fn unsupported_operation<E, O, D>(estimator: E, operation: O, device: D) -> Self
    where
        E: Into<String>,
        O: std::fmt::Display,
        D: std::fmt::Display,
    {
        Self::UnsupportedOperation {
            estimator: estimator.into(),
            operation: operation.to_string(),
            device: device.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization<S: Into<String>>(reason: S) -> Self {
        Self::Serialization {
            reason: reason.into(),
        }
    }

    /// Create an IncompatibleArtifact error.
    pub fn incompatible_artifact<S: Into<String>>(reason: S) -> Self {
        Self::IncompatibleArtifact {
            reason: reason.into(),
        }
    }

    /// Returns true for errors caused by a bad device token.
    pub fn is_invalid_device(&self) -> bool {
        matches!(self, Self::InvalidDevice { .. })
    }

    /// Returns true for errors raised because the effective device lacks a backend.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedParameter { .. } | Self::UnsupportedOperation { .. }
        )
    }
}

impl From<serde_json::Error> for DeviceError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io {
                reason: err.to_string(),
            }
        } else {
            Self::serialization(err.to_string())
        }
    }
}

impl From<std::io::Error> for DeviceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for selector, dispatch and artifact operations.
pub type Result<T> = std::result::Result<T, DeviceError>;
