//! Execution device identifiers.
//!
//! A [`Device`] names one of the two execution paths an estimator can
//! take. User-facing APIs accept either the enum itself or one of the
//! textual tokens `"cpu"` / `"gpu"` through [`IntoDevice`].

use crate::core::error::{DeviceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Execution device for estimator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Host execution path
    Cpu,
    /// Accelerator execution path
    Gpu,
}

impl Device {
    /// Every recognized device, in declaration order.
    pub const ALL: [Device; 2] = [Device::Cpu, Device::Gpu];

    /// Canonical token for this device.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
        }
    }

    /// Whether this is the host path.
    pub fn is_cpu(&self) -> bool {
        matches!(self, Self::Cpu)
    }

    /// Whether this is the accelerator path.
    pub fn is_gpu(&self) -> bool {
        matches!(self, Self::Gpu)
    }

    /// Parses a device token.
    ///
    /// Matching ignores ASCII case and surrounding whitespace. Anything
    /// other than `cpu` or `gpu` is rejected.
    pub fn parse(token: &str) -> Result<Self> {
        let trimmed = token.trim();
        if trimmed.eq_ignore_ascii_case("cpu") {
            Ok(Self::Cpu)
        } else if trimmed.eq_ignore_ascii_case("gpu") {
            Ok(Self::Gpu)
        } else {
            Err(DeviceError::invalid_device(token))
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Conversion into a validated [`Device`].
///
/// Implemented for the enum itself and for string tokens, so selector
/// operations can be called as `set_global_device_type(Device::Cpu)` or
/// `set_global_device_type("cpu")`.
pub trait IntoDevice {
    /// Validates and converts, failing with `InvalidDevice` on a bad token.
    fn into_device(self) -> Result<Device>;
}

impl IntoDevice for Device {
    fn into_device(self) -> Result<Device> {
        Ok(self)
    }
}

impl IntoDevice for &Device {
    fn into_device(self) -> Result<Device> {
        Ok(*self)
    }
}

impl IntoDevice for &str {
    fn into_device(self) -> Result<Device> {
        Device::parse(self)
    }
}

impl IntoDevice for String {
    fn into_device(self) -> Result<Device> {
        Device::parse(&self)
    }
}

impl IntoDevice for &String {
    fn into_device(self) -> Result<Device> {
        Device::parse(self)
    }
}
