//! Selector configuration.
//!
//! Controls the device a [`DeviceSelector`](crate::selector::DeviceSelector)
//! starts with and whether the `DEVSEL_DEVICE` environment variable may
//! override it.

use crate::core::device::Device;
use tracing::{debug, warn};

/// Environment variable consulted for the initial global device.
pub const DEVICE_ENV_VAR: &str = "DEVSEL_DEVICE";

/// Configuration used to build a device selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    /// Device used when nothing else is configured.
    pub default_device: Device,
    /// Whether `DEVSEL_DEVICE` may override `default_device`.
    pub read_env: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            // GPU keeps the historic behavior of estimators
            default_device: Device::Gpu,
            read_env: true,
        }
    }
}

impl SelectorConfig {
    /// Configuration that ignores the environment and starts on `device`.
    pub fn fixed(device: Device) -> Self {
        Self {
            default_device: device,
            read_env: false,
        }
    }

    /// Returns the device a new selector should start with.
    pub fn resolve_default_device(&self) -> Device {
        if !self.read_env {
            return self.default_device;
        }
        self.resolve_from(std::env::var(DEVICE_ENV_VAR).ok().as_deref())
    }

    /// Resolves the initial device from an optional override token.
    ///
    /// An invalid token is logged and ignored; selector construction never
    /// fails.
    pub fn resolve_from(&self, token: Option<&str>) -> Device {
        match token {
            None => self.default_device,
            Some(raw) => match Device::parse(raw) {
                Ok(device) => {
                    debug!(%device, "initial device taken from {}", DEVICE_ENV_VAR);
                    device
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        fallback = %self.default_device,
                        "ignoring {}",
                        DEVICE_ENV_VAR
                    );
                    self.default_device
                }
            },
        }
    }
}

/// Builder for creating a custom selector configuration.
pub struct SelectorConfigBuilder {
    config: SelectorConfig,
}

impl SelectorConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: SelectorConfig::default(),
        }
    }

    /// Set the device used when no override is present.
    pub fn default_device(mut self, device: Device) -> Self {
        self.config.default_device = device;
        self
    }

    /// Enable or disable the environment override.
    pub fn read_env(mut self, read_env: bool) -> Self {
        self.config.read_env = read_env;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SelectorConfig {
        self.config
    }
}

impl Default for SelectorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
