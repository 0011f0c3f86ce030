//! Device selection.
//!
//! A [`DeviceSelector`] answers one question: which device should the next
//! estimator operation run on? It holds a global device shared by every
//! thread and lets each thread override it for the duration of a scope.
//!
//! The effective device of a selector on a thread is the device of the
//! innermost scope that thread has open on it, or the global device when
//! the thread has no open scope.
//!
//! # Example
//! ```
//! use devsel_core::prelude::*;
//!
//! let selector = DeviceSelector::with_device(Device::Gpu);
//! {
//!     let _scope = selector.scope("cpu").unwrap();
//!     assert_eq!(selector.effective_device(), Device::Cpu);
//! }
//! assert_eq!(selector.effective_device(), Device::Gpu);
//! ```

pub mod global;
pub mod scope;

pub use global::{
    effective_device, get_global_device_type, global_selector, set_global_device_type,
    using_device_type, with_device_type,
};
pub use scope::DeviceScope;

use crate::config::SelectorConfig;
use crate::core::device::{Device, IntoDevice};
use crate::core::error::Result;
use parking_lot::RwLock;
use scope::SelectorId;
use tracing::debug;

/// Owner of a global device and the scoped overrides layered on top of it.
#[derive(Debug)]
pub struct DeviceSelector {
    id: SelectorId,
    global: RwLock<Device>,
    initial: Device,
    config: SelectorConfig,
}

impl DeviceSelector {
    /// Creates a selector whose global device comes from `config`.
    pub fn new(config: SelectorConfig) -> Self {
        let initial = config.resolve_default_device();
        debug!(device = %initial, "created device selector");
        Self {
            id: SelectorId::new(),
            global: RwLock::new(initial),
            initial,
            config,
        }
    }

    /// Creates a selector starting on `device`, ignoring the environment.
    pub fn with_device(device: Device) -> Self {
        Self::new(SelectorConfig::fixed(device))
    }

    /// Configuration this selector was built from.
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Global device resolved when the selector was created.
    pub fn initial_device(&self) -> Device {
        self.initial
    }

    /// Returns the global device. Never fails.
    pub fn global_device(&self) -> Device {
        *self.global.read()
    }

    /// Replaces the global device.
    ///
    /// The token is validated before anything changes, so an invalid
    /// token leaves the selector untouched.
    pub fn set_global_device(&self, device: impl IntoDevice) -> Result<()> {
        let device = device.into_device()?;
        let previous = std::mem::replace(&mut *self.global.write(), device);
        if previous != device {
            debug!(%previous, %device, "global device changed");
        }
        Ok(())
    }

    /// Restores the global device the selector was created with.
    ///
    /// The configuration is not resolved again, so a change to the
    /// environment after construction has no effect here.
    pub fn reset_global_device(&self) {
        let device = self.initial;
        *self.global.write() = device;
        debug!(%device, "global device reset");
    }

    /// Device the next operation on this thread should run on.
    pub fn effective_device(&self) -> Device {
        scope::innermost_device(self.id).unwrap_or_else(|| self.global_device())
    }

    /// Opens a scoped override on the current thread.
    ///
    /// The override lasts until the returned guard is dropped.
    pub fn scope(&self, device: impl IntoDevice) -> Result<DeviceScope> {
        let device = device.into_device()?;
        let previous = self.effective_device();
        Ok(DeviceScope::enter(self.id, device, previous))
    }

    /// Runs `f` with `device` as the effective device.
    pub fn with_device_type<R, F>(&self, device: impl IntoDevice, f: F) -> Result<R>
    where
        F: FnOnce() -> R,
    {
        let _scope = self.scope(device)?;
        Ok(f())
    }

    /// Number of scopes this thread currently has open on the selector.
    pub fn scope_depth(&self) -> usize {
        scope::depth(self.id)
    }
}

impl Default for DeviceSelector {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}
