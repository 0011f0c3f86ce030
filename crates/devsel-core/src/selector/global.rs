//! Process-wide selector and its free-function interface.
//!
//! The process-wide selector is created on first use from
//! [`SelectorConfig::default`], so it starts on the GPU unless
//! `DEVSEL_DEVICE` says otherwise.

use super::{DeviceScope, DeviceSelector};
use crate::config::SelectorConfig;
use crate::core::device::{Device, IntoDevice};
use crate::core::error::Result;
use once_cell::sync::Lazy;

/// Selector shared by the whole process.
static GLOBAL_SELECTOR: Lazy<DeviceSelector> =
    Lazy::new(|| DeviceSelector::new(SelectorConfig::default()));

/// Get the process-wide selector.
pub fn global_selector() -> &'static DeviceSelector {
    &GLOBAL_SELECTOR
}

/// Returns the process-wide default device.
pub fn get_global_device_type() -> Device {
    GLOBAL_SELECTOR.global_device()
}

/// Replaces the process-wide default device.
///
/// Fails with [`DeviceError::InvalidDevice`](crate::DeviceError::InvalidDevice)
/// on an unknown token, leaving the default unchanged.
pub fn set_global_device_type(device: impl IntoDevice) -> Result<()> {
    GLOBAL_SELECTOR.set_global_device(device)
}

/// Overrides the effective device on this thread until the guard drops.
///
/// ```
/// use devsel_core::prelude::*;
///
/// fn predict_on_cpu() -> Result<Device> {
///     let _scope = using_device_type("cpu")?;
///     Ok(effective_device())
/// }
///
/// assert_eq!(predict_on_cpu().unwrap(), Device::Cpu);
/// ```
pub fn using_device_type(device: impl IntoDevice) -> Result<DeviceScope> {
    GLOBAL_SELECTOR.scope(device)
}

/// Runs `f` with `device` as the effective device on this thread.
pub fn with_device_type<R, F>(device: impl IntoDevice, f: F) -> Result<R>
where
    F: FnOnce() -> R,
{
    GLOBAL_SELECTOR.with_device_type(device, f)
}

/// Device the next operation on this thread runs on.
pub fn effective_device() -> Device {
    GLOBAL_SELECTOR.effective_device()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only scoped overrides here: they are thread-local, so parallel tests
    // cannot observe each other. Global mutation is covered by the
    // `test_global_default` integration test.
    #[test]
    fn test_scoped_override_on_global_selector() {
        let global = get_global_device_type();
        {
            let _scope = using_device_type(Device::Cpu).unwrap();
            assert_eq!(effective_device(), Device::Cpu);
            let inner = with_device_type(Device::Gpu, effective_device).unwrap();
            assert_eq!(inner, Device::Gpu);
            assert_eq!(effective_device(), Device::Cpu);
        }
        assert_eq!(effective_device(), global);
    }

    #[test]
    fn test_global_selector_is_shared() {
        assert!(std::ptr::eq(global_selector(), global_selector()));
    }
}
