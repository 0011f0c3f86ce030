//! Core types for running estimators on either CPU or GPU.
//!
//! This crate decides which device the next estimator operation runs on,
//! lets callers change that decision globally or for a scope, routes
//! operations to the matching code path, and moves fitted models between
//! devices through a device-independent artifact.
//!
//! # Key Concepts
//!
//! - **Global device**: process-wide default, GPU unless configured otherwise
//! - **Scoped override**: thread-local change of the effective device,
//!   reverted when its guard drops
//! - **Effective device**: innermost scope on the current thread, else the
//!   global device
//! - **Explicit dispatch**: an operation without a backend on the effective
//!   device is an error, never a silent fallback
//!
//! # Modules
//!
//! - [`core`]: the [`Device`] type and error types
//! - [`config`]: selector configuration
//! - [`selector`]: global device, scoped overrides and the free-function API
//! - [`dispatch`]: estimator capabilities and explicit dispatch
//! - [`artifact`]: cross-device model artifacts

pub mod artifact;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod selector;

// Re-export commonly used items at the crate root
pub use crate::core::{Device, DeviceError, IntoDevice, Result};
pub use selector::{
    effective_device, get_global_device_type, set_global_device_type, using_device_type,
    with_device_type, DeviceScope, DeviceSelector,
};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use devsel_core::prelude::*;
///
/// let selector = DeviceSelector::with_device(Device::Gpu);
/// selector.set_global_device("cpu").unwrap();
/// assert_eq!(selector.global_device(), Device::Cpu);
/// ```
pub mod prelude {
    pub use crate::artifact::{restore, CrossDeviceModel, HostArray, ModelArtifact};
    pub use crate::config::{SelectorConfig, SelectorConfigBuilder};
    pub use crate::core::{Device, DeviceError, IntoDevice, Result};
    pub use crate::dispatch::{
        DeviceSet, Dispatcher, Estimator, Operation, OperationSupport, ParamConstraint, Params,
    };
    pub use crate::selector::{
        effective_device, get_global_device_type, global_selector, set_global_device_type,
        using_device_type, with_device_type, DeviceScope, DeviceSelector,
    };
}
