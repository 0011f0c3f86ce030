//! Run estimators on CPU or GPU and move fitted models between them.
//!
//! This is the facade crate; the implementation lives in [`devsel_core`].
//!
//! # Example
//! ```
//! use devsel::prelude::*;
//!
//! let selector = DeviceSelector::with_device(Device::Gpu);
//! assert_eq!(selector.global_device(), Device::Gpu);
//!
//! selector
//!     .with_device_type("cpu", || {
//!         assert_eq!(selector.effective_device(), Device::Cpu);
//!     })
//!     .unwrap();
//! ```

pub use devsel_core::{
    artifact, config, dispatch, effective_device, get_global_device_type, selector,
    set_global_device_type, using_device_type, with_device_type, Device, DeviceError,
    DeviceScope, DeviceSelector, IntoDevice, Result,
};

pub mod prelude {
    pub use devsel_core::prelude::*;
}
