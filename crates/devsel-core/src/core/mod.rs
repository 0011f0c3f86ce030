//! Core types shared by every other module.

pub mod device;
pub mod error;

pub use device::{Device, IntoDevice};
pub use error::{DeviceError, Result};
