//! Explicit dispatch of estimator operations to a device.
//!
//! The dispatcher consults a [`DeviceSelector`] for the effective device,
//! checks that the estimator has a backend for the requested operation and
//! hyperparameters on that device, and runs exactly one of the two
//! device-specific code paths. It never falls back to the other device:
//! a missing backend is reported as an error.

pub mod estimator;
pub mod operation;

pub use estimator::{Estimator, ParamConstraint, Params};
pub use operation::{DeviceSet, Operation, OperationSupport};

use crate::core::device::Device;
use crate::core::error::Result;
use crate::selector::{global_selector, DeviceSelector};
use tracing::{debug, warn};

/// Routes estimator operations to the CPU or GPU code path.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    selector: &'a DeviceSelector,
}

impl Dispatcher<'static> {
    /// Dispatcher driven by the process-wide selector.
    pub fn global() -> Self {
        Self::new(global_selector())
    }
}

impl Default for Dispatcher<'static> {
    fn default() -> Self {
        Self::global()
    }
}

impl<'a> Dispatcher<'a> {
    /// Creates a dispatcher driven by `selector`.
    pub fn new(selector: &'a DeviceSelector) -> Self {
        Self { selector }
    }

    /// Selector this dispatcher reads the effective device from.
    pub fn selector(&self) -> &'a DeviceSelector {
        self.selector
    }

    /// Checks that `estimator` can run `op` on `device`.
    ///
    /// Same outcome as [`Estimator::check_device`]; rejections are logged
    /// at `warn`.
    pub fn check<E>(&self, estimator: &E, op: Operation, device: Device) -> Result<()>
    where
        E: Estimator + ?Sized,
    {
        estimator.check_device(op, device).inspect_err(|err| {
            warn!(
                estimator = estimator.name(),
                operation = %op,
                %device,
                error = %err,
                "no backend on effective device"
            );
        })
    }

    /// Resolves the device `op` would run on right now, or why it can't.
    pub fn resolve<E>(&self, estimator: &E, op: Operation) -> Result<Device>
    where
        E: Estimator + ?Sized,
    {
        let device = self.selector.effective_device();
        self.check(estimator, op, device)?;
        Ok(device)
    }

    /// Runs `op` on the effective device.
    ///
    /// Exactly one of `cpu` and `gpu` is called, and only after the
    /// capability check succeeded.
    pub fn dispatch<E, R, C, G>(&self, estimator: &E, op: Operation, cpu: C, gpu: G) -> Result<R>
    where
        E: Estimator + ?Sized,
        C: FnOnce() -> Result<R>,
        G: FnOnce() -> Result<R>,
    {
        let device = self.resolve(estimator, op)?;
        debug!(estimator = estimator.name(), operation = %op, %device, "dispatching");
        match device {
            Device::Cpu => cpu(),
            Device::Gpu => gpu(),
        }
    }
}
