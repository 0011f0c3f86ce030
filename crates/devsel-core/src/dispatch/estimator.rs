//! The contract estimators expose to the dispatcher.

use super::operation::{DeviceSet, Operation, OperationSupport};
use crate::core::device::Device;
use crate::core::error::{DeviceError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Hyperparameters of an estimator, keyed by name.
pub type Params = BTreeMap<String, Value>;

/// A hyperparameter value that is only implemented on some devices.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamConstraint {
    /// Hyperparameter name
    pub parameter: String,
    /// Constrained value
    pub value: Value,
    /// Devices with an implementation for this value
    pub devices: DeviceSet,
}

impl ParamConstraint {
    /// Declares that `parameter = value` only has a backend on `devices`.
    pub fn only_on<P, V>(parameter: P, value: V, devices: &[Device]) -> Self
    where
        P: Into<String>,
        V: Into<Value>,
    {
        Self {
            parameter: parameter.into(),
            value: value.into(),
            devices: DeviceSet::of(devices),
        }
    }

    /// Whether `params` selects the constrained value.
    pub fn applies_to(&self, params: &Params) -> bool {
        params.get(&self.parameter) == Some(&self.value)
    }

    /// Whether `params` can run on `device` as far as this constraint goes.
    pub fn permits(&self, params: &Params, device: Device) -> bool {
        !self.applies_to(params) || self.devices.contains(device)
    }
}

/// An estimator whose operations can run on more than one device.
///
/// The estimator reports what it can do; the
/// [`Dispatcher`](super::Dispatcher) decides where it runs.
pub trait Estimator {
    /// Estimator name used in errors and logs.
    fn name(&self) -> &str;

    /// Devices with a backend, per operation.
    fn support(&self) -> &OperationSupport;

    /// Current hyperparameters.
    fn params(&self) -> Params {
        Params::new()
    }

    /// Hyperparameter values restricted to some devices.
    fn param_constraints(&self) -> &[ParamConstraint] {
        &[]
    }

    /// Checks that `op` has a backend on `device` with the current
    /// hyperparameters.
    ///
    /// Fails with `UnsupportedOperation` when `op` has no backend on
    /// `device`, and with `UnsupportedParameter` naming the first
    /// hyperparameter value that is only implemented elsewhere.
    fn check_device(&self, op: Operation, device: Device) -> Result<()> {
        if !self.support().supports(op, device) {
            return Err(DeviceError::unsupported_operation(self.name(), op, device));
        }
        let params = self.params();
        match self
            .param_constraints()
            .iter()
            .find(|constraint| !constraint.permits(&params, device))
        {
            Some(constraint) => Err(DeviceError::unsupported_parameter(
                self.name(),
                op,
                device,
                constraint.parameter.as_str(),
                &constraint.value,
            )),
            None => Ok(()),
        }
    }

    /// Whether `op` could run on `device` with the current hyperparameters.
    fn can_run(&self, op: Operation, device: Device) -> bool {
        self.check_device(op, device).is_ok()
    }
}
