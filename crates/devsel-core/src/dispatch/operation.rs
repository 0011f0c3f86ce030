//! Estimator operations and the devices that implement them.

use crate::core::device::Device;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An estimator entry point that can be dispatched to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Learn fitted state from training data
    Fit,
    /// Produce predictions from fitted state
    Predict,
    /// Map inputs through fitted state
    Transform,
    /// Fit, then transform the training data
    FitTransform,
    /// Evaluate fitted state against labeled data
    Score,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 5] = [
        Operation::Fit,
        Operation::Predict,
        Operation::Transform,
        Operation::FitTransform,
        Operation::Score,
    ];

    /// Operations that only read fitted state.
    pub fn is_inference(&self) -> bool {
        matches!(self, Self::Predict | Self::Transform | Self::Score)
    }

    /// Snake-case name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::Predict => "predict",
            Self::Transform => "transform",
            Self::FitTransform => "fit_transform",
            Self::Score => "score",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of devices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DeviceSet {
    cpu: bool,
    gpu: bool,
}

impl DeviceSet {
    /// No device.
    pub const NONE: DeviceSet = DeviceSet { cpu: false, gpu: false };
    /// CPU only.
    pub const CPU: DeviceSet = DeviceSet { cpu: true, gpu: false };
    /// GPU only.
    pub const GPU: DeviceSet = DeviceSet { cpu: false, gpu: true };
    /// Both devices.
    pub const BOTH: DeviceSet = DeviceSet { cpu: true, gpu: true };

    /// Builds a set from a list of devices.
    pub fn of(devices: &[Device]) -> Self {
        devices.iter().fold(Self::NONE, |set, &device| set.with(device))
    }

    /// Returns a copy of the set with `device` added.
    pub fn with(mut self, device: Device) -> Self {
        match device {
            Device::Cpu => self.cpu = true,
            Device::Gpu => self.gpu = true,
        }
        self
    }

    /// Whether `device` is in the set.
    pub fn contains(&self, device: Device) -> bool {
        match device {
            Device::Cpu => self.cpu,
            Device::Gpu => self.gpu,
        }
    }

    /// Whether the set holds no device.
    pub fn is_empty(&self) -> bool {
        !self.cpu && !self.gpu
    }

    /// Devices in either set.
    pub fn union(self, other: DeviceSet) -> Self {
        Self {
            cpu: self.cpu || other.cpu,
            gpu: self.gpu || other.gpu,
        }
    }

    /// Devices in the set, CPU first.
    pub fn iter(&self) -> impl Iterator<Item = Device> + '_ {
        Device::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl fmt::Display for DeviceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|d| d.as_str()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Which devices have a backend for each operation of an estimator.
///
/// Operations that were never declared have no backend anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationSupport {
    ops: BTreeMap<Operation, DeviceSet>,
}

impl OperationSupport {
    /// Creates an empty capability table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares every operation in `ops` as available on both devices.
    pub fn all_devices(ops: &[Operation]) -> Self {
        ops.iter()
            .fold(Self::new(), |support, &op| support.with(op, &Device::ALL))
    }

    /// Adds `devices` to the backends of `op`.
    pub fn with(mut self, op: Operation, devices: &[Device]) -> Self {
        let entry = self.ops.entry(op).or_default();
        *entry = entry.union(DeviceSet::of(devices));
        self
    }

    /// Devices with a backend for `op`.
    pub fn devices_for(&self, op: Operation) -> DeviceSet {
        self.ops.get(&op).copied().unwrap_or_default()
    }

    pub fn supports(&self, op: Operation, device: Device) -> bool {
        self.devices_for(op).contains(device)
    }

    /// Whether any inference operation runs on `device`.
    pub fn supports_inference_on(&self, device: Device) -> bool {
        self.ops
            .iter()
            .any(|(op, devices)| op.is_inference() && devices.contains(device))
    }

    /// Declared operations with at least one backend.
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        self.ops
            .iter()
            .filter(|(_, devices)| !devices.is_empty())
            .map(|(op, _)| *op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::FitTransform.to_string(), "fit_transform");
        assert_eq!(
            serde_json::to_string(&Operation::FitTransform).unwrap(),
            "\"fit_transform\""
        );
        assert!(Operation::Predict.is_inference());
        assert!(!Operation::Fit.is_inference());
    }

    #[test]
    fn test_device_set() {
        let set = DeviceSet::of(&[Device::Gpu]);
        assert_eq!(set, DeviceSet::GPU);
        assert!(set.contains(Device::Gpu));
        assert!(!set.contains(Device::Cpu));
        assert_eq!(set.union(DeviceSet::CPU), DeviceSet::BOTH);
        assert!(DeviceSet::NONE.is_empty());
        assert_eq!(DeviceSet::BOTH.to_string(), "{cpu, gpu}");
        assert_eq!(DeviceSet::BOTH.iter().collect::<Vec<_>>(), Device::ALL.to_vec());
    }

    #[test]
    fn test_operation_support() {
        let support = OperationSupport::new()
            .with(Operation::Fit, &[Device::Gpu])
            .with(Operation::Fit, &[Device::Cpu])
            .with(Operation::Transform, &[Device::Gpu]);

        assert_eq!(support.devices_for(Operation::Fit), DeviceSet::BOTH);
        assert!(support.supports(Operation::Transform, Device::Gpu));
        assert!(!support.supports(Operation::Transform, Device::Cpu));
        assert!(!support.supports(Operation::Predict, Device::Gpu));
        assert!(support.supports_inference_on(Device::Gpu));
        assert!(!support.supports_inference_on(Device::Cpu));
        assert_eq!(
            support.operations().collect::<Vec<_>>(),
            vec![Operation::Fit, Operation::Transform]
        );
    }

    #[test]
    fn test_all_devices() {
        let support = OperationSupport::all_devices(&[Operation::Fit, Operation::Predict]);
        for device in Device::ALL {
            assert!(support.supports(Operation::Fit, device));
            assert!(support.supports(Operation::Predict, device));
            assert!(!support.supports(Operation::Score, device));
        }
    }
}
