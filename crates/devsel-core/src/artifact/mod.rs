//! Device-independent model artifacts.
//!
//! A [`ModelArtifact`] is a snapshot of a fitted estimator that does not
//! depend on the device it was trained on: hyperparameters are stored as
//! JSON values and fitted state as host arrays. A model fitted on the GPU
//! can therefore be written out and loaded for inference on the CPU, and
//! the other way around, for estimators that declare inference support on
//! the target device.

pub mod host_array;

pub use host_array::HostArray;

use crate::core::device::Device;
use crate::core::error::{DeviceError, Result};
use crate::dispatch::{Estimator, Operation, Params};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use tracing::debug;

/// Artifact layout version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

/// Serialized snapshot of a fitted estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Layout version, [`FORMAT_VERSION`] when written by this crate
    pub format_version: u32,
    /// Name of the estimator that produced the artifact
    pub estimator: String,
    /// Device the estimator was fitted on
    pub trained_on: Device,
    /// Scalar hyperparameters
    #[serde(default)]
    pub params: Params,
    /// Fitted state, keyed by field name
    #[serde(default)]
    pub arrays: BTreeMap<String, HostArray>,
}

impl ModelArtifact {
    /// Creates an empty artifact for `estimator` fitted on `trained_on`.
    pub fn new<S: Into<String>>(estimator: S, trained_on: Device) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            estimator: estimator.into(),
            trained_on,
            params: Params::new(),
            arrays: BTreeMap::new(),
        }
    }

    /// Adds or replaces one hyperparameter.
    pub fn with_param<S: Into<String>, V: Into<Value>>(mut self, name: S, value: V) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds or replaces every hyperparameter in `params`.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }

    /// Adds or replaces the fitted array `name`.
    pub fn with_array<S: Into<String>>(mut self, name: S, array: HostArray) -> Self {
        self.arrays.insert(name.into(), array);
        self
    }

    /// Hyperparameter `name`, if recorded.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Fitted array `name`, or an error naming the missing field.
    pub fn array(&self, name: &str) -> Result<&HostArray> {
        self.arrays.get(name).ok_or_else(|| {
            DeviceError::incompatible_artifact(format!(
                "{} artifact has no array '{}'",
                self.estimator, name
            ))
        })
    }

    /// Whether loading on `device` crosses device types.
    pub fn is_cross_device(&self, device: Device) -> bool {
        self.trained_on != device
    }

    /// Checks version and array shapes.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(DeviceError::incompatible_artifact(format!(
                "unsupported format version {} (expected {})",
                self.format_version, FORMAT_VERSION
            )));
        }
        for (name, array) in &self.arrays {
            array.validate().map_err(|err| {
                DeviceError::incompatible_artifact(format!("array '{}': {}", name, err))
            })?;
        }
        Ok(())
    }

    /// Checks that `estimator` may load this artifact for inference on `device`.
    pub fn check_loadable<E>(&self, estimator: &E, device: Device) -> Result<()>
    where
        E: Estimator + ?Sized,
    {
        if estimator.name() != self.estimator {
            return Err(DeviceError::incompatible_artifact(format!(
                "artifact was produced by {}, not {}",
                self.estimator,
                estimator.name()
            )));
        }
        if !estimator.support().supports_inference_on(device) {
            return Err(DeviceError::unsupported_operation(
                estimator.name(),
                Operation::Predict,
                device,
            ));
        }
        Ok(())
    }

    /// Encodes the artifact as compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encodes the artifact as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes and validates an artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Writes the artifact as JSON to `writer`.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        debug!(estimator = %self.estimator, trained_on = %self.trained_on, "wrote model artifact");
        Ok(())
    }

    /// Reads and validates an artifact from `reader`.
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let artifact: Self = serde_json::from_reader(reader)?;
        artifact.validate()?;
        debug!(estimator = %artifact.estimator, trained_on = %artifact.trained_on, "read model artifact");
        Ok(artifact)
    }
}

/// A fitted estimator that can move between devices through an artifact.
pub trait CrossDeviceModel: Estimator + Sized {
    /// Snapshot of the fitted state.
    fn export(&self) -> Result<ModelArtifact>;

    /// Rebuilds the estimator from `artifact` for use on `device`.
    fn import(artifact: &ModelArtifact, device: Device) -> Result<Self>;
}

/// Validates `artifact` and rebuilds a model from it for inference on `device`.
pub fn restore<M: CrossDeviceModel>(artifact: &ModelArtifact, device: Device) -> Result<M> {
    artifact.validate()?;
    let model = M::import(artifact, device)?;
    artifact.check_loadable(&model, device)?;
    if artifact.is_cross_device(device) {
        debug!(
            estimator = %artifact.estimator,
            from = %artifact.trained_on,
            to = %device,
            "restored model on a different device"
        );
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::OperationSupport;
    use nalgebra::DVector;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Centroids {
        support: OperationSupport,
    }

    impl Estimator for Centroids {
        fn name(&self) -> &str {
            "Centroids"
        }

        fn support(&self) -> &OperationSupport {
            &self.support
        }
    }

    fn sample() -> ModelArtifact {
        ModelArtifact::new("Centroids", Device::Gpu)
            .with_param("n_clusters", 2)
            .with_array(
                "centers",
                HostArray::new(vec![2, 2], vec![0.0, 1.0, 2.0, 3.0]).unwrap(),
            )
    }

    #[test]
    fn test_json_round_trip() {
        let artifact = sample();
        let json = artifact.to_json().unwrap();
        let decoded = ModelArtifact::from_json(&json).unwrap();
        assert_eq!(decoded, artifact);
        assert_eq!(decoded.param("n_clusters"), Some(&json!(2)));
        assert!(decoded.is_cross_device(Device::Cpu));
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{"format_version":1,"estimator":"Centroids","trained_on":"cpu"}"#;
        let artifact = ModelArtifact::from_json(json).unwrap();
        assert!(artifact.params.is_empty());
        assert!(artifact.array("centers").is_err());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut artifact = sample();
        artifact.format_version = 99;
        let json = serde_json::to_string(&artifact).unwrap();

        let err = ModelArtifact::from_json(&json).unwrap_err();
        assert!(matches!(err, DeviceError::IncompatibleArtifact { .. }));
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn test_rejects_malformed_array() {
        let mut artifact = sample();
        artifact.arrays.insert(
            "bias".to_string(),
            HostArray {
                shape: vec![3],
                data: vec![1.0],
            },
        );
        let err = artifact.validate().unwrap_err();
        assert!(err.to_string().contains("bias"));
    }

    #[test]
    fn test_rejects_bad_json() {
        let err = ModelArtifact::from_json("{\"format_version\": 1").unwrap_err();
        assert!(matches!(err, DeviceError::Serialization { .. }));

        let err = ModelArtifact::from_json(
            r#"{"format_version":1,"estimator":"Centroids","trained_on":"tpu"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DeviceError::Serialization { .. }));
    }

    #[test]
    fn test_writer_and_reader() {
        let artifact = sample().with_array(
            "weights",
            HostArray::from_vector(&DVector::from_vec(vec![1.0, 2.0])),
        );
        let mut buffer = Vec::new();
        artifact.write_to(&mut buffer).unwrap();

        let decoded = ModelArtifact::read_from(buffer.as_slice()).unwrap();
        assert_eq!(decoded, artifact);
    }

    #[test]
    fn test_check_loadable() {
        let artifact = sample();
        let gpu_only = Centroids {
            support: OperationSupport::new()
                .with(Operation::Fit, &[Device::Gpu])
                .with(Operation::Predict, &[Device::Gpu]),
        };
        let portable = Centroids {
            support: OperationSupport::new()
                .with(Operation::Fit, &[Device::Gpu])
                .with(Operation::Predict, &Device::ALL),
        };

        assert!(artifact.check_loadable(&portable, Device::Cpu).is_ok());
        assert!(artifact.check_loadable(&gpu_only, Device::Gpu).is_ok());
        let err = artifact.check_loadable(&gpu_only, Device::Cpu).unwrap_err();
        assert_eq!(
            err,
            DeviceError::unsupported_operation("Centroids", "predict", "cpu")
        );

        let other = ModelArtifact::new("Regressor", Device::Gpu);
        assert!(matches!(
            other.check_loadable(&portable, Device::Cpu),
            Err(DeviceError::IncompatibleArtifact { .. })
        ));
    }
}
