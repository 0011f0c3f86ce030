//! Dense host arrays stored inside model artifacts.

use crate::core::error::{DeviceError, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// A dense `f64` array in host memory, stored row-major.
///
/// Fitted state is always normalized to host arrays before it is written,
/// whichever device produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostArray {
    /// Extent of each axis
    pub shape: Vec<usize>,
    /// Elements in row-major order
    pub data: Vec<f64>,
}

impl HostArray {
    /// Creates an array, checking that `shape` matches `data`.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        let array = Self { shape, data };
        array.validate()?;
        Ok(array)
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array stores no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements implied by the shape.
    ///
    /// Fails when the product of the extents does not fit in `usize`.
    pub fn shape_len(&self) -> Result<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
            .ok_or_else(|| {
                DeviceError::incompatible_artifact(format!(
                    "shape {:?} overflows the addressable element count",
                    self.shape
                ))
            })
    }

    /// Checks that the shape and the element count agree.
    pub fn validate(&self) -> Result<()> {
        let expected = self.shape_len()?;
        if expected != self.data.len() {
            return Err(DeviceError::incompatible_artifact(format!(
                "array of shape {:?} holds {} elements, expected {}",
                self.shape,
                self.data.len(),
                expected
            )));
        }
        Ok(())
    }

    /// Copies a column vector into a 1-d array.
    pub fn from_vector(vector: &DVector<f64>) -> Self {
        Self {
            shape: vec![vector.len()],
            data: vector.as_slice().to_vec(),
        }
    }

    /// Copies a matrix into a 2-d row-major array.
    pub fn from_matrix(matrix: &DMatrix<f64>) -> Self {
        // nalgebra is column-major; the transpose's storage is our row-major order
        Self {
            shape: vec![matrix.nrows(), matrix.ncols()],
            data: matrix.transpose().as_slice().to_vec(),
        }
    }

    /// Rebuilds a column vector from a 1-d array.
    pub fn to_vector(&self) -> Result<DVector<f64>> {
        self.validate()?;
        if self.ndim() != 1 {
            return Err(DeviceError::incompatible_artifact(format!(
                "expected a 1-d array, got shape {:?}",
                self.shape
            )));
        }
        Ok(DVector::from_column_slice(&self.data))
    }

    /// Rebuilds a matrix from a 2-d row-major array.
    pub fn to_matrix(&self) -> Result<DMatrix<f64>> {
        self.validate()?;
        match self.shape.as_slice() {
            &[rows, cols] => Ok(DMatrix::from_row_slice(rows, cols, &self.data)),
            _ => Err(DeviceError::incompatible_artifact(format!(
                "expected a 2-d array, got shape {:?}",
                self.shape
            ))),
        }
    }
}
