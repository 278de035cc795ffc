// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pose matrices for a pan/tilt camera
//!
//! Camera axes: x points right, y points down, z is the viewing direction.
//! The floor is the x/z plane and y grows downward from the camera, so a
//! point below the camera has a positive y component.

use crate::error::{Error, Result};
use nalgebra::Matrix3;

/// Rotation about the vertical (y) axis.
///
/// Maps floor-aligned axes into the panned camera frame.
pub fn pan_rotation(angle: f64) -> Matrix3<f64> {
    let (sin, cos) = angle.sin_cos();
    Matrix3::new(
        cos, 0.0, -sin,
        0.0, 1.0, 0.0,
        sin, 0.0, cos,
    )
}

/// Rotation about the horizontal (x) axis.
///
/// A positive angle tips the viewing direction below the horizon.
pub fn tilt_rotation(angle: f64) -> Matrix3<f64> {
    let (sin, cos) = angle.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, cos, -sin,
        0.0, sin, cos,
    )
}

/// Pinhole intrinsic matrix with square pixels and no skew
pub fn intrinsic_matrix(focal_length: f64, cx: f64, cy: f64) -> Matrix3<f64> {
    Matrix3::new(
        focal_length, 0.0, cx,
        0.0, focal_length, cy,
        0.0, 0.0, 1.0,
    )
}

/// Invert a 3x3 matrix, failing on a singular input.
pub fn invert(matrix: &Matrix3<f64>, what: &'static str) -> Result<Matrix3<f64>> {
    matrix.try_inverse().ok_or(Error::SingularMatrix(what))
}
