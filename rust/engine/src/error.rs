// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration failures.
///
/// Geometric outcomes such as "not visible" are not errors; they are
/// reported through `Option` results.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid floor dimensions: {width_m} x {height_m} m")]
    InvalidFloorDimensions { width_m: f64, height_m: f64 },

    #[error("Floor image is empty")]
    EmptyFloorImage,

    #[error("Unknown camera index: {0}")]
    UnknownCamera(i32),

    #[error("Invalid camera {index}: {reason}")]
    InvalidCamera { index: i32, reason: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] cctv_locate_geometry::Error),
}
