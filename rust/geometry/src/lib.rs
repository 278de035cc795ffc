// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CCTV-Locate Geometry
//!
//! Floor-plane primitives, pan/tilt pose matrices and altitude zones,
//! built on nalgebra.

pub mod draft;
pub mod error;
pub mod rotation;
pub mod types;
pub mod zone;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix3, Vector3};

pub use draft::{DraftEvent, ZoneDraft};
pub use error::{Error, Result};
pub use rotation::{intrinsic_matrix, invert, pan_rotation, tilt_rotation};
pub use types::{Pixel, Point2D};
pub use zone::{convex_hull, Zone, ZoneHits, ZoneSet};
