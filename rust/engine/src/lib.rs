// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Altitude-aware location mapping between a floor map and CCTV cameras
//!
//! This crate provides:
//! 1. Forward and inverse pinhole projection for pan/tilt cameras at a given
//!    surface altitude
//! 2. Visibility resolution across overlapping elevated zones
//! 3. Camera-eye view synthesis by bilinear resampling of the floor map
//! 4. Bidirectional location queries and calibration overlays
//!
//! # Usage
//!
//! ```rust,ignore
//! use cctv_locate_engine::{LocationDetector, Point2D, SceneConfig};
//!
//! let scene = SceneConfig::load("scene.json")?;
//! let mut detector = LocationDetector::open(&scene, "floor.jpg")?;
//!
//! let pixel = detector.locate_in_camera(Point2D::new(10.0, 10.0), 1)?;
//! let seen = detector.locate_on_world_map(pixel, 1)?;
//! detector.render(1)?;
//! ```

pub mod camera;
pub mod detector;
pub mod error;
pub mod floor;
pub mod overlay;
pub mod registry;
pub mod scene;
pub mod synth;
pub mod visibility;

pub use camera::{CameraModel, CameraOverlay, CameraParams, Projection};
pub use detector::{EventSighting, LocationDetector};
pub use error::{Error, Result};
pub use floor::FloorMap;
pub use registry::{CameraRegistry, RegisteredCamera};
pub use scene::{FloorDimensions, SceneConfig};
pub use synth::{RenderStats, ViewSynthesizer};
pub use visibility::{VisibilityResolver, VisibleSurface};

pub use cctv_locate_geometry::{Pixel, Point2D, Zone, ZoneSet};
