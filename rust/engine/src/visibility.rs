// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Which surface a camera pixel actually sees
//!
//! Every zone altitude (and the default floor) is a hypothesis for the
//! surface hit by the pixel's ray. A hypothesis holds when the ray meets
//! that plane on the floor map inside the matching region: inside the zone
//! for a zone altitude, outside every zone for the default floor. Among the
//! hypotheses that hold, the highest surface is the one closest to the
//! camera along the ray and occludes the rest.

use crate::camera::CameraModel;
use crate::floor::FloorMap;
use cctv_locate_geometry::{Point2D, ZoneSet};

/// The surface observed through one camera pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleSurface {
    /// Floor-pixel position of the observed point
    pub world_point: Point2D,
    /// Altitude of the observed surface
    pub altitude: f64,
    /// Position of the zone in the set, `None` for the default floor
    pub zone: Option<usize>,
}

/// Resolves camera pixels against a floor map and its zone layout
#[derive(Debug, Clone, Copy)]
pub struct VisibilityResolver<'a> {
    floor: &'a FloorMap,
    zones: &'a ZoneSet,
}

impl<'a> VisibilityResolver<'a> {
    pub fn new(floor: &'a FloorMap, zones: &'a ZoneSet) -> Self {
        Self { floor, zones }
    }

    /// Find the highest surface consistent with `camera_point`.
    ///
    /// Every zone is tested even when the default floor already qualifies, so
    /// an elevated zone that occludes the ground always wins. Equal altitudes
    /// keep the first candidate: the default floor, then zones in set order.
    ///
    /// `None` means the pixel sees nothing on the tracked floor (sky, walls,
    /// or off-map ground); it is not an error.
    pub fn resolve(&self, camera: &CameraModel, camera_point: Point2D) -> Option<VisibleSurface> {
        let default_altitude = self.zones.default_altitude;
        let mut best = camera
            .camera_to_world_point(camera_point, default_altitude, self.floor)
            .filter(|p| !self.zones.is_zoned(*p))
            .map(|world_point| VisibleSurface {
                world_point,
                altitude: default_altitude,
                zone: None,
            });

        for (position, zone) in self.zones.iter().enumerate() {
            if best.is_some_and(|b| b.altitude >= zone.altitude) {
                continue;
            }
            let Some(world_point) = camera.camera_to_world_point(camera_point, zone.altitude, self.floor) else {
                continue;
            };
            if zone.contains(world_point) {
                best = Some(VisibleSurface {
                    world_point,
                    altitude: zone.altitude,
                    zone: Some(position),
                });
            }
        }

        best
    }
}
