// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static scene configuration: floor extent, zone layout and cameras

use crate::camera::CameraParams;
use crate::error::Result;
use cctv_locate_geometry::{Zone, ZoneSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Physical extent of the floor covered by the map image
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FloorDimensions {
    pub width_m: f64,
    pub height_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneConfig {
    pub floor: FloorDimensions,
    /// Altitude of the floor outside every zone
    #[serde(default)]
    pub default_altitude: f64,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub cameras: Vec<CameraParams>,
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validated zone layout.
    ///
    /// Non-finite zones are rejected; degenerate ones are kept (they never
    /// contain a point) but reported.
    pub fn zone_set(&self) -> Result<ZoneSet> {
        let mut zones = Vec::with_capacity(self.zones.len());
        for (position, zone) in self.zones.iter().enumerate() {
            let zone = Zone::try_new(zone.altitude, zone.polygon.clone())?;
            if zone.is_degenerate() {
                tracing::warn!(
                    zone = position,
                    vertices = zone.polygon.len(),
                    "Degenerate zone will never contain a point"
                );
            }
            zones.push(zone);
        }
        Ok(ZoneSet::new(self.default_altitude, zones))
    }
}
