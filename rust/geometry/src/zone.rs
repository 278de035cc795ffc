// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Altitude zones on the floor map
//!
//! A zone is a closed polygon in floor-pixel space tagged with the altitude
//! of the surface it covers (a platform, a ramp, a mezzanine). Zones may
//! overlap; the first zone in set order wins for plain lookups.

use crate::error::{Error, Result};
use crate::types::Point2D;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Zones containing a single point, as `(altitude, zone position)` pairs
pub type ZoneHits = SmallVec<[(f64, usize); 4]>;

/// A floor polygon with the altitude of its surface in meters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Zone {
    pub altitude: f64,
    /// Vertices in floor pixels; the last vertex connects back to the first
    pub polygon: Vec<Point2D>,
}

impl Zone {
    pub fn new(altitude: f64, polygon: Vec<Point2D>) -> Self {
        Self { altitude, polygon }
    }

    /// Build a zone, rejecting NaN or infinite altitude and vertices.
    pub fn try_new(altitude: f64, polygon: Vec<Point2D>) -> Result<Self> {
        if !altitude.is_finite() {
            return Err(Error::NonFiniteCoordinate("zone altitude"));
        }
        if polygon.iter().any(|p| !p.is_finite()) {
            return Err(Error::NonFiniteCoordinate("zone polygon"));
        }
        Ok(Self::new(altitude, polygon))
    }

    /// Build a zone from raw authoring clicks, normalized to their convex hull.
    pub fn from_clicked_points(altitude: f64, points: &[Point2D]) -> Result<Self> {
        let hull = convex_hull(points);
        if hull.len() < 3 {
            return Err(Error::DegenerateZone(hull.len()));
        }
        Self::try_new(altitude, hull)
    }

    /// Polygons with fewer than three vertices cover nothing
    pub fn is_degenerate(&self) -> bool {
        self.polygon.len() <= 2
    }

    /// Even-odd point-in-polygon test.
    ///
    /// Edges use half-open y intervals so a ray through a shared vertex is
    /// counted exactly once.
    pub fn contains(&self, point: Point2D) -> bool {
        if self.is_degenerate() {
            return false;
        }

        let polygon = &self.polygon;
        let mut inside = false;
        let mut j = polygon.len() - 1;
        for i in 0..polygon.len() {
            let (pi, pj) = (polygon[i], polygon[j]);
            let straddles = (pi.y <= point.y && point.y < pj.y) || (pj.y <= point.y && point.y < pi.y);
            if straddles && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Ordered zone layout plus the altitude of the surrounding floor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ZoneSet {
    #[serde(default)]
    pub default_altitude: f64,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

impl ZoneSet {
    pub fn new(default_altitude: f64, zones: Vec<Zone>) -> Self {
        Self {
            default_altitude,
            zones,
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.zones.iter()
    }

    pub fn get(&self, position: usize) -> Option<&Zone> {
        self.zones.get(position)
    }

    /// Altitude of the first zone containing `point`, or the default altitude
    pub fn classify(&self, point: Point2D) -> f64 {
        self.zones
            .iter()
            .find(|zone| zone.contains(point))
            .map_or(self.default_altitude, |zone| zone.altitude)
    }

    /// Every zone containing `point`, in set order
    pub fn all_altitudes_containing(&self, point: Point2D) -> ZoneHits {
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, zone)| zone.contains(point))
            .map(|(i, zone)| (zone.altitude, i))
            .collect()
    }

    /// Whether `point` lies inside at least one zone
    pub fn is_zoned(&self, point: Point2D) -> bool {
        self.zones.iter().any(|zone| zone.contains(point))
    }

    /// Highest surface at `point`: the maximum over the containing zones and
    /// the default floor.
    pub fn highest_altitude_at(&self, point: Point2D) -> f64 {
        self.all_altitudes_containing(point)
            .iter()
            .fold(self.default_altitude, |best, &(altitude, _)| best.max(altitude))
    }
}

/// Convex hull by Andrew's monotone chain.
///
/// Returns the hull in counter-clockwise order (y up) without repeating the
/// first vertex. Collinear points on the hull boundary are dropped.
pub fn convex_hull(points: &[Point2D]) -> Vec<Point2D> {
    let mut sorted: Vec<Point2D> = points.iter().copied().filter(|p| p.is_finite()).collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    fn cross(o: Point2D, a: Point2D, b: Point2D) -> f64 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    }

    let mut hull: Vec<Point2D> = Vec::with_capacity(sorted.len() * 2);
    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}
