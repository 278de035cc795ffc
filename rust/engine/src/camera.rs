// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Calibrated pan/tilt camera and its pinhole projection
//!
//! World axes follow the camera convention: y points down (height below the
//! camera), x runs along floor rows and z along floor columns. A floor
//! position `(fx, fy)` in meters therefore sits at world `(fy, h, fx)`.

use crate::error::{Error, Result};
use crate::floor::FloorMap;
use cctv_locate_geometry::{intrinsic_matrix, invert, pan_rotation, tilt_rotation, Pixel, Point2D, ZoneSet};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Substitute depth for an exact zero in the perspective divide
pub const PERSPECTIVE_EPSILON: f64 = 1e-7;

/// Length in floor pixels of the direction arrow drawn for a camera
pub const OVERLAY_ARROW_LENGTH: f64 = 135.0;

/// Calibration parameters for one camera, as supplied by configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraParams {
    /// Identifier, unique among registered cameras
    pub index: i32,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Focal length in pixels
    pub focal_length: f64,
    pub pan_degrees: f64,
    pub tilt_degrees: f64,
    /// Lens height above the surface the camera stands on, in meters
    pub height: f64,
    /// Floor position in meters
    pub position: Point2D,
}

impl CameraParams {
    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidCamera {
            index: self.index,
            reason: reason.to_string(),
        };

        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(invalid("frame size must be non-zero"));
        }
        if !(self.focal_length.is_finite() && self.focal_length > 0.0) {
            return Err(invalid("focal length must be positive"));
        }
        if ![self.pan_degrees, self.tilt_degrees, self.height].iter().all(|v| v.is_finite())
            || !self.position.is_finite()
        {
            return Err(invalid("pose contains a non-finite value"));
        }
        Ok(())
    }
}

/// Result of a forward projection before rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Sub-pixel camera coordinate
    pub pixel: Point2D,
    /// Depth along the viewing axis; non-positive means behind the camera
    pub depth: f64,
}

/// Floor-pixel geometry of a camera's direction marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraOverlay {
    /// Camera position in floor pixels
    pub position: Point2D,
    /// Tip of the viewing-direction arrow
    pub view_tip: Point2D,
    /// Tip of the left field-of-view edge
    pub left_tip: Point2D,
    /// Tip of the right field-of-view edge
    pub right_tip: Point2D,
}

/// A calibrated camera with its derived projection matrices.
///
/// Immutable once built; replace the camera to change its pose.
#[derive(Debug, Clone)]
pub struct CameraModel {
    params: CameraParams,
    pan: f64,
    tilt: f64,
    resting_altitude: f64,
    translation: Vector3<f64>,
    intrinsic: Matrix3<f64>,
    panning_to_camera: Matrix3<f64>,
    tilting_to_camera: Matrix3<f64>,
    to_world: Matrix3<f64>,
    world_to_image: Matrix3<f64>,
}

impl CameraModel {
    /// Derive the pose matrices and resolve the altitude the camera stands on
    pub fn new(params: CameraParams, zones: &ZoneSet, floor: &FloorMap) -> Result<Self> {
        params.validate()?;

        let pan = params.pan_degrees.to_radians();
        let tilt = params.tilt_degrees.to_radians();
        let cx = params.frame_width as f64 * 0.5;
        let cy = params.frame_height as f64 * 0.5;

        let intrinsic = intrinsic_matrix(params.focal_length, cx, cy);
        let panning_to_camera = pan_rotation(pan);
        let tilting_to_camera = tilt_rotation(tilt);
        let to_world = invert(&panning_to_camera, "panning rotation")?
            * invert(&tilting_to_camera, "tilting rotation")?;
        let world_to_image = intrinsic * tilting_to_camera * panning_to_camera;

        let translation = Vector3::new(params.position.y, 0.0, params.position.x);
        let resting_altitude = zones.classify(floor.meters_to_pixels(params.position));

        tracing::debug!(
            camera = params.index,
            pan_degrees = params.pan_degrees,
            tilt_degrees = params.tilt_degrees,
            resting_altitude,
            "Camera pose derived"
        );

        Ok(Self {
            params,
            pan,
            tilt,
            resting_altitude,
            translation,
            intrinsic,
            panning_to_camera,
            tilting_to_camera,
            to_world,
            world_to_image,
        })
    }

    pub fn index(&self) -> i32 {
        self.params.index
    }

    pub fn params(&self) -> &CameraParams {
        &self.params
    }

    pub fn frame_width(&self) -> u32 {
        self.params.frame_width
    }

    pub fn frame_height(&self) -> u32 {
        self.params.frame_height
    }

    pub fn focal_length(&self) -> f64 {
        self.params.focal_length
    }

    /// Pan angle in radians
    pub fn pan(&self) -> f64 {
        self.pan
    }

    /// Tilt angle in radians
    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    /// Altitude of the surface under the camera
    pub fn resting_altitude(&self) -> f64 {
        self.resting_altitude
    }

    pub fn intrinsic(&self) -> &Matrix3<f64> {
        &self.intrinsic
    }

    pub fn panning_to_camera(&self) -> &Matrix3<f64> {
        &self.panning_to_camera
    }

    pub fn tilting_to_camera(&self) -> &Matrix3<f64> {
        &self.tilting_to_camera
    }

    pub fn to_world(&self) -> &Matrix3<f64> {
        &self.to_world
    }

    /// Vertical distance from the lens down to a surface at `altitude`
    fn drop_to(&self, altitude: f64) -> f64 {
        self.params.height + self.resting_altitude - altitude
    }

    /// Project a floor-pixel point on a surface at `altitude` into the frame,
    /// keeping sub-pixel precision and depth.
    pub fn project(&self, world_point: Point2D, altitude: f64, floor: &FloorMap) -> Projection {
        let meters = floor.pixels_to_meters(world_point);
        let relative = Vector3::new(
            meters.y - self.translation.x,
            self.drop_to(altitude),
            meters.x - self.translation.z,
        );

        let p = self.world_to_image * relative;
        let depth = if p.z == 0.0 { PERSPECTIVE_EPSILON } else { p.z };
        Projection {
            pixel: Point2D::new(p.x / depth, p.y / depth),
            depth,
        }
    }

    /// Forward projection rounded to the nearest pixel.
    ///
    /// The pixel may fall outside the frame; that is a reportable outcome.
    pub fn world_to_camera_pixel(&self, world_point: Point2D, altitude: f64, floor: &FloorMap) -> Pixel {
        Pixel::round_from(self.project(world_point, altitude, floor).pixel)
    }

    /// Intersect the ray through `camera_point` with the horizontal plane at
    /// `altitude`, in floor pixels, without checking the floor bounds.
    ///
    /// `None` when the ray does not descend to the plane: it points at or
    /// above the horizon, or the plane lies above the lens.
    pub fn intersect_plane(&self, camera_point: Point2D, altitude: f64, floor: &FloorMap) -> Option<Point2D> {
        let cx = self.params.frame_width as f64 * 0.5;
        let cy = self.params.frame_height as f64 * 0.5;
        let (sin_tilt, cos_tilt) = self.tilt.sin_cos();
        let f = self.params.focal_length;

        let descent = f * sin_tilt + (camera_point.y - cy) * cos_tilt;
        let h = self.drop_to(altitude);
        if descent <= 0.0 || h < 0.0 {
            return None;
        }

        let scale = h / descent;
        let ray = Vector3::new((camera_point.x - cx) * scale, (camera_point.y - cy) * scale, f * scale);
        let world = self.to_world * ray + self.translation;
        Some(floor.meters_to_pixels(Point2D::new(world.z, world.x)))
    }

    /// Inverse projection: the floor pixel seen at `camera_point` if the
    /// surface there had `altitude`.
    ///
    /// `None` unless the intersection exists and lies on the floor image.
    pub fn camera_to_world_point(&self, camera_point: Point2D, altitude: f64, floor: &FloorMap) -> Option<Point2D> {
        self.intersect_plane(camera_point, altitude, floor)
            .filter(|p| floor.contains(*p))
    }

    /// Direction arrow and horizontal field-of-view edges on the floor map
    pub fn overlay(&self, floor: &FloorMap) -> CameraOverlay {
        let position = floor.meters_to_pixels(self.params.position);
        let axis = Vector3::new(0.0, 0.0, OVERLAY_ARROW_LENGTH);
        let half_fov = (self.params.frame_width as f64 * 0.5 / self.params.focal_length).atan();

        let tip = |camera_vector: Vector3<f64>| {
            let w = self.to_world * camera_vector;
            Point2D::new(position.x + w.z, position.y + w.x)
        };

        CameraOverlay {
            position,
            view_tip: tip(axis),
            left_tip: tip(pan_rotation(half_fov) * axis),
            right_tip: tip(pan_rotation(-half_fov) * axis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cctv_locate_geometry::Zone;
    use image::RgbImage;

    fn floor() -> FloorMap {
        FloorMap::new(RgbImage::new(1600, 930), 160.0, 93.0).unwrap()
    }

    fn params(pan: f64, tilt: f64, height: f64) -> CameraParams {
        CameraParams {
            index: 1,
            frame_width: 640,
            frame_height: 480,
            focal_length: 500.0,
            pan_degrees: pan,
            tilt_degrees: tilt,
            height,
            position: Point2D::new(0.0, 0.0),
        }
    }

    #[test]
    fn test_derived_matrices() {
        let floor = floor();
        let camera = CameraModel::new(params(45.0, 30.0, 50.0), &ZoneSet::default(), &floor).unwrap();
        assert_abs_diff_eq!(camera.pan(), std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
        assert_abs_diff_eq!(camera.intrinsic()[(0, 2)], 320.0);
        assert_abs_diff_eq!(camera.intrinsic()[(1, 2)], 240.0);
        let identity = camera.tilting_to_camera() * camera.panning_to_camera() * camera.to_world();
        assert_abs_diff_eq!(identity, Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let floor = floor();
        let zones = ZoneSet::default();
        let mut p = params(0.0, 30.0, 10.0);
        p.focal_length = 0.0;
        assert!(matches!(CameraModel::new(p, &zones, &floor), Err(Error::InvalidCamera { .. })));

        let mut p = params(0.0, 30.0, 10.0);
        p.frame_height = 0;
        assert!(CameraModel::new(p, &zones, &floor).is_err());

        let mut p = params(0.0, 30.0, 10.0);
        p.position = Point2D::new(f64::NAN, 0.0);
        assert!(CameraModel::new(p, &zones, &floor).is_err());
    }

    #[test]
    fn test_resting_altitude_from_zone() {
        let floor = floor();
        let platform = Zone::new(
            3.0,
            vec![
                Point2D::new(-50.0, -50.0),
                Point2D::new(50.0, -50.0),
                Point2D::new(50.0, 50.0),
                Point2D::new(-50.0, 50.0),
            ],
        );
        let zones = ZoneSet::new(0.25, vec![platform]);
        let on_platform = CameraModel::new(params(0.0, 30.0, 10.0), &zones, &floor).unwrap();
        assert_eq!(on_platform.resting_altitude(), 3.0);

        let mut p = params(0.0, 30.0, 10.0);
        p.position = Point2D::new(100.0, 50.0);
        let on_ground = CameraModel::new(p, &zones, &floor).unwrap();
        assert_eq!(on_ground.resting_altitude(), 0.25);
    }

    #[test]
    fn test_principal_ray_hits_expected_distance() {
        let floor = floor();
        let camera = CameraModel::new(params(0.0, 45.0, 20.0), &ZoneSet::default(), &floor).unwrap();
        // Looking along +x at 45 degrees down from 20 m: ground hit 20 m ahead
        let hit = camera
            .camera_to_world_point(Point2D::new(320.0, 240.0), 0.0, &floor)
            .unwrap();
        assert_abs_diff_eq!(hit.x, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_round_trip_sub_pixel() {
        let floor = floor();
        let camera = CameraModel::new(params(45.0, 30.0, 50.0), &ZoneSet::default(), &floor).unwrap();
        for &(x, y, altitude) in &[(600.0, 600.0, 0.0), (700.0, 450.0, 2.0), (520.0, 640.0, -1.5)] {
            let world = Point2D::new(x, y);
            let projection = camera.project(world, altitude, &floor);
            assert!(projection.depth > 0.0);
            let back = camera
                .camera_to_world_point(projection.pixel, altitude, &floor)
                .unwrap();
            assert_abs_diff_eq!(back.x, x, epsilon = 1e-6);
            assert_abs_diff_eq!(back.y, y, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_round_trip_rounded_pixel() {
        let floor = floor();
        let camera = CameraModel::new(params(45.0, 30.0, 50.0), &ZoneSet::default(), &floor).unwrap();
        let world = Point2D::new(600.0, 600.0);
        let pixel = camera.world_to_camera_pixel(world, 0.0, &floor);
        assert!(pixel.is_within(640, 480));

        let back = camera
            .camera_to_world_point(pixel.to_point(), 0.0, &floor)
            .unwrap();
        // Half a camera pixel at this range is a few floor pixels
        assert!(back.distance_to(&world) < 5.0, "{:?}", back);

        // And reprojecting lands on the same camera pixel, within one pixel
        let again = camera.world_to_camera_pixel(back, 0.0, &floor);
        assert!((again.x - pixel.x).abs() <= 1 && (again.y - pixel.y).abs() <= 1);
    }

    #[test]
    fn test_zero_depth_is_finite() {
        let floor = floor();
        // Untilted camera at floor level: a point level with the lens at the
        // side of the camera has zero depth
        let camera = CameraModel::new(params(0.0, 0.0, 0.0), &ZoneSet::default(), &floor).unwrap();
        let projection = camera.project(Point2D::new(0.0, 100.0), 0.0, &floor);
        assert_eq!(projection.depth, PERSPECTIVE_EPSILON);
        assert!(projection.pixel.x.is_finite() && projection.pixel.y.is_finite());
    }

    #[test]
    fn test_above_horizon_is_invalid() {
        let floor = floor();
        let camera = CameraModel::new(params(0.0, 10.0, 10.0), &ZoneSet::default(), &floor).unwrap();
        // f*sin(10deg) ~ 86.8 px above the centre row is the horizon
        assert!(camera.intersect_plane(Point2D::new(320.0, 100.0), 0.0, &floor).is_none());
        assert!(camera.intersect_plane(Point2D::new(320.0, 0.0), 0.0, &floor).is_none());
        assert!(camera.intersect_plane(Point2D::new(320.0, 200.0), 0.0, &floor).is_some());
    }

    #[test]
    fn test_plane_above_lens_is_invalid() {
        let floor = floor();
        let camera = CameraModel::new(params(0.0, 30.0, 10.0), &ZoneSet::default(), &floor).unwrap();
        assert!(camera.intersect_plane(Point2D::new(320.0, 240.0), 10.5, &floor).is_none());
        // Exactly at lens height the ray meets the plane at the camera itself
        let at_lens = camera.intersect_plane(Point2D::new(320.0, 240.0), 10.0, &floor).unwrap();
        assert_abs_diff_eq!(at_lens.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inverse_rejects_points_off_the_floor() {
        let floor = floor();
        // Looking away from the floor towards negative coordinates
        let camera = CameraModel::new(params(180.0, 30.0, 10.0), &ZoneSet::default(), &floor).unwrap();
        let centre = Point2D::new(320.0, 240.0);
        let hit = camera.intersect_plane(centre, 0.0, &floor).unwrap();
        assert!(hit.x < 0.0);
        assert!(camera.camera_to_world_point(centre, 0.0, &floor).is_none());
    }

    #[test]
    fn test_overlay_follows_pan() {
        let floor = floor();
        let mut p = params(0.0, 0.0, 10.0);
        p.position = Point2D::new(50.0, 40.0);
        let camera = CameraModel::new(p.clone(), &ZoneSet::default(), &floor).unwrap();
        let overlay = camera.overlay(&floor);
        assert_eq!(overlay.position, Point2D::new(500.0, 400.0));
        assert_abs_diff_eq!(overlay.view_tip.x, 500.0 + OVERLAY_ARROW_LENGTH, epsilon = 1e-9);
        assert_abs_diff_eq!(overlay.view_tip.y, 400.0, epsilon = 1e-9);
        // Field-of-view edges are symmetric about the view direction
        assert_abs_diff_eq!(overlay.left_tip.x, overlay.right_tip.x, epsilon = 1e-9);
        assert_abs_diff_eq!(overlay.left_tip.y - 400.0, 400.0 - overlay.right_tip.y, epsilon = 1e-9);

        p.pan_degrees = 90.0;
        let camera = CameraModel::new(p, &ZoneSet::default(), &floor).unwrap();
        let overlay = camera.overlay(&floor);
        assert_abs_diff_eq!(overlay.view_tip.x, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(overlay.view_tip.y, 400.0 + OVERLAY_ARROW_LENGTH, epsilon = 1e-9);
    }
}
