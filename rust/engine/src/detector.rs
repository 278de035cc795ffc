// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Location queries between the floor map and registered cameras
//!
//! `LocationDetector` owns the static configuration (floor map, zones,
//! cameras) and answers queries against it. Queries take `&self`; adding
//! cameras and rendering take `&mut self`, so writers are serialized by the
//! borrow checker.

use crate::camera::{CameraModel, CameraOverlay, CameraParams};
use crate::error::{Error, Result};
use crate::floor::FloorMap;
use crate::overlay;
use crate::registry::{CameraRegistry, RegisteredCamera, DEFAULT_BACKGROUND};
use crate::scene::SceneConfig;
use crate::synth::{RenderStats, ViewSynthesizer};
use crate::visibility::{VisibilityResolver, VisibleSurface};
use cctv_locate_geometry::{Pixel, Point2D, ZoneSet};
use image::{Rgb, RgbImage};
use std::path::Path;

/// Where a floor event shows up in one camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSighting {
    pub camera: i32,
    pub pixel: Pixel,
    /// Whether the pixel lies inside the camera frame
    pub in_frame: bool,
}

#[derive(Debug, Clone)]
pub struct LocationDetector {
    floor: FloorMap,
    zones: ZoneSet,
    cameras: CameraRegistry,
    background: Rgb<u8>,
}

impl LocationDetector {
    pub fn new(floor: FloorMap, zones: ZoneSet) -> Self {
        Self {
            floor,
            zones,
            cameras: CameraRegistry::new(),
            background: DEFAULT_BACKGROUND,
        }
    }

    /// Background for camera views. Views of cameras already registered are
    /// cleared to it.
    pub fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.background = background;
        for camera in self.cameras.iter_mut() {
            for px in camera.view.pixels_mut() {
                *px = background;
            }
        }
        self
    }

    /// Build the floor map from `image` and register every configured camera
    pub fn from_scene(scene: &SceneConfig, image: RgbImage) -> Result<Self> {
        let floor = FloorMap::new(image, scene.floor.width_m, scene.floor.height_m)?;
        let mut detector = Self::new(floor, scene.zone_set()?);
        for params in &scene.cameras {
            detector.set_camera(params.clone())?;
        }
        tracing::info!(
            zones = detector.zones.len(),
            cameras = detector.cameras.len(),
            meter_to_pixel = detector.floor.meter_to_pixel(),
            "Scene loaded"
        );
        Ok(detector)
    }

    /// Decode the floor image at `floor_path` and build the scene on it
    pub fn open<P: AsRef<Path>>(scene: &SceneConfig, floor_path: P) -> Result<Self> {
        let image = image::open(floor_path)?.to_rgb8();
        Self::from_scene(scene, image)
    }

    pub fn floor(&self) -> &FloorMap {
        &self.floor
    }

    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    pub fn cameras(&self) -> &CameraRegistry {
        &self.cameras
    }

    /// Register a camera, replacing one with the same index.
    ///
    /// Returns the floor-map geometry for drawing the camera marker.
    pub fn set_camera(&mut self, params: CameraParams) -> Result<CameraOverlay> {
        let model = CameraModel::new(params, &self.zones, &self.floor)?;
        let overlay = model.overlay(&self.floor);
        let index = model.index();

        if self
            .cameras
            .insert(RegisteredCamera::new(model, self.background))
            .is_some()
        {
            tracing::debug!(camera = index, "Camera replaced");
        } else {
            tracing::debug!(camera = index, "Camera registered");
        }
        Ok(overlay)
    }

    pub fn camera(&self, index: i32) -> Result<&CameraModel> {
        self.cameras
            .get(index)
            .map(|camera| &camera.model)
            .ok_or(Error::UnknownCamera(index))
    }

    /// Last rendered view of a camera
    pub fn view(&self, index: i32) -> Result<&RgbImage> {
        self.cameras
            .get(index)
            .map(|camera| &camera.view)
            .ok_or(Error::UnknownCamera(index))
    }

    /// Synthesize the view of one camera into its buffer
    pub fn render(&mut self, index: i32) -> Result<RenderStats> {
        let Self {
            floor,
            zones,
            cameras,
            ..
        } = self;
        let camera = cameras.get_mut(index).ok_or(Error::UnknownCamera(index))?;
        let stats = ViewSynthesizer::new(floor, zones).render(&camera.model, &mut camera.view)?;

        tracing::info!(
            camera = index,
            resolved = stats.resolved,
            coverage = stats.coverage(),
            "Camera view rendered"
        );
        Ok(stats)
    }

    /// Render every camera in registration order
    pub fn render_all(&mut self) -> Result<Vec<(i32, RenderStats)>> {
        let indices: Vec<i32> = self.cameras.indices().collect();
        indices
            .into_iter()
            .map(|index| self.render(index).map(|stats| (index, stats)))
            .collect()
    }

    /// Camera pixel showing a floor position given in meters.
    ///
    /// The altitude comes from the first zone containing the position. The
    /// pixel may lie outside the camera frame.
    pub fn locate_in_camera(&self, world_m: Point2D, index: i32) -> Result<Pixel> {
        let camera = self.camera(index)?;
        let world_point = self.floor.meters_to_pixels(world_m);
        let altitude = self.zones.classify(world_point);
        Ok(camera.world_to_camera_pixel(world_point, altitude, &self.floor))
    }

    /// Visible surface behind a camera pixel
    pub fn resolve(&self, pixel: Pixel, index: i32) -> Result<Option<VisibleSurface>> {
        let camera = self.camera(index)?;
        Ok(VisibilityResolver::new(&self.floor, &self.zones).resolve(camera, pixel.to_point()))
    }

    /// Floor position in meters seen at a camera pixel, `None` if the pixel
    /// sees no part of the floor
    pub fn locate_on_world_map(&self, pixel: Pixel, index: i32) -> Result<Option<Point2D>> {
        Ok(self
            .resolve(pixel, index)?
            .map(|surface| self.floor.pixels_to_meters(surface.world_point)))
    }

    /// Project a floor event at `world_m` into every camera.
    ///
    /// The event sits on the highest surface at that position.
    pub fn locate_event(&self, world_m: Point2D) -> Vec<EventSighting> {
        let world_point = self.floor.meters_to_pixels(world_m);
        let altitude = self.zones.highest_altitude_at(world_point);

        self.cameras
            .iter()
            .map(|camera| {
                let model = &camera.model;
                let pixel = model.world_to_camera_pixel(world_point, altitude, &self.floor);
                EventSighting {
                    camera: model.index(),
                    pixel,
                    in_frame: pixel.is_within(model.frame_width(), model.frame_height()),
                }
            })
            .collect()
    }

    /// Floor map with zone outlines and camera markers
    pub fn floor_overlay(&self) -> RgbImage {
        let mut img = self.floor.image().clone();
        overlay::draw_zones_on_floor(&mut img, &self.zones);
        for camera in self.cameras.iter() {
            overlay::draw_camera_overlay(&mut img, &camera.model.overlay(&self.floor));
        }
        img
    }

    /// Rendered view of a camera with zone outlines projected on top
    pub fn annotated_view(&self, index: i32) -> Result<RgbImage> {
        let camera = self.cameras.get(index).ok_or(Error::UnknownCamera(index))?;
        let mut img = camera.view.clone();
        overlay::draw_zones_in_camera(&mut img, &camera.model, &self.zones, &self.floor);
        Ok(img)
    }
}
