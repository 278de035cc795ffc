// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera-eye view synthesis by resampling the floor map
//!
//! Each output pixel is resolved independently, so rows are rendered in
//! parallel with rayon; a worker only ever writes its own row.

use crate::camera::CameraModel;
use crate::error::{Error, Result};
use crate::floor::FloorMap;
use crate::visibility::VisibilityResolver;
use cctv_locate_geometry::{Point2D, ZoneSet};
use image::RgbImage;
use rayon::prelude::*;

/// Coverage of a rendered view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Pixels that observed a floor surface
    pub resolved: usize,
    pub total: usize,
}

impl RenderStats {
    pub fn coverage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.resolved as f64 / self.total as f64
        }
    }
}

pub struct ViewSynthesizer<'a> {
    floor: &'a FloorMap,
    resolver: VisibilityResolver<'a>,
}

impl<'a> ViewSynthesizer<'a> {
    pub fn new(floor: &'a FloorMap, zones: &'a ZoneSet) -> Self {
        Self {
            floor,
            resolver: VisibilityResolver::new(floor, zones),
        }
    }

    fn check_frame(camera: &CameraModel, view: &RgbImage) -> Result<()> {
        if view.dimensions() != (camera.frame_width(), camera.frame_height()) {
            return Err(Error::InvalidCamera {
                index: camera.index(),
                reason: format!(
                    "view buffer is {}x{}, frame is {}x{}",
                    view.width(),
                    view.height(),
                    camera.frame_width(),
                    camera.frame_height()
                ),
            });
        }
        Ok(())
    }

    /// Fill one row of RGB bytes; returns the number of resolved pixels.
    fn render_row(&self, camera: &CameraModel, row: u32, pixels: &mut [u8]) -> usize {
        let mut resolved = 0;
        for (col, rgb) in pixels.chunks_exact_mut(3).enumerate() {
            let camera_point = Point2D::new(col as f64, row as f64);
            if let Some(surface) = self.resolver.resolve(camera, camera_point) {
                rgb.copy_from_slice(&self.floor.sample_bilinear(surface.world_point).0);
                resolved += 1;
            }
        }
        resolved
    }

    /// Resample the floor map into `view` as seen by `camera`.
    ///
    /// Pixels that see no floor keep their previous value.
    pub fn render(&self, camera: &CameraModel, view: &mut RgbImage) -> Result<RenderStats> {
        Self::check_frame(camera, view)?;

        let row_len = camera.frame_width() as usize * 3;
        let buffer: &mut [u8] = &mut *view;
        let resolved: usize = buffer
            .par_chunks_mut(row_len)
            .enumerate()
            .map(|(row, pixels)| self.render_row(camera, row as u32, pixels))
            .sum();

        Ok(self.finish(camera, resolved))
    }

    /// Single-threaded variant of [`ViewSynthesizer::render`]
    pub fn render_sequential(&self, camera: &CameraModel, view: &mut RgbImage) -> Result<RenderStats> {
        Self::check_frame(camera, view)?;

        let row_len = camera.frame_width() as usize * 3;
        let buffer: &mut [u8] = &mut *view;
        let resolved: usize = buffer
            .chunks_mut(row_len)
            .enumerate()
            .map(|(row, pixels)| self.render_row(camera, row as u32, pixels))
            .sum();

        Ok(self.finish(camera, resolved))
    }

    fn finish(&self, camera: &CameraModel, resolved: usize) -> RenderStats {
        let stats = RenderStats {
            resolved,
            total: camera.frame_width() as usize * camera.frame_height() as usize,
        };
        tracing::debug!(
            camera = camera.index(),
            resolved = stats.resolved,
            total = stats.total,
            "View synthesized"
        );
        stats
    }
}
