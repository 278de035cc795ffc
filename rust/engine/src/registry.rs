// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registered cameras and their synthesized view buffers

use crate::camera::CameraModel;
use image::{Rgb, RgbImage};
use rustc_hash::FxHashMap;

/// Background of a camera view before any rendering
pub const DEFAULT_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// A camera together with the buffer its view is rendered into
#[derive(Debug, Clone)]
pub struct RegisteredCamera {
    pub model: CameraModel,
    pub view: RgbImage,
}

impl RegisteredCamera {
    pub fn new(model: CameraModel, background: Rgb<u8>) -> Self {
        let view = RgbImage::from_pixel(model.frame_width(), model.frame_height(), background);
        Self { model, view }
    }
}

/// Cameras in registration order, addressable by their `index` field
#[derive(Debug, Clone, Default)]
pub struct CameraRegistry {
    cameras: Vec<RegisteredCamera>,
    positions: FxHashMap<i32, usize>,
}

impl CameraRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a camera, replacing any camera with the same index in place.
    ///
    /// Returns the replaced camera.
    pub fn insert(&mut self, camera: RegisteredCamera) -> Option<RegisteredCamera> {
        let index = camera.model.index();
        match self.positions.get(&index) {
            Some(&position) => Some(std::mem::replace(&mut self.cameras[position], camera)),
            None => {
                self.positions.insert(index, self.cameras.len());
                self.cameras.push(camera);
                None
            }
        }
    }

    pub fn get(&self, index: i32) -> Option<&RegisteredCamera> {
        self.positions.get(&index).map(|&position| &self.cameras[position])
    }

    pub fn get_mut(&mut self, index: i32) -> Option<&mut RegisteredCamera> {
        self.positions
            .get(&index)
            .map(|&position| &mut self.cameras[position])
    }

    pub fn contains(&self, index: i32) -> bool {
        self.positions.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Cameras in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, RegisteredCamera> {
        self.cameras.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, RegisteredCamera> {
        self.cameras.iter_mut()
    }

    /// Camera indices in registration order
    pub fn indices(&self) -> impl Iterator<Item = i32> + '_ {
        self.cameras.iter().map(|camera| camera.model.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraParams;
    use crate::floor::FloorMap;
    use cctv_locate_geometry::{Point2D, ZoneSet};

    fn camera(index: i32, focal_length: f64) -> RegisteredCamera {
        let floor = FloorMap::new(RgbImage::new(100, 100), 10.0, 10.0).unwrap();
        let params = CameraParams {
            index,
            frame_width: 32,
            frame_height: 24,
            focal_length,
            pan_degrees: 0.0,
            tilt_degrees: 30.0,
            height: 3.0,
            position: Point2D::new(1.0, 1.0),
        };
        let model = CameraModel::new(params, &ZoneSet::default(), &floor).unwrap();
        RegisteredCamera::new(model, DEFAULT_BACKGROUND)
    }

    #[test]
    fn test_lookup_by_index_not_position() {
        let mut registry = CameraRegistry::new();
        registry.insert(camera(10, 100.0));
        registry.insert(camera(3, 100.0));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.indices().collect::<Vec<_>>(), vec![10, 3]);
        assert_eq!(registry.get(3).unwrap().model.index(), 3);
        assert!(registry.contains(10));
        assert!(registry.get(0).is_none());
        assert!(!registry.contains(1));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut registry = CameraRegistry::new();
        registry.insert(camera(1, 100.0));
        registry.insert(camera(2, 100.0));
        let replaced = registry.insert(camera(1, 250.0)).unwrap();
        assert_eq!(replaced.model.focal_length(), 100.0);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.indices().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(registry.get(1).unwrap().model.focal_length(), 250.0);
    }

    #[test]
    fn test_view_starts_as_background() {
        let registered = camera(1, 100.0);
        assert_eq!(registered.view.dimensions(), (32, 24));
        assert!(registered.view.pixels().all(|p| *p == DEFAULT_BACKGROUND));
    }
}
