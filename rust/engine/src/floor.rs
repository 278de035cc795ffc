// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Top-down floor map and its meter/pixel scale

use crate::error::{Error, Result};
use cctv_locate_geometry::Point2D;
use image::{Rgb, RgbImage};

/// Reference floor image plus its physical extent.
///
/// `meter_to_pixel = image width / floor width`. All projection math runs in
/// meters and converts at this boundary.
#[derive(Debug, Clone)]
pub struct FloorMap {
    image: RgbImage,
    width_m: f64,
    height_m: f64,
    meter_to_pixel: f64,
}

impl FloorMap {
    pub fn new(image: RgbImage, width_m: f64, height_m: f64) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::EmptyFloorImage);
        }
        if !(width_m.is_finite() && width_m > 0.0 && height_m.is_finite() && height_m > 0.0) {
            return Err(Error::InvalidFloorDimensions { width_m, height_m });
        }

        let meter_to_pixel = image.width() as f64 / width_m;
        Ok(Self {
            image,
            width_m,
            height_m,
            meter_to_pixel,
        })
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn width_m(&self) -> f64 {
        self.width_m
    }

    pub fn height_m(&self) -> f64 {
        self.height_m
    }

    pub fn meter_to_pixel(&self) -> f64 {
        self.meter_to_pixel
    }

    pub fn meters_to_pixels(&self, p: Point2D) -> Point2D {
        p.scale(self.meter_to_pixel)
    }

    pub fn pixels_to_meters(&self, p: Point2D) -> Point2D {
        p.scale(1.0 / self.meter_to_pixel)
    }

    /// Whether `p` lies in `[0, width) x [0, height)`
    pub fn contains(&self, p: Point2D) -> bool {
        0.0 <= p.x && p.x < self.width() as f64 && 0.0 <= p.y && p.y < self.height() as f64
    }

    /// Bilinear sample at a sub-pixel position, per channel.
    ///
    /// The upper neighbour is clamped to the last row/column, so sampling
    /// anywhere in `[0, width) x [0, height)` stays in bounds. Positions
    /// outside are clamped onto the image.
    ///
    /// Blended channels are rounded to the nearest level, not truncated, so a
    /// uniform region keeps its exact color at fractional positions.
    pub fn sample_bilinear(&self, p: Point2D) -> Rgb<u8> {
        let max_x = self.width() - 1;
        let max_y = self.height() - 1;

        let x0 = (p.x.floor().max(0.0) as u32).min(max_x);
        let y0 = (p.y.floor().max(0.0) as u32).min(max_y);
        let tx = (p.x - x0 as f64).clamp(0.0, 1.0);
        let ty = (p.y - y0 as f64).clamp(0.0, 1.0);
        let x1 = (x0 + 1).min(max_x);
        let y1 = (y0 + 1).min(max_y);

        let p00 = self.image.get_pixel(x0, y0).0;
        let p10 = self.image.get_pixel(x1, y0).0;
        let p01 = self.image.get_pixel(x0, y1).0;
        let p11 = self.image.get_pixel(x1, y1).0;

        let mut out = [0u8; 3];
        for c in 0..3 {
            let value = p00[c] as f64 * (1.0 - tx) * (1.0 - ty)
                + p10[c] as f64 * tx * (1.0 - ty)
                + p01[c] as f64 * (1.0 - tx) * ty
                + p11[c] as f64 * tx * ty;
            out[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> FloorMap {
        let mut img = RgbImage::new(4, 3);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgb([(x * 60) as u8, (y * 100) as u8, ((x + y) % 2 * 255) as u8]);
        }
        FloorMap::new(img, 2.0, 1.5).unwrap()
    }

    #[test]
    fn test_meter_to_pixel() {
        let floor = FloorMap::new(RgbImage::new(1600, 930), 160.0, 93.0).unwrap();
        assert_eq!(floor.meter_to_pixel(), 10.0);
        assert_eq!(
            floor.meters_to_pixels(Point2D::new(10.0, 2.5)),
            Point2D::new(100.0, 25.0)
        );
        assert_eq!(
            floor.pixels_to_meters(Point2D::new(100.0, 25.0)),
            Point2D::new(10.0, 2.5)
        );
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(matches!(
            FloorMap::new(RgbImage::new(0, 10), 10.0, 10.0),
            Err(Error::EmptyFloorImage)
        ));
        assert!(matches!(
            FloorMap::new(RgbImage::new(10, 10), 0.0, 10.0),
            Err(Error::InvalidFloorDimensions { .. })
        ));
        assert!(matches!(
            FloorMap::new(RgbImage::new(10, 10), 10.0, f64::NAN),
            Err(Error::InvalidFloorDimensions { .. })
        ));
    }

    #[test]
    fn test_contains_half_open() {
        let floor = checker();
        assert!(floor.contains(Point2D::new(0.0, 0.0)));
        assert!(floor.contains(Point2D::new(3.999, 2.999)));
        assert!(!floor.contains(Point2D::new(4.0, 1.0)));
        assert!(!floor.contains(Point2D::new(1.0, -0.001)));
    }

    #[test]
    fn test_bilinear_identity_at_integer_coordinates() {
        let floor = checker();
        for (x, y, px) in floor.image().enumerate_pixels() {
            assert_eq!(floor.sample_bilinear(Point2D::new(x as f64, y as f64)), *px);
        }
    }

    #[test]
    fn test_bilinear_blends_channels_independently() {
        let floor = checker();
        // Midway between (0,0) and (1,0): red 0..60, green 0, blue 0..255
        let p = floor.sample_bilinear(Point2D::new(0.5, 0.0));
        assert_eq!(p, Rgb([30, 0, 128]));
        // Centre of the 2x2 block at the origin
        let p = floor.sample_bilinear(Point2D::new(0.5, 0.5));
        assert_eq!(p, Rgb([30, 50, 128]));
    }

    #[test]
    fn test_bilinear_uniform_region_is_exact() {
        let color = Rgb([10, 20, 30]);
        let floor = FloorMap::new(RgbImage::from_pixel(8, 8, color), 1.0, 1.0).unwrap();
        for &(x, y) in &[(0.3, 0.7), (1.1, 5.9), (6.99, 0.01), (3.5, 3.5)] {
            assert_eq!(floor.sample_bilinear(Point2D::new(x, y)), color);
        }
    }

    #[test]
    fn test_bilinear_clamps_last_column() {
        let floor = checker();
        let edge = *floor.image().get_pixel(3, 1);
        assert_eq!(floor.sample_bilinear(Point2D::new(3.7, 1.0)), edge);
    }
}
