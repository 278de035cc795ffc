// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Visual overlays for calibration checking
//!
//! Camera markers and zone outlines on the floor map, and zone outlines
//! projected into synthesized camera views.

use crate::camera::{CameraModel, CameraOverlay};
use crate::floor::FloorMap;
use cctv_locate_geometry::{Point2D, ZoneDraft, ZoneSet};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

pub const CAMERA_COLOR: Rgb<u8> = Rgb([228, 7, 87]);
pub const ZONE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const DRAFT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Arrow head length relative to the arrow
const ARROW_TIP_RATIO: f64 = 0.1;

/// Clip a segment to the pixel rectangle of a `width` x `height` image
/// (Liang-Barsky).
pub fn clip_segment(a: Point2D, b: Point2D, width: u32, height: u32) -> Option<(Point2D, Point2D)> {
    if !a.is_finite() || !b.is_finite() || width == 0 || height == 0 {
        return None;
    }

    let x_max = (width - 1) as f64;
    let y_max = (height - 1) as f64;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [(-dx, a.x), (dx, x_max - a.x), (-dy, a.y), (dy, y_max - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        Point2D::new(a.x + t0 * dx, a.y + t0 * dy),
        Point2D::new(a.x + t1 * dx, a.y + t1 * dy),
    ))
}

/// Draw a segment `thickness` pixels wide; off-image parts are dropped.
pub fn draw_thick_line(img: &mut RgbImage, a: Point2D, b: Point2D, color: Rgb<u8>, thickness: u32) {
    let Some((a, b)) = clip_segment(a, b, img.width(), img.height()) else {
        return;
    };

    let half = (thickness.max(1) / 2) as i32;
    let odd = thickness.max(1) % 2;
    for oy in -half..half + odd as i32 {
        for ox in -half..half + odd as i32 {
            draw_line_segment_mut(
                img,
                ((a.x + ox as f64) as f32, (a.y + oy as f64) as f32),
                ((b.x + ox as f64) as f32, (b.y + oy as f64) as f32),
                color,
            );
        }
    }
}

/// Draw a closed polygon outline
pub fn draw_polygon_outline(img: &mut RgbImage, polygon: &[Point2D], color: Rgb<u8>, thickness: u32) {
    if polygon.len() < 2 {
        return;
    }
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        draw_thick_line(img, polygon[j], polygon[i], color, thickness);
        j = i;
    }
}

/// Filled dot marking a picked or located point
pub fn mark_point(img: &mut RgbImage, p: Point2D, radius: i32, color: Rgb<u8>) {
    if !p.is_finite() {
        return;
    }
    draw_filled_circle_mut(img, (p.x.round() as i32, p.y.round() as i32), radius, color);
}

/// Direction arrow and field-of-view edges of a camera on the floor map
pub fn draw_camera_overlay(img: &mut RgbImage, overlay: &CameraOverlay) {
    let origin = overlay.position;
    let tip = overlay.view_tip;
    draw_thick_line(img, origin, tip, CAMERA_COLOR, 4);

    let (dx, dy) = (tip.x - origin.x, tip.y - origin.y);
    let length = (dx * dx + dy * dy).sqrt();
    if length > 0.0 {
        let head = length * ARROW_TIP_RATIO;
        let angle = dy.atan2(dx);
        for side in [-1.0, 1.0] {
            let a = angle + side * std::f64::consts::FRAC_PI_6 + std::f64::consts::PI;
            let end = Point2D::new(tip.x + head * a.cos(), tip.y + head * a.sin());
            draw_thick_line(img, tip, end, CAMERA_COLOR, 4);
        }
    }

    draw_thick_line(img, origin, overlay.left_tip, CAMERA_COLOR, 3);
    draw_thick_line(img, origin, overlay.right_tip, CAMERA_COLOR, 3);
}

/// Zone outlines on the floor map
pub fn draw_zones_on_floor(img: &mut RgbImage, zones: &ZoneSet) {
    for zone in zones.iter().filter(|zone| !zone.is_degenerate()) {
        draw_polygon_outline(img, &zone.polygon, ZONE_COLOR, 5);
    }
}

/// Outline of a zone being authored: clicked vertices as dots joined in
/// click order, closed once the draft is closed.
pub fn draw_zone_draft(img: &mut RgbImage, draft: &ZoneDraft) {
    let points = draft.points();
    if draft.is_closed() {
        draw_polygon_outline(img, points, DRAFT_COLOR, 3);
    } else {
        for pair in points.windows(2) {
            draw_thick_line(img, pair[0], pair[1], DRAFT_COLOR, 3);
        }
    }
    for p in points {
        mark_point(img, *p, 3, MARKER_COLOR);
    }
}

/// Zone outlines projected into a camera view at each zone's altitude.
///
/// Edges with an endpoint behind the camera are skipped.
pub fn draw_zones_in_camera(img: &mut RgbImage, camera: &CameraModel, zones: &ZoneSet, floor: &FloorMap) {
    for zone in zones.iter().filter(|zone| !zone.is_degenerate()) {
        let projected: Vec<_> = zone
            .polygon
            .iter()
            .map(|p| camera.project(*p, zone.altitude, floor))
            .collect();

        let mut j = projected.len() - 1;
        for i in 0..projected.len() {
            let (a, b) = (projected[j], projected[i]);
            if a.depth > 0.0 && b.depth > 0.0 {
                draw_thick_line(img, a.pixel, b.pixel, ZONE_COLOR, 5);
            }
            j = i;
        }
    }
}
