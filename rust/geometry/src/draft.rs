// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone authoring session state
//!
//! Collects clicked floor points until the user clicks near the first point
//! again, then closes the polygon into its convex hull. The UI that feeds the
//! clicks lives outside this crate.

use crate::error::{Error, Result};
use crate::types::Point2D;
use crate::zone::{convex_hull, Zone};

/// Squared pixel distance from the first vertex that closes a polygon
pub const CLOSE_DISTANCE_SQ: f64 = 50.0;

/// Outcome of feeding one click into a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftEvent {
    /// The point was appended to the open outline
    Added,
    /// The outline is closed; further clicks are ignored
    Closed,
}

#[derive(Debug, Clone, Default)]
pub struct ZoneDraft {
    points: Vec<Point2D>,
    closed: bool,
}

impl ZoneDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn closes_outline(&self, point: Point2D) -> bool {
        self.points.len() > 2 && self.points[0].squared_distance_to(&point) <= CLOSE_DISTANCE_SQ
    }

    pub fn click(&mut self, point: Point2D) -> DraftEvent {
        if self.closed {
            return DraftEvent::Closed;
        }
        if self.closes_outline(point) {
            self.points = convex_hull(&self.points);
            self.closed = true;
            return DraftEvent::Closed;
        }
        self.points.push(point);
        DraftEvent::Added
    }

    /// Start over with an empty outline
    pub fn clear(&mut self) {
        self.points.clear();
        self.closed = false;
    }

    /// Turn the closed outline into a zone at `altitude`.
    ///
    /// An open outline is normalized to its hull first.
    pub fn finish(self, altitude: f64) -> Result<Zone> {
        let polygon = if self.closed {
            self.points
        } else {
            convex_hull(&self.points)
        };
        if polygon.len() < 3 {
            return Err(Error::DegenerateZone(polygon.len()));
        }
        Zone::try_new(altitude, polygon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_near_start_closes() {
        let mut draft = ZoneDraft::new();
        assert_eq!(draft.click(Point2D::new(0.0, 0.0)), DraftEvent::Added);
        assert_eq!(draft.click(Point2D::new(100.0, 0.0)), DraftEvent::Added);
        assert_eq!(draft.click(Point2D::new(50.0, 50.0)), DraftEvent::Added);
        assert_eq!(draft.click(Point2D::new(100.0, 100.0)), DraftEvent::Added);
        assert_eq!(draft.click(Point2D::new(0.0, 100.0)), DraftEvent::Added);
        // Within sqrt(50) of the first vertex
        assert_eq!(draft.click(Point2D::new(5.0, 5.0)), DraftEvent::Closed);
        assert!(draft.is_closed());
        // Interior point dropped by the hull
        assert_eq!(draft.points().len(), 4);
        assert_eq!(draft.click(Point2D::new(500.0, 500.0)), DraftEvent::Closed);

        let zone = draft.finish(2.5).unwrap();
        assert_eq!(zone.altitude, 2.5);
        assert!(zone.contains(Point2D::new(50.0, 50.0)));
    }

    #[test]
    fn test_too_few_points_do_not_close() {
        let mut draft = ZoneDraft::new();
        draft.click(Point2D::new(0.0, 0.0));
        draft.click(Point2D::new(40.0, 0.0));
        assert_eq!(draft.click(Point2D::new(1.0, 1.0)), DraftEvent::Added);
        assert!(!draft.is_closed());
    }

    #[test]
    fn test_finish_degenerate_draft() {
        let mut draft = ZoneDraft::new();
        draft.click(Point2D::new(0.0, 0.0));
        draft.click(Point2D::new(10.0, 10.0));
        assert_eq!(draft.finish(1.0), Err(Error::DegenerateZone(2)));
    }

    #[test]
    fn test_clear_reopens() {
        let mut draft = ZoneDraft::new();
        for p in [(0.0, 0.0), (30.0, 0.0), (30.0, 30.0), (1.0, 1.0)] {
            draft.click(Point2D::new(p.0, p.1));
        }
        assert!(draft.is_closed());
        draft.clear();
        assert!(!draft.is_closed());
        assert!(draft.points().is_empty());
    }
}
