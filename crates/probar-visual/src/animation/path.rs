//! Arcing cursor paths.
//!
//! A straight line from A to B reads as robotic. The cursor instead follows
//! a quadratic Bézier curve whose control point sits beside the midpoint of
//! the travel vector, pushed out perpendicular to it by an amount that grows
//! with distance up to [`MAX_ARC_OFFSET`].

use crate::locator::Point;
use serde::{Deserialize, Serialize};

/// Fraction of travel distance used as the perpendicular offset
pub const ARC_OFFSET_RATIO: f64 = 0.2;

/// Largest perpendicular offset in pixels
pub const MAX_ARC_OFFSET: f64 = 80.0;

/// Quadratic curve from `start` through `control` to `end`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcPath {
    /// Where the cursor is now
    pub start: Point,
    /// Bézier control point
    pub control: Point,
    /// Where the cursor ends up
    pub end: Point,
}

impl ArcPath {
    /// Build the arc between two points.
    #[must_use]
    pub fn between(start: Point, end: Point) -> Self {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let distance = dx.hypot(dy);
        let mid = Point::new(start.x + dx / 2.0, start.y + dy / 2.0);

        if distance < f64::EPSILON {
            return Self {
                start,
                control: mid,
                end,
            };
        }

        let offset = (distance * ARC_OFFSET_RATIO).min(MAX_ARC_OFFSET);
        // Left-hand normal of the travel direction.
        let (nx, ny) = (-dy / distance, dx / distance);

        Self {
            start,
            control: Point::new(mid.x + nx * offset, mid.y + ny * offset),
            end,
        }
    }
}
