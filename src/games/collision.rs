//! Geometry for catch and containment checks
//!
//! Two primitives carry both games: horizontal span overlap (does a falling
//! stone intersect the basket at the catch threshold) and circle-contains-rect
//! (is the target fully inside the magnifying glass).

use glam::Vec2;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle from top-left position and size
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// The four corners of the bounding box
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.min.x, self.min.y),
            Vec2::new(self.max.x, self.min.y),
            Vec2::new(self.min.x, self.max.y),
            Vec2::new(self.max.x, self.max.y),
        ]
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Open-interval overlap of two horizontal spans.
///
/// Strict inequalities: spans merely touching at an edge do not overlap,
/// matching the catch rule (a stone grazing the basket edge is a miss).
#[inline]
pub fn spans_overlap(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> bool {
    a_max > b_min && a_min < b_max
}

/// True iff every corner of `rect` lies within the circle.
///
/// `tolerance` shrinks the effective radius so a corner floating on the rim
/// cannot flap between polls.
pub fn circle_contains_rect(center: Vec2, radius: f32, rect: &Rect, tolerance: f32) -> bool {
    let effective = radius - tolerance;
    rect.corners()
        .iter()
        .all(|corner| corner.distance(center) <= effective)
}
