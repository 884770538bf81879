//! Axis-aligned extent of the unmatched keypoints of image 2.

use epimatch_core::{Pt2, Real};

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Top-left corner (smallest x and y).
    pub min: Pt2,
    /// Bottom-right corner (largest x and y).
    pub max: Pt2,
}

impl BoundingBox {
    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Pt2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self {
            min: *first,
            max: *first,
        };
        for p in iter {
            bbox.extend(p);
        }
        Some(bbox)
    }

    /// Grow the box to contain `p`.
    pub fn extend(&mut self, p: &Pt2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Box grown by `margin` pixels on every side.
    pub fn expanded(&self, margin: Real) -> Self {
        Self {
            min: Pt2::new(self.min.x - margin, self.min.y - margin),
            max: Pt2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    pub fn center(&self) -> Pt2 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Distance from the center to any corner.
    pub fn half_diagonal(&self) -> Real {
        0.5 * (self.max - self.min).norm()
    }
}
