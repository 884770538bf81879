//! Uniform spatial grids over the unmatched keypoints of image 2.
//!
//! A cell is addressed by the integer pair `floor((p - offset) / cell_size)`.
//! The closest-cell query returns the cell whose center is nearest to the
//! query point; this only covers points inside that one cell, so callers
//! that need every feature within a radius probe the neighboring cells too.

use std::collections::HashMap;

use epimatch_core::{Pt2, Real, Vec2};

use crate::BoundingBox;

/// Integer cell coordinates.
pub type CellKey = (i32, i32);

/// One uniform grid with a fixed cell size and origin offset.
#[derive(Debug, Clone)]
pub struct ImageGrid {
    cell_size: Real,
    offset: Vec2,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl ImageGrid {
    pub fn new(cell_size: Real, offset_x: Real, offset_y: Real) -> Self {
        debug_assert!(cell_size > 0.0);
        Self {
            cell_size,
            offset: Vec2::new(offset_x, offset_y),
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> Real {
        self.cell_size
    }

    /// Bucket feature `index` into the cell containing `(x, y)`.
    pub fn add_feature(&mut self, index: usize, x: Real, y: Real) {
        let key = self.closest_grid_center(x, y);
        self.cells.entry(key).or_default().push(index);
    }

    /// Key of the cell whose center is closest to `(x, y)`.
    ///
    /// With a uniform grid this is the cell containing the point, so the
    /// same discretization is shared with [`ImageGrid::add_feature`].
    pub fn closest_grid_center(&self, x: Real, y: Real) -> CellKey {
        let cx = ((x - self.offset.x) / self.cell_size).floor();
        let cy = ((y - self.offset.y) / self.cell_size).floor();
        (cx as i32, cy as i32)
    }

    /// Pixel position of a cell center.
    pub fn cell_center(&self, key: CellKey) -> Pt2 {
        Pt2::new(
            self.offset.x + (key.0 as Real + 0.5) * self.cell_size,
            self.offset.y + (key.1 as Real + 0.5) * self.cell_size,
        )
    }

    /// Features bucketed into `key`; empty if the cell was never populated.
    pub fn features_from_cell(&self, key: CellKey) -> &[usize] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of non-empty cells.
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }
}

/// A set of grids sharing one cell size, queried through the grid whose
/// closest cell center is nearest to the query point.
///
/// [`GridIndex::staggered`] builds four grids offset by half a cell along
/// each axis, so some cell center always lies within a quarter cell (per
/// axis) of any query point.
#[derive(Debug, Clone)]
pub struct GridIndex {
    grids: Vec<ImageGrid>,
}

impl GridIndex {
    /// Index made of a single grid.
    pub fn single(grid: ImageGrid) -> Self {
        Self { grids: vec![grid] }
    }

    /// Four grids with cell size `2 * half_cell`, anchored at the box's
    /// top-left corner and shifted by `{0, half_cell}` on each axis.
    pub fn staggered(bbox: &BoundingBox, half_cell: Real) -> Self {
        let cell_size = 2.0 * half_cell;
        let (x0, y0) = (bbox.min.x, bbox.min.y);
        let grids = [(0.0, 0.0), (half_cell, 0.0), (0.0, half_cell), (half_cell, half_cell)]
            .iter()
            .map(|(dx, dy)| ImageGrid::new(cell_size, x0 + dx, y0 + dy))
            .collect();
        Self { grids }
    }

    pub fn cell_size(&self) -> Real {
        self.grids[0].cell_size()
    }

    pub fn grids(&self) -> &[ImageGrid] {
        &self.grids
    }

    /// Add a feature to every grid.
    pub fn add_feature(&mut self, index: usize, p: &Pt2) {
        for grid in &mut self.grids {
            grid.add_feature(index, p.x, p.y);
        }
    }

    /// The grid and cell whose center is nearest to `p`.
    ///
    /// Ties go to the grid added first.
    pub fn closest_cell(&self, p: &Pt2) -> (usize, CellKey) {
        debug_assert!(!self.grids.is_empty());
        let mut best = (0, self.grids[0].closest_grid_center(p.x, p.y));
        let mut best_dist = (self.grids[0].cell_center(best.1) - p).norm_squared();
        for (grid_idx, grid) in self.grids.iter().enumerate().skip(1) {
            let key = grid.closest_grid_center(p.x, p.y);
            let dist = (grid.cell_center(key) - p).norm_squared();
            if dist < best_dist {
                best = (grid_idx, key);
                best_dist = dist;
            }
        }
        best
    }

    /// Append the features of the cell closest to `p`, and of its eight
    /// neighbors when `with_neighbors` is set, to `out`.
    ///
    /// `out` may contain duplicates; callers deduplicate.
    pub fn collect_features_near(&self, p: &Pt2, with_neighbors: bool, out: &mut Vec<usize>) {
        let (grid_idx, (cx, cy)) = self.closest_cell(p);
        let grid = &self.grids[grid_idx];
        if !with_neighbors {
            out.extend_from_slice(grid.features_from_cell((cx, cy)));
            return;
        }
        for dy in -1..=1 {
            for dx in -1..=1 {
                out.extend_from_slice(grid.features_from_cell((cx + dx, cy + dy)));
            }
        }
    }
}
