//! Uniform flow grid layout and region-to-index resolution.

use crate::cache::PixelSize;
use crate::geometry::Rect;

/// Resolves a content region to the indices laid out within it.
///
/// Implementations may report indices beyond the collection's current
/// length; callers clip against the collection when resolving assets, so a
/// stale or oversized region degrades to fewer items rather than an error.
pub trait RegionResolver {
    fn indices_in(&self, region: &Rect) -> Vec<usize>;
}

/// Row-major grid of fixed-size cells separated by uniform spacing.
///
/// The grid extends downward without bound; it deliberately does not know
/// how many items exist.
#[derive(Debug, Clone)]
pub struct GridLayout {
    columns: u32,
    cell_width: f64,
    cell_height: f64,
    spacing: f64,
}

impl GridLayout {
    pub fn new(columns: u32, cell_width: f64, cell_height: f64, spacing: f64) -> Self {
        assert!(columns > 0, "grid needs at least one column");
        Self {
            columns,
            cell_width,
            cell_height,
            spacing,
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    fn row_pitch(&self) -> f64 {
        self.cell_height + self.spacing
    }

    fn col_pitch(&self) -> f64 {
        self.cell_width + self.spacing
    }

    /// Frame of the cell at `index` in content coordinates.
    pub fn frame_of(&self, index: usize) -> Rect {
        let row = index / self.columns as usize;
        let col = index % self.columns as usize;
        Rect::new(
            col as f64 * self.col_pitch(),
            row as f64 * self.row_pitch(),
            self.cell_width,
            self.cell_height,
        )
    }

    /// Height needed to lay out `count` items.
    pub fn content_height(&self, count: usize) -> f64 {
        let rows = count.div_ceil(self.columns as usize);
        if rows == 0 {
            0.0
        } else {
            rows as f64 * self.row_pitch() - self.spacing
        }
    }

    pub fn content_width(&self) -> f64 {
        self.columns as f64 * self.col_pitch() - self.spacing
    }

    /// Thumbnail request size for this cell geometry at `display_scale`
    /// device pixels per point.
    pub fn thumbnail_target_size(&self, display_scale: f64) -> PixelSize {
        PixelSize::new(
            ((self.cell_width * display_scale).round() as u32).max(1),
            ((self.cell_height * display_scale).round() as u32).max(1),
        )
    }
}

impl RegionResolver for GridLayout {
    fn indices_in(&self, region: &Rect) -> Vec<usize> {
        if region.is_empty() {
            return Vec::new();
        }

        let first_row = band_start(region.min_y(), self.row_pitch(), self.cell_height);
        let end_row = band_end(region.max_y(), self.row_pitch());
        let first_col = band_start(region.min_x(), self.col_pitch(), self.cell_width);
        let end_col = band_end(region.max_x(), self.col_pitch()).min(self.columns as usize);
        if first_row >= end_row || first_col >= end_col {
            return Vec::new();
        }

        let columns = self.columns as usize;
        let mut indices = Vec::with_capacity((end_row - first_row) * (end_col - first_col));
        for row in first_row..end_row {
            for col in first_col..end_col {
                indices.push(row * columns + col);
            }
        }
        indices
    }
}

/// First band whose cell extent reaches past `edge`. The spacing gap after a
/// cell belongs to no band.
fn band_start(edge: f64, pitch: f64, cell: f64) -> usize {
    if edge <= 0.0 {
        return 0;
    }
    let band = (edge / pitch).floor();
    if band * pitch + cell <= edge {
        band as usize + 1
    } else {
        band as usize
    }
}

/// One past the last band starting before `edge`.
fn band_end(edge: f64, pitch: f64) -> usize {
    if edge <= 0.0 {
        return 0;
    }
    (edge / pitch).ceil() as usize
}
