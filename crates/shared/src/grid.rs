/// Map grid system.
///
/// The background image is 3840x2498 pixels.
/// Grid: 18 columns (A-R) x 16 rows (1-16), starting 60px in from the top-left.
/// Each grid cell has a 5x5 sub-grid, addressed 1..=5 on each axis.
use serde::{Deserialize, Serialize};

use crate::terrain::TerrainKey;

// Map image dimensions in pixels
pub const MAP_WIDTH: f64 = 3840.0;
pub const MAP_HEIGHT: f64 = 2498.0;

// Grid dimensions
pub const GRID_COLS: usize = 18; // A through R
pub const GRID_ROWS: usize = 16; // 1 through 16
pub const SUBGRID_DIVISIONS: usize = 5;

pub const GRID_START_X: f64 = 60.0;
pub const GRID_START_Y: f64 = 60.0;

// The row height divides by 17, not GRID_ROWS. Every published terrain key
// was authored against this height, so it stays.
pub const CELL_WIDTH: f64 = MAP_WIDTH / GRID_COLS as f64;
pub const CELL_HEIGHT: f64 = MAP_HEIGHT / 17.0;
pub const SUB_CELL_WIDTH: f64 = CELL_WIDTH / SUBGRID_DIVISIONS as f64;
pub const SUB_CELL_HEIGHT: f64 = CELL_HEIGHT / SUBGRID_DIVISIONS as f64;

pub const GRID_WIDTH: f64 = CELL_WIDTH * GRID_COLS as f64;
pub const GRID_HEIGHT: f64 = CELL_HEIGHT * GRID_ROWS as f64;

// Geographic extent of the grid
pub const LAT_TOP: f64 = 30.0;
pub const LAT_BOTTOM: f64 = 14.0;
pub const LON_LEFT: f64 = 98.0;
pub const LON_RIGHT: f64 = 62.0;

/// Quotients this close to an integer are treated as sitting on the boundary.
const SNAP_EPSILON: f64 = 1e-9;

/// A point in full-resolution map pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in map pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MapRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MapRect {
    pub fn contains(&self, p: MapPoint) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn center(&self) -> MapPoint {
        MapPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Structured address of the sub-cell under a map point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridReference {
    /// 0-based, A=0 .. R=17.
    pub major_col: usize,
    /// 0-based, row "1" is 0.
    pub major_row: usize,
    /// 1..=5
    pub sub_col: u8,
    /// 1..=5
    pub sub_row: u8,
    pub latitude: f64,
    pub longitude: f64,
}

impl GridReference {
    /// Major cell label, e.g. "G9".
    pub fn major_label(&self) -> String {
        format!("{}{}", col_letter(self.major_col), self.major_row + 1)
    }

    pub fn key(&self) -> TerrainKey {
        TerrainKey {
            col: self.major_col as u8,
            row: self.major_row as u8,
            sub_col: self.sub_col,
            sub_row: self.sub_row,
        }
    }

    /// "27.50°N, 90.00°W"
    pub fn format_lat_lon(&self) -> String {
        format!("{:.2}°N, {:.2}°W", self.latitude, self.longitude)
    }
}

/// Column letter for a given column index (0-based). A=0, R=17.
pub fn col_letter(col: usize) -> char {
    (b'A' + col as u8) as char
}

/// Floor of `value / size`, snapping quotients that land a hair short of a
/// boundary onto it.
fn cell_index(value: f64, size: f64) -> f64 {
    let q = value / size;
    let nearest = q.round();
    if (q - nearest).abs() < SNAP_EPSILON {
        nearest
    } else {
        q.floor()
    }
}

fn sub_index(offset_in_cell: f64, cell_size: f64) -> u8 {
    let raw = cell_index(offset_in_cell, cell_size / SUBGRID_DIVISIONS as f64) + 1.0;
    raw.clamp(1.0, SUBGRID_DIVISIONS as f64) as u8
}

/// Latitude at a map y, interpolated over the grid extent.
pub fn latitude_at(map_y: f64) -> f64 {
    let t = (map_y - GRID_START_Y) / GRID_HEIGHT;
    LAT_TOP - t * (LAT_TOP - LAT_BOTTOM)
}

/// Longitude (west) at a map x, interpolated over the grid extent.
pub fn longitude_at(map_x: f64) -> f64 {
    let t = (map_x - GRID_START_X) / GRID_WIDTH;
    LON_LEFT - t * (LON_LEFT - LON_RIGHT)
}

/// Resolve a map point to its grid reference. `None` outside the grid.
pub fn resolve(map_x: f64, map_y: f64) -> Option<GridReference> {
    if !map_x.is_finite() || !map_y.is_finite() {
        return None;
    }
    let rel_x = map_x - GRID_START_X;
    let rel_y = map_y - GRID_START_Y;
    if rel_x < 0.0 || rel_y < 0.0 || rel_x >= GRID_WIDTH || rel_y >= GRID_HEIGHT {
        return None;
    }

    // Snapping may push a point a hair inside the far edge onto the next index.
    let col = cell_index(rel_x, CELL_WIDTH).min((GRID_COLS - 1) as f64);
    let row = cell_index(rel_y, CELL_HEIGHT).min((GRID_ROWS - 1) as f64);

    let in_cell_x = rel_x - col * CELL_WIDTH;
    let in_cell_y = rel_y - row * CELL_HEIGHT;

    Some(GridReference {
        major_col: col as usize,
        major_row: row as usize,
        sub_col: sub_index(in_cell_x, CELL_WIDTH),
        sub_row: sub_index(in_cell_y, CELL_HEIGHT),
        latitude: latitude_at(map_y),
        longitude: longitude_at(map_x),
    })
}

/// Resolve a map point straight to its terrain key.
pub fn resolve_key(p: MapPoint) -> Option<TerrainKey> {
    resolve(p.x, p.y).map(|r| r.key())
}

/// Get the pixel X position for a grid column line (0-based column index).
pub fn grid_col_px(col: usize) -> f64 {
    GRID_START_X + col as f64 * CELL_WIDTH
}

/// Get the pixel Y position for a grid row line (0-based row index).
pub fn grid_row_px(row: usize) -> f64 {
    GRID_START_Y + row as f64 * CELL_HEIGHT
}

/// Bounds of the whole grid in map pixels.
pub fn grid_rect() -> MapRect {
    MapRect {
        x: GRID_START_X,
        y: GRID_START_Y,
        width: GRID_WIDTH,
        height: GRID_HEIGHT,
    }
}

/// Map-space rectangle covered by a sub-cell.
pub fn sub_cell_rect(key: &TerrainKey) -> MapRect {
    MapRect {
        x: grid_col_px(key.col as usize) + (key.sub_col as f64 - 1.0) * SUB_CELL_WIDTH,
        y: grid_row_px(key.row as usize) + (key.sub_row as f64 - 1.0) * SUB_CELL_HEIGHT,
        width: SUB_CELL_WIDTH,
        height: SUB_CELL_HEIGHT,
    }
}

pub fn sub_cell_center(key: &TerrainKey) -> MapPoint {
    sub_cell_rect(key).center()
}
