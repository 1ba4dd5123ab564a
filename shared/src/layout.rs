use std::collections::HashMap;

use geo::{Coord, LineString};

use crate::geography::TileGrid;

/// Absolute pixel square of one country in the cartogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRect {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl TileRect {
    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: self.x + self.size / 2.0,
            y: self.y + self.size / 2.0,
        }
    }

    /// Closed outline clockwise on screen from the top-left corner.
    pub fn outline(&self) -> LineString<f64> {
        let (x, y, s) = (self.x, self.y, self.size);
        LineString::from(vec![(x, y), (x + s, y), (x + s, y + s), (x, y + s), (x, y)])
    }
}

/// Square cell size, centering offsets and per-code rectangles for a tile grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileLayout {
    pub square: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    rects: HashMap<String, TileRect>,
}

impl TileLayout {
    /// Fit the grid into `width` x `height`. The limiting dimension sets the cell size
    /// and the slack of the other one is split evenly on both sides.
    pub fn compute(grid: &TileGrid, width: f64, height: f64) -> Self {
        let Some(((x_min, x_max), (y_min, y_max))) = grid.extent() else {
            return Self::default();
        };

        let columns = f64::from(x_max - x_min + 1);
        let rows = f64::from(y_max - y_min + 1);
        let square = (width / columns).min(height / rows);
        let x_offset = (width - columns * square) / 2.0;
        let y_offset = (height - rows * square) / 2.0;

        let mut rects = HashMap::with_capacity(grid.cells.len());
        for cell in &grid.cells {
            rects.entry(cell.alpha2.clone()).or_insert(TileRect {
                x: f64::from(cell.x - x_min) * square + x_offset,
                y: f64::from(cell.y - y_min) * square + y_offset,
                size: square,
            });
        }

        Self {
            square,
            x_offset,
            y_offset,
            rects,
        }
    }

    pub fn rect(&self, code: &str) -> Option<&TileRect> {
        self.rects.get(code)
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}
