//! Occupancy grid used during town placement.

use serde::{Deserialize, Serialize};

/// Cell coordinate. Signed so neighbour offsets can be applied before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Euclidean distance to another cell.
    pub fn distance(self, other: Position) -> f64 {
        f64::from(other.x - self.x).hypot(f64::from(other.y - self.y))
    }

    /// Number of king moves between two cells.
    pub fn chebyshev(self, other: Position) -> u32 {
        let dx = (other.x - self.x).unsigned_abs();
        let dy = (other.y - self.y).unsigned_abs();
        dx.max(dy)
    }
}

/// Flat `W*H` bitmap, `index = y * W + x`.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl SpatialGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    pub fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    pub fn position(&self, index: usize) -> Option<Position> {
        if index < self.cells.len() {
            let width = self.width as usize;
            Some(Position::new((index % width) as i32, (index / width) as i32))
        } else {
            None
        }
    }

    /// Nearest in-bounds cell; out-of-range axes snap to the edge.
    pub fn clamp(&self, pos: Position) -> Position {
        let max_x = self.width.saturating_sub(1) as i32;
        let max_y = self.height.saturating_sub(1) as i32;
        Position::new(pos.x.clamp(0, max_x), pos.y.clamp(0, max_y))
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.index(pos).map(|i| self.cells[i]).unwrap_or(false)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// All free cells in index order, read from the current bitmap.
    pub fn free_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &occupied)| !occupied)
            .filter_map(move |(index, _)| self.position(index))
    }

    /// Marks every cell within `radius` of `center` as occupied.
    ///
    /// An offset qualifies when `round(hypot(i, j)) <= radius`. The target is
    /// clamped to the grid before marking, so offsets that fall off the map
    /// mark the border cell they clamp onto.
    pub fn mark_exclusion(&mut self, center: Position, radius: u32) {
        if self.cells.is_empty() {
            return;
        }
        let r = radius as i32;
        for i in -r..=r {
            for j in -r..=r {
                let reach = f64::from(i).hypot(f64::from(j)).round();
                if reach > f64::from(radius) {
                    continue;
                }
                let target = self.clamp(center.offset(i, j));
                if let Some(index) = self.index(target) {
                    self.cells[index] = true;
                }
            }
        }
    }
}
