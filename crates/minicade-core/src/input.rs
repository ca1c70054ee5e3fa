use serde::{Deserialize, Serialize};

use crate::grid::{Cell, Dir};

/// Which part of a pointer gesture an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPhase {
    Start,
    Move,
    End,
}

/// A pointer position in surface pixels.
///
/// End events may carry the gesture's start position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<(f32, f32)>,
}

impl PointerEvent {
    pub const fn at(x: f32, y: f32) -> Self {
        Self { x, y, start: None }
    }

    pub const fn with_start(mut self, x: f32, y: f32) -> Self {
        self.start = Some((x, y));
        self
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Dominant-axis direction of the gesture, if it travelled at least `min_distance`.
    pub fn swipe(&self, min_distance: f32) -> Option<Dir> {
        let (sx, sy) = self.start?;
        let dx = self.x - sx;
        let dy = self.y - sy;
        if !dx.is_finite() || !dy.is_finite() || dx.abs().max(dy.abs()) < min_distance.max(f32::EPSILON) {
            return None;
        }
        Some(if dx.abs() > dy.abs() {
            if dx > 0.0 { Dir::Right } else { Dir::Left }
        } else if dy > 0.0 {
            Dir::Down
        } else {
            Dir::Up
        })
    }
}

/// Maps pixels to cells of a board drawn at a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub offset_x: f32,
    pub offset_y: f32,
    pub cell_size: f32,
    pub rows: usize,
    pub cols: usize,
}

impl GridLayout {
    /// Horizontally centred board whose cells are at most `max_cell` pixels and
    /// leave `margin` pixels of total side padding.
    pub fn centered(width: f32, top: f32, max_cell: f32, margin: f32, rows: usize, cols: usize) -> Self {
        let cell_size = max_cell.min((width - margin) / cols.max(1) as f32).max(1.0);
        Self {
            offset_x: (width - cell_size * cols as f32) / 2.0,
            offset_y: top,
            cell_size,
            rows,
            cols,
        }
    }

    pub fn width(&self) -> f32 {
        self.cell_size * self.cols as f32
    }

    pub fn height(&self) -> f32 {
        self.cell_size * self.rows as f32
    }

    /// Y coordinate just below the board.
    pub fn bottom(&self) -> f32 {
        self.offset_y + self.height()
    }

    /// Cell containing the pixel, or `None` outside the board.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<Cell> {
        let col = ((x - self.offset_x) / self.cell_size).floor();
        let row = ((y - self.offset_y) / self.cell_size).floor();
        self.checked(row, col)
    }

    /// Nearest intersection for boards played on line crossings.
    pub fn point_at(&self, x: f32, y: f32) -> Option<Cell> {
        let col = ((x - self.offset_x) / self.cell_size).round();
        let row = ((y - self.offset_y) / self.cell_size).round();
        self.checked(row, col)
    }

    fn checked(&self, row: f32, col: f32) -> Option<Cell> {
        if !row.is_finite() || !col.is_finite() || row < 0.0 || col < 0.0 {
            return None;
        }
        let cell = Cell::new(row as usize, col as usize);
        (cell.row < self.rows && cell.col < self.cols).then_some(cell)
    }

    /// Top-left pixel of `cell`.
    pub fn cell_origin(&self, cell: Cell) -> (f32, f32) {
        (
            self.offset_x + cell.col as f32 * self.cell_size,
            self.offset_y + cell.row as f32 * self.cell_size,
        )
    }

    pub fn cell_center(&self, cell: Cell) -> (f32, f32) {
        let (x, y) = self.cell_origin(cell);
        (x + self.cell_size / 2.0, y + self.cell_size / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> GridLayout {
        GridLayout {
            offset_x: 10.0,
            offset_y: 40.0,
            cell_size: 20.0,
            rows: 4,
            cols: 5,
        }
    }

    #[test]
    fn cell_at_floors_inside_board() {
        let l = layout();
        assert_eq!(l.cell_at(10.0, 40.0), Some(Cell::new(0, 0)));
        assert_eq!(l.cell_at(49.9, 79.9), Some(Cell::new(1, 1)));
        assert_eq!(l.cell_at(109.9, 119.9), Some(Cell::new(3, 4)));
    }

    #[test]
    fn cell_at_rejects_outside_and_nan() {
        let l = layout();
        assert_eq!(l.cell_at(9.0, 50.0), None);
        assert_eq!(l.cell_at(110.0, 50.0), None);
        assert_eq!(l.cell_at(50.0, 120.0), None);
        assert_eq!(l.cell_at(f32::NAN, 50.0), None);
        assert_eq!(l.cell_at(50.0, f32::INFINITY), None);
    }

    #[test]
    fn point_at_rounds_to_intersection() {
        let l = layout();
        assert_eq!(l.point_at(19.0, 49.0), Some(Cell::new(0, 0)));
        assert_eq!(l.point_at(21.0, 51.0), Some(Cell::new(1, 1)));
    }

    #[test]
    fn centered_layout_fits_width() {
        let l = GridLayout::centered(375.0, 40.0, 32.0, 20.0, 10, 10);
        assert_eq!(l.cell_size, 32.0);
        assert_eq!(l.offset_x, (375.0 - 320.0) / 2.0);
        let narrow = GridLayout::centered(200.0, 40.0, 32.0, 20.0, 10, 10);
        assert_eq!(narrow.cell_size, 18.0);
    }

    #[test]
    fn swipe_uses_dominant_axis() {
        let ev = PointerEvent::at(100.0, 110.0).with_start(50.0, 100.0);
        assert_eq!(ev.swipe(10.0), Some(Dir::Right));
        let ev = PointerEvent::at(100.0, 20.0).with_start(90.0, 100.0);
        assert_eq!(ev.swipe(10.0), Some(Dir::Up));
    }

    #[test]
    fn short_or_missing_swipe_is_none() {
        assert_eq!(PointerEvent::at(1.0, 1.0).swipe(10.0), None);
        let ev = PointerEvent::at(55.0, 100.0).with_start(50.0, 100.0);
        assert_eq!(ev.swipe(10.0), None);
        let tap = PointerEvent::at(50.0, 100.0).with_start(50.0, 100.0);
        assert_eq!(tap.swipe(0.0), None);
    }
}
