use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// A cell coordinate on a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to `other`.
    pub fn distance(self, other: Cell) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// True when `other` shares an edge with this cell.
    pub fn is_adjacent(self, other: Cell) -> bool {
        self.distance(other) == 1
    }
}

/// Orthogonal heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

impl Dir {
    /// Clockwise order starting at `Up`.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    /// `(d_row, d_col)` for one step.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (-1, 0),
            Dir::Right => (0, 1),
            Dir::Down => (1, 0),
            Dir::Left => (0, -1),
        }
    }

    pub const fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Right => Dir::Left,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
        }
    }

    pub const fn rotate_cw(self) -> Dir {
        match self {
            Dir::Up => Dir::Right,
            Dir::Right => Dir::Down,
            Dir::Down => Dir::Left,
            Dir::Left => Dir::Up,
        }
    }

    /// Index into [`Dir::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Dir::Up => 0,
            Dir::Right => 1,
            Dir::Down => 2,
            Dir::Left => 3,
        }
    }
}

/// How neighbour lookups treat the grid edge.
///
/// Each game picks its own policy; nothing infers it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Steps past the edge go nowhere.
    #[default]
    Bounded,
    /// Steps past the edge re-enter from the opposite side.
    Wrap,
}

/// Offsets of the Moore neighbourhood (8 surrounding cells).
pub const MOORE: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Fixed-size 2D grid stored row-major (`row * cols + col`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// A grid with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            cells: vec![value; rows * cols],
        }
    }

    /// Build from nested rows. Returns `None` when rows are ragged.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        let row_count = rows.len();
        Some(Self {
            rows: row_count,
            cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Copy out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.cells.chunks(self.cols.max(1)).map(<[T]>::to_vec).collect()
    }
}

impl<T> Grid<T> {
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(Cell) -> T) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(Cell { row, col }));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Bounds-checked cell from signed coordinates.
    pub fn cell_at(&self, row: isize, col: isize) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        let cell = Cell::new(row as usize, col as usize);
        self.in_bounds(cell).then_some(cell)
    }

    fn index_of(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    pub fn get(&self, cell: Cell) -> Option<&T> {
        if !self.in_bounds(cell) {
            return None;
        }
        self.cells.get(self.index_of(cell))
    }

    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
        if !self.in_bounds(cell) {
            return None;
        }
        let idx = self.index_of(cell);
        self.cells.get_mut(idx)
    }

    /// Write `value` if `cell` is in bounds. Returns whether it was written.
    pub fn set(&mut self, cell: Cell, value: T) -> bool {
        match self.get_mut(cell) {
            Some(slot) => {
                *slot = value;
                true
            },
            None => false,
        }
    }

    pub fn swap(&mut self, a: Cell, b: Cell) {
        if self.in_bounds(a) && self.in_bounds(b) {
            let (ia, ib) = (self.index_of(a), self.index_of(b));
            self.cells.swap(ia, ib);
        }
    }

    /// One step from `cell` in `dir` under `policy`.
    pub fn step(&self, cell: Cell, dir: Dir, policy: BoundaryPolicy) -> Option<Cell> {
        let (dr, dc) = dir.delta();
        self.offset(cell, dr, dc, policy)
    }

    /// Arbitrary offset from `cell` under `policy`.
    pub fn offset(&self, cell: Cell, dr: isize, dc: isize, policy: BoundaryPolicy) -> Option<Cell> {
        if self.rows == 0 || self.cols == 0 {
            return None;
        }
        let row = cell.row as isize + dr;
        let col = cell.col as isize + dc;
        match policy {
            BoundaryPolicy::Bounded => self.cell_at(row, col),
            BoundaryPolicy::Wrap => Some(Cell::new(
                row.rem_euclid(self.rows as isize) as usize,
                col.rem_euclid(self.cols as isize) as usize,
            )),
        }
    }

    /// Orthogonal neighbours in `Dir::ALL` order.
    pub fn neighbors4(&self, cell: Cell, policy: BoundaryPolicy) -> impl Iterator<Item = Cell> + '_ {
        Dir::ALL
            .into_iter()
            .filter_map(move |dir| self.step(cell, dir, policy))
    }

    /// Moore neighbours (bounded).
    pub fn neighbors8(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        MOORE
            .into_iter()
            .filter_map(move |(dr, dc)| self.offset(cell, dr, dc, BoundaryPolicy::Bounded))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<T> {
        let cols = self.cols;
        (0..self.rows * cols).map(move |i| Cell::new(i / cols, i % cols))
    }

    /// `(cell, &value)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &T)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (Cell::new(i / cols, i % cols), v))
    }

    pub fn values(&self) -> &[T] {
        &self.cells
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(&mut f).collect(),
        }
    }
}

impl<T> Index<Cell> for Grid<T> {
    type Output = T;

    fn index(&self, cell: Cell) -> &T {
        assert!(self.in_bounds(cell), "cell {cell:?} out of bounds");
        &self.cells[self.index_of(cell)]
    }
}

impl<T> IndexMut<Cell> for Grid<T> {
    fn index_mut(&mut self, cell: Cell) -> &mut T {
        assert!(self.in_bounds(cell), "cell {cell:?} out of bounds");
        let idx = self.index_of(cell);
        &mut self.cells[idx]
    }
}
