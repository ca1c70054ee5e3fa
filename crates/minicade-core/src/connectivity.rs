//! Grid connectivity: flood-fill groups, liberties, link paths and match runs.
//!
//! Every traversal uses an explicit worklist and returns an owned result.

use std::collections::VecDeque;

use crate::grid::{BoundaryPolicy, Cell, Dir, Grid};

/// Maximal 4-connected region containing `start` whose values satisfy `matches`.
///
/// Returns an empty vec when `start` is out of bounds or does not match.
/// Cells are in row-major order.
pub fn flood_fill<T>(grid: &Grid<T>, start: Cell, matches: impl Fn(&T) -> bool) -> Vec<Cell> {
    flood_fill_with(grid, start, BoundaryPolicy::Bounded, matches)
}

/// [`flood_fill`] with an explicit edge policy.
pub fn flood_fill_with<T>(
    grid: &Grid<T>,
    start: Cell,
    policy: BoundaryPolicy,
    matches: impl Fn(&T) -> bool,
) -> Vec<Cell> {
    match grid.get(start) {
        Some(v) if matches(v) => {},
        _ => return Vec::new(),
    }

    let mut visited = Grid::filled(grid.rows(), grid.cols(), false);
    let mut stack = vec![start];
    let mut group = Vec::new();
    visited[start] = true;

    while let Some(cell) = stack.pop() {
        group.push(cell);
        for next in grid.neighbors4(cell, policy) {
            if !visited[next] && matches(&grid[next]) {
                visited[next] = true;
                stack.push(next);
            }
        }
    }

    group.sort_unstable();
    group
}

/// The group of cells holding the same value as `start`.
pub fn same_value_group<T: PartialEq>(grid: &Grid<T>, start: Cell) -> Vec<Cell> {
    let Some(target) = grid.get(start) else {
        return Vec::new();
    };
    flood_fill(grid, start, |v| v == target)
}

/// First same-value group of at least `min_size` cells in row-major scan order.
///
/// Only cells whose value passes `eligible` seed a group.
pub fn first_group<T: PartialEq>(
    grid: &Grid<T>,
    min_size: usize,
    eligible: impl Fn(&T) -> bool,
) -> Option<Vec<Cell>> {
    let mut seen = Grid::filled(grid.rows(), grid.cols(), false);
    for (cell, value) in grid.iter() {
        if seen[cell] || !eligible(value) {
            continue;
        }
        let group = same_value_group(grid, cell);
        for &c in &group {
            seen[c] = true;
        }
        if group.len() >= min_size {
            return Some(group);
        }
    }
    None
}

/// Number of distinct empty cells orthogonally adjacent to any cell of `group`.
///
/// A group with zero liberties is captured.
pub fn liberties<T>(grid: &Grid<T>, group: &[Cell], is_empty: impl Fn(&T) -> bool) -> usize {
    let mut counted = Grid::filled(grid.rows(), grid.cols(), false);
    let mut total = 0;
    for &cell in group {
        for next in grid.neighbors4(cell, BoundaryPolicy::Bounded) {
            if !counted[next] && is_empty(&grid[next]) {
                counted[next] = true;
                total += 1;
            }
        }
    }
    total
}

/// Cells reachable from `start` by following edges accepted by `connects(from, dir, to)`.
pub fn reachable<T>(
    grid: &Grid<T>,
    start: Cell,
    policy: BoundaryPolicy,
    connects: impl Fn(Cell, Dir, Cell) -> bool,
) -> Grid<bool> {
    let mut seen = Grid::filled(grid.rows(), grid.cols(), false);
    if !grid.in_bounds(start) {
        return seen;
    }
    let mut queue = VecDeque::from([start]);
    seen[start] = true;

    while let Some(cell) = queue.pop_front() {
        for dir in Dir::ALL {
            let Some(next) = grid.step(cell, dir, policy) else {
                continue;
            };
            if !seen[next] && connects(cell, dir, next) {
                seen[next] = true;
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Constraints for [`find_link_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRule {
    /// Maximum number of direction changes.
    pub max_turns: usize,
    /// Whether the path may run through the ring just outside the grid.
    pub through_border: bool,
}

impl Default for LinkRule {
    fn default() -> Self {
        Self {
            max_turns: 2,
            through_border: true,
        }
    }
}

/// A connecting path found by [`find_link_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPath {
    pub turns: usize,
    /// Every position walked, endpoints included. Border positions use -1 or the grid size.
    pub points: Vec<(isize, isize)>,
}

/// Path between `from` and `to` whose intermediate cells are all empty (or border),
/// using as few turns as possible and never more than `rule.max_turns`.
pub fn find_link_path<T>(
    grid: &Grid<T>,
    from: Cell,
    to: Cell,
    rule: LinkRule,
    is_empty: impl Fn(&T) -> bool,
) -> Option<LinkPath> {
    if from == to || !grid.in_bounds(from) || !grid.in_bounds(to) {
        return None;
    }

    let rows = grid.rows() as isize;
    let cols = grid.cols() as isize;
    let padded_cols = cols + 2;
    let target = (to.row as isize, to.col as isize);

    let passable = |r: isize, c: isize| -> bool {
        if (r, c) == target {
            return true;
        }
        if r >= 0 && r < rows && c >= 0 && c < cols {
            return is_empty(&grid[Cell::new(r as usize, c as usize)]);
        }
        rule.through_border && r >= -1 && r <= rows && c >= -1 && c <= cols
    };
    let state_of = |r: isize, c: isize, dir: Dir| -> usize {
        (((r + 1) * padded_cols + (c + 1)) as usize) * 4 + dir.index()
    };
    let decode = |state: usize| -> (isize, isize, Dir) {
        let pos = (state / 4) as isize;
        (pos / padded_cols - 1, pos % padded_cols - 1, Dir::ALL[state % 4])
    };

    let state_count = ((rows + 2) * padded_cols) as usize * 4;
    let mut turns = vec![usize::MAX; state_count];
    let mut parent: Vec<Option<usize>> = vec![None; state_count];
    let mut deque = VecDeque::new();

    let origin = (from.row as isize, from.col as isize);
    for dir in Dir::ALL {
        let (dr, dc) = dir.delta();
        let (r, c) = (origin.0 + dr, origin.1 + dc);
        if passable(r, c) {
            let s = state_of(r, c, dir);
            turns[s] = 0;
            deque.push_back(s);
        }
    }

    while let Some(state) = deque.pop_front() {
        let (r, c, dir) = decode(state);
        if (r, c) == target {
            let mut points = vec![(r, c)];
            let mut cursor = parent[state];
            while let Some(s) = cursor {
                let (pr, pc, _) = decode(s);
                points.push((pr, pc));
                cursor = parent[s];
            }
            points.push(origin);
            points.reverse();
            return Some(LinkPath {
                turns: turns[state],
                points,
            });
        }

        for next_dir in Dir::ALL {
            if next_dir == dir.opposite() {
                continue;
            }
            let cost = turns[state] + usize::from(next_dir != dir);
            if cost > rule.max_turns {
                continue;
            }
            let (dr, dc) = next_dir.delta();
            let (nr, nc) = (r + dr, c + dc);
            if !passable(nr, nc) {
                continue;
            }
            let next = state_of(nr, nc, next_dir);
            if cost < turns[next] {
                turns[next] = cost;
                parent[next] = Some(state);
                if next_dir == dir {
                    deque.push_front(next);
                } else {
                    deque.push_back(next);
                }
            }
        }
    }
    None
}

/// Cells belonging to a horizontal or vertical run of at least `min_run` equal values.
///
/// Blank cells never form runs. Result is row-major without duplicates.
pub fn find_line_matches<T: PartialEq>(
    grid: &Grid<T>,
    min_run: usize,
    is_blank: impl Fn(&T) -> bool,
) -> Vec<Cell> {
    let mut marked = Grid::filled(grid.rows(), grid.cols(), false);
    let min_run = min_run.max(1);

    let mut scan = |cells: Vec<Cell>| {
        let mut start = 0;
        while start < cells.len() {
            let value = &grid[cells[start]];
            let mut end = start + 1;
            while end < cells.len() && grid[cells[end]] == *value {
                end += 1;
            }
            if end - start >= min_run && !is_blank(value) {
                for &cell in &cells[start..end] {
                    marked[cell] = true;
                }
            }
            start = end;
        }
    };

    for row in 0..grid.rows() {
        scan((0..grid.cols()).map(|col| Cell::new(row, col)).collect());
    }
    for col in 0..grid.cols() {
        scan((0..grid.rows()).map(|row| Cell::new(row, col)).collect());
    }

    marked
        .iter()
        .filter_map(|(cell, &hit)| hit.then_some(cell))
        .collect()
}

/// Drop every non-empty cell to the bottom of its column, keeping order.
///
/// Returns the vacated cells at the top of each column (row-major), now holding `empty`.
pub fn collapse_columns<T: Clone>(
    grid: &mut Grid<T>,
    is_empty: impl Fn(&T) -> bool,
    empty: T,
) -> Vec<Cell> {
    let rows = grid.rows();
    let mut vacated_per_col = vec![0usize; grid.cols()];

    for col in 0..grid.cols() {
        let mut write = rows;
        for row in (0..rows).rev() {
            let cell = Cell::new(row, col);
            if is_empty(&grid[cell]) {
                continue;
            }
            write -= 1;
            if write != row {
                let value = grid[cell].clone();
                grid[Cell::new(write, col)] = value;
            }
        }
        for row in 0..write {
            grid[Cell::new(row, col)] = empty.clone();
        }
        vacated_per_col[col] = write;
    }

    grid.cells()
        .filter(|cell| cell.row < vacated_per_col[cell.col])
        .collect()
}
