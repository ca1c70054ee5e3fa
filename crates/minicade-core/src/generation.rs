//! Procedural boards: mazes, spanning trees, minefields and sudoku.

use rand::Rng;
use rand::seq::SliceRandom;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::grid::{BoundaryPolicy, Cell, Dir, Grid};

/// Random spanning tree over a `rows x cols` lattice via randomized depth-first traversal.
///
/// Each edge is `(cell, dir)`: the passage leaving `cell` towards `dir`.
/// Edges are listed in carving order, so the tree has `rows * cols - 1` of them.
pub fn spanning_tree(rows: usize, cols: usize, rng: &mut impl Rng) -> Vec<(Cell, Dir)> {
    if rows == 0 || cols == 0 {
        return Vec::new();
    }
    let lattice = Grid::filled(rows, cols, ());
    let mut visited = Grid::filled(rows, cols, false);
    let mut edges = Vec::with_capacity(rows * cols - 1);
    let mut stack = vec![Cell::new(0, 0)];
    visited[Cell::new(0, 0)] = true;

    while let Some(&current) = stack.last() {
        let mut options: Vec<(Dir, Cell)> = Dir::ALL
            .into_iter()
            .filter_map(|dir| {
                lattice
                    .step(current, dir, BoundaryPolicy::Bounded)
                    .filter(|&next| !visited[next])
                    .map(|next| (dir, next))
            })
            .collect();

        if options.is_empty() {
            stack.pop();
            continue;
        }
        let pick = rng.random_range(0..options.len());
        let (dir, next) = options.swap_remove(pick);
        visited[next] = true;
        edges.push((current, dir));
        stack.push(next);
    }
    edges
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MazeCell {
    Wall,
    Open,
}

/// A perfect maze carved into a wall grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maze {
    pub grid: Grid<MazeCell>,
    pub entrance: Cell,
    pub exit: Cell,
}

impl Maze {
    pub fn is_open(&self, cell: Cell) -> bool {
        self.grid.get(cell) == Some(&MazeCell::Open)
    }
}

/// Carve a perfect maze. Even dimensions are reduced to the next odd size (minimum 1).
///
/// Rooms sit on even coordinates; the entrance is `(0, 0)` and the exit the opposite corner.
pub fn generate_maze(rows: usize, cols: usize, rng: &mut impl Rng) -> Maze {
    let rows = odd_at_most(rows);
    let cols = odd_at_most(cols);
    let mut grid = Grid::filled(rows, cols, MazeCell::Wall);

    let room_rows = rows.div_ceil(2);
    let room_cols = cols.div_ceil(2);
    for room in Grid::filled(room_rows, room_cols, ()).cells() {
        grid[Cell::new(room.row * 2, room.col * 2)] = MazeCell::Open;
    }
    for (room, dir) in spanning_tree(room_rows, room_cols, rng) {
        let (dr, dc) = dir.delta();
        let passage = Cell::new(
            (room.row as isize * 2 + dr) as usize,
            (room.col as isize * 2 + dc) as usize,
        );
        grid[passage] = MazeCell::Open;
    }

    Maze {
        grid,
        entrance: Cell::new(0, 0),
        exit: Cell::new(rows - 1, cols - 1),
    }
}

fn odd_at_most(n: usize) -> usize {
    if n == 0 {
        1
    } else if n % 2 == 0 {
        n - 1
    } else {
        n
    }
}

/// A minefield cell: a mine, or a clear cell with its Moore-neighbourhood mine count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MineCell {
    Mine,
    Clear(u8),
}

impl MineCell {
    pub fn is_mine(self) -> bool {
        matches!(self, MineCell::Mine)
    }
}

/// Place `count` mines uniformly at random into distinct cells, then derive hint counts.
///
/// `count` is clamped to the number of cells.
pub fn place_mines(rows: usize, cols: usize, count: usize, rng: &mut impl Rng) -> Grid<MineCell> {
    let total = rows * cols;
    let picked = index::sample(rng, total, count.min(total));
    let mines: Vec<Cell> = picked
        .into_iter()
        .map(|i| Cell::new(i / cols, i % cols))
        .collect();
    minefield_from(rows, cols, &mines)
}

/// Build a minefield from explicit mine positions (out-of-bounds positions are ignored).
pub fn minefield_from(rows: usize, cols: usize, mines: &[Cell]) -> Grid<MineCell> {
    let mut field = Grid::filled(rows, cols, MineCell::Clear(0));
    for &mine in mines {
        field.set(mine, MineCell::Mine);
    }
    for cell in field.cells() {
        if field[cell].is_mine() {
            continue;
        }
        let around = field.neighbors8(cell).filter(|&n| field[n].is_mine()).count();
        field[cell] = MineCell::Clear(around as u8);
    }
    field
}

/// 9x9 sudoku digits, 0 for a blank.
pub type SudokuGrid = [[u8; 9]; 9];

/// A generated puzzle together with the completed board it was cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SudokuPuzzle {
    pub puzzle: SudokuGrid,
    pub solution: SudokuGrid,
}

/// Whether `digit` can go at `(row, col)` without repeating in its row, column or box.
pub fn is_safe(board: &SudokuGrid, row: usize, col: usize, digit: u8) -> bool {
    for i in 0..9 {
        if board[row][i] == digit || board[i][col] == digit {
            return false;
        }
    }
    let (br, bc) = (row - row % 3, col - col % 3);
    for r in br..br + 3 {
        for c in bc..bc + 3 {
            if board[r][c] == digit {
                return false;
            }
        }
    }
    true
}

/// Fill every blank by backtracking, trying digits in ascending order.
///
/// Returns `false` (leaving the board as it was) when no completion exists.
pub fn solve(board: &mut SudokuGrid) -> bool {
    let Some((row, col)) = (0..81)
        .map(|i| (i / 9, i % 9))
        .find(|&(r, c)| board[r][c] == 0)
    else {
        return true;
    };
    for digit in 1..=9 {
        if is_safe(board, row, col, digit) {
            board[row][col] = digit;
            if solve(board) {
                return true;
            }
            board[row][col] = 0;
        }
    }
    false
}

/// Every row, column and 3x3 box holds 1..=9 exactly once.
pub fn is_valid_solution(board: &SudokuGrid) -> bool {
    let unit_ok = |digits: [u8; 9]| {
        let mut seen = [false; 10];
        digits.iter().all(|&d| {
            let fresh = (1..=9).contains(&d) && !seen[d as usize];
            if fresh {
                seen[d as usize] = true;
            }
            fresh
        })
    };
    (0..9).all(|i| {
        let row = board[i];
        let col = std::array::from_fn(|r| board[r][i]);
        let (br, bc) = ((i / 3) * 3, (i % 3) * 3);
        let boxed = std::array::from_fn(|k| board[br + k / 3][bc + k % 3]);
        unit_ok(row) && unit_ok(col) && unit_ok(boxed)
    })
}

/// Every given (non-zero) digit of `puzzle` agrees with `solution`.
pub fn is_completion_of(puzzle: &SudokuGrid, solution: &SudokuGrid) -> bool {
    puzzle
        .iter()
        .flatten()
        .zip(solution.iter().flatten())
        .all(|(&given, &solved)| given == 0 || given == solved)
}

/// Fill the three diagonal boxes with shuffled digits, complete by backtracking,
/// then blank `remove` distinct cells at random.
pub fn generate_sudoku(remove: usize, rng: &mut impl Rng) -> SudokuPuzzle {
    let mut solution = [[0u8; 9]; 9];
    for b in 0..3 {
        let mut digits: Vec<u8> = (1..=9).collect();
        digits.shuffle(rng);
        for (k, digit) in digits.into_iter().enumerate() {
            solution[b * 3 + k / 3][b * 3 + k % 3] = digit;
        }
    }
    // Independent diagonal boxes always admit a completion.
    let solved = solve(&mut solution);
    debug_assert!(solved);

    let mut puzzle = solution;
    for i in index::sample(rng, 81, remove.min(81)) {
        puzzle[i / 9][i % 9] = 0;
    }
    SudokuPuzzle { puzzle, solution }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn open_edges(maze: &Maze) -> usize {
        maze.grid
            .cells()
            .filter(|&c| maze.is_open(c))
            .map(|c| {
                [Dir::Right, Dir::Down]
                    .into_iter()
                    .filter_map(|d| maze.grid.step(c, d, BoundaryPolicy::Bounded))
                    .filter(|&n| maze.is_open(n))
                    .count()
            })
            .sum()
    }

    #[test]
    fn spanning_tree_has_n_minus_one_edges() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(spanning_tree(5, 5, &mut rng).len(), 24);
        assert_eq!(spanning_tree(1, 1, &mut rng).len(), 0);
        assert!(spanning_tree(0, 4, &mut rng).is_empty());
    }

    #[test]
    fn maze_is_perfect() {
        let mut rng = StdRng::seed_from_u64(42);
        let maze = generate_maze(15, 15, &mut rng);
        let open = maze.grid.values().iter().filter(|&&c| c == MazeCell::Open).count();
        let reach = crate::connectivity::flood_fill(&maze.grid, maze.entrance, |&c| {
            c == MazeCell::Open
        });
        assert_eq!(reach.len(), open, "every open cell is reachable");
        assert_eq!(open_edges(&maze), open - 1, "passage graph is a tree");
        assert!(reach.contains(&maze.exit));
    }

    #[test]
    fn maze_even_dims_become_odd() {
        let mut rng = StdRng::seed_from_u64(1);
        let maze = generate_maze(10, 8, &mut rng);
        assert_eq!(maze.grid.rows(), 9);
        assert_eq!(maze.grid.cols(), 7);
        assert_eq!(maze.exit, Cell::new(8, 6));
        assert!(maze.is_open(maze.exit));
    }

    #[test]
    fn maze_is_deterministic_per_seed() {
        let a = generate_maze(11, 11, &mut StdRng::seed_from_u64(9));
        let b = generate_maze(11, 11, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.grid, b.grid);
    }

    #[test]
    fn mines_are_distinct_and_counted() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = place_mines(10, 10, 12, &mut rng);
        let mines = field.values().iter().filter(|c| c.is_mine()).count();
        assert_eq!(mines, 12);
        for (cell, value) in field.iter() {
            if let MineCell::Clear(n) = *value {
                let around = field.neighbors8(cell).filter(|&c| field[c].is_mine()).count();
                assert_eq!(n as usize, around);
            }
        }
    }

    #[test]
    fn mine_count_is_clamped() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = place_mines(2, 2, 99, &mut rng);
        assert!(field.values().iter().all(|c| c.is_mine()));
    }

    #[test]
    fn explicit_minefield_hints() {
        let field = minefield_from(3, 3, &[Cell::new(0, 0), Cell::new(2, 2)]);
        assert_eq!(field[Cell::new(1, 1)], MineCell::Clear(2));
        assert_eq!(field[Cell::new(0, 2)], MineCell::Clear(0));
        assert_eq!(field[Cell::new(0, 1)], MineCell::Clear(1));
    }

    #[test]
    fn sudoku_solution_is_valid_and_puzzle_consistent() {
        let mut rng = StdRng::seed_from_u64(2024);
        let generated = generate_sudoku(40, &mut rng);
        assert!(is_valid_solution(&generated.solution));
        assert!(is_completion_of(&generated.puzzle, &generated.solution));
        let blanks = generated.puzzle.iter().flatten().filter(|&&d| d == 0).count();
        assert_eq!(blanks, 40);
    }

    #[test]
    fn solver_completes_a_puzzle() {
        let mut rng = StdRng::seed_from_u64(5);
        let generated = generate_sudoku(30, &mut rng);
        let mut board = generated.puzzle;
        assert!(solve(&mut board));
        assert!(is_valid_solution(&board));
        assert!(is_completion_of(&generated.puzzle, &board));
    }

    #[test]
    fn invalid_board_is_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut board = generate_sudoku(0, &mut rng).solution;
        board[0].swap(0, 1);
        assert!(!is_valid_solution(&board));
        assert!(!is_valid_solution(&[[0; 9]; 9]));
    }

    #[test]
    fn is_safe_checks_box() {
        let mut board = [[0u8; 9]; 9];
        board[0][0] = 5;
        assert!(!is_safe(&board, 1, 1, 5));
        assert!(!is_safe(&board, 0, 8, 5));
        assert!(!is_safe(&board, 8, 0, 5));
        assert!(is_safe(&board, 4, 4, 5));
    }

    mod proptests {
        use proptest::prelude::*;
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        use super::super::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn any_seed_gives_a_perfect_maze(seed in any::<u64>(), rows in 1usize..16, cols in 1usize..16) {
                let maze = generate_maze(rows, cols, &mut StdRng::seed_from_u64(seed));
                let open = maze.grid.values().iter().filter(|&&c| c == MazeCell::Open).count();
                let reach = crate::connectivity::flood_fill(&maze.grid, maze.entrance, |&c| {
                    c == MazeCell::Open
                });
                prop_assert_eq!(reach.len(), open);
                prop_assert!(maze.is_open(maze.exit));
            }

            #[test]
            fn any_seed_gives_a_valid_sudoku(seed in any::<u64>()) {
                let generated = generate_sudoku(40, &mut StdRng::seed_from_u64(seed));
                prop_assert!(is_valid_solution(&generated.solution));
                prop_assert!(is_completion_of(&generated.puzzle, &generated.solution));
            }
        }
    }
}
