pub mod maze;
pub mod memory;
pub mod pipe;
pub mod sudoku;

pub use maze::Maze;
pub use memory::Memory;
pub use pipe::Pipes;
pub use sudoku::Sudoku;
