pub mod block_match;
pub mod fruit_link;
pub mod minesweeper;

pub use block_match::BlockMatch;
pub use fruit_link::FruitLink;
pub use minesweeper::Minesweeper;
