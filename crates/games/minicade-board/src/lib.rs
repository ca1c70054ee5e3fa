pub mod checkers;
pub mod go;
pub mod reversi;

pub use checkers::Checkers;
pub use go::Go;
pub use reversi::Reversi;
