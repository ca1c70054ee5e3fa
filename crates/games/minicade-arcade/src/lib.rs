pub mod breakout;
pub mod config;
pub mod pinball;
pub mod snake;

pub use breakout::Breakout;
pub use config::ArcadeConfig;
pub use pinball::Pinball;
pub use snake::Snake;
