//! Host shell for minicade: maps catalog ids to games, owns the clock,
//! store and audio for one session, and drives it from a tokio task.

pub mod config;
pub mod placeholder;
pub mod registry;
pub mod runner;
pub mod session;
