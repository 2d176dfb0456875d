// Domain entities
pub mod config;
pub mod event;
pub mod player;

pub use config::*;
pub use event::*;
pub use player::*;
