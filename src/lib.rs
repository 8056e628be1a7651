pub mod error;
pub mod physics;
pub mod player;
pub mod ron;
pub mod settings;

pub use crate::player::GlidecamPlugin;
