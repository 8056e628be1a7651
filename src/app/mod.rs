pub mod player;
pub mod setup;

pub use player::update_player_fill_light;
pub use setup::setup;
