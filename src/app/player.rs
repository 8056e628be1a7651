//! Small per-player systems for the demo scene.
use bevy::prelude::*;
use glidecam::player::Player;

/// Keep the local fill light hovering above the player sphere.
///
/// Silently no-ops until the player exists.
#[allow(clippy::needless_pass_by_value)]
pub fn update_player_fill_light(
    players: Query<&Transform, (With<Player>, Without<crate::PlayerFillLight>)>,
    mut lights: Query<&mut Transform, With<crate::PlayerFillLight>>,
) {
    if let Ok(player) = players.get_single() {
        for mut t in &mut lights {
            t.translation = player.translation + crate::FILL_LIGHT_OFFSET;
        }
    }
}
