use bevy_ecs::entity::Entity;
use bevy_ecs::event::{EventReader, EventWriter};
use bevy_ecs::query::{With, Without};
use bevy_ecs::system::{Query, Res, ResMut};
use tracing::{debug, trace};

use crate::constants::mechanics::GHOST_COLLISION_RADIUS;
use crate::constants::score;
use crate::events::{CollisionEvent, SessionEvent, StageTransition};
use crate::systems::components::{Ghost, GhostMode, Level, Navigation, PlayerControlled, Position, ScoreResource, Velocity};
use crate::systems::ghost::set_mode;
use crate::systems::level::difficulty_multiplier;

/// Detects ghosts overlapping the player and emits a [`CollisionEvent`] for each.
///
/// Nothing is mutated here; outcomes are applied by [`ghost_collision_system`] so the
/// whole set of contacts for a step is known before any of them is resolved.
pub fn collision_system(
    player: Query<&Position, With<PlayerControlled>>,
    ghosts: Query<(Entity, &Position), (With<Ghost>, Without<PlayerControlled>)>,
    mut collisions: EventWriter<CollisionEvent>,
) {
    for player_position in player.iter() {
        for (ghost, ghost_position) in ghosts.iter() {
            if player_position.0.distance(ghost_position.0) < GHOST_COLLISION_RADIUS {
                collisions.write(CollisionEvent { ghost });
            }
        }
    }
}

/// Resolves player/ghost contacts: frightened ghosts are eaten, active ones catch the player.
pub fn ghost_collision_system(
    level: Res<Level>,
    mut score: ResMut<ScoreResource>,
    mut collisions: EventReader<CollisionEvent>,
    mut ghosts: Query<(&Ghost, &mut GhostMode, &mut Velocity, &mut Navigation)>,
    mut events: EventWriter<SessionEvent>,
    mut transitions: EventWriter<StageTransition>,
) {
    let multiplier = difficulty_multiplier(level.0);
    let mut caught = false;

    for collision in collisions.read() {
        let Ok((ghost, mut mode, mut velocity, mut navigation)) = ghosts.get_mut(collision.ghost) else {
            continue;
        };

        match *mode {
            GhostMode::Frightened => {
                set_mode(&mut mode, &mut velocity, GhostMode::Eaten, multiplier);
                navigation.invalidate();
                score.0 += score::GHOST;
                debug!(ghost = ghost.as_ref(), points = score::GHOST, "Ghost eaten");
                events.write(SessionEvent::GhostEaten {
                    ghost: *ghost,
                    points: score::GHOST,
                });
            }
            GhostMode::Scatter | GhostMode::Chase => {
                trace!(ghost = ghost.as_ref(), mode = (*mode).as_ref(), "Player caught");
                caught = true;
            }
            GhostMode::Eaten => {}
        }
    }

    if caught {
        transitions.write(StageTransition::PlayerCaught);
    }
}
