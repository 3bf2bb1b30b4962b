use bevy_ecs::system::RunSystemOnce;
use glam::{IVec2, Vec2};
use maze_chase::constants::timing::{BONUS_ACTIVE_TICKS, FRIGHT_TICKS};
use maze_chase::constants::{score, RAW_BOARD};
use maze_chase::events::SessionEvent;
use maze_chase::map::builder::Map;
use maze_chase::map::direction::Direction;
use maze_chase::systems::components::{BonusKind, Ghost, GhostMode, ScoreResource};
use maze_chase::systems::ghost::FrightTimer;
use maze_chase::systems::item::{bonus_pickup_system, bonus_timer_system, item_system, ActiveBonus, BonusFruit, Pellets};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

#[test]
fn test_pellets_from_map() {
    let map = Map::new(&common::CORRIDOR_BOARD).expect("corridor board should build");
    let pellets = Pellets::from_map(&map);

    assert_eq!(pellets.pellets.len(), 2);
    assert_eq!(pellets.power_pellets.len(), 1);
    assert_eq!(pellets.remaining(), 3);
    assert_that(&pellets.contains(IVec2::new(4, 1))).is_true();
    assert_that(&pellets.contains(IVec2::new(1, 1))).is_false();
    assert_eq!(
        pellets.sorted_tiles(),
        vec![IVec2::new(2, 1), IVec2::new(3, 1), IVec2::new(4, 1)]
    );
}

#[test]
fn test_sorted_tiles_are_row_major() {
    let map = Map::new(&RAW_BOARD).expect("standard board should build");
    let tiles = Pellets::from_map(&map).sorted_tiles();

    assert!(tiles.windows(2).all(|pair| (pair[0].y, pair[0].x) < (pair[1].y, pair[1].x)));
}

#[test]
fn test_item_system_eats_pellet_near_center() {
    let mut world = common::create_test_world(&common::CORRIDOR_BOARD);
    common::spawn_test_player(&mut world, Vec2::new(2.6, 1.5), Direction::Right);

    world.run_system_once(item_system).expect("System should run successfully");

    assert_eq!(world.resource::<ScoreResource>().0, score::PELLET);
    assert_that(&world.resource::<Pellets>().contains(IVec2::new(2, 1))).is_false();
    assert_eq!(
        common::drain_session_events(&mut world),
        vec![SessionEvent::PelletEaten { points: score::PELLET }]
    );
}

#[test]
fn test_item_system_requires_proximity_to_center() {
    let mut world = common::create_test_world(&common::CORRIDOR_BOARD);
    common::spawn_test_player(&mut world, Vec2::new(2.95, 1.5), Direction::Right);

    world.run_system_once(item_system).expect("System should run successfully");

    assert_eq!(world.resource::<ScoreResource>().0, 0);
    assert_eq!(world.resource::<Pellets>().remaining(), 3);
}

#[test]
fn test_power_pellet_frightens_and_reverses_ghosts() {
    let mut world = common::create_test_world(&common::CORRIDOR_BOARD);
    common::spawn_test_player(&mut world, Vec2::new(4.5, 1.5), Direction::Right);
    let scatter = common::spawn_test_ghost(&mut world, Ghost::Red, GhostMode::Scatter, IVec2::new(2, 1), Direction::Right);
    let eaten = common::spawn_test_ghost(&mut world, Ghost::Pink, GhostMode::Eaten, IVec2::new(3, 1), Direction::Right);

    world.run_system_once(item_system).expect("System should run successfully");

    assert_eq!(world.resource::<ScoreResource>().0, score::POWER_PELLET);
    assert_eq!(world.resource::<FrightTimer>().remaining_ticks, Some(FRIGHT_TICKS));

    assert_eq!(common::ghost_mode(&world, scatter), GhostMode::Frightened);
    assert_eq!(common::velocity(&world, scatter).direction, Direction::Left);
    assert_eq!(common::velocity(&world, scatter).speed, 2.5);

    assert_eq!(common::ghost_mode(&world, eaten), GhostMode::Eaten);
    assert_eq!(common::velocity(&world, eaten).direction, Direction::Right);

    assert_eq!(
        common::drain_session_events(&mut world),
        vec![SessionEvent::PowerPelletEaten {
            points: score::POWER_PELLET
        }]
    );
}

#[test]
fn test_power_pellet_restarts_fright_without_reversing_again() {
    let mut world = common::create_test_world(&common::CORRIDOR_BOARD);
    world.insert_resource(FrightTimer { remaining_ticks: Some(5) });
    common::spawn_test_player(&mut world, Vec2::new(4.5, 1.5), Direction::Right);
    let frightened =
        common::spawn_test_ghost(&mut world, Ghost::Red, GhostMode::Frightened, IVec2::new(2, 1), Direction::Right);

    world.run_system_once(item_system).expect("System should run successfully");

    assert_eq!(world.resource::<FrightTimer>().remaining_ticks, Some(FRIGHT_TICKS));
    assert_eq!(common::ghost_mode(&world, frightened), GhostMode::Frightened);
    assert_eq!(common::velocity(&world, frightened).direction, Direction::Right);
}

#[test]
fn test_bonus_pickup_awards_kind_points() {
    let mut world = common::create_test_world(&common::CORRIDOR_BOARD);
    world.insert_resource(BonusFruit {
        active: Some(ActiveBonus {
            kind: BonusKind::Strawberry,
            position: Vec2::new(3.5, 1.5),
            remaining_ticks: 100,
        }),
        spawn_in_ticks: 0,
    });
    common::spawn_test_player(&mut world, Vec2::new(3.15, 1.5), Direction::Right);

    world
        .run_system_once(bonus_pickup_system)
        .expect("System should run successfully");

    let bonus = *world.resource::<BonusFruit>();
    assert_that(&bonus.active).is_none();
    assert_that(&bonus.spawn_in_ticks).is_greater_than_or_equal_to(1200);
    assert_that(&bonus.spawn_in_ticks).is_less_than_or_equal_to(2400);
    assert_eq!(world.resource::<ScoreResource>().0, BonusKind::Strawberry.points());
    assert_eq!(
        common::drain_session_events(&mut world),
        vec![SessionEvent::BonusEaten {
            kind: BonusKind::Strawberry,
            points: 300
        }]
    );
}

#[test]
fn test_bonus_out_of_reach_stays() {
    let mut world = common::create_test_world(&common::CORRIDOR_BOARD);
    let active = ActiveBonus {
        kind: BonusKind::Cherry,
        position: Vec2::new(3.5, 1.5),
        remaining_ticks: 100,
    };
    world.insert_resource(BonusFruit {
        active: Some(active),
        spawn_in_ticks: 0,
    });
    common::spawn_test_player(&mut world, Vec2::new(2.5, 1.5), Direction::Right);

    world
        .run_system_once(bonus_pickup_system)
        .expect("System should run successfully");

    assert_eq!(world.resource::<BonusFruit>().active, Some(active));
    assert_eq!(world.resource::<ScoreResource>().0, 0);
}

#[test]
fn test_bonus_spawns_on_item_tile() {
    let mut world = common::create_test_world(&common::CORRIDOR_BOARD);
    world.insert_resource(BonusFruit {
        active: None,
        spawn_in_ticks: 1,
    });

    world
        .run_system_once(bonus_timer_system)
        .expect("System should run successfully");

    let active = world.resource::<BonusFruit>().active.expect("bonus should spawn");
    assert_eq!(active.remaining_ticks, BONUS_ACTIVE_TICKS);
    let tile = active.position.floor().as_ivec2();
    assert_that(&world.resource::<Pellets>().contains(tile)).is_true();
}

#[test]
fn test_bonus_expires_and_reschedules() {
    let mut world = common::create_test_world(&common::CORRIDOR_BOARD);
    world.insert_resource(BonusFruit {
        active: Some(ActiveBonus {
            kind: BonusKind::Cherry,
            position: Vec2::new(3.5, 1.5),
            remaining_ticks: 1,
        }),
        spawn_in_ticks: 0,
    });

    world
        .run_system_once(bonus_timer_system)
        .expect("System should run successfully");

    let bonus = *world.resource::<BonusFruit>();
    assert_that(&bonus.active).is_none();
    assert_that(&bonus.spawn_in_ticks).is_greater_than_or_equal_to(1200);
    assert_that(&bonus.spawn_in_ticks).is_less_than_or_equal_to(3000);
}

#[test]
fn test_bonus_waits_when_board_is_empty() {
    let mut world = common::create_test_world(&common::CORRIDOR_BOARD);
    world.insert_resource(Pellets::default());
    world.insert_resource(BonusFruit {
        active: None,
        spawn_in_ticks: 1,
    });

    world
        .run_system_once(bonus_timer_system)
        .expect("System should run successfully");

    let bonus = *world.resource::<BonusFruit>();
    assert_that(&bonus.active).is_none();
    assert_that(&bonus.spawn_in_ticks).is_greater_than(0);
}
