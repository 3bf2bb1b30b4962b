//! The Entity-Component-System (ECS) module.
//!
//! This module contains all the per-step simulation logic: components, resources,
//! and the systems the [`crate::game::Game`] schedule runs.

pub mod collision;
pub mod components;
pub mod ghost;
pub mod item;
pub mod level;
pub mod movement;
pub mod pilot;
pub mod state;
