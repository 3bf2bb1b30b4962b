//! Deterministic maze-chase simulation core.
//!
//! A [`game::Game`] owns the whole simulation. Collaborators feed it wall-clock time and
//! [`events::GameCommand`]s, read [`game::Snapshot`]s for drawing, and drain
//! [`events::SessionEvent`]s for audio, scoring and persistence.

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod formatter;
pub mod game;
pub mod logging;
pub mod map;
pub mod systems;
