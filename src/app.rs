use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::constants::LOOP_TIME;
use crate::events::{GameCommand, SessionEvent};
use crate::game::Game;
use crate::systems::state::Status;

/// How the headless runner should behave.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Start a session immediately instead of idling through the intro and demo.
    pub start: bool,
    /// Stop after this much wall-clock time.
    pub max_duration: Option<Duration>,
}

/// Drives a [`Game`] in real time without any presentation layer.
pub struct App {
    pub game: Game,
    options: RunOptions,
    started_at: Instant,
    last_tick: Instant,
    session_started: bool,
}

impl App {
    pub fn new(config: &GameConfig, options: RunOptions) -> Result<Self> {
        let mut game = Game::new(config)?;
        if options.start {
            game.send_command(GameCommand::Start);
        }

        let now = Instant::now();
        Ok(Self {
            game,
            options,
            started_at: now,
            last_tick: now,
            session_started: false,
        })
    }

    /// Runs one paced frame. Returns `false` once the runner should exit.
    pub fn run(&mut self) -> bool {
        let start = Instant::now();

        let dt = self.last_tick.elapsed().as_secs_f32();
        self.last_tick = start;
        self.game.tick(dt);

        let mut finished = false;
        for event in self.game.drain_events() {
            finished |= self.report(event);
        }

        if let Some(limit) = self.options.max_duration {
            if self.started_at.elapsed() >= limit {
                info!(elapsed = ?self.started_at.elapsed(), "Run time limit reached");
                return false;
            }
        }
        if finished {
            return false;
        }

        if start.elapsed() < LOOP_TIME {
            let time = LOOP_TIME.saturating_sub(start.elapsed());
            if time != Duration::ZERO {
                spin_sleep::sleep(time);
            }
        } else {
            warn!(behind = ?(start.elapsed() - LOOP_TIME), "Frame behind schedule");
        }

        true
    }

    /// Returns `true` when a session started by this runner has ended.
    fn report(&mut self, event: SessionEvent) -> bool {
        debug!(?event, "Session event");
        match event {
            SessionEvent::StatusChanged { to: Status::Playing, .. } => {
                self.session_started = true;
                false
            }
            SessionEvent::GameOver { .. } => self.session_started,
            _ => false,
        }
    }
}
