//! Falling-stone catch game
//!
//! Stones of random kinds rain from the top of the container; the visitor
//! slides a basket left/right to catch only the target kind. Matching catches
//! score, wrong catches cost a point (floored at zero), and reaching the win
//! score ends the session in a success overlay.
//!
//! Scheduling is two-track on purpose: spawning runs on a wall-clock
//! interval, physics on the frame loop. Both halt the moment the session
//! guard goes false and re-arm when it holds again.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::spans_overlap;
use super::{GameEvent, GamePhase};
use crate::consts::*;
use crate::input::InputCommand;
use crate::session::SessionState;
use crate::stones::{ALL_STONES, StoneKind};

/// A stone in flight
#[derive(Debug, Clone)]
pub struct FallingStone {
    pub id: u32,
    pub pos: Vec2,
    /// Vertical speed, pixels per frame
    pub speed: f32,
    pub kind: StoneKind,
    /// Set when the stone reached the catch threshold and its score effect
    /// was applied. Guarantees exactly-once scoring however long the stone
    /// lingers at the threshold.
    resolved: bool,
}

pub struct CatchGame {
    variant: StoneKind,
    phase: GamePhase,
    /// Play container size, pixels
    container: Vec2,
    basket_x: f32,
    score: u32,
    win_score: u32,
    stones: Vec<FallingStone>,
    next_id: u32,
    rng: Pcg32,
    spawn: crate::sched::Interval,
    frames: crate::sched::FrameLoop,
    events: Vec<GameEvent>,
}

impl CatchGame {
    pub fn new(
        variant: StoneKind,
        container: Vec2,
        win_score: u32,
        spawn_interval_ms: f64,
        seed: u64,
    ) -> Self {
        Self {
            variant,
            phase: GamePhase::Instruction,
            container,
            basket_x: 0.0,
            score: 0,
            win_score,
            stones: Vec::new(),
            next_id: 1,
            rng: Pcg32::seed_from_u64(seed),
            spawn: crate::sched::Interval::new(spawn_interval_ms),
            frames: crate::sched::FrameLoop::idle(),
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn basket_x(&self) -> f32 {
        self.basket_x
    }

    pub fn stones(&self) -> &[FallingStone] {
        &self.stones
    }

    pub fn variant(&self) -> StoneKind {
        self.variant
    }

    /// Dismiss the instruction overlay and begin play
    pub fn start(&mut self, now_ms: f64, session: &mut SessionState) {
        if self.phase != GamePhase::Instruction {
            return;
        }
        self.phase = GamePhase::Running;
        session.start();
        self.spawn.start(now_ms);
        self.frames.arm();
        log::debug!("catch game started, target {:?}", self.variant);
    }

    /// Basket movement. Honored only with no overlay up and the session
    /// unpaused; clamped to the container.
    pub fn handle_command(&mut self, cmd: InputCommand, session: &SessionState) {
        if session.paused() || session.show_instruction() || session.show_success() {
            return;
        }
        let max_x = (self.container.x - BASKET_WIDTH).max(0.0);
        match cmd {
            InputCommand::Left => self.basket_x = (self.basket_x - BASKET_STEP).max(0.0),
            InputCommand::Right => self.basket_x = (self.basket_x + BASKET_STEP).min(max_x),
            _ => {}
        }
    }

    /// Wall-clock tick: enforces the session guard on both schedulers and
    /// runs the spawn interval.
    pub fn tick(&mut self, now_ms: f64, session: &SessionState) {
        if self.phase != GamePhase::Running || !session.running() {
            self.spawn.stop();
            self.frames.halt();
            return;
        }
        // Guard holds again: re-arm whatever the last pause halted
        if !self.spawn.running() {
            self.spawn.start(now_ms);
        }
        if !self.frames.armed() {
            self.frames.arm();
        }
        for _ in 0..self.spawn.fire(now_ms) {
            self.spawn_stone();
        }
    }

    /// Animation-frame callback: advance physics, resolve catches.
    pub fn frame(&mut self, session: &mut SessionState) {
        if !self.frames.armed() {
            return;
        }
        if self.phase != GamePhase::Running || !session.running() {
            self.frames.halt();
            return;
        }

        for stone in &mut self.stones {
            stone.pos.y += stone.speed;
        }

        let threshold = self.container.y - BASKET_HEIGHT;
        let basket_min = self.basket_x;
        let basket_max = self.basket_x + BASKET_WIDTH;
        let mut won = false;

        for stone in &mut self.stones {
            if stone.resolved || stone.pos.y + STONE_SIZE < threshold {
                continue;
            }
            stone.resolved = true;
            let caught =
                spans_overlap(stone.pos.x, stone.pos.x + STONE_SIZE, basket_min, basket_max);
            if caught {
                if stone.kind == self.variant {
                    self.score += 1;
                    self.events.push(GameEvent::GoodCatch);
                } else {
                    self.score = self.score.saturating_sub(1);
                    self.events.push(GameEvent::BadCatch);
                }
                if self.score >= self.win_score {
                    won = true;
                }
            }
        }
        // A stone that reached the threshold leaves the set either way
        self.stones.retain(|s| !s.resolved);

        if won {
            self.phase = GamePhase::Won;
            session.set_paused(true);
            session.set_show_success(true);
            self.events.push(GameEvent::Won);
            self.spawn.stop();
            self.frames.halt();
            log::info!("catch game won with score {}", self.score);
        }
    }

    fn spawn_stone(&mut self) {
        let max_x = (self.container.x - STONE_SIZE).max(0.0);
        let id = self.next_id;
        self.next_id += 1;
        self.stones.push(FallingStone {
            id,
            pos: Vec2::new(self.rng.random_range(0.0..=max_x), 0.0),
            speed: self.rng.random_range(STONE_SPEED_MIN..STONE_SPEED_MAX),
            kind: ALL_STONES[self.rng.random_range(0..ALL_STONES.len())],
            resolved: false,
        });
    }

    /// Stop all scheduling. Idempotent; called on screen unmount.
    pub fn teardown(&mut self) {
        self.spawn.stop();
        self.frames.halt();
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
