//! Magnifying-glass search game
//!
//! A target stone hides somewhere in the play area; the visitor steers a
//! circular magnifying glass with the arrow buttons. The target counts as
//! found only when its whole bounding box sits inside the glass circle.
//!
//! Movement runs on a held-key interval; containment is polled on its own
//! slower interval, with an explicit found marker so re-observing the same
//! qualifying position is a no-op.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::{Rect, circle_contains_rect};
use super::{GameEvent, GamePhase};
use crate::consts::*;
use crate::input::{Direction, HeldKeys};
use crate::sched::{Interval, OneShot};
use crate::session::SessionState;
use crate::stones::StoneKind;

/// The movable circular viewport
#[derive(Debug, Clone, Copy)]
pub struct MagnifyingGlass {
    /// Top-left corner, pixels
    pub pos: Vec2,
    /// Rendered size, pixels
    pub size: Vec2,
}

impl MagnifyingGlass {
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn radius(&self) -> f32 {
        self.size.x.max(self.size.y) * 0.5
    }

    /// Movement step per tick, derived from the rendered size for finer
    /// control on small glasses
    pub fn step(&self) -> f32 {
        (self.size.x.max(self.size.y) / 10.0).round().max(6.0)
    }
}

pub struct SearchGame {
    variant: StoneKind,
    phase: GamePhase,
    play_area: Rect,
    glass: MagnifyingGlass,
    target: Rect,
    held: HeldKeys,
    move_timer: Interval,
    poll_timer: Interval,
    /// Exactly-once marker for the containment check
    found: bool,
    found_delay: OneShot,
    events: Vec<GameEvent>,
}

impl SearchGame {
    /// Glass starts centered; the target is placed once, uniformly within
    /// the safe zone (15-85% of each axis), and never moves again.
    pub fn new(
        variant: StoneKind,
        play_area: Rect,
        glass_size: Vec2,
        target_size: Vec2,
        seed: u64,
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let target = Self::place_target(&mut rng, &play_area, target_size);
        let glass_pos = play_area.center() - glass_size * 0.5;
        Self {
            variant,
            phase: GamePhase::Instruction,
            play_area,
            glass: MagnifyingGlass {
                pos: glass_pos,
                size: glass_size,
            },
            target,
            held: HeldKeys::default(),
            move_timer: Interval::new(MOVE_TICK_MS),
            poll_timer: Interval::new(CONTAIN_POLL_MS),
            found: false,
            found_delay: OneShot::idle(),
            events: Vec::new(),
        }
    }

    fn place_target(rng: &mut Pcg32, area: &Rect, size: Vec2) -> Rect {
        let lo_x = area.min.x + area.width() * TARGET_MARGIN;
        let hi_x = (area.min.x + area.width() * (1.0 - TARGET_MARGIN) - size.x).max(lo_x);
        let lo_y = area.min.y + area.height() * TARGET_MARGIN;
        let hi_y = (area.min.y + area.height() * (1.0 - TARGET_MARGIN) - size.y).max(lo_y);
        let pos = Vec2::new(
            rng.random_range(lo_x..=hi_x),
            rng.random_range(lo_y..=hi_y),
        );
        Rect::from_pos_size(pos, size)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn glass(&self) -> &MagnifyingGlass {
        &self.glass
    }

    pub fn target(&self) -> &Rect {
        &self.target
    }

    pub fn found(&self) -> bool {
        self.found
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
        self.poll_timer.start(now_ms);
        log::debug!("search game started, target {:?} at {:?}", self.variant, self.target.min);
    }

    /// Raw key edges feed the held-direction state the movement tick reads
    pub fn key_down(&mut self, dir: Direction, now_ms: f64) {
        self.held.set(dir, true);
        if !self.move_timer.running() {
            self.move_timer.start(now_ms);
        }
    }

    pub fn key_up(&mut self, dir: Direction) {
        self.held.set(dir, false);
        if !self.held.any() {
            self.move_timer.stop();
        }
    }

    /// Drive movement, containment polling and the found-display delay
    pub fn tick(&mut self, now_ms: f64, session: &mut SessionState) {
        if self.phase != GamePhase::Running || !session.running() {
            self.move_timer.stop();
            self.poll_timer.stop();
            return;
        }
        if !self.poll_timer.running() {
            self.poll_timer.start(now_ms);
        }
        if self.held.any() && !self.move_timer.running() {
            self.move_timer.start(now_ms);
        }

        for _ in 0..self.move_timer.fire(now_ms) {
            self.step_glass();
        }
        for _ in 0..self.poll_timer.fire(now_ms) {
            self.poll_containment(now_ms);
        }
        if self.found_delay.fire(now_ms) {
            self.phase = GamePhase::Won;
            session.set_paused(true);
            session.set_show_success(true);
            self.events.push(GameEvent::Won);
            self.move_timer.stop();
            self.poll_timer.stop();
            log::info!("search game won");
        }
    }

    /// One movement tick: a fixed step per held direction, diagonals
    /// additive, clamped to the play area.
    fn step_glass(&mut self) {
        let step = self.glass.step();
        let mut pos = self.glass.pos;
        if self.held.up {
            pos.y -= step;
        }
        if self.held.down {
            pos.y += step;
        }
        if self.held.left {
            pos.x -= step;
        }
        if self.held.right {
            pos.x += step;
        }
        let max = self.play_area.max - self.glass.size;
        pos.x = pos.x.clamp(self.play_area.min.x, max.x.max(self.play_area.min.x));
        pos.y = pos.y.clamp(self.play_area.min.y, max.y.max(self.play_area.min.y));
        self.glass.pos = pos;
    }

    fn poll_containment(&mut self, now_ms: f64) {
        if self.found {
            return;
        }
        let inside = circle_contains_rect(
            self.glass.center(),
            self.glass.radius(),
            &self.target,
            CONTAIN_TOLERANCE,
        );
        if inside {
            self.found = true;
            self.events.push(GameEvent::TargetSpotted);
            self.found_delay.arm(now_ms, FOUND_DELAY_MS);
        }
    }

    /// Stop all scheduling. Idempotent; called on screen unmount.
    pub fn teardown(&mut self) {
        self.move_timer.stop();
        self.poll_timer.stop();
        self.found_delay.cancel();
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: Rect = Rect {
        min: Vec2::ZERO,
        max: Vec2::new(1_000.0, 800.0),
    };
    const GLASS: Vec2 = Vec2::new(120.0, 120.0);
    const TARGET: Vec2 = Vec2::new(40.0, 40.0);

    fn running_game(seed: u64) -> (SearchGame, SessionState) {
        let mut session = SessionState::fresh();
        let mut game = SearchGame::new(StoneKind::Amethyst, AREA, GLASS, TARGET, seed);
        game.start(0.0, &mut session);
        (game, session)
    }

    #[test]
    fn test_target_placed_in_safe_zone() {
        for seed in 0..50 {
            let game = SearchGame::new(StoneKind::Amethyst, AREA, GLASS, TARGET, seed);
            let target = game.target();
            assert!(target.min.x >= AREA.width() * TARGET_MARGIN);
            assert!(target.max.x <= AREA.width() * (1.0 - TARGET_MARGIN) + TARGET.x);
            assert!(target.min.y >= AREA.height() * TARGET_MARGIN);
            assert!(target.max.y <= AREA.height() * (1.0 - TARGET_MARGIN) + TARGET.y);
        }
    }

    #[test]
    fn test_held_key_moves_glass() {
        let (mut game, mut session) = running_game(3);
        let start_x = game.glass().pos.x;
        game.key_down(Direction::Right, 0.0);
        game.tick(MOVE_TICK_MS * 3.0, &mut session);
        assert_eq!(game.glass().pos.x, start_x + game.glass().step() * 3.0);

        game.key_up(Direction::Right);
        let x = game.glass().pos.x;
        game.tick(MOVE_TICK_MS * 10.0, &mut session);
        assert_eq!(game.glass().pos.x, x);
    }

    #[test]
    fn test_diagonal_movement_is_additive() {
        let (mut game, mut session) = running_game(3);
        let start = game.glass().pos;
        game.key_down(Direction::Down, 0.0);
        game.key_down(Direction::Right, 0.0);
        game.tick(MOVE_TICK_MS, &mut session);
        let step = game.glass().step();
        assert_eq!(game.glass().pos, start + Vec2::splat(step));
    }

    #[test]
    fn test_glass_clamped_to_play_area() {
        let (mut game, mut session) = running_game(3);
        game.key_down(Direction::Left, 0.0);
        game.key_down(Direction::Up, 0.0);
        // Hold long past the edge
        let mut now = 0.0;
        for _ in 0..100 {
            now += MOVE_TICK_MS;
            game.tick(now, &mut session);
        }
        assert_eq!(game.glass().pos, AREA.min);
    }

    #[test]
    fn test_found_is_idempotent_then_wins_after_delay() {
        let (mut game, mut session) = running_game(3);
        // Park the glass directly over the target
        game.glass.pos = game.target.center() - GLASS * 0.5;

        game.tick(CONTAIN_POLL_MS, &mut session);
        assert!(game.found());
        assert_eq!(game.drain_events(), vec![GameEvent::TargetSpotted]);

        // Further polls while the delay runs are no-ops
        game.tick(CONTAIN_POLL_MS * 5.0, &mut session);
        assert!(game.drain_events().is_empty());

        game.tick(CONTAIN_POLL_MS + FOUND_DELAY_MS, &mut session);
        assert_eq!(game.phase(), GamePhase::Won);
        assert!(session.paused());
        assert!(session.show_success());
        assert_eq!(game.drain_events(), vec![GameEvent::Won]);
    }

    #[test]
    fn test_partial_overlap_is_not_found() {
        let (mut game, mut session) = running_game(3);
        // One target corner outside the circle: offset the glass so the
        // target sits at its rim
        game.glass.pos = game.target.center() - GLASS * 0.5 + Vec2::new(GLASS.x * 0.5, 0.0);
        game.tick(CONTAIN_POLL_MS, &mut session);
        assert!(!game.found());
    }

    #[test]
    fn test_pause_stops_movement_and_polling() {
        let (mut game, mut session) = running_game(3);
        game.key_down(Direction::Right, 0.0);
        session.set_paused(true);
        let pos = game.glass().pos;
        game.tick(MOVE_TICK_MS * 10.0, &mut session);
        assert_eq!(game.glass().pos, pos);
        assert!(!game.move_timer.running());
        assert!(!game.poll_timer.running());
    }

    #[test]
    fn test_teardown_leaves_no_live_timers() {
        let (mut game, mut session) = running_game(3);
        game.glass.pos = game.target.center() - GLASS * 0.5;
        game.tick(CONTAIN_POLL_MS, &mut session);
        game.teardown();
        game.teardown(); // idempotent
        // The armed found-delay was cancelled - no Won fires later
        game.tick(1_000_000.0, &mut session);
        assert_ne!(game.phase(), GamePhase::Won);
    }
}
