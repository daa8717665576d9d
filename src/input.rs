//! Input routing
//!
//! Raw key-down/key-up events (from the keyboard, or synthesized by the
//! hardware button bridge) are mapped to directional commands and fanned out
//! to independently configured listeners. Each listener is its own
//! subscription with its own held-key state; the only thing shared across
//! listeners is the [`InputGate`], which the alert overlay closes to keep
//! underlying screens from reacting while it is up.
//!
//! Within one key-down the dispatch order is fixed: direction first, then the
//! synthesized confirm, then reset-gesture evaluation.

use std::cell::Cell;
use std::rc::Rc;

use crate::sched::OneShot;

/// Directional buttons on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Stable key identity used on the wire and in synthesized events
    pub fn key_name(&self) -> &'static str {
        match self {
            Direction::Up => "ArrowUp",
            Direction::Down => "ArrowDown",
            Direction::Left => "ArrowLeft",
            Direction::Right => "ArrowRight",
        }
    }

    /// Fixed key table. Unmapped keys return `None` and must be left alone
    /// so the host does not suppress their default handling.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "up" => Some(Direction::Up),
            "ArrowDown" | "down" => Some(Direction::Down),
            "ArrowLeft" | "left" => Some(Direction::Left),
            "ArrowRight" | "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Abstract command emitted to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Up,
    Down,
    Left,
    Right,
    Confirm,
}

impl From<Direction> for InputCommand {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => InputCommand::Up,
            Direction::Down => InputCommand::Down,
            Direction::Left => InputCommand::Left,
            Direction::Right => InputCommand::Right,
        }
    }
}

/// Currently-held directional keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub fn set(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    pub fn held(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    pub fn left_and_right(&self) -> bool {
        self.left && self.right
    }
}

/// Shared input-block capability
///
/// Cloned into every component that needs to consult or toggle the block.
/// Single-threaded by design, hence `Rc<Cell<_>>` rather than anything
/// heavier.
#[derive(Debug, Clone, Default)]
pub struct InputGate(Rc<Cell<bool>>);

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&self) {
        self.0.set(true);
    }

    pub fn unblock(&self) {
        self.0.set(false);
    }

    pub fn is_blocked(&self) -> bool {
        self.0.get()
    }
}

/// A listener registration
pub struct Listener {
    on_command: Box<dyn FnMut(InputCommand)>,
    on_reset: Option<Box<dyn FnMut()>>,
    confirm_on_any_press: bool,
    allow_when_blocked: bool,
}

impl Listener {
    pub fn new(on_command: impl FnMut(InputCommand) + 'static) -> Self {
        Self {
            on_command: Box::new(on_command),
            on_reset: None,
            confirm_on_any_press: false,
            allow_when_blocked: false,
        }
    }

    /// Synthesize a `Confirm` after every directional command
    pub fn confirm_on_any_press(mut self) -> Self {
        self.confirm_on_any_press = true;
        self
    }

    /// Receive commands even while the gate is closed (the alert overlay
    /// needs this or it could never be dismissed)
    pub fn allow_when_blocked(mut self) -> Self {
        self.allow_when_blocked = true;
        self
    }

    /// Callback for the Left+Right-held reset gesture
    pub fn on_reset(mut self, on_reset: impl FnMut() + 'static) -> Self {
        self.on_reset = Some(Box::new(on_reset));
        self
    }
}

/// Handle for a subscription, for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u32);

struct Subscription {
    id: u32,
    listener: Listener,
    held: HeldKeys,
    reset_timer: OneShot,
    /// Set once the gesture has fired for the current hold; cleared when
    /// either reset key is released. Keeps key auto-repeat from re-arming.
    reset_latched: bool,
}

/// Fan-out router for panel input
pub struct InputRouter {
    gate: InputGate,
    subs: Vec<Subscription>,
    reset_hold_ms: f64,
    next_id: u32,
}

impl InputRouter {
    pub fn new(gate: InputGate, reset_hold_ms: f64) -> Self {
        Self {
            gate,
            subs: Vec::new(),
            reset_hold_ms,
            next_id: 1,
        }
    }

    pub fn gate(&self) -> InputGate {
        self.gate.clone()
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.subs.push(Subscription {
            id,
            listener,
            held: HeldKeys::default(),
            reset_timer: OneShot::idle(),
            reset_latched: false,
        });
        ListenerId(id)
    }

    /// Remove a subscription. Unknown ids are ignored, so teardown racing a
    /// pending auto-release stays harmless.
    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.subs.retain(|s| s.id != id.0);
    }

    /// Feed a key-down event. Returns true if the key is mapped (and should
    /// have its default handling suppressed by the host).
    pub fn key_down(&mut self, key: &str, now_ms: f64) -> bool {
        let Some(dir) = Direction::from_key(key) else {
            return false;
        };
        let blocked = self.gate.is_blocked();
        for sub in &mut self.subs {
            if blocked && !sub.listener.allow_when_blocked {
                continue;
            }
            sub.held.set(dir, true);
            (sub.listener.on_command)(dir.into());
            if sub.listener.confirm_on_any_press {
                (sub.listener.on_command)(InputCommand::Confirm);
            }
            // Reset evaluation comes last, after the commands went out
            if sub.listener.on_reset.is_some()
                && sub.held.left_and_right()
                && !sub.reset_latched
                && !sub.reset_timer.armed()
            {
                sub.reset_timer.arm(now_ms, self.reset_hold_ms);
            }
        }
        true
    }

    /// Feed a key-up event. Release is processed regardless of the gate so
    /// held-key state cannot go stale while an overlay is up.
    pub fn key_up(&mut self, key: &str, _now_ms: f64) -> bool {
        let Some(dir) = Direction::from_key(key) else {
            return false;
        };
        for sub in &mut self.subs {
            sub.held.set(dir, false);
            if matches!(dir, Direction::Left | Direction::Right) {
                // Releasing a reset key before the window elapses is expected
                // input noise, cancelled silently
                sub.reset_timer.cancel();
                sub.reset_latched = false;
            }
        }
        true
    }

    /// Drive pending reset-gesture timers
    pub fn tick(&mut self, now_ms: f64) {
        for sub in &mut self.subs {
            if sub.reset_timer.fire(now_ms) && sub.held.left_and_right() {
                sub.reset_latched = true;
                if let Some(on_reset) = sub.listener.on_reset.as_mut() {
                    on_reset();
                }
            }
        }
    }
}
