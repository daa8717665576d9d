//! Stonechest - coordination core for a gemstone kiosk exhibit
//!
//! Core modules:
//! - `input`: command routing with per-listener configuration and reset gesture
//! - `watchdog`: two-stage inactivity escalation back to the home screen
//! - `session`: shared overlay/pause flags read by every screen
//! - `games`: the catch and search mini-game engines
//! - `sched`: timer and frame-loop primitives shared by everything above
//! - `kiosk`: the orchestrator that wires the pieces to screens
//!
//! The crate is single-threaded and cooperative: the host shell feeds key
//! events, classifier samples and a monotonic clock (milliseconds, `f64`)
//! into the kiosk, and drains an event queue for navigation and audio cues.
//! Rendering, camera capture and serial port I/O live outside this crate.

pub mod bridge;
pub mod games;
pub mod input;
pub mod kiosk;
pub mod recognition;
pub mod sched;
pub mod session;
pub mod settings;
pub mod stones;
pub mod watchdog;

pub use input::{Direction, InputCommand, InputGate, InputRouter};
pub use kiosk::{Kiosk, KioskEvent, Screen};
pub use session::SessionState;
pub use settings::Settings;
pub use stones::StoneKind;

/// Kiosk configuration constants
pub mod consts {
    /// Idle time before the attention alert appears.
    /// Shipped at 3s for floor testing; the exhibit brief said 30s.
    pub const ALERT_TIMEOUT_MS: f64 = 3_000.0;
    /// Time the alert stays up before forcing a return to the home screen
    pub const RETURN_HOME_TIMEOUT_MS: f64 = 10_000.0;

    /// How long Left+Right must be held together to count as a reset gesture
    pub const RESET_HOLD_MS: f64 = 150.0;
    /// Auto-release for hardware button presses with no release line
    pub const AUTO_RELEASE_MS: f64 = 200.0;

    /// Catch game: interval between falling stone spawns
    pub const SPAWN_INTERVAL_MS: f64 = 900.0;
    /// Catch game: score needed to win
    pub const CATCH_WIN_SCORE: u32 = 10;
    /// Catch game: horizontal basket step per command, pixels
    pub const BASKET_STEP: f32 = 30.0;
    /// Catch game: basket sprite bounds, pixels
    pub const BASKET_WIDTH: f32 = 130.0;
    pub const BASKET_HEIGHT: f32 = 50.0;
    /// Catch game: falling stone sprite size, pixels
    pub const STONE_SIZE: f32 = 50.0;
    /// Catch game: vertical speed range, pixels per frame
    pub const STONE_SPEED_MIN: f32 = 2.0;
    pub const STONE_SPEED_MAX: f32 = 4.0;

    /// Search game: movement tick while a direction is held
    pub const MOVE_TICK_MS: f64 = 50.0;
    /// Search game: containment poll interval
    pub const CONTAIN_POLL_MS: f64 = 80.0;
    /// Search game: delay between spotting the target and the success overlay
    pub const FOUND_DELAY_MS: f64 = 2_000.0;
    /// Search game: tolerance subtracted from the glass radius so a corner
    /// sitting exactly on the rim does not flap across polls
    pub const CONTAIN_TOLERANCE: f32 = 0.5;
    /// Search game: target placement margin, fraction of each axis
    pub const TARGET_MARGIN: f32 = 0.15;
    /// Search game: rendered magnifying glass size, pixels
    pub const GLASS_SIZE: f32 = 120.0;
    /// Search game: rendered target stone size, pixels
    pub const TARGET_SIZE: f32 = 80.0;

    /// Recognition: minimum classifier confidence to consider a detection
    pub const CONFIDENCE_THRESHOLD: f32 = 0.4;
    /// Recognition: consecutive matching samples before a detection confirms
    pub const STABILITY_COUNT: u32 = 2;

    /// How long the "no stone" notice stays up after an empty confirm
    pub const NO_STONE_NOTICE_MS: f64 = 3_000.0;

    /// Cap on timer catch-up periods per poll to prevent a spiral after a
    /// long stall (mirrors substep capping in a fixed-timestep loop)
    pub const MAX_TIMER_CATCHUP: u32 = 8;
}
