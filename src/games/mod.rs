//! Mini-game engines
//!
//! Both games share the same session lifecycle: an instruction overlay on
//! entry, a running phase gated by the shared [`crate::session::SessionState`],
//! and a terminal won phase that raises the success overlay. Engines never
//! render; they emit [`GameEvent`]s the shell turns into cues.

pub mod catch;
pub mod collision;
pub mod search;

pub use catch::CatchGame;
pub use collision::Rect;
pub use search::SearchGame;

/// Lifecycle phase of a game session
///
/// Entering a screen always constructs a fresh engine, so construction is the
/// instruction-shown state. Won is terminal until the screen is re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Instruction,
    Running,
    Won,
}

/// Cues for the presentation shell (audio, effects)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Caught a stone of the target kind
    GoodCatch,
    /// Caught a stone of the wrong kind
    BadCatch,
    /// The magnifying glass fully covers the target
    TargetSpotted,
    /// Win condition reached, success overlay raised
    Won,
}
