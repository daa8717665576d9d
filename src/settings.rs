//! Kiosk tuning and timeouts
//!
//! Everything the floor staff may want to tweak without a rebuild lives in
//! one serde struct, loaded from a JSON file next to the binary. Missing or
//! corrupt files fall back to the built-in defaults - the kiosk must come up
//! regardless.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Idle watchdog ===
    /// Idle time before the attention alert, ms. The exhibit brief said 30s;
    /// shipped at 3s after floor testing showed kids walk away fast.
    pub alert_timeout_ms: f64,
    /// Time the alert stays up before forcing a return home, ms
    pub return_home_timeout_ms: f64,

    // === Input ===
    /// Hold window for the Left+Right reset gesture, ms
    pub reset_hold_ms: f64,
    /// Auto-release for hardware presses without a release line, ms
    pub auto_release_ms: f64,

    // === Catch game ===
    /// Score needed to win
    pub catch_win_score: u32,
    /// Interval between stone spawns, ms
    pub spawn_interval_ms: f64,

    // === Recognition ===
    /// Minimum classifier confidence for a detection
    pub confidence_threshold: f32,
    /// Consecutive agreeing samples before a detection confirms
    pub stability_count: u32,
    /// How long the "no stone" notice stays up, ms
    pub no_stone_notice_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alert_timeout_ms: ALERT_TIMEOUT_MS,
            return_home_timeout_ms: RETURN_HOME_TIMEOUT_MS,
            reset_hold_ms: RESET_HOLD_MS,
            auto_release_ms: AUTO_RELEASE_MS,
            catch_win_score: CATCH_WIN_SCORE,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            stability_count: STABILITY_COUNT,
            no_stone_notice_ms: NO_STONE_NOTICE_MS,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; unknown fields are tolerated, missing
    /// fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from a file, falling back to defaults on any failure
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("Bad settings file {}: {} - using defaults", path.display(), err);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No settings file at {} - using defaults", path.display());
                Self::default()
            }
        }
    }
}
