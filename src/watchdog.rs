//! Inactivity watchdog
//!
//! Two-stage escalation: after a stretch without visitor activity an
//! attention alert goes up; if nobody answers within the second window the
//! kiosk is sent back to the home screen. On the home screen neither timer
//! runs - the camera view is the resting state.
//!
//! The watchdog only decides *when*; the session side effects (pausing,
//! hiding overlays, restoring state on dismissal) are applied by the kiosk
//! through [`crate::session::SessionState::suspend_for_alert`].

use crate::sched::OneShot;

/// Effects the owner must apply after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogEffect {
    /// Idle too long: raise the attention alert
    RaiseAlert,
    /// Alert went unanswered: force navigation to the home screen
    ReturnHome,
}

pub struct IdleWatchdog {
    alert_timeout_ms: f64,
    return_home_timeout_ms: f64,
    alert_timer: OneShot,
    home_timer: OneShot,
    alert_showing: bool,
    on_home_screen: bool,
}

impl IdleWatchdog {
    pub fn new(alert_timeout_ms: f64, return_home_timeout_ms: f64) -> Self {
        Self {
            alert_timeout_ms,
            return_home_timeout_ms,
            alert_timer: OneShot::idle(),
            home_timer: OneShot::idle(),
            alert_showing: false,
            on_home_screen: true,
        }
    }

    pub fn alert_showing(&self) -> bool {
        self.alert_showing
    }

    /// Called on every screen change. Home disarms everything; any other
    /// screen starts the alert timer from scratch.
    pub fn set_screen(&mut self, home: bool, now_ms: f64) {
        self.on_home_screen = home;
        self.clear(now_ms);
    }

    /// Qualifying visitor activity (pointer move, key down, click, touch).
    /// Resets the alert timer and clears an active alert.
    pub fn activity(&mut self, now_ms: f64) {
        self.clear(now_ms);
    }

    /// Explicit acknowledgement of the alert. Same timer outcome as
    /// activity; kept separate so the caller knows to restore session state.
    pub fn dismiss_alert(&mut self, now_ms: f64) {
        self.clear(now_ms);
    }

    fn clear(&mut self, now_ms: f64) {
        self.alert_timer.cancel();
        self.home_timer.cancel();
        self.alert_showing = false;
        if !self.on_home_screen {
            self.alert_timer.arm(now_ms, self.alert_timeout_ms);
        }
    }

    /// Drive the timers. At most one effect per tick.
    pub fn tick(&mut self, now_ms: f64) -> Option<WatchdogEffect> {
        if self.on_home_screen {
            return None;
        }
        if self.alert_timer.fire(now_ms) {
            self.alert_showing = true;
            self.home_timer.arm(now_ms, self.return_home_timeout_ms);
            return Some(WatchdogEffect::RaiseAlert);
        }
        if self.home_timer.fire(now_ms) {
            self.alert_showing = false;
            self.alert_timer.cancel();
            return Some(WatchdogEffect::ReturnHome);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watchdog_on_game_screen() -> IdleWatchdog {
        let mut watchdog = IdleWatchdog::new(3_000.0, 10_000.0);
        watchdog.set_screen(false, 0.0);
        watchdog
    }

    #[test]
    fn test_alert_then_forced_home() {
        let mut watchdog = watchdog_on_game_screen();
        assert_eq!(watchdog.tick(2_999.0), None);
        assert_eq!(watchdog.tick(3_000.0), Some(WatchdogEffect::RaiseAlert));
        assert!(watchdog.alert_showing());
        assert_eq!(watchdog.tick(12_999.0), None);
        assert_eq!(watchdog.tick(13_000.0), Some(WatchdogEffect::ReturnHome));
        assert!(!watchdog.alert_showing());
        // Both timers cleared: nothing more ever fires
        assert_eq!(watchdog.tick(1_000_000.0), None);
    }

    #[test]
    fn test_activity_resets_alert_timer() {
        let mut watchdog = watchdog_on_game_screen();
        watchdog.activity(2_500.0);
        assert_eq!(watchdog.tick(3_000.0), None);
        assert_eq!(watchdog.tick(5_500.0), Some(WatchdogEffect::RaiseAlert));
    }

    #[test]
    fn test_activity_clears_active_alert() {
        let mut watchdog = watchdog_on_game_screen();
        assert_eq!(watchdog.tick(3_000.0), Some(WatchdogEffect::RaiseAlert));
        watchdog.activity(4_000.0);
        assert!(!watchdog.alert_showing());
        // Home timer disarmed, alert timer re-armed from the activity
        assert_eq!(watchdog.tick(13_000.0), Some(WatchdogEffect::RaiseAlert));
    }

    #[test]
    fn test_dismiss_rearms_alert_timer() {
        let mut watchdog = watchdog_on_game_screen();
        watchdog.tick(3_000.0);
        watchdog.dismiss_alert(4_000.0);
        assert!(!watchdog.alert_showing());
        assert_eq!(watchdog.tick(6_999.0), None);
        assert_eq!(watchdog.tick(7_000.0), Some(WatchdogEffect::RaiseAlert));
    }

    #[test]
    fn test_idle_on_home_screen() {
        let mut watchdog = IdleWatchdog::new(3_000.0, 10_000.0);
        watchdog.set_screen(true, 0.0);
        assert_eq!(watchdog.tick(1_000_000.0), None);
        assert!(!watchdog.alert_showing());
    }

    #[test]
    fn test_returning_home_disarms_timers() {
        let mut watchdog = watchdog_on_game_screen();
        watchdog.tick(3_000.0);
        watchdog.set_screen(true, 5_000.0);
        assert!(!watchdog.alert_showing());
        assert_eq!(watchdog.tick(1_000_000.0), None);
    }
}
