//! Shared session flags
//!
//! One instance lives for the whole application. Screens read it to decide
//! what overlay to render and whether to process game ticks; the input layer,
//! the watchdog and the game engines mutate it. All reads and writes are
//! synchronous - the next read within the same cooperative tick sees the
//! update.
//!
//! Invariants held by the setters:
//! - the success and instruction overlays are never both visible
//! - `has_started` implies the instruction overlay is hidden

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    paused: bool,
    show_instruction: bool,
    has_started: bool,
    show_success: bool,
}

impl SessionState {
    /// State for a freshly entered screen: instruction up, nothing started
    pub fn fresh() -> Self {
        Self {
            paused: false,
            show_instruction: true,
            has_started: false,
            show_success: false,
        }
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn show_instruction(&self) -> bool {
        self.show_instruction
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    pub fn show_success(&self) -> bool {
        self.show_success
    }

    /// The game may advance: started, unpaused, no overlay on top
    pub fn running(&self) -> bool {
        self.has_started && !self.paused && !self.show_instruction && !self.show_success
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn set_show_instruction(&mut self, show: bool) {
        self.show_instruction = show;
        if show {
            self.show_success = false;
            self.has_started = false;
        }
    }

    pub fn set_has_started(&mut self, started: bool) {
        self.has_started = started;
        if started {
            self.show_instruction = false;
        }
    }

    pub fn set_show_success(&mut self, show: bool) {
        self.show_success = show;
        if show {
            self.show_instruction = false;
        }
    }

    /// Dismiss the instruction overlay and begin play
    pub fn start(&mut self) {
        self.show_instruction = false;
        self.has_started = true;
        self.paused = false;
    }

    /// Reset to the entered-screen defaults
    pub fn reset_for_screen(&mut self) {
        *self = Self::fresh();
    }

    /// Suspend for the attention alert: pause, hide the instruction overlay,
    /// and remember what to put back afterwards.
    pub fn suspend_for_alert(&mut self) -> AlertSnapshot {
        let snapshot = AlertSnapshot {
            instruction_was_showing: self.show_instruction,
        };
        self.show_instruction = false;
        self.paused = true;
        snapshot
    }

    /// Restore after the alert is dismissed. An interrupted instruction
    /// overlay comes back un-started and still paused, forcing a deliberate
    /// re-start; interrupted gameplay resumes; static screens just unpause.
    pub fn restore_after_alert(&mut self, snapshot: AlertSnapshot) {
        if snapshot.instruction_was_showing {
            self.show_instruction = true;
            self.has_started = false;
            self.show_success = false;
            self.paused = true;
        } else {
            self.paused = false;
        }
    }
}

/// Session sub-state captured when the attention alert pre-empts a screen
#[derive(Debug, Clone, Copy)]
pub struct AlertSnapshot {
    instruction_was_showing: bool,
}
