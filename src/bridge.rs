//! Hardware button panel decoder
//!
//! The button panel's microcontroller sends newline-terminated words over
//! serial: a color name on press (`red`, `yellow`, `blue`, `green`) and
//! `<color>_release` on release. The decoder turns that byte stream into the
//! same key edges the keyboard produces, with two safety nets lifted from
//! the exhibit hardware: pressing a second button synthesizes a release for
//! the first, and a lost release line is covered by an auto-release timeout.
//!
//! Port I/O itself is the host's problem; the decoder just eats bytes.

use crate::input::Direction;
use crate::sched::OneShot;

/// Press or release of a directional key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEdge {
    Down(Direction),
    Up(Direction),
}

pub struct SerialBridge {
    line: String,
    active: Option<Direction>,
    auto_release: OneShot,
    auto_release_ms: f64,
    events: Vec<KeyEdge>,
}

impl SerialBridge {
    pub fn new(auto_release_ms: f64) -> Self {
        Self {
            line: String::new(),
            active: None,
            auto_release: OneShot::idle(),
            auto_release_ms,
            events: Vec::new(),
        }
    }

    /// Panel wiring: one colored button per direction
    fn button_to_direction(button: &str) -> Option<Direction> {
        match button {
            "red" => Some(Direction::Up),
            "yellow" => Some(Direction::Down),
            "blue" => Some(Direction::Left),
            "green" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Feed one byte from the serial port
    pub fn feed(&mut self, byte: u8, now_ms: f64) {
        match byte {
            b'\n' | b'\r' => {
                let line = std::mem::take(&mut self.line);
                self.process_line(line.trim(), now_ms);
            }
            _ => self.line.push(byte.to_ascii_lowercase() as char),
        }
    }

    fn process_line(&mut self, line: &str, now_ms: f64) {
        if line.is_empty() {
            return;
        }
        if let Some(button) = line.strip_suffix("_release") {
            let Some(dir) = Self::button_to_direction(button) else {
                log::trace!("ignoring unknown release line {:?}", line);
                return;
            };
            if self.active == Some(dir) {
                self.release(dir);
            }
        } else if let Some(dir) = Self::button_to_direction(line) {
            // A different button still active means its release got lost
            if let Some(previous) = self.active
                && previous != dir
            {
                self.release(previous);
            }
            self.active = Some(dir);
            self.events.push(KeyEdge::Down(dir));
            self.auto_release.arm(now_ms, self.auto_release_ms);
        } else {
            log::trace!("ignoring unknown line {:?}", line);
        }
    }

    fn release(&mut self, dir: Direction) {
        self.events.push(KeyEdge::Up(dir));
        self.active = None;
        self.auto_release.cancel();
    }

    /// Fire the auto-release if its window elapsed without a release line
    pub fn tick(&mut self, now_ms: f64) {
        if self.auto_release.fire(now_ms)
            && let Some(dir) = self.active
        {
            log::debug!("auto-releasing {:?} after {}ms", dir, self.auto_release_ms);
            self.release(dir);
        }
    }

    /// Take the decoded key edges, oldest first
    pub fn drain(&mut self) -> Vec<KeyEdge> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_line(bridge: &mut SerialBridge, line: &str, now_ms: f64) {
        for byte in line.bytes() {
            bridge.feed(byte, now_ms);
        }
        bridge.feed(b'\n', now_ms);
    }

    #[test]
    fn test_press_and_release() {
        let mut bridge = SerialBridge::new(200.0);
        feed_line(&mut bridge, "red", 0.0);
        feed_line(&mut bridge, "red_release", 50.0);
        assert_eq!(
            bridge.drain(),
            vec![KeyEdge::Down(Direction::Up), KeyEdge::Up(Direction::Up)]
        );
    }

    #[test]
    fn test_crlf_and_case_tolerated() {
        let mut bridge = SerialBridge::new(200.0);
        for byte in b"GREEN\r\n" {
            bridge.feed(*byte, 0.0);
        }
        assert_eq!(bridge.drain(), vec![KeyEdge::Down(Direction::Right)]);
    }

    #[test]
    fn test_auto_release_after_timeout() {
        let mut bridge = SerialBridge::new(200.0);
        feed_line(&mut bridge, "blue", 0.0);
        bridge.tick(199.0);
        assert_eq!(bridge.drain(), vec![KeyEdge::Down(Direction::Left)]);
        bridge.tick(200.0);
        assert_eq!(bridge.drain(), vec![KeyEdge::Up(Direction::Left)]);
        // Nothing further
        bridge.tick(1_000.0);
        assert!(bridge.drain().is_empty());
    }

    #[test]
    fn test_real_release_cancels_auto_release() {
        let mut bridge = SerialBridge::new(200.0);
        feed_line(&mut bridge, "blue", 0.0);
        feed_line(&mut bridge, "blue_release", 100.0);
        bridge.drain();
        bridge.tick(500.0);
        assert!(bridge.drain().is_empty());
    }

    #[test]
    fn test_new_press_releases_previous() {
        let mut bridge = SerialBridge::new(200.0);
        feed_line(&mut bridge, "red", 0.0);
        feed_line(&mut bridge, "yellow", 50.0);
        assert_eq!(
            bridge.drain(),
            vec![
                KeyEdge::Down(Direction::Up),
                KeyEdge::Up(Direction::Up),
                KeyEdge::Down(Direction::Down),
            ]
        );
    }

    #[test]
    fn test_repeat_press_rearms_timeout() {
        let mut bridge = SerialBridge::new(200.0);
        feed_line(&mut bridge, "red", 0.0);
        feed_line(&mut bridge, "red", 150.0);
        bridge.tick(250.0);
        // First window elapsed but the repeat re-armed it
        assert_eq!(
            bridge.drain(),
            vec![KeyEdge::Down(Direction::Up), KeyEdge::Down(Direction::Up)]
        );
        bridge.tick(350.0);
        assert_eq!(bridge.drain(), vec![KeyEdge::Up(Direction::Up)]);
    }

    #[test]
    fn test_garbage_lines_ignored() {
        let mut bridge = SerialBridge::new(200.0);
        feed_line(&mut bridge, "purple", 0.0);
        feed_line(&mut bridge, "", 0.0);
        feed_line(&mut bridge, "purple_release", 0.0);
        feed_line(&mut bridge, "release", 0.0);
        assert!(bridge.drain().is_empty());
    }

    #[test]
    fn test_stale_release_ignored() {
        let mut bridge = SerialBridge::new(200.0);
        feed_line(&mut bridge, "red", 0.0);
        bridge.tick(250.0); // auto-release already went out
        feed_line(&mut bridge, "red_release", 300.0);
        assert_eq!(
            bridge.drain(),
            vec![KeyEdge::Down(Direction::Up), KeyEdge::Up(Direction::Up)]
        );
    }
}
