//! Stonechest entry point
//!
//! Runs a scripted kiosk session on a virtual clock so the whole flow can be
//! exercised without a display or a serial port attached. The real installation
//! embeds the [`stonechest::Kiosk`] behind its UI shell and feeds it wall-clock
//! timestamps instead.

use glam::Vec2;

use stonechest::bridge::{KeyEdge, SerialBridge};
use stonechest::recognition::Sample;
use stonechest::{Kiosk, Screen, Settings, StoneKind};

const VIEWPORT: Vec2 = Vec2::new(1_920.0, 1_080.0);
const FRAME_MS: f64 = 1_000.0 / 60.0;

fn main() {
    env_logger::init();

    let settings = Settings::load(std::path::Path::new("stonechest.json"));
    let mut kiosk = Kiosk::new(settings.clone(), VIEWPORT, 0xC0FFEE);
    let mut bridge = SerialBridge::new(settings.auto_release_ms);
    let mut now = 0.0_f64;

    log::info!("stonechest demo starting");

    // A visitor puts a rose quartz on the reader. Two confident reads in a row
    // confirm it.
    kiosk.observe_sample(Sample::from_label("rozenkwarts", 0.82));
    kiosk.observe_sample(Sample::from_label("rozenkwarts", 0.79));
    step(&mut kiosk, &mut now, 3);

    // A press on the arcade button opens the fact screen for the stone.
    feed_line(&mut bridge, &mut kiosk, b"red\n", now);
    step(&mut kiosk, &mut now, 3);
    if let Screen::Fact(kind) = kiosk.screen() {
        log::info!("showing facts for {}", kind.display_name());
    }

    // Jump into the catch game and dismiss its instruction overlay.
    kiosk.navigate(Screen::CatchGame(StoneKind::RoseQuartz), now);
    feed_line(&mut bridge, &mut kiosk, b"green\n", now);
    step(&mut kiosk, &mut now, 3);

    // Hold the green (right) button for a while. The bridge auto-releases the
    // key if the firmware never sends the matching release line.
    for _ in 0..8 {
        feed_line(&mut bridge, &mut kiosk, b"green\n", now);
        step(&mut kiosk, &mut now, 6);
        pump_bridge(&mut bridge, &mut kiosk, now);
    }
    if let Some(game) = kiosk.catch_game() {
        log::info!(
            "basket at x={:.0}, score {}",
            game.basket_x(),
            game.score()
        );
    }

    // Walk away. The idle watchdog raises the alert, then sends the kiosk home.
    while !kiosk.screen().is_home() {
        step(&mut kiosk, &mut now, 30);
        if now > 60_000.0 {
            log::warn!("kiosk never returned home");
            break;
        }
    }
    log::info!("demo finished on {:?} at t={:.0}ms", kiosk.screen(), now);
}

/// Advances the virtual clock by whole frames, pumping timers and physics the
/// way the UI shell would from its frame callback.
fn step(kiosk: &mut Kiosk, now: &mut f64, frames: u32) {
    for _ in 0..frames {
        *now += FRAME_MS;
        kiosk.tick(*now);
        kiosk.frame(*now);
        for event in kiosk.take_events() {
            log::info!("[t={:>6.0}ms] {:?}", *now, event);
        }
    }
}

/// Pushes raw serial bytes through the bridge and applies the resulting key
/// edges to the kiosk.
fn feed_line(bridge: &mut SerialBridge, kiosk: &mut Kiosk, line: &[u8], now: f64) {
    for &byte in line {
        bridge.feed(byte, now);
    }
    pump_bridge(bridge, kiosk, now);
}

/// Fires any pending auto-release and applies queued key edges to the kiosk.
fn pump_bridge(bridge: &mut SerialBridge, kiosk: &mut Kiosk, now: f64) {
    bridge.tick(now);
    for edge in bridge.drain() {
        match edge {
            KeyEdge::Down(dir) => {
                kiosk.key_down(dir.key_name(), now);
            }
            KeyEdge::Up(dir) => {
                kiosk.key_up(dir.key_name(), now);
            }
        }
    }
}
