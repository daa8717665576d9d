//! Kiosk orchestrator
//!
//! Owns the screen, the shared session flags, the input fan-out, the idle
//! watchdog and the active mini-game, and wires them together. The host
//! shell feeds it raw key edges, classifier samples, frames and a clock, and
//! drains [`KioskEvent`]s to do the actual rendering, audio and addressing.
//!
//! Two listeners ride the router for the lifetime of a screen: the app
//! listener (confirm-on-any-press, reset gesture back to home) and, only
//! while the attention alert is up, a gate-bypassing alert listener so the
//! alert can always be dismissed.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::{GLASS_SIZE, TARGET_SIZE};
use crate::games::{CatchGame, GameEvent, Rect, SearchGame};
use crate::input::{Direction, InputCommand, InputGate, InputRouter, Listener, ListenerId};
use crate::recognition::{RecognitionFilter, Sample};
use crate::sched::OneShot;
use crate::session::{AlertSnapshot, SessionState};
use crate::settings::Settings;
use crate::stones::StoneKind;
use crate::watchdog::{IdleWatchdog, WatchdogEffect};

/// Abstract navigation destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Fact(StoneKind),
    CatchGame(StoneKind),
    SearchGame(StoneKind),
}

impl Screen {
    pub fn is_home(&self) -> bool {
        matches!(self, Screen::Home)
    }

    fn is_game(&self) -> bool {
        matches!(self, Screen::CatchGame(_) | Screen::SearchGame(_))
    }
}

/// Everything the presentation shell needs to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KioskEvent {
    /// The kiosk moved to a new screen
    Navigated(Screen),
    AlertRaised,
    AlertDismissed,
    /// Cue from the active mini-game
    Game(GameEvent),
    /// The recognition filter confirmed a stone under the camera
    StoneConfirmed(StoneKind),
    /// Confirm pressed on home with nothing under the camera
    NoStoneNotice,
    NoStoneNoticeCleared,
}

/// Commands the router listeners hand back to the kiosk
#[derive(Debug, Clone, Copy)]
enum Routed {
    Command(InputCommand),
    AlertPress,
    Reset,
}

enum ActiveGame {
    None,
    Catch(CatchGame),
    Search(SearchGame),
}

pub struct Kiosk {
    settings: Settings,
    screen: Screen,
    session: SessionState,
    /// Play area size handed to the game engines, pixels
    viewport: Vec2,
    gate: InputGate,
    router: InputRouter,
    routed: Rc<RefCell<Vec<Routed>>>,
    alert_listener: Option<ListenerId>,
    alert_snapshot: Option<AlertSnapshot>,
    watchdog: IdleWatchdog,
    recognition: RecognitionFilter,
    no_stone_notice: OneShot,
    no_stone_showing: bool,
    game: ActiveGame,
    rng: Pcg32,
    events: Vec<KioskEvent>,
}

impl Kiosk {
    pub fn new(settings: Settings, viewport: Vec2, seed: u64) -> Self {
        let gate = InputGate::new();
        let mut router = InputRouter::new(gate.clone(), settings.reset_hold_ms);
        let routed: Rc<RefCell<Vec<Routed>>> = Rc::default();

        let sink = routed.clone();
        let reset_sink = routed.clone();
        router.subscribe(
            Listener::new(move |cmd| sink.borrow_mut().push(Routed::Command(cmd)))
                .confirm_on_any_press()
                .on_reset(move || reset_sink.borrow_mut().push(Routed::Reset)),
        );

        let watchdog = IdleWatchdog::new(settings.alert_timeout_ms, settings.return_home_timeout_ms);
        let recognition =
            RecognitionFilter::new(settings.confidence_threshold, settings.stability_count);

        Self {
            settings,
            screen: Screen::Home,
            session: SessionState::default(),
            viewport,
            gate,
            router,
            routed,
            alert_listener: None,
            alert_snapshot: None,
            watchdog,
            recognition,
            no_stone_notice: OneShot::idle(),
            no_stone_showing: false,
            game: ActiveGame::None,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn alert_showing(&self) -> bool {
        self.watchdog.alert_showing()
    }

    pub fn no_stone_showing(&self) -> bool {
        self.no_stone_showing
    }

    pub fn catch_game(&self) -> Option<&CatchGame> {
        match &self.game {
            ActiveGame::Catch(game) => Some(game),
            _ => None,
        }
    }

    pub fn search_game(&self) -> Option<&SearchGame> {
        match &self.game {
            ActiveGame::Search(game) => Some(game),
            _ => None,
        }
    }

    /// Take the accumulated shell events, oldest first
    pub fn take_events(&mut self) -> Vec<KioskEvent> {
        std::mem::take(&mut self.events)
    }

    /// Move to a screen: tear down the old engine, reset the session to the
    /// screen's defaults, build the new engine, re-seat the watchdog.
    pub fn navigate(&mut self, screen: Screen, now_ms: f64) {
        match &mut self.game {
            ActiveGame::Catch(game) => game.teardown(),
            ActiveGame::Search(game) => game.teardown(),
            ActiveGame::None => {}
        }
        // A forced return home can happen with the alert still up
        if self.watchdog.alert_showing() || self.alert_listener.is_some() {
            self.gate.unblock();
            if let Some(id) = self.alert_listener.take() {
                self.router.unsubscribe(id);
            }
            self.alert_snapshot = None;
        }

        self.screen = screen;
        self.session = if screen.is_game() {
            SessionState::fresh()
        } else {
            SessionState::default()
        };
        self.game = match screen {
            Screen::CatchGame(kind) => ActiveGame::Catch(CatchGame::new(
                kind,
                self.viewport,
                self.settings.catch_win_score,
                self.settings.spawn_interval_ms,
                self.rng.random(),
            )),
            Screen::SearchGame(kind) => ActiveGame::Search(SearchGame::new(
                kind,
                Rect::from_pos_size(Vec2::ZERO, self.viewport),
                Vec2::splat(GLASS_SIZE),
                Vec2::splat(TARGET_SIZE),
                self.rng.random(),
            )),
            _ => ActiveGame::None,
        };
        self.no_stone_notice.cancel();
        self.no_stone_showing = false;
        self.watchdog.set_screen(screen.is_home(), now_ms);
        self.events.push(KioskEvent::Navigated(screen));
        log::info!("navigated to {:?}", screen);
    }

    /// Raw key-down from the keyboard or the button bridge. Returns true if
    /// the key is mapped (host should suppress its default handling).
    pub fn key_down(&mut self, key: &str, now_ms: f64) -> bool {
        let handled = self.router.key_down(key, now_ms);
        if !handled {
            return false;
        }
        // The search game reads held keys directly, gate willing
        if !self.gate.is_blocked()
            && let Some(dir) = Direction::from_key(key)
            && let ActiveGame::Search(game) = &mut self.game
        {
            game.key_down(dir, now_ms);
        }
        let was_alert = self.watchdog.alert_showing();
        self.process_routed(now_ms);
        if !was_alert {
            self.watchdog.activity(now_ms);
        }
        true
    }

    /// Raw key-up. Release is never gated - held state must not go stale.
    pub fn key_up(&mut self, key: &str, now_ms: f64) -> bool {
        let handled = self.router.key_up(key, now_ms);
        if handled
            && let Some(dir) = Direction::from_key(key)
            && let ActiveGame::Search(game) = &mut self.game
        {
            game.key_up(dir);
        }
        handled
    }

    /// Non-key visitor activity: pointer move, click, touch
    pub fn pointer_activity(&mut self, now_ms: f64) {
        if self.watchdog.alert_showing() {
            self.dismiss_alert(now_ms);
        } else {
            self.watchdog.activity(now_ms);
        }
    }

    /// Feed one classifier sample
    pub fn observe_sample(&mut self, sample: Sample) {
        if let Some(kind) = self.recognition.observe(sample) {
            self.events.push(KioskEvent::StoneConfirmed(kind));
        }
    }

    /// Classifier reported itself unavailable
    pub fn recognition_failed(&mut self) {
        self.recognition.mark_failed();
    }

    pub fn recognition(&self) -> &RecognitionFilter {
        &self.recognition
    }

    /// Wall-clock tick: timers, watchdog, active game
    pub fn tick(&mut self, now_ms: f64) {
        self.router.tick(now_ms);
        self.process_routed(now_ms);

        match self.watchdog.tick(now_ms) {
            Some(WatchdogEffect::RaiseAlert) => self.raise_alert(now_ms),
            Some(WatchdogEffect::ReturnHome) => {
                log::info!("idle alert unanswered, returning home");
                self.navigate(Screen::Home, now_ms);
            }
            None => {}
        }

        if self.no_stone_notice.fire(now_ms) {
            self.no_stone_showing = false;
            self.events.push(KioskEvent::NoStoneNoticeCleared);
        }

        match &mut self.game {
            ActiveGame::Catch(game) => {
                game.tick(now_ms, &self.session);
                self.events
                    .extend(game.drain_events().into_iter().map(KioskEvent::Game));
            }
            ActiveGame::Search(game) => {
                game.tick(now_ms, &mut self.session);
                self.events
                    .extend(game.drain_events().into_iter().map(KioskEvent::Game));
            }
            ActiveGame::None => {}
        }
    }

    /// Animation-frame callback: the catch game's physics advance
    pub fn frame(&mut self, _now_ms: f64) {
        if let ActiveGame::Catch(game) = &mut self.game {
            game.frame(&mut self.session);
            self.events
                .extend(game.drain_events().into_iter().map(KioskEvent::Game));
        }
    }

    fn process_routed(&mut self, now_ms: f64) {
        let routed: Vec<Routed> = self.routed.borrow_mut().drain(..).collect();
        for entry in routed {
            match entry {
                Routed::Reset => {
                    log::info!("reset gesture, returning home");
                    self.navigate(Screen::Home, now_ms);
                }
                Routed::AlertPress => {
                    if self.watchdog.alert_showing() {
                        self.dismiss_alert(now_ms);
                    }
                }
                Routed::Command(cmd) => self.route_command(cmd, now_ms),
            }
        }
    }

    fn route_command(&mut self, cmd: InputCommand, now_ms: f64) {
        // A win overlay on any game screen: confirm heads back home
        if self.session.show_success() {
            if cmd == InputCommand::Confirm {
                self.navigate(Screen::Home, now_ms);
            }
            return;
        }
        match self.screen {
            Screen::Home => {
                if cmd == InputCommand::Confirm {
                    self.confirm_on_home(now_ms);
                }
            }
            Screen::Fact(_) => {}
            Screen::CatchGame(_) => {
                if let ActiveGame::Catch(game) = &mut self.game {
                    if self.session.show_instruction() {
                        if cmd == InputCommand::Confirm {
                            game.start(now_ms, &mut self.session);
                        }
                    } else {
                        game.handle_command(cmd, &self.session);
                    }
                }
            }
            Screen::SearchGame(_) => {
                if let ActiveGame::Search(game) = &mut self.game
                    && self.session.show_instruction()
                    && cmd == InputCommand::Confirm
                {
                    game.start(now_ms, &mut self.session);
                }
            }
        }
    }

    /// Confirm on the home screen: a confirmed stone opens its fact page,
    /// otherwise a transient "no stone" notice
    fn confirm_on_home(&mut self, now_ms: f64) {
        match self.recognition.detected() {
            Some(kind) => self.navigate(Screen::Fact(kind), now_ms),
            None => {
                self.no_stone_showing = true;
                self.no_stone_notice.arm(now_ms, self.settings.no_stone_notice_ms);
                self.events.push(KioskEvent::NoStoneNotice);
            }
        }
    }

    fn raise_alert(&mut self, _now_ms: f64) {
        self.alert_snapshot = Some(self.session.suspend_for_alert());
        self.gate.block();
        let sink = self.routed.clone();
        self.alert_listener = Some(
            self.router.subscribe(
                Listener::new(move |_| sink.borrow_mut().push(Routed::AlertPress))
                    .confirm_on_any_press()
                    .allow_when_blocked(),
            ),
        );
        self.events.push(KioskEvent::AlertRaised);
        log::info!("attention alert raised on {:?}", self.screen);
    }

    fn dismiss_alert(&mut self, now_ms: f64) {
        self.watchdog.dismiss_alert(now_ms);
        self.gate.unblock();
        if let Some(id) = self.alert_listener.take() {
            self.router.unsubscribe(id);
        }
        if let Some(snapshot) = self.alert_snapshot.take() {
            self.session.restore_after_alert(snapshot);
        }
        self.events.push(KioskEvent::AlertDismissed);
        log::info!("attention alert dismissed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::GamePhase;

    const VIEWPORT: Vec2 = Vec2::new(1_024.0, 768.0);

    fn kiosk() -> Kiosk {
        Kiosk::new(Settings::default(), VIEWPORT, 42)
    }

    fn press(kiosk: &mut Kiosk, key: &str, now_ms: f64) {
        kiosk.key_down(key, now_ms);
        kiosk.key_up(key, now_ms + 30.0);
    }

    fn confirmed_stone(kiosk: &mut Kiosk, kind: StoneKind) {
        for _ in 0..2 {
            kiosk.observe_sample(Sample {
                kind: Some(kind),
                confidence: 0.9,
            });
        }
    }

    #[test]
    fn test_home_confirm_without_stone_shows_notice() {
        let mut kiosk = kiosk();
        press(&mut kiosk, "ArrowUp", 0.0);
        assert!(kiosk.no_stone_showing());
        assert!(kiosk.take_events().contains(&KioskEvent::NoStoneNotice));

        // Auto-clears after the notice window
        kiosk.tick(4_000.0);
        assert!(!kiosk.no_stone_showing());
        assert!(
            kiosk
                .take_events()
                .contains(&KioskEvent::NoStoneNoticeCleared)
        );
    }

    #[test]
    fn test_home_confirm_with_stone_opens_fact() {
        let mut kiosk = kiosk();
        confirmed_stone(&mut kiosk, StoneKind::Citrine);
        assert!(
            kiosk
                .take_events()
                .contains(&KioskEvent::StoneConfirmed(StoneKind::Citrine))
        );
        press(&mut kiosk, "ArrowUp", 0.0);
        assert_eq!(kiosk.screen(), Screen::Fact(StoneKind::Citrine));
    }

    #[test]
    fn test_catch_screen_confirm_starts_game() {
        let mut kiosk = kiosk();
        kiosk.navigate(Screen::CatchGame(StoneKind::Obsidian), 0.0);
        assert!(kiosk.session().show_instruction());

        press(&mut kiosk, "ArrowUp", 100.0);
        assert!(kiosk.session().running());
        assert_eq!(kiosk.catch_game().unwrap().phase(), GamePhase::Running);

        // Movement now reaches the basket
        let before = kiosk.catch_game().unwrap().basket_x();
        press(&mut kiosk, "ArrowRight", 200.0);
        assert!(kiosk.catch_game().unwrap().basket_x() > before);
    }

    #[test]
    fn test_search_screen_forwards_key_edges() {
        let mut kiosk = kiosk();
        kiosk.navigate(Screen::SearchGame(StoneKind::Amethyst), 0.0);
        press(&mut kiosk, "ArrowUp", 0.0); // dismiss instruction
        let start = kiosk.search_game().unwrap().glass().pos;

        kiosk.key_down("ArrowRight", 100.0);
        kiosk.tick(400.0);
        kiosk.key_up("ArrowRight", 400.0);
        assert!(kiosk.search_game().unwrap().glass().pos.x > start.x);
    }

    #[test]
    fn test_idle_escalation_forces_home_once() {
        let mut kiosk = kiosk();
        kiosk.navigate(Screen::Fact(StoneKind::Citrine), 0.0);
        kiosk.take_events();

        kiosk.tick(3_000.0);
        assert!(kiosk.alert_showing());
        assert!(kiosk.take_events().contains(&KioskEvent::AlertRaised));

        kiosk.tick(13_000.0);
        assert_eq!(kiosk.screen(), Screen::Home);
        let events = kiosk.take_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == KioskEvent::Navigated(Screen::Home))
                .count(),
            1
        );
        // Timers fully cleared afterwards
        kiosk.tick(1_000_000.0);
        assert!(!kiosk.alert_showing());
        assert_eq!(kiosk.screen(), Screen::Home);
    }

    #[test]
    fn test_alert_pauses_and_dismissal_restores_instruction() {
        let mut kiosk = kiosk();
        kiosk.navigate(Screen::CatchGame(StoneKind::Obsidian), 0.0);
        // Instruction still up when the alert hits
        kiosk.tick(3_000.0);
        assert!(kiosk.alert_showing());
        assert!(kiosk.session().paused());
        assert!(!kiosk.session().show_instruction());

        // Any press dismisses; the instruction comes back, still paused
        press(&mut kiosk, "ArrowDown", 3_500.0);
        assert!(!kiosk.alert_showing());
        assert!(kiosk.session().show_instruction());
        assert!(!kiosk.session().has_started());
        assert!(kiosk.session().paused());
        assert!(kiosk.take_events().contains(&KioskEvent::AlertDismissed));
    }

    #[test]
    fn test_alert_dismissal_resumes_running_game() {
        let mut kiosk = kiosk();
        kiosk.navigate(Screen::CatchGame(StoneKind::Obsidian), 0.0);
        press(&mut kiosk, "ArrowUp", 0.0); // start
        assert!(kiosk.session().running());

        kiosk.tick(3_100.0);
        assert!(kiosk.alert_showing());
        assert!(kiosk.session().paused());

        kiosk.pointer_activity(3_500.0);
        assert!(!kiosk.alert_showing());
        assert!(kiosk.session().running());
    }

    #[test]
    fn test_gate_suppresses_game_input_during_alert() {
        let mut kiosk = kiosk();
        kiosk.navigate(Screen::CatchGame(StoneKind::Obsidian), 0.0);
        press(&mut kiosk, "ArrowUp", 0.0);
        press(&mut kiosk, "ArrowRight", 100.0);
        let basket = kiosk.catch_game().unwrap().basket_x();

        kiosk.tick(3_200.0);
        assert!(kiosk.alert_showing());
        // This press dismisses the alert but must not also move the basket
        press(&mut kiosk, "ArrowRight", 3_300.0);
        assert_eq!(kiosk.catch_game().unwrap().basket_x(), basket);
    }

    #[test]
    fn test_reset_gesture_returns_home() {
        let mut kiosk = kiosk();
        kiosk.navigate(Screen::SearchGame(StoneKind::RoseQuartz), 0.0);
        kiosk.key_down("ArrowLeft", 100.0);
        kiosk.key_down("ArrowRight", 120.0);
        kiosk.tick(300.0);
        assert_eq!(kiosk.screen(), Screen::Home);
    }

    #[test]
    fn test_navigation_resets_session_and_engine() {
        let mut kiosk = kiosk();
        kiosk.navigate(Screen::CatchGame(StoneKind::Obsidian), 0.0);
        press(&mut kiosk, "ArrowUp", 0.0);
        kiosk.tick(1_000.0);
        assert!(!kiosk.catch_game().unwrap().stones().is_empty());

        // Re-entering the screen starts a fresh session
        kiosk.navigate(Screen::CatchGame(StoneKind::Obsidian), 2_000.0);
        assert!(kiosk.session().show_instruction());
        assert!(kiosk.catch_game().unwrap().stones().is_empty());
        assert_eq!(kiosk.catch_game().unwrap().score(), 0);
    }

    #[test]
    fn test_success_overlay_confirm_goes_home() {
        let mut kiosk = kiosk();
        kiosk.navigate(Screen::SearchGame(StoneKind::Amethyst), 0.0);
        press(&mut kiosk, "ArrowUp", 0.0);
        // Force the win path through the session rather than gameplay
        kiosk.session.set_paused(true);
        kiosk.session.set_show_success(true);
        press(&mut kiosk, "ArrowUp", 500.0);
        assert_eq!(kiosk.screen(), Screen::Home);
    }

    #[test]
    fn test_unmounted_engine_stays_silent() {
        let mut kiosk = kiosk();
        kiosk.navigate(Screen::CatchGame(StoneKind::Obsidian), 0.0);
        press(&mut kiosk, "ArrowUp", 0.0);
        kiosk.tick(1_000.0);
        kiosk.navigate(Screen::Home, 1_500.0);
        kiosk.take_events();

        // Ticks and frames after teardown produce no game events
        kiosk.tick(10_000.0);
        kiosk.frame(10_016.0);
        assert!(
            kiosk
                .take_events()
                .iter()
                .all(|e| !matches!(e, KioskEvent::Game(_)))
        );
    }
}
