//! Session state machine
//!
//! `Session` owns the match state and is the only entry point for the host:
//! mode selection, match start, input events, the per-frame loop and the
//! opponent's fire timer all go through it. The host schedules the frame chain
//! and the fire interval; the session tells it when to stop through
//! `FrameStatus` and `FireStatus`.

use glam::Vec2;

use crate::Viewport;
use crate::audio::{Cue, CueSink};
use crate::render::{ActorId, ColorToken, RenderSink};
use crate::settings::Settings;
use crate::sim::combat::{resolve_opponent_volley, resolve_player_shot};
use crate::sim::{
    FireSchedule, InputState, Key, MatchOutcome, MatchPhase, MatchState, ModeConfig, tick,
};

/// Issued by `start_match`; ties scheduled callbacks to one match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchHandle {
    pub generation: u64,
    /// Period for the host's opponent fire timer
    pub fire_interval_ms: u32,
}

/// Whether the host should request another animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Stop,
}

/// Whether the host should keep its fire interval running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireStatus {
    Fired,
    Cancelled,
}

/// Controller for one player's sequence of matches
pub struct Session<R, A> {
    state: MatchState,
    mode: ModeConfig,
    input: InputState,
    fire: FireSchedule,
    settings: Settings,
    render: R,
    audio: A,
}

impl<R: RenderSink, A: CueSink> Session<R, A> {
    pub fn new(settings: Settings, render: R, audio: A) -> Self {
        let mode = ModeConfig::preset(&settings.default_mode).unwrap_or_else(|| {
            log::warn!("Unknown default mode '{}', using Rifle", settings.default_mode);
            ModeConfig::default()
        });
        Self {
            state: MatchState::new(),
            mode,
            input: InputState::default(),
            fire: FireSchedule::default(),
            settings,
            render,
            audio,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    pub fn mode(&self) -> &ModeConfig {
        &self.mode
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    // === Mode UI ===

    /// Choose the difficulty for the next match. Ignored during PLAY.
    pub fn select_mode(&mut self, mode: ModeConfig) -> bool {
        if self.state.is_playing() {
            log::debug!("Mode change to '{}' ignored mid-match", mode.label);
            return false;
        }
        self.render.set_active_mode(&mode.label);
        self.render.set_start_control_visible(true);
        self.audio.wake();
        self.audio.play(Cue::ModeSelect);
        log::info!(
            "Mode selected: {} ({} ms, {} dmg)",
            mode.label,
            mode.fire_interval_ms,
            mode.damage_per_hit
        );
        self.mode = mode;
        true
    }

    /// MENU -> PLAY. Returns `None` if a match is already running.
    pub fn start_match(&mut self, now_ms: f64) -> Option<MatchHandle> {
        if self.state.is_playing() {
            log::debug!("start_match ignored, already playing");
            return None;
        }
        self.audio.wake();

        self.state.begin(now_ms);
        let generation = self.fire.arm();

        self.render.set_overlay_visible(false);
        self.render.set_actor_visible(ActorId::Opponent, true);
        self.render.set_weapon_visible(ActorId::Player, true);
        self.sync_health();
        self.sync_transforms();

        log::info!("Match {} started ({})", generation, self.mode.label);
        Some(MatchHandle {
            generation,
            fire_interval_ms: self.mode.fire_interval_ms,
        })
    }

    /// PLAY -> MENU. A no-op outside PLAY, so repeated calls have no effect.
    pub fn end_match(&mut self, player_won: bool) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.fire.disarm();

        let outcome = MatchOutcome::from_player_won(player_won);
        self.state.finish(outcome);

        let (color, cue) = match outcome {
            MatchOutcome::Victory => (ColorToken::Success, Cue::Victory),
            MatchOutcome::Defeat => (ColorToken::Danger, Cue::Defeat),
        };
        self.render.set_overlay_visible(true);
        self.render.set_start_control_visible(false);
        self.render.set_overlay_text(outcome.label(), color);
        self.audio.play(cue);

        log::info!("Match {} ended: {}", self.fire.generation(), outcome.label());
        true
    }

    // === Input ===

    pub fn key_down(&mut self, key: &str) {
        match Key::from_dom_key(key) {
            Some(Key::Equip) => self.equip(),
            Some(k) => {
                self.input.set_key(k, true);
            }
            None => {}
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(k) = Key::from_dom_key(key) {
            self.input.set_key(k, false);
        }
    }

    pub fn pointer_move(&mut self, at: Vec2) {
        self.input.pointer = at;
    }

    /// Draw the weapon mid-match
    pub fn equip(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        self.state.player.armed = true;
        self.render.set_weapon_visible(ActorId::Player, true);
        self.audio.play(Cue::Equip);
    }

    /// Player pulls the trigger at `at`
    pub fn pointer_down(&mut self, at: Vec2) {
        self.input.pointer = at;
        if !self.state.is_playing() || !self.state.player.armed {
            return;
        }

        let shot = resolve_player_shot(&mut self.state, at);
        self.render.spawn_bullet_trace(shot.from, shot.to, ColorToken::Tracer);
        self.audio.play(Cue::PlayerShot);

        let Some(hit) = shot.hit else { return };
        self.sync_health();
        self.render.spawn_damage_popup(at, hit.amount);
        self.audio.play(Cue::HitConfirm);
        log::debug!("Hit for {}, opponent at {}", hit.amount, hit.remaining);

        if hit.downed {
            self.end_match(true);
        }
    }

    // === Scheduled tasks ===

    /// One display refresh. Returns `Stop` once the match is over or the
    /// handle belongs to an earlier match; the host must not re-arm then.
    pub fn on_frame(
        &mut self,
        handle: MatchHandle,
        now_ms: f64,
        viewport: Viewport,
    ) -> FrameStatus {
        if !self.is_current(handle) {
            return FrameStatus::Stop;
        }
        tick(&mut self.state, &self.input, viewport, now_ms);
        self.sync_transforms();
        FrameStatus::Continue
    }

    /// One opponent shot. Returns `Cancelled` when the timer should be cleared.
    pub fn on_opponent_fire(&mut self, handle: MatchHandle) -> FireStatus {
        if !self.is_current(handle) || !self.fire.admits(handle.generation) {
            return FireStatus::Cancelled;
        }

        let volley = resolve_opponent_volley(&mut self.state, &self.mode);
        self.render.spawn_bullet_trace(volley.from, volley.to, ColorToken::Danger);
        self.audio.play(Cue::OpponentShot);
        self.sync_health();
        if self.settings.effective_flash() {
            self.render.flash_screen(ColorToken::Danger);
        }

        if volley.damage.downed {
            self.end_match(false);
        }
        FireStatus::Fired
    }

    fn is_current(&self, handle: MatchHandle) -> bool {
        self.state.is_playing() && handle.generation == self.fire.generation()
    }

    fn sync_health(&mut self) {
        self.render.set_health_bar(ActorId::Player, self.state.player.health_percent());
        self.render.set_health_bar(ActorId::Opponent, self.state.opponent.health_percent());
    }

    fn sync_transforms(&mut self) {
        let player = &self.state.player;
        self.render.set_actor_transform(ActorId::Player, player.pos, player.aim, Some(player.tilt));
        let opponent = &self.state.opponent;
        self.render.set_actor_transform(ActorId::Opponent, opponent.pos, opponent.aim, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Tone;
    use crate::consts::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Transform(ActorId),
        ActorVisible(ActorId, bool),
        WeaponVisible(ActorId, bool),
        Health(ActorId, f32),
        OverlayVisible(bool),
        OverlayText(String, ColorToken),
        StartVisible(bool),
        ActiveMode(String),
        Trace(Vec2, Vec2, ColorToken),
        Popup(Vec2, i32),
        Flash(ColorToken),
    }

    #[derive(Default)]
    struct Recorder(Vec<Call>);

    impl Recorder {
        fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.0.iter().filter(|c| pred(*c)).count()
        }
    }

    impl RenderSink for Recorder {
        fn set_actor_transform(
            &mut self,
            actor: ActorId,
            _pos: Vec2,
            _rotation: f32,
            _tilt: Option<f32>,
        ) {
            self.0.push(Call::Transform(actor));
        }
        fn set_actor_visible(&mut self, actor: ActorId, visible: bool) {
            self.0.push(Call::ActorVisible(actor, visible));
        }
        fn set_weapon_visible(&mut self, actor: ActorId, visible: bool) {
            self.0.push(Call::WeaponVisible(actor, visible));
        }
        fn set_health_bar(&mut self, actor: ActorId, percent: f32) {
            self.0.push(Call::Health(actor, percent));
        }
        fn set_overlay_visible(&mut self, visible: bool) {
            self.0.push(Call::OverlayVisible(visible));
        }
        fn set_overlay_text(&mut self, text: &str, color: ColorToken) {
            self.0.push(Call::OverlayText(text.to_string(), color));
        }
        fn set_start_control_visible(&mut self, visible: bool) {
            self.0.push(Call::StartVisible(visible));
        }
        fn set_active_mode(&mut self, label: &str) {
            self.0.push(Call::ActiveMode(label.to_string()));
        }
        fn spawn_bullet_trace(&mut self, from: Vec2, to: Vec2, color: ColorToken) {
            self.0.push(Call::Trace(from, to, color));
        }
        fn spawn_damage_popup(&mut self, at: Vec2, amount: i32) {
            self.0.push(Call::Popup(at, amount));
        }
        fn flash_screen(&mut self, color: ColorToken) {
            self.0.push(Call::Flash(color));
        }
    }

    #[derive(Default)]
    struct Tape {
        tones: Vec<Tone>,
        wakes: usize,
    }

    impl Tape {
        fn count(&self, cue: Cue) -> usize {
            self.tones.iter().filter(|t| **t == cue.tone()).count()
        }
    }

    impl CueSink for Tape {
        fn play_tone(&mut self, tone: Tone) {
            self.tones.push(tone);
        }
        fn wake(&mut self) {
            self.wakes += 1;
        }
    }

    fn session() -> Session<Recorder, Tape> {
        Session::new(Settings::default(), Recorder::default(), Tape::default())
    }

    fn rifle_match() -> (Session<Recorder, Tape>, MatchHandle) {
        let mut s = session();
        assert!(s.select_mode(ModeConfig::new("Rifle", 600, 15).unwrap()));
        let handle = s.start_match(0.0).unwrap();
        (s, handle)
    }

    #[test]
    fn test_select_mode_in_menu() {
        let mut s = session();
        assert!(s.select_mode(ModeConfig::pistol()));
        assert_eq!(s.mode().label, "Pistol");
        assert!(s.render().0.contains(&Call::ActiveMode("Pistol".into())));
        assert!(s.render().0.contains(&Call::StartVisible(true)));
        assert_eq!(s.audio().count(Cue::ModeSelect), 1);
        assert_eq!(s.audio().wakes, 1);
    }

    #[test]
    fn test_select_mode_ignored_during_play() {
        let (mut s, _) = rifle_match();
        assert!(!s.select_mode(ModeConfig::minigun()));
        assert_eq!(s.mode().label, "Rifle");
        assert_eq!(s.audio().count(Cue::ModeSelect), 1);
    }

    #[test]
    fn test_start_match_resets_and_arms() {
        let (s, handle) = rifle_match();
        assert_eq!(s.phase(), MatchPhase::Play);
        assert_eq!(handle.fire_interval_ms, 600);
        assert_eq!(s.state().player.health, MAX_HEALTH);
        assert_eq!(s.state().opponent.health, MAX_HEALTH);
        assert!(s.state().player.armed);
        assert!(s.render().0.contains(&Call::OverlayVisible(false)));
        assert!(s.render().0.contains(&Call::WeaponVisible(ActorId::Player, true)));
        assert!(s.render().0.contains(&Call::Health(ActorId::Player, 100.0)));
    }

    #[test]
    fn test_start_match_noop_while_playing() {
        let (mut s, handle) = rifle_match();
        s.on_opponent_fire(handle);
        assert!(s.start_match(50.0).is_none());
        // Health not reset by the rejected start
        assert_eq!(s.state().player.health, 85);
    }

    #[test]
    fn test_rifle_scenario_defeat() {
        let (mut s, handle) = rifle_match();

        for _ in 0..6 {
            assert_eq!(s.on_opponent_fire(handle), FireStatus::Fired);
        }
        assert_eq!(s.state().player.health, 10);
        assert_eq!(s.phase(), MatchPhase::Play);

        // 100 - 7 * 15 = -5: the seventh shot ends the match
        assert_eq!(s.on_opponent_fire(handle), FireStatus::Fired);
        assert_eq!(s.state().player.health, -5);
        assert_eq!(s.phase(), MatchPhase::Menu);
        assert_eq!(s.state().outcome, Some(MatchOutcome::Defeat));
        let defeated = Call::OverlayText("DEFEATED".into(), ColorToken::Danger);
        assert!(s.render().0.contains(&defeated));
        // Bar shows zero, not a negative width
        assert_eq!(s.render().0.last_health(ActorId::Player), Some(0.0));
        assert_eq!(s.audio().count(Cue::Defeat), 1);
        assert_eq!(s.audio().count(Cue::OpponentShot), 7);
        assert_eq!(s.render().count(|c| matches!(c, Call::Flash(_))), 7);

        // Timer keeps ticking until the host clears it; nothing happens
        assert_eq!(s.on_opponent_fire(handle), FireStatus::Cancelled);
        assert_eq!(s.state().player.health, -5);
    }

    #[test]
    fn test_five_hits_victory() {
        let (mut s, handle) = rifle_match();
        let target = s.state().opponent.center();

        for _ in 0..4 {
            s.pointer_down(target);
            assert_eq!(s.phase(), MatchPhase::Play);
        }
        assert_eq!(s.state().opponent.health, 20);

        s.pointer_down(target);
        assert_eq!(s.state().opponent.health, 0);
        assert_eq!(s.phase(), MatchPhase::Menu);
        assert_eq!(s.state().outcome, Some(MatchOutcome::Victory));
        assert!(s.render().0.contains(&Call::OverlayText(
            "VICTORY".into(),
            ColorToken::Success
        )));
        assert_eq!(s.render().count(|c| matches!(c, Call::Popup(_, 20))), 5);
        assert_eq!(s.audio().count(Cue::HitConfirm), 5);
        assert_eq!(s.audio().count(Cue::Victory), 1);

        // Opponent timer from this match is now inert
        assert_eq!(s.on_opponent_fire(handle), FireStatus::Cancelled);
        assert_eq!(s.state().player.health, MAX_HEALTH);
    }

    #[test]
    fn test_missed_shot_only_traces() {
        let (mut s, _) = rifle_match();
        let a = s.state().opponent.pos;
        let miss = Vec2::new(a.x - 1.0, a.y);
        let before = s.render().0.len();

        s.pointer_down(miss);
        let calls = &s.render().0[before..];
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], Call::Trace(_, to, ColorToken::Tracer) if to == miss));
        assert_eq!(s.audio().count(Cue::PlayerShot), 1);
        assert_eq!(s.audio().count(Cue::HitConfirm), 0);
        assert_eq!(s.state().opponent.health, MAX_HEALTH);

        s.pointer_down(a);
        assert_eq!(s.state().opponent.health, 80);
    }

    #[test]
    fn test_no_fire_when_unarmed_or_in_menu() {
        let mut s = session();
        let target = s.state().opponent.center();
        s.pointer_down(target);
        assert!(s.render().0.is_empty());

        let (mut s, _) = rifle_match();
        s.state.player.armed = false;
        let before = s.render().0.len();
        s.pointer_down(target);
        assert_eq!(s.render().0.len(), before);

        s.key_down("1");
        assert!(s.state().player.armed);
        assert_eq!(s.audio().count(Cue::Equip), 1);
        s.pointer_down(target);
        assert_eq!(s.state().opponent.health, 80);
    }

    #[test]
    fn test_end_match_idempotent() {
        let (mut s, _) = rifle_match();
        assert!(s.end_match(true));
        let calls = s.render().0.len();
        let tones = s.audio().tones.len();

        assert!(!s.end_match(false));
        assert_eq!(s.phase(), MatchPhase::Menu);
        assert_eq!(s.state().outcome, Some(MatchOutcome::Victory));
        assert_eq!(s.render().0.len(), calls);
        assert_eq!(s.audio().tones.len(), tones);
    }

    #[test]
    fn test_frame_chain_stops_after_end() {
        let (mut s, handle) = rifle_match();
        let vp = Viewport::default();
        assert_eq!(s.on_frame(handle, 16.0, vp), FrameStatus::Continue);

        s.end_match(false);
        let frozen = s.state().player.pos;
        s.key_down("d");
        assert_eq!(s.on_frame(handle, 32.0, vp), FrameStatus::Stop);
        assert_eq!(s.state().player.pos, frozen);
    }

    #[test]
    fn test_stale_handles_are_ignored() {
        let (mut s, old) = rifle_match();
        s.end_match(false);
        let new = s.start_match(1000.0).unwrap();
        assert_ne!(old, new);

        // A frame chain or timer left over from the first match does nothing
        assert_eq!(s.on_frame(old, 1016.0, Viewport::default()), FrameStatus::Stop);
        assert_eq!(s.on_opponent_fire(old), FireStatus::Cancelled);
        assert_eq!(s.state().player.health, MAX_HEALTH);

        assert_eq!(s.on_opponent_fire(new), FireStatus::Fired);
        assert_eq!(s.state().player.health, 85);
    }

    #[test]
    fn test_frames_move_player_from_keys() {
        let (mut s, handle) = rifle_match();
        s.key_down("ArrowRight");
        s.on_frame(handle, 16.0, Viewport::default());
        s.on_frame(handle, 32.0, Viewport::default());
        s.key_up("ArrowRight");
        s.on_frame(handle, 48.0, Viewport::default());
        assert_eq!(s.state().player.pos.x, PLAYER_SPAWN.0 + 2.0 * PLAYER_SPEED);
        assert_eq!(s.state().player.tilt, 0.0);
    }

    #[test]
    fn test_reduced_motion_skips_flash() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        let mut s = Session::new(settings, Recorder::default(), Tape::default());
        let handle = s.start_match(0.0).unwrap();
        s.on_opponent_fire(handle);
        assert_eq!(s.render().count(|c| matches!(c, Call::Flash(_))), 0);
        assert_eq!(s.state().player.health, 85);
    }

    #[test]
    fn test_unlaid_out_box_keeps_arena() {
        let (mut s, handle) = rifle_match();
        // Raw zero size would pin the player to (10, 100)
        let viewport = s.settings().resolve_viewport(0.0, 0.0);
        assert_eq!(viewport, Viewport::default());

        s.on_frame(handle, 100.0, viewport);
        assert_eq!(s.state().player.pos, Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1));
        assert!(s.state().opponent.pos.x > OPPONENT_BASE_X);
    }

    #[test]
    fn test_default_mode_from_settings() {
        let settings = Settings {
            default_mode: "minigun".into(),
            ..Default::default()
        };
        let s = Session::new(settings, Recorder::default(), Tape::default());
        assert_eq!(s.mode().fire_interval_ms, 250);

        let settings = Settings {
            default_mode: "nope".into(),
            ..Default::default()
        };
        let s = Session::new(settings, Recorder::default(), Tape::default());
        assert_eq!(s.mode(), &ModeConfig::rifle());
    }

    trait LastHealth {
        fn last_health(&self, actor: ActorId) -> Option<f32>;
    }

    impl LastHealth for Vec<Call> {
        fn last_health(&self, actor: ActorId) -> Option<f32> {
            self.iter().rev().find_map(|c| match c {
                Call::Health(a, p) if *a == actor => Some(*p),
                _ => None,
            })
        }
    }
}
