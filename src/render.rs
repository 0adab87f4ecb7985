//! Presentation contract
//!
//! The session pushes state into a `RenderSink` after every change. Sinks own
//! transient effects (tracers, popups, flashes) and remove them once their
//! lifetime has passed; the simulation never tracks them.

use glam::Vec2;

/// Which combatant a call refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorId {
    Player,
    Opponent,
}

impl ActorId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorId::Player => "player",
            ActorId::Opponent => "ai",
        }
    }
}

/// Semantic colours, resolved by the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorToken {
    /// Player tracer
    Tracer,
    /// Hostile fire, hit flash, defeat
    Danger,
    /// Victory
    Success,
}

impl ColorToken {
    /// CSS value used by the DOM sink
    pub fn css(&self) -> &'static str {
        match self {
            ColorToken::Tracer => "#fff700",
            ColorToken::Danger => "#ff4757",
            ColorToken::Success => "#2ed573",
        }
    }

    /// Translucent variant for full-screen overlays
    pub fn css_overlay(&self) -> &'static str {
        match self {
            ColorToken::Tracer => "rgba(255,247,0,0.3)",
            ColorToken::Danger => "rgba(255,0,0,0.3)",
            ColorToken::Success => "rgba(46,213,115,0.3)",
        }
    }
}

/// Tracer lifetime (ms)
pub const BULLET_TRACE_MS: i32 = 50;
/// Floating damage number lifetime (ms)
pub const DAMAGE_POPUP_MS: i32 = 500;
/// Hit flash lifetime (ms)
pub const FLASH_MS: i32 = 100;

/// Receiver of visual state
pub trait RenderSink {
    /// Place an actor (top-left), orient its weapon and lean its body
    fn set_actor_transform(
        &mut self,
        actor: ActorId,
        pos: Vec2,
        rotation: f32,
        tilt_deg: Option<f32>,
    );
    fn set_actor_visible(&mut self, actor: ActorId, visible: bool);
    fn set_weapon_visible(&mut self, actor: ActorId, visible: bool);
    /// Health bar fill, 0 - 100
    fn set_health_bar(&mut self, actor: ActorId, percent: f32);
    fn set_overlay_visible(&mut self, visible: bool);
    fn set_overlay_text(&mut self, text: &str, color: ColorToken);
    fn set_start_control_visible(&mut self, visible: bool);
    /// Highlight the chosen mode button
    fn set_active_mode(&mut self, label: &str);
    fn spawn_bullet_trace(&mut self, from: Vec2, to: Vec2, color: ColorToken);
    fn spawn_damage_popup(&mut self, at: Vec2, amount: i32);
    fn flash_screen(&mut self, color: ColorToken);
}

/// Sink that writes discrete events to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogRenderer;

impl RenderSink for LogRenderer {
    fn set_actor_transform(
        &mut self,
        actor: ActorId,
        pos: Vec2,
        rotation: f32,
        tilt_deg: Option<f32>,
    ) {
        log::trace!(
            "{} at ({:.1}, {:.1}) aim {:.2} tilt {:?}",
            actor.as_str(),
            pos.x,
            pos.y,
            rotation,
            tilt_deg
        );
    }

    fn set_actor_visible(&mut self, actor: ActorId, visible: bool) {
        log::debug!("{} visible: {}", actor.as_str(), visible);
    }

    fn set_weapon_visible(&mut self, actor: ActorId, visible: bool) {
        log::debug!("{} weapon visible: {}", actor.as_str(), visible);
    }

    fn set_health_bar(&mut self, actor: ActorId, percent: f32) {
        log::info!("{} health {:.0}%", actor.as_str(), percent);
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        log::debug!("Overlay visible: {}", visible);
    }

    fn set_overlay_text(&mut self, text: &str, _color: ColorToken) {
        log::info!("Overlay: {}", text);
    }

    fn set_start_control_visible(&mut self, visible: bool) {
        log::debug!("Start control visible: {}", visible);
    }

    fn set_active_mode(&mut self, label: &str) {
        log::info!("Mode: {}", label);
    }

    fn spawn_bullet_trace(&mut self, from: Vec2, to: Vec2, _color: ColorToken) {
        log::debug!(
            "Tracer ({:.0}, {:.0}) -> ({:.0}, {:.0})",
            from.x,
            from.y,
            to.x,
            to.y
        );
    }

    fn spawn_damage_popup(&mut self, at: Vec2, amount: i32) {
        log::debug!("-{} at ({:.0}, {:.0})", amount, at.x, at.y);
    }

    fn flash_screen(&mut self, _color: ColorToken) {
        log::debug!("Flash");
    }
}
