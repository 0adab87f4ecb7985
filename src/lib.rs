//! Standoff - a two-actor shooting duel in the browser
//!
//! Core modules:
//! - `sim`: Match simulation (movement, opponent sway, combat)
//! - `session`: MENU/PLAY state machine driving the simulation
//! - `render`: Presentation contract the session pushes state into
//! - `audio`: Best-effort procedural sound cues
//! - `settings`: Runtime configuration

pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod render;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::{FireStatus, FrameStatus, MatchHandle, Session};
pub use settings::{ConfigError, Settings};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Edge length of both actors' square bodies (px)
    pub const ACTOR_SIZE: f32 = 46.0;
    /// Half of `ACTOR_SIZE`, offset from top-left to center
    pub const ACTOR_HALF: f32 = ACTOR_SIZE / 2.0;

    /// Gap kept between actors and the viewport edges
    pub const EDGE_MARGIN: f32 = 10.0;
    /// Top band reserved for the health bars
    pub const HUD_MARGIN: f32 = 100.0;

    /// Player movement per frame (px)
    pub const PLAYER_SPEED: f32 = 6.0;
    /// Visual lean while strafing (degrees)
    pub const PLAYER_TILT_DEG: f32 = 8.0;

    /// Spawn points (top-left corners)
    pub const PLAYER_SPAWN: (f32, f32) = (370.0, 400.0);
    pub const OPPONENT_SPAWN: (f32, f32) = (370.0, 80.0);

    pub const MAX_HEALTH: i32 = 100;
    /// Damage dealt by each player hit
    pub const PLAYER_DAMAGE: i32 = 20;

    /// Opponent sway: x = base + amplitude * sin(elapsed_ms / period)
    pub const OPPONENT_BASE_X: f32 = OPPONENT_SPAWN.0;
    pub const SWAY_AMPLITUDE: f32 = 320.0;
    pub const SWAY_PERIOD_MS: f64 = 400.0;

    /// Viewport used before the host reports a real size
    pub const DEFAULT_VIEWPORT: (f32, f32) = (800.0, 600.0);
}

/// Playable area in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        let (width, height) = consts::DEFAULT_VIEWPORT;
        Self { width, height }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are positive
    pub fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Allowed top-left x range for an actor
    pub fn x_span(&self) -> (f32, f32) {
        (
            consts::EDGE_MARGIN,
            self.width - consts::ACTOR_SIZE - consts::EDGE_MARGIN,
        )
    }

    /// Allowed top-left y range for the player (below the HUD band)
    pub fn y_span(&self) -> (f32, f32) {
        (
            consts::HUD_MARGIN,
            self.height - consts::ACTOR_SIZE - consts::EDGE_MARGIN,
        )
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Angle (radians) of the ray from `from` toward `to`, screen coordinates
#[inline]
pub fn aim_angle(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Clamp `v` into `[lo, hi]`. If the span is empty the lower bound wins.
#[inline]
pub fn clamp_span(v: f32, lo: f32, hi: f32) -> f32 {
    v.min(hi).max(lo)
}
