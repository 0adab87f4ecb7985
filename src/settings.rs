//! Game settings and preferences
//!
//! Supplied by the host page as JSON in the `data-settings` attribute of the
//! game box. Missing fields fall back to defaults. Nothing is persisted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Viewport;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Opponent fire interval must be positive
    #[error("fire interval must be greater than zero (mode '{0}')")]
    ZeroInterval(String),

    /// Browser timers take a signed 32-bit delay
    #[error("fire interval {interval_ms} ms is too long (mode '{label}')")]
    IntervalTooLong { label: String, interval_ms: u32 },

    /// Opponent damage must be positive
    #[error("damage per hit must be greater than zero, got {damage} (mode '{label}')")]
    NonPositiveDamage { label: String, damage: i32 },

    /// Settings JSON could not be parsed
    #[error("malformed settings: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Mute all cues
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (skip the full-screen hit flash)
    pub reduced_motion: bool,

    /// Mode selected before the player picks one
    pub default_mode: String,

    /// Arena size used while the game box reports no layout
    pub viewport_fallback: Viewport,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            muted: false,
            reduced_motion: false,
            default_mode: "Rifle".to_string(),
            viewport_fallback: Viewport::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
        if !settings.viewport_fallback.is_usable() {
            settings.viewport_fallback = Viewport::default();
        }
        Ok(settings)
    }

    /// Whether the full-screen hit flash should be shown
    pub fn effective_flash(&self) -> bool {
        !self.reduced_motion
    }

    /// Measured arena size, or the fallback when either side is zero
    pub fn resolve_viewport(&self, width: f32, height: f32) -> Viewport {
        let measured = Viewport::new(width, height);
        if measured.is_usable() {
            measured
        } else {
            self.viewport_fallback
        }
    }

    /// Attribute on the game box holding the JSON
    #[cfg(target_arch = "wasm32")]
    const SETTINGS_ATTR: &'static str = "data-settings";

    /// Load settings from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("game-box"))
            .and_then(|el| el.get_attribute(Self::SETTINGS_ATTR));

        match json.as_deref().map(Self::from_json) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings from page");
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring page settings: {}", e);
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
