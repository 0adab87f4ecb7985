//! Match state and core simulation types

use glam::Vec2;

use crate::consts::*;
use crate::settings::ConfigError;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPhase {
    /// Mode selection, before the first match or after one ended
    #[default]
    Menu,
    /// Match in progress
    Play,
}

/// How the last match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Victory,
    Defeat,
}

impl MatchOutcome {
    pub fn from_player_won(player_won: bool) -> Self {
        if player_won {
            MatchOutcome::Victory
        } else {
            MatchOutcome::Defeat
        }
    }

    /// Overlay headline
    pub fn label(&self) -> &'static str {
        match self {
            MatchOutcome::Victory => "VICTORY",
            MatchOutcome::Defeat => "DEFEATED",
        }
    }
}

/// A combatant (player or opponent)
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    /// Top-left corner of the body
    pub pos: Vec2,
    /// Raw health; may dip below zero on the killing blow
    pub health: i32,
    /// Weapon orientation (radians)
    pub aim: f32,
    /// Body lean (degrees, cosmetic)
    pub tilt: f32,
    /// Weapon drawn (only meaningful for the player)
    pub armed: bool,
}

impl Actor {
    pub fn new(spawn: (f32, f32)) -> Self {
        Self {
            pos: Vec2::new(spawn.0, spawn.1),
            health: MAX_HEALTH,
            aim: 0.0,
            tilt: 0.0,
            armed: false,
        }
    }

    pub fn player() -> Self {
        Self::new(PLAYER_SPAWN)
    }

    pub fn opponent() -> Self {
        Self::new(OPPONENT_SPAWN)
    }

    /// Center of the body
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(ACTOR_HALF)
    }

    /// Health for display, never below zero
    pub fn health_percent(&self) -> f32 {
        self.health.clamp(0, MAX_HEALTH) as f32
    }

    /// Raw health has run out
    pub fn is_down(&self) -> bool {
        self.health <= 0
    }
}

/// Difficulty parameters, fixed for the duration of a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeConfig {
    pub label: String,
    /// Time between opponent shots (ms)
    pub fire_interval_ms: u32,
    /// Player health lost per opponent shot
    pub damage_per_hit: i32,
}

impl ModeConfig {
    pub fn new(
        label: impl Into<String>,
        fire_interval_ms: u32,
        damage_per_hit: i32,
    ) -> Result<Self, ConfigError> {
        let label = label.into();
        if fire_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval(label));
        }
        if i32::try_from(fire_interval_ms).is_err() {
            return Err(ConfigError::IntervalTooLong {
                label,
                interval_ms: fire_interval_ms,
            });
        }
        if damage_per_hit <= 0 {
            return Err(ConfigError::NonPositiveDamage {
                label,
                damage: damage_per_hit,
            });
        }
        Ok(Self {
            label,
            fire_interval_ms,
            damage_per_hit,
        })
    }

    pub fn pistol() -> Self {
        Self {
            label: "Pistol".to_string(),
            fire_interval_ms: 900,
            damage_per_hit: 10,
        }
    }

    pub fn rifle() -> Self {
        Self {
            label: "Rifle".to_string(),
            fire_interval_ms: 600,
            damage_per_hit: 15,
        }
    }

    pub fn minigun() -> Self {
        Self {
            label: "Minigun".to_string(),
            fire_interval_ms: 250,
            damage_per_hit: 6,
        }
    }

    /// Look up a built-in mode by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "pistol" => Some(Self::pistol()),
            "rifle" => Some(Self::rifle()),
            "minigun" => Some(Self::minigun()),
            _ => None,
        }
    }
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self::rifle()
    }
}

/// Logical input keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Draw the weapon
    Equip,
}

impl Key {
    /// Normalize a DOM `KeyboardEvent.key` value
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "w" | "arrowup" => Some(Key::Up),
            "s" | "arrowdown" => Some(Key::Down),
            "a" | "arrowleft" => Some(Key::Left),
            "d" | "arrowright" => Some(Key::Right),
            "1" => Some(Key::Equip),
            _ => None,
        }
    }
}

/// Held keys and last pointer position, overwritten by input events
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Viewport-relative pointer position
    pub pointer: Vec2,
}

impl InputState {
    /// Record a key transition. Returns false for non-directional keys.
    pub fn set_key(&mut self, key: Key, pressed: bool) -> bool {
        let slot = match key {
            Key::Up => &mut self.up,
            Key::Down => &mut self.down,
            Key::Left => &mut self.left,
            Key::Right => &mut self.right,
            Key::Equip => return false,
        };
        *slot = pressed;
        true
    }
}

/// Everything the simulation mutates
#[derive(Debug, Clone)]
pub struct MatchState {
    pub phase: MatchPhase,
    pub player: Actor,
    pub opponent: Actor,
    /// Result of the most recent match, shown while in the menu
    pub outcome: Option<MatchOutcome>,
    /// Clock reading (ms) when the current match began
    pub started_at_ms: f64,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    pub fn new() -> Self {
        Self {
            phase: MatchPhase::Menu,
            player: Actor::player(),
            opponent: Actor::opponent(),
            outcome: None,
            started_at_ms: 0.0,
        }
    }

    /// Reset actors for a fresh match and enter PLAY
    pub fn begin(&mut self, now_ms: f64) {
        self.player = Actor::player();
        self.player.armed = true;
        self.opponent = Actor::opponent();
        self.outcome = None;
        self.started_at_ms = now_ms;
        self.phase = MatchPhase::Play;
    }

    /// Freeze the match and record the result
    pub fn finish(&mut self, outcome: MatchOutcome) {
        self.phase = MatchPhase::Menu;
        self.outcome = Some(outcome);
    }

    pub fn is_playing(&self) -> bool {
        self.phase == MatchPhase::Play
    }

    /// Milliseconds since the match began
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.started_at_ms).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_percent_clamps_display_only() {
        let mut actor = Actor::player();
        actor.health = -10;
        assert_eq!(actor.health_percent(), 0.0);
        assert_eq!(actor.health, -10);
        assert!(actor.is_down());
    }

    #[test]
    fn test_mode_config_validation() {
        assert!(ModeConfig::new("Rifle", 600, 15).is_ok());
        assert!(matches!(
            ModeConfig::new("Broken", 0, 15),
            Err(ConfigError::ZeroInterval(_))
        ));
        assert!(matches!(
            ModeConfig::new("Broken", 600, 0),
            Err(ConfigError::NonPositiveDamage { damage: 0, .. })
        ));
        // Browser timers would wrap this to a negative delay
        assert!(matches!(
            ModeConfig::new("Broken", 3_000_000_000, 15),
            Err(ConfigError::IntervalTooLong { interval_ms: 3_000_000_000, .. })
        ));
        assert!(ModeConfig::new("Slow", i32::MAX as u32, 15).is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(ModeConfig::preset("RIFLE"), Some(ModeConfig::rifle()));
        assert_eq!(ModeConfig::preset("bazooka"), None);
        assert_eq!(ModeConfig::default().fire_interval_ms, 600);
    }

    #[test]
    fn test_dom_key_mapping() {
        assert_eq!(Key::from_dom_key("W"), Some(Key::Up));
        assert_eq!(Key::from_dom_key("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_dom_key("1"), Some(Key::Equip));
        assert_eq!(Key::from_dom_key("q"), None);
    }

    #[test]
    fn test_equip_is_not_a_held_key() {
        let mut input = InputState::default();
        assert!(input.set_key(Key::Left, true));
        assert!(!input.set_key(Key::Equip, true));
        assert!(input.left);
        input.set_key(Key::Left, false);
        assert!(!input.left);
    }

    #[test]
    fn test_begin_resets_actors() {
        let mut state = MatchState::new();
        state.player.health = 5;
        state.player.pos = Vec2::new(10.0, 10.0);
        state.opponent.health = -20;
        state.finish(MatchOutcome::Defeat);

        state.begin(1234.0);
        assert!(state.is_playing());
        assert_eq!(state.player.health, MAX_HEALTH);
        assert_eq!(state.opponent.health, MAX_HEALTH);
        assert_eq!(state.player.pos, Vec2::new(370.0, 400.0));
        assert!(state.player.armed);
        assert_eq!(state.outcome, None);
        assert_eq!(state.elapsed_ms(1300.0), 66.0);
    }
}
