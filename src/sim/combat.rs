//! Hit detection and damage resolution
//!
//! Hit tests are axis-aligned: a shot lands when the pointer falls inside the
//! target's square body. Damage is applied to raw health and the caller decides
//! what a downed actor means for the session.

use glam::Vec2;

use super::state::{Actor, MatchState, ModeConfig};
use crate::consts::*;

/// Axis-aligned box, inclusive on every edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub min: Vec2,
    pub max: Vec2,
}

impl Hitbox {
    /// Square of `ACTOR_SIZE` anchored at the actor's top-left corner
    pub fn of(actor: &Actor) -> Self {
        Self {
            min: actor.pos,
            max: actor.pos + Vec2::splat(ACTOR_SIZE),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Result of applying damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageReport {
    pub amount: i32,
    /// Health after the hit (raw, may be negative)
    pub remaining: i32,
    /// Health reached zero or below
    pub downed: bool,
}

/// Subtract `amount` from the actor's health
pub fn apply_damage(actor: &mut Actor, amount: i32) -> DamageReport {
    actor.health -= amount;
    DamageReport {
        amount,
        remaining: actor.health,
        downed: actor.is_down(),
    }
}

/// Outcome of a player trigger pull
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotResult {
    /// Tracer start (player center)
    pub from: Vec2,
    /// Tracer end (pointer)
    pub to: Vec2,
    /// Present when the shot connected
    pub hit: Option<DamageReport>,
}

/// Resolve a player shot at `target`. The tracer is always produced.
pub fn resolve_player_shot(state: &mut MatchState, target: Vec2) -> ShotResult {
    let from = state.player.center();
    let hit = Hitbox::of(&state.opponent)
        .contains(target)
        .then(|| apply_damage(&mut state.opponent, PLAYER_DAMAGE));
    ShotResult {
        from,
        to: target,
        hit,
    }
}

/// Outcome of one opponent shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolleyResult {
    pub from: Vec2,
    pub to: Vec2,
    pub damage: DamageReport,
}

/// Resolve one opponent shot. The opponent never misses.
pub fn resolve_opponent_volley(state: &mut MatchState, mode: &ModeConfig) -> VolleyResult {
    let from = state.opponent.center();
    let to = state.player.center();
    let damage = apply_damage(&mut state.player, mode.damage_per_hit);
    VolleyResult { from, to, damage }
}
