//! Scripted opponent: sinusoidal sway, aim tracking and the fire schedule

use super::state::{Actor, MatchState};
use crate::consts::*;
use crate::{Viewport, aim_angle};

/// Sway target x for a point in the match
pub fn sway_x(elapsed_ms: f64) -> f32 {
    OPPONENT_BASE_X + SWAY_AMPLITUDE * (elapsed_ms / SWAY_PERIOD_MS).sin() as f32
}

/// Move the opponent along its sway path.
///
/// A candidate outside the open horizontal span is rejected and the previous
/// x is held, so the opponent stalls at the edge instead of being clamped.
/// Returns whether the move was accepted.
pub fn sway(opponent: &mut Actor, elapsed_ms: f64, viewport: Viewport) -> bool {
    let next = sway_x(elapsed_ms);
    let (lo, hi) = viewport.x_span();
    if next > lo && next < hi {
        opponent.pos.x = next;
        true
    } else {
        false
    }
}

/// Point the opponent's weapon at the player's center
pub fn track_player(state: &mut MatchState) {
    state.opponent.aim = aim_angle(state.opponent.center(), state.player.center());
}

/// Cancellation token for the opponent's fire timer.
///
/// Each armed period gets a fresh generation; firings carrying an older
/// generation, or arriving while disarmed, are ignored.
#[derive(Debug, Clone, Default)]
pub struct FireSchedule {
    generation: u64,
    armed: bool,
}

impl FireSchedule {
    /// Arm for a new match, returning its generation
    pub fn arm(&mut self) -> u64 {
        self.generation += 1;
        self.armed = true;
        self.generation
    }

    /// Disarm. Safe to call repeatedly.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a firing from `generation` should take effect
    pub fn admits(&self, generation: u64) -> bool {
        self.armed && generation == self.generation
    }
}
