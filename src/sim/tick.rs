//! Per-frame simulation step
//!
//! Advances movement and aim for one display refresh. Health is never touched
//! here; combat happens in response to pointer presses and the fire timer.

use glam::Vec2;

use super::opponent;
use super::state::{InputState, MatchState};
use crate::consts::*;
use crate::{Viewport, aim_angle, clamp_span};

/// Lean for the current strafe input (degrees)
pub fn strafe_tilt(input: &InputState) -> f32 {
    match (input.left, input.right) {
        (true, false) => -PLAYER_TILT_DEG,
        (false, true) => PLAYER_TILT_DEG,
        _ => 0.0,
    }
}

/// Per-frame displacement from held keys, before clamping
pub fn move_delta(input: &InputState) -> Vec2 {
    let mut delta = Vec2::ZERO;
    if input.left {
        delta.x -= PLAYER_SPEED;
    }
    if input.right {
        delta.x += PLAYER_SPEED;
    }
    if input.up {
        delta.y -= PLAYER_SPEED;
    }
    if input.down {
        delta.y += PLAYER_SPEED;
    }
    delta
}

/// Advance the match by one frame. Does nothing outside PLAY.
pub fn tick(state: &mut MatchState, input: &InputState, viewport: Viewport, now_ms: f64) {
    if !state.is_playing() {
        return;
    }

    // Player movement, each axis clamped on its own
    let next = state.player.pos + move_delta(input);
    let (x_lo, x_hi) = viewport.x_span();
    let (y_lo, y_hi) = viewport.y_span();
    state.player.pos = Vec2::new(
        clamp_span(next.x, x_lo, x_hi),
        clamp_span(next.y, y_lo, y_hi),
    );
    state.player.tilt = strafe_tilt(input);

    if state.player.armed {
        state.player.aim = aim_angle(state.player.center(), input.pointer);
    }

    let elapsed = state.elapsed_ms(now_ms);
    opponent::sway(&mut state.opponent, elapsed, viewport);
    opponent::track_player(state);
}
