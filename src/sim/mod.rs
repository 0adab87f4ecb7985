//! Match simulation module
//!
//! All gameplay rules live here, free of any presentation concerns:
//! - Plain data in, plain data out
//! - Time is passed in by the caller
//! - No DOM or audio dependencies

pub mod combat;
pub mod opponent;
pub mod state;
pub mod tick;

pub use combat::{DamageReport, Hitbox, ShotResult, VolleyResult, apply_damage};
pub use opponent::FireSchedule;
pub use state::{Actor, InputState, Key, MatchOutcome, MatchPhase, MatchState, ModeConfig};
pub use tick::tick;
