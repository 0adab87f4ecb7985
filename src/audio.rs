//! Audio cues using the Web Audio API
//!
//! Every sound is a single procedurally generated tone: an oscillator whose
//! pitch sweeps down toward a near-zero floor while its gain fades out.
//! Playback is best-effort. Nothing here can fail from the caller's side.

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

/// One transient tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Start frequency (Hz)
    pub frequency: f32,
    pub waveform: Waveform,
    /// Length of the sweep and fade (seconds)
    pub duration: f32,
    /// Start gain (0.0 - 1.0), scaled by the master volume
    pub volume: f32,
}

impl Tone {
    pub const fn new(frequency: f32, waveform: Waveform, duration: f32, volume: f32) -> Self {
        Self {
            frequency,
            waveform,
            duration,
            volume,
        }
    }
}

/// Frequency every tone sweeps toward
pub const SWEEP_FLOOR_HZ: f32 = 10.0;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// A difficulty mode was picked
    ModeSelect,
    /// Player drew the weapon
    Equip,
    /// Player pulled the trigger
    PlayerShot,
    /// Player's shot connected
    HitConfirm,
    /// Opponent fired at the player
    OpponentShot,
    Victory,
    Defeat,
}

impl Cue {
    pub fn tone(self) -> Tone {
        match self {
            Cue::ModeSelect => Tone::new(600.0, Waveform::Sine, 0.1, 0.2),
            Cue::Equip => Tone::new(400.0, Waveform::Square, 0.1, 0.1),
            Cue::PlayerShot => Tone::new(800.0, Waveform::Sawtooth, 0.1, 0.2),
            Cue::HitConfirm => Tone::new(1200.0, Waveform::Sine, 0.05, 0.1),
            Cue::OpponentShot => Tone::new(150.0, Waveform::Sawtooth, 0.2, 0.1),
            Cue::Victory => Tone::new(1000.0, Waveform::Sine, 0.5, 0.3),
            Cue::Defeat => Tone::new(200.0, Waveform::Sine, 0.5, 0.3),
        }
    }
}

/// Destination for sound cues
pub trait CueSink {
    /// Emit a tone. Must never panic or report failure.
    fn play_tone(&mut self, tone: Tone);

    /// Play a named cue
    fn play(&mut self, cue: Cue) {
        self.play_tone(cue.tone());
    }

    /// Resume a suspended engine (call from user gestures)
    fn wake(&mut self) {}
}

/// Sink that drops every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl CueSink for Silent {
    fn play_tone(&mut self, _tone: Tone) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsValue;
    use web_sys::{AudioContext, AudioContextState, OscillatorType};

    use super::{CueSink, SWEEP_FLOOR_HZ, Tone, Waveform};
    use crate::Settings;

    fn oscillator_type(waveform: Waveform) -> OscillatorType {
        match waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
        }
    }

    /// Web Audio backed cue sink
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        muted: bool,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: settings.master_volume.clamp(0.0, 1.0),
                muted: settings.muted,
            }
        }

        fn effective_volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.master_volume }
        }

        fn emit(ctx: &AudioContext, tone: Tone, vol: f32) -> Result<(), JsValue> {
            let osc = ctx.create_oscillator()?;
            let gain = ctx.create_gain()?;
            let t = ctx.current_time();
            let end = t + tone.duration as f64;

            osc.set_type(oscillator_type(tone.waveform));
            osc.frequency().set_value_at_time(tone.frequency, t)?;
            osc.frequency()
                .exponential_ramp_to_value_at_time(SWEEP_FLOOR_HZ, end)?;
            gain.gain().set_value_at_time(vol, t)?;
            gain.gain().linear_ramp_to_value_at_time(0.0, end)?;

            osc.connect_with_audio_node(&gain)?;
            gain.connect_with_audio_node(&ctx.destination())?;

            // Stopped nodes are released by the browser
            osc.start()?;
            osc.stop_with_when(end)?;
            Ok(())
        }
    }

    impl CueSink for AudioManager {
        fn play_tone(&mut self, tone: Tone) {
            let vol = tone.volume * self.effective_volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Forcing a suspended context would throw; skip instead
            if ctx.state() != AudioContextState::Running {
                return;
            }

            if let Err(e) = Self::emit(ctx, tone, vol) {
                log::warn!("Sound cue dropped: {:?}", e);
            }
        }

        fn wake(&mut self) {
            if let Some(ctx) = &self.ctx {
                if ctx.state() == AudioContextState::Suspended {
                    let _ = ctx.resume();
                }
            }
        }
    }
}
