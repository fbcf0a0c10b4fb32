//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!
//! Engines and the orchestrator talk to a [`CuePlayer`] in named cues;
//! [`AudioManager`] is the real synthesizer on wasm and a quiet stub
//! everywhere else. Sound is non-essential: every failure is swallowed
//! and at most logged.

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Named sound cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Ship fires at the doomed asteroid
    Laser,
    /// Asteroid blown apart
    Explosion,
    /// The ship itself goes up
    ShipExplosion,
    /// The hole claims its prize
    BlackHolePull,
    /// Winch paying rope out
    RopeDescend,
    /// Winch hauling the astronaut up
    RopeAscend,
    /// Quiz: right answer
    CorrectAnswer,
    /// Quiz: wrong answer
    WrongAnswer,
    /// Phase cleared
    Victory,
    /// Run lost
    Defeat,
    /// UI hover blip
    Beep,
    /// UI press
    Click,
}

/// Abstract cue sink so the simulation stays platform-free.
pub trait CuePlayer {
    fn play(&mut self, cue: SoundCue);
}

/// Discards every cue. Default for tests and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCues;

impl CuePlayer for NullCues {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Audio manager for the game.
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<AudioContext>,
    master_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CuePlayer for AudioManager {
    fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.play_cue(cue, vol);
    }
}

impl AudioManager {
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        let ctx = {
            // May fail outside a secure context or before a user gesture
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            ctx
        };
        Self {
            #[cfg(target_arch = "wasm32")]
            ctx,
            master_volume: 0.3,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Flip mute and report the new state.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Resume the audio context (browsers require a user gesture first).
    #[cfg(target_arch = "wasm32")]
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Native stub.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn resume(&self) {}

    #[cfg(not(target_arch = "wasm32"))]
    fn play_cue(&self, cue: SoundCue, _vol: f32) {
        log::trace!("audio cue {cue:?} (no backend)");
    }

    #[cfg(target_arch = "wasm32")]
    fn play_cue(&self, cue: SoundCue, vol: f32) {
        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SoundCue::Laser => self.play_laser(ctx, vol),
            SoundCue::Explosion => self.play_explosion(ctx, vol),
            SoundCue::ShipExplosion => self.play_ship_explosion(ctx, vol),
            SoundCue::BlackHolePull => self.play_black_hole_pull(ctx, vol),
            SoundCue::RopeDescend => self.play_rope_descend(ctx, vol),
            SoundCue::RopeAscend => self.play_rope_ascend(ctx, vol),
            SoundCue::CorrectAnswer => self.play_correct_answer(ctx, vol),
            SoundCue::WrongAnswer => self.play_wrong_answer(ctx, vol),
            SoundCue::Victory => self.play_victory(ctx, vol),
            SoundCue::Defeat => self.play_defeat(ctx, vol),
            SoundCue::Beep => self.play_beep(ctx, vol),
            SoundCue::Click => self.play_click(ctx, vol),
        }
    }
}

// === Sound generators (wasm only) ===
#[cfg(target_arch = "wasm32")]
impl AudioManager {
    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Laser - sharp descending zap
    fn play_laser(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 800.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();
        osc.frequency().set_value_at_time(800.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(200.0, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.12).ok();
    }

    /// Asteroid explosion - boom with a crack on top
    fn play_explosion(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();
            osc.frequency().set_value_at_time(120.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, t + 0.3)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.35).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.12, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }
    }

    /// Ship explosion - longer, deeper, louder
    fn play_ship_explosion(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.8)
                .ok();
            osc.frequency().set_value_at_time(100.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(25.0, t + 0.8)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.9).ok();
        }

        // Sub bass thump
        if let Some((osc, gain)) = self.create_osc(ctx, 50.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.6).ok();
        }
    }

    /// Black hole pull - long ominous descend
    fn play_black_hole_pull(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 1.5)
            .ok();
        osc.frequency().set_value_at_time(300.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(50.0, t + 1.5)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 1.5).ok();
    }

    /// Winch motor, pitch sagging under load
    fn play_rope_descend(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 150.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.15, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.15, t + 0.5)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.6)
            .ok();
        osc.frequency().set_value_at_time(150.0, t).ok();
        osc.frequency().linear_ramp_to_value_at_time(120.0, t + 0.5).ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.6).ok();
    }

    /// Winch motor winding back up
    fn play_rope_ascend(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.15, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.15, t + 0.8)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.9)
            .ok();
        osc.frequency().set_value_at_time(120.0, t).ok();
        osc.frequency().linear_ramp_to_value_at_time(180.0, t + 0.8).ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.9).ok();
    }

    /// Correct answer - short ascending arpeggio (C, E)
    fn play_correct_answer(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [523.25, 659.25].iter().enumerate() {
            let delay = i as f64 * 0.08;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain()
                    .linear_ramp_to_value_at_time(vol * 0.25, t + 0.02)
                    .ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.2).ok();
            }
        }
    }

    /// Wrong answer - sour descending buzz
    fn play_wrong_answer(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.3)
            .ok();
        osc.frequency().set_value_at_time(300.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(150.0, t + 0.3)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.3).ok();
    }

    /// Victory - C major fanfare (C, E, G)
    fn play_victory(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [523.25, 659.25, 783.99].iter().enumerate() {
            let delay = i as f64 * 0.15;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain()
                    .linear_ramp_to_value_at_time(vol * 0.3, t + 0.05)
                    .ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }

    /// Defeat - sagging sawtooth
    fn play_defeat(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 400.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();
        osc.frequency().set_value_at_time(400.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(100.0, t + 0.5)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.5).ok();
    }

    /// UI hover blip
    fn play_beep(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 800.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.1, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// UI press - falling click
    fn play_click(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 400.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();
        osc.frequency().set_value_at_time(400.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(100.0, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_player_is_silent() {
        // On native play_cue only logs; this exercises the volume gate
        let mut mgr = AudioManager::new();
        mgr.set_muted(true);
        mgr.play(SoundCue::Laser);
        assert!(!mgr.toggle_mute());
        mgr.play(SoundCue::Victory);
    }

    #[test]
    fn test_volume_clamped() {
        let mut mgr = AudioManager::new();
        mgr.set_master_volume(7.5);
        assert!(mgr.effective_volume() <= 1.0);
        mgr.set_master_volume(-1.0);
        assert_eq!(mgr.effective_volume(), 0.0);
    }
}
