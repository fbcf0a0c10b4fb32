//! Data-driven game feel
//!
//! Every number here was tuned by eye, not derived from a model. Speeds
//! are px per display frame (the game was balanced around ~60 Hz); delays
//! are milliseconds of accumulated frame time. `Default` is the shipped
//! game; orchestrators can deserialize overrides for playtesting.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    // === Asteroid combat ===
    /// Normal asteroid closing speed.
    pub asteroid_speed: f32,
    /// Closing speed after a wrong answer - dramatic, not survivable.
    pub crash_speed: f32,
    /// Laser travel speed. Fast but trackable.
    pub laser_speed: f32,
    /// How long a freshly spawned asteroid holds still.
    pub settle_delay_ms: f64,
    /// The question fires once the asteroid is this far from the right
    /// edge. Tunable: on very narrow screens the trigger can sit close to
    /// the ship.
    pub trigger_margin: f32,
    /// Beat between the kill explosion and the completion callback.
    pub kill_pacing_ms: f64,
    /// Completion fallback delay when there is no asteroid to shoot.
    pub fallback_complete_ms: f64,
    /// Hold on the wreck before the game-over callback.
    pub game_over_delay_ms: f64,

    // === Black-hole rescue ===
    /// Delay between placing the astronaut and asking the question.
    pub prompt_delay_ms: f64,
    /// Rope extension per frame.
    pub rope_drop_rate: f32,
    /// Rope retraction per frame - slower than the drop, for tension.
    pub rope_pull_rate: f32,
    /// Rope length at which the astronaut counts as aboard.
    pub rope_release_len: f32,
    /// Beat between the rope snapping and the hole taking over.
    pub snap_delay_ms: f64,
    /// How long the ship "travels" before the success callback.
    pub move_dwell_ms: f64,
    /// Exponential approach factor toward the hole center per frame.
    pub suck_ease: f32,
    /// Astronaut size multiplier per frame while being consumed.
    pub suck_shrink: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            asteroid_speed: 5.0,
            crash_speed: 25.0,
            laser_speed: 40.0,
            settle_delay_ms: 1000.0,
            trigger_margin: 150.0,
            kill_pacing_ms: 1000.0,
            fallback_complete_ms: 500.0,
            game_over_delay_ms: 2500.0,

            prompt_delay_ms: 1000.0,
            rope_drop_rate: 20.0,
            rope_pull_rate: 10.0,
            rope_release_len: 40.0,
            snap_delay_ms: 500.0,
            move_dwell_ms: 1500.0,
            suck_ease: 0.05,
            suck_shrink: 0.99,
        }
    }
}
