//! Astro Rescue - quiz-gated space arcade mini-games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (both game engines, particles, timing)
//! - `audio`: Named sound cues played through the Web Audio API
//! - `tuning`: Data-driven game feel (speeds, delays, thresholds)
//! - `progress`: First-visit flags (the only cross-screen persistence)
//! - `platform`: Browser/native glue (logging)
//!
//! The quiz itself lives outside this crate. An orchestrator wires an
//! engine's [`sim::Hooks`] into its question flow, reports each answer back
//! through [`sim::MiniGame::destroy_current_obstacle`] (correct) or
//! [`sim::MiniGame::trigger_impact`] (wrong), and drives frames from the
//! display-refresh callback until [`sim::MiniGame::frame`] returns `false`.

pub mod audio;
pub mod platform;
pub mod progress;
pub mod sim;
pub mod tuning;

pub use audio::{AudioManager, CuePlayer, SoundCue};
pub use sim::{AsteroidGame, Hooks, MiniGame, RescueGame, Viewport};
pub use tuning::Tuning;
