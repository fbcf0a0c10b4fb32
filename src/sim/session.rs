//! The contract between an engine and its orchestrator
//!
//! Both engines have the same lifecycle shape - spawn an obstacle, wait for
//! the quiz verdict, play out the consequence - so the orchestrator holds
//! either one behind [`MiniGame`] and never cares which mode is on screen.

use glam::Vec2;

use crate::audio::{CuePlayer, NullCues};

/// One-shot callback fired when a success animation finishes.
///
/// Stored as `Option<CompletionHook>` and consumed with `take()`, which
/// makes at-most-once delivery a type-level fact rather than a convention.
pub type CompletionHook = Box<dyn FnOnce()>;

/// Recurring notification back into the orchestrator.
pub type NotifyHook = Box<dyn FnMut()>;

/// Collaborators handed to an engine at construction.
pub struct Hooks {
    /// Fired when the obstacle reaches its trigger point - time to ask a
    /// question.
    pub on_prompt: NotifyHook,
    /// Fired once on terminal failure.
    pub on_game_over: NotifyHook,
    /// Named-cue sink; see [`crate::audio::SoundCue`].
    pub audio: Box<dyn CuePlayer>,
}

impl Hooks {
    /// Inert hooks: no-op callbacks and silent audio. Handy for tests and
    /// headless runs.
    pub fn noop() -> Self {
        Self {
            on_prompt: Box::new(|| {}),
            on_game_over: Box::new(|| {}),
            audio: Box::new(NullCues),
        }
    }
}

/// Render-surface dimensions - all the simulation ever reads from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// The player's ship. Each engine owns its own instance and is the only
/// writer; collision and explosion logic flip `visible`.
#[derive(Debug, Clone, Copy)]
pub struct Ship {
    pub pos: Vec2,
    pub size: f32,
    pub visible: bool,
}

/// Common mini-game session surface.
///
/// `destroy_current_obstacle` is the "correct answer" path and
/// `trigger_impact` the "wrong answer" path; every other outcome is
/// unrepresentable.
pub trait MiniGame {
    /// Reset transient state and begin running.
    fn start(&mut self);

    /// Deactivate and release entities. Pending deferred events are
    /// cancelled; nothing fires after this returns.
    fn stop(&mut self);

    /// Bring in the next quiz-gated obstacle. No-op while one is pending.
    fn spawn_obstacle(&mut self);

    /// Correct answer: play the success sequence, then invoke
    /// `on_complete` exactly once.
    fn destroy_current_obstacle(&mut self, on_complete: CompletionHook);

    /// Wrong answer: play the failure sequence through to game over.
    fn trigger_impact(&mut self);

    /// Advance one display frame at the given host timestamp (ms).
    /// Returns `false` once the host may stop scheduling frames.
    fn frame(&mut self, timestamp_ms: f64) -> bool;
}
