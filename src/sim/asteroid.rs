//! Asteroid combat (mode A)
//!
//! A single asteroid drifts in from the right toward the ship. Crossing
//! the trigger line halts the simulation and asks the orchestrator for a
//! question; the answer comes back as `destroy_current_obstacle` (a laser
//! kill) or `trigger_impact` (the asteroid rams the ship at crash speed).

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::clock::{DelayLine, FrameClock};
use super::collision::{circles_overlap, scaled_hit};
use super::particles::Effects;
use super::session::{CompletionHook, Hooks, MiniGame, Ship, Viewport};
use super::starfield::Starfield;
use crate::audio::SoundCue;
use crate::tuning::Tuning;

/// Ship hull x position.
const SHIP_X: f32 = 100.0;
/// Ship collision size.
const SHIP_SIZE: f32 = 30.0;
/// Asteroid collision size.
const ASTEROID_SIZE: f32 = 60.0;
/// Asteroids spawn this far past the right edge.
const SPAWN_OVERSHOOT: f32 = 200.0;
/// Ship vs asteroid hit factor - fair but punishing.
const SHIP_HIT_FACTOR: f32 = 0.8;
/// Extra radius for the laser hit test - deliberately generous.
const LASER_HIT_PAD: f32 = 20.0;
const STAR_COUNT: usize = 150;
const STAR_SPEED_MIN: f32 = 0.5;
const STAR_SPEED_RANGE: f32 = 3.0;

/// Explosion palettes: asteroid kill, then the ship going up.
const KILL_BLAST: u32 = 0xffaa00;
const KILL_CORE: u32 = 0xffffff;
const WRECK_BLAST: u32 = 0xff0000;
const WRECK_CORE: u32 = 0xffff00;
const KILL_BLAST_DEBRIS: usize = 40;
const KILL_CORE_DEBRIS: usize = 20;
const WRECK_BLAST_DEBRIS: usize = 80;
const WRECK_CORE_DEBRIS: usize = 40;

/// The quiz-gated obstacle.
#[derive(Debug, Clone, Copy)]
pub struct Asteroid {
    pub pos: Vec2,
    pub size: f32,
    pub active: bool,
    /// Destroyed on laser contact. Set once; final.
    pub doomed: bool,
    /// Engine time at spawn; movement starts after the settle delay.
    pub spawn_ms: f64,
}

/// Laser bolt fired from the ship's nose.
#[derive(Debug, Clone, Copy)]
pub struct Laser {
    pub pos: Vec2,
    pub speed: f32,
    pub active: bool,
}

/// Combat phase.
///
/// One tagged state instead of the pending/crashing/paused flag trio, so
/// the invalid combinations (paused while crashing, pending while doomed)
/// cannot be expressed at all. `AsteroidGame::active` stays a separate
/// lifecycle switch, as stopping is orthogonal to where the round was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatPhase {
    /// No live asteroid.
    Idle,
    /// Asteroid inbound. `prompted` records that the question trigger has
    /// already fired, so a resumed-but-unanswered round cannot re-prompt.
    Inbound { prompted: bool },
    /// Halted at the trigger line; `update` short-circuits until the
    /// orchestrator reports the answer.
    AwaitingAnswer,
    /// Correct answer: the doomed asteroid waits for the laser.
    KillShot,
    /// Wrong answer: the asteroid closes at crash speed.
    Crashing,
    /// Ship gone; effects drain, then the game-over callback.
    Destroyed,
}

/// Deferred one-shot events on the simulation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    /// Consume and invoke the stored completion hook.
    FireCompletion,
    GameOver,
}

/// Mode A engine.
pub struct AsteroidGame {
    viewport: Viewport,
    tuning: Tuning,
    hooks: Hooks,
    rng: Pcg32,
    clock: FrameClock,
    /// Accumulated simulation time (ms).
    now_ms: f64,
    active: bool,
    phase: CombatPhase,
    ship: Ship,
    asteroids: Vec<Asteroid>,
    lasers: Vec<Laser>,
    effects: Effects,
    stars: Starfield,
    delays: DelayLine<Deferred>,
    /// Single-shot completion hook for the current kill.
    on_destroyed: Option<CompletionHook>,
}

impl AsteroidGame {
    pub fn new(viewport: Viewport, tuning: Tuning, hooks: Hooks, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = Starfield::new(
            &mut rng,
            viewport.width,
            viewport.height,
            STAR_COUNT,
            STAR_SPEED_MIN,
            STAR_SPEED_RANGE,
        );
        Self {
            viewport,
            tuning,
            hooks,
            rng,
            clock: FrameClock::new(),
            now_ms: 0.0,
            active: false,
            phase: CombatPhase::Idle,
            ship: Ship {
                pos: Vec2::new(SHIP_X, viewport.height / 2.0),
                size: SHIP_SIZE,
                visible: true,
            },
            asteroids: Vec::new(),
            lasers: Vec::new(),
            effects: Effects::new(),
            stars,
            delays: DelayLine::new(),
            on_destroyed: None,
        }
    }

    /// Reset all transient state and begin running.
    pub fn start(&mut self) {
        self.active = true;
        self.phase = CombatPhase::Idle;
        self.asteroids.clear();
        self.lasers.clear();
        self.effects.clear();
        self.delays.clear();
        self.on_destroyed = None;
        self.ship.visible = true;
        self.now_ms = 0.0;
        self.clock.reset();
        log::info!("asteroid run started");
    }

    /// Deactivate and release everything, cancelling deferred events.
    pub fn stop(&mut self) {
        self.active = false;
        self.asteroids.clear();
        self.lasers.clear();
        self.effects.clear();
        self.delays.clear();
        self.on_destroyed = None;
    }

    /// Bring in the next asteroid. No-op while a round is in flight.
    pub fn spawn_obstacle(&mut self) {
        self.asteroids.retain(|a| a.active);

        if self.phase != CombatPhase::Idle {
            log::warn!("spawn_obstacle ignored in phase {:?}", self.phase);
            return;
        }

        self.asteroids.push(Asteroid {
            pos: Vec2::new(
                self.viewport.width + SPAWN_OVERSHOOT,
                self.viewport.height / 2.0,
            ),
            size: ASTEROID_SIZE,
            active: true,
            doomed: false,
            spawn_ms: self.now_ms,
        });
        self.phase = CombatPhase::Inbound { prompted: false };
    }

    /// Correct answer: shoot the asteroid down, then report completion.
    ///
    /// The kill is not instant - the asteroid is marked doomed and dies on
    /// laser contact, with the completion hook fired one pacing beat later.
    /// With no live asteroid (engine/orchestrator desync) the hook is still
    /// delivered after a short fallback delay so the quiz flow keeps
    /// moving.
    pub fn destroy_current_obstacle(&mut self, on_complete: CompletionHook) {
        if matches!(
            self.phase,
            CombatPhase::KillShot | CombatPhase::Crashing | CombatPhase::Destroyed
        ) {
            log::warn!("outcome already resolved in phase {:?}", self.phase);
            return;
        }

        // Leaving the answer pause; don't let it show up as one huge dt
        self.clock.reset();

        self.lasers.push(Laser {
            pos: Vec2::new(self.ship.pos.x + self.ship.size, self.ship.pos.y),
            speed: self.tuning.laser_speed,
            active: true,
        });
        self.hooks.audio.play(SoundCue::Laser);

        if let Some(ast) = self.asteroids.iter_mut().find(|a| a.active) {
            ast.doomed = true;
            self.on_destroyed = Some(on_complete);
            self.phase = CombatPhase::KillShot;
        } else {
            log::warn!("no live asteroid to destroy; deferring completion");
            self.on_destroyed = Some(on_complete);
            self.delays
                .push(self.tuning.fallback_complete_ms, Deferred::FireCompletion);
            self.phase = CombatPhase::Idle;
        }
    }

    /// Wrong answer: the asteroid rams the ship.
    pub fn trigger_impact(&mut self) {
        if matches!(
            self.phase,
            CombatPhase::KillShot | CombatPhase::Crashing | CombatPhase::Destroyed
        ) {
            log::warn!("outcome already resolved in phase {:?}", self.phase);
            return;
        }

        self.clock.reset();

        if self.asteroids.iter().any(|a| a.active) {
            self.phase = CombatPhase::Crashing;
        } else {
            // Nothing left to ram the ship with; skip straight to the
            // consequence rather than stall the round
            log::warn!("no live asteroid to crash; destroying ship directly");
            self.destroy_ship();
        }
    }

    /// Lift the answer pause without resolving the question. The round
    /// keeps drifting; the trigger will not fire again.
    pub fn resume(&mut self) {
        if self.phase == CombatPhase::AwaitingAnswer {
            self.phase = CombatPhase::Inbound { prompted: true };
        }
        self.clock.reset();
    }

    /// Advance one display frame. Returns `false` once frames can stop.
    pub fn frame(&mut self, timestamp_ms: f64) -> bool {
        let dt = self.clock.delta(timestamp_ms);
        self.update(dt);
        self.should_run()
    }

    /// Frames keep coming while the game runs, effects drain, or a
    /// deferred callback is still owed.
    pub fn should_run(&self) -> bool {
        self.active || !self.effects.is_empty() || !self.delays.is_empty()
    }

    /// Advance the simulation by `dt` milliseconds of frame time.
    pub fn update(&mut self, dt: f64) {
        self.now_ms += dt;

        // Deferred events ride the same clock but ignore the answer pause
        for event in self.delays.tick(dt) {
            self.fire(event);
        }

        if self.phase == CombatPhase::AwaitingAnswer {
            return;
        }

        self.stars.scroll_horizontal();

        // At most one live asteroid by invariant
        if let Some(idx) = self.asteroids.iter().position(|a| a.active) {
            let settled =
                self.now_ms - self.asteroids[idx].spawn_ms > self.tuning.settle_delay_ms;
            if settled {
                let speed = if self.phase == CombatPhase::Crashing {
                    self.tuning.crash_speed
                } else {
                    self.tuning.asteroid_speed
                };
                self.asteroids[idx].pos.x -= speed;
            }

            let ast = self.asteroids[idx];

            // Question trigger
            if matches!(self.phase, CombatPhase::Inbound { prompted: false })
                && ast.pos.x < self.viewport.width - self.tuning.trigger_margin
            {
                self.phase = CombatPhase::AwaitingAnswer;
                log::debug!("asteroid at x={:.0}, asking the question", ast.pos.x);
                (self.hooks.on_prompt)();
            }

            // Ship collision
            if self.ship.visible
                && scaled_hit(
                    ast.pos,
                    ast.size,
                    self.ship.pos,
                    self.ship.size,
                    SHIP_HIT_FACTOR,
                )
            {
                self.destroy_ship();
            }
        }

        // Lasers fly right and die at the edge
        for laser in &mut self.lasers {
            if !laser.active {
                continue;
            }
            laser.pos.x += laser.speed;
            if laser.pos.x > self.viewport.width {
                laser.active = false;
            }
        }

        // Laser vs doomed asteroid
        let mut kills: Vec<(usize, usize)> = Vec::new();
        for (li, laser) in self.lasers.iter().enumerate() {
            if !laser.active {
                continue;
            }
            for (ai, ast) in self.asteroids.iter().enumerate() {
                if ast.active
                    && ast.doomed
                    && circles_overlap(laser.pos, LASER_HIT_PAD, ast.pos, ast.size)
                {
                    kills.push((li, ai));
                }
            }
        }
        for (li, ai) in kills {
            if !self.lasers[li].active || !self.asteroids[ai].active {
                continue;
            }
            self.lasers[li].active = false;
            self.asteroids[ai].active = false;
            let pos = self.asteroids[ai].pos;

            self.hooks.audio.play(SoundCue::Explosion);
            self.effects
                .spawn_explosion(&mut self.rng, pos, KILL_BLAST, KILL_BLAST_DEBRIS);
            self.effects
                .spawn_explosion(&mut self.rng, pos, KILL_CORE, KILL_CORE_DEBRIS);

            // Breathe before moving on; the hook fires from the delay line
            if self.on_destroyed.is_some() {
                self.delays
                    .push(self.tuning.kill_pacing_ms, Deferred::FireCompletion);
            }
        }

        self.effects.update();
    }

    /// Viewport changed; re-scatter the stars.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
        self.stars.resize(&mut self.rng, width, height);
    }

    fn fire(&mut self, event: Deferred) {
        match event {
            Deferred::FireCompletion => {
                if let Some(done) = self.on_destroyed.take() {
                    if self.phase == CombatPhase::KillShot {
                        self.phase = CombatPhase::Idle;
                    }
                    done();
                }
            }
            Deferred::GameOver => (self.hooks.on_game_over)(),
        }
    }

    fn destroy_ship(&mut self) {
        if !self.active {
            return;
        }
        self.hooks.audio.play(SoundCue::ShipExplosion);

        let pos = self.ship.pos;
        self.effects
            .spawn_explosion(&mut self.rng, pos, WRECK_BLAST, WRECK_BLAST_DEBRIS);
        self.effects
            .spawn_explosion(&mut self.rng, pos, WRECK_CORE, WRECK_CORE_DEBRIS);

        self.ship.visible = false;
        self.phase = CombatPhase::Destroyed;
        self.active = false;
        self.delays
            .push(self.tuning.game_over_delay_ms, Deferred::GameOver);
        log::info!("ship destroyed");
    }

    // === Read-only state for renderers and tests ===

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn stars(&self) -> &Starfield {
        &self.stars
    }
}

impl MiniGame for AsteroidGame {
    fn start(&mut self) {
        AsteroidGame::start(self);
    }

    fn stop(&mut self) {
        AsteroidGame::stop(self);
    }

    fn spawn_obstacle(&mut self) {
        AsteroidGame::spawn_obstacle(self);
    }

    fn destroy_current_obstacle(&mut self, on_complete: CompletionHook) {
        AsteroidGame::destroy_current_obstacle(self, on_complete);
    }

    fn trigger_impact(&mut self) {
        AsteroidGame::trigger_impact(self);
    }

    fn frame(&mut self, timestamp_ms: f64) -> bool {
        AsteroidGame::frame(self, timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::CuePlayer;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const DT: f64 = 16.0;

    struct RecCues(Rc<RefCell<Vec<SoundCue>>>);

    impl CuePlayer for RecCues {
        fn play(&mut self, cue: SoundCue) {
            self.0.borrow_mut().push(cue);
        }
    }

    struct Harness {
        game: AsteroidGame,
        prompts: Rc<Cell<u32>>,
        game_overs: Rc<Cell<u32>>,
        cues: Rc<RefCell<Vec<SoundCue>>>,
    }

    fn harness() -> Harness {
        let prompts = Rc::new(Cell::new(0));
        let game_overs = Rc::new(Cell::new(0));
        let cues = Rc::new(RefCell::new(Vec::new()));
        let hooks = Hooks {
            on_prompt: {
                let p = prompts.clone();
                Box::new(move || p.set(p.get() + 1))
            },
            on_game_over: {
                let g = game_overs.clone();
                Box::new(move || g.set(g.get() + 1))
            },
            audio: Box::new(RecCues(cues.clone())),
        };
        let mut game = AsteroidGame::new(Viewport::new(800.0, 600.0), Tuning::default(), hooks, 42);
        game.start();
        Harness {
            game,
            prompts,
            game_overs,
            cues,
        }
    }

    fn completion_counter(game: &mut AsteroidGame) -> Rc<Cell<u32>> {
        let done = Rc::new(Cell::new(0));
        let d = done.clone();
        game.destroy_current_obstacle(Box::new(move || d.set(d.get() + 1)));
        done
    }

    fn run(game: &mut AsteroidGame, ticks: usize) {
        for _ in 0..ticks {
            game.update(DT);
        }
    }

    #[test]
    fn test_second_spawn_is_noop() {
        let mut h = harness();
        h.game.spawn_obstacle();
        h.game.spawn_obstacle();
        assert_eq!(h.game.asteroids().len(), 1);

        // Still just one after the question triggers
        run(&mut h.game, 300);
        h.game.spawn_obstacle();
        assert_eq!(h.game.asteroids().len(), 1);
    }

    #[test]
    fn test_settle_delay_gates_movement() {
        let mut h = harness();
        h.game.spawn_obstacle();
        let x0 = h.game.asteroids()[0].pos.x;

        // 500 ms of frames: still settling
        run(&mut h.game, 31);
        assert_eq!(h.game.asteroids()[0].pos.x, x0);

        // Past the 1000 ms settle point it moves
        run(&mut h.game, 40);
        assert!(h.game.asteroids()[0].pos.x < x0);
    }

    #[test]
    fn test_trigger_fires_once_and_pauses() {
        let mut h = harness();
        h.game.spawn_obstacle();
        run(&mut h.game, 300);

        assert_eq!(h.prompts.get(), 1);
        assert_eq!(h.game.phase(), CombatPhase::AwaitingAnswer);
        let x = h.game.asteroids()[0].pos.x;
        assert!(x < 800.0 - 150.0);

        // Paused: nothing advances, no re-prompt
        run(&mut h.game, 50);
        assert_eq!(h.prompts.get(), 1);
        assert_eq!(h.game.asteroids()[0].pos.x, x);
    }

    #[test]
    fn test_kill_completion_fires_exactly_once() {
        let mut h = harness();
        h.game.spawn_obstacle();
        run(&mut h.game, 300);
        assert_eq!(h.game.phase(), CombatPhase::AwaitingAnswer);

        let done = completion_counter(&mut h.game);
        assert_eq!(h.game.phase(), CombatPhase::KillShot);
        assert!(h.cues.borrow().contains(&SoundCue::Laser));

        run(&mut h.game, 200);
        assert_eq!(done.get(), 1);
        assert_eq!(h.game.phase(), CombatPhase::Idle);
        assert!(h.cues.borrow().contains(&SoundCue::Explosion));
        assert!(h.game.asteroids().iter().all(|a| !a.active));

        // Long after, still exactly once
        run(&mut h.game, 200);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn test_fallback_completion_without_asteroid() {
        let mut h = harness();
        let done = completion_counter(&mut h.game);
        assert_eq!(done.get(), 0);

        // 500 ms fallback delay
        run(&mut h.game, 20);
        assert_eq!(done.get(), 0);
        run(&mut h.game, 20);
        assert_eq!(done.get(), 1);

        run(&mut h.game, 100);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn test_crash_speed_beats_cruise_speed() {
        let mut h = harness();
        h.game.spawn_obstacle();
        run(&mut h.game, 70); // settle fully

        let before = h.game.asteroids()[0].pos.x;
        h.game.update(DT);
        let cruise_step = before - h.game.asteroids()[0].pos.x;

        h.game.trigger_impact();
        let before = h.game.asteroids()[0].pos.x;
        h.game.update(DT);
        let crash_step = before - h.game.asteroids()[0].pos.x;

        assert!(cruise_step > 0.0);
        assert!(crash_step > cruise_step);
    }

    #[test]
    fn test_crash_destroys_ship_then_game_over() {
        let mut h = harness();
        h.game.spawn_obstacle();
        run(&mut h.game, 300);
        h.game.trigger_impact();
        assert_eq!(h.game.phase(), CombatPhase::Crashing);

        run(&mut h.game, 400);
        assert!(!h.game.ship().visible);
        assert!(!h.game.is_active());
        assert_eq!(h.game_overs.get(), 1);
        assert!(h.cues.borrow().contains(&SoundCue::ShipExplosion));

        // Terminal: the callback never repeats
        run(&mut h.game, 200);
        assert_eq!(h.game_overs.get(), 1);
    }

    #[test]
    fn test_impact_without_asteroid_still_ends_the_run() {
        let mut h = harness();
        h.game.trigger_impact();
        assert!(!h.game.is_active());
        run(&mut h.game, 400);
        assert_eq!(h.game_overs.get(), 1);
    }

    #[test]
    fn test_outcome_is_final() {
        let mut h = harness();
        h.game.spawn_obstacle();
        run(&mut h.game, 300);
        h.game.trigger_impact();

        // A late "correct" must not override the crash
        let done = completion_counter(&mut h.game);
        assert_eq!(h.game.phase(), CombatPhase::Crashing);
        run(&mut h.game, 400);
        assert_eq!(done.get(), 0);
        assert_eq!(h.game_overs.get(), 1);
    }

    #[test]
    fn test_resume_does_not_reprompt() {
        let mut h = harness();
        h.game.spawn_obstacle();
        run(&mut h.game, 300);
        assert_eq!(h.game.phase(), CombatPhase::AwaitingAnswer);

        h.game.resume();
        assert_eq!(h.game.phase(), CombatPhase::Inbound { prompted: true });

        // The unanswered asteroid keeps drifting all the way into the ship
        run(&mut h.game, 400);
        assert_eq!(h.prompts.get(), 1);
        assert!(!h.game.ship().visible);
    }

    #[test]
    fn test_stop_cancels_deferred_completion() {
        let mut h = harness();
        let done = completion_counter(&mut h.game);
        h.game.stop();
        run(&mut h.game, 100);
        assert_eq!(done.get(), 0);
        assert!(!h.game.should_run());
    }

    #[test]
    fn test_loop_runs_until_effects_drain() {
        let mut h = harness();
        h.game.spawn_obstacle();
        run(&mut h.game, 300);
        h.game.trigger_impact();
        run(&mut h.game, 60); // far enough for the collision and explosion

        assert!(!h.game.is_active());
        assert!(h.game.should_run()); // particles + pending game over

        run(&mut h.game, 600);
        assert!(!h.game.should_run());
    }

    #[test]
    fn test_frame_drives_updates_from_timestamps() {
        let mut h = harness();
        h.game.spawn_obstacle();
        let mut now = 0.0;
        for _ in 0..300 {
            now += DT;
            h.game.frame(now);
        }
        assert_eq!(h.prompts.get(), 1);
    }
}
