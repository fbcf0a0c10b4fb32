//! Frame timing and deferred one-shot events
//!
//! There is no fixed timestep: each display frame gets the wall-clock delta
//! since the previous one and the engines take it as-is. Delays (quiz
//! prompts, pacing beats, the game-over hold) live on a [`DelayLine`] that
//! is ticked from the same single-threaded update, so teardown can cancel
//! everything by clearing the queue.

/// Converts host timestamps (milliseconds) into per-frame deltas.
///
/// The first call after construction or [`FrameClock::reset`] yields a zero
/// delta - resuming after a long pause must not produce a giant catch-up
/// step.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last_ms: None }
    }

    /// Elapsed milliseconds since the previous call, never negative.
    pub fn delta(&mut self, now_ms: f64) -> f64 {
        let dt = match self.last_ms {
            Some(last) => (now_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt
    }

    /// Forget the previous timestamp so the next frame starts from zero.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[derive(Debug, Clone)]
struct Delayed<E> {
    remaining_ms: f64,
    event: E,
}

/// One-shot events scheduled a fixed delay ahead on the simulation queue.
///
/// Each pushed event fires at most once; [`DelayLine::clear`] drops
/// everything still pending, which is how `stop()` guarantees no deferred
/// callback mutates state after teardown.
#[derive(Debug, Clone)]
pub struct DelayLine<E> {
    pending: Vec<Delayed<E>>,
}

impl<E> Default for DelayLine<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> DelayLine<E> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Schedule `event` to fire after `delay_ms` of simulated time.
    pub fn push(&mut self, delay_ms: f64, event: E) {
        self.pending.push(Delayed {
            remaining_ms: delay_ms,
            event,
        });
    }

    /// Advance all pending events by `dt_ms` and return the ones now due,
    /// in the order they were scheduled.
    pub fn tick(&mut self, dt_ms: f64) -> Vec<E> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            self.pending[i].remaining_ms -= dt_ms;
            if self.pending[i].remaining_ms <= 0.0 {
                due.push(self.pending.remove(i).event);
            } else {
                i += 1;
            }
        }
        due
    }

    /// Drop every pending event.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
