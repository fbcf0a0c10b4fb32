//! Deterministic simulation module
//!
//! Both game engines and everything they share live here. This module must
//! be pure and platform-free:
//! - State changes only inside `update(dt)` or the operations the
//!   orchestrator calls between frames
//! - Seeded RNG only
//! - No rendering or platform dependencies; renderers read the public
//!   entity state

pub mod asteroid;
pub mod clock;
pub mod collision;
pub mod particles;
pub mod rescue;
pub mod session;
pub mod starfield;

pub use asteroid::{Asteroid, AsteroidGame, CombatPhase, Laser};
pub use clock::{DelayLine, FrameClock};
pub use collision::{circles_overlap, scaled_hit};
pub use particles::{Effects, Particle};
pub use rescue::{Astronaut, BlackHole, RescueGame, RescueState, Rope};
pub use session::{CompletionHook, Hooks, MiniGame, Ship, Viewport};
pub use starfield::{Star, Starfield};
