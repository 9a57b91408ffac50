//! Frame loop
//!
//! One tick per display refresh, strictly sequential:
//! clock → fire repeat → input assembly → (pause | server update) → render → score gate

pub mod clock;
pub mod control;
pub mod driver;

pub use clock::FrameClock;
pub use control::LoopControl;
pub use driver::{FrameLoop, TickOutcome, start_new_game};
