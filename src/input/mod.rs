//! Player input sampling
//!
//! Key callbacks write here synchronously; the frame loop reads exactly once per tick:
//! - Movement keys are level-triggered (held set)
//! - Fire is edge-triggered with a hold-repeat cooldown

pub mod ledger;
pub mod shoot;

use std::cell::RefCell;

pub use ledger::{Action, ActionSet, InputLedger, KeyBinding};
pub use shoot::ShootCoalescer;

/// Input shared between key callbacks and the tick (held in an `Rc`)
#[derive(Debug, Default)]
pub struct InputState {
    pub ledger: RefCell<InputLedger>,
    pub shoot: ShootCoalescer,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one key transition. `now_ms` must come from the same clock as tick timestamps.
    pub fn on_key(&self, action: Action, pressed: bool, now_ms: f64) {
        match (action, pressed) {
            (Action::Fire, true) => {
                self.shoot.on_fire_key_down(now_ms);
            }
            (Action::Fire, false) => self.shoot.on_fire_key_up(),
            (movement, pressed) => self.ledger.borrow_mut().on_key_transition(movement, pressed),
        }
    }

    /// Focus lost: key-ups will never arrive, so drop everything held
    pub fn release_all(&self) {
        self.ledger.borrow_mut().clear();
        self.shoot.on_fire_key_up();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_key_routes_fire_and_movement() {
        let input = InputState::new();
        input.on_key(Action::Left, true, 0.0);
        input.on_key(Action::Fire, true, 0.0);
        assert!(input.shoot.is_held());
        assert_eq!(input.ledger.borrow().snapshot().to_wire(), "LEFT");

        input.on_key(Action::Fire, false, 10.0);
        assert!(!input.shoot.is_held());
        assert!(input.shoot.has_pending());
    }

    #[test]
    fn test_release_all() {
        let input = InputState::new();
        input.on_key(Action::Up, true, 0.0);
        input.on_key(Action::Fire, true, 0.0);
        input.release_all();
        assert!(input.ledger.borrow().snapshot().is_empty());
        assert!(!input.shoot.is_held());
    }
}
