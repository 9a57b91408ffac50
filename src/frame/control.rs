//! Flags shared between UI callbacks and the tick
//!
//! Single-threaded: held in an `Rc`, mutated through `Cell`s.

use std::cell::Cell;

#[derive(Debug, Default)]
pub struct LoopControl {
    paused: Cell<bool>,
    show_hitboxes: Cell<bool>,
    /// Bumped on teardown; loops built under an older value are dead
    generation: Cell<u64>,
    /// Bumped each time the server confirms a new game
    game_epoch: Cell<u64>,
    start_in_flight: Cell<bool>,
    reset_pending: Cell<bool>,
}

impl LoopControl {
    pub fn new(show_hitboxes: bool) -> Self {
        let control = Self::default();
        control.show_hitboxes.set(show_hitboxes);
        control
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.set(paused);
    }

    /// Flip pause, returning the new state
    pub fn toggle_pause(&self) -> bool {
        let paused = !self.paused.get();
        self.paused.set(paused);
        paused
    }

    pub fn show_hitboxes(&self) -> bool {
        self.show_hitboxes.get()
    }

    pub fn set_show_hitboxes(&self, show: bool) {
        self.show_hitboxes.set(show);
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// True while no teardown happened since `generation` was captured
    pub fn is_live(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }

    /// Invalidate every loop built so far
    pub fn tear_down(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        log::info!("Frame loop torn down");
    }

    pub fn game_epoch(&self) -> u64 {
        self.game_epoch.get()
    }

    pub fn is_starting(&self) -> bool {
        self.start_in_flight.get()
    }

    /// A start-game request is about to be sent
    pub fn begin_new_game(&self) {
        self.start_in_flight.set(true);
    }

    /// The start-game request settled. On success the next tick resets per-game state.
    pub fn finish_new_game(&self, ok: bool) {
        self.start_in_flight.set(false);
        if ok {
            self.game_epoch.set(self.game_epoch.get().wrapping_add(1));
            self.reset_pending.set(true);
        }
    }

    /// Consume a pending per-game reset
    pub fn take_reset(&self) -> bool {
        self.reset_pending.replace(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teardown_invalidates_generation() {
        let control = LoopControl::new(false);
        let gen0 = control.generation();
        assert!(control.is_live(gen0));
        control.tear_down();
        assert!(!control.is_live(gen0));
        assert!(control.is_live(control.generation()));
    }

    #[test]
    fn test_new_game_bracketing() {
        let control = LoopControl::new(false);
        control.begin_new_game();
        assert!(control.is_starting());
        assert!(!control.take_reset());

        control.finish_new_game(true);
        assert!(!control.is_starting());
        assert_eq!(control.game_epoch(), 1);
        assert!(control.take_reset());
        assert!(!control.take_reset());
    }

    #[test]
    fn test_failed_start_keeps_epoch() {
        let control = LoopControl::new(false);
        control.begin_new_game();
        control.finish_new_game(false);
        assert!(!control.is_starting());
        assert_eq!(control.game_epoch(), 0);
        assert!(!control.take_reset());
    }

    #[test]
    fn test_toggle_pause() {
        let control = LoopControl::new(true);
        assert!(control.show_hitboxes());
        assert!(control.toggle_pause());
        assert!(control.is_paused());
        assert!(!control.toggle_pause());
    }
}
