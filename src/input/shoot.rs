//! Fire coalescing
//!
//! Turns asynchronous fire key-down/key-up events into exactly one boolean per frame.
//! Two slots hold pending shots: `current` feeds the frame being assembled, `next`
//! catches shots that land while assembly is open and carries them into the
//! following frame. Nothing is lost and nothing is counted twice.
//!
//! All state sits in `Cell`s so key callbacks and the tick can share one
//! `&ShootCoalescer` on a single thread, including from inside the assembly window.

use std::cell::Cell;

use crate::consts::COOLDOWN_MS;

#[derive(Debug, Default)]
pub struct ShootCoalescer {
    held: Cell<bool>,
    last_fire_ms: Cell<Option<f64>>,
    current_frame: Cell<bool>,
    next_frame: Cell<bool>,
    assembling: Cell<bool>,
}

impl ShootCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire key pressed (or OS auto-repeat). Returns whether a shot was queued.
    ///
    /// While the key is held, further presses only count once the cooldown has passed.
    pub fn on_fire_key_down(&self, now_ms: f64) -> bool {
        let off_cooldown = match self.last_fire_ms.get() {
            Some(last) => now_ms - last > COOLDOWN_MS,
            None => true,
        };
        if self.held.get() && !off_cooldown {
            return false;
        }

        self.last_fire_ms.set(Some(now_ms));
        if self.assembling.get() {
            self.next_frame.set(true);
        } else {
            self.current_frame.set(true);
        }
        self.held.set(true);
        true
    }

    /// Fire key released. Pending shots stay queued.
    pub fn on_fire_key_up(&self) {
        self.held.set(false);
    }

    /// Tick-driven repeat: a held key keeps firing at the cooldown interval even
    /// when the platform stops delivering key repeats (e.g. another key went down).
    pub fn on_repeat_tick(&self, now_ms: f64) -> bool {
        if !self.held.get() {
            return false;
        }
        self.on_fire_key_down(now_ms)
    }

    /// Decide this frame's fire flag and run `build` with it while the
    /// assembly window is open. Shots arriving during `build` go to the next frame.
    pub fn assemble<F: FnOnce(bool)>(&self, build: F) -> bool {
        // Carry over whatever the previous window deferred
        self.current_frame
            .set(self.current_frame.get() || self.next_frame.get());
        self.next_frame.set(false);

        self.assembling.set(true);
        let fire = self.current_frame.replace(false);
        build(fire);
        self.assembling.set(false);

        fire
    }

    /// Critical section with no extra assembly work
    pub fn begin_assembly(&self) -> bool {
        self.assemble(|_| {})
    }

    pub fn is_held(&self) -> bool {
        self.held.get()
    }

    #[cfg(test)]
    pub fn is_assembling(&self) -> bool {
        self.assembling.get()
    }

    /// True if any shot is queued for a future frame
    pub fn has_pending(&self) -> bool {
        self.current_frame.get() || self.next_frame.get()
    }

    /// Back to a fresh state (new game)
    pub fn reset(&self) {
        self.held.set(false);
        self.last_fire_ms.set(None);
        self.current_frame.set(false);
        self.next_frame.set(false);
        self.assembling.set(false);
    }
}
