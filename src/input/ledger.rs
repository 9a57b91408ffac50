//! Held-key ledger and the per-frame action vector

use std::fmt;

/// A discrete player action understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Left,
    Right,
    Fire,
}

impl Action {
    /// All actions in wire order
    pub const ALL: [Action; 4] = [Action::Up, Action::Left, Action::Right, Action::Fire];

    /// Name used in the `inputs` query parameter
    pub fn wire_name(&self) -> &'static str {
        match self {
            Action::Up => "UP",
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
            Action::Fire => "SHOOT",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Action::Up => 1 << 0,
            Action::Left => 1 << 1,
            Action::Right => 1 << 2,
            Action::Fire => 1 << 3,
        }
    }
}

/// Set of actions, copied by value so a tick always works on a frozen view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionSet {
    bits: u8,
}

impl ActionSet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub fn insert(&mut self, action: Action) {
        self.bits |= action.bit();
    }

    pub fn remove(&mut self, action: Action) {
        self.bits &= !action.bit();
    }

    pub fn contains(&self, action: Action) -> bool {
        self.bits & action.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Copy of this set with `action` present or absent
    pub fn with(mut self, action: Action, present: bool) -> Self {
        if present {
            self.insert(action);
        } else {
            self.remove(action);
        }
        self
    }

    /// Actions in wire order
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(|a| self.contains(*a))
    }

    /// Comma-joined wire form, e.g. `UP,SHOOT`
    pub fn to_wire(&self) -> String {
        self.iter()
            .map(|a| a.wire_name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = ActionSet::empty();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

/// Keyboard layout: WASD plus space
pub struct KeyBinding;

impl KeyBinding {
    /// Map a DOM `KeyboardEvent` (`key`, `code`) to an action
    pub fn action_for(key: &str, code: &str) -> Option<Action> {
        if code == "Space" {
            return Some(Action::Fire);
        }
        match key.to_ascii_lowercase().as_str() {
            "w" => Some(Action::Up),
            "a" => Some(Action::Left),
            "d" => Some(Action::Right),
            "s" | " " => Some(Action::Fire),
            _ => None,
        }
    }
}

/// Currently held movement actions
///
/// Fire never lives here; it is decided per frame by the shoot coalescer.
#[derive(Debug, Default)]
pub struct InputLedger {
    held: ActionSet,
}

impl InputLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a key-down (`pressed`) or key-up for a movement action
    pub fn on_key_transition(&mut self, action: Action, pressed: bool) {
        if action == Action::Fire {
            return;
        }
        if pressed {
            self.held.insert(action);
        } else {
            self.held.remove(action);
        }
    }

    /// Frozen copy of the held set
    pub fn snapshot(&self) -> ActionSet {
        self.held
    }

    /// Release everything (window blur)
    pub fn clear(&mut self) {
        self.held = ActionSet::empty();
    }
}
