//! Asteroids thin client - the server simulates, the client samples input and draws
//!
//! Core modules:
//! - `input`: Key ledger and fire coalescing (one input vector per frame)
//! - `frame`: Frame clock, shared loop controls and the tick driver
//! - `net`: Request/response contract with the remote simulation
//! - `snapshot`: Server world snapshot (read-only, replaced every tick)
//! - `upload`: One-shot score submission gate
//! - `renderer`: WebGPU rendering pipeline
//! - `persistence` / `platform`: Browser storage and clock abstraction

pub mod config;
pub mod frame;
pub mod input;
pub mod net;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod snapshot;
pub mod upload;

#[cfg(test)]
mod testing;

pub use config::{ClientConfig, ConfigError, PlayerIdentity};
pub use frame::{FrameLoop, LoopControl, TickOutcome, start_new_game};
pub use input::{Action, ActionSet, InputLedger, InputState, ShootCoalescer};
pub use net::{ApiError, HttpSimulationClient, SimulationApi};
pub use renderer::{RenderFrame, Renderer};
pub use settings::{Difficulty, Settings};
pub use snapshot::{GameResult, WorldSnapshot};
pub use upload::{ScoreUploadGuard, UploadOutcome};

/// Client configuration constants
pub mod consts {
    /// Minimum spacing between two shots while fire is held (ms)
    pub const COOLDOWN_MS: f64 = 200.0;

    /// World is a square canvas of this many units per side, y pointing down
    pub const WORLD_SIZE: f32 = 1000.0;

    /// Drawn ship size (the server hitbox is smaller)
    pub const SHIP_SIZE: f32 = 50.0;

    /// Fallback radius when an entity arrives without a hitbox
    pub const DEFAULT_ENTITY_RADIUS: f32 = 4.0;

    /// sessionStorage key for the upload gate
    pub const UPLOAD_FLAG_KEY: &str = "scoreUploaded";
}

/// Milliseconds to seconds, as the server expects elapsed time
#[inline]
pub fn millis_to_secs(ms: f64) -> f64 {
    ms / 1000.0
}
