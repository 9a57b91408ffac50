//! Request/response contract with the simulation server

use std::rc::Rc;

use serde::{Deserialize, Deserializer};

use crate::input::ActionSet;
use crate::snapshot::{GameResult, WorldSnapshot};

/// Operations the frame loop needs from the server.
///
/// Futures are awaited on a single thread, so implementations need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait SimulationApi {
    /// Start (or restart) the game for the configured player
    async fn start_game(&self) -> Result<(), ApiError>;

    /// Advance the world by `dt_secs` with this frame's actions
    async fn update(&self, dt_secs: f64, actions: ActionSet) -> Result<WorldSnapshot, ApiError>;

    /// Record a finished game
    async fn submit_result(&self, result: &GameResult) -> Result<(), ApiError>;
}

/// Shared handle: the frame loop and the Start button talk to the same client
impl<T: SimulationApi> SimulationApi for Rc<T> {
    async fn start_game(&self) -> Result<(), ApiError> {
        (**self).start_game().await
    }

    async fn update(&self, dt_secs: f64, actions: ActionSet) -> Result<WorldSnapshot, ApiError> {
        (**self).update(dt_secs, actions).await
    }

    async fn submit_result(&self, result: &GameResult) -> Result<(), ApiError> {
        (**self).submit_result(result).await
    }
}

/// Network / API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {status})")]
    Status { status: u16 },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Server rejected request: {0}")]
    Rejected(String),
}

impl ApiError {
    /// The server answered and said no; repeating the same request will not help
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected(_))
    }
}

/// `{"success": ..., "error": "..."}` acknowledgement body.
///
/// The server writes `success` as a quoted string; plain booleans are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(deserialize_with = "bool_or_string")]
    pub success: bool,
    #[serde(default)]
    pub error: String,
}

impl Ack {
    /// Interpret a 2xx body. Bodies that are not an ack count as success.
    pub fn check(body: &str) -> Result<(), ApiError> {
        match serde_json::from_str::<Ack>(body) {
            Ok(ack) if !ack.success => Err(ApiError::Rejected(if ack.error.is_empty() {
                "unspecified".to_string()
            } else {
                ack.error
            })),
            _ => Ok(()),
        }
    }
}

fn bool_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolLike {
        Bool(bool),
        Text(String),
    }

    Ok(match BoolLike::deserialize(deserializer)? {
        BoolLike::Bool(b) => b,
        BoolLike::Text(s) => s.trim().eq_ignore_ascii_case("true"),
    })
}
