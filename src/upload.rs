//! One-shot score submission
//!
//! Once a finished game's result has been accepted it is never submitted again,
//! even across a page reload. A failed attempt leaves the gate open so the next
//! game-over evaluation retries.

use crate::consts::UPLOAD_FLAG_KEY;
use crate::net::SimulationApi;
use crate::persistence::FlagStore;
use crate::snapshot::GameResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Gate already closed, nothing sent
    AlreadyUploaded,
    /// Server accepted the result
    Submitted,
    /// Server answered with a refusal; gate closed, no retry
    Rejected(String),
    /// Transport or status failure; gate stays open
    Failed(String),
}

pub struct ScoreUploadGuard<S: FlagStore> {
    store: S,
    /// Mirror of the persisted flag, authoritative within this page
    uploaded: bool,
}

impl<S: FlagStore> ScoreUploadGuard<S> {
    /// Restore the gate from storage
    pub fn new(store: S) -> Self {
        let uploaded = store.load(UPLOAD_FLAG_KEY).unwrap_or(false);
        log::info!("Score upload gate restored (uploaded = {})", uploaded);
        Self { store, uploaded }
    }

    pub fn is_uploaded(&self) -> bool {
        self.uploaded
    }

    /// Submit `result` unless it already went through
    pub async fn on_game_over<A: SimulationApi>(
        &mut self,
        api: &A,
        result: GameResult,
    ) -> UploadOutcome {
        if self.uploaded || self.store.load(UPLOAD_FLAG_KEY) == Some(true) {
            self.uploaded = true;
            return UploadOutcome::AlreadyUploaded;
        }

        log::info!(
            "Uploading score {} (level {}, {}s)",
            result.score,
            result.level,
            result.duration_secs
        );

        match api.submit_result(&result).await {
            Ok(()) => {
                self.mark_uploaded();
                log::info!("Score uploaded successfully");
                UploadOutcome::Submitted
            }
            Err(e) if e.is_rejection() => {
                self.mark_uploaded();
                log::warn!("Score upload refused: {}", e);
                UploadOutcome::Rejected(e.to_string())
            }
            Err(e) => {
                log::warn!("Score upload failed, will retry: {}", e);
                UploadOutcome::Failed(e.to_string())
            }
        }
    }

    /// Reopen the gate for a new game
    pub fn on_new_game(&mut self) {
        self.uploaded = false;
        self.store.remove(UPLOAD_FLAG_KEY);
    }

    fn mark_uploaded(&mut self) {
        self.uploaded = true;
        self.store.store(UPLOAD_FLAG_KEY, true);
    }
}
