//! The tick driver
//!
//! A `FrameLoop` owns everything one running game client needs. The platform
//! calls `tick` once per display refresh and only re-arms after the previous
//! tick settled, so at most one update request is ever in flight.

use std::rc::Rc;

use super::clock::FrameClock;
use super::control::LoopControl;
use crate::input::{Action, ActionSet, InputState};
use crate::millis_to_secs;
use crate::net::{ApiError, SimulationApi};
use crate::persistence::FlagStore;
use crate::renderer::{RenderFrame, Renderer};
use crate::snapshot::{GameResult, WorldSnapshot};
use crate::upload::{ScoreUploadGuard, UploadOutcome};

/// What a single tick ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Loop was torn down before the tick started; nothing happened
    TornDown,
    /// Paused overlay drawn, no request sent
    Paused,
    /// Snapshot received and drawn
    Rendered { game_over: bool },
    /// Update request failed; previous frame stays on screen
    NetworkFailed,
    /// Teardown happened while the request was in flight; response dropped
    Discarded,
}

pub struct FrameLoop<A: SimulationApi, R: Renderer, S: FlagStore> {
    api: A,
    renderer: R,
    upload: ScoreUploadGuard<S>,
    input: Rc<InputState>,
    control: Rc<LoopControl>,
    clock: FrameClock,
    /// Lifecycle generation this loop was built under
    generation: u64,
    last_snapshot: Option<WorldSnapshot>,
}

impl<A: SimulationApi, R: Renderer, S: FlagStore> FrameLoop<A, R, S> {
    pub fn new(
        api: A,
        renderer: R,
        upload: ScoreUploadGuard<S>,
        input: Rc<InputState>,
        control: Rc<LoopControl>,
    ) -> Self {
        let generation = control.generation();
        Self {
            api,
            renderer,
            upload,
            input,
            control,
            clock: FrameClock::new(),
            generation,
            last_snapshot: None,
        }
    }

    /// Run one tick at display timestamp `now_ms`
    pub async fn tick(&mut self, now_ms: f64) -> TickOutcome {
        if !self.should_rearm() {
            return TickOutcome::TornDown;
        }

        let paused = self.control.is_paused();
        let dt_ms = self.clock.advance(now_ms, paused);

        if self.control.take_reset() {
            self.reset_for_new_game();
        }

        let input = Rc::clone(&self.input);
        if input.shoot.is_held() {
            input.shoot.on_repeat_tick(now_ms);
        }

        // Freeze the whole action vector inside the assembly window
        let mut actions = ActionSet::empty();
        input.shoot.assemble(|fire| {
            actions = input.ledger.borrow().snapshot().with(Action::Fire, fire);
        });

        if paused {
            self.renderer.draw(&RenderFrame {
                snapshot: self.last_snapshot.as_ref(),
                show_hitboxes: self.control.show_hitboxes(),
                paused: true,
            });
            return TickOutcome::Paused;
        }

        let epoch = self.control.game_epoch();
        let response = self.api.update(millis_to_secs(dt_ms), actions).await;

        if !self.should_rearm() {
            log::debug!("Dropping update response after teardown");
            return TickOutcome::Discarded;
        }

        let snapshot = match response {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Game update failed: {}", e);
                return TickOutcome::NetworkFailed;
            }
        };

        self.renderer.draw(&RenderFrame {
            snapshot: Some(&snapshot),
            show_hitboxes: self.control.show_hitboxes(),
            paused: false,
        });

        let game_over = snapshot.is_game_over();
        // A snapshot requested before the current game started belongs to the old game
        let stale = self.control.is_starting() || self.control.game_epoch() != epoch;
        let result = GameResult::from_snapshot(&snapshot);
        self.last_snapshot = Some(snapshot);

        if game_over && !stale {
            if let UploadOutcome::Failed(reason) = self.upload.on_game_over(&self.api, result).await
            {
                log::debug!("Score upload pending retry: {}", reason);
            }
        }

        TickOutcome::Rendered { game_over }
    }

    /// False once the owning page tore the loop down
    pub fn should_rearm(&self) -> bool {
        self.control.is_live(self.generation)
    }

    pub fn last_snapshot(&self) -> Option<&WorldSnapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn upload_guard(&self) -> &ScoreUploadGuard<S> {
        &self.upload
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn reset_for_new_game(&mut self) {
        self.input.shoot.reset();
        self.upload.on_new_game();
        self.last_snapshot = None;
        log::info!("Per-game state reset for game #{}", self.control.game_epoch());
    }
}

/// Ask the server for a fresh game. The frame loop applies the per-game reset
/// on its next tick, and only if the server confirmed.
pub async fn start_new_game<A: SimulationApi>(
    api: &A,
    control: &LoopControl,
) -> Result<(), ApiError> {
    control.begin_new_game();
    let result = api.start_game().await;
    control.finish_new_game(result.is_ok());

    match &result {
        Ok(()) => log::info!("New game started"),
        Err(e) => log::warn!("Failed to start new game: {}", e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::ApiError;
    use crate::persistence::MemoryFlagStore;
    use crate::testing::ScriptedApi;
    use futures::executor::block_on;

    /// Records what it was asked to draw
    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<(Option<WorldSnapshot>, bool, bool)>,
    }

    impl Renderer for RecordingRenderer {
        fn draw(&mut self, frame: &RenderFrame<'_>) {
            self.frames
                .push((frame.snapshot.cloned(), frame.show_hitboxes, frame.paused));
        }
    }

    type TestLoop = FrameLoop<Rc<ScriptedApi>, RecordingRenderer, MemoryFlagStore>;

    struct Harness {
        api: Rc<ScriptedApi>,
        input: Rc<InputState>,
        control: Rc<LoopControl>,
        frame_loop: TestLoop,
    }

    fn harness() -> Harness {
        let api = Rc::new(ScriptedApi::new());
        let input = Rc::new(InputState::new());
        let control = Rc::new(LoopControl::new(false));
        let frame_loop = FrameLoop::new(
            Rc::clone(&api),
            RecordingRenderer::default(),
            ScoreUploadGuard::new(MemoryFlagStore::new()),
            Rc::clone(&input),
            Rc::clone(&control),
        );
        Harness {
            api,
            input,
            control,
            frame_loop,
        }
    }

    fn snapshot(score: i64, running: bool) -> WorldSnapshot {
        WorldSnapshot {
            score,
            level: 2,
            time: 30.5,
            is_running: running,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_tick_sends_zero_dt() {
        let mut h = harness();
        assert_eq!(
            block_on(h.frame_loop.tick(5000.0)),
            TickOutcome::Rendered { game_over: false }
        );
        block_on(h.frame_loop.tick(5016.0));

        let updates = h.api.updates();
        assert_eq!(updates[0].0, 0.0);
        assert!((updates[1].0 - 0.016).abs() < 1e-9);
    }

    #[test]
    fn test_actions_reach_server() {
        let mut h = harness();
        h.input.on_key(Action::Up, true, 0.0);
        h.input.on_key(Action::Right, true, 0.0);
        h.input.on_key(Action::Fire, true, 1.0);
        block_on(h.frame_loop.tick(5.0));

        h.input.on_key(Action::Up, false, 10.0);
        h.input.on_key(Action::Right, false, 10.0);
        h.input.on_key(Action::Fire, false, 10.0);
        block_on(h.frame_loop.tick(21.0));

        let updates = h.api.updates();
        assert_eq!(updates[0].1.to_wire(), "UP,RIGHT,SHOOT");
        assert!(updates[1].1.is_empty());
    }

    #[test]
    fn test_fire_between_ticks_lands_next_tick() {
        let mut h = harness();
        let input = Rc::clone(&h.input);
        // Key callback fires while the update is awaited, after assembly closed
        h.api.set_during_update(move || {
            input.on_key(Action::Fire, true, 8.0);
            input.on_key(Action::Fire, false, 9.0);
        });

        block_on(h.frame_loop.tick(0.0));
        block_on(h.frame_loop.tick(16.0));

        let updates = h.api.updates();
        assert!(!updates[0].1.contains(Action::Fire));
        assert!(updates[1].1.contains(Action::Fire));
    }

    #[test]
    fn test_pause_skips_network_and_keeps_frame() {
        let mut h = harness();
        h.api.push_update(Ok(snapshot(10, true)));
        block_on(h.frame_loop.tick(0.0));

        h.control.set_paused(true);
        assert_eq!(block_on(h.frame_loop.tick(16.0)), TickOutcome::Paused);
        assert_eq!(block_on(h.frame_loop.tick(32.0)), TickOutcome::Paused);
        assert_eq!(h.api.updates().len(), 1);

        let frames = &h.frame_loop.renderer().frames;
        let (paused_snapshot, _, paused) = &frames[1];
        assert!(*paused);
        assert_eq!(paused_snapshot.as_ref().map(|s| s.score), Some(10));

        // Resume after a long pause: dt does not spike
        h.control.set_paused(false);
        block_on(h.frame_loop.tick(10_000.0));
        assert_eq!(h.api.updates()[1].0, 0.0);
    }

    #[test]
    fn test_network_failure_keeps_previous_frame() {
        let mut h = harness();
        h.api.push_update(Ok(snapshot(10, true)));
        h.api.push_update(Err(ApiError::Status { status: 500 }));
        h.api.push_update(Ok(snapshot(20, true)));

        block_on(h.frame_loop.tick(0.0));
        assert_eq!(block_on(h.frame_loop.tick(16.0)), TickOutcome::NetworkFailed);
        assert_eq!(h.frame_loop.renderer().frames.len(), 1);
        assert_eq!(h.frame_loop.last_snapshot().map(|s| s.score), Some(10));

        assert_eq!(
            block_on(h.frame_loop.tick(32.0)),
            TickOutcome::Rendered { game_over: false }
        );
        assert_eq!(h.frame_loop.last_snapshot().map(|s| s.score), Some(20));
        assert!(h.frame_loop.should_rearm());
    }

    #[test]
    fn test_game_over_uploads_once() {
        let mut h = harness();
        for _ in 0..4 {
            h.api.push_update(Ok(snapshot(500, false)));
        }
        for t in 0..4 {
            assert_eq!(
                block_on(h.frame_loop.tick(t as f64 * 16.0)),
                TickOutcome::Rendered { game_over: true }
            );
        }
        assert_eq!(h.api.submit_calls(), 1);
        assert_eq!(
            h.api.submitted(),
            vec![GameResult {
                score: 500,
                level: 2,
                duration_secs: 30
            }]
        );
        assert!(h.frame_loop.upload_guard().is_uploaded());
    }

    #[test]
    fn test_failed_upload_retries_on_next_game_over() {
        let mut h = harness();
        h.api.push_submit(Err(ApiError::Status { status: 503 }));
        h.api.push_update(Ok(snapshot(500, false)));
        h.api.push_update(Ok(snapshot(500, false)));
        h.api.push_update(Ok(snapshot(500, false)));

        block_on(h.frame_loop.tick(0.0));
        assert!(!h.frame_loop.upload_guard().is_uploaded());
        block_on(h.frame_loop.tick(16.0));
        block_on(h.frame_loop.tick(32.0));
        assert_eq!(h.api.submit_calls(), 2);
        assert_eq!(h.api.submitted().len(), 1);
    }

    #[test]
    fn test_new_game_reopens_upload_and_resets_fire() {
        let mut h = harness();
        h.api.push_update(Ok(snapshot(500, false)));
        block_on(h.frame_loop.tick(0.0));
        assert!(h.frame_loop.upload_guard().is_uploaded());

        // A shot queued before the restart must not leak into the new game
        h.input.on_key(Action::Fire, true, 10.0);
        block_on(start_new_game(h.api.as_ref(), &h.control)).unwrap();
        assert_eq!(h.api.start_calls(), 1);

        h.api.push_update(Ok(snapshot(0, true)));
        block_on(h.frame_loop.tick(16.0));
        assert!(!h.frame_loop.upload_guard().is_uploaded());
        assert!(!h.api.updates()[1].1.contains(Action::Fire));

        h.api.push_update(Ok(snapshot(70, false)));
        block_on(h.frame_loop.tick(32.0));
        assert_eq!(h.api.submit_calls(), 2);
    }

    #[test]
    fn test_failed_start_keeps_gate_closed() {
        let mut h = harness();
        h.api.push_update(Ok(snapshot(500, false)));
        block_on(h.frame_loop.tick(0.0));

        h.api.push_start(Err(ApiError::Status { status: 500 }));
        assert!(block_on(start_new_game(h.api.as_ref(), &h.control)).is_err());

        h.api.push_update(Ok(snapshot(500, false)));
        block_on(h.frame_loop.tick(16.0));
        assert!(h.frame_loop.upload_guard().is_uploaded());
        assert_eq!(h.api.submit_calls(), 1);
    }

    #[test]
    fn test_stale_game_over_during_restart_not_uploaded() {
        let mut h = harness();
        let control = Rc::clone(&h.control);
        // The server confirms a new game while the old game's snapshot is in flight
        h.api.set_during_update(move || {
            control.begin_new_game();
            control.finish_new_game(true);
        });
        h.api.push_update(Ok(snapshot(500, false)));

        assert_eq!(
            block_on(h.frame_loop.tick(0.0)),
            TickOutcome::Rendered { game_over: true }
        );
        assert_eq!(h.api.submit_calls(), 0);
    }

    #[test]
    fn test_teardown_discards_in_flight_response() {
        let mut h = harness();
        let control = Rc::clone(&h.control);
        h.api.set_during_update(move || control.tear_down());
        h.api.push_update(Ok(snapshot(500, false)));

        assert_eq!(block_on(h.frame_loop.tick(0.0)), TickOutcome::Discarded);
        assert!(h.frame_loop.renderer().frames.is_empty());
        assert!(h.frame_loop.last_snapshot().is_none());
        assert_eq!(h.api.submit_calls(), 0);
        assert!(!h.frame_loop.should_rearm());

        assert_eq!(block_on(h.frame_loop.tick(16.0)), TickOutcome::TornDown);
        assert_eq!(h.api.updates().len(), 1);
    }

    #[test]
    fn test_hitbox_toggle_forwarded() {
        let mut h = harness();
        h.control.set_show_hitboxes(true);
        block_on(h.frame_loop.tick(0.0));
        let (_, show_hitboxes, paused) = &h.frame_loop.renderer().frames[0];
        assert!(*show_hitboxes);
        assert!(!*paused);
    }

    #[test]
    fn test_held_fire_at_sixty_hz_sends_five_shots() {
        let mut h = harness();
        h.input.on_key(Action::Fire, true, 0.0);
        h.input.on_key(Action::Left, true, 0.0);
        for k in 0..60 {
            block_on(h.frame_loop.tick(k as f64 * 1000.0 / 60.0));
        }
        let shots = h
            .api
            .updates()
            .iter()
            .filter(|(_, actions)| actions.contains(Action::Fire))
            .count();
        assert_eq!(shots, 5);
    }
}
