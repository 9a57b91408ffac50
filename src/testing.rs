//! Scripted in-memory server for unit tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::input::ActionSet;
use crate::net::{ApiError, SimulationApi};
use crate::snapshot::{GameResult, WorldSnapshot};

/// Replays queued responses; empty queues answer with success
#[derive(Default)]
pub struct ScriptedApi {
    updates: RefCell<VecDeque<Result<WorldSnapshot, ApiError>>>,
    submits: RefCell<VecDeque<Result<(), ApiError>>>,
    starts: RefCell<VecDeque<Result<(), ApiError>>>,
    update_log: RefCell<Vec<(f64, ActionSet)>>,
    submitted: RefCell<Vec<GameResult>>,
    submit_calls: Cell<usize>,
    start_calls: Cell<usize>,
    /// Runs while an update is "on the wire"
    during_update: RefCell<Option<Box<dyn FnMut()>>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_update(&self, response: Result<WorldSnapshot, ApiError>) {
        self.updates.borrow_mut().push_back(response);
    }

    pub fn push_submit(&self, response: Result<(), ApiError>) {
        self.submits.borrow_mut().push_back(response);
    }

    pub fn push_start(&self, response: Result<(), ApiError>) {
        self.starts.borrow_mut().push_back(response);
    }

    pub fn set_during_update(&self, hook: impl FnMut() + 'static) {
        *self.during_update.borrow_mut() = Some(Box::new(hook));
    }

    pub fn updates(&self) -> Vec<(f64, ActionSet)> {
        self.update_log.borrow().clone()
    }

    pub fn submitted(&self) -> Vec<GameResult> {
        self.submitted.borrow().clone()
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.get()
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.get()
    }
}

impl SimulationApi for ScriptedApi {
    async fn start_game(&self) -> Result<(), ApiError> {
        self.start_calls.set(self.start_calls.get() + 1);
        self.starts.borrow_mut().pop_front().unwrap_or(Ok(()))
    }

    async fn update(&self, dt_secs: f64, actions: ActionSet) -> Result<WorldSnapshot, ApiError> {
        self.update_log.borrow_mut().push((dt_secs, actions));
        if let Some(hook) = self.during_update.borrow_mut().as_mut() {
            hook();
        }
        self.updates
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(WorldSnapshot::default()))
    }

    async fn submit_result(&self, result: &GameResult) -> Result<(), ApiError> {
        self.submit_calls.set(self.submit_calls.get() + 1);
        let response = self.submits.borrow_mut().pop_front().unwrap_or(Ok(()));
        if response.is_ok() {
            self.submitted.borrow_mut().push(*result);
        }
        response
    }
}
