//! HTTP implementation of the simulation API
//!
//! Every endpoint is a GET with query parameters. On wasm32 reqwest goes through
//! `fetch`; natively it needs a tokio reactor.

use reqwest::{Client, Response};

use super::api::{Ack, ApiError, SimulationApi};
use crate::config::ClientConfig;
use crate::input::ActionSet;
use crate::settings::Difficulty;
use crate::snapshot::{GameResult, WorldSnapshot};

#[derive(Clone)]
pub struct HttpSimulationClient {
    client: Client,
    config: ClientConfig,
    difficulty: Difficulty,
}

impl HttpSimulationClient {
    pub fn new(config: ClientConfig, difficulty: Difficulty) -> Self {
        Self {
            client: Client::new(),
            config,
            difficulty,
        }
    }

    /// Identity and difficulty parameters shared by every request
    fn base_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.config.identity.username.clone()),
            ("profile_name", self.config.identity.profile_name.clone()),
            ("difficulty", self.difficulty.as_str().to_string()),
        ]
    }

    async fn get(&self, path: &str, query: &[(&'static str, String)]) -> Result<Response, ApiError> {
        let response = self
            .client
            .get(self.config.endpoint(path))
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_ack(&self, path: &str, query: &[(&'static str, String)]) -> Result<(), ApiError> {
        let body = self.get(path, query).await?.text().await?;
        Ack::check(&body)
    }
}

impl SimulationApi for HttpSimulationClient {
    async fn start_game(&self) -> Result<(), ApiError> {
        self.get_ack("newGame", &self.base_query()).await
    }

    async fn update(&self, dt_secs: f64, actions: ActionSet) -> Result<WorldSnapshot, ApiError> {
        let mut query = self.base_query();
        query.push(("dt", dt_secs.to_string()));
        query.push(("inputs", actions.to_wire()));

        let body = self.get("updateGame", &query).await?.text().await?;
        WorldSnapshot::from_json(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn submit_result(&self, result: &GameResult) -> Result<(), ApiError> {
        let mut query = self.base_query();
        query.push(("score", result.score.to_string()));
        query.push(("level", result.level.to_string()));
        query.push(("duration", result.duration_secs.to_string()));

        self.get_ack("uploadScore", &query).await
    }
}
