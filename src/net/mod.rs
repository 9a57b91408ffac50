//! Remote simulation boundary
//!
//! The server owns the world. The client sends elapsed time plus one input
//! vector per tick and receives a full snapshot back.

pub mod api;
pub mod http;

pub use api::{Ack, ApiError, SimulationApi};
pub use http::HttpSimulationClient;
