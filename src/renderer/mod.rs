//! Rendering
//!
//! The frame loop hands over a snapshot plus two view flags; drawing never feeds back.
//! `scene` turns that into triangles, `pipeline` pushes them through WebGPU.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::build_vertices;

use crate::snapshot::WorldSnapshot;

/// Everything a renderer may look at for one tick
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    /// Latest snapshot; `None` before the first successful update
    pub snapshot: Option<&'a WorldSnapshot>,
    pub show_hitboxes: bool,
    pub paused: bool,
}

/// Sink for frames. Implementations must not call back into the loop.
pub trait Renderer {
    fn draw(&mut self, frame: &RenderFrame<'_>);
}
