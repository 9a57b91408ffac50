//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for world entities
pub mod colors {
    pub const SHIP: [f32; 4] = [0.85, 0.9, 1.0, 1.0];
    pub const SHIP_INVINCIBLE: [f32; 4] = [1.0, 0.85, 0.2, 0.8];
    pub const PLAYER_BULLET: [f32; 4] = [0.4, 1.0, 0.6, 1.0];
    pub const ASTEROID_SMALL: [f32; 4] = [0.55, 0.5, 0.45, 1.0];
    pub const ASTEROID_MEDIUM: [f32; 4] = [0.5, 0.45, 0.4, 1.0];
    pub const ASTEROID_LARGE: [f32; 4] = [0.45, 0.4, 0.35, 1.0];
    pub const COMET: [f32; 4] = [0.5, 0.8, 1.0, 1.0];
    pub const ALIEN: [f32; 4] = [0.7, 0.3, 0.9, 1.0];
    pub const ALIEN_BULLET: [f32; 4] = [1.0, 0.3, 0.3, 1.0];
    pub const UNKNOWN: [f32; 4] = [0.0, 0.8, 0.0, 1.0];
    pub const HITBOX: [f32; 4] = [1.0, 0.0, 0.0, 0.5];
    pub const PAUSE_VEIL: [f32; 4] = [0.0, 0.0, 0.0, 0.55];
    pub const GAME_OVER_VEIL: [f32; 4] = [0.3, 0.0, 0.0, 0.35];
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.05, 1.0];
}
