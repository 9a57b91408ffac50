//! Snapshot → triangle list, in world coordinates
//!
//! Pure function of the frame; the GPU side only maps world units to NDC.

use glam::Vec2;

use super::RenderFrame;
use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::{SHIP_SIZE, WORLD_SIZE};
use crate::snapshot::{AsteroidSize, Enemy, EnemyKind, Hitbox, WorldSnapshot};

const BODY_SEGMENTS: u32 = 20;
const BULLET_SEGMENTS: u32 = 8;
const HITBOX_LINE: f32 = 1.5;

fn enemy_color(enemy: &Enemy) -> [f32; 4] {
    match enemy.kind {
        EnemyKind::Asteroid => match enemy.size {
            Some(AsteroidSize::Small) => colors::ASTEROID_SMALL,
            Some(AsteroidSize::Medium) => colors::ASTEROID_MEDIUM,
            Some(AsteroidSize::Large) => colors::ASTEROID_LARGE,
            Some(AsteroidSize::Unknown) | None => colors::UNKNOWN,
        },
        EnemyKind::Comet => colors::COMET,
        EnemyKind::Alien => colors::ALIEN,
        EnemyKind::Bullet => colors::ALIEN_BULLET,
        EnemyKind::Unknown => colors::UNKNOWN,
    }
}

fn hitbox_rings(hitboxes: &[Hitbox], out: &mut Vec<Vertex>) {
    for hb in hitboxes {
        let outer = hb.radius.max(HITBOX_LINE);
        out.extend(shapes::ring(
            hb.position.into(),
            outer - HITBOX_LINE,
            outer,
            colors::HITBOX,
            BODY_SEGMENTS,
        ));
    }
}

fn world_entities(snapshot: &WorldSnapshot, show_hitboxes: bool, out: &mut Vec<Vertex>) {
    for bullet in &snapshot.bullets {
        out.extend(shapes::circle(
            bullet.position.into(),
            bullet.draw_radius(),
            colors::PLAYER_BULLET,
            BULLET_SEGMENTS,
        ));
    }

    for enemy in &snapshot.enemies {
        let segments = if enemy.kind == EnemyKind::Bullet {
            BULLET_SEGMENTS
        } else {
            BODY_SEGMENTS
        };
        out.extend(shapes::circle(
            enemy.position.into(),
            enemy.draw_radius(),
            enemy_color(enemy),
            segments,
        ));
    }

    if let Some(player) = &snapshot.player {
        let color = if player.is_invincible {
            colors::SHIP_INVINCIBLE
        } else {
            colors::SHIP
        };
        out.extend(shapes::ship(
            player.position.into(),
            player.orientation,
            SHIP_SIZE,
            color,
        ));
    }

    if show_hitboxes {
        for enemy in &snapshot.enemies {
            hitbox_rings(&enemy.hitbox, out);
        }
        for bullet in &snapshot.bullets {
            hitbox_rings(&bullet.hitbox, out);
        }
        if let Some(player) = &snapshot.player {
            hitbox_rings(&player.hitbox, out);
        }
    }

    if snapshot.is_game_over() {
        out.extend(full_screen(colors::GAME_OVER_VEIL));
    }
}

fn full_screen(color: [f32; 4]) -> Vec<Vertex> {
    shapes::rect(Vec2::ZERO, Vec2::splat(WORLD_SIZE), color)
}

/// Build the triangle list for one frame
pub fn build_vertices(frame: &RenderFrame<'_>) -> Vec<Vertex> {
    let mut vertices = Vec::new();

    if let Some(snapshot) = frame.snapshot {
        world_entities(snapshot, frame.show_hitboxes, &mut vertices);
    }
    if frame.paused {
        vertices.extend(full_screen(colors::PAUSE_VEIL));
    }

    vertices
}
