//! World snapshot returned by the server every tick
//!
//! Deserialization is lenient: missing fields fall back to defaults instead of
//! failing the tick. A snapshot is never mutated, only replaced.

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::DEFAULT_ENTITY_RADIUS;

/// Server-side 2D position (`{x, y}` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// Circular collision area
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Hitbox {
    #[serde(deserialize_with = "null_as_default")]
    pub position: Point,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    #[serde(deserialize_with = "null_as_default")]
    pub position: Point,
    /// Radians; 0 points along +x
    #[serde(deserialize_with = "null_as_default")]
    pub orientation: f32,
    /// Negative or fractional counts clamp to whole lives >= 0
    #[serde(deserialize_with = "lenient_count")]
    pub lives: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub is_invincible: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub hitbox: Vec<Hitbox>,
}

/// A player bullet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Projectile {
    #[serde(deserialize_with = "null_as_default")]
    pub position: Point,
    #[serde(deserialize_with = "null_as_default")]
    pub orientation: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub hitbox: Vec<Hitbox>,
}

impl Projectile {
    pub fn draw_radius(&self) -> f32 {
        primary_radius(&self.hitbox)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnemyKind {
    Asteroid,
    Comet,
    Alien,
    /// Alien projectile
    Bullet,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AsteroidSize {
    Small,
    Medium,
    Large,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Enemy {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: EnemyKind,
    /// Only present for asteroids
    pub size: Option<AsteroidSize>,
    #[serde(deserialize_with = "null_as_default")]
    pub position: Point,
    #[serde(deserialize_with = "null_as_default")]
    pub orientation: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub hitbox: Vec<Hitbox>,
}

impl Enemy {
    pub fn draw_radius(&self) -> f32 {
        primary_radius(&self.hitbox)
    }
}

fn primary_radius(hitbox: &[Hitbox]) -> f32 {
    hitbox
        .first()
        .map(|hb| hb.radius)
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(DEFAULT_ENTITY_RADIUS)
}

/// Complete world state for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSnapshot {
    pub player: Option<PlayerState>,
    #[serde(deserialize_with = "null_as_default")]
    pub score: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub level: i64,
    /// Survival time in seconds
    #[serde(deserialize_with = "null_as_default")]
    pub time: f64,
    #[serde(deserialize_with = "running_flag")]
    pub is_running: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub bullets: Vec<Projectile>,
    #[serde(deserialize_with = "null_as_default")]
    pub enemies: Vec<Enemy>,
}

/// `null` reads like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An unknown running state keeps the game going
fn running_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(if value.is_finite() && value > 0.0 {
        value.min(u32::MAX as f64) as u32
    } else {
        0
    })
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self {
            player: None,
            score: 0,
            level: 0,
            time: 0.0,
            // A snapshot that omits the flag must never look like game over
            is_running: true,
            bullets: Vec::new(),
            enemies: Vec::new(),
        }
    }
}

impl WorldSnapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn lives(&self) -> u32 {
        self.player.as_ref().map(|p| p.lives).unwrap_or(0)
    }

    pub fn is_game_over(&self) -> bool {
        !self.is_running
    }

    /// Whole seconds survived
    pub fn whole_seconds(&self) -> u32 {
        if self.time.is_finite() && self.time > 0.0 {
            self.time.floor() as u32
        } else {
            0
        }
    }
}

/// Final numbers submitted once a game ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub score: i64,
    pub level: i64,
    pub duration_secs: u32,
}

impl GameResult {
    pub fn from_snapshot(snapshot: &WorldSnapshot) -> Self {
        Self {
            score: snapshot.score,
            level: snapshot.level,
            duration_secs: snapshot.whole_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_JSON: &str = r#"{
        "player": {
            "position": {"x": 500.0, "y": 500.0},
            "orientation": -1.5707964,
            "hitbox": [{"position": {"x": 500.0, "y": 500.0}, "radius": 10.0}],
            "lives": 3,
            "is_invincible": true
        },
        "score": 150,
        "level": 2,
        "time": 42.75,
        "is_running": true,
        "bullets": [
            {"position": {"x": 1.0, "y": 2.0}, "orientation": 0.5,
             "hitbox": [{"position": {"x": 1.0, "y": 2.0}, "radius": 2.0}]}
        ],
        "enemies": [
            {"type": "ASTEROID", "size": "LARGE", "position": {"x": 10.0, "y": 20.0},
             "orientation": 0.1, "hitbox": [{"position": {"x": 10.0, "y": 20.0}, "radius": 32.0}]},
            {"type": "COMET", "position": {"x": 0.0, "y": 0.0}, "orientation": 0.0, "hitbox": []},
            {"type": "UFO", "position": {"x": 0.0, "y": 0.0}, "orientation": 0.0,
             "hitbox": [{"position": {"x": 0.0, "y": 0.0}, "radius": 7.0}]}
        ]
    }"#;

    #[test]
    fn test_parse_server_snapshot() {
        let snap = WorldSnapshot::from_json(SERVER_JSON).unwrap();
        assert_eq!(snap.lives(), 3);
        assert_eq!(snap.score, 150);
        assert_eq!(snap.level, 2);
        assert!(snap.is_running);
        assert!(snap.player.as_ref().unwrap().is_invincible);
        assert_eq!(snap.bullets.len(), 1);
        assert_eq!(snap.bullets[0].draw_radius(), 2.0);

        assert_eq!(snap.enemies[0].kind, EnemyKind::Asteroid);
        assert_eq!(snap.enemies[0].size, Some(AsteroidSize::Large));
        assert_eq!(snap.enemies[0].draw_radius(), 32.0);
        assert_eq!(snap.enemies[1].kind, EnemyKind::Comet);
        assert_eq!(snap.enemies[1].size, None);
        assert_eq!(snap.enemies[1].draw_radius(), DEFAULT_ENTITY_RADIUS);
        assert_eq!(snap.enemies[2].kind, EnemyKind::Unknown);
    }

    #[test]
    fn test_missing_fields_default() {
        let snap = WorldSnapshot::from_json("{}").unwrap();
        assert!(snap.player.is_none());
        assert_eq!(snap.lives(), 0);
        assert_eq!(snap.score, 0);
        assert!(snap.enemies.is_empty());
        assert!(snap.is_running, "missing flag must not end the game");

        let snap = WorldSnapshot::from_json(r#"{"player": {}, "is_running": false}"#).unwrap();
        assert_eq!(snap.lives(), 0);
        assert!(snap.is_game_over());
    }

    #[test]
    fn test_null_and_out_of_range_fields_default() {
        let snap = WorldSnapshot::from_json(
            r#"{"player":{"lives":2,"hitbox":null,"position":null},"score":5,
                "bullets":null,"enemies":null,"is_running":true}"#,
        )
        .unwrap();
        assert_eq!(snap.lives(), 2);
        assert_eq!(snap.score, 5);
        assert!(snap.bullets.is_empty());
        assert!(snap.enemies.is_empty());
        assert!(snap.player.as_ref().unwrap().hitbox.is_empty());

        // Game over must still be seen so the score gets submitted
        let snap = WorldSnapshot::from_json(
            r#"{"player":{"lives":-1},"score":null,"time":12.5,
                "bullets":null,"enemies":[{"type":null,"hitbox":null}],"is_running":false}"#,
        )
        .unwrap();
        assert_eq!(snap.lives(), 0);
        assert_eq!(snap.score, 0);
        assert!(snap.is_game_over());
        assert_eq!(snap.enemies[0].kind, EnemyKind::Unknown);
        assert_eq!(snap.enemies[0].draw_radius(), DEFAULT_ENTITY_RADIUS);
        assert_eq!(GameResult::from_snapshot(&snap).duration_secs, 12);
    }

    #[test]
    fn test_null_running_flag_keeps_playing() {
        let snap = WorldSnapshot::from_json(r#"{"is_running":null}"#).unwrap();
        assert!(!snap.is_game_over());
    }

    #[test]
    fn test_game_result_floors_time() {
        let snap = WorldSnapshot {
            score: 900,
            level: 4,
            time: 61.99,
            is_running: false,
            ..Default::default()
        };
        assert_eq!(
            GameResult::from_snapshot(&snap),
            GameResult {
                score: 900,
                level: 4,
                duration_secs: 61
            }
        );

        let weird = WorldSnapshot {
            time: f64::NAN,
            ..Default::default()
        };
        assert_eq!(weird.whole_seconds(), 0);
    }
}
