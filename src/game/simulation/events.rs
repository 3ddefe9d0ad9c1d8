use bevy::prelude::*;

use super::components::Behavior;

/// Blast that damages terrain and every entity inside `radius`.
#[derive(Message, Debug, Clone, Copy)]
pub struct Explosion {
    pub center: Vec2,
    pub radius: f32,
    pub damage: f32,
}

/// Spawn a projectile at `origin` heading along `direction` at the
/// configured speed.
#[derive(Message, Debug, Clone, Copy)]
pub struct FireProjectile {
    pub origin: Vec2,
    pub direction: Vec2,
}

/// An entity's health reached zero this tick. Non-player entities are
/// despawned right after the message is written.
#[derive(Message, Debug, Clone, Copy)]
pub struct EntityKilled {
    pub entity: Entity,
    pub behavior: Behavior,
    pub position: Vec2,
}
