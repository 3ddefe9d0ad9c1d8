use bevy::prelude::*;
use rand::Rng;

use crate::game::agent::PathFollower;
use crate::game::config::InitialConfig;
use crate::game::world::{Chunk, ChunkReady, Tile, TileMap};
use super::components::*;
use super::events::FireProjectile;
use super::resources::SpawnRng;

pub fn player_bundle(config: &InitialConfig, position: Vec2) -> impl Bundle {
    (
        Name::new("Player"),
        Behavior::Player,
        SimPosition(position),
        SimVelocity::default(),
        Collider::square(config.player_size),
        Drag(config.player_drag),
        Health::new(config.player_health),
    )
}

pub fn enemy_bundle(config: &InitialConfig, position: Vec2) -> impl Bundle {
    (
        Name::new("Enemy"),
        Behavior::Enemy,
        SimPosition(position),
        SimVelocity::default(),
        Collider::square(config.enemy_size),
        Drag(config.enemy_drag),
        Health::new(config.enemy_health),
        PathFollower::default(),
    )
}

/// Immovable target, useful as a pursuit anchor or for explosion tests.
pub fn dummy_bundle(position: Vec2) -> impl Bundle {
    (
        Name::new("Dummy"),
        Behavior::Dummy,
        SimPosition(position),
        SimVelocity::default(),
        Collider::default(),
    )
}

pub fn projectile_bundle(config: &InitialConfig, position: Vec2, velocity: Vec2) -> impl Bundle {
    (
        Name::new("Projectile"),
        Projectile {
            damage: config.projectile_damage,
            life: config.projectile_lifetime,
            drag: config.projectile_drag,
            restitution: config.projectile_restitution,
        },
        SimPosition(position),
        SimVelocity(velocity),
    )
}

/// Turn fire requests into projectiles travelling at `projectile_speed`.
pub fn fire_projectiles(
    mut commands: Commands,
    mut requests: MessageReader<FireProjectile>,
    config: Res<InitialConfig>,
) {
    for request in requests.read() {
        let direction = request.direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            continue;
        }
        commands.spawn(projectile_bundle(&config, request.origin, direction * config.projectile_speed));
    }
}

/// Random `Floor` tile of `chunk`, as the world-space centre of that tile.
pub fn safe_spot(map: &TileMap, chunk: &Chunk, rng: &mut impl Rng) -> Option<Vec2> {
    let floors = chunk.locals_where(|tile| tile == Tile::Floor);
    if floors.is_empty() {
        return None;
    }
    let local = floors[rng.random_range(0..floors.len())];
    let settings = map.settings();
    Some(settings.tile_center(settings.local_to_tile(chunk.coord, local)))
}

/// Fill every freshly generated chunk with enemies, once per chunk.
pub fn populate_ready_chunks(
    mut commands: Commands,
    mut ready: MessageReader<ChunkReady>,
    mut map: ResMut<TileMap>,
    mut rng: ResMut<SpawnRng>,
    config: Res<InitialConfig>,
) {
    for &ChunkReady { coord } in ready.read() {
        let Some(chunk) = map.chunk(coord) else { continue };
        if chunk.populated {
            continue;
        }

        let mut spawned = 0;
        for _ in 0..config.enemies_per_chunk {
            let Some(position) = safe_spot(&map, chunk, &mut rng.0) else {
                warn!("[SPAWN] Chunk {} has no floor to spawn on", coord);
                break;
            };
            commands.spawn(enemy_bundle(&config, position));
            spawned += 1;
        }

        if let Some(chunk) = map.chunk_mut(coord) {
            chunk.populated = true;
        }
        debug!("[SPAWN] Populated chunk {} with {} enemies", coord, spawned);
    }
}
