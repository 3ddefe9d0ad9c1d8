use bevy::prelude::*;

pub mod config;
pub mod debug;
pub mod world;
pub mod pathfinding;
pub mod agent;
pub mod simulation;

use agent::AgentPlugin;
use config::{GameConfigPlugin, InitialConfig};
use pathfinding::PathfindingPlugin;
use simulation::{player_bundle, SimulationPlugin};
use world::{Tile, TileMap, WorldPlugin};

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            GameConfigPlugin,
            WorldPlugin,
            SimulationPlugin,
            PathfindingPlugin,
            AgentPlugin,
        ))
        .add_systems(Startup, setup_game);
    }
}

/// Generate the origin chunk up front and spawn the player on the floor tile
/// closest to its centre. The origin chunk is never populated; everything
/// around it is streamed in by the fixed-tick systems.
fn setup_game(mut commands: Commands, config: Res<InitialConfig>, mut map: ResMut<TileMap>) {
    info!("Game setup started");

    map.ensure_chunk_ready(IVec2::ZERO);
    let settings = *map.settings();
    let center = UVec2::splat(settings.chunk_size as u32 / 2);
    let spawn_local = map
        .chunk(IVec2::ZERO)
        .and_then(|chunk| {
            chunk
                .locals_where(|tile| tile == Tile::Floor)
                .into_iter()
                .min_by_key(|local| local.as_ivec2().distance_squared(center.as_ivec2()))
        })
        .unwrap_or(center);

    let spawn = settings.tile_center(settings.local_to_tile(IVec2::ZERO, spawn_local));
    commands.spawn(player_bundle(&config, spawn));

    info!("Player spawned at {}", spawn);
}
