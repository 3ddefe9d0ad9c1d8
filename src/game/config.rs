use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};

use crate::game::agent::FollowerTuning;
use crate::game::debug::{DebugCategory, DebugContext};
use crate::game::pathfinding::PathLimits;
use crate::game::world::{BspGenerator, GridSettings};

pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Static configuration read once at startup. These values shape the world and
/// the simulation (chunk geometry, generation, pathing budgets, agent tuning)
/// and must not change while a session is running.
#[derive(Resource, Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct InitialConfig {
    // Simulation
    pub tick_rate: f64,
    pub physics_substeps: usize,
    pub separation_radius: f32,
    pub separation_strength: f32,

    // World geometry
    pub chunk_size: usize,
    pub tile_size: f32,

    // Terrain generation
    pub world_seed: u64,
    pub bsp_depth: u32,
    pub bsp_min_room_size: usize,
    pub bsp_split_min: f32,
    pub bsp_split_max: f32,

    // Grid queries
    pub raycast_epsilon: f32,

    // Pathfinding
    pub astar_expansion_multiplier: usize,
    pub max_chunk_hops: usize,

    // Agent controller
    pub pursuit_distance: u32,
    pub replan_distance: u32,
    pub replan_remaining_steps: usize,
    pub arrival_epsilon: f32,
    pub steering_force: f32,
    pub kill_on_path_failure: bool,

    // Entities
    pub enemies_per_chunk: usize,
    pub enemy_health: f32,
    pub enemy_size: f32,
    pub enemy_drag: f32,
    pub player_health: f32,
    pub player_size: f32,
    pub player_drag: f32,

    // Projectiles
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_lifetime: f32,
    pub projectile_drag: f32,
    pub projectile_restitution: f32,
    pub projectile_knockback: f32,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20.0,
            physics_substeps: 10,
            separation_radius: 32.0,
            separation_strength: 20.0,
            chunk_size: 20,
            tile_size: 32.0,
            world_seed: 0x5EED_CAFE,
            bsp_depth: 4,
            bsp_min_room_size: 4,
            bsp_split_min: 0.2,
            bsp_split_max: 0.6,
            raycast_epsilon: 2.0,
            astar_expansion_multiplier: 4,
            max_chunk_hops: 16,
            pursuit_distance: 100,
            replan_distance: 50,
            replan_remaining_steps: 30,
            arrival_epsilon: 0.5,
            steering_force: 2000.0,
            kill_on_path_failure: true,
            enemies_per_chunk: 3,
            enemy_health: 30.0,
            enemy_size: 10.0,
            enemy_drag: 0.5,
            player_health: 100.0,
            player_size: 16.0,
            player_drag: 0.5,
            projectile_speed: 600.0,
            projectile_damage: 10.0,
            projectile_lifetime: 5.0,
            projectile_drag: 1.0,
            projectile_restitution: 0.0,
            projectile_knockback: 0.05,
        }
    }
}

impl InitialConfig {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn from_ron(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = ron::from_str::<InitialConfig>(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the grid, the generator or the fixed clock cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(format!("tick_rate must be positive, got {}", self.tick_rate));
        }
        if self.chunk_size < 3 {
            return Err(format!("chunk_size must be at least 3, got {}", self.chunk_size));
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(format!("tile_size must be positive, got {}", self.tile_size));
        }
        let (lo, hi) = (self.bsp_split_min, self.bsp_split_max);
        if !(lo > 0.0 && lo <= hi && hi < 1.0) {
            return Err(format!("bsp split range must satisfy 0 < min <= max < 1, got {}..={}", lo, hi));
        }
        if !(self.raycast_epsilon >= 0.0 && self.raycast_epsilon < self.tile_size) {
            return Err(format!(
                "raycast_epsilon must be in [0, tile_size), got {}",
                self.raycast_epsilon
            ));
        }
        Ok(())
    }

    pub fn grid_settings(&self) -> GridSettings {
        GridSettings {
            chunk_size: self.chunk_size,
            tile_size: self.tile_size,
        }
    }

    pub fn path_limits(&self) -> PathLimits {
        PathLimits {
            expansion_multiplier: self.astar_expansion_multiplier,
            max_chunk_hops: self.max_chunk_hops,
        }
    }

    pub fn follower_tuning(&self) -> FollowerTuning {
        FollowerTuning {
            pursuit_distance: self.pursuit_distance,
            replan_distance: self.replan_distance,
            replan_remaining_steps: self.replan_remaining_steps,
            arrival_epsilon: self.arrival_epsilon,
        }
    }

    pub fn bsp_generator(&self) -> BspGenerator {
        BspGenerator {
            seed: self.world_seed,
            depth: self.bsp_depth,
            min_room_size: self.bsp_min_room_size,
            split_range: (self.bsp_split_min, self.bsp_split_max),
        }
    }
}

/// Runtime configuration that can be hot-reloaded while the game runs.
/// Nothing in here affects the outcome of a search or a physics step.
#[derive(Deserialize, Serialize, Asset, TypePath, Clone, Debug)]
pub struct GameConfig {
    pub chunk_stream_radius: i32,
    pub path_requests_per_tick: usize,
    pub debug_pathfinding: bool,
    pub debug_ai: bool,
    pub debug_collision: bool,
}

/// The live copy of the hot-reloadable settings that systems read.
///
/// Kept as its own resource so systems do not have to wait on the asset server.
#[derive(Resource, Clone, Debug)]
pub struct RuntimeSettings {
    pub chunk_stream_radius: i32,
    pub path_requests_per_tick: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            chunk_stream_radius: 1,
            path_requests_per_tick: 8,
        }
    }
}

#[derive(Resource)]
pub struct GameConfigHandle(pub Handle<GameConfig>);

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        // Inserted at build time so resources built with `FromWorld` see it.
        if !app.world().contains_resource::<InitialConfig>() {
            app.insert_resource(load_initial_config(INITIAL_CONFIG_PATH));
        }
        let tick_rate = app.world().resource::<InitialConfig>().tick_rate;

        app.insert_resource(Time::<Fixed>::from_hz(tick_rate))
           .init_resource::<RuntimeSettings>()
           .init_resource::<DebugContext>()
           .add_plugins(RonAssetPlugin::<GameConfig>::new(&["game_config.ron"]))
           .add_systems(Startup, setup_runtime_config)
           .add_systems(Update, apply_runtime_config);
    }
}

/// Read the static configuration synchronously, falling back to defaults.
pub fn load_initial_config(path: &str) -> InitialConfig {
    match InitialConfig::load(path) {
        Ok(config) => {
            info!("Loaded initial config from {}", path);
            config
        }
        Err(e) => {
            error!("Failed to load initial config from {}: {}", path, e);
            error!("Using default InitialConfig");
            InitialConfig::default()
        }
    }
}

fn setup_runtime_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("game_config.ron");
    commands.insert_resource(GameConfigHandle(handle));
}

fn apply_runtime_config(
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    mut events: MessageReader<AssetEvent<GameConfig>>,
    mut settings: ResMut<RuntimeSettings>,
    mut debug: ResMut<DebugContext>,
) {
    let Some(config_handle) = config_handle else { return };

    for event in events.read() {
        if !(event.is_modified(config_handle.0.id()) || event.is_loaded_with_dependencies(config_handle.0.id())) {
            continue;
        }
        let Some(config) = game_configs.get(&config_handle.0) else { continue };

        settings.chunk_stream_radius = config.chunk_stream_radius;
        settings.path_requests_per_tick = config.path_requests_per_tick;
        debug.set(DebugCategory::Pathfinding, config.debug_pathfinding);
        debug.set(DebugCategory::Ai, config.debug_ai);
        debug.set(DebugCategory::Collision, config.debug_collision);
        info!("Applied runtime config: {:?}", config);
    }
}
