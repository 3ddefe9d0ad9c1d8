/// Simulation layer - fixed-rate entity logic.
///
/// This module is organized into:
/// - **components**: entity records (position, velocity, collider, health, behavior)
/// - **resources**: tick counter and the spawn RNG
/// - **events**: explosions and kill notifications
/// - **physics**: separation, drag, substepped tile collision, projectiles
/// - **spawning**: entity bundles and chunk population
/// - **systems**: tick bookkeeping, explosions, death

use bevy::prelude::*;

use crate::game::config::InitialConfig;
use crate::game::debug::DebugContext;
use crate::game::world::{ChunkReady, TileMap, WorldSystems};

pub mod components;
pub mod resources;
pub mod events;
pub mod physics;
pub mod spawning;
pub mod systems;


pub use components::*;
pub use resources::*;
pub use events::*;
pub use spawning::{dummy_bundle, enemy_bundle, player_bundle, projectile_bundle, safe_spot};

// System sets for organizing execution order
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum SimSet {
    Input,      // World streaming, path requests and results, spawning
    Steering,   // Path followers turn waypoints into acceleration
    Physics,    // Entity-entity separation
    Integration // Drag and movement against the tile grid, projectiles
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InitialConfig>();
        app.init_resource::<DebugContext>();
        app.init_resource::<TileMap>();
        app.init_resource::<SimTick>();
        app.init_resource::<SpawnRng>();

        app.add_message::<Explosion>();
        app.add_message::<EntityKilled>();
        app.add_message::<FireProjectile>();
        app.add_message::<ChunkReady>();

        app.configure_sets(FixedUpdate, (
            SimSet::Input,
            SimSet::Steering,
            SimSet::Physics,
            SimSet::Integration,
        ).chain());

        app.add_systems(FixedUpdate, (
            // Increment tick counter first (before all other systems)
            systems::increment_sim_tick.before(SimSet::Input),

            // Input
            spawning::populate_ready_chunks.in_set(SimSet::Input).after(WorldSystems),
            systems::apply_explosions.in_set(SimSet::Input).after(WorldSystems),
            spawning::fire_projectiles.in_set(SimSet::Input),

            // Physics
            physics::separate_entities.in_set(SimSet::Physics),

            // Integration
            physics::integrate_motion.in_set(SimSet::Integration),
            physics::move_projectiles.in_set(SimSet::Integration).after(physics::integrate_motion),

            // Post-simulation
            systems::reap_dead.after(SimSet::Integration),
        ));
    }
}
