use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game::config::InitialConfig;

/// Number of fixed ticks since startup. Incremented first thing every tick.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

/// Random source for gameplay spawning, seeded from the world seed so a run
/// is reproducible.
#[derive(Resource)]
pub struct SpawnRng(pub StdRng);

impl FromWorld for SpawnRng {
    fn from_world(world: &mut World) -> Self {
        let seed = world
            .get_resource::<InitialConfig>()
            .map_or(InitialConfig::default().world_seed, |c| c.world_seed);
        Self(StdRng::seed_from_u64(seed ^ 0x5A5A_0000_0000_5A5A))
    }
}
