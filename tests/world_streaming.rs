use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use warren::game::config::{InitialConfig, RuntimeSettings};
use warren::game::pathfinding::{find_path, PathLimits};
use warren::game::simulation::{player_bundle, Behavior, Explosion, SimulationPlugin};
use warren::game::world::{Direction, GridSettings, PerimeterGenerator, Tile, TileMap, WorldPlugin};

fn tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

#[test]
fn test_chunks_around_the_player_stream_in_glued_and_populated() {
    let config = InitialConfig::default();
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(Time::<Fixed>::from_hz(config.tick_rate));
    app.insert_resource(config.clone());
    app.insert_resource(RuntimeSettings { chunk_stream_radius: 1, path_requests_per_tick: 8 });
    app.add_plugins((WorldPlugin, SimulationPlugin));

    let settings = config.grid_settings();
    app.world_mut().spawn(player_bundle(&config, settings.tile_center(IVec2::new(10, 10))));

    // Generation runs on the async compute pool; keep ticking until it lands.
    let ready = |app: &App| app.world().resource::<TileMap>().chunks().filter(|c| c.is_ready()).count();
    for _ in 0..2000 {
        tick(&mut app);
        if ready(&app) == 9 {
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    // Population happens on the tick after the last chunk lands.
    tick(&mut app);

    let map = app.world().resource::<TileMap>();
    assert_eq!(map.chunk_count(), 9);
    assert_eq!(ready(&app), 9);

    for y in -1..=1 {
        for x in -1..=1 {
            let coord = IVec2::new(x, y);
            let chunk = map.chunk(coord).unwrap();
            assert!(chunk.populated, "chunk {coord} populated");
            if x < 1 {
                let exit = chunk.exit(Direction::East).expect("east seam glued");
                assert_eq!(map.get_tile(exit), Tile::Door);
                assert!(map.chunk(coord + IVec2::X).unwrap().exit(Direction::West).is_some());
            }
            if y < 1 {
                assert!(chunk.exit(Direction::North).is_some(), "north seam of {coord} glued");
            }
        }
    }

    let world = app.world_mut();
    let mut behaviors = world.query::<&Behavior>();
    let enemies = behaviors.iter(world).filter(|b| **b == Behavior::Enemy).count();
    assert_eq!(enemies, 9 * config.enemies_per_chunk);
}

#[test]
fn test_explosion_opens_a_path_through_a_wall() {
    let settings = GridSettings::default();
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(Time::<Fixed>::from_hz(20.0));

    let mut map = TileMap::new(settings, Arc::new(PerimeterGenerator));
    map.ensure_chunk_ready(IVec2::ZERO);
    for y in 1..19 {
        map.set_tile(IVec2::new(10, y), Tile::Wall);
    }
    app.insert_resource(map);
    app.add_plugins(SimulationPlugin);

    let limits = PathLimits::default();
    let search = |map: &TileMap| {
        find_path(map, &map.probe_tile(IVec2::new(5, 10)), &map.probe_tile(IVec2::new(15, 10)), &limits, None)
    };
    assert!(search(app.world().resource::<TileMap>()).is_none());

    app.world_mut().resource_mut::<Messages<Explosion>>().write(Explosion {
        center: settings.tile_center(IVec2::new(10, 10)),
        radius: 20.0,
        damage: 10.0,
    });
    tick(&mut app);

    let map = app.world().resource::<TileMap>();
    assert_eq!(map.get_tile(IVec2::new(10, 10)), Tile::DamagedWall);
    assert_eq!(map.get_tile(IVec2::new(10, 9)), Tile::Wall);

    let path = search(map).expect("breach is walkable");
    assert!(path.tiles().contains(&IVec2::new(10, 10)));
}
