use std::collections::{HashSet, VecDeque};

use dungeon_sentinel_core::{ColliderKind, TileKind, TilePos, WorldRect};
use dungeon_sentinel_system_generation::{GeneratorConfig, LevelGenerator};
use dungeon_sentinel_world::{query, Level, TileGrid};

const SEEDS: std::ops::Range<u64> = 0..24;

fn generate(config: GeneratorConfig, seed: u64) -> Level {
    LevelGenerator::new(config)
        .expect("configuration is valid")
        .generate_seeded(seed)
        .expect("generation succeeds")
}

fn reachable(grid: &TileGrid, start: TilePos, walkable: impl Fn(TileKind) -> bool) -> usize {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    if walkable(grid.kind(start)) {
        let _ = seen.insert(start);
        queue.push_back(start);
    }

    while let Some(tile) = queue.pop_front() {
        for (columns, rows) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let Some(next) = tile.offset(columns, rows) else {
                continue;
            };
            if grid.get(next).is_some_and(&walkable) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    seen.len()
}

#[test]
fn rooms_never_overlap() {
    for seed in SEEDS {
        let level = generate(GeneratorConfig::default(), seed);
        let rooms = query::rooms(&level);
        for (index, room) in rooms.iter().enumerate() {
            for other in &rooms[index + 1..] {
                assert!(!room.overlaps(other), "seed {seed}: {room:?} overlaps {other:?}");
            }
        }
    }
}

#[test]
fn every_carved_tile_is_enclosed() {
    for seed in SEEDS {
        let level = generate(GeneratorConfig::default(), seed);
        let grid = query::grid(&level);

        for (tile, kind) in grid.iter() {
            if !kind.is_carved() {
                continue;
            }
            for columns in -1..=1 {
                for rows in -1..=1 {
                    let neighbor = tile
                        .offset(columns, rows)
                        .expect("carved tiles keep a one tile margin");
                    assert_ne!(
                        grid.get(neighbor),
                        Some(TileKind::Empty),
                        "seed {seed}: {tile:?} touches empty {neighbor:?}"
                    );
                    assert!(grid.contains(neighbor));
                }
            }
        }
    }
}

#[test]
fn carved_tiles_form_one_connected_region() {
    for seed in SEEDS {
        let level = generate(GeneratorConfig::default(), seed);
        let grid = query::grid(&level);
        let spawn = query::rooms(&level)[0].center();

        let carved = grid.iter().filter(|(_, kind)| kind.is_carved()).count();
        assert_eq!(
            reachable(grid, spawn, TileKind::is_carved),
            carved,
            "seed {seed}"
        );
    }
}

#[test]
fn floor_is_connected_without_sentinels() {
    let config = GeneratorConfig {
        enemy_probability: 0.0,
        ..GeneratorConfig::default()
    };

    for seed in SEEDS {
        let level = generate(config, seed);
        let grid = query::grid(&level);
        let spawn = query::rooms(&level)[0].center();

        assert_eq!(grid.count(TileKind::EnemySpawn), 0);
        assert_eq!(
            reachable(grid, spawn, |kind| kind == TileKind::Floor),
            grid.count(TileKind::Floor),
            "seed {seed}"
        );
    }
}

#[test]
fn sentinels_never_cut_rooms_off_from_the_goal() {
    for seed in 0..100 {
        let level = generate(GeneratorConfig::default(), seed);
        let grid = query::grid(&level);
        let rooms = query::rooms(&level);
        let goal = rooms[rooms.len() - 1].center();

        let floor = |kind| kind == TileKind::Floor;
        assert_eq!(
            reachable(grid, goal, floor),
            grid.count(TileKind::Floor),
            "seed {seed}: floor split by sentinels"
        );
        for (index, room) in rooms.iter().enumerate() {
            assert!(
                room.tiles().any(|tile| grid.kind(tile) == TileKind::Floor),
                "seed {seed}: room {index} has no floor left"
            );
        }
    }
}

#[test]
fn spawn_and_goal_lie_strictly_inside_distinct_rooms() {
    for seed in SEEDS {
        let level = generate(GeneratorConfig::default(), seed);
        let rooms = query::rooms(&level);
        let tile_size = query::tile_size(&level);
        let spawn = query::spawn_point(&level);
        let goal = query::goal_point(&level);

        let containing = |point: dungeon_sentinel_core::Vector2| {
            rooms
                .iter()
                .position(|room| {
                    let origin = room.origin().world_origin(tile_size);
                    let size = room.size();
                    let bounds = WorldRect::new(
                        origin.x(),
                        origin.y(),
                        size.width() as f32 * tile_size,
                        size.height() as f32 * tile_size,
                    );
                    point.x() > bounds.x()
                        && point.x() < bounds.x() + bounds.width()
                        && point.y() > bounds.y()
                        && point.y() < bounds.y() + bounds.height()
                })
                .expect("point lies inside a room")
        };

        let spawn_room = containing(spawn);
        let goal_room = containing(goal);
        assert_eq!(spawn_room, 0, "seed {seed}");
        assert_eq!(goal_room, rooms.len() - 1, "seed {seed}");
        assert_ne!(spawn_room, goal_room);
    }
}

#[test]
fn sentinels_avoid_spawn_room_and_goal_tile() {
    let config = GeneratorConfig {
        enemy_probability: 0.5,
        ..GeneratorConfig::default()
    };

    for seed in SEEDS {
        let level = generate(config, seed);
        let rooms = query::rooms(&level);
        let goal_tile = rooms[rooms.len() - 1].center();
        let enemies = query::enemy_colliders(&level);
        let view = query::sentinel_view(&level);

        assert_eq!(enemies.len(), view.len());
        assert_eq!(query::tile(&level, goal_tile), Some(TileKind::Floor));
        for collider in enemies {
            assert_eq!(collider.kind(), ColliderKind::EnemySpawn);
            assert!(!rooms[0].contains(collider.tile()), "seed {seed}");
            assert_eq!(
                query::tile(&level, collider.tile()),
                Some(TileKind::EnemySpawn)
            );
        }
        for sentinel in view.iter() {
            assert_eq!(sentinel.health.get(), config.sentinel_health);
            assert!(sentinel.threshold.as_millis() >= 900);
            assert!(sentinel.threshold.as_millis() <= 1_500);
        }
    }
}

#[test]
fn wall_colliders_match_wall_tiles() {
    for seed in SEEDS {
        let level = generate(GeneratorConfig::default(), seed);
        let grid = query::grid(&level);
        let walls = query::wall_colliders(&level);

        assert_eq!(walls.len(), grid.count(TileKind::Wall), "seed {seed}");
        let unique: HashSet<_> = walls.iter().map(|collider| collider.tile()).collect();
        assert_eq!(unique.len(), walls.len());
        assert!(walls
            .iter()
            .all(|collider| grid.kind(collider.tile()) == TileKind::Wall));
    }
}

#[test]
fn same_seed_reproduces_the_same_level() {
    for seed in [0, 7, 42] {
        let first = generate(GeneratorConfig::default(), seed);
        let second = generate(GeneratorConfig::default(), seed);

        assert_eq!(query::grid_dump(&first), query::grid_dump(&second));
        assert_eq!(query::rooms(&first), query::rooms(&second));
        assert_eq!(query::colliders(&first), query::colliders(&second));
        assert_eq!(query::sentinel_view(&first), query::sentinel_view(&second));
    }

    let a = generate(GeneratorConfig::default(), 1);
    let b = generate(GeneratorConfig::default(), 2);
    assert_ne!(query::grid_dump(&a), query::grid_dump(&b));
}

#[test]
fn seeded_dump_matches_the_recorded_layout() {
    let config = GeneratorConfig {
        columns: 40,
        rows: 30,
        min_rooms: 2,
        max_rooms: 4,
        ..GeneratorConfig::default()
    };
    let level = generate(config, 7);

    assert_eq!(
        query::grid_dump(&level),
        include_str!("fixtures/seed_7_40x30.txt")
    );
    assert_eq!(query::rooms(&level).len(), 2);
    assert_eq!(query::sentinel_view(&level).len(), 5);
}

#[test]
fn dump_has_one_line_per_row() {
    let config = GeneratorConfig {
        columns: 40,
        rows: 30,
        min_rooms: 2,
        max_rooms: 4,
        ..GeneratorConfig::default()
    };
    let level = generate(config, 3);
    let dump = query::grid_dump(&level);

    assert!(dump.ends_with('\n'));
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), 30);
    assert!(lines.iter().all(|line| line.chars().count() == 40));
    assert!(dump
        .chars()
        .all(|glyph| matches!(glyph, '.' | ' ' | '2' | '3' | '\n')));
}
