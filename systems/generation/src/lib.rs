#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural level generation.
//!
//! Generation runs as a fixed pipeline over a fresh [`TileGrid`]: rooms are
//! placed and carved, consecutive rooms are joined by L-shaped corridors,
//! sentinels are scattered over room floors, and finally every carved tile is
//! enclosed by walls. The result is frozen into a [`Level`].
//!
//! All randomness is drawn from the caller's RNG, so a seeded generator always
//! reproduces the same level.

pub mod corridors;
pub mod enemies;
pub mod rooms;
pub mod walls;

use dungeon_sentinel_core::{SentinelTuning, TileKind};
use dungeon_sentinel_world::{Level, LevelLayout, TileGrid};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use corridors::{Corridor, CorridorCarver};
pub use enemies::{EnemyPlacement, EnemyPlacer};
pub use rooms::RoomPlacer;
pub use walls::WallInferencer;

/// Tunable parameters of a generation run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Grid width in tiles.
    pub columns: u32,
    /// Grid height in tiles.
    pub rows: u32,
    /// Edge length of one tile in world units.
    pub tile_size: f32,
    /// Smallest number of rooms drawn.
    pub min_rooms: u32,
    /// Largest number of rooms drawn.
    pub max_rooms: u32,
    /// Smallest room edge in tiles.
    pub min_room_size: u32,
    /// Largest room edge in tiles.
    pub max_room_size: u32,
    /// Chance that an eligible floor tile becomes a sentinel.
    pub enemy_probability: f64,
    /// Relocations allowed per room before placement gives up.
    pub max_placement_attempts: u32,
    /// Starting health of every sentinel.
    pub sentinel_health: u32,
    /// Timing and sight parameters shared by all sentinels.
    pub sentinel: SentinelTuning,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 80,
            tile_size: 48.0,
            min_rooms: 6,
            max_rooms: 12,
            min_room_size: 4,
            max_room_size: 10,
            enemy_probability: 1.0 / 12.0,
            max_placement_attempts: 2_000,
            sentinel_health: 3,
            sentinel: SentinelTuning::default(),
        }
    }
}

impl GeneratorConfig {
    /// Checks every parameter before any randomness is drawn.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_positive_finite(self.tile_size) {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        if self.min_rooms > self.max_rooms {
            return Err(ConfigError::InvertedRoomCount {
                min: self.min_rooms,
                max: self.max_rooms,
            });
        }
        if self.min_rooms < 2 {
            return Err(ConfigError::TooFewRooms(self.min_rooms));
        }
        if self.min_room_size == 0 {
            return Err(ConfigError::ZeroRoomSize);
        }
        if self.min_room_size > self.max_room_size {
            return Err(ConfigError::InvertedRoomSize {
                min: self.min_room_size,
                max: self.max_room_size,
            });
        }
        let needed = self.max_room_size.saturating_add(2);
        if needed > self.columns || needed > self.rows {
            return Err(ConfigError::RoomTooLarge {
                size: self.max_room_size,
                columns: self.columns,
                rows: self.rows,
            });
        }
        if !(0.0..=1.0).contains(&self.enemy_probability) {
            return Err(ConfigError::InvalidEnemyProbability(self.enemy_probability));
        }
        if self.max_placement_attempts == 0 {
            return Err(ConfigError::ZeroPlacementAttempts);
        }
        if self.sentinel_health == 0 {
            return Err(ConfigError::ZeroSentinelHealth);
        }
        let tuning = &self.sentinel;
        if tuning.threshold_min_ms > tuning.threshold_max_ms {
            return Err(ConfigError::InvertedThreshold {
                min: tuning.threshold_min_ms,
                max: tuning.threshold_max_ms,
            });
        }
        if !is_positive_finite(tuning.range_tiles) {
            return Err(ConfigError::InvalidSightRange(tuning.range_tiles));
        }
        if !is_positive_finite(tuning.probe_step) {
            return Err(ConfigError::InvalidProbeStep(tuning.probe_step));
        }
        if !is_positive_finite(tuning.projectile_speed) {
            return Err(ConfigError::InvalidProjectileSpeed(tuning.projectile_speed));
        }

        let side = u64::from(self.min_room_size);
        let required = u64::from(self.min_rooms) * side * side;
        let available = u64::from(self.columns - 2) * u64::from(self.rows - 2);
        if required > available {
            return Err(ConfigError::InsufficientArea {
                required,
                available,
            });
        }

        Ok(())
    }
}

fn is_positive_finite(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// A [`GeneratorConfig`] that can never produce a level.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Tile size is zero, negative or not finite.
    #[error("tile size must be a positive finite number, got {0}")]
    InvalidTileSize(f32),
    /// Room count range has its bounds swapped.
    #[error("minimum room count {min} exceeds maximum {max}")]
    InvertedRoomCount {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },
    /// Spawn and goal need two distinct rooms.
    #[error("at least 2 rooms are required, got a minimum of {0}")]
    TooFewRooms(u32),
    /// Rooms must cover at least one tile.
    #[error("room size must be at least 1")]
    ZeroRoomSize,
    /// Room size range has its bounds swapped.
    #[error("minimum room size {min} exceeds maximum {max}")]
    InvertedRoomSize {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },
    /// The largest room plus its wall margins does not fit the grid.
    #[error("rooms of size {size} do not fit a {columns}x{rows} grid with margins")]
    RoomTooLarge {
        /// Configured maximum room size.
        size: u32,
        /// Grid width.
        columns: u32,
        /// Grid height.
        rows: u32,
    },
    /// Probability lies outside `[0, 1]`.
    #[error("enemy probability must lie in [0, 1], got {0}")]
    InvalidEnemyProbability(f64),
    /// Placement would fail before trying.
    #[error("placement attempts must be at least 1")]
    ZeroPlacementAttempts,
    /// Sentinels would start out already defeated.
    #[error("sentinel health must be at least 1")]
    ZeroSentinelHealth,
    /// Countdown threshold range has its bounds swapped.
    #[error("minimum sentinel threshold {min} ms exceeds maximum {max} ms")]
    InvertedThreshold {
        /// Configured minimum in milliseconds.
        min: u64,
        /// Configured maximum in milliseconds.
        max: u64,
    },
    /// Sight range is zero, negative or not finite.
    #[error("sentinel sight range must be a positive finite number of tiles, got {0}")]
    InvalidSightRange(f32),
    /// The ray march could never advance.
    #[error("sentinel probe step must be a positive finite number, got {0}")]
    InvalidProbeStep(f32),
    /// Projectiles would never leave their sentinel.
    #[error("projectile speed must be a positive finite number, got {0}")]
    InvalidProjectileSpeed(f32),
    /// Even the smallest rooms cannot fit the grid interior.
    #[error("minimum room area {required} exceeds the grid interior of {available} tiles")]
    InsufficientArea {
        /// Tiles covered by the minimum number of minimum-sized rooms.
        required: u64,
        /// Tiles inside the one tile border.
        available: u64,
    },
}

/// Failure of a generation run. No partial level is ever returned.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GenerationError {
    /// The configuration was rejected up front.
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// A room could not be moved clear of the others.
    #[error("room {room} still overlaps after {attempts} relocation attempts")]
    PlacementExhausted {
        /// Index of the room that could not be placed.
        room: usize,
        /// Relocations tried for that room.
        attempts: u32,
    },
}

/// Runs the full generation pipeline for a validated configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelGenerator {
    config: GeneratorConfig,
}

impl LevelGenerator {
    /// Validates `config` and wraps it in a generator.
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration the generator was built with.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates a level with a [`ChaCha8Rng`] seeded from `seed`.
    pub fn generate_seeded(&self, seed: u64) -> Result<Level, GenerationError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate(&mut rng)
    }

    /// Generates a complete level, drawing all randomness from `rng`.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Level, GenerationError> {
        let config = &self.config;
        let mut grid = TileGrid::new(config.columns, config.rows);

        let count = rng.gen_range(config.min_rooms..=config.max_rooms);
        let rooms = RoomPlacer::from_config(config).place(count, rng)?;
        RoomPlacer::carve(&rooms, &mut grid);
        debug!(rooms = rooms.len(), "placed rooms");

        let corridors = CorridorCarver::carve(&rooms, &mut grid);
        debug!(corridors = corridors.len(), "carved corridors");

        let [spawn_room, .., goal_room] = rooms.as_slice() else {
            return Err(ConfigError::TooFewRooms(count).into());
        };
        let spawn_tile = spawn_room.center();
        let goal_tile = goal_room.center();

        let enemies = EnemyPlacer::from_config(config).place(&rooms, 0, goal_tile, &mut grid, rng);
        debug!(sentinels = enemies.sentinels.len(), "placed sentinels");

        let wall_colliders = WallInferencer::new(config.tile_size).infer(&mut grid);
        debug!(walls = wall_colliders.len(), "inferred walls");

        info!(
            columns = config.columns,
            rows = config.rows,
            rooms = rooms.len(),
            sentinels = enemies.sentinels.len(),
            walls = wall_colliders.len(),
            floor = grid.count(TileKind::Floor),
            "generated level"
        );

        Ok(Level::from_layout(LevelLayout {
            grid,
            tile_size: config.tile_size,
            spawn_point: spawn_tile.world_center(config.tile_size),
            goal_point: goal_tile.world_center(config.tile_size),
            rooms,
            wall_colliders,
            enemy_colliders: enemies.colliders,
            sentinels: enemies.sentinels,
            tuning: config.sentinel,
        }))
    }
}
