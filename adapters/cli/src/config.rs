//! Generator configuration assembled from an optional TOML file and flags.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use dungeon_sentinel_system_generation::GeneratorConfig;

/// Flags shared by every subcommand that generates a level.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct GenerationArgs {
    /// TOML file with generator settings; missing keys keep their defaults.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// Seed for level generation.
    #[arg(long, default_value_t = 0)]
    pub(crate) seed: u64,

    /// Grid width in tiles.
    #[arg(long)]
    pub(crate) columns: Option<u32>,

    /// Grid height in tiles.
    #[arg(long)]
    pub(crate) rows: Option<u32>,

    /// Smallest number of rooms.
    #[arg(long)]
    pub(crate) min_rooms: Option<u32>,

    /// Largest number of rooms.
    #[arg(long)]
    pub(crate) max_rooms: Option<u32>,

    /// Smallest room edge in tiles.
    #[arg(long)]
    pub(crate) min_room_size: Option<u32>,

    /// Largest room edge in tiles.
    #[arg(long)]
    pub(crate) max_room_size: Option<u32>,

    /// Chance that a room floor tile becomes a sentinel.
    #[arg(long)]
    pub(crate) enemy_probability: Option<f64>,
}

impl GenerationArgs {
    /// Loads the configuration file, if any, and applies flag overrides on top.
    pub(crate) fn resolve(&self) -> Result<GeneratorConfig> {
        let base = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                parse_config(&text)
                    .with_context(|| format!("failed to parse {}", path.display()))?
            }
            None => GeneratorConfig::default(),
        };

        Ok(self.overlay(base))
    }

    fn overlay(&self, mut config: GeneratorConfig) -> GeneratorConfig {
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(min_rooms) = self.min_rooms {
            config.min_rooms = min_rooms;
        }
        if let Some(max_rooms) = self.max_rooms {
            config.max_rooms = max_rooms;
        }
        if let Some(min_room_size) = self.min_room_size {
            config.min_room_size = min_room_size;
        }
        if let Some(max_room_size) = self.max_room_size {
            config.max_room_size = max_room_size;
        }
        if let Some(probability) = self.enemy_probability {
            config.enemy_probability = probability;
        }
        config
    }
}

fn parse_config(text: &str) -> Result<GeneratorConfig> {
    Ok(toml::from_str(text)?)
}
