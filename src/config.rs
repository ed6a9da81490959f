//! External configuration loader.
//!
//! Reads `config.toml` from the executable's directory or the working
//! directory. Missing files or keys fall back to the built-in defaults.

use bevy::prelude::*;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Resource, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub movement: MovementConfig,
    pub tiles: TileConfig,
    pub interaction: InteractionConfig,
    pub audio: AudioConfig,
    pub assets_dir: PathBuf,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}

/// Speeds are in pixels per second.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MovementConfig {
    pub player_speed: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub start_x: f32,
    pub start_y: f32,
    /// Distance from the left/right screen edge that triggers a map change.
    pub border_padding: f32,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TileConfig {
    pub size: f32,
    pub scaling: f32,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    /// Reach of the interact key, in scaled tiles.
    pub collect_tiles: f32,
    /// Distance at which pursuers notice the player, in scaled tiles.
    pub chase_tiles: f32,
    pub chase_speed: f32,
    pub wander_speed: f32,
    pub wander_leash_tiles: f32,
    pub vehicle_speed_factor: f32,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    pub volume: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            movement: MovementConfig::default(),
            tiles: TileConfig::default(),
            interaction: InteractionConfig::default(),
            audio: AudioConfig::default(),
            assets_dir: PathBuf::from("assets"),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1040.0,
            height: 800.0,
            title: "Lost in Time, Found in Friendship".into(),
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            player_speed: 300.0,
            player_width: 28.0,
            player_height: 40.0,
            start_x: 100.0,
            start_y: 100.0,
            border_padding: 10.0,
        }
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            size: 16.0,
            scaling: 2.0,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            collect_tiles: 2.0,
            chase_tiles: 5.0,
            chase_speed: 120.0,
            wander_speed: 180.0,
            wander_leash_tiles: 10.0,
            vehicle_speed_factor: 5.0,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.5,
        }
    }
}

impl GameConfig {
    /// Load `config.toml`, searching the executable directory first and the
    /// working directory second.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => return Self::from_toml(&text),
                Err(e) => eprintln!("Warning: could not read {}: {e}", path.display()),
            }
        }
        Self::default()
    }

    pub fn from_toml(text: &str) -> Self {
        match toml::from_str::<GameConfig>(text) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Warning: config.toml parse error: {e}");
                eprintln!("Using default settings.");
                Self::default()
            }
        }
    }

    /// Side of one map tile on screen.
    pub fn scaled_tile(&self) -> f32 {
        self.tiles.size * self.tiles.scaling
    }

    pub fn collect_radius(&self) -> f32 {
        self.scaled_tile() * self.interaction.collect_tiles
    }

    pub fn chase_radius(&self) -> f32 {
        self.scaled_tile() * self.interaction.chase_tiles
    }

    pub fn screen(&self) -> Vec2 {
        Vec2::new(self.window.width, self.window.height)
    }

    pub fn player_start(&self) -> Vec2 {
        Vec2::new(self.movement.start_x, self.movement.start_y)
    }

    pub fn player_half_size(&self) -> Vec2 {
        Vec2::new(self.movement.player_width, self.movement.player_height) * 0.5
    }
}

fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }
    dirs
}
