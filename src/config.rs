/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Missing files or keys fall back to defaults; a malformed file is logged
/// and ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

// ── Public Config Structs ──

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub combat: CombatConfig,
    pub gamepad: GamepadConfig,
    pub general: GeneralConfig,
}

/// Tick-loop and player tuning.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Upper bound on a single tick's delta-time, seconds.
    pub max_dt: f64,
    pub rng_seed: u32,
    pub transition_duration: f64,
    pub player_speed: f64,
    pub player_max_hp: i32,
}

/// Combat timings and sizes. Times in seconds, lengths in pixels.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub knockback_dist: f64,
    pub knockback_time: f64,
    pub enemy_inv_time: f64,
    pub player_inv_time: f64,
    pub sword_duration: f64,
    pub sword_reach: f64,
    pub sword_width: f64,
    pub projectile_speed: f64,
    pub shake_duration: f64,
    pub flash_duration: f64,
    pub interact_radius: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GamepadConfig {
    pub attack: Vec<String>,
    pub item: Vec<String>,
    pub interact: Vec<String>,
    pub pause: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub tick_rate_ms: u64,
    pub save_file: String,
    pub log_file: String,
    /// World file to load instead of the built-in world. Empty: built-in.
    pub world_file: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── TOML Schema ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    sim: SimConfig,
    #[serde(default)]
    combat: CombatConfig,
    #[serde(default)]
    gamepad: GamepadConfig,
    #[serde(default)]
    general: GeneralConfig,
}

// ── Defaults ──

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            max_dt: 0.05,
            rng_seed: 42,
            transition_duration: 0.5,
            player_speed: 80.0,
            player_max_hp: 6,
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        CombatConfig {
            knockback_dist: 24.0,
            knockback_time: 0.15,
            enemy_inv_time: 0.5,
            player_inv_time: 1.0,
            sword_duration: 0.25,
            sword_reach: 14.0,
            sword_width: 8.0,
            projectile_speed: 100.0,
            shake_duration: 0.2,
            flash_duration: 0.15,
            interact_radius: 20.0,
        }
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            attack: names(&["A", "R1"]),
            item: names(&["B", "L1"]),
            interact: names(&["X", "Y"]),
            pause: names(&["Start"]),
            quit: names(&["Select"]),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            tick_rate_ms: 16,
            save_file: "tilequest_save.toml".into(),
            log_file: "tilequest.log".into(),
            world_file: String::new(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/tilequest`.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(cfg) => {
                    info!(path = %path.display(), "loaded configuration");
                    return cfg;
                }
                Err(e) => {
                    warn!("{e}; using default settings");
                    return GameConfig::default();
                }
            }
        }
        GameConfig::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let t: TomlConfig = toml::from_str(text)?;
        let mut sim = t.sim;
        // A zero or negative cap would freeze the simulation.
        if sim.max_dt <= 0.0 {
            warn!(max_dt = sim.max_dt, "non-positive max_dt, using default");
            sim.max_dt = SimConfig::default().max_dt;
        }
        Ok(GameConfig { sim, combat: t.combat, gamepad: t.gamepad, general: t.general })
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(home).join(".local/share/tilequest");
        if xdg.is_dir() && !dirs.contains(&xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.sim.rng_seed, 42);
        assert_eq!(cfg.sim.max_dt, 0.05);
        assert_eq!(cfg.combat.knockback_dist, 24.0);
        assert_eq!(cfg.general.tick_rate_ms, 16);
        assert!(cfg.general.world_file.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[combat]\nsword_reach = 20.0\n\n[sim]\nrng_seed = 7\n",
        )
        .unwrap();
        assert_eq!(cfg.combat.sword_reach, 20.0);
        assert_eq!(cfg.combat.sword_width, 8.0);
        assert_eq!(cfg.sim.rng_seed, 7);
        assert_eq!(cfg.sim.transition_duration, 0.5);
    }

    #[test]
    fn bad_max_dt_falls_back() {
        let cfg = GameConfig::from_toml_str("[sim]\nmax_dt = 0.0\n").unwrap();
        assert_eq!(cfg.sim.max_dt, 0.05);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = GameConfig::from_toml_str("[sim\nrng_seed = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn gamepad_lists_override() {
        let cfg = GameConfig::from_toml_str("[gamepad]\nattack = [\"X\"]\n").unwrap();
        assert_eq!(cfg.gamepad.attack, vec!["X".to_string()]);
        assert_eq!(cfg.gamepad.pause, vec!["Start".to_string()]);
    }
}
