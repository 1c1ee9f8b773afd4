//! Simulation tuning
//!
//! Every constant the simulation reads comes through `SimConfig`. Hosts may
//! override any subset from JSON; missing fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};

/// Tunable simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Firing ===
    /// Ticks between bullets while the trigger is held
    pub fire_cadence: u32,
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    /// Bullets above this y are retired
    pub bullet_exit_y: f32,

    // === Page targets ===
    /// Ticks between destructible element re-scans
    pub scan_interval: u32,

    // === Glyph pool ===
    pub narrow_viewport_width: f32,
    pub narrow_pool: usize,
    pub wide_pool: usize,
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    pub link_distance: f32,

    // === Debris ===
    pub max_debris: usize,

    /// Fixed RNG seed (host clock when absent)
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fire_cadence: FIRE_CADENCE_TICKS,
            bullet_speed: BULLET_SPEED,
            bullet_radius: BULLET_RADIUS,
            bullet_exit_y: BULLET_EXIT_Y,

            scan_interval: SCAN_INTERVAL_TICKS,

            narrow_viewport_width: NARROW_VIEWPORT_WIDTH,
            narrow_pool: NARROW_POOL_SIZE,
            wide_pool: WIDE_POOL_SIZE,
            repulsion_radius: REPULSION_RADIUS,
            repulsion_strength: REPULSION_STRENGTH,
            link_distance: LINK_DISTANCE,

            max_debris: MAX_DEBRIS,

            seed: None,
        }
    }
}

impl SimConfig {
    /// Parse and validate a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the tick loop cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.fire_cadence == 0 {
            return Err(SimError::InvalidConfig("fire_cadence must be at least 1".into()));
        }
        if self.scan_interval == 0 {
            return Err(SimError::InvalidConfig("scan_interval must be at least 1".into()));
        }
        if self.bullet_speed <= 0.0 || self.bullet_radius <= 0.0 {
            return Err(SimError::InvalidConfig(
                "bullet_speed and bullet_radius must be positive".into(),
            ));
        }
        if self.repulsion_radius <= 0.0 {
            return Err(SimError::InvalidConfig("repulsion_radius must be positive".into()));
        }
        Ok(())
    }

    /// Glyph pool size for a viewport width (fewer glyphs on narrow screens)
    pub fn pool_size_for_width(&self, width: f32) -> usize {
        if width < self.narrow_viewport_width {
            self.narrow_pool
        } else {
            self.wide_pool
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "glyph_blaster_config";

    /// Load overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config overrides from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(r#"{ "fire_cadence": 3, "seed": 7 }"#).unwrap();
        assert_eq!(config.fire_cadence, 3);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.scan_interval, SCAN_INTERVAL_TICKS);
        assert_eq!(config.wide_pool, WIDE_POOL_SIZE);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            SimConfig::from_json(r#"{ "fire_cadence": 0 }"#),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{ "bullet_speed": -1.0 }"#),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(matches!(
            SimConfig::from_json("not json"),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn test_pool_size_threshold() {
        let config = SimConfig::default();
        assert_eq!(config.pool_size_for_width(375.0), NARROW_POOL_SIZE);
        assert_eq!(config.pool_size_for_width(767.9), NARROW_POOL_SIZE);
        assert_eq!(config.pool_size_for_width(768.0), WIDE_POOL_SIZE);
        assert_eq!(config.pool_size_for_width(1920.0), WIDE_POOL_SIZE);
    }
}
