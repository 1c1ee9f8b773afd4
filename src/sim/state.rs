//! Simulation state
//!
//! One `SimState` owns every entity pool, the input queue and the RNG, so
//! several backgrounds can run side by side and tests can build one directly.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::bullets::BulletManager;
use super::debris::DebrisSystem;
use super::input::{InputController, InputEvent};
use super::particles::{ParticleField, Repulsion};
use super::targets::DomTargetScanner;
use crate::config::SimConfig;

/// Running totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    pub ticks: u64,
    pub bullets_fired: u64,
    pub targets_destroyed: u64,
    pub glyph_hits: u64,
    pub glyphs_destroyed: u64,
    pub bullets_exited: u64,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    pub config: SimConfig,
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub input: InputController,
    pub scanner: DomTargetScanner,
    pub field: ParticleField,
    pub bullets: BulletManager,
    pub debris: DebrisSystem,
    pub stats: SimStats,
}

impl SimState {
    /// Create a state for a viewport; the config seed wins over `fallback_seed`
    pub fn new(config: SimConfig, viewport: Vec2, fallback_seed: u64) -> Self {
        let seed = config.seed.unwrap_or(fallback_seed);
        let mut rng = Pcg32::seed_from_u64(seed);
        let pool = config.pool_size_for_width(viewport.x);
        let field = ParticleField::new(pool, viewport, &mut rng);

        log::info!(
            "Simulation created: {}x{} viewport, {} glyphs, seed {}",
            viewport.x,
            viewport.y,
            pool,
            seed
        );

        Self {
            input: InputController::new(viewport),
            scanner: DomTargetScanner::new(config.scan_interval),
            bullets: BulletManager::new(
                config.fire_cadence,
                config.bullet_speed,
                config.bullet_radius,
            ),
            debris: DebrisSystem::new(config.max_debris),
            field,
            stats: SimStats::default(),
            rng,
            seed,
            config,
        }
    }

    /// Queue a host input event for the next tick
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    pub fn viewport(&self) -> Vec2 {
        self.input.viewport()
    }

    pub(crate) fn repulsion(&self) -> Repulsion {
        Repulsion {
            radius: self.config.repulsion_radius,
            strength: self.config.repulsion_strength,
        }
    }

    /// Re-derive the glyph pool after a viewport change
    pub(crate) fn apply_resize(&mut self, viewport: Vec2) {
        let pool = self.config.pool_size_for_width(viewport.x);
        if pool != self.field.len() {
            log::info!(
                "Viewport {}x{}: glyph pool {} -> {}",
                viewport.x,
                viewport.y,
                self.field.len(),
                pool
            );
        }
        self.field.resize_pool(pool, viewport, &mut self.rng);
        self.scanner.invalidate();
    }
}
