//! Glyph Blaster - an interactive page background you can shoot at
//!
//! Core modules:
//! - `sim`: Pure simulation (glyph pool, bullets, debris, page targets, collisions)
//! - `config`: Tunable constants, loadable from JSON
//! - `color`: CSS color parsing and the bullet palette
//! - `platform`: Browser host (DOM adapter, listeners, canvas painter)

pub mod color;
pub mod config;
pub mod error;
pub mod platform;
pub mod sim;

pub use color::Color;
pub use config::SimConfig;
pub use error::{Result, SimError};

use glam::Vec2;

/// Simulation constants (defaults for `SimConfig`)
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the rate all per-tick constants assume)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per animation frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Ticks between bullets while the trigger is held
    pub const FIRE_CADENCE_TICKS: u32 = 5;
    /// Bullet speed (units per tick, upward)
    pub const BULLET_SPEED: f32 = 15.0;
    pub const BULLET_RADIUS: f32 = 3.0;
    /// Bullets retire once above this y
    pub const BULLET_EXIT_Y: f32 = -50.0;

    /// Ticks between page target re-scans
    pub const SCAN_INTERVAL_TICKS: u32 = 20;

    /// Glyph pool sizes by viewport width
    pub const NARROW_VIEWPORT_WIDTH: f32 = 768.0;
    pub const NARROW_POOL_SIZE: usize = 40;
    pub const WIDE_POOL_SIZE: usize = 100;

    /// Glyph spawn ranges
    pub const GLYPH_MIN_SIZE: f32 = 10.0;
    pub const GLYPH_MAX_SIZE: f32 = 26.0;
    /// One point of health per this much size (rounded up)
    pub const SIZE_PER_HEALTH: f32 = 6.0;
    pub const GLYPH_DRIFT: f32 = 0.3;
    pub const GLYPH_PHASE_STEP: f32 = 0.015;
    pub const GLYPH_FADE_STEP: f32 = 0.02;
    pub const GLYPH_PULSE: f32 = 0.1;

    /// Damage response
    pub const HIT_SHRINK: f32 = 0.85;
    pub const HIT_MIN_SIZE: f32 = 5.0;
    pub const HIT_JITTER: f32 = 5.0;
    /// Hit box half-extent is size / this
    pub const HIT_BOX_DIVISOR: f32 = 1.5;

    /// Pointer repulsion
    pub const REPULSION_RADIUS: f32 = 100.0;
    pub const REPULSION_STRENGTH: f32 = 1.5;

    /// Proximity lines between glyphs
    pub const LINK_DISTANCE: f32 = 100.0;
    pub const LINK_MIN_ALPHA: f32 = 0.1;

    /// Debris
    pub const DEBRIS_DECAY: f32 = 0.03;
    pub const MAX_DEBRIS: usize = 512;

    /// Bounded input queue
    pub const INPUT_QUEUE_CAPACITY: usize = 256;
}

/// Unit vector at `angle` radians
#[inline]
pub fn unit_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
