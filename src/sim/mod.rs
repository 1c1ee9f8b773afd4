//! Deterministic simulation module
//!
//! Everything that moves on the background lives here. This module must be
//! pure and deterministic:
//! - One fixed step per tick
//! - Seeded RNG only
//! - Stable iteration order (pool slot, bullet id, page order)
//! - No canvas, DOM or platform dependencies: page access goes through
//!   `TargetSource` and page changes come back as `SideEffect`s

pub mod bullets;
pub mod collision;
pub mod debris;
pub mod input;
pub mod particles;
pub mod render;
pub mod state;
pub mod targets;
pub mod tick;

pub use bullets::{Bullet, BulletManager, bullet_color};
pub use collision::{point_in_rect, within_hit_box};
pub use debris::{Debris, DebrisBurst, DebrisSystem};
pub use input::{InputController, InputEvent, TickInput};
pub use particles::{GLYPHS, Glyph, GlyphHit, ParticleField, Repulsion};
pub use render::{BulletSprite, DebrisSprite, GlyphSprite, LinkSegment, RenderFrame};
pub use state::{SimState, SimStats};
pub use targets::{
    DomTarget, DomTargetScanner, EffectSink, Rect, SideEffect, TargetHandle, TargetProbe,
    TargetSource, apply_effects,
};
pub use tick::{SimEvent, TickOutput, tick};
