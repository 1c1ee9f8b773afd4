//! Bullet collision resolution
//!
//! Page targets are tested before glyphs, and a bullet hits at most one thing
//! per tick. Each bullet leaves this pass either retired (hit or exited) or
//! carried over, never both.

use glam::Vec2;
use rand::Rng;

use super::bullets::Bullet;
use super::debris::{CHIP_BURST, DebrisSystem, IMPACT_BURST, KILL_BURST};
use super::particles::{GlyphHit, ParticleField};
use super::targets::{DomTargetScanner, Rect, SideEffect, TargetHandle};
use crate::color::palette;

/// Inclusive axis-aligned point-in-rectangle test
#[inline]
pub fn point_in_rect(p: Vec2, rect: &Rect) -> bool {
    p.x >= rect.left && p.x <= rect.right && p.y >= rect.top && p.y <= rect.bottom
}

/// Box proximity test: both axis deltas strictly inside `half_extent`
#[inline]
pub fn within_hit_box(center: Vec2, half_extent: f32, p: Vec2) -> bool {
    let d = (center - p).abs();
    d.x < half_extent && d.y < half_extent
}

/// How a bullet was retired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retirement {
    /// Hit a page target
    Target(TargetHandle),
    /// Hit a glyph in this pool slot
    Glyph { slot: usize, destroyed: bool },
    /// Left the top of the screen
    Exited,
}

/// Result of resolving one bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletFate {
    Alive,
    Retired(Retirement),
}

/// Mutable world a bullet can collide with
pub struct CollisionWorld<'a, R: Rng + ?Sized> {
    pub scanner: &'a mut DomTargetScanner,
    pub field: &'a mut ParticleField,
    pub debris: &'a mut DebrisSystem,
    pub rng: &'a mut R,
    pub viewport: Vec2,
    pub exit_y: f32,
    /// Hide requests produced this tick
    pub effects: &'a mut Vec<SideEffect>,
}

impl<R: Rng + ?Sized> CollisionWorld<'_, R> {
    /// Advance one bullet and resolve its collisions for this tick
    pub fn resolve(&mut self, bullet: &mut Bullet) -> BulletFate {
        bullet.advance();

        if let Some(handle) = self.hit_target(bullet) {
            return BulletFate::Retired(Retirement::Target(handle));
        }

        if let Some(slot) = self.field.find_hit(bullet.pos) {
            if let Some(hit) = self.field.hit(slot, self.viewport, &mut *self.rng) {
                return BulletFate::Retired(self.on_glyph_hit(slot, hit, bullet));
            }
        }

        if bullet.pos.y < self.exit_y {
            return BulletFate::Retired(Retirement::Exited);
        }
        BulletFate::Alive
    }

    fn hit_target(&mut self, bullet: &Bullet) -> Option<TargetHandle> {
        let index = self
            .scanner
            .targets()
            .iter()
            .position(|t| !t.destroyed && point_in_rect(bullet.pos, &t.rect))?;
        let color = self.scanner.targets()[index].color;
        let handle = self.scanner.mark_destroyed(index)?;

        self.effects.push(SideEffect::HideElement(handle));
        self.debris.burst(&mut *self.rng, bullet.pos, &IMPACT_BURST, color);
        Some(handle)
    }

    fn on_glyph_hit(&mut self, slot: usize, hit: GlyphHit, bullet: &Bullet) -> Retirement {
        match hit {
            GlyphHit::Damaged { pos, .. } => {
                self.debris.burst(&mut *self.rng, pos, &CHIP_BURST, palette::WHITE);
                Retirement::Glyph {
                    slot,
                    destroyed: false,
                }
            }
            GlyphHit::Destroyed { pos } => {
                self.debris.burst(&mut *self.rng, pos, &CHIP_BURST, palette::WHITE);
                self.debris.burst(&mut *self.rng, pos, &KILL_BURST, bullet.color);
                Retirement::Glyph {
                    slot,
                    destroyed: true,
                }
            }
        }
    }
}

/// Resolve every bullet; returns survivors and the retirements in bullet order
pub fn resolve_bullets<R: Rng + ?Sized>(
    world: &mut CollisionWorld<'_, R>,
    bullets: Vec<Bullet>,
) -> (Vec<Bullet>, Vec<(u32, Retirement)>) {
    let mut survivors = Vec::with_capacity(bullets.len());
    let mut retired = Vec::new();

    for mut bullet in bullets {
        match world.resolve(&mut bullet) {
            BulletFate::Alive => survivors.push(bullet),
            BulletFate::Retired(how) => retired.push((bullet.id, how)),
        }
    }

    (survivors, retired)
}
