//! Per-tick render description
//!
//! Plain data for whatever paints the background. Nothing here knows about
//! canvases or GPUs.

use glam::Vec2;

use super::bullets::Bullet;
use super::debris::Debris;
use super::particles::{Glyph, ParticleField};
use crate::color::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct GlyphSprite {
    pub pos: Vec2,
    pub size: f32,
    pub glyph: char,
    /// Pulsed alpha, already clamped
    pub brightness: f32,
}

impl From<&Glyph> for GlyphSprite {
    fn from(g: &Glyph) -> Self {
        Self {
            pos: g.pos,
            size: g.size,
            glyph: g.glyph,
            brightness: g.brightness(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulletSprite {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Color,
}

impl From<&Bullet> for BulletSprite {
    fn from(b: &Bullet) -> Self {
        Self {
            pos: b.pos,
            radius: b.radius,
            color: b.color,
        }
    }
}

/// Square fragment; `alpha` is its remaining life
#[derive(Debug, Clone, PartialEq)]
pub struct DebrisSprite {
    pub pos: Vec2,
    pub size: f32,
    pub color: Color,
    pub alpha: f32,
}

impl From<&Debris> for DebrisSprite {
    fn from(d: &Debris) -> Self {
        Self {
            pos: d.pos,
            size: d.size,
            color: d.color,
            alpha: d.life.clamp(0.0, 1.0),
        }
    }
}

/// Faint line between two nearby glyphs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkSegment {
    pub from: Vec2,
    pub to: Vec2,
}

/// Everything visible after one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    pub viewport: Vec2,
    pub glyphs: Vec<GlyphSprite>,
    pub bullets: Vec<BulletSprite>,
    pub debris: Vec<DebrisSprite>,
    pub links: Vec<LinkSegment>,
}

impl RenderFrame {
    pub fn build(
        viewport: Vec2,
        field: &ParticleField,
        bullets: &[Bullet],
        debris: &[Debris],
        link_distance: f32,
    ) -> Self {
        Self {
            viewport,
            glyphs: field.glyphs().iter().map(GlyphSprite::from).collect(),
            bullets: bullets.iter().map(BulletSprite::from).collect(),
            debris: debris.iter().map(DebrisSprite::from).collect(),
            links: field
                .links(link_distance)
                .into_iter()
                .map(|(from, to)| LinkSegment { from, to })
                .collect(),
        }
    }
}
