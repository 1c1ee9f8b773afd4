//! Ambient floating glyphs
//!
//! The pool is a fixed set of slots. A glyph that runs out of health is
//! replaced in its slot by a fresh one, so the live count only changes when
//! the host resizes the viewport.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;

/// Alphabet glyphs are drawn from
pub const GLYPHS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789&?!@#%{}[]€$£¥";

/// A floating glyph
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Font size; also drives the hit box and max health
    pub size: f32,
    pub glyph: char,
    pub health: u32,
    pub max_health: u32,
    pub alpha: f32,
    /// Alpha the glyph fades toward
    pub target_alpha: f32,
    /// Pulse phase accumulator
    pub phase: f32,
}

impl Glyph {
    /// Spawn a random glyph somewhere inside the viewport
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, viewport: Vec2, alpha: f32) -> Self {
        let size = rng.random_range(GLYPH_MIN_SIZE..GLYPH_MAX_SIZE);
        let max_health = max_health_for_size(size);
        let glyph_count = GLYPHS.chars().count();
        let glyph = GLYPHS
            .chars()
            .nth(rng.random_range(0..glyph_count))
            .unwrap_or('A');

        Self {
            pos: Vec2::new(
                rng.random::<f32>() * viewport.x,
                rng.random::<f32>() * viewport.y,
            ),
            vel: Vec2::new(
                (rng.random::<f32>() - 0.5) * GLYPH_DRIFT,
                (rng.random::<f32>() - 0.5) * GLYPH_DRIFT,
            ),
            size,
            glyph,
            health: max_health,
            max_health,
            alpha,
            target_alpha: rng.random_range(0.3..0.9),
            phase: rng.random::<f32>() * 100.0,
        }
    }

    /// Displayed brightness: alpha with a small sinusoidal pulse, never negative
    pub fn brightness(&self) -> f32 {
        (self.alpha + (self.phase * 2.0).sin() * GLYPH_PULSE).max(0.0)
    }

    /// Box proximity test used for bullet hits
    #[inline]
    pub fn hit_by(&self, point: Vec2) -> bool {
        super::collision::within_hit_box(self.pos, self.size / HIT_BOX_DIVISOR, point)
    }

    fn advance(&mut self, viewport: Vec2) {
        self.phase += GLYPH_PHASE_STEP;
        self.pos += self.vel;

        if self.alpha < self.target_alpha {
            self.alpha = (self.alpha + GLYPH_FADE_STEP).min(self.target_alpha);
        } else if self.alpha > self.target_alpha {
            self.alpha = (self.alpha - GLYPH_FADE_STEP).max(self.target_alpha);
        }

        // Wall bounce
        if self.pos.x < 0.0 {
            self.vel.x = self.vel.x.abs();
        } else if self.pos.x > viewport.x {
            self.vel.x = -self.vel.x.abs();
        }
        if self.pos.y < 0.0 {
            self.vel.y = self.vel.y.abs();
        } else if self.pos.y > viewport.y {
            self.vel.y = -self.vel.y.abs();
        }
    }
}

/// Health for a freshly spawned glyph of this size
pub fn max_health_for_size(size: f32) -> u32 {
    ((size / SIZE_PER_HEALTH).ceil() as u32).max(1)
}

/// Displacement pushing a glyph at `pos` away from the pointer
///
/// Zero at or beyond `radius`, rising linearly to `strength` at distance 0.
/// A glyph exactly under the pointer is pushed along -x.
pub fn repulsion_push(pointer: Vec2, pos: Vec2, radius: f32, strength: f32) -> Vec2 {
    let away = pos - pointer;
    let distance = away.length();
    if distance >= radius {
        return Vec2::ZERO;
    }
    let magnitude = (radius - distance) / radius * strength;
    away.try_normalize().unwrap_or(Vec2::NEG_X) * magnitude
}

/// Outcome of a bullet hitting a glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlyphHit {
    /// Glyph survived with `health` left; `pos` is where it was hit
    Damaged { pos: Vec2, health: u32 },
    /// Glyph died at `pos` and its slot was refilled
    Destroyed { pos: Vec2 },
}

/// Pointer repulsion parameters
#[derive(Debug, Clone, Copy)]
pub struct Repulsion {
    pub radius: f32,
    pub strength: f32,
}

impl Default for Repulsion {
    fn default() -> Self {
        Self {
            radius: REPULSION_RADIUS,
            strength: REPULSION_STRENGTH,
        }
    }
}

/// Fixed-size pool of glyph slots
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    glyphs: Vec<Glyph>,
}

impl ParticleField {
    /// Fill `count` slots; the initial pool starts at random alphas
    pub fn new<R: Rng + ?Sized>(count: usize, viewport: Vec2, rng: &mut R) -> Self {
        let glyphs = (0..count)
            .map(|_| {
                let alpha = rng.random::<f32>();
                Glyph::spawn(rng, viewport, alpha)
            })
            .collect();
        Self { glyphs }
    }

    /// Build a pool from existing glyphs
    pub fn from_glyphs(glyphs: Vec<Glyph>) -> Self {
        Self { glyphs }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn get(&self, index: usize) -> Option<&Glyph> {
        self.glyphs.get(index)
    }

    /// Grow or shrink the pool after a viewport resize (new slots fade in)
    pub fn resize_pool<R: Rng + ?Sized>(&mut self, count: usize, viewport: Vec2, rng: &mut R) {
        if count < self.glyphs.len() {
            self.glyphs.truncate(count);
        } else {
            while self.glyphs.len() < count {
                self.glyphs.push(Glyph::spawn(rng, viewport, 0.0));
            }
        }
    }

    /// Drift, fade, bounce and pointer repulsion for every glyph
    pub fn update(&mut self, pointer: Option<Vec2>, viewport: Vec2, repulsion: Repulsion) {
        for glyph in &mut self.glyphs {
            glyph.advance(viewport);
            if let Some(pointer) = pointer {
                glyph.pos += repulsion_push(pointer, glyph.pos, repulsion.radius, repulsion.strength);
            }
        }
    }

    /// First glyph whose hit box contains `point`
    pub fn find_hit(&self, point: Vec2) -> Option<usize> {
        self.glyphs.iter().position(|g| g.hit_by(point))
    }

    /// Apply one point of damage to the glyph in `index`
    ///
    /// A surviving glyph shrinks and jitters; a dead one is replaced in place
    /// by a fresh glyph at alpha 0.
    pub fn hit<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        viewport: Vec2,
        rng: &mut R,
    ) -> Option<GlyphHit> {
        let glyph = self.glyphs.get_mut(index)?;
        let pos = glyph.pos;
        glyph.health = glyph.health.saturating_sub(1);

        if glyph.health > 0 {
            glyph.size = (glyph.size * HIT_SHRINK).max(HIT_MIN_SIZE);
            glyph.pos += Vec2::new(
                (rng.random::<f32>() - 0.5) * HIT_JITTER,
                (rng.random::<f32>() - 0.5) * HIT_JITTER,
            );
            Some(GlyphHit::Damaged {
                pos,
                health: glyph.health,
            })
        } else {
            *glyph = Glyph::spawn(rng, viewport, 0.0);
            Some(GlyphHit::Destroyed { pos })
        }
    }

    /// Segments between visible glyph pairs closer than `max_distance`
    pub fn links(&self, max_distance: f32) -> Vec<(Vec2, Vec2)> {
        let max_sq = max_distance * max_distance;
        let mut links = Vec::new();
        for (i, a) in self.glyphs.iter().enumerate() {
            if a.alpha <= LINK_MIN_ALPHA {
                continue;
            }
            for b in &self.glyphs[i + 1..] {
                if b.alpha > LINK_MIN_ALPHA && a.pos.distance_squared(b.pos) < max_sq {
                    links.push((a.pos, b.pos));
                }
            }
        }
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    fn glyph_at(pos: Vec2, health: u32) -> Glyph {
        Glyph {
            pos,
            vel: Vec2::ZERO,
            size: 18.0,
            glyph: 'A',
            health,
            max_health: 3,
            alpha: 0.5,
            target_alpha: 0.5,
            phase: 0.0,
        }
    }

    #[test]
    fn test_spawn_ranges() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            let g = Glyph::spawn(&mut rng, VIEWPORT, 0.0);
            assert!((GLYPH_MIN_SIZE..GLYPH_MAX_SIZE).contains(&g.size));
            assert_eq!(g.health, g.max_health);
            assert_eq!(g.max_health, max_health_for_size(g.size));
            assert!(GLYPHS.contains(g.glyph));
            assert!(g.vel.x.abs() <= GLYPH_DRIFT / 2.0);
            assert!((0.3..0.9).contains(&g.target_alpha));
            assert!(g.pos.x >= 0.0 && g.pos.x <= VIEWPORT.x);
        }
    }

    #[test]
    fn test_max_health_from_size() {
        assert_eq!(max_health_for_size(10.0), 2);
        assert_eq!(max_health_for_size(12.0), 2);
        assert_eq!(max_health_for_size(12.1), 3);
        assert_eq!(max_health_for_size(25.9), 5);
    }

    #[test]
    fn test_repulsion_boundary() {
        let pointer = Vec2::new(100.0, 100.0);
        assert_eq!(
            repulsion_push(pointer, Vec2::new(200.0, 100.0), 100.0, 1.5),
            Vec2::ZERO
        );
        assert_eq!(
            repulsion_push(pointer, Vec2::new(300.0, 100.0), 100.0, 1.5),
            Vec2::ZERO
        );

        // Pushed away from the pointer
        let push = repulsion_push(pointer, Vec2::new(150.0, 100.0), 100.0, 1.5);
        assert!(push.x > 0.0);
        assert!((push.length() - 0.75).abs() < 1e-5);

        // Full strength directly under the pointer
        let push = repulsion_push(pointer, pointer, 100.0, 1.5);
        assert_eq!(push, Vec2::new(-1.5, 0.0));
    }

    #[test]
    fn test_fade_never_overshoots() {
        let mut g = glyph_at(Vec2::new(50.0, 50.0), 3);
        g.alpha = 0.0;
        g.target_alpha = 0.05;
        g.advance(VIEWPORT);
        assert!((g.alpha - 0.02).abs() < 1e-6);
        g.advance(VIEWPORT);
        g.advance(VIEWPORT);
        assert_eq!(g.alpha, 0.05);
    }

    #[test]
    fn test_wall_bounce() {
        let mut g = glyph_at(Vec2::new(-1.0, 50.0), 3);
        g.vel = Vec2::new(-0.1, 0.1);
        g.advance(VIEWPORT);
        assert!(g.vel.x > 0.0);

        let mut g = glyph_at(Vec2::new(50.0, VIEWPORT.y + 1.0), 3);
        g.vel = Vec2::new(0.1, 0.1);
        g.advance(VIEWPORT);
        assert!(g.vel.y < 0.0);
    }

    #[test]
    fn test_brightness_clamped() {
        let mut g = glyph_at(Vec2::ZERO, 1);
        g.alpha = 0.0;
        g.phase = 3.0 * std::f32::consts::FRAC_PI_4; // sin(2 * phase) = -1
        assert_eq!(g.brightness(), 0.0);
    }

    #[test]
    fn test_hit_shrinks_and_keeps_slot() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut field = ParticleField::from_glyphs(vec![glyph_at(Vec2::new(50.0, 50.0), 3)]);

        let hit = field.hit(0, VIEWPORT, &mut rng).unwrap();
        assert_eq!(
            hit,
            GlyphHit::Damaged {
                pos: Vec2::new(50.0, 50.0),
                health: 2
            }
        );
        let g = field.get(0).unwrap();
        assert!((g.size - 18.0 * HIT_SHRINK).abs() < 1e-5);
        assert!((g.pos.x - 50.0).abs() <= HIT_JITTER / 2.0);
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn test_shrink_has_floor() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut g = glyph_at(Vec2::new(50.0, 50.0), 10);
        g.size = 5.5;
        let mut field = ParticleField::from_glyphs(vec![g]);
        field.hit(0, VIEWPORT, &mut rng);
        assert_eq!(field.get(0).unwrap().size, HIT_MIN_SIZE);
    }

    #[test]
    fn test_kill_replaces_with_invisible_glyph() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut field = ParticleField::from_glyphs(vec![glyph_at(Vec2::new(50.0, 50.0), 1)]);

        let hit = field.hit(0, VIEWPORT, &mut rng).unwrap();
        assert_eq!(
            hit,
            GlyphHit::Destroyed {
                pos: Vec2::new(50.0, 50.0)
            }
        );
        let fresh = field.get(0).unwrap();
        assert_eq!(fresh.alpha, 0.0);
        assert_eq!(fresh.health, fresh.max_health);
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn test_hit_box() {
        let g = glyph_at(Vec2::new(100.0, 100.0), 1);
        // Half extent = 18 / 1.5 = 12
        assert!(g.hit_by(Vec2::new(111.0, 89.0)));
        assert!(!g.hit_by(Vec2::new(112.0, 100.0)));
        assert!(!g.hit_by(Vec2::new(100.0, 113.0)));
    }

    #[test]
    fn test_links_need_visibility_and_proximity() {
        let mut far = glyph_at(Vec2::new(500.0, 0.0), 1);
        far.alpha = 0.9;
        let mut faint = glyph_at(Vec2::new(10.0, 0.0), 1);
        faint.alpha = 0.05;
        let field = ParticleField::from_glyphs(vec![
            glyph_at(Vec2::new(0.0, 0.0), 1),
            glyph_at(Vec2::new(60.0, 0.0), 1),
            far,
            faint,
        ]);
        let links = field.links(LINK_DISTANCE);
        assert_eq!(links, vec![(Vec2::new(0.0, 0.0), Vec2::new(60.0, 0.0))]);
    }

    #[test]
    fn test_resize_pool() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut field = ParticleField::new(WIDE_POOL_SIZE, VIEWPORT, &mut rng);
        field.resize_pool(NARROW_POOL_SIZE, VIEWPORT, &mut rng);
        assert_eq!(field.len(), NARROW_POOL_SIZE);
        field.resize_pool(WIDE_POOL_SIZE, VIEWPORT, &mut rng);
        assert_eq!(field.len(), WIDE_POOL_SIZE);
        assert!(field.glyphs()[NARROW_POOL_SIZE..].iter().all(|g| g.alpha == 0.0));
    }

    #[test]
    fn test_update_pushes_glyph_away_from_pointer() {
        let start = Vec2::new(400.0, 300.0);
        let mut field = ParticleField::from_glyphs(vec![glyph_at(start, 3)]);

        // 50 units to the left: half strength, pushed to the right
        field.update(Some(Vec2::new(350.0, 300.0)), VIEWPORT, Repulsion::default());
        let pos = field.get(0).unwrap().pos;
        assert!((pos.x - (start.x + REPULSION_STRENGTH * 0.5)).abs() < 1e-4);
        assert_eq!(pos.y, start.y);

        // No pointer yet: a still glyph stays put
        let mut idle = ParticleField::from_glyphs(vec![glyph_at(start, 3)]);
        idle.update(None, VIEWPORT, Repulsion::default());
        assert_eq!(idle.get(0).unwrap().pos, start);
    }

    proptest! {
        #[test]
        fn prop_repulsion_decreases_with_distance(d1 in 0.0f32..100.0, d2 in 0.0f32..100.0) {
            let pointer = Vec2::ZERO;
            let (near, far) = if d1 < d2 { (d1, d2) } else { (d2, d1) };
            prop_assume!(far - near > 1e-3);
            let p_near = repulsion_push(pointer, pointer + Vec2::new(0.0, near), 100.0, 1.5).length();
            let p_far = repulsion_push(pointer, pointer + Vec2::new(0.0, far), 100.0, 1.5).length();
            prop_assert!(p_far > 0.0);
            prop_assert!(p_near > p_far);
        }

        #[test]
        fn prop_repulsion_zero_outside_radius(d in 100.0f32..10_000.0, angle in 0.0f32..std::f32::consts::TAU) {
            let pointer = Vec2::new(0.0, 0.0);
            let pos = crate::unit_from_angle(angle) * d;
            let push = repulsion_push(pointer, pos, 100.0, 1.5);
            prop_assert!(push.length() < 1e-4);
        }

        #[test]
        fn prop_health_only_resets_through_replacement(seed in any::<u64>(), hits in 1usize..40) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut field = ParticleField::new(1, VIEWPORT, &mut rng);
            let mut last_health = field.get(0).unwrap().health;
            for _ in 0..hits {
                match field.hit(0, VIEWPORT, &mut rng).unwrap() {
                    GlyphHit::Damaged { health, .. } => {
                        prop_assert_eq!(health, last_health - 1);
                        last_health = health;
                    }
                    GlyphHit::Destroyed { .. } => {
                        prop_assert_eq!(last_health, 1);
                        let fresh = field.get(0).unwrap();
                        prop_assert_eq!(fresh.health, fresh.max_health);
                        last_health = fresh.health;
                    }
                }
                prop_assert_eq!(field.len(), 1);
            }
        }
    }
}
