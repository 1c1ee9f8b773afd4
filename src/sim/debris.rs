//! Decaying hit fragments (visual only, never collide)

use std::ops::Range;

use glam::Vec2;
use rand::Rng;

use crate::color::Color;
use crate::consts::{DEBRIS_DECAY, MAX_DEBRIS};

/// A single fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1.0 at spawn, removed at 0
    pub life: f32,
    pub size: f32,
    pub color: Color,
}

/// Shape of a fragment burst
#[derive(Debug, Clone, PartialEq)]
pub struct DebrisBurst {
    pub count: usize,
    pub speed: Range<f32>,
    pub size: Range<f32>,
}

/// Bullet hits page text
pub const IMPACT_BURST: DebrisBurst = DebrisBurst {
    count: 6,
    speed: 2.0..6.0,
    size: 2.0..5.0,
};

/// Bullet chips a glyph
pub const CHIP_BURST: DebrisBurst = DebrisBurst {
    count: 3,
    speed: 1.0..4.0,
    size: 1.0..3.0,
};

/// Bullet destroys a glyph
pub const KILL_BURST: DebrisBurst = DebrisBurst {
    count: 6,
    speed: 2.0..7.0,
    size: 2.0..5.0,
};

/// Owns all live fragments
#[derive(Debug, Clone)]
pub struct DebrisSystem {
    fragments: Vec<Debris>,
    capacity: usize,
}

impl Default for DebrisSystem {
    fn default() -> Self {
        Self::new(MAX_DEBRIS)
    }
}

impl DebrisSystem {
    pub fn new(capacity: usize) -> Self {
        Self {
            fragments: Vec::with_capacity(capacity.min(MAX_DEBRIS)),
            capacity,
        }
    }

    /// Emit a burst of fragments flying out in random directions from `at`
    ///
    /// When the cap would be exceeded the oldest fragments go first.
    pub fn burst<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        at: Vec2,
        burst: &DebrisBurst,
        color: Color,
    ) {
        for _ in 0..burst.count {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let speed = rng.random_range(burst.speed.clone());
            self.fragments.push(Debris {
                pos: at,
                vel: crate::unit_from_angle(angle) * speed,
                life: 1.0,
                size: rng.random_range(burst.size.clone()),
                color,
            });
        }

        if self.fragments.len() > self.capacity {
            let excess = self.fragments.len() - self.capacity;
            self.fragments.drain(..excess);
        }
    }

    /// Integrate, decay and drop dead fragments
    pub fn update(&mut self) {
        for d in &mut self.fragments {
            d.pos += d.vel;
            d.life -= DEBRIS_DECAY;
        }
        self.fragments.retain(|d| d.life > 0.0);
    }

    pub fn fragments(&self) -> &[Debris] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::palette;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_burst_spawns_at_point() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut debris = DebrisSystem::default();
        let at = Vec2::new(40.0, 60.0);
        debris.burst(&mut rng, at, &IMPACT_BURST, palette::GOLD);

        assert_eq!(debris.len(), 6);
        for d in debris.fragments() {
            assert_eq!(d.pos, at);
            assert_eq!(d.life, 1.0);
            assert_eq!(d.color, palette::GOLD);
            let speed = d.vel.length();
            assert!(speed >= 2.0 - 1e-4 && speed < 6.0 + 1e-4);
            assert!(IMPACT_BURST.size.contains(&d.size));
        }
    }

    #[test]
    fn test_linear_decay_and_removal() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut debris = DebrisSystem::default();
        debris.burst(&mut rng, Vec2::ZERO, &CHIP_BURST, palette::WHITE);

        debris.update();
        assert!((debris.fragments()[0].life - (1.0 - DEBRIS_DECAY)).abs() < 1e-6);

        // 1.0 / 0.03 = 33.3 ticks to expire
        for _ in 0..33 {
            debris.update();
        }
        assert!(debris.is_empty());
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut debris = DebrisSystem::new(8);
        debris.burst(&mut rng, Vec2::ZERO, &KILL_BURST, palette::WHITE);
        debris.burst(&mut rng, Vec2::ONE, &KILL_BURST, palette::MINT);

        assert_eq!(debris.len(), 8);
        assert!(debris.fragments()[..2].iter().all(|d| d.color == palette::WHITE));
        assert!(debris.fragments()[2..].iter().all(|d| d.color == palette::MINT));
    }
}
