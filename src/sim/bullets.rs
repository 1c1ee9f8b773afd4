//! Player bullets and the trigger cadence

use glam::Vec2;

use crate::color::{Color, palette};
use crate::consts::*;

/// A bullet travelling straight up
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    /// Units per tick (upward)
    pub speed: f32,
    pub color: Color,
    pub radius: f32,
}

impl Bullet {
    /// Move one tick upward
    #[inline]
    pub fn advance(&mut self) {
        self.pos.y -= self.speed;
    }
}

/// Bullet color for a trigger counter value
///
/// Every 20th counter value is magenta, every other 10th gold, the rest mint.
pub fn bullet_color(counter: u32) -> Color {
    if counter.is_multiple_of(20) {
        palette::MAGENTA
    } else if counter.is_multiple_of(10) {
        palette::GOLD
    } else {
        palette::MINT
    }
}

/// Owns live bullets and the fire cadence counter
#[derive(Debug, Clone)]
pub struct BulletManager {
    bullets: Vec<Bullet>,
    cadence: u32,
    speed: f32,
    radius: f32,
    fire_counter: u32,
    next_id: u32,
}

impl Default for BulletManager {
    fn default() -> Self {
        Self::new(FIRE_CADENCE_TICKS, BULLET_SPEED, BULLET_RADIUS)
    }
}

impl BulletManager {
    pub fn new(cadence: u32, speed: f32, radius: f32) -> Self {
        let cadence = cadence.max(1);
        Self {
            bullets: Vec::new(),
            cadence,
            speed,
            radius,
            // One short of the threshold so the first held tick fires
            fire_counter: cadence - 1,
            next_id: 1,
        }
    }

    /// Advance the trigger one tick; returns the id of a bullet spawned at `aim`
    ///
    /// A release or a fresh press resets the cadence, so a new press always
    /// fires on its first tick.
    pub fn update_trigger(
        &mut self,
        firing: bool,
        pressed: bool,
        aim: Option<Vec2>,
    ) -> Option<u32> {
        if !firing || pressed {
            self.fire_counter = self.cadence - 1;
        }
        if !firing {
            return None;
        }

        self.fire_counter += 1;
        if !self.fire_counter.is_multiple_of(self.cadence) {
            return None;
        }
        let aim = aim?;
        Some(self.spawn(aim, bullet_color(self.fire_counter)))
    }

    /// Spawn a bullet directly
    pub fn spawn(&mut self, pos: Vec2, color: Color) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.bullets.push(Bullet {
            id,
            pos,
            speed: self.speed,
            color,
            radius: self.radius,
        });
        id
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn len(&self) -> usize {
        self.bullets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }

    /// Take every live bullet out for collision resolution
    pub fn take(&mut self) -> Vec<Bullet> {
        std::mem::take(&mut self.bullets)
    }

    /// Put surviving bullets back
    pub fn restore(&mut self, survivors: Vec<Bullet>) {
        self.bullets = survivors;
    }
}
