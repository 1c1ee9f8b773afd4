//! Destructible page text
//!
//! The simulation never owns page elements. The host exposes them through a
//! `TargetSource` as probes keyed by a `TargetHandle`, and the scanner keeps a
//! throttled snapshot of the ones worth hit-testing. Hiding a hit element is a
//! `SideEffect` the host applies through an `EffectSink`.

use std::collections::HashSet;

use glam::Vec2;

use crate::color::Color;
use crate::error::Result;

/// Non-owning reference to a host element (an id in the host's registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetHandle(pub u32);

/// Axis-aligned rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_origin_size(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    /// Inclusive point test
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        super::collision::point_in_rect(p, self)
    }

    /// Finite, non-inverted geometry
    pub fn is_well_formed(&self) -> bool {
        [self.left, self.top, self.right, self.bottom]
            .iter()
            .all(|v| v.is_finite())
            && self.right >= self.left
            && self.bottom >= self.top
    }

    /// At least partly inside a `viewport`-sized screen at the origin
    pub fn intersects_viewport(&self, viewport: Vec2) -> bool {
        self.bottom > 0.0 && self.top < viewport.y && self.right > 0.0 && self.left < viewport.x
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }
}

/// What the host reports about one destructible element
#[derive(Debug, Clone, PartialEq)]
pub struct TargetProbe {
    pub handle: TargetHandle,
    /// `None` when the element has no layout box right now
    pub rect: Option<Rect>,
    /// Computed CSS foreground color
    pub color: Option<String>,
    /// Already hidden on the page
    pub hidden: bool,
}

/// Snapshot of one hittable element
#[derive(Debug, Clone, PartialEq)]
pub struct DomTarget {
    pub handle: TargetHandle,
    pub rect: Rect,
    pub color: Color,
    pub destroyed: bool,
}

/// A change the host must apply to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Make the element invisible and stop it receiving pointer events
    HideElement(TargetHandle),
}

/// Host-side query for destructible elements
pub trait TargetSource {
    fn query_destructible(&mut self) -> Result<Vec<TargetProbe>>;
}

/// Host-side application of side effects
pub trait EffectSink {
    fn apply(&mut self, effect: &SideEffect);
}

/// Apply a batch of side effects in order
pub fn apply_effects<S: EffectSink + ?Sized>(sink: &mut S, effects: &[SideEffect]) {
    for effect in effects {
        sink.apply(effect);
    }
}

/// Throttled snapshot of hittable page elements
#[derive(Debug, Clone)]
pub struct DomTargetScanner {
    interval: u32,
    /// Ticks until the next refresh (0 = refresh on the next tick)
    countdown: u32,
    targets: Vec<DomTarget>,
    /// Handles hit by this scanner; never re-admitted while the page reports them
    destroyed: HashSet<TargetHandle>,
}

impl DomTargetScanner {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            countdown: 0,
            targets: Vec::new(),
            destroyed: HashSet::new(),
        }
    }

    /// Refresh the snapshot if the interval has elapsed; returns whether it did
    pub fn maybe_refresh(&mut self, source: &mut dyn TargetSource, viewport: Vec2) -> bool {
        if self.countdown > 0 {
            self.countdown -= 1;
            return false;
        }
        self.refresh(source, viewport);
        self.countdown = self.interval - 1;
        true
    }

    /// Re-query the host and rebuild the snapshot
    pub fn refresh(&mut self, source: &mut dyn TargetSource, viewport: Vec2) {
        let probes = match source.query_destructible() {
            Ok(probes) => {
                // Forget destroyed handles the page no longer reports
                let present: HashSet<TargetHandle> = probes.iter().map(|p| p.handle).collect();
                self.destroyed.retain(|h| present.contains(h));
                probes
            }
            Err(e) => {
                log::warn!("Target scan failed, using empty snapshot: {}", e);
                Vec::new()
            }
        };

        let mut malformed = 0usize;
        self.targets = probes
            .into_iter()
            .filter(|p| !p.hidden && !self.destroyed.contains(&p.handle))
            .filter_map(|p| {
                let rect = match p.rect {
                    Some(rect) if rect.is_well_formed() => rect,
                    _ => {
                        malformed += 1;
                        return None;
                    }
                };
                if !rect.intersects_viewport(viewport) {
                    return None;
                }
                Some(DomTarget {
                    handle: p.handle,
                    rect,
                    color: p
                        .color
                        .as_deref()
                        .map(Color::parse_or_white)
                        .unwrap_or_default(),
                    destroyed: false,
                })
            })
            .collect();

        if malformed > 0 {
            log::debug!("Skipped {} targets without usable geometry", malformed);
        }
        log::debug!("Target scan: {} hittable", self.targets.len());
    }

    /// Force a refresh on the next `maybe_refresh`
    pub fn invalidate(&mut self) {
        self.countdown = 0;
    }

    /// Mark a snapshot entry destroyed; false if it already was
    pub fn mark_destroyed(&mut self, index: usize) -> Option<TargetHandle> {
        let target = self.targets.get_mut(index)?;
        if target.destroyed {
            return None;
        }
        target.destroyed = true;
        self.destroyed.insert(target.handle);
        Some(target.handle)
    }

    pub fn targets(&self) -> &[DomTarget] {
        &self.targets
    }

    /// Targets still standing in the current snapshot
    pub fn live_count(&self) -> usize {
        self.targets.iter().filter(|t| !t.destroyed).count()
    }

    pub fn destroyed_count(&self) -> usize {
        self.destroyed.len()
    }
}
