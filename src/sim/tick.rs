//! One simulation tick
//!
//! Order within a tick: input, target scan (when due), trigger, debris,
//! bullets and collisions, glyph motion, render description.

use super::collision::{CollisionWorld, Retirement, resolve_bullets};
use super::render::RenderFrame;
use super::state::SimState;
use super::targets::{SideEffect, TargetHandle, TargetSource};

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    BulletFired { bullet: u32 },
    TargetDestroyed { bullet: u32, target: TargetHandle },
    GlyphDamaged { bullet: u32, slot: usize },
    GlyphDestroyed { bullet: u32, slot: usize },
    BulletExited { bullet: u32 },
    TargetsScanned { count: usize },
}

/// Everything a tick hands back to the host
#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    pub frame: RenderFrame,
    /// Page changes to apply, in order
    pub effects: Vec<SideEffect>,
    pub events: Vec<SimEvent>,
}

/// Advance the simulation by one tick
pub fn tick(state: &mut SimState, source: &mut dyn TargetSource) -> TickOutput {
    let mut effects = Vec::new();
    let mut events = Vec::new();

    state.stats.ticks += 1;

    let input = state.input.begin_tick();
    let viewport = input.viewport;
    if input.resized {
        state.apply_resize(viewport);
    }

    if state.scanner.maybe_refresh(source, viewport) {
        events.push(SimEvent::TargetsScanned {
            count: state.scanner.targets().len(),
        });
    }

    if let Some(bullet) = state
        .bullets
        .update_trigger(input.firing, input.pressed, input.pointer)
    {
        state.stats.bullets_fired += 1;
        events.push(SimEvent::BulletFired { bullet });
    }

    state.debris.update();

    let live = state.bullets.take();
    let (survivors, retired) = {
        let mut world = CollisionWorld {
            scanner: &mut state.scanner,
            field: &mut state.field,
            debris: &mut state.debris,
            rng: &mut state.rng,
            viewport,
            exit_y: state.config.bullet_exit_y,
            effects: &mut effects,
        };
        resolve_bullets(&mut world, live)
    };
    state.bullets.restore(survivors);

    for (bullet, how) in retired {
        let event = match how {
            Retirement::Target(target) => {
                state.stats.targets_destroyed += 1;
                SimEvent::TargetDestroyed { bullet, target }
            }
            Retirement::Glyph { slot, destroyed } => {
                state.stats.glyph_hits += 1;
                if destroyed {
                    state.stats.glyphs_destroyed += 1;
                    SimEvent::GlyphDestroyed { bullet, slot }
                } else {
                    SimEvent::GlyphDamaged { bullet, slot }
                }
            }
            Retirement::Exited => {
                state.stats.bullets_exited += 1;
                SimEvent::BulletExited { bullet }
            }
        };
        events.push(event);
    }

    let repulsion = state.repulsion();
    state.field.update(input.pointer, viewport, repulsion);

    let frame = RenderFrame::build(
        viewport,
        &state.field,
        state.bullets.bullets(),
        state.debris.fragments(),
        state.config.link_distance,
    );

    TickOutput {
        frame,
        effects,
        events,
    }
}
