//! Pointer, trigger and viewport input
//!
//! Host listeners never call into the simulation directly. They push
//! `InputEvent`s into a bounded queue, and the tick drains it once at its
//! start, so every tick sees one consistent input snapshot.

use std::collections::VecDeque;

use glam::Vec2;

use crate::consts::INPUT_QUEUE_CAPACITY;

/// A raw host input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    /// Primary button pressed
    PointerDown,
    /// Primary button released
    PointerUp,
    /// Window lost focus (releases the trigger)
    Blur,
    Resize { width: f32, height: f32 },
}

/// Input snapshot for a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Last known pointer position (`None` before the first move)
    pub pointer: Option<Vec2>,
    /// Trigger held
    pub firing: bool,
    /// A press arrived since the previous tick (even if already released)
    pub pressed: bool,
    pub viewport: Vec2,
    /// Viewport changed since the previous tick
    pub resized: bool,
}

/// Folds queued events into the per-tick input state
#[derive(Debug, Clone)]
pub struct InputController {
    pointer: Option<Vec2>,
    firing: bool,
    pressed: bool,
    viewport: Vec2,
    resized: bool,
    queue: VecDeque<InputEvent>,
    capacity: usize,
}

impl InputController {
    pub fn new(viewport: Vec2) -> Self {
        Self::with_capacity(viewport, INPUT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(viewport: Vec2, capacity: usize) -> Self {
        Self {
            pointer: None,
            firing: false,
            pressed: false,
            viewport,
            resized: false,
            queue: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Queue an event for the next tick
    ///
    /// A full queue folds its oldest event into the state first, so ordering
    /// and the final state are unchanged.
    pub fn push(&mut self, event: InputEvent) {
        if self.queue.len() >= self.capacity {
            if let Some(oldest) = self.queue.pop_front() {
                self.apply(oldest);
            }
        }
        self.queue.push_back(event);
    }

    /// Drain queued events and return this tick's snapshot
    pub fn begin_tick(&mut self) -> TickInput {
        while let Some(event) = self.queue.pop_front() {
            self.apply(event);
        }

        let input = TickInput {
            pointer: self.pointer,
            firing: self.firing,
            pressed: self.pressed,
            viewport: self.viewport,
            resized: self.resized,
        };
        self.pressed = false;
        self.resized = false;
        input
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => self.pointer = Some(Vec2::new(x, y)),
            InputEvent::PointerDown => {
                self.pressed |= !self.firing;
                self.firing = true;
            }
            InputEvent::PointerUp | InputEvent::Blur => self.firing = false,
            InputEvent::Resize { width, height } => {
                let viewport = Vec2::new(width, height);
                if viewport != self.viewport {
                    self.viewport = viewport;
                    self.resized = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_apply_at_tick_start() {
        let mut input = InputController::new(Vec2::new(800.0, 600.0));
        input.push(InputEvent::PointerMove { x: 10.0, y: 20.0 });
        input.push(InputEvent::PointerDown);
        assert_eq!(input.pending(), 2);

        let snapshot = input.begin_tick();
        assert_eq!(snapshot.pointer, Some(Vec2::new(10.0, 20.0)));
        assert!(snapshot.firing);
        assert!(snapshot.pressed);
        assert!(!snapshot.resized);
        assert_eq!(input.pending(), 0);

        // Still held, but no new press
        let held = input.begin_tick();
        assert!(held.firing);
        assert!(!held.pressed);
    }

    #[test]
    fn test_release_and_repress_within_one_tick() {
        let mut input = InputController::new(Vec2::new(800.0, 600.0));
        input.push(InputEvent::PointerDown);
        input.begin_tick();

        input.push(InputEvent::PointerUp);
        input.push(InputEvent::PointerDown);
        let snapshot = input.begin_tick();
        assert!(snapshot.firing);
        assert!(snapshot.pressed);

        // A repeated press while held is not a new press
        input.push(InputEvent::PointerDown);
        assert!(!input.begin_tick().pressed);
    }

    #[test]
    fn test_blur_and_release_stop_firing() {
        let mut input = InputController::new(Vec2::new(800.0, 600.0));
        input.push(InputEvent::PointerDown);
        assert!(input.begin_tick().firing);

        input.push(InputEvent::Blur);
        assert!(!input.begin_tick().firing);

        input.push(InputEvent::PointerDown);
        input.push(InputEvent::PointerUp);
        assert!(!input.begin_tick().firing);
    }

    #[test]
    fn test_resize_flag_is_one_shot() {
        let mut input = InputController::new(Vec2::new(800.0, 600.0));
        input.push(InputEvent::Resize {
            width: 400.0,
            height: 900.0,
        });

        let first = input.begin_tick();
        assert!(first.resized);
        assert_eq!(first.viewport, Vec2::new(400.0, 900.0));
        assert!(!input.begin_tick().resized);

        // Same size again is not a resize
        input.push(InputEvent::Resize {
            width: 400.0,
            height: 900.0,
        });
        assert!(!input.begin_tick().resized);
    }

    #[test]
    fn test_full_queue_keeps_latest_state() {
        let mut input = InputController::with_capacity(Vec2::new(800.0, 600.0), 4);
        input.push(InputEvent::PointerDown);
        for i in 0..10 {
            input.push(InputEvent::PointerMove {
                x: i as f32,
                y: 0.0,
            });
        }
        assert_eq!(input.pending(), 4);

        let snapshot = input.begin_tick();
        assert!(snapshot.firing);
        assert_eq!(snapshot.pointer, Some(Vec2::new(9.0, 0.0)));
    }
}
