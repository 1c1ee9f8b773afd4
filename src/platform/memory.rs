//! In-memory page
//!
//! Stands in for the browser document in the headless driver and in tests.

use std::collections::HashMap;

use crate::error::{Result, SimError};
use crate::sim::{EffectSink, Rect, SideEffect, TargetHandle, TargetProbe, TargetSource};

/// A fixed list of destructible elements
#[derive(Debug, Default)]
pub struct MemoryPage {
    pub elements: Vec<TargetProbe>,
    /// Number of queries answered (or failed)
    pub queries: usize,
    /// Make every query fail
    pub fail: bool,
    /// Hide requests received per element
    pub hidden: HashMap<TargetHandle, usize>,
}

impl MemoryPage {
    /// One element per rect, all in the same color
    pub fn with_rects(rects: &[Rect], color: &str) -> Self {
        let mut page = Self::default();
        for rect in rects {
            page.add_element(*rect, color);
        }
        page
    }

    pub fn add_element(&mut self, rect: Rect, color: &str) -> TargetHandle {
        let handle = TargetHandle(self.elements.len() as u32);
        self.elements.push(TargetProbe {
            handle,
            rect: Some(rect),
            color: Some(color.to_string()),
            hidden: false,
        });
        handle
    }

    /// Move every element vertically, like a page scroll
    pub fn scroll_by(&mut self, dy: f32) {
        for rect in self.elements.iter_mut().filter_map(|e| e.rect.as_mut()) {
            rect.top -= dy;
            rect.bottom -= dy;
        }
    }

    pub fn hidden_count(&self) -> usize {
        self.elements.iter().filter(|e| e.hidden).count()
    }
}

impl TargetSource for MemoryPage {
    fn query_destructible(&mut self) -> Result<Vec<TargetProbe>> {
        self.queries += 1;
        if self.fail {
            return Err(SimError::TargetQuery("document unavailable".into()));
        }
        Ok(self.elements.clone())
    }
}

impl EffectSink for MemoryPage {
    fn apply(&mut self, effect: &SideEffect) {
        let SideEffect::HideElement(handle) = *effect;
        *self.hidden.entry(handle).or_default() += 1;
        if let Some(el) = self.elements.iter_mut().find(|e| e.handle == handle) {
            el.hidden = true;
        }
    }
}
