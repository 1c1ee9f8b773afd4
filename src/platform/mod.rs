//! Platform layer
//!
//! Hosts that feed the simulation input and apply its side effects:
//! - `web`: browser host (DOM targets, window listeners, canvas painting)
//! - `memory`: in-memory page for the headless driver and tests

use std::cell::RefCell;
use std::rc::Rc;

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use memory::MemoryPage;
#[cfg(target_arch = "wasm32")]
pub use web::{BackgroundHandle, start_background};

/// Wrap a frame callback so it holds `host` weakly
///
/// The callback runs only while another owner keeps the host alive; once the
/// host is gone it does nothing.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) fn weak_frame<T, F>(
    host: &Rc<RefCell<T>>,
    frame: F,
) -> impl FnOnce(f64) + use<T, F>
where
    T: 'static,
    F: FnOnce(Rc<RefCell<T>>, f64) + 'static,
{
    let weak = Rc::downgrade(host);
    move |time| {
        if let Some(host) = weak.upgrade() {
            frame(host, time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_pending_frame_does_not_own_host() {
        let host = Rc::new(RefCell::new(0u32));
        let pending = weak_frame(&host, |h, _| *h.borrow_mut() += 1);
        assert_eq!(Rc::strong_count(&host), 1);

        // A cancelled frame is never called; dropping the last owner frees the host
        let weak = Rc::downgrade(&host);
        drop(host);
        assert!(weak.upgrade().is_none());
        drop(pending);
    }

    #[test]
    fn test_frame_runs_while_host_alive() {
        let host = Rc::new(RefCell::new(0u32));
        weak_frame(&host, |h, time| *h.borrow_mut() = time as u32)(16.0);
        assert_eq!(*host.borrow(), 16);

        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let pending = weak_frame(&host, move |_, _| flag.set(true));
        drop(host);
        pending(32.0);
        assert!(!ran.get());
    }
}
