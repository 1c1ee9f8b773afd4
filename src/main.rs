//! Glyph Blaster entry point
//!
//! The browser build is used as a library (`startBackground`). Natively this
//! runs a headless scripted session against an in-memory page and prints the
//! resulting stats as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use glyph_blaster::platform::MemoryPage;
    use glyph_blaster::sim::{InputEvent, Rect, SimEvent, SimState, SimStats, apply_effects, tick};
    use glyph_blaster::{Result, SimConfig};

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);
    const DEFAULT_SEED: u64 = 0x5EED;

    /// Load config from the JSON file named by the first argument, if any
    pub fn load_config() -> Result<SimConfig> {
        match std::env::args().nth(1) {
            Some(path) => {
                let json = std::fs::read_to_string(&path).map_err(|e| {
                    glyph_blaster::SimError::InvalidConfig(format!("{}: {}", path, e))
                })?;
                log::info!("Using config from {}", path);
                SimConfig::from_json(&json)
            }
            None => Ok(SimConfig::load()),
        }
    }

    /// A headline of single-character elements across the middle of the page
    fn headline_page() -> MemoryPage {
        let mut page = MemoryPage::default();
        for i in 0..16 {
            let left = 320.0 + i as f32 * 40.0;
            page.add_element(Rect::from_origin_size(left, 300.0, 30.0, 40.0), "rgb(255, 209, 0)");
        }
        page
    }

    struct Session {
        state: SimState,
        page: MemoryPage,
        hits: usize,
    }

    impl Session {
        fn run(&mut self, ticks: u32, mut each: impl FnMut(u32, &mut SimState)) {
            for i in 0..ticks {
                each(i, &mut self.state);
                let output = tick(&mut self.state, &mut self.page);
                apply_effects(&mut self.page, &output.effects);
                for event in &output.events {
                    if let SimEvent::TargetDestroyed { target, .. } = event {
                        self.hits += 1;
                        log::debug!("Target {:?} destroyed", target);
                    }
                }
            }
        }
    }

    pub fn run(config: SimConfig) -> SimStats {
        let mut session = Session {
            state: SimState::new(config, VIEWPORT, DEFAULT_SEED),
            page: headline_page(),
            hits: 0,
        };

        // Sweep under the headline with the trigger held
        session.state.push_input(InputEvent::PointerDown);
        session.run(240, |i, state| {
            state.push_input(InputEvent::PointerMove {
                x: 300.0 + i as f32 * 3.0,
                y: 600.0,
            });
        });
        session.state.push_input(InputEvent::PointerUp);
        log::info!(
            "Sweep done: {} of {} elements hidden",
            session.page.hidden_count(),
            session.page.elements.len()
        );

        // Scroll the page and fire from the far side; losing focus stops it
        session.page.scroll_by(100.0);
        session.state.push_input(InputEvent::PointerDown);
        session.run(120, |i, state| {
            state.push_input(InputEvent::PointerMove {
                x: 1000.0 - i as f32 * 3.0,
                y: 500.0,
            });
        });
        session.state.push_input(InputEvent::Blur);

        // Narrow the window and let everything settle
        session.state.push_input(InputEvent::Resize {
            width: 600.0,
            height: 800.0,
        });
        session.run(120, |_, _| {});

        log::info!(
            "Session done: {} hits, {} glyphs in pool, {} debris left",
            session.hits,
            session.state.field.len(),
            session.state.debris.len()
        );
        session.state.stats.clone()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Glyph Blaster (native) starting headless session...");

    let config = match headless::load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let stats = headless::run(config);
    match serde_json::to_string_pretty(&stats) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Could not serialize stats: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is startBackground, this is just to satisfy the compiler
}
