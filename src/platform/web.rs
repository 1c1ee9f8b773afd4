//! Browser host
//!
//! Adapts the live document to the simulation, paints each `RenderFrame` onto
//! a 2D canvas and drives ticks from `requestAnimationFrame` with a
//! fixed-timestep accumulator.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Event, HtmlCanvasElement, HtmlElement, Window};

use crate::config::SimConfig;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::{Result, SimError};
use crate::sim::{
    EffectSink, InputEvent, Rect, RenderFrame, SideEffect, SimState, TargetHandle, TargetProbe,
    TargetSource, apply_effects, tick,
};

const TARGET_SELECTOR: &str = ".destructible-dom-char";
const TARGET_ID_ATTR: &str = "data-glyph-target";
const GLYPH_FONT: &str = "\"Belfast Grotesk\", sans-serif";
const LINK_STYLE: &str = "rgba(255, 255, 255, 0.05)";
const LINK_WIDTH: f64 = 0.5;

/// Live document as a target source and effect sink
///
/// Elements get a `data-glyph-target` id the first time they are seen; the id
/// keys `elements` and is the `TargetHandle` the simulation holds. Ids are
/// never reused, and elements missing from the latest query are released.
struct DomAdapter {
    window: Window,
    document: Document,
    elements: HashMap<u32, HtmlElement>,
    next_id: u32,
}

impl DomAdapter {
    fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            elements: HashMap::new(),
            next_id: 0,
        }
    }

    fn handle_for(&mut self, element: &HtmlElement) -> TargetHandle {
        let known = element
            .get_attribute(TARGET_ID_ATTR)
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|id| self.elements.get(id) == Some(element));
        if let Some(id) = known {
            return TargetHandle(id);
        }

        let id = self.next_id;
        self.next_id += 1;
        if element.set_attribute(TARGET_ID_ATTR, &id.to_string()).is_err() {
            log::debug!("Could not tag target element {}", id);
        }
        self.elements.insert(id, element.clone());
        TargetHandle(id)
    }

    fn probe(&mut self, element: &HtmlElement) -> TargetProbe {
        let handle = self.handle_for(element);

        let hidden = element
            .style()
            .get_property_value("opacity")
            .map(|v| v.trim() == "0")
            .unwrap_or(false);

        let bounds = element.get_bounding_client_rect();
        let rect = (bounds.width() > 0.0 || bounds.height() > 0.0).then(|| {
            Rect::new(
                bounds.left() as f32,
                bounds.top() as f32,
                bounds.right() as f32,
                bounds.bottom() as f32,
            )
        });

        let color = self
            .window
            .get_computed_style(element)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value("color").ok());

        TargetProbe {
            handle,
            rect,
            color,
            hidden,
        }
    }
}

impl TargetSource for DomAdapter {
    fn query_destructible(&mut self) -> Result<Vec<TargetProbe>> {
        let nodes = self
            .document
            .query_selector_all(TARGET_SELECTOR)
            .map_err(|e| SimError::TargetQuery(format!("{:?}", e)))?;

        let mut probes = Vec::with_capacity(nodes.length() as usize);
        for i in 0..nodes.length() {
            let Some(element) = nodes.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            probes.push(self.probe(&element));
        }

        // Drop elements the page no longer has
        let seen: HashSet<u32> = probes.iter().map(|p| p.handle.0).collect();
        let before = self.elements.len();
        self.elements.retain(|id, _| seen.contains(id));
        if self.elements.len() < before {
            log::debug!("Released {} detached targets", before - self.elements.len());
        }
        Ok(probes)
    }
}

impl EffectSink for DomAdapter {
    fn apply(&mut self, effect: &SideEffect) {
        let SideEffect::HideElement(TargetHandle(id)) = *effect;
        let Some(element) = self.elements.get(&id) else {
            log::warn!("Hide request for unknown target {}", id);
            return;
        };
        let style = element.style();
        let hidden = style
            .set_property("opacity", "0")
            .and_then(|_| style.set_property("pointer-events", "none"));
        if let Err(e) = hidden {
            log::warn!("Could not hide target {}: {:?}", id, e);
        }
    }
}

/// Canvas 2D painter for render frames
struct CanvasPainter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasPainter {
    /// Match the backing store to the viewport at device resolution
    fn fit(&self, viewport: Vec2, dpr: f64) {
        self.canvas.set_width((viewport.x as f64 * dpr) as u32);
        self.canvas.set_height((viewport.y as f64 * dpr) as u32);
        // Resizing resets the transform
        let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    }

    fn paint(&self, frame: &RenderFrame) {
        let ctx = &self.ctx;
        ctx.clear_rect(0.0, 0.0, frame.viewport.x as f64, frame.viewport.y as f64);

        for d in &frame.debris {
            ctx.set_global_alpha(d.alpha as f64);
            ctx.set_fill_style_str(&d.color.to_css());
            ctx.fill_rect(d.pos.x as f64, d.pos.y as f64, d.size as f64, d.size as f64);
        }
        ctx.set_global_alpha(1.0);

        for b in &frame.bullets {
            ctx.set_fill_style_str(&b.color.to_css());
            ctx.begin_path();
            let _ = ctx.arc(
                b.pos.x as f64,
                b.pos.y as f64,
                b.radius as f64,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.fill();
        }

        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let mut buf = [0u8; 4];
        for g in &frame.glyphs {
            ctx.set_font(&format!("bold {}px {}", g.size, GLYPH_FONT));
            ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", g.brightness));
            let _ = ctx.fill_text(g.glyph.encode_utf8(&mut buf), g.pos.x as f64, g.pos.y as f64);
        }

        ctx.set_stroke_style_str(LINK_STYLE);
        ctx.set_line_width(LINK_WIDTH);
        for link in &frame.links {
            ctx.begin_path();
            ctx.move_to(link.from.x as f64, link.from.y as f64);
            ctx.line_to(link.to.x as f64, link.to.y as f64);
            ctx.stroke();
        }
    }
}

/// Everything the animation loop and the listeners share
struct Host {
    state: SimState,
    page: DomAdapter,
    painter: CanvasPainter,
    accumulator: f32,
    last_time: f64,
    frame_id: Option<i32>,
    running: bool,
}

impl Host {
    /// Run as many fixed ticks as the elapsed time allows, then paint
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut frame = None;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let output = tick(&mut self.state, &mut self.page);
            apply_effects(&mut self.page, &output.effects);
            frame = Some(output.frame);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop any backlog beyond the substep cap
        self.accumulator = self.accumulator.min(SIM_DT);

        if let Some(frame) = frame {
            self.painter.paint(&frame);
        }
    }

    fn resize(&mut self) {
        let viewport = viewport_size(&self.page.window);
        self.painter
            .fit(viewport, self.page.window.device_pixel_ratio());
        self.state.push_input(InputEvent::Resize {
            width: viewport.x,
            height: viewport.y,
        });
    }
}

fn viewport_size(window: &Window) -> Vec2 {
    let dim = |v: std::result::Result<JsValue, JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    Vec2::new(dim(window.inner_width()), dim(window.inner_height()))
}

fn schedule_frame(host: &Rc<RefCell<Host>>) {
    // Pending frames hold the host weakly
    let frame = super::weak_frame(host, run_frame);
    let closure = Closure::once(move |time: f64| frame(time));

    let mut h = host.borrow_mut();
    match h
        .page
        .window
        .request_animation_frame(closure.as_ref().unchecked_ref())
    {
        Ok(id) => h.frame_id = Some(id),
        Err(e) => {
            log::error!("requestAnimationFrame failed: {:?}", e);
            h.running = false;
        }
    }
    closure.forget();
}

fn run_frame(host: Rc<RefCell<Host>>, time: f64) {
    {
        let mut h = host.borrow_mut();
        h.frame_id = None;
        if !h.running {
            return;
        }

        let dt = if h.last_time > 0.0 {
            ((time - h.last_time) / 1000.0) as f32
        } else {
            SIM_DT
        };
        h.last_time = time;
        h.update(dt);
    }

    schedule_frame(&host);
}

/// A window listener kept alive until teardown
struct Listener {
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

fn listen(window: &Window, kind: &'static str, handler: impl FnMut(Event) + 'static) -> Listener {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    if let Err(e) = window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
    {
        log::warn!("Could not listen for {}: {:?}", kind, e);
    }
    Listener { kind, closure }
}

fn install_listeners(window: &Window, host: &Rc<RefCell<Host>>) -> Vec<Listener> {
    let mut listeners = Vec::new();

    // Pointer position
    {
        let host = Rc::clone(host);
        listeners.push(listen(window, "mousemove", move |event: Event| {
            if let Some(mouse) = event.dyn_ref::<web_sys::MouseEvent>() {
                host.borrow_mut().state.push_input(InputEvent::PointerMove {
                    x: mouse.client_x() as f32,
                    y: mouse.client_y() as f32,
                });
            }
        }));
    }

    // Trigger
    {
        let host = Rc::clone(host);
        listeners.push(listen(window, "mousedown", move |_event: Event| {
            host.borrow_mut().state.push_input(InputEvent::PointerDown);
        }));
    }
    {
        let host = Rc::clone(host);
        listeners.push(listen(window, "mouseup", move |_event: Event| {
            host.borrow_mut().state.push_input(InputEvent::PointerUp);
        }));
    }

    // Losing focus releases the trigger
    {
        let host = Rc::clone(host);
        listeners.push(listen(window, "blur", move |_event: Event| {
            host.borrow_mut().state.push_input(InputEvent::Blur);
        }));
    }

    {
        let host = Rc::clone(host);
        listeners.push(listen(window, "resize", move |_event: Event| {
            host.borrow_mut().resize();
        }));
    }

    listeners
}

/// A running background; `stop()` tears it down
#[wasm_bindgen]
pub struct BackgroundHandle {
    host: Rc<RefCell<Host>>,
    listeners: Vec<Listener>,
    window: Window,
}

#[wasm_bindgen]
impl BackgroundHandle {
    /// Remove every listener and cancel the pending animation frame
    pub fn stop(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = self.window.remove_event_listener_with_callback(
                listener.kind,
                listener.closure.as_ref().unchecked_ref(),
            );
        }

        let mut h = self.host.borrow_mut();
        if !h.running {
            return;
        }
        h.running = false;
        if let Some(id) = h.frame_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        log::info!(
            "Background stopped after {} ticks ({} targets destroyed)",
            h.state.stats.ticks,
            h.state.stats.targets_destroyed
        );
    }

    /// Running totals as JSON
    #[wasm_bindgen(js_name = statsJson)]
    pub fn stats_json(&self) -> String {
        serde_json::to_string(&self.host.borrow().state.stats).unwrap_or_default()
    }
}

impl Drop for BackgroundHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start the background on the canvas with id `canvas_id`
///
/// Fails, and starts nothing, when the canvas or its 2D context is missing.
#[wasm_bindgen(js_name = startBackground)]
pub fn start_background(canvas_id: &str) -> std::result::Result<BackgroundHandle, JsValue> {
    console_error_panic_hook::set_once();
    // Already initialized when a second background starts
    let _ = console_log::init_with_level(log::Level::Info);

    start(canvas_id).map_err(|e| {
        log::error!("Background failed to start: {}", e);
        JsValue::from_str(&e.to_string())
    })
}

fn start(canvas_id: &str) -> Result<BackgroundHandle> {
    let window = web_sys::window().ok_or_else(|| SimError::MissingSurface("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| SimError::MissingSurface("no document".into()))?;

    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| SimError::MissingSurface(format!("#{}", canvas_id)))?
        .dyn_into()
        .map_err(|_| SimError::MissingSurface(format!("#{} is not a canvas", canvas_id)))?;

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(|e| SimError::ContextUnavailable(format!("{:?}", e)))?
        .ok_or_else(|| SimError::ContextUnavailable("2d".into()))?
        .dyn_into()
        .map_err(|_| SimError::ContextUnavailable("unexpected 2d context type".into()))?;

    let viewport = viewport_size(&window);
    let painter = CanvasPainter { canvas, ctx };
    painter.fit(viewport, window.device_pixel_ratio());

    let seed = js_sys::Date::now() as u64;
    let state = SimState::new(SimConfig::load(), viewport, seed);

    let host = Rc::new(RefCell::new(Host {
        state,
        page: DomAdapter::new(window.clone(), document),
        painter,
        accumulator: 0.0,
        last_time: 0.0,
        frame_id: None,
        running: true,
    }));

    let listeners = install_listeners(&window, &host);
    schedule_frame(&host);

    log::info!("Background running on #{}", canvas_id);

    Ok(BackgroundHandle {
        host,
        listeners,
        window,
    })
}
