//! Browser driver
//!
//! Draws on a `<canvas>` 2D context, listens on `document` for keyboard,
//! mouse and touch, and steps the game once per animation frame.
//! Dropping the `WebGame` (or calling `stop`) cancels the pending frame
//! and unregisters every listener.

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Document, Event, EventTarget,
    HtmlCanvasElement, HtmlImageElement, KeyboardEvent, MouseEvent, TouchEvent, Window,
};

use crate::config::GameConfig;
use crate::error::Error;
use crate::fit_playfield;
use crate::game::{Game, Hud};
use crate::input::Key;
use crate::renderer::{Backdrop, Color, Rect, Surface, css};
use crate::settings::Settings;

/// `Surface` over a canvas 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    image: Option<HtmlImageElement>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, Error> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(Error::MissingContext)?;
        Ok(Self {
            canvas,
            ctx,
            image: None,
        })
    }

    pub fn set_image(&mut self, image: Option<HtmlImageElement>) {
        self.image = image;
    }

    fn rounded_path(&self, rect: Rect, radius: f32) {
        let (x, y, w, h) = (rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
        let r = (radius as f64).min(w / 2.0).min(h / 2.0).max(0.0);
        let ctx = &self.ctx;
        ctx.begin_path();
        ctx.move_to(x + r, y);
        ctx.line_to(x + w - r, y);
        ctx.quadratic_curve_to(x + w, y, x + w, y + r);
        ctx.line_to(x + w, y + h - r);
        ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
        ctx.line_to(x + r, y + h);
        ctx.quadratic_curve_to(x, y + h, x, y + h - r);
        ctx.line_to(x, y + r);
        ctx.quadratic_curve_to(x, y, x + r, y);
        ctx.close_path();
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f32, f32) {
        (self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn clear(&mut self, color: Color) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
        if color[3] > 0.0 {
            self.ctx.set_fill_style_str(&css(color));
            self.ctx.fill_rect(0.0, 0.0, w as f64, h as f64);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx
            .fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.ctx.set_stroke_style_str(&css(color));
        self.ctx.set_line_width(line_width as f64);
        self.ctx
            .stroke_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.rounded_path(rect, radius);
        self.ctx.fill();
    }

    fn draw_image(&mut self, dest: Rect) {
        if let Some(image) = &self.image {
            let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                image,
                dest.x as f64,
                dest.y as f64,
                dest.w as f64,
                dest.h as f64,
            );
        }
    }
}

/// A registered DOM listener, removed again on drop
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

struct Shared {
    game: RefCell<Game>,
    surface: RefCell<CanvasSurface>,
    canvas: HtmlCanvasElement,
    stopped: Cell<bool>,
    raf_id: Cell<Option<i32>>,
    raf: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    listeners: RefCell<Vec<Listener>>,
    image: RefCell<Option<HtmlImageElement>>,
    image_callbacks: RefCell<Vec<Closure<dyn FnMut()>>>,
    on_hud: RefCell<Option<js_sys::Function>>,
    last_hud: Cell<Option<Hud>>,
}

/// A running game bound to a canvas
pub struct WebGame {
    shared: Rc<Shared>,
}

fn window() -> Result<Window, Error> {
    web_sys::window().ok_or_else(|| Error::MissingCanvas("window".into()))
}

fn document() -> Result<Document, Error> {
    window()?
        .document()
        .ok_or_else(|| Error::MissingCanvas("document".into()))
}

impl WebGame {
    /// Bind to the canvas with id `canvas_id` and start the frame loop
    pub fn start(
        canvas_id: &str,
        config: GameConfig,
        settings: Settings,
        backdrop_url: Option<&str>,
        seed: u64,
    ) -> Result<Self, Error> {
        let window = window()?;
        let document = document()?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .and_then(|el| el.dyn_into().ok())
            .ok_or_else(|| Error::MissingCanvas(canvas_id.to_string()))?;

        let (width, height) = window_playfield(&window);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let use_backdrop = settings.background_image;
        let game = Game::new(config, settings, width, height, seed)?;
        let surface = CanvasSurface::new(canvas.clone())?;

        let shared = Rc::new(Shared {
            game: RefCell::new(game),
            surface: RefCell::new(surface),
            canvas,
            stopped: Cell::new(false),
            raf_id: Cell::new(None),
            raf: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            image: RefCell::new(None),
            image_callbacks: RefCell::new(Vec::new()),
            on_hud: RefCell::new(None),
            last_hud: Cell::new(None),
        });

        if use_backdrop {
            if let Some(url) = backdrop_url {
                load_backdrop(&shared, url);
            }
        }
        register_listeners(&shared, &window, &document);
        start_frame_loop(&shared);

        log::info!("Blockbreak running on #{}", canvas_id);
        Ok(Self { shared })
    }

    /// Called with the HUD as a JSON string whenever it changes
    pub fn set_hud_callback(&self, callback: js_sys::Function) {
        *self.shared.on_hud.borrow_mut() = Some(callback);
        self.shared.last_hud.set(None);
    }

    pub fn restart(&self) {
        if let Ok(mut game) = self.shared.game.try_borrow_mut() {
            game.restart();
        }
    }

    pub fn stop(&self) {
        stop(&self.shared);
    }
}

impl Drop for WebGame {
    fn drop(&mut self) {
        stop(&self.shared);
    }
}

fn stop(shared: &Shared) {
    if shared.stopped.replace(true) {
        return;
    }
    if let (Some(id), Ok(window)) = (shared.raf_id.take(), window()) {
        let _ = window.cancel_animation_frame(id);
    }
    shared.listeners.borrow_mut().clear();
    if let Some(image) = shared.image.borrow_mut().take() {
        image.set_onload(None);
        image.set_onerror(None);
    }
    shared.image_callbacks.borrow_mut().clear();
    shared.raf.borrow_mut().take();
    log::info!("Blockbreak stopped");
}

fn window_playfield(window: &Window) -> (f32, f32) {
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(840.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(600.0);
    let (width, height) = fit_playfield(w as f32, h as f32);
    (width.floor(), height.floor())
}

fn load_backdrop(shared: &Rc<Shared>, url: &str) {
    let image = match HtmlImageElement::new() {
        Ok(image) => image,
        Err(err) => {
            log::warn!("Could not create backdrop image: {:?}", err);
            return;
        }
    };

    let weak = Rc::downgrade(shared);
    let loaded = image.clone();
    let on_load = Closure::<dyn FnMut()>::new(move || {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if shared.stopped.get() {
            return;
        }
        let (width, height) = (loaded.natural_width(), loaded.natural_height());
        if width == 0 || height == 0 {
            log::warn!("Backdrop image has no dimensions");
            shared.game.borrow_mut().set_backdrop(Backdrop::Failed);
            return;
        }
        shared.surface.borrow_mut().set_image(Some(loaded.clone()));
        shared.game.borrow_mut().set_backdrop(Backdrop::Ready {
            width: width as f32,
            height: height as f32,
        });
        log::debug!("Backdrop loaded ({}x{})", width, height);
    });

    let weak = Rc::downgrade(shared);
    let failed_url = url.to_string();
    let on_error = Closure::<dyn FnMut()>::new(move || {
        log::warn!("Failed to load backdrop image {}", failed_url);
        if let Some(shared) = weak.upgrade() {
            shared.game.borrow_mut().set_backdrop(Backdrop::Failed);
        }
    });

    // Handlers go on before src so a cached image cannot fire early
    image.set_onload(Some(on_load.as_ref().unchecked_ref()));
    image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    shared.game.borrow_mut().set_backdrop(Backdrop::Pending);
    image.set_src(url);

    *shared.image.borrow_mut() = Some(image);
    shared
        .image_callbacks
        .borrow_mut()
        .extend([on_load, on_error]);
}

/// Pointer x in playfield pixels
fn canvas_x(canvas: &HtmlCanvasElement, client_x: f64) -> f32 {
    let rect = canvas.get_bounding_client_rect();
    let css_width = rect.width();
    let scale = if css_width > 0.0 {
        canvas.width() as f64 / css_width
    } else {
        1.0
    };
    ((client_x - rect.left()) * scale) as f32
}

fn touch_xs(event: &TouchEvent) -> Vec<f32> {
    let touches = event.touches();
    (0..touches.length())
        .filter_map(|i| touches.get(i))
        .map(|t| t.client_x() as f32)
        .collect()
}

fn listen(
    shared: &Rc<Shared>,
    target: &EventTarget,
    kind: &'static str,
    passive: bool,
    mut handler: impl FnMut(&Shared, Event) + 'static,
) {
    let weak: Weak<Shared> = Rc::downgrade(shared);
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if shared.stopped.get() {
            return;
        }
        handler(&shared, event);
    });

    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    let added = target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        closure.as_ref().unchecked_ref(),
        &options,
    );
    if let Err(err) = added {
        log::warn!("Could not listen for {}: {:?}", kind, err);
        return;
    }
    shared.listeners.borrow_mut().push(Listener {
        target: target.clone(),
        kind,
        closure,
    });
}

fn register_listeners(shared: &Rc<Shared>, window: &Window, document: &Document) {
    let doc: &EventTarget = document.as_ref();

    listen(shared, doc, "keydown", true, |shared, event| {
        if let Some(key) = event
            .dyn_ref::<KeyboardEvent>()
            .and_then(|e| Key::from_dom(&e.key()))
        {
            shared.game.borrow_mut().input_mut().key_down(key);
        }
    });
    listen(shared, doc, "keyup", true, |shared, event| {
        if let Some(key) = event
            .dyn_ref::<KeyboardEvent>()
            .and_then(|e| Key::from_dom(&e.key()))
        {
            shared.game.borrow_mut().input_mut().key_up(key);
        }
    });

    listen(shared, doc, "mousemove", true, |shared, event| {
        if let Some(e) = event.dyn_ref::<MouseEvent>() {
            let x = canvas_x(&shared.canvas, e.client_x() as f64);
            shared.game.borrow_mut().input_mut().pointer_move(x);
        }
    });
    listen(shared, doc, "mousedown", false, |shared, event| {
        event.prevent_default();
        shared.game.borrow_mut().input_mut().pointer_down();
    });
    listen(shared, doc, "mouseup", false, |shared, event| {
        event.prevent_default();
        shared.game.borrow_mut().input_mut().pointer_up();
    });

    listen(shared, doc, "touchstart", false, |shared, event| {
        event.prevent_default();
        if let Some(e) = event.dyn_ref::<TouchEvent>() {
            shared.game.borrow_mut().input_mut().touch_start(&touch_xs(e));
        }
    });
    listen(shared, doc, "touchmove", false, |shared, event| {
        event.prevent_default();
        if let Some(e) = event.dyn_ref::<TouchEvent>() {
            shared.game.borrow_mut().input_mut().touch_move(&touch_xs(e));
        }
    });
    listen(shared, doc, "touchend", false, |shared, event| {
        event.prevent_default();
        shared.game.borrow_mut().input_mut().touch_end();
    });

    let win: &EventTarget = window.as_ref();
    listen(shared, win, "resize", true, |shared, _event| {
        let Some(window) = web_sys::window() else {
            return;
        };
        let (width, height) = window_playfield(&window);
        shared.canvas.set_width(width as u32);
        shared.canvas.set_height(height as u32);
        if let Err(err) = shared.game.borrow_mut().resize(width, height) {
            log::warn!("Ignoring resize: {}", err);
        }
    });

    if let Some(button) = document.get_element_by_id("restart-btn") {
        let target: &EventTarget = button.as_ref();
        listen(shared, target, "click", true, |shared, _event| {
            shared.game.borrow_mut().restart();
        });
    }
}

fn start_frame_loop(shared: &Rc<Shared>) {
    let weak = Rc::downgrade(shared);
    let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if shared.stopped.get() {
            return;
        }
        run_frame(&shared, time);
        request_frame(&shared);
    });
    *shared.raf.borrow_mut() = Some(closure);
    request_frame(shared);
}

fn request_frame(shared: &Shared) {
    let Ok(window) = window() else {
        return;
    };
    let raf = shared.raf.borrow();
    let Some(closure) = raf.as_ref() else {
        return;
    };
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => shared.raf_id.set(Some(id)),
        Err(err) => log::warn!("requestAnimationFrame failed: {:?}", err),
    }
}

fn run_frame(shared: &Shared, time: f64) {
    let hud = {
        let mut game = shared.game.borrow_mut();
        game.frame(time);
        game.render(&mut *shared.surface.borrow_mut());
        game.hud()
    };

    if shared.last_hud.get() == Some(hud) {
        return;
    }
    shared.last_hud.set(Some(hud));
    if let Some(callback) = shared.on_hud.borrow().as_ref() {
        match serde_json::to_string(&hud) {
            Ok(json) => {
                let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&json));
            }
            Err(err) => log::warn!("Could not encode HUD: {}", err),
        }
    }
}
