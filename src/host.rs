// Browser hosts for the particle field.
//
// ParticleFieldHost is the mounted effect: it owns the field and a canvas
// renderer, listens to the pointer and ticks on a fixed timer. Everything it
// registers lives in `Registrations` and is released by stop() or drop.
//
// ParticleFieldSim is the same simulation without any DOM, for pages that
// draw the frames themselves.

use crate::config::FieldConfig;
use crate::dom;
use crate::error::Result;
use crate::field::ParticleField;
use crate::listeners::{Interval, Listener};
use crate::pointer::Pointer;
use crate::renderer::Canvas2dRenderer;
use crate::trail::CursorTrail;
use crate::utils::Timer;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlCanvasElement, MouseEvent, Window};

struct HostState {
    field: ParticleField,
    renderer: Canvas2dRenderer,
    trail: Option<CursorTrail>,
}

impl HostState {
    fn step(&mut self, pointer: Pointer, now_ms: f64) -> Result<()> {
        self.field.tick(pointer);

        let _timer = Timer::new("ParticleFieldHost::render", self.field.config().profile);
        self.renderer.render_frame(&self.field.frame())?;
        if let Some(trail) = self.trail.as_mut() {
            let sprites = trail.sprites(now_ms);
            self.renderer.render_trail(&sprites)?;
        }
        Ok(())
    }
}

struct Registrations {
    _listeners: Vec<Listener>,
    _interval: Interval,
}

#[wasm_bindgen]
pub struct ParticleFieldHost {
    canvas: HtmlCanvasElement,
    state: Rc<RefCell<HostState>>,
    pointer: Rc<Cell<Pointer>>,
    registrations: Option<Registrations>,
}

#[wasm_bindgen]
impl ParticleFieldHost {
    /// `config_json` may be empty or any subset of the field config.
    /// The viewport always follows the canvas size.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config_json: &str) -> std::result::Result<ParticleFieldHost, JsValue> {
        Ok(ParticleFieldHost::build(canvas, config_json)?)
    }

    /// Same as the constructor, looking the canvas up by element id.
    pub fn mount(canvas_id: &str, config_json: &str) -> std::result::Result<ParticleFieldHost, JsValue> {
        let canvas = dom::canvas_by_id(canvas_id)?;
        Ok(ParticleFieldHost::build(canvas, config_json)?)
    }

    pub fn start(&mut self) -> std::result::Result<(), JsValue> {
        if self.registrations.is_some() {
            return Ok(());
        }
        let registrations = self.register()?;
        self.registrations = Some(registrations);
        log!("particle field host: started");
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.registrations.take().is_some() {
            self.pointer.set(Pointer::inactive());
            log!("particle field host: stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.registrations.is_some()
    }

    /// Resizes the canvas backing store along with the field, so the clear
    /// rect and the pixels always match.
    pub fn resize(&mut self, width: u32, height: u32) -> std::result::Result<(), JsValue> {
        let mut state = self.state.borrow_mut();
        state.field.resize(width as f64, height as f64)?;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        state.renderer.resize(width as f64, height as f64);
        Ok(())
    }

    pub fn canvas_size(&self) -> Vec<u32> {
        vec![self.canvas.width(), self.canvas.height()]
    }

    pub fn particle_count(&self) -> usize {
        self.state.borrow().field.len()
    }

    pub fn connection_count(&self) -> usize {
        self.state.borrow().field.compute_connections().len()
    }

    pub fn tick_count(&self) -> f64 {
        self.state.borrow().field.ticks() as f64
    }
}

impl ParticleFieldHost {
    fn build(canvas: HtmlCanvasElement, config_json: &str) -> Result<ParticleFieldHost> {
        let mut config = FieldConfig::from_json(config_json)?;
        if canvas.width() > 0 && canvas.height() > 0 {
            config.width = canvas.width() as f64;
            config.height = canvas.height() as f64;
        }
        let trail = if config.cursor_trail {
            Some(CursorTrail::default())
        } else {
            None
        };
        let renderer = Canvas2dRenderer::new(&canvas, config.connection_color)?;
        let field = ParticleField::new(config)?;

        Ok(ParticleFieldHost {
            canvas,
            state: Rc::new(RefCell::new(HostState {
                field,
                renderer,
                trail,
            })),
            pointer: Rc::new(Cell::new(Pointer::inactive())),
            registrations: None,
        })
    }

    // Anything already registered is dropped, and so released, if a later step fails.
    fn register(&self) -> Result<Registrations> {
        let window = dom::window()?;
        let (interactive, period_ms) = {
            let state = self.state.borrow();
            let config = state.field.config();
            (config.interactive, config.tick_interval_ms)
        };

        let mut listeners = Vec::new();
        if interactive {
            listeners.push(Listener::add(
                window.as_ref(),
                "mousemove",
                self.on_pointer_move(),
            )?);
            let root = dom::document_element()?;
            listeners.push(Listener::add(
                root.as_ref(),
                "mouseenter",
                self.on_pointer_over(true),
            )?);
            listeners.push(Listener::add(
                root.as_ref(),
                "mouseleave",
                self.on_pointer_over(false),
            )?);
        }
        let interval = Interval::start(&window, period_ms, self.on_tick(window.clone()))?;

        Ok(Registrations {
            _listeners: listeners,
            _interval: interval,
        })
    }

    fn on_pointer_move(&self) -> Closure<dyn FnMut(Event)> {
        let canvas = self.canvas.clone();
        let pointer = Rc::clone(&self.pointer);
        let state = Rc::clone(&self.state);
        Closure::wrap(Box::new(move |event: Event| {
            let mouse = match event.dyn_ref::<MouseEvent>() {
                Some(mouse) => mouse,
                None => return,
            };
            let rect = canvas.get_bounding_client_rect();
            let x = mouse.client_x() as f64 - rect.left();
            let y = mouse.client_y() as f64 - rect.top();
            // a moving pointer is over the page even if mouseenter never fired
            pointer.set(Pointer::new(x, y, true));
            if let Some(trail) = state.borrow_mut().trail.as_mut() {
                trail.push(x, y, event.time_stamp());
            }
        }) as Box<dyn FnMut(Event)>)
    }

    fn on_pointer_over(&self, inside: bool) -> Closure<dyn FnMut(Event)> {
        let pointer = Rc::clone(&self.pointer);
        Closure::wrap(Box::new(move |_event: Event| {
            let mut current = pointer.get();
            current.active = inside;
            pointer.set(current);
        }) as Box<dyn FnMut(Event)>)
    }

    fn on_tick(&self, window: Window) -> Closure<dyn FnMut()> {
        let pointer = Rc::clone(&self.pointer);
        let state = Rc::clone(&self.state);
        Closure::wrap(Box::new(move || {
            let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
            if let Err(err) = state.borrow_mut().step(pointer.get(), now) {
                log_warn!("particle field: {}", err);
            }
        }) as Box<dyn FnMut()>)
    }
}

impl Drop for ParticleFieldHost {
    fn drop(&mut self) {
        self.stop();
    }
}

#[wasm_bindgen]
pub struct ParticleFieldSim {
    field: ParticleField,
}

#[wasm_bindgen]
impl ParticleFieldSim {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> std::result::Result<ParticleFieldSim, JsValue> {
        let field = ParticleField::new(FieldConfig::from_json(config_json)?)?;
        Ok(ParticleFieldSim { field })
    }

    pub fn with_seed(config_json: &str, seed: u32) -> std::result::Result<ParticleFieldSim, JsValue> {
        let field = ParticleField::with_seed(FieldConfig::from_json(config_json)?, seed as u64)?;
        Ok(ParticleFieldSim { field })
    }

    pub fn tick(&mut self, x: f64, y: f64, active: bool) {
        self.field.tick(Pointer::new(x, y, active));
    }

    pub fn resize(&mut self, width: f64, height: f64) -> std::result::Result<(), JsValue> {
        self.field.resize(width, height).map_err(JsValue::from)
    }

    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    /// `[x, y, radius, opacity]` per particle, in slot order.
    pub fn sprites(&self) -> Vec<f32> {
        flatten_sprites(&self.field)
    }

    /// `[r, g, b, a]` per particle, in slot order.
    pub fn colors(&self) -> Vec<u8> {
        self.field
            .particles()
            .iter()
            .flat_map(|p| [p.color.r, p.color.g, p.color.b, p.color.a])
            .collect()
    }

    /// `[x1, y1, x2, y2, opacity]` per connection.
    pub fn connections(&self) -> Vec<f32> {
        flatten_connections(&self.field)
    }
}

pub fn flatten_sprites(field: &ParticleField) -> Vec<f32> {
    field
        .particles()
        .iter()
        .flat_map(|p| {
            [
                p.pos[0] as f32,
                p.pos[1] as f32,
                p.render_radius() as f32,
                p.render_opacity() as f32,
            ]
        })
        .collect()
}

pub fn flatten_connections(field: &ParticleField) -> Vec<f32> {
    field
        .compute_connections()
        .iter()
        .flat_map(|c| {
            [
                c.from[0] as f32,
                c.from[1] as f32,
                c.to[0] as f32,
                c.to[1] as f32,
                c.opacity as f32,
            ]
        })
        .collect()
}

