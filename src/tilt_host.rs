// Browser host for a tilting card. Pointer events on the element drive the
// Tilt springs, and an animation frame loop writes the resulting transform.

use crate::dom;
use crate::error::Result;
use crate::listeners::{AnimationLoop, Listener};
use crate::tilt::{Tilt, TiltConfig};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement, MouseEvent};

struct TiltRegistrations {
    _listeners: Vec<Listener>,
    _frames: AnimationLoop,
}

#[wasm_bindgen]
pub struct TiltCard {
    element: HtmlElement,
    tilt: Rc<RefCell<Tilt>>,
    registrations: Option<TiltRegistrations>,
}

#[wasm_bindgen]
impl TiltCard {
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement, config_json: &str) -> std::result::Result<TiltCard, JsValue> {
        let tilt = Tilt::new(TiltConfig::from_json(config_json)?)?;
        Ok(TiltCard {
            element,
            tilt: Rc::new(RefCell::new(tilt)),
            registrations: None,
        })
    }

    pub fn start(&mut self) -> std::result::Result<(), JsValue> {
        if self.registrations.is_none() {
            self.registrations = Some(self.register()?);
        }
        Ok(())
    }

    /// Releases the listeners and frame loop and puts the card back flat.
    pub fn stop(&mut self) {
        if self.registrations.take().is_some() {
            self.tilt.borrow_mut().leave();
            if let Err(err) = dom::set_transform(&self.element, "") {
                log_warn!("tilt card: {}", err);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.registrations.is_some()
    }

    pub fn rotation(&self) -> Vec<f64> {
        let (rotate_x, rotate_y) = self.tilt.borrow().rotation();
        vec![rotate_x, rotate_y]
    }
}

impl TiltCard {
    fn register(&self) -> Result<TiltRegistrations> {
        let window = dom::window()?;
        let listeners = vec![
            Listener::add(self.element.as_ref(), "mousemove", self.on_move())?,
            Listener::add(self.element.as_ref(), "mouseleave", self.on_leave())?,
        ];

        let tilt = Rc::clone(&self.tilt);
        let element = self.element.clone();
        let last = Rc::new(Cell::new(None::<f64>));
        let frames = AnimationLoop::start(&window, move |time: f64| {
            let dt = last.replace(Some(time)).map_or(0.0, |prev| time - prev);
            let transform = {
                let mut tilt = tilt.borrow_mut();
                if tilt.is_settled() && !tilt.is_hovered() {
                    return;
                }
                tilt.step(dt);
                tilt.css_transform()
            };
            if let Err(err) = dom::set_transform(&element, &transform) {
                log_warn!("tilt card: {}", err);
            }
        })?;

        Ok(TiltRegistrations {
            _listeners: listeners,
            _frames: frames,
        })
    }

    fn on_move(&self) -> Closure<dyn FnMut(Event)> {
        let tilt = Rc::clone(&self.tilt);
        let element = self.element.clone();
        Closure::wrap(Box::new(move |event: Event| {
            let mouse = match event.dyn_ref::<MouseEvent>() {
                Some(mouse) => mouse,
                None => return,
            };
            let rect = element.get_bounding_client_rect();
            tilt.borrow_mut().point_at(
                mouse.client_x() as f64,
                mouse.client_y() as f64,
                rect.left(),
                rect.top(),
                rect.width(),
                rect.height(),
            );
        }) as Box<dyn FnMut(Event)>)
    }

    fn on_leave(&self) -> Closure<dyn FnMut(Event)> {
        let tilt = Rc::clone(&self.tilt);
        Closure::wrap(Box::new(move |_event: Event| {
            tilt.borrow_mut().leave();
        }) as Box<dyn FnMut(Event)>)
    }
}

impl Drop for TiltCard {
    fn drop(&mut self) {
        self.stop();
    }
}
