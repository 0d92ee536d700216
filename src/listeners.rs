// Owning guards for everything the hosts register with the browser.
// Dropping a guard unregisters it, so a host that goes away, or fails halfway
// through setup, never leaves a listener or timer behind.

use crate::error::{FieldError, Result};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Event, EventTarget, Window};

pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn add(
        target: &EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Result<Listener> {
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|e| FieldError::from_js(event, e))?;
        Ok(Listener {
            target: target.clone(),
            event,
            callback,
        })
    }

    /// Listener that may call preventDefault (wheel handlers are passive by default).
    pub fn add_active(
        target: &EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Result<Listener> {
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|e| FieldError::from_js(event, e))?;
        Ok(Listener {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let removed = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
        if removed.is_err() {
            log_warn!("failed to remove {} listener", self.event);
        }
    }
}

pub struct Interval {
    window: Window,
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn start(window: &Window, period_ms: u32, callback: Closure<dyn FnMut()>) -> Result<Interval> {
        let period = i32::try_from(period_ms)
            .map_err(|_| FieldError::invalid("tick_interval_ms", "too large for a timer"))?;
        let handle = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                period,
            )
            .map_err(|e| FieldError::from_js("setInterval", e))?;
        Ok(Interval {
            window: window.clone(),
            handle,
            _callback: callback,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.handle);
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

// requestAnimationFrame loop. Each frame schedules the next one until dropped.
pub struct AnimationLoop {
    window: Window,
    handle: Rc<Cell<i32>>,
    running: Rc<Cell<bool>>,
    callback: FrameCallback,
}

impl AnimationLoop {
    pub fn start<F>(window: &Window, mut on_frame: F) -> Result<AnimationLoop>
    where
        F: FnMut(f64) + 'static,
    {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(0));
        let running = Rc::new(Cell::new(true));

        let next = Rc::clone(&callback);
        let frame_window = window.clone();
        let frame_handle = Rc::clone(&handle);
        let frame_running = Rc::clone(&running);
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |time: f64| {
            if !frame_running.get() {
                return;
            }
            on_frame(time);
            if let Some(cb) = next.borrow().as_ref() {
                match frame_window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(id) => frame_handle.set(id),
                    Err(_) => {
                        log_warn!("requestAnimationFrame refused, animation loop stopped");
                        frame_running.set(false);
                    }
                }
            }
        }) as Box<dyn FnMut(f64)>));

        let first = match callback.borrow().as_ref() {
            Some(cb) => window
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .map_err(|e| FieldError::from_js("requestAnimationFrame", e)),
            None => Err(FieldError::Host(String::from("animation callback missing"))),
        };
        let animation = AnimationLoop {
            window: window.clone(),
            handle,
            running,
            callback,
        };
        // on error `animation` is dropped here, which breaks the callback cycle
        animation.handle.set(first?);
        Ok(animation)
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.running.set(false);
        if self.window.cancel_animation_frame(self.handle.get()).is_err() {
            log_warn!("failed to cancel animation frame");
        }
        // the closure holds an Rc to its own cell
        self.callback.borrow_mut().take();
    }
}
