// Browser host for SmoothScroll. The page constructs one and hands it to the
// views that need to scroll; there is no shared global instance.
//
// Parallax layers registered here are moved from the same frames that move
// the page, so they never lag the scroll position.

use crate::dom;
use crate::error::{FieldError, Result};
use crate::listeners::{AnimationLoop, Listener};
use crate::parallax::{text_shift_percent, ElementBox, Parallax, ParallaxDirection};
use crate::scroll::{ScrollConfig, ScrollEvent, ScrollTarget, ScrollToOptions, SmoothScroll};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, WheelEvent, Window};

// WheelEvent.deltaMode values
const DOM_DELTA_LINE: u32 = 1;
const DOM_DELTA_PAGE: u32 = 2;
const LINE_HEIGHT_PX: f64 = 16.0;

struct ScrollRegistrations {
    _listeners: Vec<Listener>,
    _frames: AnimationLoop,
}

enum LayerMotion {
    Shift(Parallax),
    // moves by a percentage of its own height
    Text,
}

struct ParallaxLayer {
    // measured against this element, moves `target`
    trigger: HtmlElement,
    target: HtmlElement,
    motion: LayerMotion,
    bounds: ElementBox,
}

impl ParallaxLayer {
    fn measure(&mut self, scroll: f64) {
        let rect = self.trigger.get_bounding_client_rect();
        self.bounds = ElementBox {
            top: rect.top() + scroll,
            height: rect.height(),
        };
    }

    fn apply(&self, scroll: f64, viewport_height: f64) -> Result<()> {
        let progress = Parallax::progress(self.bounds, scroll, viewport_height);
        let transform = match &self.motion {
            LayerMotion::Shift(parallax) => Parallax::css_transform(parallax.offset(progress)),
            LayerMotion::Text => format!("translateY({:.2}%)", text_shift_percent(progress)),
        };
        dom::set_transform(&self.target, &transform)
    }
}

// Completion callbacks fire from inside SmoothScroll while it is borrowed, so
// they only queue the JS function; the host calls it once the borrow is gone.
type Completions = Rc<RefCell<Vec<js_sys::Function>>>;

#[wasm_bindgen]
pub struct ScrollHost {
    scroll: Rc<RefCell<SmoothScroll>>,
    on_scroll: Rc<RefCell<Option<js_sys::Function>>>,
    completions: Completions,
    layers: Rc<RefCell<Vec<ParallaxLayer>>>,
    registrations: Option<ScrollRegistrations>,
}

#[wasm_bindgen]
impl ScrollHost {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> std::result::Result<ScrollHost, JsValue> {
        let config = ScrollConfig::from_json(config_json)?;
        let limit = page_limit(&dom::window()?)?;
        let scroll = SmoothScroll::new(config, limit)?;
        Ok(ScrollHost {
            scroll: Rc::new(RefCell::new(scroll)),
            on_scroll: Rc::new(RefCell::new(None)),
            completions: Rc::new(RefCell::new(Vec::new())),
            layers: Rc::new(RefCell::new(Vec::new())),
            registrations: None,
        })
    }

    /// Acquires the wheel and resize listeners and the frame loop, and resumes input.
    pub fn start(&mut self) -> std::result::Result<(), JsValue> {
        self.scroll.borrow_mut().start();
        if self.registrations.is_none() {
            self.registrations = Some(self.register()?);
            log!("smooth scroll: started");
        }
        Ok(())
    }

    /// Freezes the scroll position and releases everything start() acquired.
    pub fn stop(&mut self) {
        self.scroll.borrow_mut().stop();
        if self.registrations.take().is_some() {
            log!("smooth scroll: stopped");
        }
    }

    /// Called with `(scroll, progress, velocity)` whenever the position moves.
    pub fn set_on_scroll(&mut self, callback: Option<js_sys::Function>) {
        *self.on_scroll.borrow_mut() = callback;
    }

    pub fn scroll_to(&mut self, offset: f64, duration: Option<f64>, immediate: bool, lock: bool) -> bool {
        let options = ScrollToOptions {
            duration,
            immediate,
            lock,
            ..ScrollToOptions::default()
        };
        self.scroll.borrow_mut().scroll_to(ScrollTarget::Offset(offset), options)
    }

    /// Full scroll_to. `target` is a number (offset), `"top"`, `"bottom"`, a CSS
    /// selector or an element. `options_json` takes `offset`, `duration`,
    /// `easing`, `immediate`, `lock` and `force`. `on_complete` runs once the
    /// scroll lands and never if it is cancelled.
    pub fn scroll_to_target(
        &mut self,
        target: JsValue,
        options_json: &str,
        on_complete: Option<js_sys::Function>,
    ) -> std::result::Result<bool, JsValue> {
        let target = self.resolve(&target)?;
        let mut options = ScrollToOptions::from_json(options_json)?;
        if let Some(callback) = on_complete {
            let queue = Rc::clone(&self.completions);
            options = options.then(move || queue.borrow_mut().push(callback));
        }
        let accepted = self.scroll.borrow_mut().scroll_to(target, options);
        if self.registrations.is_none() {
            // no frames to deliver a jump or its completion
            if accepted {
                dom::window()?.scroll_to_with_x_and_y(0.0, self.scroll.borrow().scroll());
            }
            run_completions(&self.completions);
        }
        Ok(accepted)
    }

    pub fn scroll_to_top(&mut self) -> bool {
        self.scroll
            .borrow_mut()
            .scroll_to(ScrollTarget::Top, ScrollToOptions::default())
    }

    pub fn scroll_to_bottom(&mut self) -> bool {
        self.scroll
            .borrow_mut()
            .scroll_to(ScrollTarget::Bottom, ScrollToOptions::default())
    }

    /// Eased scroll with the controller's default easing instead of cubic-out.
    pub fn glide_to(&mut self, offset: f64) -> bool {
        let easing = self.scroll.borrow().config().easing;
        let options = ScrollToOptions {
            easing,
            ..ScrollToOptions::default()
        };
        self.scroll
            .borrow_mut()
            .scroll_to(ScrollTarget::Offset(offset), options)
    }

    pub fn progress(&self) -> f64 {
        self.scroll.borrow().progress()
    }

    pub fn velocity(&self) -> f64 {
        self.scroll.borrow().velocity()
    }

    pub fn position(&self) -> f64 {
        self.scroll.borrow().scroll()
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.borrow().is_scrolling()
    }

    pub fn is_running(&self) -> bool {
        self.registrations.is_some()
    }

    /// Moves `element` by up to `speed * 100` px in `direction` (`up`, `down`,
    /// `left`, `right`) while it crosses the viewport.
    pub fn add_parallax(
        &mut self,
        element: HtmlElement,
        speed: f64,
        direction: &str,
    ) -> std::result::Result<(), JsValue> {
        let direction: ParallaxDirection = direction.parse()?;
        let parallax = Parallax::new(speed, direction)?;
        self.add_layer(element.clone(), element, LayerMotion::Shift(parallax))?;
        Ok(())
    }

    /// Moves `text` up by half its height while `container` crosses the viewport.
    pub fn add_parallax_text(
        &mut self,
        container: HtmlElement,
        text: HtmlElement,
    ) -> std::result::Result<(), JsValue> {
        self.add_layer(container, text, LayerMotion::Text)?;
        Ok(())
    }

    pub fn parallax_count(&self) -> usize {
        self.layers.borrow().len()
    }

    /// Removes every parallax layer and clears the transforms they set.
    pub fn clear_parallax(&mut self) {
        for layer in self.layers.borrow_mut().drain(..) {
            if let Err(err) = dom::set_transform(&layer.target, "") {
                log_warn!("parallax: {}", err);
            }
        }
    }
}

impl ScrollHost {
    fn add_layer(&self, trigger: HtmlElement, target: HtmlElement, motion: LayerMotion) -> Result<()> {
        let scroll = self.scroll.borrow().scroll();
        let mut layer = ParallaxLayer {
            trigger,
            target,
            motion,
            bounds: ElementBox { top: 0.0, height: 0.0 },
        };
        layer.measure(scroll);
        let (_, viewport_height) = dom::inner_size(&dom::window()?)?;
        layer.apply(scroll, viewport_height)?;
        self.layers.borrow_mut().push(layer);
        Ok(())
    }

    fn resolve(&self, target: &JsValue) -> Result<ScrollTarget> {
        if let Some(offset) = target.as_f64() {
            return Ok(ScrollTarget::Offset(offset));
        }
        let element = if let Some(text) = target.as_string() {
            match text.trim() {
                "top" => return Ok(ScrollTarget::Top),
                "bottom" => return Ok(ScrollTarget::Bottom),
                selector => dom::query_selector(selector)?,
            }
        } else if let Some(element) = target.dyn_ref::<Element>() {
            element.clone()
        } else {
            return Err(FieldError::Host(String::from(
                "scroll target must be a number, a selector or an element",
            )));
        };
        let top = element.get_bounding_client_rect().top();
        Ok(ScrollTarget::Offset(top + self.scroll.borrow().scroll()))
    }

    fn register(&self) -> Result<ScrollRegistrations> {
        let window = dom::window()?;
        let mut listeners = Vec::new();
        listeners.push(Listener::add_active(
            window.as_ref(),
            "wheel",
            self.on_wheel(),
        )?);
        listeners.push(Listener::add(
            window.as_ref(),
            "resize",
            self.on_resize(window.clone()),
        )?);
        let frames = AnimationLoop::start(&window, self.on_frame(window.clone()))?;
        Ok(ScrollRegistrations {
            _listeners: listeners,
            _frames: frames,
        })
    }

    fn on_wheel(&self) -> Closure<dyn FnMut(Event)> {
        let scroll = Rc::clone(&self.scroll);
        Closure::wrap(Box::new(move |event: Event| {
            let wheel = match event.dyn_ref::<WheelEvent>() {
                Some(wheel) => wheel,
                None => return,
            };
            let delta = match wheel.delta_mode() {
                DOM_DELTA_LINE => wheel.delta_y() * LINE_HEIGHT_PX,
                DOM_DELTA_PAGE => {
                    let page = web_sys::window()
                        .and_then(|w| w.inner_height().ok())
                        .and_then(|h| h.as_f64())
                        .unwrap_or(800.0);
                    wheel.delta_y() * page
                }
                _ => wheel.delta_y(),
            };
            if scroll.borrow_mut().on_wheel(delta) {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(Event)>)
    }

    fn on_resize(&self, window: Window) -> Closure<dyn FnMut(Event)> {
        let scroll = Rc::clone(&self.scroll);
        let layers = Rc::clone(&self.layers);
        Closure::wrap(Box::new(move |_event: Event| match page_limit(&window) {
            Ok(limit) => {
                scroll.borrow_mut().resize(limit);
                let position = scroll.borrow().scroll();
                for layer in layers.borrow_mut().iter_mut() {
                    layer.measure(position);
                }
            }
            Err(err) => log_warn!("smooth scroll: {}", err),
        }) as Box<dyn FnMut(Event)>)
    }

    fn on_frame(&self, window: Window) -> impl FnMut(f64) + 'static {
        let scroll = Rc::clone(&self.scroll);
        let on_scroll = Rc::clone(&self.on_scroll);
        let completions = Rc::clone(&self.completions);
        let layers = Rc::clone(&self.layers);
        move |time: f64| {
            let event = scroll.borrow_mut().raf(time);
            if let Some(event) = event {
                window.scroll_to_with_x_and_y(0.0, event.scroll);
                move_layers(&layers, &window, &event);
                notify(&on_scroll, &event);
            }
            run_completions(&completions);
        }
    }
}

fn move_layers(layers: &RefCell<Vec<ParallaxLayer>>, window: &Window, event: &ScrollEvent) {
    let layers = layers.borrow();
    if layers.is_empty() {
        return;
    }
    let viewport_height = match dom::inner_size(window) {
        Ok((_, height)) => height,
        Err(err) => {
            log_warn!("parallax: {}", err);
            return;
        }
    };
    for layer in layers.iter() {
        if let Err(err) = layer.apply(event.scroll, viewport_height) {
            log_warn!("parallax: {}", err);
        }
    }
}

fn run_completions(completions: &RefCell<Vec<js_sys::Function>>) {
    // taken first so a callback can start another scroll_to
    let ready: Vec<js_sys::Function> = completions.borrow_mut().drain(..).collect();
    for callback in ready {
        if callback.call0(&JsValue::NULL).is_err() {
            log_warn!("smooth scroll: on_complete callback threw");
        }
    }
}

fn notify(callback: &RefCell<Option<js_sys::Function>>, event: &ScrollEvent) {
    // clone so the callback can replace itself without a double borrow
    let callback = callback.borrow().clone();
    if let Some(callback) = callback {
        let result = callback.call3(
            &JsValue::NULL,
            &JsValue::from_f64(event.scroll),
            &JsValue::from_f64(event.progress),
            &JsValue::from_f64(event.velocity),
        );
        if result.is_err() {
            log_warn!("smooth scroll: on_scroll callback threw");
        }
    }
}

// Largest scroll offset the page allows
fn page_limit(window: &Window) -> Result<f64> {
    let root = dom::document_element()?;
    let (_, viewport_height) = dom::inner_size(window)?;
    let limit = root.scroll_height() as f64 - viewport_height;
    if limit.is_finite() {
        Ok(limit.max(0.0))
    } else {
        Err(FieldError::Host(String::from("page height is not a number")))
    }
}
