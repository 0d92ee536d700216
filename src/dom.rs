// Helper functions for reaching the DOM objects the hosts need

use crate::error::{FieldError, Result};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, Window};

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| FieldError::Host(String::from("no global `window`")))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| FieldError::Host(String::from("window has no document")))
}

pub fn document_element() -> Result<Element> {
    document()?
        .document_element()
        .ok_or_else(|| FieldError::Host(String::from("document has no root element")))
}

pub fn canvas_by_id(id: &str) -> Result<HtmlCanvasElement> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| FieldError::Host(format!("no element with id {:?}", id)))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| FieldError::Host(format!("element {:?} is not a canvas", id)))
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .map_err(|e| FieldError::from_js("getContext(\"2d\")", e))?
        .ok_or_else(|| FieldError::Host(String::from("canvas has no 2d context")))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| FieldError::Host(String::from("2d context has an unexpected type")))
}

pub fn inner_size(window: &Window) -> Result<(f64, f64)> {
    let width = window
        .inner_width()
        .map_err(|e| FieldError::from_js("innerWidth", e))?
        .as_f64()
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .map_err(|e| FieldError::from_js("innerHeight", e))?
        .as_f64()
        .unwrap_or(0.0);
    Ok((width, height))
}

// An empty transform clears the inline style
pub fn set_transform(element: &HtmlElement, transform: &str) -> Result<()> {
    element
        .style()
        .set_property("transform", transform)
        .map_err(|e| FieldError::from_js("style.transform", e))
}

pub fn query_selector(selector: &str) -> Result<Element> {
    document()?
        .query_selector(selector)
        .map_err(|e| FieldError::from_js(selector, e))?
        .ok_or_else(|| FieldError::Host(format!("nothing matches {:?}", selector)))
}
