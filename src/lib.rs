// Visual effects engine for the portfolio page: an interactive particle field
// with connection lines, a cursor trail, a smooth-scroll controller with
// scroll-synchronized parallax, and cursor-follow tilt for cards.
//
// The simulation types (ParticleField, SmoothScroll, Parallax, Tilt,
// CursorTrail) are plain Rust and carry no DOM state. The hosts wire them to
// the browser.

#[macro_use]
pub mod utils;

pub mod color;
pub mod config;
pub mod connection;
pub mod dom;
pub mod error;
pub mod field;
pub mod host;
pub mod listeners;
pub mod parallax;
pub mod particle;
pub mod pointer;
pub mod renderer;
pub mod scroll;
pub mod scroll_host;
pub mod tilt;
pub mod tilt_host;
pub mod trail;
pub mod viewport;

use wasm_bindgen::prelude::*;

pub use crate::color::Color;
pub use crate::config::{ConnectionPolicy, FieldConfig};
pub use crate::connection::Connection;
pub use crate::error::FieldError;
pub use crate::field::{Frame, ParticleField, ParticleSprite};
pub use crate::host::{ParticleFieldHost, ParticleFieldSim};
pub use crate::parallax::{ElementBox, Parallax, ParallaxDirection};
pub use crate::particle::Particle;
pub use crate::pointer::Pointer;
pub use crate::scroll::{
    Easing, OnComplete, ScrollConfig, ScrollEvent, ScrollTarget, ScrollToOptions, SmoothScroll,
};
pub use crate::scroll_host::ScrollHost;
pub use crate::tilt::{Tilt, TiltConfig};
pub use crate::tilt_host::TiltCard;
pub use crate::trail::CursorTrail;
pub use crate::utils::Timer;
pub use crate::viewport::Viewport;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen]
pub fn initialize() {
    utils::set_panic_hook();
}
