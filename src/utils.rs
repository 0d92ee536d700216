// Panic hook and console logging helpers.
// The console calls only exist on wasm32 so the simulation core can be unit tested natively.

pub fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[cfg(target_arch = "wasm32")]
pub fn console_log(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn console_log(_message: &str) {}

#[cfg(target_arch = "wasm32")]
pub fn console_warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn console_warn(_message: &str) {}

// println!-style logging to the browser console
#[macro_export]
macro_rules! log {
    ( $( $t:tt )* ) => {
        $crate::utils::console_log(&format!( $( $t )* ))
    };
}

#[macro_export]
macro_rules! log_warn {
    ( $( $t:tt )* ) => {
        $crate::utils::console_warn(&format!( $( $t )* ))
    };
}

// Brackets a section with console.time / console.timeEnd.
// Disabled timers cost nothing, so hot paths can keep them in place.
pub struct Timer<'a> {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    name: &'a str,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    enabled: bool,
}

impl<'a> Timer<'a> {
    pub fn new(name: &'a str, enabled: bool) -> Timer<'a> {
        #[cfg(target_arch = "wasm32")]
        {
            if enabled {
                web_sys::console::time_with_label(name);
            }
        }
        Timer { name, enabled }
    }
}

impl<'a> Drop for Timer<'a> {
    fn drop(&mut self) {
        #[cfg(target_arch = "wasm32")]
        {
            if self.enabled {
                web_sys::console::time_end_with_label(self.name);
            }
        }
    }
}
