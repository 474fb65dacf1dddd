//! landing_fx - Scroll and pointer motion for the R1300RT landing page
//!
//! Reveal-on-scroll, parallax, counters, tilt cards and the other decorative
//! effects of the landing page, written against small host traits so they run
//! in the browser (feature `hydrate`) and in memory for tests.

pub mod core;
#[cfg(feature = "hydrate")]
pub mod ui;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    ui::start();
}
