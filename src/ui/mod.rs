//! Browser entry: waits for the DOM, loads the page config and installs the
//! motion bindings on a [`BrowserHost`].

mod host;

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Document;

use crate::core::{MotionConfig, install};

pub use host::BrowserHost;

/// Id of the optional `<script type="application/json">` holding config overrides.
pub const CONFIG_ELEMENT_ID: &str = "landing-fx-config";

/// Boots now when the document is parsed, otherwise on `DOMContentLoaded`.
pub fn start() {
    let host = match BrowserHost::new() {
        Ok(host) => Rc::new(host),
        Err(e) => {
            tracing::warn!("Motion disabled: {}", e);
            return;
        }
    };

    if host.document().ready_state() != "loading" {
        boot(host);
        return;
    }

    let ready_host = host.clone();
    let on_ready = Closure::once(move || boot(ready_host));
    if let Err(err) = host
        .document()
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())
    {
        tracing::warn!("Failed to wait for DOMContentLoaded: {:?}", err);
    }
    on_ready.forget();
}

fn boot(host: Rc<BrowserHost>) {
    let config = load_config(host.document());
    let installed = install(&host, &config);
    tracing::debug!("Konami detector armed, {} callouts scheduled", installed.callouts.len());
}

/// Reads overrides from the config script, falling back to defaults.
pub fn load_config(document: &Document) -> MotionConfig {
    let Some(script) = document.get_element_by_id(CONFIG_ELEMENT_ID) else {
        return MotionConfig::default();
    };
    let json = script.text_content().unwrap_or_default();
    match MotionConfig::from_json(&json) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring {} config: {}", CONFIG_ELEMENT_ID, e);
            MotionConfig::default()
        }
    }
}
