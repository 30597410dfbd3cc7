//! Browser adapter for the Codex environment sidebar.
//!
//! Implements the engine's seams on top of `web-sys` and wires the page's
//! navigation, mutation and click events into a single
//! [`SidebarEngine`]. Loaded as a wasm module into the host page.

mod document;
mod hooks;
mod scheduler;
mod storage;
mod view;

pub use document::WebDocument;
pub use scheduler::BrowserScheduler;
pub use storage::LocalStorageStore;
pub use view::DomView;

use codex_sidebar_core::KeyValueStore;
use codex_sidebar_core::MemoryStore;
use codex_sidebar_core::MutationBatch;
use codex_sidebar_core::Scheduler;
use codex_sidebar_core::SidebarConfig;
use codex_sidebar_core::SidebarEngine;
use std::rc::Rc;
use tracing::info;
use tracing::warn;
use wasm_bindgen::JsValue;
use web_sys::Document;

/// Id of the optional `<script type="application/json">` element holding a
/// [`SidebarConfig`] override.
pub const CONFIG_ELEMENT_ID: &str = "codex-sidebar-config";

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    if let Err(err) = boot() {
        tracing::error!(error = %describe_js(&err), "codex sidebar failed to boot");
    }
}

/// Builds the engine, installs the page hooks and starts the engine after
/// the configured start delay, giving the host UI time to mount.
pub fn boot() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let config = load_config(&document);

    let store: Rc<dyn KeyValueStore> = match LocalStorageStore::from_window(&window) {
        Ok(store) => Rc::new(store),
        Err(err) => {
            warn!(error = %err, "localStorage unavailable; state will not persist");
            Rc::new(MemoryStore::new())
        }
    };
    let scheduler: Rc<dyn Scheduler> = Rc::new(BrowserScheduler);
    let doc = Rc::new(WebDocument::new(
        window.clone(),
        document.clone(),
        config.selectors.clone(),
    ));
    let view = Rc::new(DomView::new(
        document.clone(),
        config.selectors.clone(),
        config.labels.clone(),
    ));
    let start_delay = config.timing.start_delay();
    let engine = SidebarEngine::new(config, doc, Rc::clone(&view), store, Rc::clone(&scheduler));
    view.connect(engine.intent_sink());

    let navigated = Rc::clone(&engine);
    hooks::intercept_history(
        &window,
        Rc::new(move || {
            navigated.notify_navigation();
        }),
    )?;
    let mutated = Rc::clone(&engine);
    hooks::observe_body(&document, move |targets| {
        mutated.on_mutations(MutationBatch::new(targets));
    })?;
    let clicked = Rc::clone(&engine);
    hooks::on_click_capture(&document, move |target| {
        clicked.on_host_activation(&target);
    })?;

    let delay = scheduler.sleep(start_delay);
    scheduler.spawn_local(Box::pin(async move {
        delay.await;
        info!("starting codex sidebar");
        engine.start().await;
    }));
    Ok(())
}

/// Defaults, overridden by the page's config element when present and
/// valid.
fn load_config(document: &Document) -> SidebarConfig {
    let Some(raw) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.text_content())
    else {
        return SidebarConfig::default();
    };
    match SidebarConfig::from_json_str(&raw) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "ignoring invalid sidebar config");
            SidebarConfig::default()
        }
    }
}

pub(crate) fn describe_js(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
