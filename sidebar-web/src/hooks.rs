//! Page-level listeners that feed the engine: history interception, the
//! body mutation observer and the capture-phase click listener.
//!
//! The closures live as long as the page, so they are leaked with
//! `Closure::forget`.

use js_sys::Array;
use js_sys::Function;
use js_sys::Reflect;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::Document;
use web_sys::Element;
use web_sys::Event;
use web_sys::MutationObserver;
use web_sys::MutationObserverInit;
use web_sys::MutationRecord;
use web_sys::Node;
use web_sys::Window;

const HISTORY_METHODS: [&str; 2] = ["pushState", "replaceState"];

/// Calls `on_navigate` after every `history.pushState`/`replaceState` and
/// on `popstate`. The wrapped methods still return what the originals do.
pub fn intercept_history(window: &Window, on_navigate: Rc<dyn Fn()>) -> Result<(), JsValue> {
    let history = window.history()?;
    for method in HISTORY_METHODS {
        let original: Function = Reflect::get(&history, &JsValue::from_str(method))?.dyn_into()?;
        let receiver = history.clone();
        let notify = Rc::clone(&on_navigate);
        let wrapper = Closure::<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>::new(
            move |state: JsValue, title: JsValue, url: JsValue| {
                let result = original.call3(&receiver, &state, &title, &url);
                notify();
                result
            },
        );
        Reflect::set(&history, &JsValue::from_str(method), wrapper.as_ref())?;
        wrapper.forget();
    }

    let notify = Rc::clone(&on_navigate);
    let popstate = Closure::<dyn FnMut(Event)>::new(move |_event: Event| notify());
    window.add_event_listener_with_callback("popstate", popstate.as_ref().unchecked_ref())?;
    popstate.forget();
    Ok(())
}

/// Observes structural changes anywhere under `<body>` and reports the
/// element each record targeted.
pub fn observe_body(
    document: &Document,
    on_batch: impl Fn(Vec<Element>) + 'static,
) -> Result<MutationObserver, JsValue> {
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
        move |records: Array, _observer: MutationObserver| {
            let targets = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .filter_map(|record| record.target())
                .filter_map(element_of)
                .collect();
            on_batch(targets);
        },
    );
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(&body, &init)?;
    callback.forget();
    Ok(observer)
}

/// Capture-phase so the host cannot swallow the click before we see it.
pub fn on_click_capture(
    document: &Document,
    on_click: impl Fn(Element) + 'static,
) -> Result<(), JsValue> {
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let target = event
            .target()
            .and_then(|target| target.dyn_into::<Node>().ok())
            .and_then(element_of);
        if let Some(target) = target {
            on_click(target);
        }
    });
    document.add_event_listener_with_callback_and_bool(
        "click",
        callback.as_ref().unchecked_ref(),
        true,
    )?;
    callback.forget();
    Ok(())
}

/// Text nodes report through their parent element.
fn element_of(node: Node) -> Option<Element> {
    match node.dyn_into::<Element>() {
        Ok(element) => Some(element),
        Err(node) => node.parent_element(),
    }
}
