use codex_sidebar_core::Scheduler;
use futures::future::LocalBoxFuture;
use std::time::Duration;
use tracing::debug;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

/// `setTimeout`-backed timers on the page's event loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
            });
            // Without a timer the sleep degrades to a yield.
            if matches!(scheduled, Some(Ok(_))) {
                return;
            }
            if let Err(err) = resolve.call0(&JsValue::NULL) {
                debug!(error = ?err, "failed to resolve timer promise");
            }
        });
        Box::pin(async move {
            if let Err(err) = JsFuture::from(promise).await {
                debug!(error = ?err, "timer promise rejected");
            }
        })
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
