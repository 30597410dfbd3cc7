use codex_sidebar_core::KeyValueStore;
use codex_sidebar_core::MemoryStore;
use codex_sidebar_core::SidebarConfig;
use codex_sidebar_core::SidebarEngine;
use codex_sidebar_core::StoreError;
use codex_sidebar_core::TokioScheduler;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

pub use codex_sidebar_core::testing::FakeDocument;
pub use codex_sidebar_core::testing::FakeNode;
pub use codex_sidebar_core::testing::RecordingView;

pub type TestEngine = SidebarEngine<FakeDocument, RecordingView>;

/// A storage backend that refuses every operation, like `localStorage` in a
/// sandboxed frame.
#[derive(Debug, Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::unavailable("storage disabled"))
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::QuotaExceeded {
            key: key.to_string(),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        Err(StoreError::rejected("remove", key, "storage disabled"))
    }
}

/// One engine wired to an in-memory page, panel and store.
pub struct Harness {
    pub doc: Rc<FakeDocument>,
    pub view: Rc<RecordingView>,
    pub panel: FakeNode,
    pub engine: Rc<TestEngine>,
}

impl Harness {
    pub fn new(doc: FakeDocument) -> Self {
        Self::with_store(doc, Rc::new(MemoryStore::new()))
    }

    pub fn with_store(doc: FakeDocument, store: Rc<dyn KeyValueStore>) -> Self {
        Self::with_config(doc, store, SidebarConfig::default())
    }

    pub fn with_config(
        doc: FakeDocument,
        store: Rc<dyn KeyValueStore>,
        config: SidebarConfig,
    ) -> Self {
        let doc = Rc::new(doc);
        let panel = doc.add_panel();
        let view = Rc::new(RecordingView::new(panel));
        let engine = SidebarEngine::new(
            config,
            Rc::clone(&doc),
            Rc::clone(&view),
            store,
            Rc::new(TokioScheduler),
        );
        Self {
            doc,
            view,
            panel,
            engine,
        }
    }
}

/// Runs `future` inside a `LocalSet` so engine tasks can be spawned.
pub async fn run_local<F: Future>(future: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(future).await
}

/// Lets spawned tasks and timers run for `duration` of (paused) time.
pub async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
