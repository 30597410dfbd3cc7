use codex_sidebar_core::Category;
use codex_sidebar_core::MemoryStore;
use pretty_assertions::assert_eq;
use sidebar_test_support::FailingStore;
use sidebar_test_support::FakeDocument;
use sidebar_test_support::Harness;
use sidebar_test_support::run_local;
use sidebar_test_support::settle;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

fn cat(label: &str) -> Category {
    Category::from(label)
}

fn codex_page() -> FakeDocument {
    let doc = FakeDocument::on_codex();
    doc.add_disclosure("org/a");
    doc.open_overlay(Some("Ambientes"), &["org/a", "org/b"]);
    doc.add_row(&["org/a"]);
    doc.add_row(&["org/b"]);
    doc
}

#[tokio::test(start_paused = true)]
async fn state_survives_reload() {
    run_local(async {
        let store = Rc::new(MemoryStore::new());
        let first = Harness::with_store(codex_page(), store.clone());
        first.engine.start().await;
        settle(Duration::from_secs(1)).await;
        first.engine.select(Some(cat("org/b"))).await;
        first.engine.toggle_favorite(&cat("org/a"));
        first.engine.shutdown();

        let second = Harness::with_store(codex_page(), store);

        assert_eq!(Some(cat("org/b")), second.engine.selection());
        assert_eq!(BTreeSet::from([cat("org/a")]), second.engine.favorites());

        second.engine.start().await;
        assert_eq!(vec![false, true], second.doc.row_visibility());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn failing_storage_keeps_session_state() {
    run_local(async {
        let h = Harness::with_store(codex_page(), Rc::new(FailingStore));
        h.engine.start().await;
        settle(Duration::from_secs(1)).await;

        h.engine.select(Some(cat("org/b"))).await;
        h.engine.toggle_favorite(&cat("org/b"));

        assert_eq!(Some(cat("org/b")), h.engine.selection());
        assert_eq!(BTreeSet::from([cat("org/b")]), h.engine.favorites());
        assert_eq!(vec![false, true], h.doc.row_visibility());
    })
    .await;
}

#[test]
fn malformed_favorites_are_dropped() {
    let store = Rc::new(MemoryStore::with_entries([
        ("codexSidebar.env", "org/a"),
        ("codexSidebar.env.favs", "{not json"),
    ]));
    let h = Harness::with_store(codex_page(), store);

    assert_eq!(Some(cat("org/a")), h.engine.selection());
    assert!(h.engine.favorites().is_empty());
}

#[test]
fn non_string_favorites_are_skipped() {
    let store = Rc::new(MemoryStore::with_entries([(
        "codexSidebar.env.favs",
        r#"["org/a", 7, null, "org/b"]"#,
    )]));
    let h = Harness::with_store(codex_page(), store);

    assert_eq!(
        BTreeSet::from([cat("org/a"), cat("org/b")]),
        h.engine.favorites()
    );
}
