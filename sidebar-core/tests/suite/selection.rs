use codex_sidebar_core::Category;
use codex_sidebar_core::HostDocument;
use codex_sidebar_core::MemoryStore;
use codex_sidebar_core::SidebarEntry;
use pretty_assertions::assert_eq;
use sidebar_test_support::FakeDocument;
use sidebar_test_support::Harness;
use sidebar_test_support::run_local;
use sidebar_test_support::settle;
use std::rc::Rc;
use std::time::Duration;

fn cat(label: &str) -> Category {
    Category::from(label)
}

/// Task list with rows for org/a and org/b, started with the popover open
/// and given time for the forced refresh to finish.
async fn started(store: Rc<MemoryStore>) -> Harness {
    let doc = FakeDocument::on_codex();
    doc.add_disclosure("org/a");
    doc.open_overlay(Some("Ambientes"), &["org/a", "org/b"]);
    doc.add_header("Hoje");
    doc.add_row(&["Fix login", "org/a"]);
    doc.add_row(&["Bump deps", "org/b"]);
    let h = Harness::with_store(doc, store);
    h.engine.start().await;
    settle(Duration::from_secs(1)).await;
    h
}

#[tokio::test(start_paused = true)]
async fn select_filters_persists_and_mirrors() {
    run_local(async {
        let store = Rc::new(MemoryStore::new());
        let h = started(Rc::clone(&store)).await;
        h.doc.close_overlays();
        h.doc.stage_overlay(Some("Ambientes"), &["org/a", "org/b"], 1);

        h.engine.select(Some(cat("org/b"))).await;

        assert_eq!(Some(cat("org/b")), h.engine.selection());
        assert_eq!(vec![false, true], h.doc.row_visibility());
        assert_eq!(Some("org/b".to_string()), store.raw("codexSidebar.env"));
        assert_eq!(1, h.doc.disclosure_activations());
        assert_eq!(vec!["org/b".to_string()], h.doc.control_activations());
        let last = h.view.last_render().expect("rendered");
        assert_eq!(1, last.visible_item_count);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn reselecting_active_category_realigns_host() {
    run_local(async {
        let store = Rc::new(MemoryStore::new());
        let h = started(Rc::clone(&store)).await;
        assert_eq!(Some(cat("org/a")), h.engine.selection());
        h.doc.close_overlays();
        h.doc.stage_overlay(Some("Ambientes"), &["org/a", "org/b"], 1);
        let renders = h.view.render_count();

        h.engine.select(Some(cat("org/a"))).await;

        assert_eq!(Some(cat("org/a")), h.engine.selection());
        assert_eq!(None, store.raw("codexSidebar.env"));
        assert_eq!(1, h.doc.disclosure_activations());
        assert_eq!(vec!["org/a".to_string()], h.doc.control_activations());
        assert_eq!(renders + 1, h.view.render_count());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn clearing_selection_shows_everything_without_mirroring() {
    run_local(async {
        let store = Rc::new(MemoryStore::with_entries([("codexSidebar.env", "org/b")]));
        let h = started(Rc::clone(&store)).await;
        assert_eq!(vec![false, true], h.doc.row_visibility());

        h.engine.select(None).await;

        assert_eq!(None, h.engine.selection());
        assert_eq!(vec![true, true], h.doc.row_visibility());
        assert_eq!(None, store.raw("codexSidebar.env"));
        assert!(h.doc.control_activations().is_empty());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn unknown_selection_is_rejected() {
    run_local(async {
        let store = Rc::new(MemoryStore::new());
        let h = started(Rc::clone(&store)).await;
        let renders = h.view.render_count();

        h.engine.select(Some(cat("org/zzz"))).await;

        assert_eq!(Some(cat("org/a")), h.engine.selection());
        assert_eq!(None, store.raw("codexSidebar.env"));
        assert_eq!(renders, h.view.render_count());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn vanished_selection_resets_to_all() {
    run_local(async {
        let store = Rc::new(MemoryStore::with_entries([("codexSidebar.env", "org/b")]));
        let doc = FakeDocument::on_codex();
        doc.open_overlay(Some("Ambientes"), &["org/a"]);
        doc.add_row(&["org/a"]);
        doc.add_row(&["org/b"]);
        let h = Harness::with_store(doc, store.clone());

        h.engine.start().await;

        assert_eq!(None, h.engine.selection());
        assert_eq!(vec![true, true], h.doc.row_visibility());
        assert_eq!(None, store.raw("codexSidebar.env"));
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn favorites_are_listed_first_and_pruned_on_discovery() {
    run_local(async {
        let store = Rc::new(MemoryStore::new());
        let h = started(Rc::clone(&store)).await;

        h.engine.toggle_favorite(&cat("org/b"));

        assert_eq!(
            Some(r#"["org/b"]"#.to_string()),
            store.raw("codexSidebar.env.favs")
        );
        let entries = h.view.last_render().expect("rendered").entries();
        assert_eq!(
            SidebarEntry::Category {
                category: cat("org/b"),
                active: false,
                favorite: true,
            },
            entries[0]
        );

        h.doc.close_overlays();
        h.doc.open_overlay(Some("Ambientes"), &["org/a", "org/c"]);
        h.engine.refresh(false).await;

        assert!(h.engine.favorites().is_empty());
        assert_eq!(Some("[]".to_string()), store.raw("codexSidebar.env.favs"));
        assert_eq!(Some(cat("org/a")), h.engine.selection());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn favoriting_unknown_category_is_ignored() {
    run_local(async {
        let store = Rc::new(MemoryStore::new());
        let h = started(Rc::clone(&store)).await;

        h.engine.toggle_favorite(&cat("org/zzz"));

        assert!(h.engine.favorites().is_empty());
        assert_eq!(None, store.raw("codexSidebar.env.favs"));
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn section_header_hides_with_its_rows() {
    run_local(async {
        let doc = FakeDocument::on_codex();
        doc.add_disclosure("org/a");
        doc.open_overlay(Some("Ambientes"), &["org/a", "org/b"]);
        let today = doc.add_header("Hoje");
        doc.add_row(&["org/b"]);
        let older = doc.add_header("Mais antigos");
        doc.add_row(&["org/a"]);
        let h = Harness::new(doc);
        h.engine.start().await;

        assert!(h.doc.is_hidden(&today));
        assert!(!h.doc.is_hidden(&older));

        h.engine.select(None).await;
        assert!(!h.doc.is_hidden(&today));
    })
    .await;
}
