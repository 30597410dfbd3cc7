use codex_sidebar_core::Category;
use codex_sidebar_core::HostDocument;
use codex_sidebar_core::Location;
use codex_sidebar_core::MemoryStore;
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

#[test_log::test(tokio::test(start_paused = true))]
async fn open_popover_is_read_without_clicking() {
    run_local(async {
        let doc = FakeDocument::on_codex();
        doc.add_disclosure("org/a");
        doc.open_overlay(Some("Environments"), &["org/b", "org/a"]);
        let h = Harness::new(doc);

        h.engine.start().await;

        assert_eq!(vec![cat("org/a"), cat("org/b")], h.engine.known_categories());
        assert_eq!(Some(cat("org/a")), h.engine.selection());
        assert!(h.view.is_visible());
        assert!(h.engine.is_active());

        // The forced refresh finds the popover still open and never clicks.
        settle(Duration::from_secs(1)).await;
        assert_eq!(0, h.doc.disclosure_activations());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn disclosure_label_seeds_list_until_forced_refresh() {
    run_local(async {
        let doc = FakeDocument::on_codex();
        doc.add_disclosure("org/a");
        doc.stage_overlay(Some("Ambientes"), &["org/a", "org/b", "org/c"], 2);
        let h = Harness::new(doc);

        h.engine.start().await;

        assert_eq!(vec![cat("org/a")], h.engine.known_categories());
        assert_eq!(Some(cat("org/a")), h.engine.selection());
        assert_eq!(0, h.doc.disclosure_activations());

        settle(Duration::from_secs(1)).await;

        assert_eq!(1, h.doc.disclosure_activations());
        assert_eq!(
            vec![cat("org/a"), cat("org/b"), cat("org/c")],
            h.engine.known_categories()
        );
        assert_eq!(Some(cat("org/a")), h.engine.selection());
        let last = h.view.last_render().expect("rendered after discovery");
        assert_eq!(3, last.known_categories.len());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn stale_disclosure_label_does_not_join_discovered_list() {
    run_local(async {
        let doc = FakeDocument::on_codex();
        doc.add_disclosure("org/stale");
        doc.open_overlay(Some("Ambientes"), &["org/a", "org/b"]);
        doc.add_row(&["Fix login", "org/a"]);
        doc.add_row(&["Bump deps", "org/b"]);
        let h = Harness::new(doc);

        h.engine.start().await;

        assert_eq!(vec![cat("org/a"), cat("org/b")], h.engine.known_categories());
        assert_eq!(None, h.engine.selection());
        assert_eq!(vec![true, true], h.doc.row_visibility());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn start_outside_task_list_stays_idle() {
    run_local(async {
        let doc = FakeDocument::new(
            Location::parse("https://chatgpt.com/codex/tasks/task_e_123").expect("valid url"),
        );
        doc.add_disclosure("org/a");
        doc.stage_overlay(Some("Ambientes"), &["org/a"], 0);
        let h = Harness::new(doc);

        h.engine.start().await;
        settle(Duration::from_secs(3)).await;

        assert!(!h.engine.is_active());
        assert!(!h.view.is_visible());
        assert_eq!(0, h.view.mount_count());
        assert_eq!(0, h.doc.disclosure_activations());
        assert!(h.engine.known_categories().is_empty());
    })
    .await;
}

#[test]
fn restored_selection_filters_before_discovery() {
    let doc = FakeDocument::on_codex();
    doc.add_row(&["Fix login", "org/a"]);
    doc.add_row(&["Bump deps", "org/b"]);
    let store = Rc::new(MemoryStore::with_entries([("codexSidebar.env", "org/a")]));
    let h = Harness::with_store(doc, store);

    h.engine.handle_route_change(&h.doc.location());

    assert_eq!(vec![true, false], h.doc.row_visibility());
    assert_eq!(1, h.view.mount_count());
    let last = h.view.last_render().expect("rendered on activation");
    assert_eq!(Some(cat("org/a")), last.selection);
    assert_eq!(1, last.visible_item_count);
}

#[tokio::test(start_paused = true)]
async fn starting_twice_is_harmless() {
    run_local(async {
        let doc = FakeDocument::on_codex();
        doc.add_disclosure("org/a");
        doc.open_overlay(Some("Ambientes"), &["org/a"]);
        let h = Harness::new(doc);

        h.engine.start().await;
        let renders = h.view.render_count();
        h.engine.start().await;

        assert_eq!(renders, h.view.render_count());
    })
    .await;
}
