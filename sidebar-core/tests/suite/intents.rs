use codex_sidebar_core::Category;
use codex_sidebar_core::ViewIntent;
use pretty_assertions::assert_eq;
use sidebar_test_support::FakeDocument;
use sidebar_test_support::Harness;
use sidebar_test_support::run_local;
use sidebar_test_support::settle;
use std::time::Duration;

fn cat(label: &str) -> Category {
    Category::from(label)
}

async fn started() -> Harness {
    let doc = FakeDocument::on_codex();
    doc.add_disclosure("org/a");
    doc.open_overlay(Some("Ambientes"), &["org/a", "org/b"]);
    doc.add_row(&["org/a"]);
    doc.add_row(&["org/b"]);
    let h = Harness::new(doc);
    h.engine.start().await;
    settle(Duration::from_secs(1)).await;
    h
}

#[tokio::test(start_paused = true)]
async fn sink_routes_selection_and_favorites() {
    run_local(async {
        let h = started().await;
        let sink = h.engine.intent_sink();

        sink(ViewIntent::SelectCategory(Some(cat("org/b"))));
        sink(ViewIntent::ToggleFavorite(cat("org/b")));
        settle(Duration::from_secs(1)).await;

        assert_eq!(Some(cat("org/b")), h.engine.selection());
        assert!(h.engine.favorites().contains(&cat("org/b")));
        assert_eq!(vec![false, true], h.doc.row_visibility());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn refresh_intent_forces_discovery() {
    run_local(async {
        let h = started().await;
        h.doc.close_overlays();
        h.doc.stage_overlay(Some("Ambientes"), &["org/a", "org/b", "org/c"], 1);

        (h.engine.intent_sink())(ViewIntent::Refresh);
        settle(Duration::from_secs(1)).await;

        assert_eq!(1, h.doc.disclosure_activations());
        assert_eq!(3, h.engine.known_categories().len());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn opening_host_popover_refreshes_list() {
    run_local(async {
        let doc = FakeDocument::on_codex();
        let disclosure = doc.add_disclosure("org/a");
        let row = doc.add_row(&["org/a"]);
        let h = Harness::new(doc);
        h.engine.start().await;
        settle(Duration::from_secs(3)).await;
        assert_eq!(vec![cat("org/a")], h.engine.known_categories());

        h.doc.open_overlay(Some("Ambientes"), &["org/a", "org/c"]);
        h.engine.on_host_activation(&row);
        settle(Duration::from_millis(100)).await;
        assert_eq!(1, h.engine.known_categories().len());

        h.engine.on_host_activation(&disclosure);
        settle(Duration::from_millis(100)).await;
        assert_eq!(
            vec![cat("org/a"), cat("org/c")],
            h.engine.known_categories()
        );
    })
    .await;
}

#[test]
fn sink_outliving_engine_is_inert() {
    let h = Harness::new(FakeDocument::on_codex());
    let sink = h.engine.intent_sink();
    let Harness { engine, .. } = h;
    drop(engine);

    sink(ViewIntent::Refresh);
}

#[tokio::test(start_paused = true)]
async fn engines_on_separate_pages_do_not_interfere() {
    run_local(async {
        let left = started().await;
        let right = started().await;

        left.engine.select(Some(cat("org/b"))).await;

        assert_eq!(Some(cat("org/b")), left.engine.selection());
        assert_eq!(Some(cat("org/a")), right.engine.selection());
        assert_eq!(vec![true, false], right.doc.row_visibility());
    })
    .await;
}
