use codex_sidebar_core::MutationBatch;
use pretty_assertions::assert_eq;
use sidebar_test_support::FakeDocument;
use sidebar_test_support::Harness;
use sidebar_test_support::run_local;
use sidebar_test_support::settle;
use std::time::Duration;

async fn started() -> Harness {
    let doc = FakeDocument::on_codex();
    doc.add_disclosure("org/a");
    doc.open_overlay(Some("Ambientes"), &["org/a", "org/b"]);
    doc.add_row(&["org/a"]);
    let h = Harness::new(doc);
    h.engine.start().await;
    settle(Duration::from_secs(1)).await;
    h
}

#[tokio::test(start_paused = true)]
async fn burst_of_mutations_runs_one_pass() {
    run_local(async {
        let h = started().await;
        let renders = h.view.render_count();

        for _ in 0..5 {
            h.doc.add_row(&["org/b"]);
            h.engine
                .on_mutations(MutationBatch::new(vec![h.doc.list()]));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(renders, h.view.render_count());
        assert_eq!(vec![true; 6], h.doc.row_visibility());

        settle(Duration::from_millis(250)).await;

        assert_eq!(renders + 1, h.view.render_count());
        let mut expected = vec![false; 6];
        expected[0] = true;
        assert_eq!(expected, h.doc.row_visibility());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn mutations_inside_panel_are_ignored() {
    run_local(async {
        let h = started().await;
        let renders = h.view.render_count();
        let child = h.doc.add_child(h.panel);

        h.engine
            .on_mutations(MutationBatch::new(vec![h.panel, child]));
        settle(Duration::from_millis(500)).await;

        assert_eq!(renders, h.view.render_count());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn mixed_batch_triggers_pass() {
    run_local(async {
        let h = started().await;
        let row = h.doc.add_row(&["org/b"]);

        h.engine
            .on_mutations(MutationBatch::new(vec![h.panel, row]));
        settle(Duration::from_millis(250)).await;

        assert_eq!(vec![true, false], h.doc.row_visibility());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_pass() {
    run_local(async {
        let h = started().await;
        h.doc.add_row(&["org/b"]);
        h.engine
            .on_mutations(MutationBatch::new(vec![h.doc.list()]));

        h.engine.shutdown();
        settle(Duration::from_millis(500)).await;

        assert_eq!(vec![true, true], h.doc.row_visibility());
        assert!(!h.view.is_visible());
        assert!(!h.engine.is_active());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn detached_rows_are_harmless() {
    run_local(async {
        let h = started().await;
        let doomed = h.doc.add_row(&["org/b"]);
        h.engine
            .on_mutations(MutationBatch::new(vec![h.doc.list()]));
        h.doc.remove(doomed);

        settle(Duration::from_millis(250)).await;

        assert_eq!(vec![true], h.doc.row_visibility());
        let last = h.view.last_render().expect("rendered");
        assert_eq!(1, last.visible_item_count);
    })
    .await;
}
