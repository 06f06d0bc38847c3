//! Integration tests for the tree sort animator and its step driver.

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;

use sortvis::application::services::TreeAnimator;
use sortvis::application::{ApplicationError, Scheduler};
use sortvis::config::Settings;
use sortvis::domain::{NodeId, Tone};
use sortvis::infrastructure::layout::TidyLayout;
use sortvis::infrastructure::traits::{RecordingSurface, Transition, TreeFrame};
use sortvis::util::testing;

fn animator(values: &[i32], scheduler: Scheduler) -> (TreeAnimator, Arc<RecordingSurface>) {
    testing::init_test_setup();
    let surface = Arc::new(RecordingSurface::new());
    let animator = TreeAnimator::new(
        values,
        &Settings::default(),
        scheduler,
        surface.clone(),
        Arc::new(TidyLayout::new(300.0, 100.0)),
    )
    .expect("non-empty dataset");
    (animator, surface)
}

fn frames(surface: &RecordingSurface) -> Vec<TreeFrame> {
    surface
        .transitions()
        .into_iter()
        .filter_map(|t| match t {
            Transition::TreeUpdate { frame, .. } => Some(frame),
            _ => None,
        })
        .collect()
}

// ============================================================
// Structure and output
// ============================================================

#[tokio::test(start_paused = true)]
async fn given_5_3_8_1_when_started_then_builds_tree_and_emits_inorder() {
    let (mut animator, surface) = animator(&[5, 3, 8, 1], Scheduler::new(1.0));

    let report = animator.start().await.unwrap();

    assert_eq!(report.structure, "5{L:3{L:1},R:8}");
    assert_eq!(report.output, vec![1, 3, 5, 8]);
    assert_eq!(report.depth, 3);
    // three inserts, one finalize, four extractions
    assert_eq!(report.steps, 8);
    assert_eq!(surface.output(), vec![1, 3, 5, 8]);

    let tree = animator.tree().unwrap();
    let ids: Vec<(i32, NodeId)> = tree.nodes().iter().map(|n| (n.value, n.id)).collect();
    assert_eq!(
        ids,
        vec![(5, NodeId(0)), (3, NodeId(1)), (8, NodeId(2)), (1, NodeId(3))]
    );
}

#[rstest]
#[case(vec![7], vec![7])]
#[case(vec![2, 2, 2], vec![2, 2, 2])]
#[case(vec![1, 2, 3, 4], vec![1, 2, 3, 4])]
#[case(vec![50, 20, 80, 20, 90, 10], vec![10, 20, 20, 50, 80, 90])]
#[tokio::test(start_paused = true)]
async fn given_dataset_when_started_then_output_is_sorted(
    #[case] values: Vec<i32>,
    #[case] expected: Vec<i32>,
) {
    let (mut animator, _) = animator(&values, Scheduler::new(1.0));

    let report = animator.start().await.unwrap();

    assert_eq!(report.output, expected);
    assert_eq!(report.steps, 2 * values.len());
}

#[tokio::test(start_paused = true)]
async fn given_duplicates_when_started_then_routed_right() {
    let (mut animator, _) = animator(&[4, 4, 4], Scheduler::new(1.0));

    let report = animator.start().await.unwrap();

    assert_eq!(report.structure, "4{R:4{R:4}}");
}

// ============================================================
// Pacing
// ============================================================

#[tokio::test(start_paused = true)]
async fn given_default_tick_when_started_then_driver_stops_after_drained_queue() {
    let (mut animator, _) = animator(&[5, 3, 8, 1], Scheduler::new(1.0));
    let started = tokio::time::Instant::now();

    animator.start().await.unwrap();

    // eight steps at 500 ms plus the tick that finds the queue empty
    assert_eq!(started.elapsed(), Duration::from_millis(4500));
}

#[tokio::test(start_paused = true)]
async fn given_cancel_mid_run_when_started_then_cancelled_with_partial_tree() {
    let scheduler = Scheduler::new(1.0);
    let (mut animator, _) = animator(&[5, 3, 8, 1], scheduler.clone());

    let (result, ()) = tokio::join!(animator.start(), async {
        tokio::time::sleep(Duration::from_millis(1250)).await;
        scheduler.cancel();
    });

    assert!(matches!(result, Err(ApplicationError::Cancelled)));
    // root plus the inserts of 3 and 8
    assert_eq!(animator.tree().unwrap().len(), 3);
    assert!(animator.output().is_empty());
}

// ============================================================
// Frames
// ============================================================

#[tokio::test(start_paused = true)]
async fn given_insert_when_rendered_then_new_node_and_path_are_alerted() {
    let (mut animator, surface) = animator(&[5, 3, 8, 1], Scheduler::new(1.0));

    animator.start().await.unwrap();
    let frames = frames(&surface);

    // root, three inserts, finalize
    assert_eq!(frames.len(), 5);

    let root_frame = &frames[0];
    assert_eq!(root_frame.nodes.len(), 1);
    assert!(root_frame.nodes[0].entering);
    assert_eq!(root_frame.nodes[0].stroke, Some(Tone::Alert));

    // inserting 1 descends 5 -> 3 -> 1
    let last_insert = &frames[3];
    let entering: Vec<NodeId> = last_insert.entering_nodes().map(|n| n.id).collect();
    assert_eq!(entering, vec![NodeId(3)]);
    assert_eq!(last_insert.node(NodeId(3)).unwrap().stroke, Some(Tone::Alert));
    assert_eq!(last_insert.node(NodeId(2)).unwrap().stroke, Some(Tone::Selected));
    let link_strokes: Vec<(String, Tone)> = last_insert
        .links
        .iter()
        .map(|link| (link.key(), link.stroke))
        .collect();
    assert_eq!(
        link_strokes,
        vec![
            ("0-1".to_string(), Tone::Alert),
            ("0-2".to_string(), Tone::Muted),
            ("1-3".to_string(), Tone::Alert),
        ]
    );

    let final_frame = &frames[4];
    assert!(final_frame.entering_nodes().next().is_none());
    assert!(final_frame.links.iter().all(|link| link.stroke == Tone::Muted));
    assert_eq!(final_frame.node(NodeId(0)).unwrap().stroke, None);
    assert_eq!(final_frame.node(NodeId(1)).unwrap().stroke, Some(Tone::Resolved));
}

#[tokio::test(start_paused = true)]
async fn given_finished_run_when_inspecting_transitions_then_extractions_follow_inorder() {
    let (mut animator, surface) = animator(&[5, 3, 8, 1], Scheduler::new(1.0));

    animator.start().await.unwrap();

    let extracted: Vec<NodeId> = surface
        .transitions()
        .into_iter()
        .filter_map(|t| match t {
            Transition::ExtractNode { node, .. } => Some(node),
            _ => None,
        })
        .collect();
    assert_eq!(extracted, vec![NodeId(3), NodeId(1), NodeId(0), NodeId(2)]);

    let marked: Vec<usize> = surface
        .transitions()
        .into_iter()
        .filter_map(|t| match t {
            Transition::MarkBefore { slot } => Some(slot),
            _ => None,
        })
        .collect();
    assert_eq!(marked, vec![0, 1, 2, 3]);
}
