//! Settlement, progress and first-failure behavior of the synchronizer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use dash_core::{Asset, AssetBatch};
use dash_store::{BucketStore, FaultyStore, StoreCall, StoreError};
use dash_sync::{BatchOp, Synchronizer};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn batch_of(n: usize) -> (AssetBatch, Vec<String>) {
    let mut batch = AssetBatch::new();
    let mut paths = Vec::with_capacity(n);
    for i in 0..n {
        let path = format!("study/asset-{i}.png");
        batch
            .insert(Asset::new(
                path.clone(),
                Bytes::from(format!("pixels-{i}")),
                "image/png",
            ))
            .unwrap();
        paths.push(path);
    }
    (batch, paths)
}

fn memory() -> FaultyStore<BucketStore> {
    FaultyStore::new(BucketStore::in_memory("t"))
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(25)]
#[tokio::test]
async fn all_successes_report_every_completion(#[case] n: usize) {
    let store = memory();
    let (batch, _) = batch_of(n);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&calls);

    let progress = Synchronizer::new(&store)
        .on_progress(move |done, total| seen.lock().unwrap().push((done, total)))
        .run(batch, BatchOp::Upload)
        .await
        .unwrap();

    let calls = calls.lock().unwrap().clone();
    assert_eq!(calls.len(), n);
    assert_eq!(calls.last(), Some(&(n, n)));
    assert!(calls.windows(2).all(|w| w[0].0 < w[1].0));
    assert_eq!(progress.started, n);
    assert_eq!(progress.completed, n);
    assert!(progress.errors.is_empty());
    assert_eq!(store.calls(StoreCall::UploadAsset), n);
}

#[rstest]
#[case(0)]
#[case(2)]
#[case(4)]
#[tokio::test]
async fn single_failure_at_any_position_wins(#[case] position: usize) {
    let (batch, paths) = batch_of(5);
    let failing = paths[position].clone();
    let store = memory().fail_key(failing.clone(), StoreError::Transport("reset".into()));

    let err = Synchronizer::new(&store)
        .run(batch, BatchOp::Upload)
        .await
        .unwrap_err();

    assert_eq!(err.path, failing);
    assert_eq!(err.source, StoreError::Transport("reset".into()));
    assert_eq!(err.progress.completed, 4);
    assert_eq!(err.progress.failed_paths(), vec![failing.as_str()]);
    assert_eq!(store.calls(StoreCall::UploadAsset), 5);
}

#[tokio::test]
async fn second_of_three_uploads_failing_is_the_rejection() {
    let (batch, _) = batch_of(3);
    let store = memory().fail_nth(
        StoreCall::UploadAsset,
        2,
        StoreError::Rejected {
            status: 500,
            message: "disk full".into(),
        },
    );

    let err = Synchronizer::new(&store)
        .run(batch, BatchOp::Upload)
        .await
        .unwrap_err();

    let second = store.call_log()[1].1.clone();
    assert_eq!(err.path, second);
    assert_eq!(
        err.source,
        StoreError::Rejected {
            status: 500,
            message: "disk full".into()
        }
    );
    assert_eq!(err.progress.started, 3);
    assert_eq!(err.progress.completed, 2);
    assert_eq!(err.progress.errors.len(), 1);
    assert_eq!(err.total, 3);
    assert!(err.to_string().contains("disk full"));
}

#[tokio::test]
async fn later_failures_are_recorded_but_do_not_replace_the_first() {
    let (batch, paths) = batch_of(3);
    let store = memory()
        .fail_key(paths[0].clone(), StoreError::Transport("first".into()))
        .fail_key(paths[2].clone(), StoreError::Transport("late".into()))
        .delay_key(paths[2].clone(), Duration::from_millis(50));

    let err = Synchronizer::new(&store)
        .run(batch, BatchOp::Upload)
        .await
        .unwrap_err();

    assert_eq!(err.path, paths[0]);
    assert_eq!(err.source, StoreError::Transport("first".into()));
    assert_eq!(
        err.progress.failed_paths(),
        vec![paths[0].as_str(), paths[2].as_str()]
    );
    assert!(err.unresolved_at_failure >= 1);
}

#[tokio::test]
async fn progress_follows_completion_order() {
    let (batch, paths) = batch_of(2);
    let store = memory().delay_key(paths[0].clone(), Duration::from_millis(50));
    let order = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&order);

    Synchronizer::new(&store)
        .on_progress(move |done, _| seen.lock().unwrap().push(done))
        .run(batch, BatchOp::Upload)
        .await
        .unwrap();

    assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    let stored = store.inner().asset_bytes(&paths[0]).await.unwrap();
    assert_eq!(stored, Bytes::from("pixels-0"));
}
