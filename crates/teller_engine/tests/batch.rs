use std::sync::{Arc, Mutex};
use std::time::Duration;

use teller_engine::run_batched;

type EventLog = Arc<Mutex<Vec<(&'static str, usize)>>>;

fn op_with_log(
    log: &EventLog,
    fail_on: Option<usize>,
) -> impl FnMut(usize) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<usize, String>> + Send>>
{
    let log = log.clone();
    move |item| {
        let log = log.clone();
        Box::pin(async move {
            log.lock().unwrap().push(("start", item));
            tokio::time::sleep(Duration::from_millis(5)).await;
            log.lock().unwrap().push(("done", item));
            if fail_on == Some(item) {
                Err(format!("item {item} failed"))
            } else {
                Ok(item)
            }
        })
    }
}

fn event_position(log: &[(&str, usize)], kind: &str, item: usize) -> usize {
    log.iter()
        .position(|entry| *entry == (kind, item))
        .unwrap_or_else(|| panic!("no {kind} event for item {item}"))
}

#[tokio::test]
async fn twelve_items_run_as_three_strict_chunks() {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));

    let results = run_batched((0..12).collect(), 5, op_with_log(&log, None))
        .await
        .expect("no failures");

    assert_eq!(results, (0..12).collect::<Vec<_>>());

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 24);
    // Chunk 2 (items 5..10) must not start before every item of chunk 1
    // settled, and likewise for chunk 3 (items 10..12).
    for earlier in 0..5 {
        for later in 5..10 {
            assert!(
                event_position(&log, "done", earlier) < event_position(&log, "start", later),
                "item {later} started before item {earlier} settled"
            );
        }
    }
    for earlier in 5..10 {
        for later in 10..12 {
            assert!(event_position(&log, "done", earlier) < event_position(&log, "start", later));
        }
    }
}

#[tokio::test]
async fn failure_stops_after_the_failing_chunk() {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));

    let error = run_batched((0..12).collect(), 5, op_with_log(&log, Some(2)))
        .await
        .expect_err("item 2 fails");

    assert_eq!(error, "item 2 failed");

    let log = log.lock().unwrap();
    // The whole first chunk settles, including items after the failure.
    for item in 0..5 {
        assert!(log.contains(&("done", item)));
    }
    // Later chunks never start; completed work is not undone.
    assert!(!log.iter().any(|(kind, item)| *kind == "start" && *item >= 5));
}

#[tokio::test]
async fn short_input_is_a_single_chunk() {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));

    let results = run_batched(vec![1, 2, 3], 5, op_with_log(&log, None))
        .await
        .expect("no failures");

    assert_eq!(results, vec![1, 2, 3]);
    assert_eq!(log.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn zero_concurrency_still_makes_progress() {
    let results = run_batched(vec![1, 2], 0, |item| async move { Ok::<_, String>(item * 10) })
        .await
        .expect("no failures");

    assert_eq!(results, vec![10, 20]);
}

#[tokio::test]
async fn empty_input_yields_empty_output() {
    let results = run_batched(Vec::<usize>::new(), 5, |item| async move {
        Ok::<_, String>(item)
    })
    .await
    .expect("no failures");

    assert!(results.is_empty());
}
