use std::sync::{Arc, Mutex};
use std::time::Duration;

use teller_engine::Debouncer;

const QUANTUM: Duration = Duration::from_millis(20);

fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> RecordFuture) {
    let fired: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let handle = fired.clone();
    let make = move |value: u32| {
        let fired = handle.clone();
        Box::pin(async move {
            fired.lock().unwrap().push(value);
        }) as RecordFuture
    };
    (fired, make)
}

type RecordFuture = std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>;

#[tokio::test]
async fn only_the_last_call_within_the_quantum_fires() {
    let (fired, make) = recorder();
    let mut debounce = Debouncer::new(QUANTUM);

    debounce.schedule(make(1));
    debounce.schedule(make(2));
    debounce.schedule(make(3));

    tokio::time::sleep(QUANTUM * 4).await;
    assert_eq!(*fired.lock().unwrap(), vec![3]);
}

#[tokio::test]
async fn calls_in_separate_quanta_all_fire() {
    let (fired, make) = recorder();
    let mut debounce = Debouncer::new(QUANTUM);

    debounce.schedule(make(1));
    tokio::time::sleep(QUANTUM * 4).await;
    debounce.schedule(make(2));
    tokio::time::sleep(QUANTUM * 4).await;

    assert_eq!(*fired.lock().unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn cancel_drops_the_pending_task() {
    let (fired, make) = recorder();
    let mut debounce = Debouncer::new(QUANTUM);

    debounce.schedule(make(1));
    debounce.cancel();

    tokio::time::sleep(QUANTUM * 4).await;
    assert!(fired.lock().unwrap().is_empty());
}

#[tokio::test]
async fn dropping_the_debouncer_cancels() {
    let (fired, make) = recorder();
    {
        let mut debounce = Debouncer::new(QUANTUM);
        debounce.schedule(make(1));
    }

    tokio::time::sleep(QUANTUM * 4).await;
    assert!(fired.lock().unwrap().is_empty());
}
