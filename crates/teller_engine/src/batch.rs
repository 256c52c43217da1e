use std::future::Future;

use futures_util::future::join_all;

/// Chunk size used by the workflows when batch-creating entities.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 5;

/// Runs `op` over `items` with at most `concurrency` operations in flight.
///
/// Items are taken in consecutive chunks of `concurrency`; every operation
/// of a chunk is issued together and the next chunk never starts before the
/// current one has fully settled. No ordering is guaranteed within a chunk,
/// but results come back in item order.
///
/// If any operation fails, the call returns the first failure of that chunk
/// after the chunk settles. Work already completed is not undone; callers
/// that need partial progress across the failure boundary record it as a
/// side effect of `op`.
pub async fn run_batched<T, R, E, F, Fut>(
    items: Vec<T>,
    concurrency: usize,
    mut op: F,
) -> Result<Vec<R>, E>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let concurrency = concurrency.max(1);
    let mut results = Vec::with_capacity(items.len());
    let mut remaining = items.into_iter();

    loop {
        let chunk: Vec<Fut> = remaining.by_ref().take(concurrency).map(&mut op).collect();
        if chunk.is_empty() {
            break;
        }
        let mut first_error = None;
        for outcome in join_all(chunk).await {
            match outcome {
                Ok(value) => results.push(value),
                Err(error) if first_error.is_none() => first_error = Some(error),
                Err(_) => {}
            }
        }
        if let Some(error) = first_error {
            return Err(error);
        }
    }

    Ok(results)
}
