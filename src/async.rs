/// Async utilities.
use std::future::Future;

use itertools::Itertools;
use tokio::task::JoinSet;

use crate::error::BarErr;

const CHUNK_SIZE: usize = 50;

/// try_map spawns a future for each item in the iterator and waits for all of them to complete.
/// If any of the futures return an error, try_map will return that error.
/// The futures are spawned in chunks of 50. The output keeps the input order.
pub async fn try_map<T, I, F, O, Fut>(input: I, f: F) -> Result<Vec<O>, BarErr>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Fut + Send + 'static,
    Fut: Future<Output = Result<O, BarErr>> + Send + 'static,
    T: Send + 'static,
    O: Send + 'static,
{
    let iterator = input.into_iter();
    let (lower_bound, _) = iterator.size_hint();
    let mut output: Vec<(usize, O)> = Vec::with_capacity(lower_bound);

    for chunk in &iterator.enumerate().chunks(CHUNK_SIZE) {
        let mut set = JoinSet::new();
        for (index, item) in chunk {
            let fut = f(item);
            set.spawn(async move { fut.await.map(|val| (index, val)) });
        }

        while let Some(res) = set.join_next().await {
            output.push(res??);
        }
    }

    output.sort_by_key(|(index, _)| *index);
    Ok(output.into_iter().map(|(_, val)| val).collect())
}

/// try_for_each spawns a future for each item in the iterator and waits for all of them to complete.
/// If any of the futures return an error, try_for_each will return that error.
/// The futures are spawned in chunks of 50.
pub async fn try_for_each<T, I, F, Fut>(input: I, f: F) -> Result<(), BarErr>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), BarErr>> + Send + 'static,
    T: Send + 'static,
{
    for chunk in &input.into_iter().chunks(CHUNK_SIZE) {
        let mut set = JoinSet::new();
        for item in chunk {
            set.spawn(f(item));
        }
        while let Some(res) = set.join_next().await {
            let _: () = res??;
        }
    }

    Ok(())
}
