use std::sync::Arc;

use chrono::Local;
use tokio::{sync::Semaphore, task::JoinHandle};

use crate::config::Config;
use crate::payload::PayloadSource;
use crate::request::{Fetcher, HttpTransport, Transport};
use crate::{info_time, Record, Result, POSITIONS, WORKERS, YEAR};

/// Runs the fixed batch against the configured API and returns every row.
pub async fn process_batch(config: &Config) -> Result<Vec<Record>> {
    let start_time = Local::now();
    info_time!("Started fetching {} positions for {YEAR}", POSITIONS.len());

    let transport = HttpTransport::new(config.base_url.clone())?;
    let fetcher = Arc::new(Fetcher::new(
        transport,
        PayloadSource::new(config.template_path.clone()),
    ));

    let records = fetch_all_positions(fetcher, YEAR, &POSITIONS, WORKERS).await?;
    info_time!(start_time, "Finished ALL positions: {} rows", records.len());

    Ok(records)
}

/// Fetches every position for `year`, at most `workers` at a time.
///
/// The rows come back grouped by position, in the order of `positions`, no matter
/// which fetch finishes first. The first failed fetch (in that same order) is
/// returned as the error; fetches still running are left to finish on their own.
pub async fn fetch_all_positions<T>(
    fetcher: Arc<Fetcher<T>>,
    year: &str,
    positions: &[&str],
    workers: usize,
) -> Result<Vec<Record>>
where
    T: Transport + 'static,
{
    let pool = Arc::new(Semaphore::new(workers.max(1)));

    let handles: Vec<JoinHandle<Result<Vec<Record>>>> = positions
        .iter()
        .map(|position| {
            let fetcher = fetcher.clone();
            let pool = pool.clone();
            let year = year.to_string();
            let position = position.to_string();

            tokio::spawn(async move {
                let _permit = pool.acquire_owned().await?;
                fetcher.fetch_all(&year, &position).await
            })
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        let rows = handle.await??;
        all.extend(rows);
    }
    Ok(all)
}
