use aduana::{config::Config, error_time, info_time, process::process_batch, Result};
use chrono::Local;

#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Local::now();
    let config = Config::from_env();

    // Nothing is persisted yet, the rows are only counted.
    match process_batch(&config).await {
        Ok(records) => {
            info_time!(start_time, "Full program time: {} rows", records.len());
            Ok(())
        }
        Err(e) => {
            error_time!(start_time, "Batch aborted: {e}");
            Err(e)
        }
    }
}
