// Worker pool sizing for batch comparison.

use anyhow::Result;
use tracing::info;

/// Number of workers to use: `requested` if set, else half the cores (minimum 1).
pub fn worker_count(requested: Option<usize>) -> usize {
    match requested {
        Some(jobs) => jobs.max(1),
        None => std::cmp::max(1, num_cpus::get() / 2),
    }
}

/// Initialize the global rayon thread pool.
pub fn init_thread_pool(requested: Option<usize>) -> Result<()> {
    let workers = worker_count(requested);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    info!(
        "Initialized thread pool: {} workers (system has {} cores)",
        workers,
        num_cpus::get()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count() {
        assert_eq!(worker_count(Some(4)), 4);
        assert_eq!(worker_count(Some(0)), 1);
        assert!(worker_count(None) >= 1);
    }
}
