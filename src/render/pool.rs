use log::{error, info};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::FailurePolicy;
use crate::error::RenderError;

/// Runs `work` once per job on at most `workers` concurrent tasks.
///
/// Jobs write disjoint outputs, so completion order does not matter. Under
/// `FailFast` the first failure cancels whatever is still queued or running;
/// under `Collect` every job runs and all failures come back together.
/// Files written by finished jobs are left in place either way.
pub async fn dispatch<T, F, Fut>(
    jobs: Vec<T>,
    workers: usize,
    policy: FailurePolicy,
    work: F,
) -> Result<(), RenderError>
where
    T: Display + Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), RenderError>> + Send + 'static,
{
    let total = jobs.len();
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut set = JoinSet::new();

    for job in jobs {
        let unit = job.to_string();
        let semaphore = semaphore.clone();
        let task = work(job);
        set.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return Err(RenderError::Worker {
                    unit,
                    message: "worker pool closed".to_string(),
                });
            };
            task.await.map_err(|source| RenderError::Unit {
                unit,
                source: Box::new(source),
            })
        });
    }

    let mut failures = Vec::new();
    while let Some(joined) = set.join_next().await {
        let outcome = joined.unwrap_or_else(|e| {
            Err(RenderError::Worker {
                unit: "render worker".to_string(),
                message: e.to_string(),
            })
        });
        let Err(e) = outcome else {
            continue;
        };
        error!("{}", e);
        match policy {
            FailurePolicy::FailFast => {
                set.abort_all();
                return Err(e);
            }
            FailurePolicy::Collect => failures.push(e),
        }
    }

    if failures.is_empty() {
        info!("Completed {} render unit(s)", total);
        Ok(())
    } else {
        Err(RenderError::Batch(failures))
    }
}
