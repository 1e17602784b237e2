//! Batch execution
//!
//! Runs one job per host over a bounded worker pool. Hosts are
//! deduplicated up front (first occurrence wins) and results come back
//! in the original host order regardless of completion order.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::Result;

/// Remove duplicate hosts, keeping the first occurrence of each.
pub fn dedup_hosts(hosts: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    hosts
        .into_iter()
        .filter(|h| seen.insert(h.clone()))
        .collect()
}

/// Run `worker` once per host, at most `workers` concurrently.
///
/// Each job's failure is isolated in its own `Result`; one failed host
/// never aborts the rest.
pub async fn run_all<F, Fut, T>(
    hosts: Vec<String>,
    workers: usize,
    worker: F,
) -> Vec<(String, Result<T>)>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let hosts = dedup_hosts(hosts);
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let worker = Arc::new(worker);

    let mut handles = Vec::with_capacity(hosts.len());
    for host in hosts {
        let semaphore = Arc::clone(&semaphore);
        let worker = Arc::clone(&worker);
        handles.push(tokio::spawn(async move {
            // Hold the permit for the job's whole lifetime.
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            debug!(host = %host, "batch job start");
            let outcome = worker(host.clone()).await;
            (host, outcome)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(pair) => results.push(pair),
            Err(e) => {
                results.push((
                    "<unknown>".to_string(),
                    Err(crate::Error::Other(format!("batch job panicked: {e}"))),
                ));
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_dedup_preserves_first_occurrence_order() {
        let hosts = vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "a".to_string(),
        ];
        assert_eq!(dedup_hosts(hosts), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_results_keep_host_order() {
        let results = run_all(
            vec!["h1".into(), "h2".into(), "h3".into()],
            2,
            |host| async move { Ok(host.to_uppercase()) },
        )
        .await;

        let hosts: Vec<&str> = results.iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(hosts, vec!["h1", "h2", "h3"]);
        assert_eq!(results[1].1.as_deref().unwrap(), "H2");
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_the_rest() {
        let results = run_all(
            vec!["good".into(), "bad".into(), "also-good".into()],
            2,
            |host| async move {
                if host == "bad" {
                    Err(crate::Error::Connection("refused".into()))
                } else {
                    Ok(())
                }
            },
        )
        .await;

        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_ok());
    }

    #[tokio::test]
    async fn test_worker_bound_is_respected() {
        static RUNNING: AtomicUsize = AtomicUsize::new(0);
        static PEAK: AtomicUsize = AtomicUsize::new(0);

        let hosts: Vec<String> = (0..8).map(|i| format!("h{i}")).collect();
        run_all(hosts, 2, |_host| async move {
            let now = RUNNING.fetch_add(1, Ordering::SeqCst) + 1;
            PEAK.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            RUNNING.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert!(PEAK.load(Ordering::SeqCst) <= 2);
    }
}
