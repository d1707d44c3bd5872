//! Starts and supervises the server's long-running background tasks, and
//! owns the shutdown broadcast all of them select on.

use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;

/// Spawn `make_future` under supervision: if it exits (by panicking or
/// returning) before shutdown is requested, it is restarted after a short
/// backoff. `shutdown_tx` firing aborts the running task and stops restarts.
pub fn spawn_supervised_loop<F, Fut>(name: &'static str, shutdown_tx: broadcast::Sender<()>, make_future: F)
where
    F: Fn(broadcast::Receiver<()>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_tx.subscribe();
        loop {
            let task_shutdown = shutdown_tx.subscribe();
            let handle = tokio::spawn(make_future(task_shutdown));
            tokio::pin!(handle);
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    handle.as_mut().abort();
                    break;
                }
                result = &mut handle => {
                    match result {
                        Ok(_) => tracing::warn!("{} loop exited unexpectedly", name),
                        Err(err) => tracing::error!("{} loop crashed: {}", name, err),
                    }
                }
            }

            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            tracing::warn!("Restarting {} loop in 1s", name);
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    });
}

/// Background sweep marking degraded/offline drones on a low-frequency tick.
pub async fn run_registry_sweep(
    registry: std::sync::Arc<crate::state::DroneRegistry>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            _ = ticker.tick() => registry.tick_timeouts(),
        }
    }
}
