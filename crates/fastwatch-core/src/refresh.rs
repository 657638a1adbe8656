//! Debounced UI-refresh coalescing.
//!
//! Mutations and sync applies can arrive in bursts; each UI surface (widget,
//! complication, tile) wants one redraw per burst, not one per signal. The
//! coalescer is a timer-reset debouncer: every signal resets a single pending
//! deadline, and when a full window passes quietly the downstream refresh
//! fires once.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default debounce window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1000);

/// Fire-and-forget refresh-signal intake with a debounce window.
///
/// Create one instance per UI surface. The background task is the only timer
/// this crate owns; dropping (or [`shutdown`](Self::shutdown)) aborts it.
pub struct RefreshCoalescer {
    tx: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl RefreshCoalescer {
    /// Spawn a coalescer with the default window.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(on_refresh: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::spawn_with_window(DEFAULT_WINDOW, on_refresh)
    }

    /// Spawn a coalescer with an explicit window.
    pub fn spawn_with_window<F>(window: Duration, on_refresh: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let task = tokio::spawn(async move {
            // Outer loop: wait for the first signal of a burst.
            while rx.recv().await.is_some() {
                let mut deadline = Instant::now() + window;
                loop {
                    tokio::select! {
                        signal = rx.recv() => match signal {
                            // A newer signal supersedes the pending one.
                            Some(()) => deadline = Instant::now() + window,
                            None => return,
                        },
                        () = tokio::time::sleep_until(deadline) => {
                            on_refresh();
                            break;
                        }
                    }
                }
            }
        });
        Self { tx, task }
    }

    /// Request a refresh. Non-blocking; safe from any thread or task.
    ///
    /// Signals sent after shutdown are silently dropped.
    pub fn request_update(&self) {
        let _ = self.tx.send(());
    }

    /// Stop the coalescer, cancelling any pending (unfired) refresh.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for RefreshCoalescer {
    fn drop(&mut self) {
        // The debounce timer must not outlive its owner.
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn burst_collapses_to_one_refresh() {
        let (count, on_refresh) = counting();
        let coalescer =
            RefreshCoalescer::spawn_with_window(Duration::from_millis(50), on_refresh);

        for _ in 0..20 {
            coalescer.request_update();
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        coalescer.shutdown();
    }

    #[tokio::test]
    async fn separate_bursts_each_fire() {
        let (count, on_refresh) = counting();
        let coalescer =
            RefreshCoalescer::spawn_with_window(Duration::from_millis(30), on_refresh);

        coalescer.request_update();
        tokio::time::sleep(Duration::from_millis(120)).await;
        coalescer.request_update();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
        coalescer.shutdown();
    }

    #[tokio::test]
    async fn signals_inside_window_extend_the_deadline() {
        let (count, on_refresh) = counting();
        let coalescer =
            RefreshCoalescer::spawn_with_window(Duration::from_millis(80), on_refresh);

        // Keep poking well inside the window; nothing may fire yet.
        for _ in 0..4 {
            coalescer.request_update();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        coalescer.shutdown();
    }

    #[tokio::test]
    async fn no_signals_means_no_refresh() {
        let (count, on_refresh) = counting();
        let coalescer =
            RefreshCoalescer::spawn_with_window(Duration::from_millis(20), on_refresh);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        coalescer.shutdown();
    }

    #[tokio::test]
    async fn shutdown_cancels_pending_refresh() {
        let (count, on_refresh) = counting();
        let coalescer =
            RefreshCoalescer::spawn_with_window(Duration::from_millis(50), on_refresh);

        coalescer.request_update();
        coalescer.shutdown();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
