use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::sync::Notify;

/// Work queue shared by one job's workers.
///
/// Every `push` leaves an item outstanding until the worker that dequeued it
/// calls `task_done`; the frontier closes itself once the outstanding count
/// drains to zero. That drain is the job's termination barrier: a closed
/// frontier yields `None` to every worker, abandoning anything still queued.
pub struct Frontier {
    queue: Mutex<VecDeque<String>>,
    outstanding: AtomicUsize,
    closed: AtomicBool,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            outstanding: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Enqueue a URL. Dedup and budget admission are the caller's job.
    pub fn push(&self, url: String) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().unwrap().push_back(url);
        self.notify.notify_waiters();
    }

    /// Next URL to fetch, or `None` once the frontier is closed. Suspends
    /// while the queue is empty but other workers may still produce work.
    pub async fn next(&self) -> Option<String> {
        loop {
            // Arm the wakeup before checking state so a push or close that
            // lands in between cannot be missed.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.closed.load(Ordering::SeqCst) {
                return None;
            }
            if let Some(url) = self.queue.lock().unwrap().pop_front() {
                return Some(url);
            }

            notified.await;
        }
    }

    /// Acknowledge one dequeued URL as fully processed, including any links
    /// it enqueued. Closes the frontier when the last outstanding item
    /// drains.
    pub fn task_done(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.close();
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn drains_then_closes() {
        let frontier = Frontier::new();
        frontier.push("a".into());
        frontier.push("b".into());

        assert_eq!(frontier.next().await.as_deref(), Some("a"));
        frontier.task_done();
        assert_eq!(frontier.next().await.as_deref(), Some("b"));
        frontier.task_done();

        assert_eq!(frontier.next().await, None);
    }

    #[tokio::test]
    async fn close_abandons_queued_work() {
        let frontier = Frontier::new();
        frontier.push("a".into());
        frontier.close();
        assert_eq!(frontier.next().await, None);
    }

    #[tokio::test]
    async fn waiting_worker_wakes_on_push() {
        let frontier = Arc::new(Frontier::new());

        let waiter = {
            let frontier = frontier.clone();
            tokio::spawn(async move { frontier.next().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        frontier.push("late".into());
        assert_eq!(waiter.await.unwrap().as_deref(), Some("late"));
    }

    #[tokio::test]
    async fn waiting_worker_wakes_on_drain() {
        let frontier = Arc::new(Frontier::new());
        frontier.push("only".into());

        let idle = {
            let frontier = frontier.clone();
            tokio::spawn(async move {
                // Steals nothing; the queue is emptied below before this
                // task first polls.
                tokio::time::sleep(Duration::from_millis(20)).await;
                frontier.next().await
            })
        };

        assert_eq!(frontier.next().await.as_deref(), Some("only"));
        frontier.task_done();
        assert_eq!(idle.await.unwrap(), None);
    }
}
