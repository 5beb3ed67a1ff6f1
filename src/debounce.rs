// Debounced filter controls
//
// The delayed value follows the raw value once it has stopped changing for
// the configured delay. Every change restarts the timer, so a burst of
// keystrokes produces a single update after the last one.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::config::FilterConfig;

// A pending one-shot callback. Dropping the handle cancels it.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct Timer;

impl Timer {
    pub fn start<F>(delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        TimerHandle { task }
    }

    pub fn cancel(handle: TimerHandle) {
        drop(handle);
    }
}

pub struct Debounced<T> {
    delay: Duration,
    sender: Arc<watch::Sender<T>>,
    pending: Mutex<Option<TimerHandle>>,
    updates: Arc<AtomicUsize>,
}

impl<T> Debounced<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            delay,
            sender: Arc::new(sender),
            pending: Mutex::new(None),
            updates: Arc::new(AtomicUsize::new(0)),
        }
    }

    // Schedules `value` to become current after the delay, replacing any
    // value still waiting.
    pub fn set(&self, value: T) {
        let sender = Arc::clone(&self.sender);
        let updates = Arc::clone(&self.updates);
        let handle = Timer::start(self.delay, move || {
            sender.send_replace(value);
            updates.fetch_add(1, Ordering::SeqCst);
        });

        if let Some(previous) = self.pending.lock().replace(handle) {
            if !previous.is_finished() {
                trace!("Superseding pending debounced update");
            }
            Timer::cancel(previous);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> T {
        self.sender.borrow().clone()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().take() {
            Timer::cancel(handle);
        }
    }
}

// State behind a list page's filter bar: the search box as typed, the
// selected filter, and the search text the list query is bound to.
pub struct FilterControls<F> {
    search: RwLock<String>,
    filter: RwLock<F>,
    delayed_search: Debounced<String>,
}

impl<F> FilterControls<F>
where
    F: Clone + Send + Sync + 'static,
{
    pub fn new(filter: F, config: &FilterConfig) -> Self {
        Self {
            search: RwLock::new(String::new()),
            filter: RwLock::new(filter),
            delayed_search: Debounced::new(String::new(), config.debounce),
        }
    }

    pub fn set_search(&self, text: impl Into<String>) {
        let text = text.into();
        *self.search.write() = text.clone();
        self.delayed_search.set(text);
    }

    pub fn search(&self) -> String {
        self.search.read().clone()
    }

    pub fn set_filter(&self, filter: F) {
        *self.filter.write() = filter;
    }

    pub fn filter(&self) -> F {
        self.filter.read().clone()
    }

    pub fn debounced_search(&self) -> String {
        self.delayed_search.current()
    }

    pub fn subscribe_search(&self) -> watch::Receiver<String> {
        self.delayed_search.subscribe()
    }

    pub fn search_update_count(&self) -> usize {
        self.delayed_search.update_count()
    }

    // Dropping the controls has the same effect
    pub fn teardown(&self) {
        self.delayed_search.cancel();
    }
}
