//! Coalescing of rapid filter edits into a single list fetch.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::repository::MeetingReader;
use crate::store::{ListAction, MeetingListStore};

/// Quiet period after the last filter edit before the list is reloaded.
pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(300);

enum Signal<T> {
    Trigger(T),
    Cancel,
}

/// Runs a callback once per burst of triggers, with the latest value.
///
/// Callbacks are spawned and may overlap with later ones. Dropping the
/// debouncer discards a pending value.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Signal<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F, Fut>(quiet: Duration, mut callback: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Signal<T>>();

        let task = tokio::spawn(async move {
            let mut pending: Option<T> = None;
            loop {
                let signal = if pending.is_none() {
                    rx.recv().await
                } else {
                    tokio::select! {
                        signal = rx.recv() => signal,
                        () = tokio::time::sleep(quiet) => {
                            if let Some(value) = pending.take() {
                                tokio::spawn(callback(value));
                            }
                            continue;
                        }
                    }
                };
                match signal {
                    Some(Signal::Trigger(value)) => pending = Some(value),
                    Some(Signal::Cancel) => pending = None,
                    None => return,
                }
            }
        });

        Self { tx, task }
    }

    /// Restarts the quiet period with `value` as the pending value.
    pub fn trigger(&self, value: T) {
        if self.tx.send(Signal::Trigger(value)).is_err() {
            log::warn!("Debouncer stopped, trigger dropped");
        }
    }

    /// Drops the pending value, if any, without running the callback.
    pub fn cancel(&self) {
        if self.tx.send(Signal::Cancel).is_err() {
            log::warn!("Debouncer stopped, cancel dropped");
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Routes filter edits to a store and reloads page 1 once edits settle.
pub struct FilterWatcher<R> {
    store: Arc<MeetingListStore<R>>,
    debouncer: Debouncer<()>,
}

impl<R> FilterWatcher<R>
where
    R: MeetingReader + Send + Sync + 'static,
{
    pub fn new(store: Arc<MeetingListStore<R>>, quiet: Duration) -> Self {
        let target = Arc::clone(&store);
        let debouncer = Debouncer::spawn(quiet, move |()| {
            let store = Arc::clone(&target);
            async move {
                store.fetch(1).await;
            }
        });
        Self { store, debouncer }
    }

    pub fn store(&self) -> &Arc<MeetingListStore<R>> {
        &self.store
    }

    /// Applies a filter edit now and schedules the reload.
    ///
    /// Nothing is scheduled when the action left the filters unchanged or
    /// is not a filter edit.
    pub fn edit(&self, action: ListAction) -> bool {
        let is_edit = action.is_filter_edit();
        let changed = self.store.dispatch(action) && is_edit;
        if changed {
            self.debouncer.trigger(());
        }
        changed
    }

    /// Clears every filter and reloads immediately, dropping a pending reload.
    pub async fn clear(&self) -> bool {
        self.debouncer.cancel();
        self.store.clear_filters().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn burst_fires_once_with_last_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let debouncer = Debouncer::spawn(FILTER_DEBOUNCE, move |value: u32| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(value);
            }
        });

        for value in 1..=5 {
            debouncer.trigger(value);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(*seen.lock().unwrap(), vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_fire_separately() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let debouncer = Debouncer::spawn(FILTER_DEBOUNCE, move |value: u32| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(value);
            }
        });

        debouncer.trigger(1);
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.trigger(2);
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_value() {
        let seen = Arc::new(Mutex::new(Vec::<u32>::new()));
        let sink = Arc::clone(&seen);
        let debouncer = Debouncer::spawn(FILTER_DEBOUNCE, move |value: u32| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(value);
            }
        });

        debouncer.trigger(1);
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(seen.lock().unwrap().is_empty());
    }
}
