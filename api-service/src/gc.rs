use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use allezon_store::RecordStore;
use allezon_types::{Action, SOFT_LIMIT};
use backoff::ExponentialBackoff;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tracing::{debug, error};

const DEFAULT_POOL_SIZE: usize = 10;
const GC_KEY_INTERVAL: Duration = Duration::from_secs(60);

/// The user-profile garbage collector of spec §4.6: one task per
/// action kind, coalescing repeat triggers for the same cookie within
/// `gc_key_interval` and bounding concurrent trims to a fixed pool.
#[derive(Clone)]
pub struct GcPool {
    senders: Arc<HashMap<&'static str, mpsc::Sender<String>>>,
}

struct Dedup {
    in_flight: HashSet<String>,
    last_triggered: HashMap<String, Instant>,
}

impl GcPool {
    pub fn spawn(store: Arc<dyn RecordStore>) -> Self {
        let mut senders = HashMap::new();
        for (name, action) in [("views", Action::View), ("buys", Action::Buy)] {
            let (tx, rx) = mpsc::channel(1024);
            tokio::spawn(run_cleaner(store.clone(), action, rx));
            senders.insert(name, tx);
        }
        Self { senders: Arc::new(senders) }
    }

    /// Enqueues a trim for `cookie`'s `action` bin. Never blocks the
    /// caller past the channel send; a full queue drops the trigger
    /// (the bin will simply be retried on the next ingest past the
    /// threshold).
    pub fn trigger(&self, cookie: String, action: Action) {
        let bin = bin_name(action);
        if let Some(sender) = self.senders.get(bin) {
            if sender.try_send(cookie).is_err() {
                debug!(bin, "gc trigger dropped: queue full or cleaner gone");
            }
        }
    }
}

fn bin_name(action: Action) -> &'static str {
    match action {
        Action::View => "views",
        Action::Buy => "buys",
    }
}

async fn run_cleaner(store: Arc<dyn RecordStore>, action: Action, mut events: mpsc::Receiver<String>) {
    let bin = bin_name(action);
    let dedup = Arc::new(Mutex::new(Dedup { in_flight: HashSet::new(), last_triggered: HashMap::new() }));
    let permits = Arc::new(Semaphore::new(DEFAULT_POOL_SIZE));

    while let Some(cookie) = events.recv().await {
        let mut guard = dedup.lock().await;
        if guard.in_flight.contains(&cookie) {
            continue;
        }
        if let Some(last) = guard.last_triggered.get(&cookie) {
            if last.elapsed() < GC_KEY_INTERVAL {
                continue;
            }
        }
        guard.in_flight.insert(cookie.clone());
        guard.last_triggered.insert(cookie.clone(), Instant::now());
        drop(guard);

        let store = store.clone();
        let dedup = dedup.clone();
        let permits = permits.clone();
        tokio::spawn(async move {
            let _permit = permits.acquire().await.expect("semaphore never closed");
            clean_one(&store, bin, &cookie).await;
            dedup.lock().await.in_flight.remove(&cookie);
        });
    }
}

/// Spec §4.6's trim: read the bin's current size, and if it exceeds
/// `SOFT_LIMIT`, remove the oldest `size - SOFT_LIMIT` entries under
/// the generation read in step one, retrying on CAS mismatch.
async fn clean_one(store: &Arc<dyn RecordStore>, bin: &str, cookie: &str) {
    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(500),
        multiplier: 3.0,
        max_interval: Duration::from_secs(10),
        max_elapsed_time: Some(Duration::from_secs(60)),
        ..ExponentialBackoff::default()
    };

    let outcome = backoff::future::retry(policy, || async {
        let (size, generation) = match store.map_size("user_profiles", cookie, bin).await {
            Ok(result) => result,
            Err(err) if err.is_not_found() => return Ok(()),
            Err(err) => return Err(backoff::Error::transient(err)),
        };
        if size <= SOFT_LIMIT {
            return Ok(());
        }
        match store.map_remove_range("user_profiles", cookie, bin, size - SOFT_LIMIT, generation).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(backoff::Error::transient(err)),
        }
    })
    .await;

    if let Err(err) = outcome {
        error!(cookie, bin, error = %err, "giving up trimming user profile after exhausting retry budget");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allezon_store::InMemoryStore;

    #[tokio::test]
    async fn trims_bin_back_to_soft_limit() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        for i in 0..250 {
            store.map_put("user_profiles", "cookie-a", "views", i, vec![0]).await.unwrap();
        }
        clean_one(&store, "views", "cookie-a").await;
        let (size, _) = store.map_size("user_profiles", "cookie-a", "views").await.unwrap();
        assert_eq!(size, SOFT_LIMIT);
    }

    #[tokio::test]
    async fn missing_cookie_is_a_silent_no_op() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        clean_one(&store, "views", "never-seen").await;
    }

    #[tokio::test]
    async fn repeat_trigger_within_window_is_deduplicated() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        for i in 0..250 {
            store.map_put("user_profiles", "cookie-b", "views", i, vec![0]).await.unwrap();
        }
        let gc = GcPool::spawn(store.clone());
        gc.trigger("cookie-b".to_string(), Action::View);
        gc.trigger("cookie-b".to_string(), Action::View);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let (size, _) = store.map_size("user_profiles", "cookie-b", "views").await.unwrap();
        assert_eq!(size, SOFT_LIMIT);
    }
}
