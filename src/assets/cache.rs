//! Sprite cache with a readiness gate
//!
//! Slot lifecycle per identifier: not requested -> loading -> loaded. A
//! loaded slot never changes again. Fetch threads only send results back;
//! the cache applies them on the main thread in `poll`.
//!
//! A fetch that fails leaves its slot loading forever, so readiness is never
//! reached. There is no retry or timeout; failures are logged and listed by
//! `failed()`.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::fetch::ImageFetcher;
use super::{Sprite, SpriteHandle};
use crate::error::LoadError;

/// Result of a cache lookup
#[derive(Debug, Clone)]
pub enum Resource {
    /// Never requested
    Missing,
    /// Requested, not arrived yet
    Loading,
    Loaded(SpriteHandle),
}

impl Resource {
    pub fn into_handle(self) -> Option<SpriteHandle> {
        match self {
            Resource::Loaded(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Resource::Loaded(_))
    }
}

#[derive(Debug)]
enum Slot {
    Loading,
    Loaded(SpriteHandle),
}

struct Completion {
    id: String,
    result: Result<Sprite, LoadError>,
}

type ReadyCallback = Box<dyn FnOnce()>;

/// Sprite cache; create one per process and pass it down
pub struct ResourceCache {
    fetcher: Arc<dyn ImageFetcher>,
    slots: HashMap<String, Slot>,
    ready_callbacks: Vec<ReadyCallback>,
    completions_tx: Sender<Completion>,
    completions_rx: Receiver<Completion>,
    failed: Vec<String>,
}

impl ResourceCache {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        let (completions_tx, completions_rx) = channel();
        Self {
            fetcher,
            slots: HashMap::new(),
            ready_callbacks: Vec::new(),
            completions_tx,
            completions_rx,
            failed: Vec::new(),
        }
    }

    /// Request several sprites
    pub fn load<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.load_one(id.as_ref());
        }
    }

    /// Request one sprite; no-op if it is already loading or loaded
    pub fn load_one(&mut self, id: &str) {
        if self.slots.contains_key(id) {
            return;
        }
        self.slots.insert(id.to_string(), Slot::Loading);

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.completions_tx.clone();
        let thread_id = id.to_string();
        let spawned = thread::Builder::new()
            .name(format!("fetch {}", id))
            .spawn(move || {
                let result = fetcher.fetch(&thread_id);
                // The cache may already be gone
                let _ = tx.send(Completion { id: thread_id, result });
            });

        if let Err(e) = spawned {
            log::error!("Could not start fetch for {}: {}", id, e);
            self.failed.push(id.to_string());
        } else {
            log::debug!("Fetching {}", id);
        }
    }

    /// Current state of a slot; never blocks
    pub fn get(&self, id: &str) -> Resource {
        match self.slots.get(id) {
            None => Resource::Missing,
            Some(Slot::Loading) => Resource::Loading,
            Some(Slot::Loaded(handle)) => Resource::Loaded(Arc::clone(handle)),
        }
    }

    /// Borrow a loaded sprite
    pub fn sprite(&self, id: &str) -> Option<&Sprite> {
        match self.slots.get(id) {
            Some(Slot::Loaded(handle)) => Some(handle.as_ref()),
            _ => None,
        }
    }

    /// Register a callback for the next time every requested sprite has loaded
    ///
    /// It runs on the first completion that leaves the cache ready. If the
    /// cache is ready already it waits for a later completion; it does not
    /// run immediately.
    pub fn on_ready(&mut self, callback: impl FnOnce() + 'static) {
        self.ready_callbacks.push(Box::new(callback));
    }

    /// True when no slot is still loading (an empty cache is ready)
    pub fn is_ready(&self) -> bool {
        !self.slots.values().any(|slot| matches!(slot, Slot::Loading))
    }

    /// Identifiers whose fetch failed
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Number of requested identifiers
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Apply every completion that has arrived; returns how many
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Wait up to `timeout` for a completion, then apply everything pending
    pub fn poll_timeout(&mut self, timeout: Duration) -> usize {
        match self.completions_rx.recv_timeout(timeout) {
            Ok(completion) => {
                self.apply(completion);
                1 + self.poll()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn apply(&mut self, completion: Completion) {
        let Completion { id, result } = completion;
        match result {
            Ok(sprite) => {
                if let Some(slot) = self.slots.get_mut(&id) {
                    if matches!(slot, Slot::Loading) {
                        *slot = Slot::Loaded(Arc::new(sprite));
                        log::debug!("Loaded {}", id);
                    }
                }
                if self.is_ready() {
                    self.fire_ready();
                }
            }
            Err(e) => {
                log::error!("Failed to load {}: {} (game will not start)", id, e);
                self.failed.push(id);
            }
        }
    }

    fn fire_ready(&mut self) {
        let callbacks = std::mem::take(&mut self.ready_callbacks);
        if !callbacks.is_empty() {
            log::info!("All {} sprites loaded", self.slots.len());
        }
        for callback in callbacks {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::PlaceholderFetcher;
    use image::{Rgba, RgbaImage};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Mutex;
    use std::sync::mpsc::SyncSender;

    const WAIT: Duration = Duration::from_secs(5);

    /// Holds each fetch until the test releases it
    #[derive(Default)]
    struct GatedFetcher {
        gates: Mutex<HashMap<String, Receiver<()>>>,
    }

    impl GatedFetcher {
        fn gate(&self, id: &str) -> SyncSender<()> {
            let (tx, rx) = std::sync::mpsc::sync_channel(1);
            self.gates.lock().unwrap().insert(id.to_string(), rx);
            tx
        }
    }

    impl ImageFetcher for GatedFetcher {
        fn fetch(&self, id: &str) -> Result<Sprite, LoadError> {
            let gate = self.gates.lock().unwrap().remove(id);
            match gate {
                Some(rx) if rx.recv().is_ok() => {
                    Ok(Sprite::new(id, RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]))))
                }
                _ => Err(LoadError::Unknown(id.to_string())),
            }
        }
    }

    fn counter() -> (Rc<RefCell<Vec<&'static str>>>, Rc<RefCell<Vec<&'static str>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (Rc::clone(&log), log)
    }

    #[test]
    fn test_empty_cache_is_ready() {
        let cache = ResourceCache::new(Arc::new(PlaceholderFetcher));
        assert!(cache.is_ready());
        assert!(matches!(cache.get("a.png"), Resource::Missing));
    }

    #[test]
    fn test_ready_fires_once_after_last_load() {
        let fetcher = Arc::new(GatedFetcher::default());
        let gate_a = fetcher.gate("a.png");
        let gate_b = fetcher.gate("b.png");

        let mut cache = ResourceCache::new(fetcher.clone());
        cache.load(["a.png", "b.png"]);
        let (calls, seen) = counter();
        cache.on_ready(move || calls.borrow_mut().push("ready"));

        assert!(!cache.is_ready());
        assert!(matches!(cache.get("a.png"), Resource::Loading));

        gate_a.send(()).unwrap();
        assert_eq!(cache.poll_timeout(WAIT), 1);
        assert!(cache.get("a.png").is_loaded());
        assert!(!cache.is_ready());
        assert!(seen.borrow().is_empty());

        gate_b.send(()).unwrap();
        assert_eq!(cache.poll_timeout(WAIT), 1);
        assert!(cache.is_ready());
        assert_eq!(*seen.borrow(), vec!["ready"]);

        // Nothing left to complete; the callback does not run again
        assert_eq!(cache.poll(), 0);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let mut cache = ResourceCache::new(Arc::new(PlaceholderFetcher));
        let (first, seen) = counter();
        let second = Rc::clone(&seen);
        cache.load_one(crate::sprites::GRASS);
        cache.on_ready(move || first.borrow_mut().push("first"));
        cache.on_ready(move || second.borrow_mut().push("second"));

        cache.poll_timeout(WAIT);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_late_registration_waits_for_next_completion() {
        let mut cache = ResourceCache::new(Arc::new(PlaceholderFetcher));
        cache.load_one(crate::sprites::GRASS);
        cache.poll_timeout(WAIT);
        assert!(cache.is_ready());

        let (calls, seen) = counter();
        cache.on_ready(move || calls.borrow_mut().push("late"));
        cache.poll();
        assert!(seen.borrow().is_empty());

        cache.load_one(crate::sprites::STONE);
        cache.poll_timeout(WAIT);
        assert_eq!(*seen.borrow(), vec!["late"]);
    }

    #[test]
    fn test_handles_are_stable() {
        let mut cache = ResourceCache::new(Arc::new(PlaceholderFetcher));
        cache.load(crate::sprites::ALL);
        while !cache.is_ready() {
            assert!(cache.poll_timeout(WAIT) > 0);
        }

        let first = cache.get(crate::sprites::ENEMY).into_handle().unwrap();
        cache.load_one(crate::sprites::ENEMY);
        cache.poll();
        let second = cache.get(crate::sprites::ENEMY).into_handle().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), crate::sprites::ALL.len());
    }

    #[test]
    fn test_repeat_load_is_noop() {
        let fetcher = Arc::new(GatedFetcher::default());
        let gate = fetcher.gate("a.png");
        let mut cache = ResourceCache::new(fetcher.clone());

        cache.load_one("a.png");
        cache.load_one("a.png");
        assert_eq!(cache.len(), 1);

        gate.send(()).unwrap();
        assert_eq!(cache.poll_timeout(WAIT), 1);
        // A second fetch would have found no gate and reported a failure
        assert_eq!(cache.poll_timeout(Duration::from_millis(50)), 0);
        assert!(cache.failed().is_empty());
    }

    #[test]
    fn test_failed_fetch_stalls_readiness() {
        let mut cache = ResourceCache::new(Arc::new(PlaceholderFetcher));
        let (calls, seen) = counter();
        cache.load(["boss.png", crate::sprites::GRASS]);
        cache.on_ready(move || calls.borrow_mut().push("ready"));

        let mut applied = 0;
        while applied < 2 {
            let n = cache.poll_timeout(WAIT);
            assert!(n > 0);
            applied += n;
        }

        assert!(!cache.is_ready());
        assert!(matches!(cache.get("boss.png"), Resource::Loading));
        assert_eq!(cache.failed(), ["boss.png".to_string()]);
        assert!(seen.borrow().is_empty());
    }
}
