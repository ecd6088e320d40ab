//! PollingStore - GC 状態のクライアント側キャッシュ
//!
//! # フロー
//! 1. activate() でポーリングタスクを 1 本だけ起動（最初の取得は即時）
//! 2. tick ごとに ApiClient::list_gc_jobs() を呼ぶ
//! 3. 応答を前回スナップショットと突き合わせて差分（added/updated/removed）を計算
//! 4. 購読者に StoreEvent を配送
//!
//! # 停止と世代
//! deactivate() はタイマーを止めるだけで、通信中のリクエストはキャンセルしない。
//! activate/deactivate のたびに世代（generation）を進め、応答を反映する前に
//! 世代を確認することで、停止後に届いた応答を捨てる。
//! 取得は別タスクで走るので、停止したループは応答を待たずにすぐ終わる。
//!
//! # 配送順
//! 反映のたびに revision を進めて Loaded に載せる。配送はロックの外なので、
//! 購読者は自分が見た revision より古いスナップショットを無視する。
//!
//! # エラー
//! 取得失敗は購読者へ LoadFailed として通知し、タイマーはそのまま動かし続ける
//! （次の tick で自己回復する。バックオフはしない）。

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::reconcile::reconcile;
use super::status::StoreStatus;
use crate::domain::{ApiError, GcJobStatus, ListenerId, StoreDiff, StoreEvent};
use crate::ports::{ApiClient, IdGenerator, StoreListener};

/// Poll interval used by the GC job view.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

struct Timer {
    stop: watch::Sender<bool>,
    // Dropped, not aborted: an in-flight request is allowed to finish.
    _handle: JoinHandle<()>,
}

#[derive(Default)]
struct StoreState {
    records: BTreeMap<String, GcJobStatus>,
    generation: u64,
    /// Bumped on every applied response.
    revision: u64,
    timer: Option<Timer>,
    loaded: bool,
    last_error: Option<ApiError>,
}

struct StoreInner {
    api: Arc<dyn ApiClient>,
    ids: Arc<dyn IdGenerator>,
    interval: Duration,
    state: Mutex<StoreState>,
    listeners: RwLock<Vec<(ListenerId, Arc<dyn StoreListener>)>>,
    running_timers: Arc<AtomicUsize>,
}

/// Client-side cache of GC job status records refreshed on a fixed timer.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct PollingStore {
    inner: Arc<StoreInner>,
}

impl PollingStore {
    pub fn new(api: Arc<dyn ApiClient>, ids: Arc<dyn IdGenerator>, interval: Duration) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                api,
                ids,
                interval,
                state: Mutex::new(StoreState::default()),
                listeners: RwLock::new(Vec::new()),
                running_timers: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Start polling. No-op if already active.
    pub async fn activate(&self) {
        let mut state = self.inner.state.lock().await;
        if state.timer.is_some() {
            debug!("store already active");
            return;
        }
        state.generation += 1;
        let generation = state.generation;
        let (stop, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(poll_loop(Arc::clone(&self.inner), generation, stop_rx));
        state.timer = Some(Timer {
            stop,
            _handle: handle,
        });
        debug!(generation, interval_ms = self.inner.interval.as_millis() as u64, "store activated");
    }

    /// Stop polling. Responses still in flight are discarded when they arrive.
    pub async fn deactivate(&self) {
        let mut state = self.inner.state.lock().await;
        if let Some(timer) = state.timer.take() {
            state.generation += 1;
            let _ = timer.stop.send(true);
            debug!(generation = state.generation, "store deactivated");
        }
    }

    pub async fn is_active(&self) -> bool {
        self.inner.state.lock().await.timer.is_some()
    }

    /// Fetch once, outside the timer.
    ///
    /// Returns `Ok(None)` when the response was discarded because the store
    /// was (de)activated while the request was in flight.
    pub async fn load(&self) -> Result<Option<StoreDiff>, ApiError> {
        let generation = self.inner.state.lock().await.generation;
        self.inner.fetch_and_apply(generation).await.transpose()
    }

    /// Current records, ordered by `store`.
    pub async fn records(&self) -> Vec<GcJobStatus> {
        self.inner.state.lock().await.records.values().cloned().collect()
    }

    pub async fn get(&self, store: &str) -> Option<GcJobStatus> {
        self.inner.state.lock().await.records.get(store).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of polling loops currently alive.
    pub fn running_timers(&self) -> usize {
        self.inner.running_timers.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> StoreStatus {
        let state = self.inner.state.lock().await;
        StoreStatus {
            active: state.timer.is_some(),
            loaded: state.loaded,
            generation: state.generation,
            records: state.records.len(),
            running_timers: self.running_timers(),
            last_error: state.last_error.as_ref().map(ToString::to_string),
        }
    }

    pub fn subscribe(&self, listener: Arc<dyn StoreListener>) -> ListenerId {
        let id = self.inner.ids.generate_listener_id();
        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }
}

impl StoreInner {
    async fn is_current(&self, generation: u64) -> bool {
        self.state.lock().await.generation == generation
    }

    /// One fetch + reconcile. `None` means the response was stale and dropped.
    async fn fetch_and_apply(&self, generation: u64) -> Option<Result<StoreDiff, ApiError>> {
        let result = self.api.list_gc_jobs().await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(generation, current = state.generation, "discarding stale response");
            return None;
        }

        match result {
            Ok(jobs) => {
                let diff = reconcile(&mut state.records, jobs);
                state.loaded = true;
                state.last_error = None;
                state.revision += 1;
                let revision = state.revision;
                let records: Vec<GcJobStatus> = state.records.values().cloned().collect();
                drop(state);

                debug!(
                    revision,
                    added = diff.added.len(),
                    updated = diff.updated.len(),
                    removed = diff.removed.len(),
                    "gc status loaded"
                );
                self.emit(&StoreEvent::Loaded {
                    revision,
                    diff: diff.clone(),
                    records,
                });
                Some(Ok(diff))
            }
            Err(err) => {
                state.last_error = Some(err.clone());
                drop(state);

                warn!(error = %err, kind = ?err.kind(), "gc status poll failed");
                self.emit(&StoreEvent::LoadFailed(err.clone()));
                Some(Err(err))
            }
        }
    }

    fn emit(&self, event: &StoreEvent) {
        let listeners: Vec<Arc<dyn StoreListener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener.on_event(event);
        }
    }
}

/// Decrements the running-timer count when the loop exits.
struct TimerGuard(Arc<AtomicUsize>);

impl TimerGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn poll_loop(inner: Arc<StoreInner>, generation: u64, mut stop: watch::Receiver<bool>) {
    let _guard = TimerGuard::new(&inner.running_timers);
    let mut ticker = tokio::time::interval(inner.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            // Err means the sender is gone, which also means stop.
            _ = stop.changed() => break,
        }
        if *stop.borrow() {
            break;
        }

        // Stopping does not cancel the request: it finishes on its own task
        // and the generation check discards the response.
        let fetch = tokio::spawn({
            let inner = Arc::clone(&inner);
            async move {
                // errors are reported to listeners inside; the timer keeps going
                let _ = inner.fetch_and_apply(generation).await;
            }
        });
        tokio::select! {
            _ = fetch => {}
            _ = stop.changed() => break,
        }

        if !inner.is_current(generation).await {
            break;
        }
    }
    debug!(generation, "poll loop stopped");
}
