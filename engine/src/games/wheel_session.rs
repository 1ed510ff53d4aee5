use std::sync::{Arc, Weak};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Serialize, Deserialize};
use shared::candidate::Candidate;
use shared::constants::{DEFAULT_CANDIDATES_FILE, NO_CANDIDATES_ERROR, SPIN_IN_PROGRESS_ERROR};
use shared::shared_wheel_game::*;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::services::selection_store::SelectionStore;
use crate::source::FileSource;

/// What a finished spin landed on
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinOutcome {
    pub index: usize,
    pub total_rotation_degrees: f64,
    pub candidate: Option<Candidate>,  // None while the pool has not loaded
}

struct SessionInner {
    state: SpinState,
    rng: StdRng,
}

/// Drives one wheel through the begin/complete protocol.
///
/// The caller owns the timing: `begin_spin` starts the animation and
/// `complete_spin` is called once the spin duration has elapsed. `spin`
/// bundles both around a `tokio::time::sleep`.
pub struct WheelSession {
    inner: Mutex<SessionInner>,
    store: Arc<SelectionStore>,
    config: EngineConfig,
}

impl WheelSession {
    pub fn new(store: Arc<SelectionStore>, config: EngineConfig) -> Self {
        Self::with_rng(store, config, StdRng::from_entropy())
    }

    pub fn with_rng(store: Arc<SelectionStore>, config: EngineConfig, rng: StdRng) -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                state: SpinState::new(config.segment_count),
                rng,
            }),
            store,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<SelectionStore> {
        &self.store
    }

    /// Loads the pool from `candidates_path`, or `cocktails.json` when unset.
    pub async fn load_configured(&self) -> Result<usize> {
        let path = self
            .config
            .candidates_path
            .clone()
            .unwrap_or_else(|| DEFAULT_CANDIDATES_FILE.into());
        self.store.load(&FileSource::new(path)).await
    }

    pub async fn state(&self) -> SpinState {
        self.inner.lock().await.state.clone()
    }

    /// Starts a spin. `Ok(None)` if one is already in flight; no draw happens then.
    pub async fn begin_spin(&self) -> Result<Option<SpinDraw>> {
        let mut inner = self.inner.lock().await;
        let SessionInner { state, rng } = &mut *inner;

        if state.segment_count == 0 {
            return Err(WheelError::InvalidConfiguration { field: "segment_count", value: 0 }.into());
        }
        if state.is_spinning {
            debug!("{}", SPIN_IN_PROGRESS_ERROR);
            return Ok(None);
        }

        let draw = next_spin(state.accumulated_rotation_degrees, self.config.min_full_turns, rng)?;
        state.start_spin(draw.new_accumulated_degrees);
        debug!(
            "Spin started: +{:.2} degrees, total {:.2}",
            draw.random_addend, draw.new_accumulated_degrees
        );
        Ok(Some(draw))
    }

    /// Resolves the in-flight spin and looks up the winning candidate.
    pub async fn complete_spin(&self) -> Result<SpinOutcome> {
        let (index, total) = {
            let mut inner = self.inner.lock().await;
            let state = &mut inner.state;
            if !state.is_spinning {
                return Err(Error::NoSpinInFlight);
            }

            let total = state.accumulated_rotation_degrees;
            let index = resolve_segment(total, state.segment_count)?;
            debug!(
                "Rotation {:.2} resolved to segment {}/{}",
                total, index, state.segment_count
            );
            state.complete_spin(index);
            (index, total)
        };

        let candidate = self.store.candidate_at(index).await?;
        match &candidate {
            Some(c) => info!("Wheel landed on segment {}: {}", index, c.name),
            None => warn!("Wheel landed on segment {}: {}", index, NO_CANDIDATES_ERROR),
        }

        Ok(SpinOutcome {
            index,
            total_rotation_degrees: total,
            candidate,
        })
    }

    /// Begins a spin, waits out its duration and resolves it.
    pub async fn spin(&self) -> Result<Option<SpinOutcome>> {
        if self.begin_spin().await?.is_none() {
            return Ok(None);
        }
        tokio::time::sleep(self.config.spin_duration).await;
        self.complete_spin().await.map(Some)
    }

    /// A random pick without touching the wheel.
    pub async fn recommend(&self) -> Option<Candidate> {
        self.store.random_candidate().await
    }

    /// Matches the segment count to the loaded pool. Does nothing mid-spin or while empty.
    pub async fn sync_segments_to_pool(&self) -> bool {
        let len = self.store.len().await;
        let mut inner = self.inner.lock().await;
        if len == 0 || inner.state.is_spinning {
            return false;
        }
        if inner.state.segment_count != len {
            info!("Resizing wheel from {} to {} segments", inner.state.segment_count, len);
            inner.state.segment_count = len;
            inner.state.resolved_index = None;
            inner.state.highlight = false;
        }
        true
    }

    /// Blinks the resolved segment every `highlight_interval`. Never resolves anything.
    ///
    /// The task only holds a weak handle and exits once the session is dropped.
    pub fn spawn_highlight_ticker(self: &Arc<Self>) -> JoinHandle<()> {
        let handle: Weak<Self> = Arc::downgrade(self);
        let mut interval = tokio::time::interval(self.config.highlight_interval);
        tokio::spawn(async move {
            loop {
                interval.tick().await;
                let Some(session) = handle.upgrade() else {
                    debug!("Session dropped, stopping highlight ticker");
                    break;
                };
                let mut inner = session.inner.lock().await;
                inner.state.toggle_highlight();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config(segment_count: usize) -> EngineConfig {
        EngineConfig {
            segment_count,
            spin_duration: Duration::from_millis(20),
            highlight_interval: Duration::from_millis(5),
            ..EngineConfig::default()
        }
    }

    async fn loaded_store(count: usize) -> Arc<SelectionStore> {
        let store = Arc::new(SelectionStore::new());
        let list = (0..count).map(|i| Candidate::new(format!("Drink {}", i))).collect();
        store.load_from_list(list).await.unwrap();
        store
    }

    fn session(store: Arc<SelectionStore>, segment_count: usize) -> WheelSession {
        WheelSession::with_rng(store, test_config(segment_count), StdRng::seed_from_u64(42))
    }

    #[tokio::test]
    async fn test_begin_then_complete() {
        let session = session(loaded_store(8).await, 8);

        let draw = session.begin_spin().await.unwrap().unwrap();
        let state = session.state().await;
        assert!(state.is_spinning);
        assert_eq!(state.resolved_index, None);
        assert!(draw.new_accumulated_degrees >= 5.0 * 360.0);

        let outcome = session.complete_spin().await.unwrap();
        assert_eq!(outcome.index, resolve_segment(draw.new_accumulated_degrees, 8).unwrap());
        assert_eq!(outcome.candidate.unwrap().name, format!("Drink {}", outcome.index));

        let state = session.state().await;
        assert!(!state.is_spinning);
        assert_eq!(state.resolved_index, Some(outcome.index));
    }

    #[tokio::test]
    async fn test_respin_while_spinning_is_noop() {
        let session = session(loaded_store(8).await, 8);
        session.begin_spin().await.unwrap().unwrap();
        let before = session.state().await;

        assert!(session.begin_spin().await.unwrap().is_none());
        assert_eq!(session.state().await, before);
    }

    #[tokio::test]
    async fn test_rejected_spin_does_not_draw() {
        // Same seed: a rejected begin must not advance the generator
        let a = session(loaded_store(8).await, 8);
        let b = session(loaded_store(8).await, 8);

        a.begin_spin().await.unwrap();
        a.begin_spin().await.unwrap();
        a.complete_spin().await.unwrap();
        let second_a = a.begin_spin().await.unwrap().unwrap();

        b.begin_spin().await.unwrap();
        b.complete_spin().await.unwrap();
        let second_b = b.begin_spin().await.unwrap().unwrap();

        assert_eq!(second_a, second_b);
    }

    #[tokio::test]
    async fn test_rotation_accumulates() {
        let session = session(loaded_store(8).await, 8);
        let mut previous = 0.0;
        for _ in 0..3 {
            let draw = session.begin_spin().await.unwrap().unwrap();
            assert!(draw.new_accumulated_degrees > previous);
            previous = draw.new_accumulated_degrees;
            session.complete_spin().await.unwrap();
        }
        assert_eq!(session.state().await.accumulated_rotation_degrees, previous);
    }

    #[tokio::test]
    async fn test_complete_without_begin() {
        let session = session(loaded_store(8).await, 8);
        assert!(matches!(session.complete_spin().await, Err(Error::NoSpinInFlight)));
    }

    #[tokio::test]
    async fn test_zero_segments_fails_before_draw() {
        let session = session(loaded_store(8).await, 0);
        assert!(matches!(
            session.begin_spin().await,
            Err(Error::InvalidConfiguration(WheelError::InvalidConfiguration { .. }))
        ));
        assert_eq!(session.state().await.accumulated_rotation_degrees, 0.0);
    }

    #[tokio::test]
    async fn test_unloaded_pool_gives_no_candidate() {
        let session = session(Arc::new(SelectionStore::new()), 8);
        let outcome = session.spin().await.unwrap().unwrap();
        assert!(outcome.index < 8);
        assert!(outcome.candidate.is_none());
    }

    #[tokio::test]
    async fn test_segment_mismatch_surfaces_index_error() {
        // One candidate on an 8-segment wheel: only segment 0 has a match
        let store = loaded_store(1).await;
        let session = session(store, 8);
        let mut saw_error = false;
        for _ in 0..20 {
            match session.spin().await {
                Ok(Some(outcome)) => assert_eq!(outcome.index, 0),
                Err(Error::IndexOutOfRange { len: 1, .. }) => saw_error = true,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(saw_error);
    }

    #[tokio::test]
    async fn test_sync_segments_to_pool() {
        let session = session(loaded_store(3).await, 8);
        assert!(session.sync_segments_to_pool().await);
        assert_eq!(session.state().await.segment_count, 3);

        for _ in 0..10 {
            let outcome = session.spin().await.unwrap().unwrap();
            assert!(outcome.index < 3);
            assert!(outcome.candidate.is_some());
        }
    }

    #[tokio::test]
    async fn test_sync_skipped_for_empty_pool() {
        let session = session(Arc::new(SelectionStore::new()), 8);
        assert!(!session.sync_segments_to_pool().await);
        assert_eq!(session.state().await.segment_count, 8);
    }

    #[tokio::test]
    async fn test_concurrent_spins_resolve_once() {
        let session = Arc::new(session(loaded_store(8).await, 8));
        let first = tokio::spawn({
            let session = session.clone();
            async move { session.spin().await }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(session.spin().await.unwrap().is_none());
        assert!(first.await.unwrap().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_highlight_only_after_resolution() {
        let session = Arc::new(session(loaded_store(8).await, 8));
        let ticker = session.spawn_highlight_ticker();

        session.begin_spin().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let state = session.state().await;
        assert!(!state.highlight);
        assert_eq!(state.resolved_index, None);

        let outcome = session.complete_spin().await.unwrap();
        let mut toggled = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let state = session.state().await;
            assert_eq!(state.resolved_index, Some(outcome.index));
            toggled |= state.highlight;
        }
        assert!(toggled);
        ticker.abort();
    }

    #[tokio::test]
    async fn test_load_configured() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"[{ "name": "Paloma" }, { "name": "Margarita" }]"#).unwrap();

        let config = EngineConfig {
            candidates_path: Some(file.path().to_path_buf()),
            ..test_config(2)
        };
        let session = WheelSession::new(Arc::new(SelectionStore::new()), config);
        assert_eq!(session.load_configured().await.unwrap(), 2);
        assert!(session.store().is_loaded().await);
    }

    #[tokio::test]
    async fn test_highlight_ticker_releases_session() {
        let session = Arc::new(session(loaded_store(8).await, 8));
        let weak = Arc::downgrade(&session);
        let ticker = session.spawn_highlight_ticker();

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(session);

        tokio::time::timeout(Duration::from_millis(200), ticker)
            .await
            .expect("ticker should stop once the session is gone")
            .unwrap();
        assert_eq!(weak.strong_count(), 0);
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_detached_ticker_does_not_keep_session_alive() {
        let session = Arc::new(session(loaded_store(8).await, 8));
        let weak = Arc::downgrade(&session);
        drop(session.spawn_highlight_ticker());
        drop(session);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(weak.strong_count(), 0);
    }

    #[tokio::test]
    async fn test_resolution_is_traced() {
        use std::sync::Mutex as StdMutex;
        use tracing_subscriber::layer::{Context, Layer};
        use tracing_subscriber::prelude::*;

        #[derive(Default)]
        struct Messages(String);

        impl tracing::field::Visit for Messages {
            fn record_debug(&mut self, _field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                self.0.push_str(&format!("{:?}", value));
            }
        }

        struct Capture(Arc<StdMutex<Vec<String>>>);

        impl<S: tracing::Subscriber> Layer<S> for Capture {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                let mut messages = Messages::default();
                event.record(&mut messages);
                if let Ok(mut lines) = self.0.lock() {
                    lines.push(messages.0);
                }
            }
        }

        let lines = Arc::new(StdMutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(Capture(lines.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let session = session(loaded_store(8).await, 8);
        session.begin_spin().await.unwrap();
        let outcome = session.complete_spin().await.unwrap();

        let lines = lines.lock().unwrap();
        let expected = format!("resolved to segment {}/8", outcome.index);
        assert!(lines.iter().any(|line| line.contains(&expected)));
    }

    #[tokio::test]
    async fn test_recommend() {
        let session = session(loaded_store(4).await, 4);
        assert!(session.recommend().await.is_some());

        let empty = WheelSession::new(Arc::new(SelectionStore::new()), test_config(4));
        assert!(empty.recommend().await.is_none());
    }
}
