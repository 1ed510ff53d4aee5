use std::sync::Arc;

use rand::seq::SliceRandom;
use shared::candidate::Candidate;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{Error, LoadError, Result};
use crate::source::{decode_candidates, validate_candidates, ByteSource};

/// Owns the candidate pool.
///
/// Loads decode the whole document before taking the write lock and then
/// swap the snapshot in one step, so readers see either the old pool or the
/// new one. A failed load leaves the current pool untouched.
#[derive(Debug, Default)]
pub struct SelectionStore {
    pool: RwLock<Arc<Vec<Candidate>>>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load<S: ByteSource>(&self, source: &S) -> Result<usize> {
        let origin = source.describe();

        let decoded = match source.read_all().await {
            Ok(bytes) => decode_candidates(&bytes),
            Err(e) => Err(LoadError::from(e)),
        };

        match decoded {
            Ok(candidates) => Ok(self.replace(candidates, &origin).await),
            Err(e) => {
                warn!("Failed to load candidates from {}: {}", origin, e);
                Err(Error::LoadFailure(e))
            }
        }
    }

    /// Installs an already-decoded list, e.g. one injected by a test or a bundle.
    pub async fn load_from_list(&self, candidates: Vec<Candidate>) -> Result<usize> {
        if let Err(e) = validate_candidates(&candidates) {
            warn!("Rejected injected candidate list: {}", e);
            return Err(Error::LoadFailure(e));
        }
        Ok(self.replace(candidates, "injected list").await)
    }

    async fn replace(&self, candidates: Vec<Candidate>, origin: &str) -> usize {
        let count = candidates.len();
        *self.pool.write().await = Arc::new(candidates);
        info!("Loaded {} candidates from {}", count, origin);
        count
    }

    pub async fn snapshot(&self) -> Arc<Vec<Candidate>> {
        self.pool.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.pool.read().await.len()
    }

    pub async fn is_loaded(&self) -> bool {
        !self.pool.read().await.is_empty()
    }

    pub async fn random_candidate(&self) -> Option<Candidate> {
        let pool = self.snapshot().await;
        pool.choose(&mut rand::thread_rng()).cloned()
    }

    /// `Ok(None)` while the pool is empty; out-of-range on a loaded pool is an error.
    pub async fn candidate_at(&self, index: usize) -> Result<Option<Candidate>> {
        let pool = self.snapshot().await;
        if pool.is_empty() {
            return Ok(None);
        }
        pool.get(index)
            .cloned()
            .map(Some)
            .ok_or(Error::IndexOutOfRange { index, len: pool.len() })
    }
}
