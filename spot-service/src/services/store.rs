use crate::models::{DeleteResult, InsertResult, Spot};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store client is closed")]
    Closed,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(anyhow::Error::new(err))
    }
}

/// The spot collection. Handlers receive one shared handle through router
/// state; implementations must be safe to call concurrently.
#[async_trait]
pub trait SpotStore: Send + Sync {
    async fn insert(&self, spot: Spot) -> Result<InsertResult, StoreError>;
    async fn list(&self) -> Result<Vec<Spot>, StoreError>;
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Spot>, StoreError>;
    async fn delete_by_id(&self, id: &ObjectId) -> Result<DeleteResult, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
    /// Releases the underlying connections. Best-effort and never fails.
    async fn close(&self);
}

/// Process-local store keeping spots in insertion order.
pub struct InMemorySpotStore {
    spots: Mutex<Vec<Spot>>,
    unavailable: AtomicBool,
    closed: AtomicBool,
}

impl Default for InMemorySpotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySpotStore {
    pub fn new() -> Self {
        Self {
            spots: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent operation fail as if the backend were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "in-memory store marked unavailable"
            )));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Spot>>, StoreError> {
        self.spots
            .lock()
            .map_err(|e| StoreError::Backend(anyhow::anyhow!("In-memory store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl SpotStore for InMemorySpotStore {
    async fn insert(&self, spot: Spot) -> Result<InsertResult, StoreError> {
        self.check_available()?;
        let spot = spot.with_generated_id();
        let inserted_id = spot
            .id()
            .cloned()
            .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("spot has no _id")))?;

        let mut spots = self.lock()?;
        if spots.iter().any(|s| s.id() == Some(&inserted_id)) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "E11000 duplicate key error: _id {}",
                inserted_id
            )));
        }
        spots.push(spot);

        Ok(InsertResult {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn list(&self) -> Result<Vec<Spot>, StoreError> {
        self.check_available()?;
        Ok(self.lock()?.clone())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Spot>, StoreError> {
        self.check_available()?;
        Ok(self.lock()?.iter().find(|s| s.has_id(id)).cloned())
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<DeleteResult, StoreError> {
        self.check_available()?;
        let mut spots = self.lock()?;
        let deleted_count = match spots.iter().position(|s| s.has_id(id)) {
            Some(index) => {
                spots.remove(index);
                1
            }
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
