//! In-memory passenger repository.
//!
//! A single reader/writer lock over a map. Writers serialize against each
//! other and against readers; readers run concurrently. Lock hold time is one
//! map access plus a merge, so no operation blocks for longer than a map
//! touch, and a merge is atomic with respect to every reader.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::passenger::{
    Passenger, PassengerRepository, PassengerUpdate, RepositoryError, merge,
};

/// In-memory implementation of [`PassengerRepository`].
///
/// State does not survive the process. Suitable for development and testing,
/// selectable in production wiring where durability is not required.
#[derive(Debug, Default)]
pub struct InMemoryPassengerRepository {
    records: RwLock<HashMap<String, Passenger>>,
}

impl InMemoryPassengerRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PassengerRepository for InMemoryPassengerRepository {
    async fn create(&self, p: PassengerUpdate) -> Result<Uuid, RepositoryError> {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let id = Uuid::new_v4();
        if records.contains_key(&id.to_string()) {
            return Err(RepositoryError::AlreadyExists { id });
        }
        records.insert(id.to_string(), Passenger::from_update(id, &p));
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Passenger, RepositoryError> {
        let records = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        records
            .get(&id.to_string())
            .cloned()
            .ok_or(RepositoryError::NotFound { id })
    }

    async fn replace_or_create(
        &self,
        id: Uuid,
        p: PassengerUpdate,
    ) -> Result<(), RepositoryError> {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let stored = match records.get(&id.to_string()) {
            Some(existing) => merge(existing, &p),
            None => Passenger::from_update(id, &p),
        };
        records.insert(id.to_string(), stored);
        Ok(())
    }

    async fn merge_update(&self, id: Uuid, p: PassengerUpdate) -> Result<(), RepositoryError> {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let existing = records
            .get(&id.to_string())
            .ok_or(RepositoryError::NotFound { id })?;
        let merged = merge(existing, &p);
        records.insert(id.to_string(), merged);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        records
            .remove(&id.to_string())
            .map(|_| ())
            .ok_or(RepositoryError::NotFound { id })
    }

    async fn list(&self) -> Result<Vec<Passenger>, RepositoryError> {
        let records = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(records.values().cloned().collect())
    }
}
