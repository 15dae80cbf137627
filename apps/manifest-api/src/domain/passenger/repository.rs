//! Passenger Repository Trait
//!
//! Defines the persistence abstraction for passenger records.
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::model::{Passenger, PassengerUpdate};

/// Repository trait for passenger persistence.
///
/// This is a domain interface (port) with two conforming implementations:
/// the in-process volatile store and the CockroachDB-backed durable store.
/// The backend is selected once at startup.
///
/// Update semantics, as a policy decision: `replace_or_create` (PUT) merges
/// the payload onto any existing record and creates the record when the
/// identifier is unknown; `merge_update` (PATCH) performs the same merge but
/// refuses to create. That asymmetry is the only behavioral difference
/// between the two.
#[async_trait]
pub trait PassengerRepository: Send + Sync {
    /// Store a new record under a freshly generated identifier.
    ///
    /// Any identifier declared in the payload is ignored. Returns the
    /// generated identifier.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` on an identifier collision; `Unavailable` on backend
    /// failure.
    async fn create(&self, p: PassengerUpdate) -> Result<Uuid, RepositoryError>;

    /// Fetch the record stored under `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no record exists; `Unavailable` on backend failure.
    async fn find_by_id(&self, id: Uuid) -> Result<Passenger, RepositoryError>;

    /// Merge `p` onto the record at `id`, creating it when absent.
    ///
    /// Never fails with `NotFound`.
    ///
    /// # Errors
    ///
    /// `Conflict` when the durable backend exhausts its transaction retries;
    /// `Unavailable` on backend failure.
    async fn replace_or_create(&self, id: Uuid, p: PassengerUpdate)
    -> Result<(), RepositoryError>;

    /// Merge `p` onto the record at `id`, refusing to create.
    ///
    /// # Errors
    ///
    /// `NotFound` when no record exists; `Conflict` on retry exhaustion;
    /// `Unavailable` on backend failure.
    async fn merge_update(&self, id: Uuid, p: PassengerUpdate) -> Result<(), RepositoryError>;

    /// Remove the record stored under `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no record exists; `Unavailable` on backend failure.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Return a snapshot of all records, in no particular order.
    ///
    /// An empty store yields an empty collection, not an error.
    ///
    /// # Errors
    ///
    /// `Unavailable` on backend failure.
    async fn list(&self) -> Result<Vec<Passenger>, RepositoryError>;
}
