//! Passenger service: identifier discipline, deadlines, error narrowing.
//!
//! The service is the only layer callers talk to. It forwards to the store
//! selected at startup and narrows every store failure into a small closed
//! set of kinds; backend detail is logged here and never surfaced.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use crate::domain::passenger::{
    Passenger, PassengerRepository, PassengerUpdate, RepositoryError,
};

/// Default bound on a single store call.
pub const DEFAULT_OPERATION_DEADLINE: Duration = Duration::from_secs(10);

/// Errors surfaced to transport adapters.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The addressed record does not exist.
    #[error("passenger not found")]
    NotFound,

    /// A create collided, or the durable backend could not serialize the
    /// transaction within its retry budget.
    #[error("conflicting operation on the record")]
    Conflict,

    /// The payload declared an identifier other than the one addressed.
    #[error("payload identifier does not match the addressed record")]
    InconsistentId,

    /// The store could not serve the request.
    #[error("repository unavailable")]
    Unavailable,
}

/// CRUD service over the store selected at startup.
pub struct PassengerService<R> {
    repository: Arc<R>,
    deadline: Duration,
}

impl<R> PassengerService<R>
where
    R: PassengerRepository,
{
    /// Create a service with the default operation deadline.
    #[must_use]
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_deadline(repository, DEFAULT_OPERATION_DEADLINE)
    }

    /// Create a service bounding every store call by `deadline`.
    #[must_use]
    pub fn with_deadline(repository: Arc<R>, deadline: Duration) -> Self {
        Self {
            repository,
            deadline,
        }
    }

    /// Store a new record and return its generated identifier.
    ///
    /// # Errors
    ///
    /// `Conflict` on an identifier collision, `Unavailable` on backend
    /// failure or deadline expiry.
    pub async fn create(&self, p: PassengerUpdate) -> Result<Uuid, ServiceError> {
        let id = self
            .bounded("create", self.repository.create(p))
            .await?;
        debug!(method = "create", id = %id, "passenger created");
        Ok(id)
    }

    /// Fetch the record stored under `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent, `Unavailable` on backend failure or deadline
    /// expiry.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Passenger, ServiceError> {
        self.bounded("find_by_id", self.repository.find_by_id(id))
            .await
    }

    /// Merge `p` onto the record at `id`, creating it when absent.
    ///
    /// # Errors
    ///
    /// `InconsistentId` when the payload declares a different identifier,
    /// `Conflict` on retry exhaustion, `Unavailable` otherwise.
    pub async fn replace_or_create(
        &self,
        id: Uuid,
        p: PassengerUpdate,
    ) -> Result<(), ServiceError> {
        Self::check_correlation(id, &p)?;
        self.bounded("replace_or_create", self.repository.replace_or_create(id, p))
            .await?;
        debug!(method = "replace_or_create", id = %id, "passenger stored");
        Ok(())
    }

    /// Merge `p` onto the record at `id`, refusing to create.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent, `InconsistentId` on identifier mismatch,
    /// `Conflict` on retry exhaustion, `Unavailable` otherwise.
    pub async fn merge_update(&self, id: Uuid, p: PassengerUpdate) -> Result<(), ServiceError> {
        Self::check_correlation(id, &p)?;
        self.bounded("merge_update", self.repository.merge_update(id, p))
            .await?;
        debug!(method = "merge_update", id = %id, "passenger updated");
        Ok(())
    }

    /// Remove the record stored under `id`; echoes the identifier back.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent, `Unavailable` on backend failure or deadline
    /// expiry.
    pub async fn delete(&self, id: Uuid) -> Result<Uuid, ServiceError> {
        self.bounded("delete", self.repository.delete(id)).await?;
        debug!(method = "delete", id = %id, "passenger deleted");
        Ok(id)
    }

    /// Return an unordered snapshot of all records.
    ///
    /// # Errors
    ///
    /// `Unavailable` on backend failure or deadline expiry.
    pub async fn list(&self) -> Result<Vec<Passenger>, ServiceError> {
        self.bounded("list", self.repository.list()).await
    }

    /// A payload may declare the identifier it targets; applying it to a
    /// different record than declared is refused.
    fn check_correlation(id: Uuid, p: &PassengerUpdate) -> Result<(), ServiceError> {
        match p.id {
            Some(declared) if declared != id => Err(ServiceError::InconsistentId),
            _ => Ok(()),
        }
    }

    /// Run a store call under the operation deadline and narrow its error.
    async fn bounded<T>(
        &self,
        method: &'static str,
        call: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, ServiceError> {
        match tokio::time::timeout(self.deadline, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(Self::narrow(method, &err)),
            Err(_elapsed) => {
                error!(method, deadline = ?self.deadline, "store call exceeded deadline");
                Err(ServiceError::Unavailable)
            }
        }
    }

    /// Narrow a store failure to a surfaced kind. Known sentinel conditions
    /// keep their kind; everything unrecognized becomes `Unavailable`.
    fn narrow(method: &'static str, err: &RepositoryError) -> ServiceError {
        match err {
            RepositoryError::NotFound { .. } => ServiceError::NotFound,
            RepositoryError::AlreadyExists { .. } | RepositoryError::Conflict { .. } => {
                error!(method, %err, "store reported a conflict");
                ServiceError::Conflict
            }
            RepositoryError::Unavailable { reason } => {
                error!(method, %reason, "store unavailable");
                ServiceError::Unavailable
            }
        }
    }
}
