//! CockroachDB-backed passenger repository.
//!
//! CockroachDB speaks the PostgreSQL wire protocol, so the adapter runs on a
//! sqlx `PgPool`. Every mutating operation executes as one serializable
//! transaction driven through [`with_txn_retry`]; a retry re-runs the whole
//! body with a freshly read `existing`, never a stale one. Reads are single
//! statements and need no explicit transaction.

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::domain::passenger::{
    Passenger, PassengerRepository, PassengerUpdate, RepositoryError, merge,
};

use super::retry::{RetryPolicy, TxnError, with_txn_retry};

use async_trait::async_trait;

/// One row per record, keyed by the identifier; every attribute nullable.
const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS people (
        id UUID PRIMARY KEY,
        survived BOOL,
        pclass INT4,
        name TEXT,
        sex TEXT,
        age INT4,
        siblings_spouses_aboard BOOL,
        parents_children_aboard BOOL,
        fare FLOAT8
    )
";

const SELECT_BY_ID: &str = r"
    SELECT id, survived, pclass, name, sex, age,
           siblings_spouses_aboard, parents_children_aboard, fare
    FROM people
    WHERE id = $1
";

const SELECT_ALL: &str = r"
    SELECT id, survived, pclass, name, sex, age,
           siblings_spouses_aboard, parents_children_aboard, fare
    FROM people
";

const INSERT: &str = r"
    INSERT INTO people (
        id, survived, pclass, name, sex, age,
        siblings_spouses_aboard, parents_children_aboard, fare
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
";

const UPDATE: &str = r"
    UPDATE people SET
        survived = $2, pclass = $3, name = $4, sex = $5, age = $6,
        siblings_spouses_aboard = $7, parents_children_aboard = $8, fare = $9
    WHERE id = $1
";

const DELETE: &str = "DELETE FROM people WHERE id = $1";

/// CockroachDB implementation of [`PassengerRepository`].
pub struct CockroachPassengerRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl CockroachPassengerRepository {
    /// Connect to the cluster and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the cluster cannot be reached or the schema
    /// statement fails.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        retry: RetryPolicy,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(RepositoryError::unavailable)?;

        tracing::info!(max_connections, "CockroachDB connection pool initialized");

        let repo = Self::with_pool(pool, retry);
        repo.ensure_schema().await?;
        Ok(repo)
    }

    /// Build a repository over an existing pool (for testing).
    #[must_use]
    pub fn with_pool(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the table definition.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::unavailable)?;
        Ok(())
    }

    /// Open a transaction and keep it eligible for transparent retry.
    ///
    /// The substantive statements that follow must not be the transaction's
    /// first, so the configured leading statement runs before them.
    async fn begin(&self) -> Result<Transaction<'static, Postgres>, TxnError> {
        let mut tx = self.pool.begin().await?;
        if let Some(stmt) = &self.retry.leading_statement {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }
        Ok(tx)
    }
}

fn row_to_passenger(row: &PgRow) -> Result<Passenger, sqlx::Error> {
    Ok(Passenger {
        id: row.try_get("id")?,
        survived: row.try_get("survived")?,
        pclass: row.try_get("pclass")?,
        name: row.try_get("name")?,
        sex: row.try_get("sex")?,
        age: row.try_get("age")?,
        siblings_spouses_aboard: row.try_get("siblings_spouses_aboard")?,
        parents_children_aboard: row.try_get("parents_children_aboard")?,
        fare: row.try_get("fare")?,
    })
}

async fn fetch_in_txn(
    tx: &mut Transaction<'static, Postgres>,
    id: Uuid,
) -> Result<Option<Passenger>, sqlx::Error> {
    let row = sqlx::query(SELECT_BY_ID)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    row.as_ref().map(row_to_passenger).transpose()
}

fn bind_attributes<'q>(
    query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    p: &'q Passenger,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(p.id)
        .bind(p.survived)
        .bind(p.pclass)
        .bind(p.name.as_deref())
        .bind(p.sex.as_deref())
        .bind(p.age)
        .bind(p.siblings_spouses_aboard)
        .bind(p.parents_children_aboard)
        .bind(p.fare)
}

/// What a merge transaction observed at its target identifier.
enum MergeOutcome {
    Applied,
    Missing,
}

#[async_trait]
impl PassengerRepository for CockroachPassengerRepository {
    async fn create(&self, p: PassengerUpdate) -> Result<Uuid, RepositoryError> {
        let id = Uuid::new_v4();
        let record = Passenger::from_update(id, &p);

        // The existence check runs inside the same serializable transaction
        // as the insert, so a racing duplicate resolves through the retry
        // protocol instead of a driver-specific unique-violation path.
        let created = with_txn_retry(&self.retry, || {
            let record = record.clone();
            async move {
                let mut tx = self.begin().await?;
                if fetch_in_txn(&mut tx, record.id).await?.is_some() {
                    tx.commit().await?;
                    return Ok(false);
                }
                bind_attributes(sqlx::query(INSERT), &record)
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await?;
                Ok(true)
            }
        })
        .await?;

        if !created {
            return Err(RepositoryError::AlreadyExists { id });
        }
        debug!(id = %id, "passenger created");
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Passenger, RepositoryError> {
        let row = sqlx::query(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::unavailable)?;

        match row {
            Some(row) => row_to_passenger(&row).map_err(RepositoryError::unavailable),
            None => Err(RepositoryError::NotFound { id }),
        }
    }

    async fn replace_or_create(
        &self,
        id: Uuid,
        p: PassengerUpdate,
    ) -> Result<(), RepositoryError> {
        // Create-vs-update is decided by a read inside the same transaction
        // as the write; serializable isolation plus retry closes the window
        // between the existence check and the write.
        with_txn_retry(&self.retry, || {
            let incoming = p.clone();
            async move {
                let mut tx = self.begin().await?;
                match fetch_in_txn(&mut tx, id).await? {
                    Some(existing) => {
                        let merged = merge(&existing, &incoming);
                        bind_attributes(sqlx::query(UPDATE), &merged)
                            .execute(&mut *tx)
                            .await?;
                    }
                    None => {
                        let record = Passenger::from_update(id, &incoming);
                        bind_attributes(sqlx::query(INSERT), &record)
                            .execute(&mut *tx)
                            .await?;
                    }
                }
                tx.commit().await?;
                Ok(())
            }
        })
        .await?;

        debug!(id = %id, "passenger replaced or created");
        Ok(())
    }

    async fn merge_update(&self, id: Uuid, p: PassengerUpdate) -> Result<(), RepositoryError> {
        let outcome = with_txn_retry(&self.retry, || {
            let incoming = p.clone();
            async move {
                let mut tx = self.begin().await?;
                let outcome = match fetch_in_txn(&mut tx, id).await? {
                    Some(existing) => {
                        let merged = merge(&existing, &incoming);
                        bind_attributes(sqlx::query(UPDATE), &merged)
                            .execute(&mut *tx)
                            .await?;
                        MergeOutcome::Applied
                    }
                    None => MergeOutcome::Missing,
                };
                tx.commit().await?;
                Ok(outcome)
            }
        })
        .await?;

        match outcome {
            MergeOutcome::Applied => {
                debug!(id = %id, "passenger updated");
                Ok(())
            }
            MergeOutcome::Missing => Err(RepositoryError::NotFound { id }),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let removed = with_txn_retry(&self.retry, || async move {
            let mut tx = self.begin().await?;
            let result = sqlx::query(DELETE).bind(id).execute(&mut *tx).await?;
            tx.commit().await?;
            Ok(result.rows_affected() > 0)
        })
        .await?;

        if !removed {
            return Err(RepositoryError::NotFound { id });
        }
        debug!(id = %id, "passenger deleted");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Passenger>, RepositoryError> {
        let rows = sqlx::query(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::unavailable)?;

        rows.iter()
            .map(|row| row_to_passenger(row).map_err(RepositoryError::unavailable))
            .collect()
    }
}
