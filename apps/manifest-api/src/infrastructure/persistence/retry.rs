//! Serializable-transaction retry discipline.
//!
//! CockroachDB runs every transaction at serializable isolation and may
//! unilaterally abort one under contention (SQLSTATE 40001), requiring the
//! whole transaction body to be re-executed from its first statement. The
//! first statement of a transaction is exempt from that abort signal, which
//! is why a transaction with more than one statement must open with a
//! harmless leading statement to stay eligible for transparent retry. The
//! leading statement is part of [`RetryPolicy`], not hardcoded SQL.
//!
//! Backoff between attempts uses the full-jitter algorithm recommended by
//! AWS: <https://aws.amazon.com/blogs/architecture/exponential-backoff-and-jitter/>

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::passenger::RepositoryError;

/// Retry policy for serializable transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts before the operation surfaces `Conflict`.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Initial backoff between attempts, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Harmless statement issued before the substantive work of every
    /// multi-statement transaction. Set to null to opt out on backends
    /// without the first-statement retry exemption.
    #[serde(default = "default_leading_statement")]
    pub leading_statement: Option<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            leading_statement: default_leading_statement(),
        }
    }
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_initial_backoff_ms() -> u64 {
    25
}

const fn default_max_backoff_ms() -> u64 {
    1_000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_leading_statement() -> Option<String> {
    Some("SELECT 1".to_string())
}

/// Error from one transaction attempt.
#[derive(Debug)]
pub(crate) enum TxnError {
    /// The backend aborted the transaction and asked for a full re-execution.
    Retryable {
        /// Backend detail, for logs.
        detail: String,
    },
    /// Anything else; propagated without retry.
    Fatal(RepositoryError),
}

impl From<sqlx::Error> for TxnError {
    fn from(err: sqlx::Error) -> Self {
        if is_serialization_failure(&err) {
            Self::Retryable {
                detail: err.to_string(),
            }
        } else {
            Self::Fatal(RepositoryError::unavailable(err))
        }
    }
}

/// SQLSTATE 40001: serialization_failure, the retryable-transaction signal.
fn is_serialization_failure(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("40001"))
}

/// Execute `operation` until it commits, retrying on retryable aborts.
///
/// Each invocation of `operation` must open a fresh transaction and re-read
/// whatever state it depends on; a retry re-executes the same logical
/// operation from scratch. Exhausting the attempt budget surfaces
/// [`RepositoryError::Conflict`]; fatal errors propagate immediately.
pub(crate) async fn with_txn_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RepositoryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TxnError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut backoff = Backoff::new(policy);

    for attempt in 1..=attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(attempt, "transaction committed after retry");
                }
                return Ok(value);
            }
            Err(TxnError::Fatal(err)) => return Err(err),
            Err(TxnError::Retryable { detail }) => {
                tracing::debug!(attempt, %detail, "retryable transaction abort, re-executing");
                if attempt < attempts {
                    let delay = backoff.next_delay();
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    Err(RepositoryError::Conflict { attempts })
}

/// Exponential backoff with full jitter.
struct Backoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    attempt: u32,
}

impl Backoff {
    fn new(policy: &RetryPolicy) -> Self {
        Self {
            initial: Duration::from_millis(policy.initial_backoff_ms),
            max: Duration::from_millis(policy.max_backoff_ms),
            multiplier: policy.backoff_multiplier,
            attempt: 0,
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn next_delay(&mut self) -> Duration {
        let base_ms = self.initial.as_millis() as f64;
        let exponential =
            base_ms * self.multiplier.powi(i32::try_from(self.attempt).unwrap_or(i32::MAX));
        let capped = exponential.min(self.max.as_millis() as f64);
        self.attempt += 1;

        if capped <= 0.0 {
            return Duration::ZERO;
        }
        // Full jitter: random value between 0 and the capped delay.
        let jitter = rand::rng().random_range(0.0..capped);
        Duration::from_millis(jitter as u64)
    }
}
