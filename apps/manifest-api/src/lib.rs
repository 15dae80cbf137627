// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::items_after_statements
    )
)]

//! Manifest API - Passenger Record Service
//!
//! CRUD backend for passenger records over a store abstraction with two
//! conforming implementations, selected once at startup.
//!
//! # Architecture
//!
//! - **Domain**: the record, its merge semantics, the store port
//!   - `passenger`: `Passenger`/`PassengerUpdate`, `merge`, `PassengerRepository`
//! - **Application**: `PassengerService` — identifier discipline, per-call
//!   deadlines, narrowing of store failures to a closed error set
//! - **Infrastructure**: adapters
//!   - `persistence`: in-memory store; CockroachDB store with the
//!     serializable-transaction retry discipline
//!   - `http`: axum REST controller
//!
//! The merge engine is the single authority for update semantics: PUT
//! (replace-or-create) and PATCH (update-only) differ *only* in what they do
//! when the identifier is unknown.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - core record semantics with no external dependencies.
pub mod domain;

/// Application layer - the service callers talk to.
pub mod application;

/// Infrastructure layer - adapters and external integrations.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Tracing setup.
pub mod telemetry;

// Domain re-exports
pub use domain::passenger::{
    Passenger, PassengerRepository, PassengerUpdate, RepositoryError, merge,
};

// Application re-exports
pub use application::{PassengerService, ServiceError};

// Infrastructure re-exports
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::persistence::{
    CockroachPassengerRepository, InMemoryPassengerRepository, RetryPolicy,
};
