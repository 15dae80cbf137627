//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to the passenger service.
//!
//! An unparsable `{uuid}` path segment is rejected by the `Path<Uuid>`
//! extractor with `400` before the store is touched; store error kinds map
//! to statuses in [`super::response::status_for`].

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use uuid::Uuid;

use crate::application::{PassengerService, ServiceError};
use crate::domain::passenger::{PassengerRepository, PassengerUpdate};

use super::response::{ApiErrorResponse, HealthResponse, IdResponse, status_for};

/// Application state shared across handlers.
pub struct AppState<R>
where
    R: PassengerRepository,
{
    /// The passenger service over the store selected at startup.
    pub service: Arc<PassengerService<R>>,
    /// Application version.
    pub version: String,
}

impl<R> Clone for AppState<R>
where
    R: PassengerRepository,
{
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<R>(state: AppState<R>) -> Router
where
    R: PassengerRepository + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/people", get(list_people).post(create_people))
        .route(
            "/people/{uuid}",
            get(get_people_by_id)
                .put(put_people)
                .patch(patch_people)
                .delete(delete_people),
        )
        .with_state(state)
}

/// Health check endpoint; a pass-through with no store dependency.
async fn health_check<R>(State(state): State<AppState<R>>) -> impl IntoResponse
where
    R: PassengerRepository,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// Add a passenger to the collection.
async fn create_people<R>(
    State(state): State<AppState<R>>,
    Json(payload): Json<PassengerUpdate>,
) -> Response
where
    R: PassengerRepository,
{
    match state.service.create(payload).await {
        Ok(uuid) => (StatusCode::CREATED, Json(IdResponse { uuid })).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Retrieve a passenger by identifier.
async fn get_people_by_id<R>(
    State(state): State<AppState<R>>,
    Path(uuid): Path<Uuid>,
) -> Response
where
    R: PassengerRepository,
{
    match state.service.find_by_id(uuid).await {
        Ok(passenger) => Json(passenger).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Replace-or-create a passenger (PUT).
async fn put_people<R>(
    State(state): State<AppState<R>>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<PassengerUpdate>,
) -> Response
where
    R: PassengerRepository,
{
    match state.service.replace_or_create(uuid, payload).await {
        Ok(()) => Json(IdResponse { uuid }).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Partially update an existing passenger (PATCH).
async fn patch_people<R>(
    State(state): State<AppState<R>>,
    Path(uuid): Path<Uuid>,
    Json(payload): Json<PassengerUpdate>,
) -> Response
where
    R: PassengerRepository,
{
    match state.service.merge_update(uuid, payload).await {
        Ok(()) => Json(IdResponse { uuid }).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Remove a passenger.
async fn delete_people<R>(
    State(state): State<AppState<R>>,
    Path(uuid): Path<Uuid>,
) -> Response
where
    R: PassengerRepository,
{
    match state.service.delete(uuid).await {
        Ok(uuid) => Json(IdResponse { uuid }).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Retrieve the whole collection.
async fn list_people<R>(State(state): State<AppState<R>>) -> Response
where
    R: PassengerRepository,
{
    match state.service.list().await {
        Ok(people) => Json(people).into_response(),
        Err(err) => error_response(&err),
    }
}

fn error_response(err: &ServiceError) -> Response {
    (status_for(err), Json(ApiErrorResponse::from_error(err))).into_response()
}
