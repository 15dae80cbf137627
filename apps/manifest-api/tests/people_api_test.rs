//! End-to-end tests for the people API.
//!
//! Drives the full router over the in-memory store, exercising the
//! create/read/merge-update/replace-or-create/delete lifecycle exactly as a
//! client would see it.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

use manifest_api::application::PassengerService;
use manifest_api::infrastructure::http::{AppState, create_router};
use manifest_api::infrastructure::persistence::InMemoryPassengerRepository;

fn router() -> Router {
    let repository = Arc::new(InMemoryPassengerRepository::new());
    create_router(AppState {
        service: Arc::new(PassengerService::new(repository)),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn json_request(method: &str, uri: String, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response<axum::body::Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_patch_get_put_lifecycle() {
    let app = router();

    // Create {name: "Alice", age: 30}.
    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/people".to_string(),
            r#"{"name":"Alice","age":30}"#,
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let id = json_body(created).await["uuid"].as_str().unwrap().to_string();

    // Patch only the age.
    let patched = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            format!("/people/{id}"),
            r#"{"age":31}"#,
        ))
        .await
        .unwrap();
    assert_eq!(patched.status(), StatusCode::OK);

    // The name survived the partial update.
    let fetched = app
        .clone()
        .oneshot(
            Request::get(format!("/people/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    let body = json_body(fetched).await;
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["age"], 31);

    // Put {name: "Bob"}: replace-or-create is merge-on-existing, so the age
    // is retained alongside the new name.
    let put = app
        .clone()
        .oneshot(json_request(
            "PUT",
            format!("/people/{id}"),
            r#"{"name":"Bob"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::OK);

    let body = json_body(
        app.clone()
            .oneshot(
                Request::get(format!("/people/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["name"], "Bob");
    assert_eq!(body["age"], 31);
}

#[tokio::test]
async fn create_ignores_caller_supplied_identifier() {
    let app = router();
    let declared = Uuid::new_v4();

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/people".to_string(),
            &format!(r#"{{"uuid":"{declared}","name":"Carol"}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let assigned = json_body(created).await["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    assert_ne!(assigned, declared.to_string());

    // The declared identifier addresses nothing.
    let missing = app
        .clone()
        .oneshot(
            Request::get(format!("/people/{declared}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_is_terminal_through_the_api() {
    let app = router();

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/people".to_string(),
            r#"{"name":"Dan"}"#,
        ))
        .await
        .unwrap();
    let id = json_body(created).await["uuid"].as_str().unwrap().to_string();

    let deleted = app
        .clone()
        .oneshot(
            Request::delete(format!("/people/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(json_body(deleted).await["uuid"], id);

    for request in [
        Request::get(format!("/people/{id}"))
            .body(Body::empty())
            .unwrap(),
        Request::delete(format!("/people/{id}"))
            .body(Body::empty())
            .unwrap(),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn list_reflects_the_collection() {
    let app = router();

    let empty = app
        .clone()
        .oneshot(Request::get("/people").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::OK);
    assert_eq!(json_body(empty).await, serde_json::json!([]));

    for name in ["Erin", "Frank"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/people".to_string(),
                &format!(r#"{{"name":"{name}"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let listed = app
        .clone()
        .oneshot(Request::get("/people").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(listed).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn explicit_zero_values_overwrite_on_update() {
    let app = router();

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/people".to_string(),
            r#"{"name":"Grace","survived":true,"fare":86.5}"#,
        ))
        .await
        .unwrap();
    let id = json_body(created).await["uuid"].as_str().unwrap().to_string();

    // survived:false and fare:0 are present values, not absences.
    let patched = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            format!("/people/{id}"),
            r#"{"survived":false,"fare":0}"#,
        ))
        .await
        .unwrap();
    assert_eq!(patched.status(), StatusCode::OK);

    let body = json_body(
        app.clone()
            .oneshot(
                Request::get(format!("/people/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["survived"], false);
    assert_eq!(body["fare"], 0.0);
    assert_eq!(body["name"], "Grace");
}
