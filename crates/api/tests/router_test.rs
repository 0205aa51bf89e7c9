//! Router tests that run without a database.
//!
//! The state holds a disconnected `SeaORM` handle, so anything that reaches a
//! repository fails with a database error. That is enough to check routing,
//! authentication and error rendering.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use kontor_api::{AppState, create_router};
use kontor_shared::{JwtConfig, JwtService};

const SECRET: &str = "router-test-secret-with-enough-length";

fn jwt_service() -> JwtService {
    JwtService::new(JwtConfig {
        secret: SECRET.to_string(),
        access_token_expires_secs: 300,
    })
}

fn app() -> Router {
    create_router(AppState::new(DatabaseConnection::Disconnected, jwt_service()))
}

fn token(org_id: Uuid) -> String {
    jwt_service()
        .generate_access_token(Uuid::new_v4(), org_id, "owner")
        .expect("token")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn test_health_is_public() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let org_id = Uuid::new_v4();
    let response = app()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/org/{org_id}/accounting/accounts"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let org_id = Uuid::new_v4();
    let response = app()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/org/{org_id}/inventory/products"))
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .ends_with("Invalid or malformed token")
    );
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let other = JwtService::new(JwtConfig {
        secret: "a-completely-different-signing-secret".to_string(),
        access_token_expires_secs: 300,
    });
    let org_id = Uuid::new_v4();
    let forged = other
        .generate_access_token(Uuid::new_v4(), org_id, "owner")
        .unwrap();

    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/orgs")
                .header(header::AUTHORIZATION, format!("Bearer {forged}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_database_failure_hides_details() {
    let org_id = Uuid::new_v4();
    let response = app()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/org/{org_id}/crm/contacts"))
                .header(header::AUTHORIZATION, format!("Bearer {}", token(org_id)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "DATABASE_ERROR");
    assert_eq!(body["message"], "An internal error occurred");
}

#[tokio::test]
async fn test_malformed_body_is_rejected_before_handler() {
    let org_id = Uuid::new_v4();
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/org/{org_id}/pos/sales"))
                .header(header::AUTHORIZATION, format!("Bearer {}", token(org_id)))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
