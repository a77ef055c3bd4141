//! # API REST
//!
//! REST API for the vitals engine.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, status mapping, CORS)
//!
//! All clinical behaviour lives in `vitals-core`; handlers only translate between the wire and
//! [`EvaluationService`].

#![warn(rust_2018_idioms)]

pub mod dto;
pub mod error;
mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use vitals_core::EvaluationService;

pub use error::ApiError;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub service: EvaluationService,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::register_patient,
        handlers::patient_status,
        handlers::submit_vitals,
        handlers::vitals_history,
        handlers::latest_vitals,
        handlers::get_vitals_record,
    ),
    components(schemas(
        dto::HealthRes,
        dto::RegisterPatientReq,
        dto::RegisterPatientRes,
        dto::PatientStatusRes,
        dto::SubmitVitalsReq,
        dto::SubScoreRes,
        dto::MeasurementRes,
        dto::VitalsRecordRes,
        dto::VitalsHistoryRes,
        error::ErrorBody,
        error::ErrorDetail,
        error::FieldErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router, including Swagger UI at `/swagger-ui`.
pub fn router(service: EvaluationService) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/patients", post(handlers::register_patient))
        .route("/patients/:patient_id/status", get(handlers::patient_status))
        .route(
            "/patients/:patient_id/vitals",
            get(handlers::vitals_history).post(handlers::submit_vitals),
        )
        .route(
            "/patients/:patient_id/vitals/latest",
            get(handlers::latest_vitals),
        )
        .route("/vitals/:record_id", get(handlers::get_vitals_record))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState { service })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use vitals_core::{InMemoryPatientRegistry, InMemoryVitalsStore, PatientId};

    fn app() -> Router {
        let registry = InMemoryPatientRegistry::with_patients([PatientId::parse("P001").unwrap()]);
        let service =
            EvaluationService::new(Arc::new(InMemoryVitalsStore::new()), Arc::new(registry));
        router(service)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn vitals(hr: i64) -> Value {
        json!({
            "recorded_by": "nurse@example.com",
            "respiratory_rate": 16,
            "oxygen_saturation": 97,
            "supplemental_oxygen": false,
            "systolic_bp": 120,
            "diastolic_bp": 80,
            "heart_rate": hr,
            "consciousness": "alert",
            "temperature": 37.0
        })
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn submit_returns_score_and_tier() {
        let app = app();
        let body = json!({
            "recorded_by": "nurse@example.com",
            "respiratory_rate": "22",
            "oxygen_saturation": 95,
            "systolic_bp": 120,
            "heart_rate": 80,
            "temperature": "37.0"
        });

        let (status, body) = send(&app, "POST", "/patients/P001/vitals", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["news2_score"], 3);
        assert_eq!(body["alert_tier"], "low");
        assert_eq!(body["alert_colour"], "green");
        assert_eq!(body["critical"], false);
        assert_eq!(body["sequence"], 1);
        assert_eq!(body["sub_scores"].as_array().unwrap().len(), 6);
        assert_eq!(body["record_id"].as_str().unwrap().len(), 32);
    }

    #[tokio::test]
    async fn critical_submission_is_high() {
        let body = json!({
            "recorded_by": "nurse@example.com",
            "respiratory_rate": 7,
            "oxygen_saturation": 88,
            "supplemental_oxygen": true,
            "systolic_bp": 85,
            "heart_rate": 135,
            "consciousness": "voice",
            "temperature": 34.5
        });
        let (status, body) = send(&app(), "POST", "/patients/P001/vitals", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["news2_score"], 20);
        assert_eq!(body["alert_tier"], "high");
        assert_eq!(body["critical"], true);
    }

    #[tokio::test]
    async fn validation_failure_is_422_with_fields() {
        let app = app();
        let body = json!({
            "recorded_by": "nurse@example.com",
            "respiratory_rate": 16,
            "oxygen_saturation": 101,
            "systolic_bp": 120,
            "temperature": 37.0
        });

        let (status, body) = send(&app, "POST", "/patients/P001/vitals", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
        let fields: Vec<&str> = body["error"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["oxygen_saturation", "heart_rate"]);

        let (_, history) = send(&app, "GET", "/patients/P001/vitals", None).await;
        assert!(history["records"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_patient_is_404() {
        let (status, body) = send(&app(), "POST", "/patients/P999/vitals", Some(vitals(70))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn invalid_ids_are_400() {
        let app = app();
        let (status, _) = send(&app, "GET", "/patients/bad$id/status", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "GET", "/vitals/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_recorder_is_400() {
        let mut body = vitals(70);
        body["recorded_by"] = json!("  ");
        let (status, _) = send(&app(), "POST", "/patients/P001/vitals", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let mut body = vitals(70);
        body["heart_rate"] = json!(true);
        let (status, body) = send(&app(), "POST", "/patients/P001/vitals", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn history_pages_newest_first() {
        let app = app();
        for hr in [60, 70, 80, 90] {
            let (status, _) = send(&app, "POST", "/patients/P001/vitals", Some(vitals(hr))).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, page) = send(&app, "GET", "/patients/P001/vitals?limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        let seqs: Vec<u64> = page["records"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["sequence"].as_u64().unwrap())
            .collect();
        assert_eq!(seqs, vec![4, 3]);
        assert_eq!(page["next_before"], 3);

        let (_, page) = send(&app, "GET", "/patients/P001/vitals?limit=2&before=3", None).await;
        let seqs: Vec<u64> = page["records"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["sequence"].as_u64().unwrap())
            .collect();
        assert_eq!(seqs, vec![2, 1]);
        assert_eq!(page["next_before"], Value::Null);

        let (status, _) = send(&app, "GET", "/patients/P001/vitals?limit=many", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn zero_limit_is_400() {
        let app = app();
        send(&app, "POST", "/patients/P001/vitals", Some(vitals(70))).await;

        let (status, body) = send(&app, "GET", "/patients/P001/vitals?limit=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn latest_and_single_record() {
        let app = app();
        let (status, _) = send(&app, "GET", "/patients/P001/vitals/latest", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, created) = send(&app, "POST", "/patients/P001/vitals", Some(vitals(72))).await;
        let record_id = created["record_id"].as_str().unwrap().to_string();

        let (status, latest) = send(&app, "GET", "/patients/P001/vitals/latest", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(latest["record_id"], record_id.as_str());

        let (status, record) = send(&app, "GET", &format!("/vitals/{record_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["measurement"]["heart_rate"], 72);

        let missing = vitals_core::RecordId::generate();
        let (status, _) = send(&app, "GET", &format!("/vitals/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn register_then_status() {
        let app = app();
        let req = json!({ "patient_id": "P002" });

        let (status, body) = send(&app, "POST", "/patients", Some(req.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["created"], true);

        let (status, body) = send(&app, "POST", "/patients", Some(req)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["created"], false);

        let (status, body) = send(&app, "GET", "/patients/P002/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unassessed");

        let mut high = vitals(72);
        high["consciousness"] = json!("unresponsive");
        send(&app, "POST", "/patients/P002/vitals", Some(high)).await;

        let (_, body) = send(&app, "GET", "/patients/P002/status", None).await;
        assert_eq!(body["status"], "high");
    }
}
