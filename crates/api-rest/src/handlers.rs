use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use vitals_core::{HistoryQuery, PatientId, PatientRegistry, RecordId, RecordedBy};

use crate::dto::{
    HealthRes, HistoryParams, PatientStatusRes, RegisterPatientReq, RegisterPatientRes,
    SubmitVitalsReq, VitalsHistoryRes, VitalsRecordRes,
};
use crate::error::{ApiError, ErrorBody};
use crate::AppState;

fn parse_patient_id(raw: &str) -> Result<PatientId, ApiError> {
    Ok(PatientId::parse(raw)?)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used by monitoring and load balancer health checks.
#[axum::debug_handler]
pub(crate) async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Vitals REST API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = RegisterPatientReq,
    responses(
        (status = 201, description = "Patient registered", body = RegisterPatientRes),
        (status = 200, description = "Patient was already registered", body = RegisterPatientRes),
        (status = 400, description = "Invalid patient id", body = ErrorBody),
        (status = 503, description = "Registry unavailable", body = ErrorBody)
    )
)]
/// Register a patient id
///
/// Vitals can only be recorded against registered patients.
#[axum::debug_handler]
pub(crate) async fn register_patient(
    State(state): State<AppState>,
    body: Result<Json<RegisterPatientReq>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterPatientRes>), ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let patient_id = parse_patient_id(&req.patient_id)?;

    let created = state.service.registry().register(patient_id.clone())?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(RegisterPatientRes {
            patient_id: patient_id.to_string(),
            created,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/patients/{patient_id}/status",
    params(("patient_id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Current patient status", body = PatientStatusRes),
        (status = 400, description = "Invalid patient id", body = ErrorBody),
        (status = 404, description = "Unknown patient", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
/// Patient status derived from the latest vitals record
#[axum::debug_handler]
pub(crate) async fn patient_status(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientStatusRes>, ApiError> {
    let patient_id = parse_patient_id(&patient_id)?;
    let status = state.service.patient_status(&patient_id)?;
    Ok(Json(PatientStatusRes::new(&patient_id, status)))
}

#[utoipa::path(
    post,
    path = "/patients/{patient_id}/vitals",
    params(("patient_id" = String, Path, description = "Patient identifier")),
    request_body = SubmitVitalsReq,
    responses(
        (status = 201, description = "Vitals recorded and scored", body = VitalsRecordRes),
        (status = 400, description = "Malformed request", body = ErrorBody),
        (status = 404, description = "Unknown patient", body = ErrorBody),
        (status = 422, description = "Measurement failed validation", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
/// Submit a set of vitals
///
/// Validates, scores and classifies the measurement, appends it to the patient's history and
/// returns the persisted record with its NEWS2 score and alert tier.
#[axum::debug_handler]
pub(crate) async fn submit_vitals(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    body: Result<Json<SubmitVitalsReq>, JsonRejection>,
) -> Result<(StatusCode, Json<VitalsRecordRes>), ApiError> {
    let patient_id = parse_patient_id(&patient_id)?;
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (recorded_by, measurement) = req.into_parts();
    let recorded_by = RecordedBy::new(recorded_by)?;

    let submission = state
        .service
        .submit(&patient_id, &measurement, recorded_by)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(VitalsRecordRes::new(
            &submission.record,
            submission.interpretation,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/patients/{patient_id}/vitals",
    params(
        ("patient_id" = String, Path, description = "Patient identifier"),
        HistoryParams
    ),
    responses(
        (status = 200, description = "Vitals history, newest first", body = VitalsHistoryRes),
        (status = 400, description = "Invalid patient id or query", body = ErrorBody),
        (status = 404, description = "Unknown patient", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
/// List a patient's vitals history
#[axum::debug_handler]
pub(crate) async fn vitals_history(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<VitalsHistoryRes>, ApiError> {
    let patient_id = parse_patient_id(&patient_id)?;
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if params.limit == Some(0) {
        return Err(ApiError::BadRequest("limit must be at least 1".into()));
    }

    let records = state.service.history(
        &patient_id,
        HistoryQuery {
            limit: params.limit,
            before: params.before,
        },
    )?;

    Ok(Json(VitalsHistoryRes::new(&patient_id, &records)))
}

#[utoipa::path(
    get,
    path = "/patients/{patient_id}/vitals/latest",
    params(("patient_id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Most recent vitals record", body = VitalsRecordRes),
        (status = 404, description = "Unknown patient or no vitals recorded", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
/// Most recent vitals record for a patient
#[axum::debug_handler]
pub(crate) async fn latest_vitals(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<VitalsRecordRes>, ApiError> {
    let patient_id = parse_patient_id(&patient_id)?;
    let record = state
        .service
        .latest(&patient_id)?
        .ok_or_else(|| ApiError::NotFound(format!("no vitals recorded for {patient_id}")))?;
    Ok(Json(VitalsRecordRes::new(&record, None)))
}

#[utoipa::path(
    get,
    path = "/vitals/{record_id}",
    params(("record_id" = String, Path, description = "Vitals record identifier")),
    responses(
        (status = 200, description = "Vitals record", body = VitalsRecordRes),
        (status = 400, description = "Invalid record id", body = ErrorBody),
        (status = 404, description = "Unknown record", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
/// Fetch a single vitals record by id
#[axum::debug_handler]
pub(crate) async fn get_vitals_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<Json<VitalsRecordRes>, ApiError> {
    let record_id = RecordId::parse(&record_id)?;
    let record = state.service.record(&record_id)?;
    Ok(Json(VitalsRecordRes::new(&record, None)))
}
