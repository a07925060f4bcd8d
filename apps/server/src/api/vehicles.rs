use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use vehiclemanager_core::envelope::ApiResponse;
use vehiclemanager_core::errors::ErrorKind;
use vehiclemanager_core::vehicles::{Vehicle, VehicleFields};
use vehiclemanager_core::OperationOutcome;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

type Envelope<T> = (StatusCode, Json<ApiResponse<T>>);

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// Wraps a successful outcome in the envelope, or turns the failure into
/// an error response.
fn respond<T: Serialize>(
    outcome: OperationOutcome<T>,
    status: StatusCode,
    message: &str,
) -> ApiResult<Envelope<T>> {
    match (outcome.failure, outcome.data) {
        (None, Some(data)) => Ok((status, Json(ApiResponse::success(message, data)))),
        (Some(kind), _) => Err(ApiError::Failed {
            kind,
            status: outcome.status,
        }),
        (None, None) => Err(ApiError::Failed {
            kind: ErrorKind::Protocol,
            status: outcome.status,
        }),
    }
}

fn vehicle_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::BadRequest("Invalid vehicle id".to_string()))
}

fn vehicle_body(body: Result<Json<VehicleFields>, JsonRejection>) -> ApiResult<VehicleFields> {
    body.map(|Json(fields)| fields)
        .map_err(|_| ApiError::BadRequest("Invalid JSON data".to_string()))
}

async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Envelope<Vec<Vehicle>>> {
    match query.search.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => respond(
            state.coordinator.search(text).await,
            StatusCode::OK,
            "Search completed successfully",
        ),
        _ => respond(
            state.coordinator.list().await,
            StatusCode::OK,
            "Vehicles retrieved successfully",
        ),
    }
}

async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VehicleFields>, JsonRejection>,
) -> ApiResult<Envelope<Vehicle>> {
    let fields = vehicle_body(body)?;
    respond(
        state.coordinator.create(fields).await,
        StatusCode::CREATED,
        "Vehicle created successfully",
    )
}

async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Envelope<Vehicle>> {
    let id = vehicle_id(path)?;
    respond(
        state.coordinator.get(id).await,
        StatusCode::OK,
        "Vehicle retrieved successfully",
    )
}

async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<VehicleFields>, JsonRejection>,
) -> ApiResult<Envelope<Vehicle>> {
    let id = vehicle_id(path)?;
    let fields = vehicle_body(body)?;
    respond(
        state.coordinator.update(id, fields).await,
        StatusCode::OK,
        "Vehicle updated successfully",
    )
}

async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Envelope<()>> {
    let id = vehicle_id(path)?;
    respond(
        state.coordinator.delete(id).await,
        StatusCode::OK,
        "Vehicle deleted successfully",
    )
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/vehicles",
            get(list_vehicles)
                .post(create_vehicle)
                .fallback(method_not_allowed),
        )
        .route(
            "/vehicles/{id}",
            get(get_vehicle)
                .put(update_vehicle)
                .delete(delete_vehicle)
                .fallback(method_not_allowed),
        )
}
