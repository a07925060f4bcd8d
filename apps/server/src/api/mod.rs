use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer, extract::State, routing::get, BoxError, Json, Router,
};
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use vehiclemanager_core::envelope::ApiResponse;
use vehiclemanager_core::CoordinatorState;

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

pub mod vehicles;

async fn get_status(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<CoordinatorState>>> {
    let snapshot = state.coordinator.state();
    Ok(Json(ApiResponse::success(snapshot.status.clone(), snapshot)))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn handle_layer_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}

/// Bounds every request by `timeout`. Requests that run out of time get
/// the failure envelope.
pub fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_layer_error))
            .layer(TimeoutLayer::new(timeout)),
    )
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let api = Router::new()
        .merge(vehicles::router())
        .route(
            "/status",
            get(get_status).fallback(vehicles::method_not_allowed),
        );

    let router = Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state);

    // Store calls are bounded by `request_timeout` themselves; the extra
    // margin covers queueing behind the operation lock.
    with_request_timeout(router, config.request_timeout * 2)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
