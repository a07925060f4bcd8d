use std::sync::Arc;

use async_trait::async_trait;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vehiclemanager_connect::RemoteVehicleSource;
use vehiclemanager_core::errors::Result as CoreResult;
use vehiclemanager_core::settings::{SourceKind, SourceSettings};
use vehiclemanager_core::vehicles::{
    FixtureVehicleSource, VehicleSourceConnector, VehicleSourceTrait,
};
use vehiclemanager_core::SourceCoordinator;
use vehiclemanager_storage_sqlite::SqliteVehicleSource;

use crate::config::Config;

pub struct AppState {
    pub coordinator: Arc<SourceCoordinator>,
}

/// Builds the preferred store named in the settings.
pub struct StoreConnector;

#[async_trait]
impl VehicleSourceConnector for StoreConnector {
    async fn connect(&self, settings: &SourceSettings) -> CoreResult<Arc<dyn VehicleSourceTrait>> {
        let source: Arc<dyn VehicleSourceTrait> = match settings.preferred {
            SourceKind::DirectStore => Arc::new(SqliteVehicleSource::from_settings(settings)?),
            SourceKind::RemoteService => Arc::new(RemoteVehicleSource::connect(settings).await?),
            SourceKind::InMemoryFixture => Arc::new(FixtureVehicleSource::new()),
        };
        Ok(source)
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("VM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let settings = config.source_settings();
    let coordinator = SourceCoordinator::initialize(&settings, &StoreConnector).await;
    tracing::info!("{}", coordinator.status());

    // Fill the working set so revaluation has records to work on.
    let initial = coordinator.list().await;
    if initial.is_success() {
        tracing::info!("{}", initial.status);
    } else {
        tracing::warn!("Initial load failed: {}", initial.status);
    }

    Ok(Arc::new(AppState {
        coordinator: Arc::new(coordinator),
    }))
}
