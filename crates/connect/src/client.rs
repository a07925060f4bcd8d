//! HTTP client for the remote vehicles API.
//!
//! The remote service answers every request with the JSON envelope
//! `{ success, message, data }`. This client maps HTTP status codes and
//! malformed bodies onto the core error kinds so callers can treat the
//! remote service like any other vehicle source.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use vehiclemanager_core::constants::DEFAULT_REQUEST_TIMEOUT_MS;
use vehiclemanager_core::envelope::ApiResponse;
use vehiclemanager_core::errors::{Error, Result, ValidationError};
use vehiclemanager_core::settings::{SourceKind, SourceSettings};
use vehiclemanager_core::utils::valuation_date_today;
use vehiclemanager_core::vehicles::{Vehicle, VehicleFields, VehicleSourceTrait};

/// Vehicle source that talks to the remote vehicles API.
#[derive(Debug, Clone)]
pub struct RemoteVehicleSource {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteVehicleSource {
    /// Create a new client for the collection at `base_url`.
    ///
    /// No request is made; use [`RemoteVehicleSource::connect`] to verify
    /// the service is reachable.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from settings and probe the list endpoint.
    ///
    /// An unreachable service fails here with `Error::Connectivity`.
    pub async fn connect(settings: &SourceSettings) -> Result<Self> {
        let source = Self::new(&settings.api_base_url, Some(settings.request_timeout))?;
        source.probe().await?;
        info!("Connected to vehicles API at {}", source.base_url);
        Ok(source)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn probe(&self) -> Result<()> {
        let _: Vec<Vehicle> = self.send(self.client.get(&self.base_url)).await?;
        Ok(())
    }

    fn item_url(&self, vehicle_id: i64) -> String {
        format!("{}/{}", self.base_url, vehicle_id)
    }

    /// Send a request and unwrap the `data` of a successful envelope.
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let envelope = self.send_envelope::<T>(request).await?;
        envelope
            .into_data()
            .ok_or_else(|| Error::Protocol("Response envelope carries no data".to_string()))
    }

    async fn send_envelope<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>> {
        let response = request.send().await.map_err(transport_error)?;
        parse_response(response).await
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Connectivity(format!("Request timed out: {}", err))
    } else {
        Error::Connectivity(format!("Request failed: {}", err))
    }
}

/// Parse an API response, mapping failure statuses onto error kinds.
async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<ApiResponse<T>> {
    let status = response.status();
    let url = response.url().to_string();
    let body = response.text().await.map_err(transport_error)?;
    debug!("[VehiclesApi] {} -> {}", url, status);

    if status.is_server_error() {
        return Err(Error::Connectivity(format!(
            "Vehicles API returned {}: {}",
            status,
            error_message(&body)
        )));
    }

    if !status.is_success() {
        let message = error_message(&body);
        return Err(match status {
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::BAD_REQUEST => ValidationError::InvalidInput(message).into(),
            _ => Error::Protocol(format!("Unexpected status {}: {}", status, message)),
        });
    }

    let envelope: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
        Error::Protocol(format!(
            "Failed to parse response: {} - {}",
            e,
            body.chars().take(200).collect::<String>()
        ))
    })?;

    if !envelope.success {
        return Err(Error::Protocol(format!(
            "Request reported failure with status {}: {}",
            status, envelope.message
        )));
    }
    Ok(envelope)
}

/// Best-effort message from an error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiResponse<serde_json::Value>>(body) {
        Ok(err) => match err.details {
            Some(details) if !details.is_empty() => format!("{} ({})", err.message, details),
            _ => err.message,
        },
        Err(_) => body.chars().take(200).collect(),
    }
}

#[async_trait]
impl VehicleSourceTrait for RemoteVehicleSource {
    fn kind(&self) -> SourceKind {
        SourceKind::RemoteService
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        let vehicles: Vec<Vehicle> = self.send(self.client.get(&self.base_url)).await?;
        Ok(revalue_all(vehicles))
    }

    async fn get_vehicle(&self, vehicle_id: i64) -> Result<Vehicle> {
        let vehicle: Vehicle = self.send(self.client.get(self.item_url(vehicle_id))).await?;
        Ok(vehicle.revalued(valuation_date_today()))
    }

    async fn search_vehicles(&self, text: &str) -> Result<Vec<Vehicle>> {
        if text.is_empty() {
            return self.list_vehicles().await;
        }
        let request = self.client.get(&self.base_url).query(&[("search", text)]);
        let vehicles: Vec<Vehicle> = self.send(request).await?;
        Ok(revalue_all(vehicles))
    }

    async fn create_vehicle(&self, fields: VehicleFields) -> Result<Vehicle> {
        let vehicle: Vehicle = self
            .send(self.client.post(&self.base_url).json(&fields))
            .await?;
        Ok(vehicle.revalued(valuation_date_today()))
    }

    async fn update_vehicle(&self, vehicle_id: i64, fields: VehicleFields) -> Result<Vehicle> {
        let vehicle: Vehicle = self
            .send(self.client.put(self.item_url(vehicle_id)).json(&fields))
            .await?;
        Ok(vehicle.revalued(valuation_date_today()))
    }

    async fn delete_vehicle(&self, vehicle_id: i64) -> Result<()> {
        // A successful delete carries no data.
        self.send_envelope::<serde_json::Value>(self.client.delete(self.item_url(vehicle_id)))
            .await?;
        Ok(())
    }
}

fn revalue_all(vehicles: Vec<Vehicle>) -> Vec<Vehicle> {
    let today = valuation_date_today();
    vehicles.into_iter().map(|v| v.revalued(today)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vehiclemanager_core::constants::DEFAULT_API_URL;

    #[test]
    fn test_error_message_includes_details() {
        let body = r#"{"success":false,"message":"Missing required field: make","details":"POST body"}"#;
        assert_eq!(
            error_message(body),
            "Missing required field: make (POST body)"
        );
        assert_eq!(error_message("<html>oops</html>"), "<html>oops</html>");
    }

    #[test]
    fn test_base_url_is_normalized() {
        let source = RemoteVehicleSource::new("http://localhost:8001/api/vehicles/", None).unwrap();
        assert_eq!(source.base_url(), "http://localhost:8001/api/vehicles");
        assert_eq!(source.item_url(3), "http://localhost:8001/api/vehicles/3");
    }

    #[test]
    fn test_default_settings_target_default_api_url() {
        let source = RemoteVehicleSource::new(&SourceSettings::default().api_base_url, None).unwrap();
        assert_eq!(source.base_url(), DEFAULT_API_URL);
    }
}
