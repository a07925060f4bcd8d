//! In-memory vehicle source seeded with sample data.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use rust_decimal_macros::dec;

use crate::errors::{Error, Result};
use crate::settings::SourceKind;
use crate::utils::valuation_date_today;
use crate::vehicles::vehicles_model::{NewVehicle, Vehicle, VehicleFields};
use crate::vehicles::vehicles_traits::VehicleSourceTrait;

struct FixtureState {
    vehicles: Vec<Vehicle>,
    /// Highest id ever issued, so ids of deleted vehicles are never reused.
    last_issued_id: i64,
}

/// Vehicle source backed by a process-local list.
///
/// Used when offline mode is configured and as the fallback when the
/// preferred store cannot be initialized.
pub struct FixtureVehicleSource {
    state: RwLock<FixtureState>,
}

impl FixtureVehicleSource {
    /// Creates a fixture holding the three sample vehicles.
    pub fn new() -> Self {
        Self::with_vehicles(sample_vehicles())
    }

    pub fn empty() -> Self {
        Self::with_vehicles(Vec::new())
    }

    pub fn with_vehicles(vehicles: Vec<NewVehicle>) -> Self {
        let today = valuation_date_today();
        let vehicles: Vec<Vehicle> = vehicles
            .into_iter()
            .zip(1..)
            .map(|(v, id)| v.into_vehicle(id, today))
            .collect();
        let last_issued_id = vehicles.len() as i64;
        FixtureVehicleSource {
            state: RwLock::new(FixtureState {
                vehicles,
                last_issued_id,
            }),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, FixtureState>> {
        self.state
            .read()
            .map_err(|_| Error::Unexpected("fixture lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, FixtureState>> {
        self.state
            .write()
            .map_err(|_| Error::Unexpected("fixture lock poisoned".to_string()))
    }
}

impl Default for FixtureVehicleSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VehicleSourceTrait for FixtureVehicleSource {
    fn kind(&self) -> SourceKind {
        SourceKind::InMemoryFixture
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        let today = valuation_date_today();
        Ok(self
            .read()?
            .vehicles
            .iter()
            .cloned()
            .map(|v| v.revalued(today))
            .collect())
    }

    async fn get_vehicle(&self, vehicle_id: i64) -> Result<Vehicle> {
        self.read()?
            .vehicles
            .iter()
            .find(|v| v.id == vehicle_id)
            .cloned()
            .map(|v| v.revalued(valuation_date_today()))
            .ok_or_else(|| Error::not_found(vehicle_id))
    }

    async fn search_vehicles(&self, text: &str) -> Result<Vec<Vehicle>> {
        let needle = text.to_lowercase();
        let today = valuation_date_today();
        Ok(self
            .read()?
            .vehicles
            .iter()
            .filter(|v| v.matches_search(&needle))
            .cloned()
            .map(|v| v.revalued(today))
            .collect())
    }

    async fn create_vehicle(&self, fields: VehicleFields) -> Result<Vehicle> {
        let today = valuation_date_today();
        let new_vehicle = fields.into_new_vehicle(today)?;

        let mut state = self.write()?;
        let max_existing = state.vehicles.iter().map(|v| v.id).max().unwrap_or(0);
        let id = max_existing.max(state.last_issued_id) + 1;
        state.last_issued_id = id;

        let vehicle = new_vehicle.into_vehicle(id, today);
        state.vehicles.push(vehicle.clone());
        debug!("Fixture created vehicle {}", id);
        Ok(vehicle)
    }

    async fn update_vehicle(&self, vehicle_id: i64, fields: VehicleFields) -> Result<Vehicle> {
        let mut state = self.write()?;
        let existing = state
            .vehicles
            .iter_mut()
            .find(|v| v.id == vehicle_id)
            .ok_or_else(|| Error::not_found(vehicle_id))?;

        let updated = existing.with_fields(fields, valuation_date_today())?;
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete_vehicle(&self, vehicle_id: i64) -> Result<()> {
        let mut state = self.write()?;
        let before = state.vehicles.len();
        state.vehicles.retain(|v| v.id != vehicle_id);
        if state.vehicles.len() == before {
            return Err(Error::not_found(vehicle_id));
        }
        debug!("Fixture deleted vehicle {}", vehicle_id);
        Ok(())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// The sample inventory served in offline mode.
pub fn sample_vehicles() -> Vec<NewVehicle> {
    vec![
        NewVehicle {
            make: "Volkswagen".to_string(),
            model: "Golf".to_string(),
            year: 2020,
            purchase_price: dec!(25000.00),
            power: 150,
            mileage: 45000,
            fuel_type: "Benzin".to_string(),
            transmission: "Manuell".to_string(),
            color: "Blau".to_string(),
            purchase_date: date(2020, 3, 15),
            vehicle_class: "PKW".to_string(),
            extras: "Klimaanlage, Navigationssystem".to_string(),
        },
        NewVehicle {
            make: "BMW".to_string(),
            model: "X3".to_string(),
            year: 2019,
            purchase_price: dec!(45000.00),
            power: 190,
            mileage: 67000,
            fuel_type: "Diesel".to_string(),
            transmission: "Automatik".to_string(),
            color: "Schwarz".to_string(),
            purchase_date: date(2019, 7, 22),
            vehicle_class: "SUV".to_string(),
            extras: "Ledersitze, Panoramadach".to_string(),
        },
        NewVehicle {
            make: "Mercedes-Benz".to_string(),
            model: "A-Klasse".to_string(),
            year: 2021,
            purchase_price: dec!(32000.00),
            power: 163,
            mileage: 23000,
            fuel_type: "Benzin".to_string(),
            transmission: "Automatik".to_string(),
            color: "Weiß".to_string(),
            purchase_date: date(2021, 1, 10),
            vehicle_class: "PKW".to_string(),
            extras: "MBUX, LED-Scheinwerfer".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::valuation::calculate_current_value;

    fn golf_fields() -> VehicleFields {
        VehicleFields::from(sample_vehicles().remove(0))
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let source = FixtureVehicleSource::new();
        let ids: Vec<i64> = source
            .list_vehicles()
            .await
            .unwrap()
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_on_make_and_model() {
        let source = FixtureVehicleSource::new();
        for text in ["bmw", "BMW", "Bmw"] {
            let found = source.search_vehicles(text).await.unwrap();
            assert_eq!(found.len(), 1, "search '{}'", text);
            assert_eq!(found[0].model, "X3");
        }
        assert_eq!(source.search_vehicles("klasse").await.unwrap().len(), 1);
        assert_eq!(source.search_vehicles("").await.unwrap().len(), 3);
        assert!(source.search_vehicles("Audi").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let source = FixtureVehicleSource::new();
        let created = source.create_vehicle(golf_fields()).await.unwrap();
        assert_eq!(created.id, 4);

        let fetched = source.get_vehicle(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(
            fetched.current_value,
            calculate_current_value(
                fetched.purchase_price,
                fetched.year,
                fetched.mileage,
                valuation_date_today()
            )
        );
    }

    #[tokio::test]
    async fn test_create_on_empty_fixture_starts_at_one() {
        let source = FixtureVehicleSource::empty();
        let created = source.create_vehicle(golf_fields()).await.unwrap();
        assert_eq!(created.id, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_required_field() {
        let source = FixtureVehicleSource::new();
        let mut fields = golf_fields();
        fields.color = None;
        let err = source.create_vehicle(fields).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(source.list_vehicles().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ids_are_never_reused_after_delete() {
        let source = FixtureVehicleSource::new();
        let created = source.create_vehicle(golf_fields()).await.unwrap();
        source.delete_vehicle(created.id).await.unwrap();

        let next = source.create_vehicle(golf_fields()).await.unwrap();
        assert_eq!(next.id, created.id + 1);
    }

    #[tokio::test]
    async fn test_delete_twice_returns_not_found() {
        let source = FixtureVehicleSource::new();
        source.delete_vehicle(2).await.unwrap();
        let err = source.delete_vehicle(2).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_preserves_id_and_purchase_date() {
        let source = FixtureVehicleSource::new();
        let updated = source
            .update_vehicle(
                2,
                VehicleFields {
                    color: Some("Grau".to_string()),
                    mileage: Some(70000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, 2);
        assert_eq!(updated.color, "Grau");
        assert_eq!(updated.mileage, 70000);
        assert_eq!(updated.purchase_date, date(2019, 7, 22));
        assert_eq!(source.get_vehicle(2).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_unknown_id_returns_not_found() {
        let source = FixtureVehicleSource::new();
        let err = source
            .update_vehicle(42, VehicleFields::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
