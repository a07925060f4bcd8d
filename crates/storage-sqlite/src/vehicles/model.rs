//! Database model for vehicles.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::errors::StorageError;
use vehiclemanager_core::vehicles::{NewVehicle, Vehicle};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database model for vehicles
///
/// Prices and dates are stored as TEXT to keep exact decimal values.
#[derive(Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::vehicles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VehicleDB {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub purchase_price: String,
    pub power: i32,
    pub mileage: i32,
    pub fuel_type: String,
    pub transmission: String,
    pub color: String,
    pub purchase_date: String,
    pub vehicle_class: String,
    pub extras: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable row for a vehicle without an id; the database assigns it.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::vehicles)]
pub struct NewVehicleDB {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub purchase_price: String,
    pub power: i32,
    pub mileage: i32,
    pub fuel_type: String,
    pub transmission: String,
    pub color: String,
    pub purchase_date: String,
    pub vehicle_class: String,
    pub extras: String,
}

impl VehicleDB {
    /// Converts the row into a domain vehicle valued as of `as_of`.
    pub fn into_vehicle(self, as_of: NaiveDate) -> Result<Vehicle, StorageError> {
        let purchase_price = Decimal::from_str(&self.purchase_price).map_err(|e| {
            StorageError::Decode(format!(
                "vehicle {} has invalid purchase_price '{}': {}",
                self.id, self.purchase_price, e
            ))
        })?;
        let purchase_date =
            NaiveDate::parse_from_str(&self.purchase_date, DATE_FORMAT).map_err(|e| {
                StorageError::Decode(format!(
                    "vehicle {} has invalid purchase_date '{}': {}",
                    self.id, self.purchase_date, e
                ))
            })?;

        Ok(Vehicle {
            id: self.id,
            make: self.make,
            model: self.model,
            year: self.year,
            purchase_price,
            power: self.power,
            mileage: self.mileage,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            color: self.color,
            purchase_date,
            vehicle_class: self.vehicle_class,
            extras: self.extras,
            current_value: Decimal::ZERO,
        }
        .revalued(as_of))
    }

    /// Copies the editable columns from `vehicle`, stamping `updated_at`.
    pub fn apply(&mut self, vehicle: &Vehicle, now: NaiveDateTime) {
        self.make = vehicle.make.clone();
        self.model = vehicle.model.clone();
        self.year = vehicle.year;
        self.purchase_price = vehicle.purchase_price.to_string();
        self.power = vehicle.power;
        self.mileage = vehicle.mileage;
        self.fuel_type = vehicle.fuel_type.clone();
        self.transmission = vehicle.transmission.clone();
        self.color = vehicle.color.clone();
        self.purchase_date = vehicle.purchase_date.format(DATE_FORMAT).to_string();
        self.vehicle_class = vehicle.vehicle_class.clone();
        self.extras = vehicle.extras.clone();
        self.updated_at = now;
    }
}

impl From<NewVehicle> for NewVehicleDB {
    fn from(domain: NewVehicle) -> Self {
        Self {
            make: domain.make,
            model: domain.model,
            year: domain.year,
            purchase_price: domain.purchase_price.to_string(),
            power: domain.power,
            mileage: domain.mileage,
            fuel_type: domain.fuel_type,
            transmission: domain.transmission,
            color: domain.color,
            purchase_date: domain.purchase_date.format(DATE_FORMAT).to_string(),
            vehicle_class: domain.vehicle_class,
            extras: domain.extras,
        }
    }
}
