//! Vehicle domain models.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::constants::{DISPLAY_DECIMAL_PRECISION, MIN_MODEL_YEAR};
use crate::errors::{Result, ValidationError};
use crate::valuation::calculate_current_value;

/// Domain model representing a vehicle in the inventory.
///
/// `current_value` is derived: it is never stored by any data source and is
/// refreshed through [`Vehicle::revalue`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub purchase_price: Decimal,
    pub power: i32,
    pub mileage: i32,
    pub fuel_type: String,
    pub transmission: String,
    pub color: String,
    pub purchase_date: NaiveDate,
    pub vehicle_class: String,
    #[serde(default)]
    pub extras: String,
    #[serde(default)]
    pub current_value: Decimal,
}

impl Vehicle {
    /// Recomputes and caches the current value as of `as_of`.
    pub fn revalue(&mut self, as_of: NaiveDate) -> Decimal {
        self.current_value =
            calculate_current_value(self.purchase_price, self.year, self.mileage, as_of);
        self.current_value
    }

    pub fn revalued(mut self, as_of: NaiveDate) -> Self {
        self.revalue(as_of);
        self
    }

    /// Case-insensitive substring match on make or model.
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        matches_make_or_model(&self.make, &self.model, needle)
    }

    /// Returns a copy with `fields` applied on top of this vehicle.
    ///
    /// Absent fields keep their current value; `id` never changes. The copy
    /// is revalued as of `today`.
    pub fn with_fields(&self, fields: VehicleFields, today: NaiveDate) -> Result<Vehicle> {
        let mut updated = self.clone();
        if let Some(make) = fields.make {
            updated.make = validated_text("make", make)?;
        }
        if let Some(model) = fields.model {
            updated.model = validated_text("model", model)?;
        }
        if let Some(year) = fields.year {
            updated.year = validated_year(year, today)?;
        }
        if let Some(price) = fields.purchase_price {
            updated.purchase_price = validated_price(price)?;
        }
        if let Some(power) = fields.power {
            updated.power = validated_count("power", power)?;
        }
        if let Some(mileage) = fields.mileage {
            updated.mileage = validated_count("mileage", mileage)?;
        }
        if let Some(fuel_type) = fields.fuel_type {
            updated.fuel_type = validated_text("fuelType", fuel_type)?;
        }
        if let Some(transmission) = fields.transmission {
            updated.transmission = validated_text("transmission", transmission)?;
        }
        if let Some(color) = fields.color {
            updated.color = validated_text("color", color)?;
        }
        if let Some(purchase_date) = fields.purchase_date {
            updated.purchase_date = purchase_date;
        }
        if let Some(vehicle_class) = fields.vehicle_class {
            updated.vehicle_class = validated_text("vehicleClass", vehicle_class)?;
        }
        if let Some(extras) = fields.extras {
            updated.extras = extras;
        }
        Ok(updated.revalued(today))
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) - current value: {}",
            self.make, self.model, self.year, self.current_value
        )
    }
}

/// Field set supplied by callers for create and update.
///
/// Every field is optional so the same type carries both a full record
/// (create) and a partial patch (update).
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFields {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub purchase_price: Option<Decimal>,
    pub power: Option<i32>,
    pub mileage: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub color: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub vehicle_class: Option<String>,
    pub extras: Option<String>,
}

impl VehicleFields {
    /// Validates a complete field set for creation.
    ///
    /// Every field except `extras` is required; strings must be non-empty.
    pub fn into_new_vehicle(self, today: NaiveDate) -> Result<NewVehicle> {
        Ok(NewVehicle {
            make: validated_text("make", required("make", self.make)?)?,
            model: validated_text("model", required("model", self.model)?)?,
            year: validated_year(required("year", self.year)?, today)?,
            purchase_price: validated_price(required("purchasePrice", self.purchase_price)?)?,
            power: validated_count("power", required("power", self.power)?)?,
            mileage: validated_count("mileage", required("mileage", self.mileage)?)?,
            fuel_type: validated_text("fuelType", required("fuelType", self.fuel_type)?)?,
            transmission: validated_text(
                "transmission",
                required("transmission", self.transmission)?,
            )?,
            color: validated_text("color", required("color", self.color)?)?,
            purchase_date: required("purchaseDate", self.purchase_date)?,
            vehicle_class: validated_text(
                "vehicleClass",
                required("vehicleClass", self.vehicle_class)?,
            )?,
            extras: self.extras.unwrap_or_default(),
        })
    }
}

/// A validated vehicle that has not been assigned an id yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub purchase_price: Decimal,
    pub power: i32,
    pub mileage: i32,
    pub fuel_type: String,
    pub transmission: String,
    pub color: String,
    pub purchase_date: NaiveDate,
    pub vehicle_class: String,
    pub extras: String,
}

impl NewVehicle {
    pub fn into_vehicle(self, id: i64, as_of: NaiveDate) -> Vehicle {
        Vehicle {
            id,
            make: self.make,
            model: self.model,
            year: self.year,
            purchase_price: self.purchase_price,
            power: self.power,
            mileage: self.mileage,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            color: self.color,
            purchase_date: self.purchase_date,
            vehicle_class: self.vehicle_class,
            extras: self.extras,
            current_value: Decimal::ZERO,
        }
        .revalued(as_of)
    }
}

impl From<NewVehicle> for VehicleFields {
    fn from(v: NewVehicle) -> Self {
        Self {
            make: Some(v.make),
            model: Some(v.model),
            year: Some(v.year),
            purchase_price: Some(v.purchase_price),
            power: Some(v.power),
            mileage: Some(v.mileage),
            fuel_type: Some(v.fuel_type),
            transmission: Some(v.transmission),
            color: Some(v.color),
            purchase_date: Some(v.purchase_date),
            vehicle_class: Some(v.vehicle_class),
            extras: Some(v.extras),
        }
    }
}

/// Case-insensitive substring match used by every vehicle source.
/// `needle` must already be lowercase.
pub fn matches_make_or_model(make: &str, model: &str, needle: &str) -> bool {
    make.to_lowercase().contains(needle) || model.to_lowercase().contains(needle)
}

// === Field validation ===

fn required<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| ValidationError::MissingField(field.to_string()).into())
}

fn validated_text(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field.to_string()).into());
    }
    Ok(trimmed.to_string())
}

fn validated_year(year: i32, today: NaiveDate) -> Result<i32> {
    use chrono::Datelike;

    let max_year = today.year() + 1;
    if !(MIN_MODEL_YEAR..=max_year).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "year".to_string(),
            reason: format!("{} is outside {}..={}", year, MIN_MODEL_YEAR, max_year),
        }
        .into());
    }
    Ok(year)
}

fn validated_price(price: Decimal) -> Result<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::OutOfRange {
            field: "purchasePrice".to_string(),
            reason: "must not be negative".to_string(),
        }
        .into());
    }
    Ok(price.round_dp_with_strategy(
        DISPLAY_DECIMAL_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    ))
}

fn validated_count(field: &str, value: i32) -> Result<i32> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            reason: "must not be negative".to_string(),
        }
        .into());
    }
    Ok(value)
}
