//! Tests for vehicle field validation and patching.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use crate::errors::{Error, ErrorKind, ValidationError};
use crate::vehicles::{sample_vehicles, Vehicle, VehicleFields};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn complete_fields() -> VehicleFields {
    VehicleFields {
        make: Some("Skoda".to_string()),
        model: Some("Octavia".to_string()),
        year: Some(2022),
        purchase_price: Some(dec!(28990.555)),
        power: Some(110),
        mileage: Some(0),
        fuel_type: Some("Diesel".to_string()),
        transmission: Some("DSG".to_string()),
        color: Some("Silber".to_string()),
        purchase_date: NaiveDate::from_ymd_opt(2022, 5, 2),
        vehicle_class: Some("Kombi".to_string()),
        extras: None,
    }
}

fn stored_vehicle() -> Vehicle {
    sample_vehicles().remove(1).into_vehicle(2, today())
}

// ==================== Create validation ====================

#[test]
fn test_complete_fields_validate() {
    let new_vehicle = complete_fields().into_new_vehicle(today()).unwrap();
    assert_eq!(new_vehicle.make, "Skoda");
    assert_eq!(new_vehicle.extras, "");
    assert_eq!(new_vehicle.mileage, 0);
}

#[test]
fn test_purchase_price_is_rounded_half_up_to_cents() {
    let new_vehicle = complete_fields().into_new_vehicle(today()).unwrap();
    assert_eq!(new_vehicle.purchase_price, dec!(28990.56));
}

#[test]
fn test_text_fields_are_trimmed() {
    let mut fields = complete_fields();
    fields.make = Some("  Skoda ".to_string());
    let new_vehicle = fields.into_new_vehicle(today()).unwrap();
    assert_eq!(new_vehicle.make, "Skoda");
}

#[test]
fn test_each_required_field_is_enforced() {
    let cases: [(&str, fn(&mut VehicleFields)); 11] = [
        ("make", |f: &mut VehicleFields| f.make = None),
        ("model", |f: &mut VehicleFields| f.model = None),
        ("year", |f: &mut VehicleFields| f.year = None),
        ("purchasePrice", |f: &mut VehicleFields| f.purchase_price = None),
        ("power", |f: &mut VehicleFields| f.power = None),
        ("mileage", |f: &mut VehicleFields| f.mileage = None),
        ("fuelType", |f: &mut VehicleFields| f.fuel_type = None),
        ("transmission", |f: &mut VehicleFields| f.transmission = None),
        ("color", |f: &mut VehicleFields| f.color = None),
        ("purchaseDate", |f: &mut VehicleFields| f.purchase_date = None),
        ("vehicleClass", |f: &mut VehicleFields| f.vehicle_class = None),
    ];

    for (field, clear) in cases {
        let mut fields = complete_fields();
        clear(&mut fields);
        match fields.into_new_vehicle(today()) {
            Err(Error::Validation(ValidationError::MissingField(name))) => {
                assert_eq!(name, field)
            }
            other => panic!("expected missing '{}', got {:?}", field, other),
        }
    }
}

#[test]
fn test_blank_string_counts_as_missing() {
    let mut fields = complete_fields();
    fields.model = Some("   ".to_string());
    let err = fields.into_new_vehicle(today()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_year_range_is_enforced() {
    let mut fields = complete_fields();
    fields.year = Some(1899);
    assert!(fields.clone().into_new_vehicle(today()).is_err());

    fields.year = Some(2027);
    assert!(fields.clone().into_new_vehicle(today()).is_err());

    fields.year = Some(2026);
    assert!(fields.into_new_vehicle(today()).is_ok());
}

#[test]
fn test_negative_numbers_are_rejected() {
    let mut fields = complete_fields();
    fields.purchase_price = Some(dec!(-1));
    assert!(fields.into_new_vehicle(today()).is_err());

    let mut fields = complete_fields();
    fields.mileage = Some(-5);
    assert!(fields.into_new_vehicle(today()).is_err());

    let mut fields = complete_fields();
    fields.power = Some(-1);
    assert!(fields.into_new_vehicle(today()).is_err());
}

// ==================== Patching ====================

#[test]
fn test_with_fields_applies_only_present_fields() {
    let vehicle = stored_vehicle();
    let patched = vehicle
        .with_fields(
            VehicleFields {
                color: Some("Rot".to_string()),
                ..Default::default()
            },
            today(),
        )
        .unwrap();

    assert_eq!(patched.id, vehicle.id);
    assert_eq!(patched.color, "Rot");
    assert_eq!(patched.make, vehicle.make);
    assert_eq!(patched.purchase_date, vehicle.purchase_date);
    assert_eq!(patched.current_value, vehicle.current_value);
}

#[test]
fn test_with_fields_revalues_on_price_change() {
    let vehicle = stored_vehicle();
    let patched = vehicle
        .with_fields(
            VehicleFields {
                purchase_price: Some(dec!(90000)),
                ..Default::default()
            },
            today(),
        )
        .unwrap();
    // 6 years of age: 1 - 0.475
    assert_eq!(patched.current_value, dec!(47250.00));
}

#[test]
fn test_with_fields_rejects_blank_text() {
    let vehicle = stored_vehicle();
    let err = vehicle
        .with_fields(
            VehicleFields {
                make: Some(String::new()),
                ..Default::default()
            },
            today(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// ==================== Serialization ====================

#[test]
fn test_vehicle_serializes_camel_case() {
    let json = serde_json::to_value(stored_vehicle()).unwrap();
    assert_eq!(json["make"], "BMW");
    assert_eq!(json["purchaseDate"], "2019-07-22");
    assert_eq!(json["vehicleClass"], "SUV");
    assert!(json.get("currentValue").is_some());
}

#[test]
fn test_partial_fields_skip_absent_keys() {
    let fields = VehicleFields {
        mileage: Some(1234),
        ..Default::default()
    };
    let json = serde_json::to_value(&fields).unwrap();
    assert_eq!(json, serde_json::json!({ "mileage": 1234 }));
}

#[test]
fn test_display_mentions_make_model_and_year() {
    let vehicle = stored_vehicle();
    assert!(vehicle.to_string().starts_with("BMW X3 (2019)"));
}
