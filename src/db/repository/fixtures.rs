//! Shared builders for repository and service tests.

use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;

use super::*;
use crate::geo::Coordinate;
use crate::models::enums::MedicineForm;
use crate::models::*;

static LICENSE_SEQ: AtomicU32 = AtomicU32::new(1);

pub fn coordinate(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(
        Decimal::try_from(lat).unwrap(),
        Decimal::try_from(lng).unwrap(),
    )
    .unwrap()
}

pub fn new_seller(name: &str, lat: f64, lng: f64) -> NewSeller {
    NewSeller {
        name: name.into(),
        address: "1 Test Street".into(),
        city: "Testville".into(),
        state: "NY".into(),
        zip_code: "10001".into(),
        phone_number: "555-0100".into(),
        email: None,
        license_number: format!("LIC-T{}", LICENSE_SEQ.fetch_add(1, Ordering::Relaxed)),
        latitude: Decimal::try_from(lat).unwrap(),
        longitude: Decimal::try_from(lng).unwrap(),
        description: None,
    }
}

pub fn make_seller(conn: &Connection, name: &str, lat: f64, lng: f64, approved: bool) -> i64 {
    let seller = insert_seller(conn, &new_seller(name, lat, lng), &coordinate(lat, lng)).unwrap();
    if approved {
        set_seller_approved(conn, seller.id, true, Utc::now()).unwrap();
    }
    seller.id
}

pub fn make_medicine(conn: &Connection, name: &str, generic: Option<&str>) -> i64 {
    insert_medicine(
        conn,
        &NewMedicine {
            name: name.into(),
            generic_name: generic.map(Into::into),
            manufacturer: None,
            form: MedicineForm::Tablet,
            strength: None,
            unit: None,
            requires_prescription: false,
            description: None,
        },
    )
    .unwrap()
    .id
}

pub fn make_stock(conn: &Connection, seller_id: i64, medicine_id: i64, quantity: i64, price: &str) {
    let update = StockUpdate::new(quantity, Decimal::from_str(price).unwrap());
    insert_stock_record(conn, seller_id, medicine_id, &update, Utc::now()).unwrap();
}

pub fn make_prescription(conn: &Connection, patient: &str) -> Prescription {
    insert_prescription(
        conn,
        &NewPrescription {
            patient_name: patient.into(),
            notes: None,
            file_name: "scan.jpg".into(),
        },
        Utc::now(),
    )
    .unwrap()
}
