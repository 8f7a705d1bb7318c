use model::{Driver, Vehicle, VehicleType};
use serde::Deserialize;
use sqlx::prelude::FromRow;
use utility::id::Id;

/// One row per driver, with its vehicles pre-aggregated into a JSON array by
/// the query (ordered by `position`) so a driver and its fleet come back in
/// a single round trip.
#[derive(Debug, Clone, FromRow)]
pub struct DriverWithVehiclesRow {
    pub id: i64,
    pub user_ref: String,
    pub current_location: String,
    pub license_number: String,
    pub rating: f64,
    pub total_trips: i32,
    pub is_available: bool,
    pub vehicles: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct VehicleJson {
    id: i64,
    capacity: i32,
    vehicle_type: String,
}

impl DriverWithVehiclesRow {
    pub fn to_model(self) -> Driver {
        let vehicles: Vec<VehicleJson> = serde_json::from_value(self.vehicles).unwrap_or_default();
        Driver {
            id: Id::new(self.id),
            user_ref: self.user_ref,
            current_location: self.current_location,
            license_number: self.license_number,
            rating: self.rating,
            total_trips: self.total_trips as u32,
            is_available: self.is_available,
            vehicles: vehicles
                .into_iter()
                .map(|v| Vehicle {
                    id: Id::new(v.id),
                    capacity: v.capacity as u32,
                    vehicle_type: vehicle_type_from_str(&v.vehicle_type),
                })
                .collect(),
        }
    }
}

fn vehicle_type_from_str(raw: &str) -> VehicleType {
    match raw {
        "suv" => VehicleType::Suv,
        "van" => VehicleType::Van,
        "truck" => VehicleType::Truck,
        _ => VehicleType::Sedan,
    }
}
