use serde::{Deserialize, Serialize};

use crate::{DriverId, VehicleId};

/// Availability is a semaphore the engine may only flip through the driver
/// registry's `reserve`/`release`; the field is plain data here, the
/// invariant lives in `dispatch::store::DriverRegistry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub user_ref: String,
    pub current_location: String,
    pub license_number: String,
    pub rating: f64,
    pub total_trips: u32,
    pub is_available: bool,
    /// Ordered set of vehicles; the first is the driver's primary vehicle at
    /// assignment time.
    pub vehicles: Vec<Vehicle>,
}

impl Driver {
    pub fn primary_vehicle(&self) -> Option<&Vehicle> {
        self.vehicles.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Sedan,
    Suv,
    Van,
    Truck,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub capacity: u32,
    pub vehicle_type: VehicleType,
}
