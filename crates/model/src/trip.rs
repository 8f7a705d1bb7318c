use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Coordinate, DriverId, TripId, TripStatus, VehicleId};

/// `pickup`/`dropoff` are the nearest-neighbor sequences produced by
/// `dispatch::routing` over the cluster's from- and to-points respectively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteCoordinates {
    pub pickup: Vec<Coordinate>,
    pub dropoff: Vec<Coordinate>,
}

/// `from`/`to` are preserved verbatim from the seed request's wire strings,
/// not recomputed from the parsed coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub from: String,
    pub to: String,
    pub departure_time: DateTime<Utc>,
    pub available_seats: u32,
    pub price_per_seat: f64,
    pub driver_id: DriverId,
    pub vehicle_id: VehicleId,
    pub route_coordinates: Option<RouteCoordinates>,
    pub status: TripStatus,
}
