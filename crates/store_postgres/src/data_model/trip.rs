use chrono::{DateTime, Utc};
use model::{RouteCoordinates, Trip};
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::trip_status_from_str;

#[derive(Debug, Clone, FromRow)]
pub struct TripRow {
    pub id: i64,
    pub from_location: String,
    pub to_location: String,
    pub departure_time: DateTime<Utc>,
    pub available_seats: i32,
    pub price_per_seat: f64,
    pub driver_id: i64,
    pub vehicle_id: i64,
    pub route_coordinates: Option<serde_json::Value>,
    pub status: String,
}

impl TripRow {
    pub fn to_model(self) -> Trip {
        Trip {
            id: Id::new(self.id),
            from: self.from_location,
            to: self.to_location,
            departure_time: self.departure_time,
            available_seats: self.available_seats as u32,
            price_per_seat: self.price_per_seat,
            driver_id: Id::new(self.driver_id),
            vehicle_id: Id::new(self.vehicle_id),
            route_coordinates: self
                .route_coordinates
                .and_then(|value| serde_json::from_value::<RouteCoordinates>(value).ok()),
            status: trip_status_from_str(&self.status),
        }
    }
}
