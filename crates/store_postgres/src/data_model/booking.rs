use model::Booking;
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::booking_status_from_str;

#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: i64,
    pub trip_id: i64,
    pub customer_ref: String,
    pub seats: Vec<String>,
    pub total_price: f64,
    pub status: String,
}

impl BookingRow {
    pub fn to_model(self) -> Booking {
        Booking {
            id: Id::new(self.id),
            trip_id: Id::new(self.trip_id),
            customer_ref: self.customer_ref,
            seats: self.seats,
            total_price: self.total_price,
            status: booking_status_from_str(&self.status),
        }
    }
}
