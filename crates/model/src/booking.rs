use serde::{Deserialize, Serialize};

use crate::{BookingId, BookingStatus, TripId};

/// `seats` holds one opaque label per seat booked (e.g. passenger names), so
/// its length is the authoritative seat count for this booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub trip_id: TripId,
    pub customer_ref: String,
    pub seats: Vec<String>,
    pub total_price: f64,
    pub status: BookingStatus,
}
