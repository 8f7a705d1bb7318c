use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DeliveryRequestId, PassengerRequestId, RequestStatus};

/// A pending ride. `from`/`to` are kept in their raw `"lat,lon"` wire form —
/// exactly as intake wrote them — and are only parsed when the engine needs
/// the numeric coordinates (see `dispatch::geo::parse_coordinate`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerRequest {
    pub id: PassengerRequestId,
    pub requester_ref: String,
    pub from: String,
    pub to: String,
    pub departure_time: DateTime<Utc>,
    pub passenger_count: u32,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub id: DeliveryRequestId,
    pub sender_ref: String,
    pub from: String,
    pub to: String,
    pub item_description: String,
    pub weight: f64,
    pub insurance_amount: Option<f64>,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub status: RequestStatus,
}
