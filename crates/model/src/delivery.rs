use serde::{Deserialize, Serialize};

use crate::{DeliveryId, DeliveryStatus, TripId};

/// `delivery_code` is the zero-padded handoff code handed to the receiver;
/// assigned once at creation, never regenerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub trip_id: TripId,
    pub sender_ref: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub item_description: String,
    pub weight: f64,
    pub insurance_amount: Option<f64>,
    pub delivery_code: String,
    pub status: DeliveryStatus,
}
