use chrono::{DateTime, Utc};
use model::{DeliveryRequest, PassengerRequest};
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::request_status_from_str;

#[derive(Debug, Clone, FromRow)]
pub struct PassengerRequestRow {
    pub id: i64,
    pub requester_ref: String,
    pub from_location: String,
    pub to_location: String,
    pub departure_time: DateTime<Utc>,
    pub passenger_count: i32,
    pub status: String,
}

impl PassengerRequestRow {
    pub fn to_model(self) -> PassengerRequest {
        PassengerRequest {
            id: Id::new(self.id),
            requester_ref: self.requester_ref,
            from: self.from_location,
            to: self.to_location,
            departure_time: self.departure_time,
            passenger_count: self.passenger_count as u32,
            status: request_status_from_str(&self.status),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DeliveryRequestRow {
    pub id: i64,
    pub sender_ref: String,
    pub from_location: String,
    pub to_location: String,
    pub item_description: String,
    pub weight: f64,
    pub insurance_amount: Option<f64>,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub status: String,
}

impl DeliveryRequestRow {
    pub fn to_model(self) -> DeliveryRequest {
        DeliveryRequest {
            id: Id::new(self.id),
            sender_ref: self.sender_ref,
            from: self.from_location,
            to: self.to_location,
            item_description: self.item_description,
            weight: self.weight,
            insurance_amount: self.insurance_amount,
            receiver_name: self.receiver_name,
            receiver_phone: self.receiver_phone,
            status: request_status_from_str(&self.status),
        }
    }
}
