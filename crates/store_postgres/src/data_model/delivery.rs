use model::Delivery;
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::delivery_status_from_str;

#[derive(Debug, Clone, FromRow)]
pub struct DeliveryRow {
    pub id: i64,
    pub trip_id: i64,
    pub sender_ref: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub item_description: String,
    pub weight: f64,
    pub insurance_amount: Option<f64>,
    pub delivery_code: String,
    pub status: String,
}

impl DeliveryRow {
    pub fn to_model(self) -> Delivery {
        Delivery {
            id: Id::new(self.id),
            trip_id: Id::new(self.trip_id),
            sender_ref: self.sender_ref,
            receiver_name: self.receiver_name,
            receiver_phone: self.receiver_phone,
            item_description: self.item_description,
            weight: self.weight,
            insurance_amount: self.insurance_amount,
            delivery_code: self.delivery_code,
            status: delivery_status_from_str(&self.status),
        }
    }
}
