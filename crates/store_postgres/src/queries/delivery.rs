use dispatch::error::Result;
use dispatch::store::NewDelivery;
use model::Delivery;
use sqlx::{Executor, Postgres};

use crate::data_model::{delivery::DeliveryRow, delivery_status_to_str};

use super::convert_error;

pub async fn create<'c, E>(executor: E, spec: NewDelivery) -> Result<Delivery>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, DeliveryRow>(
        "
        INSERT INTO deliveries(
            trip_id, sender_ref, receiver_name, receiver_phone, item_description,
            weight, insurance_amount, delivery_code, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, trip_id, sender_ref, receiver_name, receiver_phone, item_description,
                  weight, insurance_amount, delivery_code, status;
        ",
    )
    .bind(spec.trip_id.raw())
    .bind(spec.sender_ref)
    .bind(spec.receiver_name)
    .bind(spec.receiver_phone)
    .bind(spec.item_description)
    .bind(spec.weight)
    .bind(spec.insurance_amount)
    .bind(spec.delivery_code)
    .bind(delivery_status_to_str(spec.status))
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(DeliveryRow::to_model)
}
