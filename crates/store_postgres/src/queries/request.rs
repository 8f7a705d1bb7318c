use dispatch::error::Result;
use model::{DeliveryRequest, DeliveryRequestId, PassengerRequest, PassengerRequestId, RequestStatus};
use sqlx::{Executor, Postgres};

use crate::data_model::request::{DeliveryRequestRow, PassengerRequestRow};
use crate::data_model::request_status_to_str;

use super::convert_error;

pub async fn list_pending_passenger<'c, E>(executor: E) -> Result<Vec<PassengerRequest>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, PassengerRequestRow>(
        "
        SELECT id, requester_ref, from_location, to_location, departure_time, passenger_count, status
        FROM passenger_requests
        WHERE status = 'pending'
        ORDER BY id;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)
    .map(|rows| rows.into_iter().map(PassengerRequestRow::to_model).collect())
}

pub async fn list_pending_delivery<'c, E>(executor: E) -> Result<Vec<DeliveryRequest>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, DeliveryRequestRow>(
        "
        SELECT id, sender_ref, from_location, to_location, item_description, weight,
               insurance_amount, receiver_name, receiver_phone, status
        FROM delivery_requests
        WHERE status = 'pending'
        ORDER BY id;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)
    .map(|rows| rows.into_iter().map(DeliveryRequestRow::to_model).collect())
}

pub async fn set_passenger_status_if_pending<'c, E>(
    executor: E,
    id: PassengerRequestId,
    status: RequestStatus,
) -> Result<bool>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query(
        "
        UPDATE passenger_requests
        SET status = $1
        WHERE id = $2 AND status = 'pending';
        ",
    )
    .bind(request_status_to_str(status))
    .bind(id.raw())
    .execute(executor)
    .await
    .map_err(convert_error)?;
    Ok(result.rows_affected() == 1)
}

pub async fn set_delivery_status_if_pending<'c, E>(
    executor: E,
    id: DeliveryRequestId,
    status: RequestStatus,
) -> Result<bool>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query(
        "
        UPDATE delivery_requests
        SET status = $1
        WHERE id = $2 AND status = 'pending';
        ",
    )
    .bind(request_status_to_str(status))
    .bind(id.raw())
    .execute(executor)
    .await
    .map_err(convert_error)?;
    Ok(result.rows_affected() == 1)
}
