use dispatch::error::Result;
use dispatch::store::NewBooking;
use model::Booking;
use sqlx::{Executor, Postgres};

use crate::data_model::{booking::BookingRow, booking_status_to_str};

use super::convert_error;

pub async fn create<'c, E>(executor: E, spec: NewBooking) -> Result<Booking>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, BookingRow>(
        "
        INSERT INTO bookings(trip_id, customer_ref, seats, total_price, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, trip_id, customer_ref, seats, total_price, status;
        ",
    )
    .bind(spec.trip_id.raw())
    .bind(spec.customer_ref)
    .bind(spec.seats)
    .bind(spec.total_price)
    .bind(booking_status_to_str(spec.status))
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(BookingRow::to_model)
}
