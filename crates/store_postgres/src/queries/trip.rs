use dispatch::assembler::within_proximity;
use dispatch::error::Result;
use dispatch::store::NewTrip;
use model::{Trip, TripId, TripStatus};
use sqlx::{Executor, Postgres};

use crate::data_model::{trip_status_to_str, trip::TripRow};

use super::convert_error;

/// Candidate trips are narrowed in SQL by seat count and status, then by
/// exact endpoint proximity in Rust with the same haversine check the engine
/// uses elsewhere - keeps the distance metric in one place instead of
/// duplicating it as a PostGIS expression.
pub async fn find_active<'c, E>(
    executor: E,
    from: &str,
    to: &str,
    min_seats: u32,
    proximity_threshold_m: f64,
) -> Result<Option<Trip>>
where
    E: Executor<'c, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, TripRow>(
        "
        SELECT id, from_location, to_location, departure_time, available_seats,
               price_per_seat, driver_id, vehicle_id, route_coordinates, status
        FROM trips
        WHERE status IN ('pending', 'in_progress') AND available_seats >= $1
        ORDER BY id;
        ",
    )
    .bind(min_seats as i32)
    .fetch_all(executor)
    .await
    .map_err(convert_error)?;

    for row in rows {
        let trip = row.to_model();
        if within_proximity(&trip.from, from, proximity_threshold_m)
            && within_proximity(&trip.to, to, proximity_threshold_m)
        {
            return Ok(Some(trip));
        }
    }
    Ok(None)
}

pub async fn create<'c, E>(executor: E, spec: NewTrip) -> Result<Trip>
where
    E: Executor<'c, Database = Postgres>,
{
    let route_coordinates = spec
        .route_coordinates
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .expect("RouteCoordinates always serializes");

    sqlx::query_as::<_, TripRow>(
        "
        INSERT INTO trips(
            from_location, to_location, departure_time, available_seats,
            price_per_seat, driver_id, vehicle_id, route_coordinates, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, from_location, to_location, departure_time, available_seats,
                  price_per_seat, driver_id, vehicle_id, route_coordinates, status;
        ",
    )
    .bind(spec.from)
    .bind(spec.to)
    .bind(spec.departure_time)
    .bind(spec.available_seats as i32)
    .bind(spec.price_per_seat)
    .bind(spec.driver_id.raw())
    .bind(spec.vehicle_id.raw())
    .bind(route_coordinates)
    .bind(trip_status_to_str(spec.status))
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(TripRow::to_model)
}

pub async fn update_seats<'c, E>(
    executor: E,
    id: TripId,
    available_seats: u32,
    status: TripStatus,
) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        "
        UPDATE trips SET available_seats = $1, status = $2 WHERE id = $3;
        ",
    )
    .bind(available_seats as i32)
    .bind(trip_status_to_str(status))
    .bind(id.raw())
    .execute(executor)
    .await
    .map_err(convert_error)?;
    Ok(())
}
