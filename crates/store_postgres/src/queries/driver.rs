use dispatch::error::{DispatchError, Result};
use model::{Driver, DriverId, VehicleId};
use sqlx::{Executor, Postgres};

use crate::data_model::driver::DriverWithVehiclesRow;

use super::convert_error;

const VEHICLES_JSON: &str = "
    COALESCE(
        json_agg(
            json_build_object('id', v.id, 'capacity', v.capacity, 'vehicle_type', v.vehicle_type)
            ORDER BY v.position
        ) FILTER (WHERE v.id IS NOT NULL),
        '[]'
    )";

pub async fn list_available<'c, E>(executor: E) -> Result<Vec<Driver>>
where
    E: Executor<'c, Database = Postgres>,
{
    let query = format!(
        "
        SELECT
            d.id, d.user_ref, d.current_location, d.license_number, d.rating,
            d.total_trips, d.is_available,
            {VEHICLES_JSON} AS vehicles
        FROM drivers d
        LEFT JOIN vehicles v ON v.driver_id = d.id
        WHERE d.is_available = true
        GROUP BY d.id
        HAVING COUNT(v.id) > 0
        ORDER BY d.id;
        "
    );
    sqlx::query_as::<_, DriverWithVehiclesRow>(&query)
        .fetch_all(executor)
        .await
        .map_err(convert_error)
        .map(|rows| rows.into_iter().map(DriverWithVehiclesRow::to_model).collect())
}

pub async fn reserve<'c, E>(executor: E, id: DriverId) -> Result<Option<(Driver, VehicleId)>>
where
    E: Executor<'c, Database = Postgres>,
{
    let query = format!(
        "
        WITH updated AS (
            UPDATE drivers
            SET is_available = false
            WHERE id = $1 AND is_available = true
            RETURNING id, user_ref, current_location, license_number, rating, total_trips, is_available
        )
        SELECT
            u.id, u.user_ref, u.current_location, u.license_number, u.rating,
            u.total_trips, u.is_available,
            {VEHICLES_JSON} AS vehicles
        FROM updated u
        LEFT JOIN vehicles v ON v.driver_id = u.id
        GROUP BY u.id, u.user_ref, u.current_location, u.license_number, u.rating,
                 u.total_trips, u.is_available;
        "
    );
    let row: Option<DriverWithVehiclesRow> = sqlx::query_as(&query)
        .bind(id.raw())
        .fetch_optional(executor)
        .await
        .map_err(convert_error)?;

    let Some(row) = row else {
        return Ok(None);
    };

    let driver = row.to_model();
    let Some(vehicle_id) = driver.primary_vehicle().map(|v| v.id) else {
        return Err(DispatchError::StorePermanent(
            format!("driver {} has no vehicles", id.raw()).into(),
        ));
    };
    Ok(Some((driver, vehicle_id)))
}

pub async fn release<'c, E>(executor: E, id: DriverId) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("UPDATE drivers SET is_available = true WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)?;
    Ok(())
}

pub async fn vehicle_capacity<'c, E>(executor: E, id: VehicleId) -> Result<u32>
where
    E: Executor<'c, Database = Postgres>,
{
    let capacity: i32 = sqlx::query_scalar("SELECT capacity FROM vehicles WHERE id = $1;")
        .bind(id.raw())
        .fetch_one(executor)
        .await
        .map_err(convert_error)?;
    Ok(capacity as u32)
}
