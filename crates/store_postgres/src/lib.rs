use std::env;

use async_trait::async_trait;
use dispatch::error::{DispatchError, Result};
use dispatch::store::{
    Autocommit, Database, DriverRegistry, NewBooking, NewDelivery, NewTrip, RequestStore,
    Transaction as DispatchTransaction,
};
use model::{
    Booking, BookingId, Delivery, DeliveryId, DeliveryRequest, DeliveryRequestId, Driver,
    DriverId, PassengerRequest, PassengerRequestId, Trip, TripId, TripStatus, VehicleId,
};
use sqlx::Transaction as SqlxTransaction;

pub mod data_model;
pub mod queries;

use queries::convert_error;

/// Connection parameters, read from the same `DATABASE_*` variables the rest
/// of this workspace's services use.
pub struct DatabaseConnectionInfo {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub database: String,
}

impl DatabaseConnectionInfo {
    pub fn from_env() -> Option<Self> {
        let username = env::var("DATABASE_USER").ok()?;
        let password = env::var("DATABASE_PASSWORD").ok()?;
        let hostname = env::var("DATABASE_HOST").ok()?;
        let port: u16 = env::var("DATABASE_PORT").ok()?.parse().ok()?;
        let database = env::var("DATABASE_NAME").ok()?;
        Some(Self {
            username,
            password,
            hostname,
            port,
            database,
        })
    }

    pub(crate) fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.hostname, self.port, self.database
        )
    }
}

#[derive(Clone)]
pub struct PgDatabase {
    connection: sqlx::PgPool,
}

impl PgDatabase {
    pub async fn connect(info: &DatabaseConnectionInfo) -> Result<Self> {
        let pool = sqlx::postgres::PgPool::connect(&info.postgres_url())
            .await
            .map_err(convert_error)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|why| DispatchError::StoreTransient(Box::new(why)))?;

        Ok(Self { connection: pool })
    }
}

pub struct PgTransaction<'a> {
    tx: SqlxTransaction<'a, sqlx::Postgres>,
}

pub struct PgAutocommit {
    pool: sqlx::PgPool,
}

impl Autocommit for PgAutocommit {}

#[async_trait]
impl Database for PgDatabase {
    type Transaction = PgTransaction<'static>;
    type Autocommit = PgAutocommit;

    async fn transaction(&self) -> Result<Self::Transaction> {
        let tx = self.connection.begin().await.map_err(convert_error)?;
        Ok(PgTransaction { tx })
    }

    fn auto(&self) -> Self::Autocommit {
        PgAutocommit {
            pool: self.connection.clone(),
        }
    }
}

#[async_trait]
impl DispatchTransaction for PgTransaction<'static> {
    async fn commit(self) -> Result<()> {
        self.tx.commit().await.map_err(convert_error)
    }
}

// The blanket `StoreOperations` impl needs `RequestStore + DriverRegistry` on
// both halves; implemented below for `PgAutocommit` and `PgTransaction`.

#[async_trait]
impl RequestStore for PgAutocommit {
    async fn list_pending_passenger_requests(&mut self) -> Result<Vec<PassengerRequest>> {
        queries::request::list_pending_passenger(&self.pool).await
    }

    async fn list_pending_delivery_requests(&mut self) -> Result<Vec<DeliveryRequest>> {
        queries::request::list_pending_delivery(&self.pool).await
    }

    async fn accept_passenger_request(&mut self, id: PassengerRequestId) -> Result<bool> {
        queries::request::set_passenger_status_if_pending(&self.pool, id, model::RequestStatus::Accepted).await
    }

    async fn accept_delivery_request(&mut self, id: DeliveryRequestId) -> Result<bool> {
        queries::request::set_delivery_status_if_pending(&self.pool, id, model::RequestStatus::Accepted).await
    }

    async fn fail_passenger_request(&mut self, id: PassengerRequestId) -> Result<bool> {
        queries::request::set_passenger_status_if_pending(&self.pool, id, model::RequestStatus::Failed).await
    }

    async fn fail_delivery_request(&mut self, id: DeliveryRequestId) -> Result<bool> {
        queries::request::set_delivery_status_if_pending(&self.pool, id, model::RequestStatus::Failed).await
    }

    async fn find_active_trip(
        &mut self,
        from: &str,
        to: &str,
        min_seats: u32,
        proximity_threshold_m: f64,
    ) -> Result<Option<Trip>> {
        queries::trip::find_active(&self.pool, from, to, min_seats, proximity_threshold_m).await
    }

    async fn create_trip(&mut self, spec: NewTrip) -> Result<Trip> {
        queries::trip::create(&self.pool, spec).await
    }

    async fn create_booking(&mut self, spec: NewBooking) -> Result<Booking> {
        queries::booking::create(&self.pool, spec).await
    }

    async fn create_delivery(&mut self, spec: NewDelivery) -> Result<Delivery> {
        queries::delivery::create(&self.pool, spec).await
    }

    async fn update_trip_seats(
        &mut self,
        id: TripId,
        available_seats: u32,
        status: TripStatus,
    ) -> Result<()> {
        queries::trip::update_seats(&self.pool, id, available_seats, status).await
    }
}

#[async_trait]
impl DriverRegistry for PgAutocommit {
    async fn list_available(&mut self) -> Result<Vec<Driver>> {
        queries::driver::list_available(&self.pool).await
    }

    async fn reserve(&mut self, id: DriverId) -> Result<Option<(Driver, VehicleId)>> {
        queries::driver::reserve(&self.pool, id).await
    }

    async fn release(&mut self, id: DriverId) -> Result<()> {
        queries::driver::release(&self.pool, id).await
    }

    async fn vehicle_capacity(&mut self, id: VehicleId) -> Result<u32> {
        queries::driver::vehicle_capacity(&self.pool, id).await
    }
}

#[async_trait]
impl<'a> RequestStore for PgTransaction<'a> {
    async fn list_pending_passenger_requests(&mut self) -> Result<Vec<PassengerRequest>> {
        queries::request::list_pending_passenger(&mut *self.tx).await
    }

    async fn list_pending_delivery_requests(&mut self) -> Result<Vec<DeliveryRequest>> {
        queries::request::list_pending_delivery(&mut *self.tx).await
    }

    async fn accept_passenger_request(&mut self, id: PassengerRequestId) -> Result<bool> {
        queries::request::set_passenger_status_if_pending(&mut *self.tx, id, model::RequestStatus::Accepted).await
    }

    async fn accept_delivery_request(&mut self, id: DeliveryRequestId) -> Result<bool> {
        queries::request::set_delivery_status_if_pending(&mut *self.tx, id, model::RequestStatus::Accepted).await
    }

    async fn fail_passenger_request(&mut self, id: PassengerRequestId) -> Result<bool> {
        queries::request::set_passenger_status_if_pending(&mut *self.tx, id, model::RequestStatus::Failed).await
    }

    async fn fail_delivery_request(&mut self, id: DeliveryRequestId) -> Result<bool> {
        queries::request::set_delivery_status_if_pending(&mut *self.tx, id, model::RequestStatus::Failed).await
    }

    async fn find_active_trip(
        &mut self,
        from: &str,
        to: &str,
        min_seats: u32,
        proximity_threshold_m: f64,
    ) -> Result<Option<Trip>> {
        queries::trip::find_active(&mut *self.tx, from, to, min_seats, proximity_threshold_m)
            .await
    }

    async fn create_trip(&mut self, spec: NewTrip) -> Result<Trip> {
        queries::trip::create(&mut *self.tx, spec).await
    }

    async fn create_booking(&mut self, spec: NewBooking) -> Result<Booking> {
        queries::booking::create(&mut *self.tx, spec).await
    }

    async fn create_delivery(&mut self, spec: NewDelivery) -> Result<Delivery> {
        queries::delivery::create(&mut *self.tx, spec).await
    }

    async fn update_trip_seats(
        &mut self,
        id: TripId,
        available_seats: u32,
        status: TripStatus,
    ) -> Result<()> {
        queries::trip::update_seats(&mut *self.tx, id, available_seats, status).await
    }
}

#[async_trait]
impl<'a> DriverRegistry for PgTransaction<'a> {
    async fn list_available(&mut self) -> Result<Vec<Driver>> {
        queries::driver::list_available(&mut *self.tx).await
    }

    async fn reserve(&mut self, id: DriverId) -> Result<Option<(Driver, VehicleId)>> {
        queries::driver::reserve(&mut *self.tx, id).await
    }

    async fn release(&mut self, id: DriverId) -> Result<()> {
        queries::driver::release(&mut *self.tx, id).await
    }

    async fn vehicle_capacity(&mut self, id: VehicleId) -> Result<u32> {
        queries::driver::vehicle_capacity(&mut *self.tx, id).await
    }
}
