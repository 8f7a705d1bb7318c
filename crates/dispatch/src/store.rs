use async_trait::async_trait;
use model::{
    Booking, BookingId, Delivery, DeliveryId, DeliveryRequest, DeliveryRequestId, Driver,
    DriverId, PassengerRequest, PassengerRequestId, RequestStatus, Trip, TripId, TripStatus,
    VehicleId,
};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewTrip {
    pub from: String,
    pub to: String,
    pub departure_time: chrono::DateTime<chrono::Utc>,
    pub available_seats: u32,
    pub price_per_seat: f64,
    pub driver_id: DriverId,
    pub vehicle_id: VehicleId,
    pub route_coordinates: Option<model::RouteCoordinates>,
    pub status: TripStatus,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub trip_id: TripId,
    pub customer_ref: String,
    pub seats: Vec<String>,
    pub total_price: f64,
    pub status: model::BookingStatus,
}

#[derive(Debug, Clone)]
pub struct NewDelivery {
    pub trip_id: TripId,
    pub sender_ref: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub item_description: String,
    pub weight: f64,
    pub insurance_amount: Option<f64>,
    pub delivery_code: String,
    pub status: model::DeliveryStatus,
}

/// Component C: read pending requests, transition their status. All writes
/// are only ever issued from within a `Transaction` (see below).
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn list_pending_passenger_requests(&mut self) -> Result<Vec<PassengerRequest>>;
    async fn list_pending_delivery_requests(&mut self) -> Result<Vec<DeliveryRequest>>;

    /// Sets status to `ACCEPTED`, but only if the row is currently `PENDING`.
    /// Returns whether the row was updated, so callers can distinguish a
    /// lost race from a hard store failure.
    async fn accept_passenger_request(&mut self, id: PassengerRequestId) -> Result<bool>;
    async fn accept_delivery_request(&mut self, id: DeliveryRequestId) -> Result<bool>;
    async fn fail_passenger_request(&mut self, id: PassengerRequestId) -> Result<bool>;
    async fn fail_delivery_request(&mut self, id: DeliveryRequestId) -> Result<bool>;

    async fn find_active_trip(
        &mut self,
        from: &str,
        to: &str,
        min_seats: u32,
        proximity_threshold_m: f64,
    ) -> Result<Option<Trip>>;

    async fn create_trip(&mut self, spec: NewTrip) -> Result<Trip>;
    async fn create_booking(&mut self, spec: NewBooking) -> Result<Booking>;
    async fn create_delivery(&mut self, spec: NewDelivery) -> Result<Delivery>;
    async fn update_trip_seats(
        &mut self,
        id: TripId,
        available_seats: u32,
        status: TripStatus,
    ) -> Result<()>;
}

/// Component D: query available drivers, reserve/release their availability.
#[async_trait]
pub trait DriverRegistry: Send + Sync {
    /// Only drivers with `is_available = true` and at least one vehicle.
    async fn list_available(&mut self) -> Result<Vec<Driver>>;

    /// Atomic compare-and-set of `is_available` from true to false. Returns
    /// the reserved driver and its primary vehicle's id, or `None` if
    /// another worker already reserved it.
    async fn reserve(&mut self, id: DriverId) -> Result<Option<(Driver, VehicleId)>>;

    async fn release(&mut self, id: DriverId) -> Result<()>;

    /// Looked up when extending an existing trip, whose driver is already
    /// reserved and so does not go through `reserve` again.
    async fn vehicle_capacity(&mut self, id: VehicleId) -> Result<u32>;
}

pub trait StoreOperations: RequestStore + DriverRegistry {}
impl<T: RequestStore + DriverRegistry> StoreOperations for T {}

/// A running transaction. Every method of §4.G runs inside one of these;
/// `commit` finalizes it with serializable semantics. There is no explicit
/// rollback method because dropping a transaction without committing it
/// (e.g. by returning early with `?`) is the rollback.
#[async_trait]
pub trait Transaction: StoreOperations {
    async fn commit(self) -> Result<()>;
}

pub trait Autocommit: StoreOperations {}

/// A store backend, e.g. the Postgres adapter in `store_postgres`.
/// Multiple concurrent accesses should be possible by cloning the database
/// handle; pooled connections make that cheap.
#[async_trait]
pub trait Database: Clone + Send + Sync {
    type Transaction: Transaction + Send;
    type Autocommit: Autocommit + Send;

    async fn transaction(&self) -> Result<Self::Transaction>;
    fn auto(&self) -> Self::Autocommit;
}
