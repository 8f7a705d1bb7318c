//! In-memory fakes for `RequestStore`/`DriverRegistry`/`Database`, gated
//! behind the `test-helpers` feature (or automatically under `#[cfg(test)]`)
//! so integration tests don't need a Postgres instance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use model::{
    Booking, BookingId, BookingStatus, Delivery, DeliveryId, DeliveryRequest, DeliveryRequestId,
    DeliveryStatus, Driver, DriverId, PassengerRequest, PassengerRequestId, RequestStatus, Trip,
    TripId, TripStatus, VehicleId,
};
use utility::id::Id;

use crate::assembler::within_proximity;
use crate::error::{DispatchError, Result};
use crate::store::{
    Autocommit, Database, DriverRegistry, NewBooking, NewDelivery, NewTrip, RequestStore,
    Transaction,
};

#[derive(Clone, Default)]
struct State {
    next_id: i64,
    passenger_requests: HashMap<i64, PassengerRequest>,
    delivery_requests: HashMap<i64, DeliveryRequest>,
    drivers: HashMap<i64, Driver>,
    trips: HashMap<i64, Trip>,
    bookings: HashMap<i64, Booking>,
    deliveries: HashMap<i64, Delivery>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared in-memory backing store. Clone is cheap: it shares the same
/// underlying table set, the way a connection pool handle does.
#[derive(Clone, Default)]
pub struct FakeDb {
    state: Arc<Mutex<State>>,
}

impl FakeDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_passenger_request(&self, mut request: PassengerRequest) -> PassengerRequestId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        request.id = Id::new(id);
        state.passenger_requests.insert(id, request);
        Id::new(id)
    }

    pub fn seed_delivery_request(&self, mut request: DeliveryRequest) -> DeliveryRequestId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        request.id = Id::new(id);
        state.delivery_requests.insert(id, request);
        Id::new(id)
    }

    pub fn seed_driver(&self, mut driver: Driver) -> DriverId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        driver.id = Id::new(id);
        state.drivers.insert(id, driver);
        Id::new(id)
    }

    pub fn passenger_request(&self, id: PassengerRequestId) -> PassengerRequest {
        self.state
            .lock()
            .unwrap()
            .passenger_requests
            .get(&id.raw())
            .cloned()
            .expect("passenger request must exist")
    }

    pub fn delivery_request(&self, id: DeliveryRequestId) -> DeliveryRequest {
        self.state
            .lock()
            .unwrap()
            .delivery_requests
            .get(&id.raw())
            .cloned()
            .expect("delivery request must exist")
    }

    pub fn driver(&self, id: DriverId) -> Driver {
        self.state
            .lock()
            .unwrap()
            .drivers
            .get(&id.raw())
            .cloned()
            .expect("driver must exist")
    }

    pub fn trips(&self) -> Vec<Trip> {
        self.state.lock().unwrap().trips.values().cloned().collect()
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.state.lock().unwrap().bookings.values().cloned().collect()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.state
            .lock()
            .unwrap()
            .deliveries
            .values()
            .cloned()
            .collect()
    }
}

/// Either a standalone autocommit handle or the working copy of a
/// transaction; staged mutations only reach the shared `Arc<Mutex<State>>`
/// on `commit`, so a dropped, uncommitted handle behaves like a rollback.
pub struct FakeHandle {
    shared: Arc<Mutex<State>>,
    local: State,
}

#[async_trait]
impl RequestStore for FakeHandle {
    async fn list_pending_passenger_requests(&mut self) -> Result<Vec<PassengerRequest>> {
        Ok(self
            .local
            .passenger_requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }

    async fn list_pending_delivery_requests(&mut self) -> Result<Vec<DeliveryRequest>> {
        Ok(self
            .local
            .delivery_requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }

    async fn accept_passenger_request(&mut self, id: PassengerRequestId) -> Result<bool> {
        let Some(request) = self.local.passenger_requests.get_mut(&id.raw()) else {
            return Ok(false);
        };
        if request.status != RequestStatus::Pending {
            return Ok(false);
        }
        request.status = RequestStatus::Accepted;
        Ok(true)
    }

    async fn accept_delivery_request(&mut self, id: DeliveryRequestId) -> Result<bool> {
        let Some(request) = self.local.delivery_requests.get_mut(&id.raw()) else {
            return Ok(false);
        };
        if request.status != RequestStatus::Pending {
            return Ok(false);
        }
        request.status = RequestStatus::Accepted;
        Ok(true)
    }

    async fn fail_passenger_request(&mut self, id: PassengerRequestId) -> Result<bool> {
        let Some(request) = self.local.passenger_requests.get_mut(&id.raw()) else {
            return Ok(false);
        };
        if request.status != RequestStatus::Pending {
            return Ok(false);
        }
        request.status = RequestStatus::Failed;
        Ok(true)
    }

    async fn fail_delivery_request(&mut self, id: DeliveryRequestId) -> Result<bool> {
        let Some(request) = self.local.delivery_requests.get_mut(&id.raw()) else {
            return Ok(false);
        };
        if request.status != RequestStatus::Pending {
            return Ok(false);
        }
        request.status = RequestStatus::Failed;
        Ok(true)
    }

    async fn find_active_trip(
        &mut self,
        from: &str,
        to: &str,
        min_seats: u32,
        proximity_threshold_m: f64,
    ) -> Result<Option<Trip>> {
        Ok(self
            .local
            .trips
            .values()
            .find(|trip| {
                matches!(trip.status, TripStatus::Pending | TripStatus::InProgress)
                    && trip.available_seats >= min_seats
                    && within_proximity(&trip.from, from, proximity_threshold_m)
                    && within_proximity(&trip.to, to, proximity_threshold_m)
            })
            .cloned())
    }

    async fn create_trip(&mut self, spec: NewTrip) -> Result<Trip> {
        let id = self.local.next_id();
        let trip = Trip {
            id: Id::new(id),
            from: spec.from,
            to: spec.to,
            departure_time: spec.departure_time,
            available_seats: spec.available_seats,
            price_per_seat: spec.price_per_seat,
            driver_id: spec.driver_id,
            vehicle_id: spec.vehicle_id,
            route_coordinates: spec.route_coordinates,
            status: spec.status,
        };
        self.local.trips.insert(id, trip.clone());
        Ok(trip)
    }

    async fn create_booking(&mut self, spec: NewBooking) -> Result<Booking> {
        let id = self.local.next_id();
        let booking = Booking {
            id: Id::new(id),
            trip_id: spec.trip_id,
            customer_ref: spec.customer_ref,
            seats: spec.seats,
            total_price: spec.total_price,
            status: spec.status,
        };
        self.local.bookings.insert(id, booking.clone());
        Ok(booking)
    }

    async fn create_delivery(&mut self, spec: NewDelivery) -> Result<Delivery> {
        let id = self.local.next_id();
        let delivery = Delivery {
            id: Id::new(id),
            trip_id: spec.trip_id,
            sender_ref: spec.sender_ref,
            receiver_name: spec.receiver_name,
            receiver_phone: spec.receiver_phone,
            item_description: spec.item_description,
            weight: spec.weight,
            insurance_amount: spec.insurance_amount,
            delivery_code: spec.delivery_code,
            status: spec.status,
        };
        self.local.deliveries.insert(id, delivery.clone());
        Ok(delivery)
    }

    async fn update_trip_seats(
        &mut self,
        id: TripId,
        available_seats: u32,
        status: TripStatus,
    ) -> Result<()> {
        let Some(trip) = self.local.trips.get_mut(&id.raw()) else {
            return Err(DispatchError::StorePermanent("trip not found".into()));
        };
        trip.available_seats = available_seats;
        trip.status = status;
        Ok(())
    }
}

#[async_trait]
impl DriverRegistry for FakeHandle {
    async fn list_available(&mut self) -> Result<Vec<Driver>> {
        Ok(self
            .local
            .drivers
            .values()
            .filter(|d| d.is_available && !d.vehicles.is_empty())
            .cloned()
            .collect())
    }

    async fn reserve(&mut self, id: DriverId) -> Result<Option<(Driver, VehicleId)>> {
        let Some(driver) = self.local.drivers.get_mut(&id.raw()) else {
            return Ok(None);
        };
        if !driver.is_available {
            return Ok(None);
        }
        driver.is_available = false;
        let vehicle_id = driver
            .primary_vehicle()
            .expect("reserve only succeeds for drivers with a vehicle")
            .id;
        Ok(Some((driver.clone(), vehicle_id)))
    }

    async fn release(&mut self, id: DriverId) -> Result<()> {
        if let Some(driver) = self.local.drivers.get_mut(&id.raw()) {
            driver.is_available = true;
        }
        Ok(())
    }

    async fn vehicle_capacity(&mut self, id: VehicleId) -> Result<u32> {
        self.local
            .drivers
            .values()
            .flat_map(|d| d.vehicles.iter())
            .find(|v| v.id == id)
            .map(|v| v.capacity)
            .ok_or_else(|| DispatchError::StorePermanent("vehicle not found".into()))
    }
}

impl Autocommit for FakeHandle {}

#[async_trait]
impl Transaction for FakeHandle {
    async fn commit(self) -> Result<()> {
        *self.shared.lock().unwrap() = self.local;
        Ok(())
    }
}

#[async_trait]
impl Database for FakeDb {
    type Transaction = FakeHandle;
    type Autocommit = FakeHandle;

    async fn transaction(&self) -> Result<Self::Transaction> {
        let local = self.state.lock().unwrap().clone();
        Ok(FakeHandle {
            shared: self.state.clone(),
            local,
        })
    }

    fn auto(&self) -> Self::Autocommit {
        let local = self.state.lock().unwrap().clone();
        FakeHandle {
            shared: self.state.clone(),
            local,
        }
    }
}

/// A driver seeded with a single vehicle, for terse test setup.
pub fn driver(location: &str, rating: f64, capacity: u32) -> Driver {
    Driver {
        id: Id::new(0),
        user_ref: "driver".into(),
        current_location: location.to_string(),
        license_number: "LIC".into(),
        rating,
        total_trips: 0,
        is_available: true,
        vehicles: vec![model::Vehicle {
            id: Id::new(0),
            capacity,
            vehicle_type: model::VehicleType::Sedan,
        }],
    }
}

pub fn passenger_request(from: &str, to: &str, passenger_count: u32) -> PassengerRequest {
    PassengerRequest {
        id: Id::new(0),
        requester_ref: "rider".into(),
        from: from.to_string(),
        to: to.to_string(),
        departure_time: Utc::now() + chrono::Duration::minutes(10),
        passenger_count,
        status: RequestStatus::Pending,
    }
}
