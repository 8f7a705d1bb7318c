use utility::id::{HasId, Id};

use crate::{Booking, Delivery, DeliveryRequest, Driver, PassengerRequest, Trip, Vehicle};

impl HasId for PassengerRequest {
    type IdType = i64;
}
impl HasId for DeliveryRequest {
    type IdType = i64;
}
impl HasId for Driver {
    type IdType = i64;
}
impl HasId for Vehicle {
    type IdType = i64;
}
impl HasId for Trip {
    type IdType = i64;
}
impl HasId for Booking {
    type IdType = i64;
}
impl HasId for Delivery {
    type IdType = i64;
}

pub type PassengerRequestId = Id<PassengerRequest>;
pub type DeliveryRequestId = Id<DeliveryRequest>;
pub type DriverId = Id<Driver>;
pub type VehicleId = Id<Vehicle>;
pub type TripId = Id<Trip>;
pub type BookingId = Id<Booking>;
pub type DeliveryId = Id<Delivery>;
