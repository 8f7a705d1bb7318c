pub mod booking;
pub mod coordinate;
pub mod delivery;
pub mod driver;
pub mod ids;
pub mod request;
pub mod status;
pub mod trip;

pub use booking::Booking;
pub use coordinate::Coordinate;
pub use delivery::Delivery;
pub use driver::{Driver, Vehicle};
pub use ids::*;
pub use request::{DeliveryRequest, PassengerRequest};
pub use status::{BookingStatus, DeliveryStatus, RequestStatus, TripStatus};
pub use trip::{RouteCoordinates, Trip};
