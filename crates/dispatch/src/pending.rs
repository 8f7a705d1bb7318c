use model::{Coordinate, DeliveryRequest, PassengerRequest};

/// A request that survived coordinate parsing, carrying its parsed endpoints
/// alongside the original record. The assembler dispatches on the variant
/// when computing seat impact; everything else treats the two kinds
/// uniformly through the shared accessors below.
#[derive(Debug, Clone)]
pub enum PendingRequest {
    Passenger {
        request: PassengerRequest,
        from: Coordinate,
        to: Coordinate,
    },
    Delivery {
        request: DeliveryRequest,
        from: Coordinate,
        to: Coordinate,
    },
}

impl PendingRequest {
    pub fn from(&self) -> Coordinate {
        match self {
            PendingRequest::Passenger { from, .. } => *from,
            PendingRequest::Delivery { from, .. } => *from,
        }
    }

    pub fn to(&self) -> Coordinate {
        match self {
            PendingRequest::Passenger { to, .. } => *to,
            PendingRequest::Delivery { to, .. } => *to,
        }
    }

    pub fn from_raw(&self) -> &str {
        match self {
            PendingRequest::Passenger { request, .. } => &request.from,
            PendingRequest::Delivery { request, .. } => &request.from,
        }
    }

    pub fn to_raw(&self) -> &str {
        match self {
            PendingRequest::Passenger { request, .. } => &request.to,
            PendingRequest::Delivery { request, .. } => &request.to,
        }
    }

    /// Seats a passenger request would occupy; zero for deliveries, which
    /// never consume seat capacity.
    pub fn passenger_count(&self) -> u32 {
        match self {
            PendingRequest::Passenger { request, .. } => request.passenger_count,
            PendingRequest::Delivery { .. } => 0,
        }
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, PendingRequest::Delivery { .. })
    }
}
