use model::{BookingStatus, DeliveryStatus, RequestStatus, TripStatus};

pub mod booking;
pub mod delivery;
pub mod driver;
pub mod request;
pub mod trip;

/// Status columns are stored as plain text rather than a Postgres enum, so a
/// new variant never needs a migration to widen a `CREATE TYPE`.
pub(crate) fn request_status_to_str(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Pending => "pending",
        RequestStatus::Accepted => "accepted",
        RequestStatus::Failed => "failed",
        RequestStatus::Cancelled => "cancelled",
    }
}

pub(crate) fn request_status_from_str(raw: &str) -> RequestStatus {
    match raw {
        "accepted" => RequestStatus::Accepted,
        "failed" => RequestStatus::Failed,
        "cancelled" => RequestStatus::Cancelled,
        _ => RequestStatus::Pending,
    }
}

pub(crate) fn trip_status_to_str(status: TripStatus) -> &'static str {
    match status {
        TripStatus::Pending => "pending",
        TripStatus::InProgress => "in_progress",
        TripStatus::Full => "full",
        TripStatus::Completed => "completed",
        TripStatus::Cancelled => "cancelled",
    }
}

pub(crate) fn trip_status_from_str(raw: &str) -> TripStatus {
    match raw {
        "in_progress" => TripStatus::InProgress,
        "full" => TripStatus::Full,
        "completed" => TripStatus::Completed,
        "cancelled" => TripStatus::Cancelled,
        _ => TripStatus::Pending,
    }
}

pub(crate) fn booking_status_to_str(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Pending => "pending",
        BookingStatus::Confirmed => "confirmed",
        BookingStatus::Completed => "completed",
        BookingStatus::Cancelled => "cancelled",
    }
}

pub(crate) fn booking_status_from_str(raw: &str) -> BookingStatus {
    match raw {
        "confirmed" => BookingStatus::Confirmed,
        "completed" => BookingStatus::Completed,
        "cancelled" => BookingStatus::Cancelled,
        _ => BookingStatus::Pending,
    }
}

pub(crate) fn delivery_status_to_str(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Pending => "pending",
        DeliveryStatus::InTransit => "in_transit",
        DeliveryStatus::Delivered => "delivered",
        DeliveryStatus::Cancelled => "cancelled",
    }
}

pub(crate) fn delivery_status_from_str(raw: &str) -> DeliveryStatus {
    match raw {
        "in_transit" => DeliveryStatus::InTransit,
        "delivered" => DeliveryStatus::Delivered,
        "cancelled" => DeliveryStatus::Cancelled,
        _ => DeliveryStatus::Pending,
    }
}
