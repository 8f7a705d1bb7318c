use chrono::{DateTime, Local, Timelike, Utc};
use model::{BookingStatus, DeliveryStatus, RouteCoordinates, Trip, TripStatus};
use serde_json::json;

use crate::config::Config;
use crate::error::{DispatchError, Result};
use crate::geo::parse_coordinate;
use crate::notify::NotificationKind;
use crate::pending::PendingRequest;
use crate::retry::RequestKind;
use crate::routing::nearest_neighbor_route;
use crate::selector::select_driver;
use crate::store::{Database, DriverRegistry, NewBooking, NewDelivery, NewTrip, RequestStore, Transaction};

pub struct Notification {
    pub user_ref: String,
    pub kind: NotificationKind,
    pub payload: serde_json::Value,
}

/// Items that did not get attached to the trip this round (capacity
/// overflow). They remain `PENDING`; this only tells the caller to register
/// them with the retry queue.
pub struct RetryItem {
    pub kind: RequestKind,
    pub id: i64,
}

pub enum AssemblyResult {
    Assembled {
        trip: Trip,
        notifications: Vec<Notification>,
        retry: Vec<RetryItem>,
    },
    /// No candidate driver was available at all (none with a vehicle);
    /// every item in the cluster should go to retry.
    NoDriver,
    /// Another worker reserved the chosen driver first; every item in the
    /// cluster should go to retry.
    ReservationConflict,
}

fn retry_item(request: &PendingRequest) -> RetryItem {
    match request {
        PendingRequest::Passenger { request, .. } => RetryItem {
            kind: RequestKind::Passenger,
            id: request.id.raw(),
        },
        PendingRequest::Delivery { request, .. } => RetryItem {
            kind: RequestKind::Delivery,
            id: request.id.raw(),
        },
    }
}

/// Peak is defined in local time (§4.G, §9.2), not the UTC the scheduler's
/// clock runs on.
fn is_peak(now: DateTime<Utc>) -> bool {
    let hour = now.with_timezone(&Local).hour();
    (7..9).contains(&hour) || (17..19).contains(&hour)
}

fn price_per_seat(config: &Config, cluster_size: usize, now: DateTime<Utc>) -> f64 {
    if !config.dynamic_pricing {
        return config.default_price_per_seat;
    }
    let multiplier = if is_peak(now) { 1.2 } else { 0.9 };
    let raw = 50.0 * (cluster_size as f64 / 10.0) * multiplier;
    (raw * 100.0).round() / 100.0
}

fn delivery_code(request_id: i64) -> String {
    format!("D{request_id:06}")
}

/// The transactional heart: finds or creates a trip for a cluster, attaches
/// bookings and deliveries under seat constraints, and flips every affected
/// status, all inside one serializable transaction. Notifications are
/// returned for the caller to fire only once the transaction has committed.
pub async fn assemble_cluster<Db: Database>(
    db: &Db,
    config: &Config,
    now: DateTime<Utc>,
    cluster: &[PendingRequest],
) -> Result<AssemblyResult> {
    let representative = cluster.first().expect("cluster must be non-empty");
    let total_passengers: u32 = cluster.iter().map(|r| r.passenger_count()).sum();
    let min_seats = total_passengers.max(1);

    let mut tx = db.transaction().await?;

    // Step 1: existing trip lookup.
    let existing = tx
        .find_active_trip(
            representative.from_raw(),
            representative.to_raw(),
            min_seats,
            config.proximity_threshold_m,
        )
        .await?;

    let (mut trip, vehicle_capacity) = match existing {
        Some(trip) => {
            let capacity = tx.vehicle_capacity(trip.vehicle_id).await?;
            (trip, capacity)
        }
        None => {
            // Step 2: driver + vehicle acquisition.
            let candidates = tx.list_available().await?;
            let Some((driver, _)) = select_driver(representative, &candidates) else {
                return Ok(AssemblyResult::NoDriver);
            };
            let capacity = driver
                .primary_vehicle()
                .expect("select_driver only returns drivers with a vehicle")
                .capacity;
            let driver_id = driver.id;

            let Some((driver, vehicle_id)) = tx.reserve(driver_id).await? else {
                return Ok(AssemblyResult::ReservationConflict);
            };

            // Step 3: trip creation.
            let pickup_points: Vec<_> = cluster.iter().map(|r| r.from()).collect();
            let dropoff_points: Vec<_> = cluster.iter().map(|r| r.to()).collect();
            let route_coordinates = RouteCoordinates {
                pickup: nearest_neighbor_route(&pickup_points),
                dropoff: nearest_neighbor_route(&dropoff_points),
            };

            let trip = tx
                .create_trip(NewTrip {
                    from: representative.from_raw().to_string(),
                    to: representative.to_raw().to_string(),
                    departure_time: now,
                    available_seats: capacity,
                    price_per_seat: price_per_seat(config, cluster.len(), now),
                    driver_id: driver.id,
                    vehicle_id,
                    route_coordinates: Some(route_coordinates),
                    status: TripStatus::Pending,
                })
                .await?;
            (trip, capacity)
        }
    };

    // Step 4 & 5: attach passengers and deliveries.
    let mut seats_used = vehicle_capacity.saturating_sub(trip.available_seats);
    let mut notifications = Vec::new();
    let mut retry = Vec::new();
    let mut attached_any = false;

    for request in cluster {
        match request {
            PendingRequest::Passenger {
                request: passenger, ..
            } => {
                if seats_used + passenger.passenger_count > vehicle_capacity {
                    retry.push(retry_item(request));
                    continue;
                }
                let seats: Vec<String> = (1..=passenger.passenger_count)
                    .map(|offset| (seats_used + offset).to_string())
                    .collect();
                let total_price = passenger.passenger_count as f64 * trip.price_per_seat;

                let booking = tx
                    .create_booking(NewBooking {
                        trip_id: trip.id,
                        customer_ref: passenger.requester_ref.clone(),
                        seats: seats.clone(),
                        total_price,
                        status: BookingStatus::Confirmed,
                    })
                    .await?;

                if !tx.accept_passenger_request(passenger.id).await? {
                    return Err(DispatchError::DriverReservationConflict);
                }

                seats_used += passenger.passenger_count;
                attached_any = true;

                notifications.push(Notification {
                    user_ref: passenger.requester_ref.clone(),
                    kind: NotificationKind::BookingConfirmed,
                    payload: json!({ "booking_id": booking.id.raw(), "seats": seats }),
                });
            }
            PendingRequest::Delivery {
                request: delivery_request,
                ..
            } => {
                let delivery = tx
                    .create_delivery(NewDelivery {
                        trip_id: trip.id,
                        sender_ref: delivery_request.sender_ref.clone(),
                        receiver_name: delivery_request.receiver_name.clone(),
                        receiver_phone: delivery_request.receiver_phone.clone(),
                        item_description: delivery_request.item_description.clone(),
                        weight: delivery_request.weight,
                        insurance_amount: delivery_request.insurance_amount,
                        delivery_code: delivery_code(delivery_request.id.raw()),
                        status: DeliveryStatus::InTransit,
                    })
                    .await?;

                if !tx.accept_delivery_request(delivery_request.id).await? {
                    return Err(DispatchError::DriverReservationConflict);
                }

                attached_any = true;

                notifications.push(Notification {
                    user_ref: delivery_request.sender_ref.clone(),
                    kind: NotificationKind::DeliveryConfirmed,
                    payload: json!({ "delivery_code": delivery.delivery_code }),
                });
            }
        }
    }

    // Step 6: trip finalization.
    let available_seats = vehicle_capacity.saturating_sub(seats_used);
    let status = if available_seats == 0 {
        TripStatus::Full
    } else if attached_any {
        TripStatus::InProgress
    } else {
        TripStatus::Pending
    };
    tx.update_trip_seats(trip.id, available_seats, status).await?;
    trip.available_seats = available_seats;
    trip.status = status;

    if attached_any {
        notifications.push(Notification {
            user_ref: format!("driver:{}", trip.driver_id.raw()),
            kind: NotificationKind::TripAssigned,
            payload: json!({ "trip_id": trip.id.raw() }),
        });
    }

    tx.commit().await?;

    Ok(AssemblyResult::Assembled {
        trip,
        notifications,
        retry,
    })
}

/// Parses the bookkeeping needed to decide whether two endpoint strings lie
/// within the configured proximity threshold. Kept separate from the store
/// adapter's SQL so the distance check can be unit-tested without a
/// database.
pub fn within_proximity(a: &str, b: &str, threshold_m: f64) -> bool {
    match (parse_coordinate(a), parse_coordinate(b)) {
        (Some(a), Some(b)) => crate::geo::haversine(a, b) * 1000.0 <= threshold_m,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_code_zero_pads_to_six_digits() {
        assert_eq!(delivery_code(42), "D000042");
    }

    #[test]
    fn delivery_code_grows_past_six_digits_without_truncating() {
        assert_eq!(delivery_code(1_234_567), "D1234567");
    }

    #[test]
    fn within_proximity_rejects_malformed_coordinates() {
        assert!(!within_proximity("nope", "24.7,46.6", 1000.0));
    }
}
