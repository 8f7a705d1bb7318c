use model::{Driver, VehicleId};

use crate::geo::{haversine, parse_coordinate};
use crate::pending::PendingRequest;

/// Ranks a driver for a given request origin: closer, then higher-rated,
/// then less-used. A driver whose location string fails to parse sorts
/// last, never first.
fn score(driver: &Driver, from: model::Coordinate) -> (f64, f64, u32) {
    let distance = match parse_coordinate(&driver.current_location) {
        Some(location) => haversine(location, from),
        None => f64::INFINITY,
    };
    (distance, -driver.rating, driver.total_trips)
}

/// Selects the closest, then highest-rated, then least-used driver with at
/// least one vehicle, scored against the cluster's representative request
/// (the first in natural order). Returns the driver and the vehicle id that
/// will be used, or `None` if no candidate has a vehicle at all.
///
/// Deliberately does not gate on whether the vehicle's capacity covers the
/// whole cluster: overflow is the booking loop's problem (§4.G step 4),
/// which attaches what fits and leaves the rest pending for retry. Gating
/// here would make that partial-attachment path unreachable.
pub fn select_driver<'a>(
    representative: &PendingRequest,
    candidates: &'a [Driver],
) -> Option<(&'a Driver, VehicleId)> {
    let from = representative.from();

    candidates
        .iter()
        .filter(|driver| driver.primary_vehicle().is_some())
        .min_by(|a, b| {
            score(a, from)
                .partial_cmp(&score(b, from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|driver| (driver, driver.primary_vehicle().unwrap().id))
}

#[cfg(test)]
mod tests {
    use model::{Driver, Vehicle, VehicleType};
    use utility::id::Id;

    use super::*;

    fn driver(id: i64, location: &str, rating: f64, trips: u32, capacity: u32) -> Driver {
        Driver {
            id: Id::new(id),
            user_ref: format!("user-{id}"),
            current_location: location.to_string(),
            license_number: format!("LIC-{id}"),
            rating,
            total_trips: trips,
            is_available: true,
            vehicles: vec![Vehicle {
                id: Id::new(id),
                capacity,
                vehicle_type: VehicleType::Sedan,
            }],
        }
    }

    fn passenger(from: &str) -> PendingRequest {
        PendingRequest::Passenger {
            request: model::PassengerRequest {
                id: Id::new(1),
                requester_ref: "r".into(),
                from: from.to_string(),
                to: "0,0".into(),
                departure_time: chrono::Utc::now(),
                passenger_count: 1,
                status: model::RequestStatus::Pending,
            },
            from: crate::geo::parse_coordinate(from).unwrap(),
            to: model::Coordinate::new(0.0, 0.0),
        }
    }

    #[test]
    fn prefers_closer_driver() {
        let near = driver(1, "24.71,46.67", 4.0, 10, 4);
        let far = driver(2, "30.0,50.0", 5.0, 1, 4);
        let request = passenger("24.71,46.67");
        let (chosen, _) = select_driver(&request, &[far, near.clone()]).unwrap();
        assert_eq!(chosen.id, near.id);
    }

    #[test]
    fn ignores_capacity_even_when_too_small_for_the_cluster() {
        // Capacity is the assembler's problem (partial attachment), not the
        // selector's: a too-small vehicle is still the best available driver.
        let small = driver(1, "24.71,46.67", 4.0, 10, 2);
        let request = passenger("24.71,46.67");
        let (chosen, _) = select_driver(&request, &[small.clone()]).unwrap();
        assert_eq!(chosen.id, small.id);
    }

    #[test]
    fn returns_none_when_no_candidate_has_a_vehicle() {
        let mut vehicleless = driver(1, "24.71,46.67", 4.0, 10, 4);
        vehicleless.vehicles.clear();
        let request = passenger("24.71,46.67");
        assert!(select_driver(&request, &[vehicleless]).is_none());
    }
}
