use model::Coordinate;

use crate::geo::haversine;

/// Nearest-neighbor greedy tour. Starting from `points[0]`, repeatedly visits
/// the closest remaining point. Ties are broken by preferring the point that
/// appears earlier in the remaining input order, so the result is
/// deterministic for identical inputs.
pub fn nearest_neighbor_route(points: &[Coordinate]) -> Vec<Coordinate> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut remaining: Vec<usize> = (1..points.len()).collect();
    let mut route = Vec::with_capacity(points.len());
    let mut tail = points[0];
    route.push(tail);

    while !remaining.is_empty() {
        let (pos, _) = remaining
            .iter()
            .enumerate()
            .map(|(pos, &idx)| (pos, haversine(tail, points[idx])))
            .fold(None, |best: Option<(usize, f64)>, (pos, dist)| match best {
                Some((_, best_dist)) if best_dist <= dist => best,
                _ => Some((pos, dist)),
            })
            .expect("remaining is non-empty");
        let idx = remaining.remove(pos);
        tail = points[idx];
        route.push(tail);
    }

    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_inputs_pass_through() {
        let p = vec![Coordinate::new(0.0, 0.0)];
        assert_eq!(nearest_neighbor_route(&p).len(), 1);
        let p2 = vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)];
        assert_eq!(nearest_neighbor_route(&p2), p2);
    }

    #[test]
    fn route_is_permutation_starting_at_origin() {
        let points = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
        ];
        let route = nearest_neighbor_route(&points);
        assert_eq!(route.len(), points.len());
        assert_eq!(route[0], points[0]);
        for p in &points {
            assert!(route.iter().any(|r| (r.lat - p.lat).abs() < 1e-9
                && (r.lon - p.lon).abs() < 1e-9));
        }
    }

    #[test]
    fn square_tour_visits_adjacent_corners_first() {
        // S6: points [(0,0),(0,1),(1,0),(1,1)]. From (0,0), both (0,1) and
        // (1,0) are equidistant; (0,1) appears earlier in the remaining
        // input order and wins the tie.
        let points = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
        ];
        let route = nearest_neighbor_route(&points);
        assert_eq!(
            route,
            vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(0.0, 1.0),
                Coordinate::new(1.0, 1.0),
                Coordinate::new(1.0, 0.0),
            ]
        );
    }
}
