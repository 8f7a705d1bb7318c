use model::Coordinate;
use utility::geo::haversine_distance;

/// Parses the wire form of a coordinate: two decimal numbers separated by a
/// comma, optionally padded with whitespace. Anything else, or a value
/// outside WGS84 bounds, is rejected.
pub fn parse_coordinate(raw: &str) -> Option<Coordinate> {
    let (lat_str, lon_str) = raw.trim().split_once(',')?;
    let lat: f64 = lat_str.trim().parse().ok()?;
    let lon: f64 = lon_str.trim().parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some(Coordinate::new(lat, lon))
}

pub fn haversine(a: Coordinate, b: Coordinate) -> f64 {
    haversine_distance(a.lat, a.lon, b.lat, b.lon)
}

/// Arithmetic mean of latitudes and longitudes. Only meaningful for points
/// already known to lie within a single urban-scale cluster.
pub fn centroid(points: &[Coordinate]) -> Option<Coordinate> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let lat = points.iter().map(|p| p.lat).sum::<f64>() / n;
    let lon = points.iter().map(|p| p.lon).sum::<f64>() / n;
    Some(Coordinate::new(lat, lon))
}

/// Discrete Frechet distance between two polylines, using haversine as the
/// point-to-point metric. Used by trip-merge optimization to decide whether
/// two trips' routes are similar enough to combine.
pub fn route_similarity(p: &[Coordinate], q: &[Coordinate]) -> f64 {
    if p.is_empty() || q.is_empty() {
        return f64::INFINITY;
    }

    let n = p.len();
    let m = q.len();
    let mut ca = vec![vec![-1.0_f64; m]; n];

    fn recurse(
        ca: &mut Vec<Vec<f64>>,
        p: &[Coordinate],
        q: &[Coordinate],
        i: usize,
        j: usize,
    ) -> f64 {
        if ca[i][j] > -0.5 {
            return ca[i][j];
        }
        let d = haversine(p[i], q[j]);
        ca[i][j] = if i == 0 && j == 0 {
            d
        } else if i == 0 {
            recurse(ca, p, q, 0, j - 1).max(d)
        } else if j == 0 {
            recurse(ca, p, q, i - 1, 0).max(d)
        } else {
            let prev = recurse(ca, p, q, i - 1, j)
                .min(recurse(ca, p, q, i - 1, j - 1))
                .min(recurse(ca, p, q, i, j - 1));
            prev.max(d)
        };
        ca[i][j]
    }

    recurse(&mut ca, p, q, n - 1, m - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_coordinate() {
        let c = parse_coordinate(" 24.71, 46.67 ").unwrap();
        assert!((c.lat - 24.71).abs() < 1e-9);
        assert!((c.lon - 46.67).abs() < 1e-9);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(parse_coordinate("91.0,0.0").is_none());
        assert!(parse_coordinate("0.0,-181.0").is_none());
    }

    #[test]
    fn rejects_malformed() {
        assert!(parse_coordinate("not-a-coordinate").is_none());
        assert!(parse_coordinate("1.0").is_none());
    }

    #[test]
    fn haversine_self_is_zero() {
        let a = Coordinate::new(24.71, 46.67);
        assert!(haversine(a, a) < 1e-9);
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = Coordinate::new(24.71, 46.67);
        let b = Coordinate::new(24.80, 46.70);
        assert!((haversine(a, b) - haversine(b, a)).abs() < 1e-9);
    }

    #[test]
    fn route_similarity_identical_is_zero() {
        let p = vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)];
        assert!(route_similarity(&p, &p) < 1e-9);
    }
}
