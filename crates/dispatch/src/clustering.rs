use chrono::{DateTime, Utc};

use crate::pending::PendingRequest;

/// Feature vector per request: `[from.lat, from.lon, to.lat, to.lon]`. The
/// reference clusterer is spatial-only; departure time is stratified in a
/// separate pass (`time_buckets`) rather than folded into this vector.
pub type Features = [f64; 4];

pub fn features_of(request: &PendingRequest) -> Features {
    let from = request.from();
    let to = request.to();
    [from.lat, from.lon, to.lat, to.lon]
}

/// Per-column zero-mean, unit-variance scaling, so spatial axes are
/// comparable regardless of their natural spread. Kept separate from the
/// clusterer itself so the engine can be handed a deterministic
/// `IdentityScaler` in tests instead of `StandardScaler`.
pub trait Scaler: Send + Sync {
    fn fit_transform(&self, features: &[Features]) -> Vec<Features>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

impl Scaler for StandardScaler {
    fn fit_transform(&self, features: &[Features]) -> Vec<Features> {
        if features.is_empty() {
            return Vec::new();
        }
        let n = features.len() as f64;
        let mut mean = [0.0_f64; 4];
        for row in features {
            for i in 0..4 {
                mean[i] += row[i];
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut variance = [0.0_f64; 4];
        for row in features {
            for i in 0..4 {
                let d = row[i] - mean[i];
                variance[i] += d * d;
            }
        }
        let mut std_dev = [0.0_f64; 4];
        for i in 0..4 {
            std_dev[i] = (variance[i] / n).sqrt();
        }

        features
            .iter()
            .map(|row| {
                let mut scaled = [0.0_f64; 4];
                for i in 0..4 {
                    scaled[i] = if std_dev[i] > 1e-12 {
                        (row[i] - mean[i]) / std_dev[i]
                    } else {
                        0.0
                    };
                }
                scaled
            })
            .collect()
    }
}

/// Injected by tests that want cluster membership to depend only on raw
/// coordinate distance, without scaling noise.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityScaler;

impl Scaler for IdentityScaler {
    fn fit_transform(&self, features: &[Features]) -> Vec<Features> {
        features.to_vec()
    }
}

fn euclidean(a: &Features, b: &Features) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Density-based clustering over already-scaled feature vectors. Labels are
/// `-1` for noise, `0..` for cluster membership, following the scikit-learn
/// DBSCAN convention this workspace's original Python implementation relied
/// on.
pub fn dbscan(points: &[Features], eps: f64, min_samples: usize) -> Vec<i32> {
    let n = points.len();
    let mut labels = vec![-1_i32; n];
    let mut visited = vec![false; n];
    let mut next_label = 0_i32;

    let neighbors = |i: usize| -> Vec<usize> {
        (0..n)
            .filter(|&j| j != i && euclidean(&points[i], &points[j]) <= eps)
            .collect()
    };

    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;

        let mut seeds = neighbors(i);
        if seeds.len() + 1 < min_samples {
            // stays noise (-1) unless picked up later by another core point
            continue;
        }

        let label = next_label;
        next_label += 1;
        labels[i] = label;

        let mut queue = seeds.clone();
        let mut pos = 0;
        while pos < queue.len() {
            let j = queue[pos];
            pos += 1;

            if !visited[j] {
                visited[j] = true;
                let j_neighbors = neighbors(j);
                if j_neighbors.len() + 1 >= min_samples {
                    for n in j_neighbors {
                        if !queue.contains(&n) {
                            queue.push(n);
                        }
                    }
                }
            }
            if labels[j] == -1 {
                labels[j] = label;
            }
        }
        seeds.clear();
    }

    labels
}

/// Groups request indices by their cluster label, skipping noise (`-1`);
/// cluster order follows ascending label, and membership order within a
/// cluster follows the original input order.
pub fn group_by_label(labels: &[i32]) -> Vec<Vec<usize>> {
    let mut max_label = -1;
    for &label in labels {
        if label > max_label {
            max_label = label;
        }
    }
    if max_label < 0 {
        return Vec::new();
    }
    let mut groups = vec![Vec::new(); (max_label + 1) as usize];
    for (idx, &label) in labels.iter().enumerate() {
        if label >= 0 {
            groups[label as usize].push(idx);
        }
    }
    groups
}

/// Second-pass temporal stratification inside a spatial cluster: buckets
/// members by minutes-to-departure using k-means with
/// `k = max(1, ceil(|cluster|/3))`. Members without a departure time (pure
/// delivery clusters never call this) are not expected here.
pub fn time_buckets(
    cluster: &[usize],
    departure_minutes: impl Fn(usize) -> f64,
    now: DateTime<Utc>,
) -> Vec<Vec<usize>> {
    let _ = now;
    let n = cluster.len();
    if n <= 1 {
        return vec![cluster.to_vec()];
    }

    let k = ((n as f64) / 3.0).ceil().max(1.0) as usize;
    if k >= n {
        return cluster.iter().map(|&idx| vec![idx]).collect();
    }

    let values: Vec<f64> = cluster.iter().map(|&idx| departure_minutes(idx)).collect();

    // k-means++-free initialization: evenly spaced quantiles of the sorted
    // values, which is deterministic and good enough for k <= a handful of
    // buckets.
    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mut centroids: Vec<f64> = (0..k)
        .map(|i| sorted[i * (sorted.len() - 1) / k.max(1)])
        .collect();

    let mut assignment = vec![0usize; n];
    for _ in 0..16 {
        let mut changed = false;
        for i in 0..n {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (c, &centroid) in centroids.iter().enumerate() {
                let dist = (values[i] - centroid).abs();
                if dist < best_dist {
                    best_dist = dist;
                    best = c;
                }
            }
            if assignment[i] != best {
                assignment[i] = best;
                changed = true;
            }
        }
        for c in 0..k {
            let members: Vec<f64> = (0..n)
                .filter(|&i| assignment[i] == c)
                .map(|i| values[i])
                .collect();
            if !members.is_empty() {
                centroids[c] = members.iter().sum::<f64>() / members.len() as f64;
            }
        }
        if !changed {
            break;
        }
    }

    let mut buckets = vec![Vec::new(); k];
    for (i, &idx) in cluster.iter().enumerate() {
        buckets[assignment[i]].push(idx);
    }
    buckets.retain(|bucket| !bucket.is_empty());
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_scaler_zeroes_constant_columns() {
        let features = vec![[1.0, 2.0, 3.0, 4.0], [1.0, 2.0, 3.0, 4.0]];
        let scaled = StandardScaler.fit_transform(&features);
        for row in scaled {
            assert_eq!(row, [0.0, 0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn dbscan_groups_tight_cluster_and_flags_far_point_as_noise() {
        let points = vec![
            [0.0, 0.0, 0.0, 0.0],
            [0.01, 0.01, 0.0, 0.0],
            [0.02, 0.0, 0.0, 0.0],
            [50.0, 50.0, 50.0, 50.0],
        ];
        let labels = dbscan(&points, 0.1, 2);
        assert_eq!(labels[3], -1);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert!(labels[0] >= 0);
    }

    #[test]
    fn group_by_label_preserves_order_and_skips_noise() {
        let labels = vec![0, -1, 1, 0, 1];
        let groups = group_by_label(&labels);
        assert_eq!(groups, vec![vec![0, 3], vec![2, 4]]);
    }
}
