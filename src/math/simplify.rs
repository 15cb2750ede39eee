use super::project::point_to_segment_dist;
use super::Point3;

/// Simplifies a polyline with the Douglas-Peucker algorithm.
///
/// Returns a subsequence of `points` whose maximum deviation from the
/// original polyline stays within `epsilon`. The first and last points are
/// always retained. `epsilon <= 0` returns the input unchanged.
#[must_use]
pub fn simplify_polyline(points: &[Point3], epsilon: f64) -> Vec<Point3> {
    if points.len() <= 2 || epsilon <= 0.0 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    mark_kept(points, 0, points.len() - 1, epsilon, &mut keep);

    points
        .iter()
        .zip(&keep)
        .filter_map(|(pt, &k)| k.then_some(*pt))
        .collect()
}

/// Recursively marks the farthest-deviating point of each span.
fn mark_kept(points: &[Point3], first: usize, last: usize, epsilon: f64, keep: &mut [bool]) {
    if last <= first + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_index = first;
    for (i, pt) in points.iter().enumerate().take(last).skip(first + 1) {
        let d = point_to_segment_dist(pt, &points[first], &points[last]);
        if d > max_dist {
            max_dist = d;
            max_index = i;
        }
    }

    if max_dist > epsilon {
        keep[max_index] = true;
        mark_kept(points, first, max_index, epsilon, keep);
        mark_kept(points, max_index, last, epsilon, keep);
    }
}
