use super::{Point3, Vector3, TOLERANCE};

/// Projects a point onto the infinite line `origin + t * dir`.
///
/// `dir` does not need to be unit length.
#[must_use]
pub fn project_to_line(point: &Point3, origin: &Point3, dir: &Vector3) -> Point3 {
    let len_sq = dir.norm_squared();
    if len_sq < TOLERANCE {
        return *origin;
    }
    let t = (point - origin).dot(dir) / len_sq;
    origin + dir * t
}

/// Closest point on the segment `a`→`b` to `point`, clamped to the
/// segment (not the infinite line).
#[must_use]
pub fn project_to_segment(point: &Point3, a: &Point3, b: &Point3) -> Point3 {
    let dir = b - a;
    let len_sq = dir.norm_squared();
    if len_sq < TOLERANCE {
        // Degenerate segment (zero length).
        return *a;
    }
    let t = ((point - a).dot(&dir) / len_sq).clamp(0.0, 1.0);
    a + dir * t
}

/// Distance from `point` to the segment `a`→`b`.
#[must_use]
pub fn point_to_segment_dist(point: &Point3, a: &Point3, b: &Point3) -> f64 {
    (point - project_to_segment(point, a, b)).norm()
}

/// The closest pair of points between two infinite lines.
///
/// Returns `(point_on_first, point_on_second)`, or `None` when the lines
/// are parallel (every pairing is equally close).
#[must_use]
pub fn closest_points_between_lines(
    origin_a: &Point3,
    dir_a: &Vector3,
    origin_b: &Point3,
    dir_b: &Vector3,
) -> Option<(Point3, Point3)> {
    // Solve for s, t minimizing |A(s) - B(t)| with
    // A(s) = origin_a + s * dir_a, B(t) = origin_b + t * dir_b.
    let r = origin_a - origin_b;
    let a = dir_a.norm_squared();
    let b = dir_a.dot(dir_b);
    let c = dir_b.norm_squared();
    let d = dir_a.dot(&r);
    let e = dir_b.dot(&r);

    let denom = a * c - b * b;
    if denom.abs() < TOLERANCE {
        return None;
    }

    let s = (b * e - c * d) / denom;
    let t = (a * e - b * d) / denom;
    Some((origin_a + dir_a * s, origin_b + dir_b * t))
}
