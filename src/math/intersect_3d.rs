use super::project::closest_points_between_lines;
use super::{Point3, Vector3, MERGE_TOLERANCE, TOLERANCE};

/// Whether two directions are parallel (or anti-parallel).
#[must_use]
pub fn parallel(a: &Vector3, b: &Vector3) -> bool {
    a.cross(b).norm() < TOLERANCE * a.norm().max(1.0) * b.norm().max(1.0)
}

/// Intersects an infinite line with the segment `a`→`b`.
///
/// Returns the intersection point when the line passes within the host
/// merge threshold of the segment, `None` for parallel lines, misses, and
/// hits beyond the segment ends.
#[must_use]
pub fn intersect_line_segment(
    origin: &Point3,
    dir: &Vector3,
    a: &Point3,
    b: &Point3,
) -> Option<Point3> {
    let seg_dir = b - a;
    let seg_len_sq = seg_dir.norm_squared();
    if seg_len_sq < TOLERANCE {
        return None;
    }

    let (on_line, on_seg) = closest_points_between_lines(origin, dir, a, &seg_dir)?;
    if (on_line - on_seg).norm() > MERGE_TOLERANCE {
        return None;
    }

    let t = (on_seg - a).dot(&seg_dir) / seg_len_sq;
    let slack = MERGE_TOLERANCE / seg_len_sq.sqrt();
    if t < -slack || t > 1.0 + slack {
        return None;
    }
    Some(on_seg)
}
