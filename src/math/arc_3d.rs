use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};

use super::{Point3, Vector3, TOLERANCE};

/// A circular arc frame in 3D space.
///
/// `x_axis` is the zero-angle reference direction and must be perpendicular
/// to `normal`. Angles are in radians, swept counter-clockwise around the
/// normal from `start_angle` to `end_angle`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcFrame {
    pub center: Point3,
    pub x_axis: Vector3,
    pub normal: Vector3,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl ArcFrame {
    /// Creates a new arc frame, normalizing the axes.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, either axis is
    /// zero-length, or `x_axis` is not perpendicular to `normal`.
    pub fn new(
        center: Point3,
        x_axis: Vector3,
        normal: Vector3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }
        let x_len = x_axis.norm();
        let n_len = normal.norm();
        if x_len < TOLERANCE || n_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let x_axis = x_axis / x_len;
        let normal = normal / n_len;
        if x_axis.dot(&normal).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "arc x-axis must be perpendicular to normal".into(),
            )
            .into());
        }
        Ok(Self {
            center,
            x_axis,
            normal,
            radius,
            start_angle,
            end_angle,
        })
    }

    /// Evaluates the arc circle at `angle` radians from the x-axis.
    #[must_use]
    pub fn evaluate(&self, angle: f64) -> Point3 {
        let binormal = self.normal.cross(&self.x_axis);
        self.center
            + self.x_axis * (self.radius * angle.cos())
            + binormal * (self.radius * angle.sin())
    }

    /// Projects a point onto the arc's plane.
    #[must_use]
    pub fn project_to_plane(&self, point: &Point3) -> Point3 {
        let to_point = point - self.center;
        point - self.normal * to_point.dot(&self.normal)
    }

    /// Sample points along the sweep, inclusive of both ends.
    ///
    /// `segments` is the number of chords, so `segments + 1` points come
    /// back. Zero segments degenerate to the two end points.
    #[must_use]
    pub fn sample(&self, segments: usize) -> Vec<Point3> {
        let segments = segments.max(1);
        let sweep = self.end_angle - self.start_angle;
        (0..=segments)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let frac = i as f64 / segments as f64;
                self.evaluate(self.start_angle + sweep * frac)
            })
            .collect()
    }
}

/// Angle from `from` to `to` around `normal`, in `[0, 2π)`.
///
/// Unlike the plain unsigned angle, a right turn relative to the normal
/// reports the reflex angle.
#[must_use]
pub fn full_angle_between(from: &Vector3, to: &Vector3, normal: &Vector3) -> f64 {
    let from_len = from.norm();
    let to_len = to.norm();
    if from_len < TOLERANCE || to_len < TOLERANCE {
        return 0.0;
    }
    let cos = (from.dot(to) / (from_len * to_len)).clamp(-1.0, 1.0);
    let angle = cos.acos();
    if right_turn(from, to, normal) {
        TAU - angle
    } else {
        angle
    }
}

/// Whether turning from `from` to `to` is clockwise around `normal`.
#[must_use]
pub fn right_turn(from: &Vector3, to: &Vector3, normal: &Vector3) -> bool {
    from.cross(to).dot(normal) < 0.0
}
