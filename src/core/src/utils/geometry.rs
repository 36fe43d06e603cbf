use nalgebra::{Rotation2, Vector2};

pub const GEOMETRY_EPSILON: f32 = 1e-6;

/// Unit vector for a rotation given in radians, counter-clockwise from +X.
pub fn direction_from_rotation(rotation: f32) -> Vector2<f32> {
    Vector2::new(rotation.cos(), rotation.sin())
}

pub fn rotation_from_direction(direction: &Vector2<f32>) -> f32 {
    direction.y.atan2(direction.x)
}

/// Signed angle in radians that rotates `from` onto `to`, in `(-PI, PI]`.
pub fn signed_angle(from: &Vector2<f32>, to: &Vector2<f32>) -> f32 {
    let cross = from.x * to.y - from.y * to.x;
    let dot = from.dot(to);

    cross.atan2(dot)
}

pub fn rotate(vector: &Vector2<f32>, angle: f32) -> Vector2<f32> {
    Rotation2::new(angle) * *vector
}

pub fn normalize_or_zero(vector: &Vector2<f32>) -> Vector2<f32> {
    vector
        .try_normalize(GEOMETRY_EPSILON)
        .unwrap_or_else(Vector2::zeros)
}
