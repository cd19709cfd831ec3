//! Distance, angle and cone tests shared by detection, attacks and lock-on.

use glam::{Quat, Vec3};

use warden_core::types::Pose;

/// Vectors shorter than this are treated as zero.
const EPSILON: f32 = 1e-6;

/// Drop the vertical component.
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Unsigned angle between two vectors in degrees.
/// Returns 0 when either vector is degenerate.
pub fn angle_deg(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom < EPSILON * EPSILON {
        return 0.0;
    }
    let cos = (a.dot(b) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Radius + cone check from `observer` to `point`.
///
/// The cone test uses the full 3D angle unless `flatten_cone` is set.
/// There is no occlusion test.
pub fn can_see(
    observer: &Pose,
    point: Vec3,
    radius: f32,
    cone_angle_deg: f32,
    flatten_cone: bool,
) -> bool {
    let to_point = point - observer.position;
    if to_point.length() > radius {
        return false;
    }

    let forward = observer.forward();
    let angle = if flatten_cone {
        angle_deg(flatten(forward), flatten(to_point))
    } else {
        angle_deg(forward, to_point)
    };

    angle <= cone_angle_deg * 0.5
}

/// Rotation facing along `direction` projected onto the ground plane.
/// `None` when the flattened direction is degenerate.
pub fn look_rotation(direction: Vec3) -> Option<Quat> {
    let flat = flatten(direction);
    if flat.length_squared() < EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(flat.x.atan2(flat.z)))
}

/// Angle between two orientations in degrees.
pub fn rotation_angle_deg(a: Quat, b: Quat) -> f32 {
    a.angle_between(b).to_degrees()
}

/// Rotate `from` toward `to` by at most `max_degrees`. Never overshoots.
pub fn rotate_towards(from: Quat, to: Quat, max_degrees: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle < EPSILON {
        return to;
    }
    let step = max_degrees.max(0.0).to_radians();
    if step >= angle {
        return to;
    }
    from.slerp(to, step / angle).normalize()
}

/// Distance from `point` to the line through `origin` along `axis`,
/// computed as `|to_point| * sin(angle(axis, to_point))`.
pub fn perpendicular_distance(origin: Vec3, axis: Vec3, point: Vec3) -> f32 {
    let to_point = point - origin;
    let distance = to_point.length();
    if distance < EPSILON {
        return 0.0;
    }
    distance * angle_deg(axis, to_point).to_radians().sin()
}
