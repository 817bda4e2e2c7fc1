// Copyright @yucwang 2026

pub mod point;
pub mod spot;

use crate::core::hit::{HitInfo, HitSide};
use crate::math::constants::{Float, Vector3f, HIT_BIAS, PI};
use crate::math::ray::Ray3f;

/// Ray test against a light's emissive sphere, sharing the bias policy of
/// the geometric sphere primitive. Updates `hit` when the intersection is
/// the closest so far.
pub(crate) fn intersect_light_sphere(
    center: Vector3f,
    radius: Float,
    ray: &Ray3f,
    hit: &mut HitInfo<'_>,
    side: HitSide,
) -> bool {
    let mut front = true;

    let diff = ray.p - center;
    let a = ray.dir.dot(&ray.dir);
    let b = 2.0 * ray.dir.dot(&diff);
    let c = diff.dot(&diff) - radius * radius;

    let delta = b * b - 4.0 * a * c;
    if delta < 0.0 {
        return false;
    }

    let mut t = (-b - delta.sqrt()) / (2.0 * a);
    if t <= 0.0 {
        return false;
    }
    if t <= HIT_BIAS {
        if side.wants_back() {
            front = false;
            t = (-b + delta.sqrt()) / (2.0 * a);
            if t <= HIT_BIAS {
                return false;
            }
        } else {
            return false;
        }
    }

    let p = ray.p + ray.dir * t;
    let local = p - center;

    // Near-tangential hit.
    if local.dot(&ray.dir).abs() <= HIT_BIAS * radius.max(1.0) {
        return false;
    }

    if t < hit.z {
        hit.z = t;
        hit.front = front;
        hit.p = p;
        hit.n = local;
        hit.gn = local;
        let unit = local / radius;
        let u = unit.y.atan2(unit.x) / (2.0 * PI);
        let v = unit.z.clamp(-1.0, 1.0).asin() / PI + 0.5;
        hit.uvw = Vector3f::new(u, v, 0.5);
        return true;
    }

    false
}
