// Copyright @yucwang 2026

use crate::core::hit::{HitInfo, HitSide};
use crate::core::object::Object;
use crate::math::constants::{Vector3f, HIT_BIAS, PI};
use crate::math::ray::Ray3f;

/// Unit sphere at the origin of its node's local frame.
pub struct Sphere;

impl Object for Sphere {
    fn intersect_ray(&self, ray: &Ray3f, hit: &mut HitInfo<'_>, side: HitSide) -> bool {
        let mut front = true;

        // Solve |p + t d|^2 = 1.
        let a = ray.dir.dot(&ray.dir);
        let b = 2.0 * ray.dir.dot(&ray.p);
        let c = ray.p.dot(&ray.p) - 1.0;

        let delta = b * b - 4.0 * a * c;
        if delta < 0.0 {
            return false;
        }

        let mut t = (-b - delta.sqrt()) / (2.0 * a);
        if t <= HIT_BIAS {
            if side.wants_back() {
                // The near face is behind (or too close); try the far one.
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

        // Near-tangential hit.
        if p.dot(&ray.dir).abs() <= HIT_BIAS {
            return false;
        }

        if t < hit.z {
            hit.z = t;
            hit.front = front;
            hit.p = p;
            // Normals are normalized after the transform lift, not here.
            hit.n = p;
            hit.gn = p;
            let u = p.y.atan2(p.x) / (2.0 * PI);
            let v = p.z.asin() / PI + 0.5;
            hit.uvw = Vector3f::new(u, v, 0.5);
            return true;
        }

        false
    }
}

/* Tests for Sphere */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_hit_matches_smaller_root() {
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(Sphere.intersect_ray(&ray, &mut hit, HitSide::FrontAndBack));
        assert!((hit.z - 4.0).abs() < 1e-4);
        assert!(hit.front);
        assert!((hit.p - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-4);
        assert!((hit.n - hit.p).norm() < 1e-6);
    }

    #[test]
    fn test_inside_origin_reports_back_face() {
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0));
        let mut hit = HitInfo::default();
        assert!(Sphere.intersect_ray(&ray, &mut hit, HitSide::FrontAndBack));
        assert!(!hit.front);
        assert!((hit.z - 1.0).abs() < 1e-4);

        // Front-only queries see nothing from inside.
        let mut hit = HitInfo::default();
        assert!(!Sphere.intersect_ray(&ray, &mut hit, HitSide::Front));
    }

    #[test]
    fn test_miss_and_grazing_reject() {
        let miss = Ray3f::new(Vector3f::new(0.0, 2.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(!Sphere.intersect_ray(&miss, &mut hit, HitSide::FrontAndBack));

        // Tangent ray: discriminant ~ 0 and p.d ~ 0, rejected as grazing.
        let graze = Ray3f::new(Vector3f::new(0.0, 1.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(!Sphere.intersect_ray(&graze, &mut hit, HitSide::FrontAndBack));
    }

    #[test]
    fn test_closer_hit_is_kept() {
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        hit.z = 2.0; // something nearer was already found
        assert!(!Sphere.intersect_ray(&ray, &mut hit, HitSide::FrontAndBack));
        assert_eq!(hit.z, 2.0);
    }

    #[test]
    fn test_spherical_uv_poles_and_equator() {
        let ray = Ray3f::new(Vector3f::new(5.0, 0.0, 0.0), Vector3f::new(-1.0, 0.0, 0.0));
        let mut hit = HitInfo::default();
        assert!(Sphere.intersect_ray(&ray, &mut hit, HitSide::FrontAndBack));
        // Hit at (1, 0, 0): u = atan2(0,1)/2pi = 0, v = 0.5.
        assert!(hit.uvw.x.abs() < 1e-5);
        assert!((hit.uvw.y - 0.5).abs() < 1e-5);
    }
}
