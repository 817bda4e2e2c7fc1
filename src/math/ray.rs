// Copyright @yucwang 2026

use super::constants::{Float, Vector3f};

/// A ray with an unnormalized direction. The length of `dir` matters:
/// `t = 1` is the ray's destination point, which is how shadow rays span the
/// gap between a shading point and a light sample.
#[derive(Debug, Clone, Copy)]
pub struct Ray3f {
    pub p: Vector3f,
    pub dir: Vector3f,
}

impl Ray3f {
    pub fn new(p: Vector3f, dir: Vector3f) -> Self {
        Self { p, dir }
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.p + self.dir * t
    }
}

/* Tests for Ray */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at_keeps_direction_scale() {
        let o = Vector3f::new(1.0, 2.0, 3.0);
        let d = Vector3f::new(0.0, 0.0, 4.0);
        let ray = Ray3f::new(o, d);

        // t = 1 lands on the destination, not one unit along the direction.
        let dest = ray.at(1.0);
        assert!((dest - Vector3f::new(1.0, 2.0, 7.0)).norm() < 1e-6);

        let mid = ray.at(0.5);
        assert!((mid - Vector3f::new(1.0, 2.0, 5.0)).norm() < 1e-6);
    }
}
