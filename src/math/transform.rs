// Copyright @yucwang 2026

use super::constants::{Matrix4f, Vector3f};
use super::ray::Ray3f;

/// An affine transform with a cached inverse. Rays are pushed down into a
/// node's local frame with the inverse maps and hits are lifted back with the
/// forward maps; directions are never renormalized, so the ray parameter t is
/// the same in every frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Matrix4f::identity(),
            inv_matrix: Matrix4f::identity(),
        }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4f) -> Self {
        Self {
            matrix,
            inv_matrix: matrix.try_inverse().unwrap_or_else(Matrix4f::identity),
        }
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        self.matrix.transform_point(&p.into()).coords
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        self.matrix.transform_vector(&v)
    }

    // Normal transformation differs from point transformation.
    // Before transformation, we have n^T x = 0.
    // After transformation, we have (Sn)^T (Mx) = 0.
    // Then, we will get: S = (M^{-1})^T
    pub fn apply_normal(&self, n: Vector3f) -> Vector3f {
        self.inv_matrix.transpose().transform_vector(&n)
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        self.inv_matrix.transform_point(&p.into()).coords
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        self.inv_matrix.transform_vector(&v)
    }

    pub fn inv_apply_ray(&self, ray: &Ray3f) -> Ray3f {
        Ray3f::new(self.inv_apply_point(ray.p), self.inv_apply_vector(ray.dir))
    }
}

/* Tests for Transform */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Float;

    fn translation(x: Float, y: Float, z: Float) -> Transform {
        Transform::new(Matrix4f::new_translation(&Vector3f::new(x, y, z)))
    }

    #[test]
    fn test_transform_reciprocity() {
        let t = Transform::new(
            Matrix4f::new_translation(&Vector3f::new(1.0, -2.0, 3.0))
                * Matrix4f::new_nonuniform_scaling(&Vector3f::new(2.0, 1.0, 0.5)),
        );

        let p = Vector3f::new(0.3, 0.7, -1.1);
        let roundtrip = t.apply_point(t.inv_apply_point(p));
        assert!((roundtrip - p).norm() < 1e-5);

        let v = Vector3f::new(1.0, 2.0, 3.0);
        let roundtrip_v = t.apply_vector(t.inv_apply_vector(v));
        assert!((roundtrip_v - v).norm() < 1e-5);
    }

    #[test]
    fn test_translation_leaves_vectors_alone() {
        let t = translation(5.0, 6.0, 7.0);
        let v = Vector3f::new(1.0, 0.0, -1.0);
        assert!((t.apply_vector(v) - v).norm() < 1e-6);
        assert!((t.apply_point(Vector3f::zeros()) - Vector3f::new(5.0, 6.0, 7.0)).norm() < 1e-6);
    }

    #[test]
    fn test_normal_transform_under_nonuniform_scale() {
        // A plane normal must stay perpendicular to a transformed tangent.
        let t = Transform::new(Matrix4f::new_nonuniform_scaling(&Vector3f::new(4.0, 1.0, 1.0)));
        let tangent = Vector3f::new(1.0, 1.0, 0.0);
        let normal = Vector3f::new(-1.0, 1.0, 0.0);

        let tangent_w = t.apply_vector(tangent);
        let normal_w = t.apply_normal(normal);
        assert!(tangent_w.dot(&normal_w).abs() < 1e-5);
    }

    #[test]
    fn test_ray_parameter_is_frame_invariant() {
        let t = Transform::new(
            Matrix4f::new_translation(&Vector3f::new(2.0, 0.0, 0.0))
                * Matrix4f::new_scaling(3.0),
        );
        let ray = Ray3f::new(Vector3f::new(-1.0, 0.0, 0.0), Vector3f::new(2.0, 0.0, 0.0));
        let local = t.inv_apply_ray(&ray);

        // The same t reaches corresponding points in both frames.
        let p_world = ray.at(0.75);
        let p_local = local.at(0.75);
        assert!((t.apply_point(p_local) - p_world).norm() < 1e-5);
    }
}
