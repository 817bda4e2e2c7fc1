// Copyright @yucwang 2026

use super::constants::Vector3f;

/// Build two unit vectors perpendicular to `n` (and to each other). `n` must
/// be unit length.
pub fn orthonormal_basis(n: &Vector3f) -> (Vector3f, Vector3f) {
    let up = if n.z.abs() < 0.999 {
        Vector3f::new(0.0, 0.0, 1.0)
    } else {
        Vector3f::new(1.0, 0.0, 0.0)
    };
    let u = n.cross(&up).normalize();
    let v = n.cross(&u).normalize();
    (u, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_is_orthonormal() {
        let dirs = [
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            Vector3f::new(1.0, 2.0, 3.0).normalize(),
            Vector3f::new(-0.2, 0.1, -0.9).normalize(),
        ];
        for n in &dirs {
            let (u, v) = orthonormal_basis(n);
            assert!(u.dot(n).abs() < 1e-5);
            assert!(v.dot(n).abs() < 1e-5);
            assert!(u.dot(&v).abs() < 1e-5);
            assert!((u.norm() - 1.0).abs() < 1e-5);
            assert!((v.norm() - 1.0).abs() < 1e-5);
        }
    }
}
