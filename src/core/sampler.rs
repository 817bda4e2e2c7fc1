// Copyright @yucwang 2026

use crate::core::hit::HitInfo;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Which lobe a direction sampler drew from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lobe {
    Diffuse,
    Specular,
    Transmission,
    None,
}

/// PDF, throughput and lobe tag for a sampled (or queried) direction.
/// `prob == 0` means the sampler could not have produced the direction;
/// consumers then treat `mult` as outgoing radiance only.
#[derive(Debug, Clone, Copy)]
pub struct DirSample {
    pub prob: Float,
    pub mult: RGBSpectrum,
    pub lobe: Lobe,
}

impl DirSample {
    pub fn void() -> Self {
        Self {
            prob: 0.0,
            mult: RGBSpectrum::black(),
            lobe: Lobe::None,
        }
    }
}

/// The shading-point view of a surface hit: everything a material or light
/// sampler needs, with normals and view direction normalized.
#[derive(Debug, Clone, Copy)]
pub struct ShadingPoint {
    pub p: Vector3f,
    pub n: Vector3f,
    pub gn: Vector3f,
    pub v: Vector3f,
    pub uvw: Vector3f,
    pub front: bool,
}

impl ShadingPoint {
    pub fn from_hit(ray: &Ray3f, hit: &HitInfo<'_>) -> Self {
        Self {
            p: hit.p,
            n: hit.n.normalize(),
            gn: hit.gn.normalize(),
            v: (-ray.dir).normalize(),
            uvw: hit.uvw,
            front: hit.front,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_sample() {
        let s = DirSample::void();
        assert_eq!(s.prob, 0.0);
        assert!(s.mult.is_black());
        assert_eq!(s.lobe, Lobe::None);
    }

    #[test]
    fn test_shading_point_normalizes() {
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -5.0));
        let mut hit = HitInfo::default();
        hit.p = Vector3f::new(0.0, 0.0, -2.0);
        hit.n = Vector3f::new(0.0, 0.0, 3.0);
        hit.gn = Vector3f::new(0.0, 0.0, 3.0);

        let sp = ShadingPoint::from_hit(&ray, &hit);
        assert!((sp.v - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        assert!((sp.n.norm() - 1.0).abs() < 1e-6);
        assert!((sp.gn.norm() - 1.0).abs() < 1e-6);
    }
}
