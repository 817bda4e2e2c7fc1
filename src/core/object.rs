// Copyright @yucwang 2026

use crate::core::hit::{HitInfo, HitSide};
use crate::math::ray::Ray3f;

/// Geometry attached to a scene-graph node. The ray is in the object's
/// local frame; an implementation updates `hit` only when it finds an
/// intersection closer than `hit.z`.
pub trait Object: Send + Sync {
    fn intersect_ray(&self, ray: &Ray3f, hit: &mut HitInfo<'_>, side: HitSide) -> bool;
}
