// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::core::sampler::{DirSample, ShadingPoint};
use crate::math::constants::Vector3f;

/// Result of sampling a material at a shading point. When `sampled` is
/// false no usable direction was produced, but `info.mult` may still carry
/// an emission value that the caller reports as outgoing radiance.
pub struct MaterialSample {
    pub dir: Vector3f,
    pub info: DirSample,
    pub sampled: bool,
}

impl MaterialSample {
    pub fn none() -> Self {
        Self {
            dir: Vector3f::zeros(),
            info: DirSample::void(),
            sampled: false,
        }
    }
}

pub trait Material: Send + Sync {
    /// Draw an outgoing direction from the BSDF.
    fn generate_sample(&self, sp: &ShadingPoint, rng: &mut LcgRng) -> MaterialSample;

    /// PDF and throughput for an externally chosen direction.
    fn sample_info(&self, sp: &ShadingPoint, dir: Vector3f) -> DirSample;
}
