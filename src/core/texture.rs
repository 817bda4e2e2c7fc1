// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

pub trait Texture: Send + Sync {
    fn eval(&self, uvw: Vector3f) -> RGBSpectrum;

    /// Scalar channels (glossiness) read the red component.
    fn eval_scalar(&self, uvw: Vector3f) -> Float {
        self.eval(uvw)[0]
    }
}
