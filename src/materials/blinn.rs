// Copyright @yucwang 2026

use crate::core::material::{Material, MaterialSample};
use crate::core::rng::LcgRng;
use crate::core::sampler::{DirSample, Lobe, ShadingPoint};
use crate::core::texture::Texture;
use crate::math::constants::{Float, Vector3f, PI};
use crate::math::frame::orthonormal_basis;
use crate::math::spectrum::RGBSpectrum;
use crate::textures::constant::ConstantTexture;
use std::sync::Arc;

/// Layered Blinn material: a diffuse lobe, a glossy specular reflection
/// lobe and a glossy refraction lobe, each weighted by the maximum channel
/// of its texture, plus an emission channel taking the leftover probability
/// mass. Lobe weights double as Russian-roulette absorption: when the
/// channel sum reaches 1 it is renormalized to 1/2 so dim materials keep
/// mass reserved for absorption and emission.
pub struct MtlBlinn {
    diffuse: Arc<dyn Texture>,
    specular: Arc<dyn Texture>,
    refraction: Arc<dyn Texture>,
    glossiness: Arc<dyn Texture>,
    emission: Arc<dyn Texture>,
    ior: Float,
}

impl Default for MtlBlinn {
    fn default() -> Self {
        Self::new()
    }
}

impl MtlBlinn {
    pub fn new() -> Self {
        Self {
            diffuse: Arc::new(ConstantTexture::new(RGBSpectrum::gray(0.5))),
            specular: Arc::new(ConstantTexture::new(RGBSpectrum::black())),
            refraction: Arc::new(ConstantTexture::new(RGBSpectrum::black())),
            glossiness: Arc::new(ConstantTexture::new(RGBSpectrum::gray(20.0))),
            emission: Arc::new(ConstantTexture::new(RGBSpectrum::black())),
            ior: 1.0,
        }
    }

    pub fn with_diffuse(mut self, tex: Arc<dyn Texture>) -> Self {
        self.diffuse = tex;
        self
    }

    pub fn with_specular(mut self, tex: Arc<dyn Texture>) -> Self {
        self.specular = tex;
        self
    }

    pub fn with_refraction(mut self, tex: Arc<dyn Texture>) -> Self {
        self.refraction = tex;
        self
    }

    pub fn with_glossiness(mut self, tex: Arc<dyn Texture>) -> Self {
        self.glossiness = tex;
        self
    }

    pub fn with_emission(mut self, tex: Arc<dyn Texture>) -> Self {
        self.emission = tex;
        self
    }

    pub fn with_ior(mut self, ior: Float) -> Self {
        self.ior = ior;
        self
    }

    /// Channel weights at the hit, renormalized to reserve mass for the
    /// emission/absorption branch once they sum past 1.
    fn lobe_weights(&self, uvw: Vector3f) -> (Float, Float, Float) {
        let mut d_pow = self.diffuse.eval(uvw).max_channel();
        let mut r_pow = self.specular.eval(uvw).max_channel();
        let mut t_pow = self.refraction.eval(uvw).max_channel();

        let sum = d_pow + r_pow + t_pow;
        if sum >= 1.0 {
            d_pow /= 2.0 * sum;
            r_pow /= 2.0 * sum;
            t_pow /= 2.0 * sum;
        }
        (d_pow, r_pow, t_pow)
    }

    fn emission_at(&self, uvw: Vector3f) -> RGBSpectrum {
        let emit = self.emission.eval(uvw);
        if emit.has_nan() {
            RGBSpectrum::black()
        } else {
            emit
        }
    }
}

impl Material for MtlBlinn {
    fn generate_sample(&self, sp: &ShadingPoint, rng: &mut LcgRng) -> MaterialSample {
        let (d_pow, r_pow, t_pow) = self.lobe_weights(sp.uvw);

        let roll = rng.next_f32();
        if roll < d_pow {
            // Cosine-weighted direction about the shading normal.
            let (u, v) = orthonormal_basis(&sp.n);
            let phi = rng.next_f32() * 2.0 * PI;
            let cos_theta = (1.0 - rng.next_f32()).sqrt();
            let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

            let dir = sp.n * cos_theta
                + u * sin_theta * phi.cos()
                + v * sin_theta * phi.sin();

            return MaterialSample {
                dir,
                info: DirSample {
                    prob: d_pow * cos_theta / PI,
                    mult: self.diffuse.eval(sp.uvw) * (cos_theta / PI),
                    lobe: Lobe::Diffuse,
                },
                sampled: true,
            };
        }

        // Reflection and transmission share a Blinn-sampled half-vector
        // about the oriented normal.
        let (norm, eta) = if sp.front {
            (sp.n, 1.0 / self.ior)
        } else {
            (-sp.n, self.ior)
        };

        let (u, v) = orthonormal_basis(&norm);
        let gloss = self.glossiness.eval_scalar(sp.uvw);
        let cos_theta = (1.0 - rng.next_f32()).powf(1.0 / (gloss + 1.0));
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        let phi = rng.next_f32() * 2.0 * PI;

        let half = norm * cos_theta + u * sin_theta * phi.cos() + v * sin_theta * phi.sin();

        if roll < d_pow + r_pow {
            let dir = -sp.v + 2.0 * half.dot(&sp.v) * half;
            let prob = r_pow * (gloss + 1.0) / (2.0 * PI) * cos_theta.powf(gloss + 1.0) / 4.0;

            let cos_out = dir.dot(&norm);
            if cos_out < 0.0 {
                // Sampled below the surface.
                return MaterialSample {
                    dir: Vector3f::zeros(),
                    info: DirSample { prob, mult: RGBSpectrum::black(), lobe: Lobe::Specular },
                    sampled: false,
                };
            }

            let spec_cons = (gloss + 2.0) / (8.0 * PI);
            let f_spec =
                self.specular.eval(sp.uvw) * (norm.dot(&half).powf(gloss) * spec_cons / cos_out);

            return MaterialSample {
                dir,
                info: DirSample {
                    prob,
                    mult: f_spec * cos_out,
                    lobe: Lobe::Specular,
                },
                sampled: true,
            };
        } else if roll < d_pow + r_pow + t_pow {
            let k_cos = sp.v.dot(&half);
            let cos_phi_sq = 1.0 - eta * eta * (1.0 - k_cos * k_cos);
            let prob = t_pow * (gloss + 1.0) / (2.0 * PI) * cos_theta.powf(gloss + 1.0) / 4.0;

            // Half-vector behind the view, or total internal reflection.
            if half.dot(&sp.v) < 0.0 || cos_phi_sq < 0.0 {
                return MaterialSample {
                    dir: Vector3f::zeros(),
                    info: DirSample { prob, mult: RGBSpectrum::black(), lobe: Lobe::Transmission },
                    sampled: false,
                };
            }

            let dir = -eta * sp.v - (cos_phi_sq.sqrt() - eta * k_cos) * half;
            let cos_out = norm.dot(&dir).abs();

            let spec_cons = (gloss + 2.0) / (8.0 * PI);
            let f_trans =
                self.refraction.eval(sp.uvw) * (norm.dot(&half).powf(gloss) * spec_cons / cos_out);

            return MaterialSample {
                dir,
                info: DirSample {
                    prob,
                    mult: f_trans * cos_out,
                    lobe: Lobe::Transmission,
                },
                sampled: true,
            };
        }

        // Leftover mass: emission, or plain absorption.
        let prob = 1.0 - (d_pow + r_pow + t_pow);
        let emit = self.emission_at(sp.uvw);
        if !emit.is_black() {
            return MaterialSample {
                dir: sp.n,
                info: DirSample { prob, mult: emit, lobe: Lobe::None },
                sampled: false,
            };
        }

        MaterialSample {
            dir: Vector3f::zeros(),
            info: DirSample { prob, mult: RGBSpectrum::black(), lobe: Lobe::None },
            sampled: false,
        }
    }

    fn sample_info(&self, sp: &ShadingPoint, dir: Vector3f) -> DirSample {
        let (d_pow, r_pow, t_pow) = self.lobe_weights(sp.uvw);

        let mut prob: Float = 0.0;
        let mut mult = RGBSpectrum::black();

        let mut norm = sp.n;

        if (sp.v.dot(&norm) > 0.0) == (dir.dot(&norm) > 0.0) {
            // Same hemisphere: diffuse plus glossy reflection.
            let cos_out = sp.n.dot(&dir);

            if cos_out > 0.0 {
                mult += self.diffuse.eval(sp.uvw) * (cos_out / PI);
                prob += d_pow / PI;
            }

            if cos_out < 0.0 {
                norm = -norm;
            }
            let gloss = self.glossiness.eval_scalar(sp.uvw);
            let spec_cons = (gloss + 2.0) / (8.0 * PI);

            let half = (sp.v + dir).normalize();
            let geo_term = norm.dot(&half);

            mult += self.specular.eval(sp.uvw) * (geo_term.powf(gloss) * spec_cons);
            prob += (gloss + 1.0) * geo_term.powf(gloss) * r_pow;
        } else {
            // Opposite hemisphere: glossy transmission.
            let eta = if dir.dot(&norm) >= 0.0 {
                1.0 / self.ior
            } else {
                norm = -norm;
                self.ior
            };

            let gloss = self.glossiness.eval_scalar(sp.uvw);
            let spec_cons = (gloss + 2.0) / (8.0 * PI);

            let half = (dir + eta * sp.v).normalize();
            let geo_term = half.dot(&norm);

            mult += self.refraction.eval(sp.uvw) * (geo_term.powf(gloss) * spec_cons);
            prob += (gloss + 1.0) * geo_term.powf(gloss) * t_pow;
        }

        let emit = self.emission_at(sp.uvw);
        mult += emit;
        if !emit.is_black() {
            prob += 1.0 - (d_pow + r_pow + t_pow);
        }

        DirSample { prob, mult, lobe: Lobe::None }
    }
}

/* Tests for MtlBlinn */

#[cfg(test)]
mod tests {
    use super::*;

    fn shading_point(front: bool, v: Vector3f) -> ShadingPoint {
        ShadingPoint {
            p: Vector3f::zeros(),
            n: Vector3f::new(0.0, 0.0, 1.0),
            gn: Vector3f::new(0.0, 0.0, 1.0),
            v: v.normalize(),
            uvw: Vector3f::zeros(),
            front,
        }
    }

    fn diffuse_only(albedo: Float) -> MtlBlinn {
        MtlBlinn::new()
            .with_diffuse(Arc::new(ConstantTexture::new(RGBSpectrum::gray(albedo))))
    }

    #[test]
    fn test_diffuse_sampling_stays_above_surface() {
        let mtl = diffuse_only(0.6);
        let sp = shading_point(true, Vector3f::new(0.0, 0.3, 1.0));
        let mut rng = LcgRng::new(5);

        let mut sampled = 0;
        for _ in 0..128 {
            let s = mtl.generate_sample(&sp, &mut rng);
            if !s.sampled {
                // Leftover mass is plain absorption for this material.
                assert!(s.info.mult.is_black());
                continue;
            }
            sampled += 1;
            assert_eq!(s.info.lobe, Lobe::Diffuse);
            assert!(s.dir.dot(&sp.n) >= 0.0);
            assert!(s.info.prob > 0.0);
            // mult / prob reduces to albedo / weight = 1 for a gray albedo.
            let ratio = s.info.mult[0] / s.info.prob;
            assert!((ratio - 1.0).abs() < 1e-4);
        }
        assert!(sampled > 32);
    }

    #[test]
    fn test_eval_along_normal_matches_lambert() {
        let mtl = diffuse_only(0.6);
        let sp = shading_point(true, Vector3f::new(0.0, 0.0, 1.0));
        let info = mtl.sample_info(&sp, Vector3f::new(0.0, 0.0, 1.0));

        // cos = 1: mult = albedo / pi, prob = weight / pi.
        assert!((info.mult[0] - 0.6 / PI).abs() < 1e-5);
        assert!((info.prob - 0.6 / PI).abs() < 1e-5);
    }

    #[test]
    fn test_lobe_weights_renormalize_past_one() {
        let mtl = MtlBlinn::new()
            .with_diffuse(Arc::new(ConstantTexture::new(RGBSpectrum::gray(0.8))))
            .with_specular(Arc::new(ConstantTexture::new(RGBSpectrum::gray(0.8))));
        let (d, r, t) = mtl.lobe_weights(Vector3f::zeros());
        // Sum 1.6 >= 1 renormalizes to 1/2 total.
        assert!((d - 0.25).abs() < 1e-5);
        assert!((r - 0.25).abs() < 1e-5);
        assert!(t.abs() < 1e-6);
        assert!((d + r + t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_total_internal_reflection_yields_no_sample() {
        // Leaving a dense medium at a grazing angle: the refraction
        // discriminant goes negative for every half-vector of a sharp lobe.
        let mtl = MtlBlinn::new()
            .with_diffuse(Arc::new(ConstantTexture::new(RGBSpectrum::black())))
            .with_refraction(Arc::new(ConstantTexture::new(RGBSpectrum::gray(1.0))))
            .with_glossiness(Arc::new(ConstantTexture::new(RGBSpectrum::gray(1000.0))))
            .with_ior(1.5);
        let sp = shading_point(false, Vector3f::new(1.0, 0.0, -0.05));
        let mut rng = LcgRng::new(9);

        for _ in 0..200 {
            let s = mtl.generate_sample(&sp, &mut rng);
            assert!(!s.sampled);
            assert!(s.dir == Vector3f::zeros() || s.info.mult.is_black());
        }
    }

    #[test]
    fn test_emission_reported_without_direction() {
        let mtl = MtlBlinn::new()
            .with_diffuse(Arc::new(ConstantTexture::new(RGBSpectrum::black())))
            .with_emission(Arc::new(ConstantTexture::new(RGBSpectrum::new(2.0, 1.0, 0.5))));
        let sp = shading_point(true, Vector3f::new(0.0, 0.0, 1.0));
        let mut rng = LcgRng::new(1);

        let s = mtl.generate_sample(&sp, &mut rng);
        assert!(!s.sampled);
        assert_eq!(s.info.mult, RGBSpectrum::new(2.0, 1.0, 0.5));
        // All the probability mass is left for the emission branch.
        assert!((s.info.prob - 1.0).abs() < 1e-5);

        let info = mtl.sample_info(&sp, Vector3f::new(0.0, 0.0, 1.0));
        assert!(info.mult[0] >= 2.0);
    }
}
