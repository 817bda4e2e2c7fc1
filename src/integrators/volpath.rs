// Copyright @yucwang 2026

use crate::core::hit::{HitInfo, HitSide};
use crate::core::light::{same_light, Light};
use crate::core::rng::LcgRng;
use crate::core::sampler::{DirSample, Lobe, ShadingPoint};
use crate::core::scene::Scene;
use crate::math::constants::{Float, Vector3f, BIG_FLOAT, PI};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::media::homogeneous::HomogeneousMedium;

/// Hard recursion cap; paths this deep carry negligible throughput.
pub const BOUNCE_MAX: u32 = 2000;

/// Volumetric path tracer: free-flight sampling through the global medium,
/// next-event estimation at scatter points and surfaces, and a power
/// heuristic (beta = 2) to combine light and BSDF/phase strategies.
pub struct VolPathIntegrator<'a> {
    scene: &'a Scene,
    lights: Vec<&'a dyn Light>,
    img_width: usize,
    img_height: usize,
}

impl<'a> VolPathIntegrator<'a> {
    pub fn new(scene: &'a Scene, img_width: usize, img_height: usize) -> Self {
        let lights = scene
            .lights()
            .iter()
            .filter(|l| l.is_photon_source())
            .map(|l| l.as_ref())
            .collect();
        Self { scene, lights, img_width, img_height }
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    fn random_light(&self, rng: &mut LcgRng) -> Option<&'a dyn Light> {
        if self.lights.is_empty() {
            return None;
        }
        Some(self.lights[rng.next_u32() as usize % self.lights.len()])
    }

    fn background_uvw(&self, pixel: (usize, usize)) -> Vector3f {
        Vector3f::new(
            pixel.0 as Float / self.img_width as Float,
            pixel.1 as Float / self.img_height as Float,
            0.5,
        )
    }

    /// Trace one path segment. `hit` is reused down the recursion so the
    /// caller can read the final hit distance for the Z-buffer.
    pub fn trace_path(
        &self,
        ray: Ray3f,
        pixel: (usize, usize),
        hit: &mut HitInfo<'a>,
        rng: &mut LcgRng,
        bounce: u32,
    ) -> RGBSpectrum {
        if bounce >= BOUNCE_MAX {
            return RGBSpectrum::black();
        }

        hit.init();
        let found = self.scene.trace_ray(&ray, hit, HitSide::FrontAndBack);
        if !found {
            // Free flight to infinity.
            hit.z = BIG_FLOAT;
        }

        let medium = self.scene.medium();
        let roll = rng.next_f32();
        let t_rand = medium.sample_distance(roll);

        if t_rand < hit.z {
            // The medium interacts before any surface. The same roll that
            // chose the distance decides absorption against scattering.
            if roll < medium.absorption_prob() {
                if bounce == 0 && !found {
                    return self.scene.eval_background(self.background_uvw(pixel));
                } else if !found {
                    return self.scene.eval_environment(ray.dir);
                }
                return RGBSpectrum::black();
            }

            let pdf = medium.distance_pdf(t_rand);
            let transmittance = medium.transmittance(t_rand);
            let p = ray.p + t_rand * ray.dir;

            // Next-event estimation from the scatter point.
            let mut light_samp = RGBSpectrum::black();
            if let Some(light) = self.random_light(rng) {
                if let Some((l_dir, mut l_info)) = light.generate_sample(p, rng) {
                    l_info.prob /= self.lights.len() as Float;

                    let mut shadow_info = HitInfo::default();
                    let shadow_hit = self.scene.shadow_trace_ray(
                        &Ray3f::new(p, l_dir),
                        &mut shadow_info,
                        HitSide::FrontAndBack,
                        1.0,
                    );

                    // A shadow ray that reaches the sampled light itself is
                    // unoccluded by definition.
                    let hit_self = shadow_hit
                        && shadow_info.is_light
                        && shadow_info.light.map_or(false, |l| same_light(l, light));
                    if hit_self {
                        // Transmittance along the shadow leg and its pdf use
                        // the identical exponent; the ratio is written out in
                        // this form deliberately.
                        let l_transmit =
                            (-medium.sigma_t() * shadow_info.z * l_dir.norm()).exp();
                        let l_pdf = (-medium.sigma_t() * shadow_info.z * l_dir.norm()).exp();

                        light_samp = l_info.mult * (l_transmit / l_pdf);
                        let light_to_phase = HomogeneousMedium::phase_isotropic() * l_pdf;
                        light_samp *= light_to_phase;

                        let w = power_heuristic(l_info.prob, light_to_phase);
                        light_samp *= w;
                    }
                }
            }

            // Isotropic phase-function bounce.
            let cos_theta = 2.0 * rng.next_f32() - 1.0;
            let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
            let phi = 2.0 * PI * rng.next_f32();
            let dir_new = Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);

            let indirect = self.trace_path(Ray3f::new(p, dir_new), pixel, hit, rng, bounce + 1);
            let total = indirect * 0.5 + light_samp;

            return total * (transmittance / pdf * medium.sigma_s());
        } else if found {
            // Reached a surface before the medium interacted.
            let pdf = medium.transmittance(hit.z);
            let transmittance = medium.transmittance(hit.z);

            if hit.is_light {
                if bounce == 0 {
                    if let Some(light) = hit.light {
                        return light.radiance() * (transmittance / pdf);
                    }
                }
                // Indirect light hits are already accounted for by NEE.
                return RGBSpectrum::black();
            }

            return self.material_sample(&ray, pixel, hit, rng, bounce) * (transmittance / pdf);
        }

        // Escaped: primary rays see the background image, deeper bounces the
        // environment map.
        if bounce == 0 {
            return self.scene.eval_background(self.background_uvw(pixel));
        }
        self.scene.eval_environment(ray.dir)
    }

    /// Surface shading with multiple importance sampling: one BSDF sample
    /// (continued as an indirect path when the light cannot produce its
    /// direction) combined with one light sample.
    fn material_sample(
        &self,
        ray: &Ray3f,
        pixel: (usize, usize),
        hit: &HitInfo<'a>,
        rng: &mut LcgRng,
        bounce: u32,
    ) -> RGBSpectrum {
        let light = self.random_light(rng);
        let sp = ShadingPoint::from_hit(ray, hit);

        let material = match hit.node.and_then(|n| n.material()) {
            Some(m) => m,
            None => return RGBSpectrum::black(),
        };

        let mut msample = material.generate_sample(&sp, rng);
        if !msample.sampled {
            // No direction: either absorbed, or an emission value to report.
            return msample.info.mult;
        }
        if msample.info.lobe == Lobe::Specular && msample.dir.dot(&sp.gn) < 0.0 {
            // Reflection below the geometric horizon carries nothing.
            msample.info.mult = RGBSpectrum::black();
        }

        let mut mat_color = msample.info.mult / msample.info.prob;

        let mat_to_l = match light {
            Some(l) => l.sample_info(sp.p, msample.dir),
            None => DirSample::void(),
        };

        if mat_to_l.prob == 0.0 && msample.dir != Vector3f::zeros() {
            // The light could not have produced this direction: continue the
            // path as pure indirect transport.
            let mut gi_info = HitInfo::default();
            let gi = self.trace_path(Ray3f::new(sp.p, msample.dir), pixel, &mut gi_info, rng, bounce + 1);
            mat_color *= gi;
        }

        let mut light_color = RGBSpectrum::black();
        if let Some(light) = light {
            if let Some((l_dir, mut l_info)) = light.generate_sample(sp.p, rng) {
                l_info.prob /= self.lights.len() as Float;
                if l_info.prob > 0.0 {
                    let mut shadow_info = HitInfo::default();
                    let shadow_hit = self.scene.shadow_trace_ray(
                        &Ray3f::new(sp.p, l_dir),
                        &mut shadow_info,
                        HitSide::FrontAndBack,
                        1.0,
                    );
                    let hit_self = shadow_hit
                        && shadow_info.is_light
                        && shadow_info.light.map_or(false, |l| same_light(l, light));
                    if shadow_hit && !hit_self {
                        l_info.mult = RGBSpectrum::black();
                    }

                    let l_dir_unit = l_dir.normalize();
                    light_color = l_info.mult / l_info.prob;

                    let l_to_mat = material.sample_info(&sp, l_dir_unit);
                    if l_to_mat.prob > 0.0 {
                        light_color *= l_to_mat.mult;
                        light_color *= power_heuristic(l_info.prob, l_to_mat.prob);
                    } else {
                        light_color = RGBSpectrum::black();
                    }
                }
            }
        }

        let w_mat = power_heuristic(msample.info.prob, mat_to_l.prob);
        light_color + mat_color * w_mat
    }
}

/// Power heuristic with beta = 2: pdf_a^2 / (pdf_a^2 + pdf_b^2).
pub fn power_heuristic(pdf_a: Float, pdf_b: Float) -> Float {
    let a2 = pdf_a * pdf_a;
    let b2 = pdf_b * pdf_b;
    a2 / (a2 + b2)
}

/* Tests for the path integrator */
