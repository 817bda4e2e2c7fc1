// Copyright @yucwang 2026

use crate::core::hit::{HitInfo, HitSide};
use crate::core::light::Light;
use crate::core::node::Node;
use crate::core::texture::Texture;
use crate::math::constants::{Float, Vector3f, PI};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::media::homogeneous::HomogeneousMedium;
use crate::textures::constant::ConstantTexture;
use std::sync::Arc;

/// Camera description as loaded from the scene file.
#[derive(Debug, Clone)]
pub struct Camera {
    pub pos: Vector3f,
    pub dir: Vector3f,
    pub up: Vector3f,
    /// Vertical field of view, degrees.
    pub fov: Float,
    pub focal_dist: Float,
    /// Lens-disk radius for depth of field; 0 is a pinhole.
    pub dof: Float,
    pub srgb: bool,
    pub img_width: usize,
    pub img_height: usize,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pos: Vector3f::zeros(),
            dir: Vector3f::new(0.0, 0.0, -1.0),
            up: Vector3f::new(0.0, 1.0, 0.0),
            fov: 40.0,
            focal_dist: 1.0,
            dof: 0.0,
            srgb: false,
            img_width: 800,
            img_height: 600,
        }
    }
}

/// Everything the tracer consumes: camera, transformed object hierarchy,
/// lights, background and environment textures, and the global medium.
pub struct Scene {
    camera: Camera,
    root: Node,
    lights: Vec<Box<dyn Light>>,
    background: Arc<dyn Texture>,
    environment: Arc<dyn Texture>,
    medium: HomogeneousMedium,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("camera", &self.camera)
            .field("lights", &self.lights.len())
            .field("medium", &self.medium)
            .finish()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            camera: Camera::default(),
            root: Node::new(),
            lights: Vec::new(),
            background: Arc::new(ConstantTexture::new(RGBSpectrum::black())),
            environment: Arc::new(ConstantTexture::new(RGBSpectrum::black())),
            medium: HomogeneousMedium::default(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn set_root(&mut self, root: Node) {
        self.root = root;
    }

    pub fn lights(&self) -> &[Box<dyn Light>] {
        &self.lights
    }

    pub fn add_light(&mut self, light: Box<dyn Light>) {
        self.lights.push(light);
    }

    pub fn medium(&self) -> &HomogeneousMedium {
        &self.medium
    }

    pub fn set_medium(&mut self, medium: HomogeneousMedium) {
        self.medium = medium;
    }

    pub fn set_background(&mut self, background: Arc<dyn Texture>) {
        self.background = background;
    }

    pub fn set_environment(&mut self, environment: Arc<dyn Texture>) {
        self.environment = environment;
    }

    /// Background texture lookup at pixel uv coordinates, for primary rays
    /// that leave the scene.
    pub fn eval_background(&self, uvw: Vector3f) -> RGBSpectrum {
        self.background.eval(uvw)
    }

    /// Environment map lookup along a world direction (lat-long mapping).
    pub fn eval_environment(&self, dir: Vector3f) -> RGBSpectrum {
        let len = dir.norm();
        if len <= 0.0 {
            return RGBSpectrum::black();
        }
        let d = dir / len;

        let inv_two_pi = 1.0 / (2.0 * PI);
        let raw_u = d.x.atan2(-d.z) * inv_two_pi;
        let u = raw_u - raw_u.floor();
        let v = d.y.clamp(-1.0, 1.0).acos() * (1.0 / PI);
        self.environment.eval(Vector3f::new(u, 1.0 - v, 0.5))
    }

    /// Closest hit over the object hierarchy and the renderable lights.
    pub fn trace_ray<'a>(&'a self, ray: &Ray3f, hit: &mut HitInfo<'a>, side: HitSide) -> bool {
        let hit_obj = self.root.search_tree(ray, hit, side);

        let mut hit_light = false;
        for light in &self.lights {
            if !light.is_renderable() {
                continue;
            }
            if light.intersect_ray(ray, hit, side) {
                hit_light = true;
                hit.node = None;
                hit.is_light = true;
                hit.light = Some(light.as_ref());
            }
        }

        hit_obj || hit_light
    }

    /// Shadow query: true when anything lies closer than `t_max` along the
    /// ray. Lights are still tested afterwards so the caller can recognize
    /// a shadow ray that reached the very light it sampled.
    pub fn shadow_trace_ray<'a>(
        &'a self,
        ray: &Ray3f,
        hit: &mut HitInfo<'a>,
        side: HitSide,
        t_max: Float,
    ) -> bool {
        let hit_obj = self.root.shadow_search(ray, hit, t_max);

        let mut hit_light = false;
        for light in &self.lights {
            if !light.is_renderable() {
                continue;
            }
            if light.intersect_ray(ray, hit, side) {
                hit_light = true;
                hit.node = None;
                hit.is_light = true;
                hit.light = Some(light.as_ref());
            }
        }

        hit_obj || hit_light
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hit::HitInfo;
    use crate::math::transform::Transform;
    use crate::math::constants::Matrix4f;
    use crate::shapes::sphere::Sphere;

    fn sphere_node(translate: Vector3f, scale: Float) -> Node {
        let m = Matrix4f::new_translation(&translate) * Matrix4f::new_scaling(scale);
        Node::new()
            .with_transform(Transform::new(m))
            .with_object(Box::new(Sphere))
    }

    #[test]
    fn test_trace_ray_finds_closest_of_two_spheres() {
        let mut scene = Scene::new();
        scene.root_mut().add_child(sphere_node(Vector3f::new(0.0, 0.0, -5.0), 1.0));
        scene.root_mut().add_child(sphere_node(Vector3f::new(0.0, 0.0, -10.0), 1.0));

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(scene.trace_ray(&ray, &mut hit, HitSide::FrontAndBack));
        assert!((hit.z - 4.0).abs() < 1e-3);
        assert!((hit.p - Vector3f::new(0.0, 0.0, -4.0)).norm() < 1e-3);
    }

    #[test]
    fn test_transform_reciprocity_through_node() {
        // A sphere scaled by 2 and translated: the world-frame hit point
        // must be on the transformed surface regardless of the local frame.
        let mut scene = Scene::new();
        scene.root_mut().add_child(sphere_node(Vector3f::new(3.0, 0.0, -8.0), 2.0));

        let ray = Ray3f::new(Vector3f::new(3.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(scene.trace_ray(&ray, &mut hit, HitSide::FrontAndBack));
        assert!((hit.z - 6.0).abs() < 1e-3);
        assert!((hit.p - Vector3f::new(3.0, 0.0, -6.0)).norm() < 1e-3);
        // Normal lifted to the world frame points back at the ray origin.
        assert!(hit.n.normalize().dot(&Vector3f::new(0.0, 0.0, 1.0)) > 0.99);
    }

    #[test]
    fn test_shadow_search_short_circuits_at_t_max() {
        let mut scene = Scene::new();
        scene.root_mut().add_child(sphere_node(Vector3f::new(0.0, 0.0, -5.0), 1.0));

        // Destination convention: dir spans origin to (0,0,-20), so the
        // sphere at t = 4/20 = 0.2 blocks the segment.
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -20.0));
        let mut hit = HitInfo::default();
        assert!(scene.shadow_trace_ray(&ray, &mut hit, HitSide::FrontAndBack, 1.0));

        // A segment that ends before the sphere is unobstructed.
        let short = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -2.0));
        let mut hit = HitInfo::default();
        assert!(!scene.shadow_trace_ray(&short, &mut hit, HitSide::FrontAndBack, 1.0));
    }

    #[test]
    fn test_environment_black_by_default() {
        let scene = Scene::new();
        assert!(scene.eval_environment(Vector3f::new(0.3, 0.5, -1.0)).is_black());
        assert!(scene.eval_background(Vector3f::new(0.5, 0.5, 0.5)).is_black());
    }
}
