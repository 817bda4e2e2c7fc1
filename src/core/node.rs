// Copyright @yucwang 2026

use crate::core::hit::{HitInfo, HitSide};
use crate::core::material::Material;
use crate::core::object::Object;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;
use std::sync::Arc;

/// A scene-graph node: an affine transform to the parent frame, optional
/// geometry, optional material, and exclusively owned children. Rays are
/// pushed down into local coordinates and hits lifted back up, so the
/// transform chain composes along the path without a matrix stack.
pub struct Node {
    transform: Transform,
    object: Option<Box<dyn Object>>,
    material: Option<Arc<dyn Material>>,
    children: Vec<Node>,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    pub fn new() -> Self {
        Self {
            transform: Transform::default(),
            object: None,
            material: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_object(mut self, object: Box<dyn Object>) -> Self {
        self.object = Some(object);
        self
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn object(&self) -> Option<&dyn Object> {
        self.object.as_deref()
    }

    pub fn material(&self) -> Option<&dyn Material> {
        self.material.as_deref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Transform a parent-frame ray into this node's local frame. The
    /// direction is not renormalized, so t values carry across frames.
    pub fn to_node_coords(&self, ray: &Ray3f) -> Ray3f {
        self.transform.inv_apply_ray(ray)
    }

    /// Lift a local-frame hit into the parent frame. Normals are left
    /// unnormalized here; they get normalized once shading begins.
    pub fn from_node_coords(&self, hit: &mut HitInfo<'_>) {
        hit.p = self.transform.apply_point(hit.p);
        hit.n = self.transform.apply_normal(hit.n);
        hit.gn = self.transform.apply_normal(hit.gn);
    }

    /// Closest-hit search over this node and its subtree. Children are
    /// intersected with the local ray (transforms stack down the path);
    /// if anything below hit, the record is lifted into this node's parent
    /// frame before returning.
    pub fn search_tree<'a>(&'a self, ray: &Ray3f, hit: &mut HitInfo<'a>, side: HitSide) -> bool {
        let local_ray = self.to_node_coords(ray);
        let mut desc_hit = false;

        if let Some(obj) = self.object.as_deref() {
            if obj.intersect_ray(&local_ray, hit, side) {
                hit.node = Some(self);
                desc_hit = true;
            }
        }

        for child in &self.children {
            if child.search_tree(&local_ray, hit, side) {
                desc_hit = true;
            }
        }

        if desc_hit {
            self.from_node_coords(hit);
        }
        desc_hit
    }

    /// Any-hit search for shadow rays: stop at the first intersection
    /// closer than `t_max`. No lift is needed since only a boolean (and the
    /// frame-invariant t) is consumed.
    pub fn shadow_search(&self, ray: &Ray3f, hit: &mut HitInfo<'_>, t_max: Float) -> bool {
        let local_ray = self.to_node_coords(ray);

        if let Some(obj) = self.object.as_deref() {
            if obj.intersect_ray(&local_ray, hit, HitSide::FrontAndBack) && hit.z < t_max {
                return true;
            }
        }

        for child in &self.children {
            if child.shadow_search(&local_ray, hit, t_max) {
                return true;
            }
        }

        false
    }
}
