// Copyright @yucwang 2026

use crate::core::hit::{HitInfo, HitSide};
use crate::core::object::Object;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f, TRI_BIAS};
use crate::math::ray::Ray3f;

use wavefront_obj::{obj, ParseError};

use std::fmt;
use std::fs;
use std::path::Path;

const MAX_LEAF_FACES: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct TriFace {
    pub v: [usize; 3],
    pub n: [usize; 3],
    pub t: [usize; 3],
}

#[derive(Debug)]
pub enum MeshLoadError {
    Io(std::io::Error),
    Parse(ParseError),
}

impl From<std::io::Error> for MeshLoadError {
    fn from(err: std::io::Error) -> Self {
        MeshLoadError::Io(err)
    }
}

impl From<ParseError> for MeshLoadError {
    fn from(err: ParseError) -> Self {
        MeshLoadError::Parse(err)
    }
}

impl fmt::Display for MeshLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshLoadError::Io(err) => write!(f, "io error: {}", err),
            MeshLoadError::Parse(err) => write!(f, "parse error: {}", err),
        }
    }
}

impl std::error::Error for MeshLoadError {}

struct BvhNode {
    bounds: AABB,
    left: Option<usize>,
    right: Option<usize>,
    start: usize,
    count: usize,
}

impl BvhNode {
    fn leaf(bounds: AABB, start: usize, count: usize) -> Self {
        Self { bounds, left: None, right: None, start, count }
    }

    fn interior(bounds: AABB, left: usize, right: usize) -> Self {
        Self { bounds, left: Some(left), right: Some(right), start: 0, count: 0 }
    }

    fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

/// Indexed triangle mesh with a median-split BVH over face bounds.
pub struct TriMesh {
    vertices: Vec<Vector3f>,
    normals: Vec<Vector3f>,
    tex_coords: Vec<Vector3f>,
    faces: Vec<TriFace>,
    nodes: Vec<BvhNode>,
    indices: Vec<usize>,
}

impl TriMesh {
    pub fn new(
        vertices: Vec<Vector3f>,
        normals: Vec<Vector3f>,
        tex_coords: Vec<Vector3f>,
        faces: Vec<TriFace>,
    ) -> Self {
        let mut mesh = Self {
            vertices,
            normals,
            tex_coords,
            faces,
            nodes: Vec::new(),
            indices: Vec::new(),
        };
        if mesh.normals.is_empty() {
            mesh.compute_vertex_normals();
        }
        if mesh.tex_coords.is_empty() {
            mesh.tex_coords.push(Vector3f::zeros());
        }
        mesh.build_bvh();
        mesh
    }

    pub fn from_obj_file<P: AsRef<Path>>(path: P) -> Result<Self, MeshLoadError> {
        let data = fs::read_to_string(path)?;
        Self::from_obj_str(&data)
    }

    pub fn from_obj_str(input: &str) -> Result<Self, MeshLoadError> {
        let obj_set = obj::parse(triangulate_faces(input))?;

        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut tex_coords = Vec::new();
        let mut faces = Vec::new();

        for object in &obj_set.objects {
            let v_base = vertices.len();
            let n_base = normals.len();
            let t_base = tex_coords.len();

            for v in &object.vertices {
                vertices.push(Vector3f::new(v.x as Float, v.y as Float, v.z as Float));
            }
            for n in &object.normals {
                normals.push(Vector3f::new(n.x as Float, n.y as Float, n.z as Float));
            }
            for t in &object.tex_vertices {
                tex_coords.push(Vector3f::new(t.u as Float, t.v as Float, t.w as Float));
            }

            for geometry in &object.geometry {
                for shape in &geometry.shapes {
                    if let obj::Primitive::Triangle(a, b, c) = shape.primitive {
                        let vtn = [a, b, c];
                        faces.push(TriFace {
                            v: [v_base + vtn[0].0, v_base + vtn[1].0, v_base + vtn[2].0],
                            t: [
                                vtn[0].1.map_or(0, |i| t_base + i),
                                vtn[1].1.map_or(0, |i| t_base + i),
                                vtn[2].1.map_or(0, |i| t_base + i),
                            ],
                            n: [
                                vtn[0].2.map_or(usize::MAX, |i| n_base + i),
                                vtn[1].2.map_or(usize::MAX, |i| n_base + i),
                                vtn[2].2.map_or(usize::MAX, |i| n_base + i),
                            ],
                        });
                    }
                }
            }
        }

        Ok(Self::new(vertices, normals, tex_coords, faces))
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    fn compute_vertex_normals(&mut self) {
        let mut acc = vec![Vector3f::zeros(); self.vertices.len()];
        for face in &self.faces {
            let v0 = self.vertices[face.v[0]];
            let v1 = self.vertices[face.v[1]];
            let v2 = self.vertices[face.v[2]];
            // Cross-product length carries the face area weight.
            let n = (v1 - v0).cross(&(v2 - v0));
            for &vi in &face.v {
                acc[vi] += n;
            }
        }
        self.normals = acc
            .into_iter()
            .map(|n| {
                let len = n.norm();
                if len > 0.0 {
                    n / len
                } else {
                    Vector3f::new(0.0, 0.0, 1.0)
                }
            })
            .collect();
        for face in &mut self.faces {
            face.n = face.v;
        }
    }

    fn face_bounds(&self, face_id: usize) -> AABB {
        let face = &self.faces[face_id];
        let mut bounds = AABB::default();
        for &vi in &face.v {
            bounds.expand_by_point(&self.vertices[vi]);
        }
        bounds
    }

    fn build_bvh(&mut self) {
        self.indices = (0..self.faces.len()).collect();
        if self.indices.is_empty() {
            return;
        }
        let face_bounds: Vec<AABB> = (0..self.faces.len()).map(|f| self.face_bounds(f)).collect();
        let centroids: Vec<Vector3f> = face_bounds.iter().map(|b| b.center()).collect();
        self.build_node(0, self.faces.len(), &face_bounds, &centroids);
    }

    // Median split along the widest centroid axis; faces are reordered in
    // `indices` so a leaf owns a contiguous range. `face_bounds` and
    // `centroids` are keyed by face id.
    fn build_node(
        &mut self,
        start: usize,
        end: usize,
        face_bounds: &[AABB],
        centroids: &[Vector3f],
    ) -> usize {
        let mut bounds = AABB::default();
        let mut centroid_bounds = AABB::default();
        for i in start..end {
            let face_id = self.indices[i];
            bounds.expand_by_aabb(&face_bounds[face_id]);
            centroid_bounds.expand_by_point(&centroids[face_id]);
        }

        let count = end - start;
        let axis = centroid_bounds.max_extent() as usize;
        let extent = centroid_bounds.p_max[axis] - centroid_bounds.p_min[axis];
        if count <= MAX_LEAF_FACES || extent < 1e-6 {
            let node_idx = self.nodes.len();
            self.nodes.push(BvhNode::leaf(bounds, start, count));
            return node_idx;
        }

        self.indices[start..end].sort_by(|&a, &b| {
            centroids[a][axis]
                .partial_cmp(&centroids[b][axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = start + count / 2;
        let node_idx = self.nodes.len();
        // Reserve the slot so children end up after their parent.
        self.nodes.push(BvhNode::leaf(AABB::default(), 0, 0));
        let left = self.build_node(start, mid, face_bounds, centroids);
        let right = self.build_node(mid, end, face_bounds, centroids);
        self.nodes[node_idx] = BvhNode::interior(bounds, left, right);
        node_idx
    }

    fn trace_bvh_node(
        &self,
        ray: &Ray3f,
        hit: &mut HitInfo<'_>,
        side: HitSide,
        node_id: usize,
    ) -> bool {
        let node = &self.nodes[node_id];
        let bounds = &node.bounds;

        // Slab test; zero direction components divide to +-inf, which the
        // min/max comparisons handle.
        let mut tx0 = (bounds.p_min.x - ray.p.x) / ray.dir.x;
        let mut tx1 = (bounds.p_max.x - ray.p.x) / ray.dir.x;
        let mut ty0 = (bounds.p_min.y - ray.p.y) / ray.dir.y;
        let mut ty1 = (bounds.p_max.y - ray.p.y) / ray.dir.y;
        let mut tz0 = (bounds.p_min.z - ray.p.z) / ray.dir.z;
        let mut tz1 = (bounds.p_max.z - ray.p.z) / ray.dir.z;

        if tx0 > tx1 {
            std::mem::swap(&mut tx0, &mut tx1);
        }
        if ty0 > ty1 {
            std::mem::swap(&mut ty0, &mut ty1);
        }
        if tz0 > tz1 {
            std::mem::swap(&mut tz0, &mut tz1);
        }

        if tx0.max(ty0).max(tz0) > tx1.min(ty1).min(tz1) {
            return false;
        }

        let mut found_hit = false;
        if node.is_leaf() {
            for i in 0..node.count {
                let face_id = self.indices[node.start + i];
                if self.intersect_triangle(ray, hit, side, face_id) {
                    found_hit = true;
                }
            }
        } else {
            // Both children are always tried; the HitInfo z test keeps the
            // closest hit regardless of visit order.
            if let Some(left) = node.left {
                if self.trace_bvh_node(ray, hit, side, left) {
                    found_hit = true;
                }
            }
            if let Some(right) = node.right {
                if self.trace_bvh_node(ray, hit, side, right) {
                    found_hit = true;
                }
            }
        }

        found_hit
    }

    fn intersect_triangle(
        &self,
        ray: &Ray3f,
        hit: &mut HitInfo<'_>,
        side: HitSide,
        face_id: usize,
    ) -> bool {
        let face = &self.faces[face_id];
        let v0 = self.vertices[face.v[0]];
        let v1 = self.vertices[face.v[1]];
        let v2 = self.vertices[face.v[2]];

        let n_star = (v1 - v0).cross(&(v2 - v0));

        let cos_theta = n_star.dot(&ray.dir);
        if cos_theta.abs() < TRI_BIAS {
            // Effectively parallel to the triangle plane.
            return false;
        }
        if cos_theta > TRI_BIAS && side == HitSide::Front {
            return false;
        }

        let t = (v0.dot(&n_star) - ray.p.dot(&n_star)) / cos_theta;
        if t <= TRI_BIAS {
            return false;
        }
        if t >= hit.z {
            return false;
        }

        let x = ray.p + ray.dir * t;

        // Collapse to 2D on the plane orthogonal to the dominant normal axis.
        let (v0_2d, v1_2d, v2_2d, x_2d) =
            if n_star.x.abs() >= n_star.y.abs() && n_star.x.abs() >= n_star.z.abs() {
                (
                    Vector2f::new(v0.y, v0.z),
                    Vector2f::new(v1.y, v1.z),
                    Vector2f::new(v2.y, v2.z),
                    Vector2f::new(x.y, x.z),
                )
            } else if n_star.y.abs() >= n_star.x.abs() && n_star.y.abs() >= n_star.z.abs() {
                (
                    Vector2f::new(v0.x, v0.z),
                    Vector2f::new(v1.x, v1.z),
                    Vector2f::new(v2.x, v2.z),
                    Vector2f::new(x.x, x.z),
                )
            } else {
                (
                    Vector2f::new(v0.x, v0.y),
                    Vector2f::new(v1.x, v1.y),
                    Vector2f::new(v2.x, v2.y),
                    Vector2f::new(x.x, x.y),
                )
            };

        let area0 = cross_2d(v1_2d - v0_2d, x_2d - v0_2d);
        let area1 = cross_2d(v2_2d - v1_2d, x_2d - v1_2d);
        let area2 = cross_2d(v0_2d - v2_2d, x_2d - v2_2d);

        // Inside only when all signed sub-areas agree.
        if !(((area0 >= 0.0) == (area1 >= 0.0)) && ((area1 >= 0.0) == (area2 >= 0.0))) {
            return false;
        }

        let area_total = cross_2d(v1_2d - v0_2d, v2_2d - v0_2d);
        let b0 = (area1 / area_total).abs();
        let b1 = (area2 / area_total).abs();
        let b2 = (area0 / area_total).abs();

        hit.z = t;
        hit.front = cos_theta <= -TRI_BIAS;
        hit.p = x;
        hit.n = self.shading_normal(face, n_star, b0, b1, b2);
        hit.gn = n_star.normalize();
        hit.uvw = self.tex_coord(face, b0, b1, b2);
        true
    }

    fn shading_normal(&self, face: &TriFace, n_star: Vector3f, b0: Float, b1: Float, b2: Float) -> Vector3f {
        if face.n[0] == usize::MAX {
            return n_star;
        }
        self.normals[face.n[0]] * b0 + self.normals[face.n[1]] * b1 + self.normals[face.n[2]] * b2
    }

    fn tex_coord(&self, face: &TriFace, b0: Float, b1: Float, b2: Float) -> Vector3f {
        self.tex_coords[face.t[0]] * b0
            + self.tex_coords[face.t[1]] * b1
            + self.tex_coords[face.t[2]] * b2
    }
}

impl Object for TriMesh {
    fn intersect_ray(&self, ray: &Ray3f, hit: &mut HitInfo<'_>, side: HitSide) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.trace_bvh_node(ray, hit, side, 0)
    }
}

fn cross_2d(a: Vector2f, b: Vector2f) -> Float {
    a.x * b.y - a.y * b.x
}

// Fan-triangulate polygonal f records so the parser only sees triangles.
fn triangulate_faces(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for line in input.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("f ") || trimmed.starts_with("f\t") {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() > 4 {
                let base = parts[1];
                for i in 2..(parts.len() - 1) {
                    out.push_str("f ");
                    out.push_str(base);
                    out.push(' ');
                    out.push_str(parts[i]);
                    out.push(' ');
                    out.push_str(parts[i + 1]);
                    out.push('\n');
                }
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/* Tests for TriMesh */

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_mesh() -> TriMesh {
        // Unit quad in the z = 0 plane, two triangles, facing +z.
        TriMesh::from_obj_str(
            "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1 2/2 3/3 4/4
",
        )
        .expect("failed to parse obj")
    }

    #[test]
    fn test_quad_parses_into_two_triangles() {
        let mesh = quad_mesh();
        assert_eq!(mesh.num_faces(), 2);
    }

    #[test]
    fn test_ray_hits_front_face_with_uv() {
        let mesh = quad_mesh();
        let ray = Ray3f::new(Vector3f::new(0.25, 0.25, 2.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(mesh.intersect_ray(&ray, &mut hit, HitSide::FrontAndBack));
        assert!((hit.z - 2.0).abs() < 1e-4);
        assert!(hit.front);
        assert!((hit.gn - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-4);
        // Interpolated texture coordinates follow the hit point.
        assert!((hit.uvw.x - 0.25).abs() < 1e-4);
        assert!((hit.uvw.y - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_back_face_filtered_by_side() {
        let mesh = quad_mesh();
        let ray = Ray3f::new(Vector3f::new(0.5, 0.5, -2.0), Vector3f::new(0.0, 0.0, 1.0));

        let mut hit = HitInfo::default();
        assert!(!mesh.intersect_ray(&ray, &mut hit, HitSide::Front));

        let mut hit = HitInfo::default();
        assert!(mesh.intersect_ray(&ray, &mut hit, HitSide::FrontAndBack));
        assert!(!hit.front);
    }

    #[test]
    fn test_miss_outside_quad() {
        let mesh = quad_mesh();
        let ray = Ray3f::new(Vector3f::new(2.0, 2.0, 2.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(!mesh.intersect_ray(&ray, &mut hit, HitSide::FrontAndBack));
    }

    #[test]
    fn test_closest_face_wins_across_bvh_leaves() {
        // A column of quads at z = 0, -1, .., -7; enough faces to split.
        let mut src = String::new();
        for k in 0..8 {
            let z = -(k as f32);
            let b = 4 * k + 1;
            src.push_str(&format!(
                "v 0 0 {z}\nv 1 0 {z}\nv 1 1 {z}\nv 0 1 {z}\nf {} {} {} {}\n",
                b,
                b + 1,
                b + 2,
                b + 3,
                z = z
            ));
        }
        let mesh = TriMesh::from_obj_str(&src).expect("failed to parse obj");
        assert_eq!(mesh.num_faces(), 16);

        let ray = Ray3f::new(Vector3f::new(0.5, 0.25, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(mesh.intersect_ray(&ray, &mut hit, HitSide::FrontAndBack));
        assert!((hit.z - 5.0).abs() < 1e-4);
        assert!((hit.p.z - 0.0).abs() < 1e-4);
    }

    #[test]
    fn test_missing_normals_fall_back_to_smooth_normals() {
        let mesh = quad_mesh();
        let ray = Ray3f::new(Vector3f::new(0.5, 0.25, 2.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(mesh.intersect_ray(&ray, &mut hit, HitSide::FrontAndBack));
        assert!(hit.n.normalize().dot(&Vector3f::new(0.0, 0.0, 1.0)) > 0.99);
    }
}
