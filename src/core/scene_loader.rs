// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::light::Light;
use crate::core::material::Material;
use crate::core::object::Object;
use crate::core::scene::{Camera, Scene};
use crate::core::texture::Texture;
use crate::lights::point::PointLight;
use crate::lights::spot::SpotLight;
use crate::materials::blinn::MtlBlinn;
use crate::materials::microfacet::MtlMicrofacet;
use crate::materials::phong::MtlPhong;
use crate::math::constants::{Float, Matrix4f, Vector3f, PI};
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;
use crate::media::homogeneous::HomogeneousMedium;
use crate::shapes::plane::Plane;
use crate::shapes::sphere::Sphere;
use crate::shapes::trimesh::TriMesh;
use crate::textures::constant::ConstantTexture;
use crate::textures::image::ImageTexture;

use nalgebra as na;
use std::sync::Arc;

#[derive(Debug)]
pub enum SceneLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
}

impl From<std::io::Error> for SceneLoadError {
    fn from(err: std::io::Error) -> Self {
        SceneLoadError::Io(err)
    }
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io(err) => write!(f, "io error: {}", err),
            SceneLoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            SceneLoadError::MissingField(field) => write!(f, "missing field: {}", field),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// Color/texture channel as written in the file: a scalar `value`, an
/// r/g/b triple, or a `texture` file reference.
#[derive(Debug, Default, Clone)]
struct ChannelSpec {
    color: Option<RGBSpectrum>,
    texture: Option<String>,
}

#[derive(Debug, Clone)]
enum ObjKind {
    Sphere,
    Plane,
    Mesh(String),
}

/// Parsed object element; becomes a scene-graph `Node` once the material
/// table is complete (materials may be declared after their first use).
struct NodeSpec {
    kind: Option<ObjKind>,
    material_name: Option<String>,
    matrix: Matrix4f,
    children: Vec<NodeSpec>,
}

impl NodeSpec {
    fn new(kind: Option<ObjKind>, material_name: Option<String>) -> Self {
        Self {
            kind,
            material_name,
            matrix: Matrix4f::identity(),
            children: Vec::new(),
        }
    }
}

struct MtlState {
    mtl_type: String,
    name: String,
    diffuse: Option<ChannelSpec>,
    specular: Option<ChannelSpec>,
    refraction: Option<ChannelSpec>,
    emission: Option<ChannelSpec>,
    glossiness: Option<Float>,
    roughness: Option<Float>,
    ior: Option<Float>,
}

impl MtlState {
    fn new(mtl_type: String, name: String) -> Self {
        Self {
            mtl_type,
            name,
            diffuse: None,
            specular: None,
            refraction: None,
            emission: None,
            glossiness: None,
            roughness: None,
            ior: None,
        }
    }
}

struct LightState {
    light_type: String,
    position: Vector3f,
    intensity: RGBSpectrum,
    size: Float,
    direction: Vector3f,
    angle_deg: Float,
}

impl LightState {
    fn new(light_type: String) -> Self {
        Self {
            light_type,
            position: Vector3f::zeros(),
            intensity: RGBSpectrum::gray(1.0),
            size: 0.0,
            direction: Vector3f::new(0.0, 0.0, -1.0),
            angle_deg: 45.0,
        }
    }
}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneLoadError> {
    let path = path.as_ref();
    log::info!("loading scene: {}", path.display());
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_scene(&xml, base_dir)
}

fn parse_scene(xml: &str, base_dir: &Path) -> Result<Scene, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut in_scene = false;
    let mut in_camera = false;

    let mut object_stack: Vec<NodeSpec> = Vec::new();
    let mut root_specs: Vec<NodeSpec> = Vec::new();
    let mut material_states: Vec<MtlState> = Vec::new();
    let mut current_material: Option<MtlState> = None;
    let mut current_light: Option<LightState> = None;
    let mut lights: Vec<Box<dyn Light>> = Vec::new();

    let mut background: Option<ChannelSpec> = None;
    let mut environment: Option<ChannelSpec> = None;
    let mut medium: Option<HomogeneousMedium> = None;

    let mut camera = Camera::default();
    let mut cam_target: Option<Vector3f> = None;

    loop {
        let (e, is_empty) = match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => (e, false),
            Ok(Event::Empty(e)) => (e, true),
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"scene" => in_scene = false,
                    b"camera" => in_camera = false,
                    b"material" => {
                        if let Some(state) = current_material.take() {
                            material_states.push(state);
                        }
                    }
                    b"object" => finalize_object(&mut object_stack, &mut root_specs),
                    b"light" => {
                        if let Some(state) = current_light.take() {
                            lights.push(build_light(state)?);
                        }
                    }
                    _ => {}
                }
                buf.clear();
                continue;
            }
            Ok(_) => {
                buf.clear();
                continue;
            }
            Err(err) => {
                return Err(SceneLoadError::Parse(format!("xml error: {}", err)));
            }
        };

        let map = attribute_map(&e);
        match e.name().as_ref() {
            b"xml" => {}
            b"scene" => {
                in_scene = true;
            }
            b"camera" => {
                in_camera = true;
            }
            b"position" if in_camera => {
                camera.pos = attr_vec3(&map)?;
            }
            b"target" if in_camera => {
                cam_target = Some(attr_vec3(&map)?);
            }
            b"direction" if in_camera => {
                camera.dir = attr_vec3(&map)?;
            }
            b"up" if in_camera => {
                camera.up = attr_vec3(&map)?;
            }
            b"fov" if in_camera => {
                camera.fov = attr_value(&map, "fov")?;
            }
            b"focaldist" if in_camera => {
                camera.focal_dist = attr_value(&map, "focaldist")?;
            }
            b"dof" if in_camera => {
                camera.dof = attr_value(&map, "dof")?;
            }
            b"width" if in_camera => {
                camera.img_width = attr_value(&map, "width")? as usize;
            }
            b"height" if in_camera => {
                camera.img_height = attr_value(&map, "height")? as usize;
            }
            b"srgb" if in_camera => {
                camera.srgb = parse_bool(map.get("value").map(String::as_str).unwrap_or("false"))?;
            }
            b"background" if in_scene => {
                background = Some(channel_spec(&map));
            }
            b"environment" if in_scene => {
                environment = Some(channel_spec(&map));
            }
            b"medium" if in_scene => {
                let sigma_a = attr_float(&map, "absorption", 0.15)?;
                let sigma_s = attr_float(&map, "scattering", 0.06)?;
                medium = Some(HomogeneousMedium::new(sigma_a, sigma_s));
            }
            b"material" if in_scene => {
                let mtl_type = map
                    .get("type")
                    .cloned()
                    .ok_or(SceneLoadError::MissingField("material type"))?;
                let name = map
                    .get("name")
                    .cloned()
                    .ok_or(SceneLoadError::MissingField("material name"))?;
                current_material = Some(MtlState::new(mtl_type, name));
            }
            b"diffuse" | b"albedo" if current_material.is_some() => {
                if let Some(state) = current_material.as_mut() {
                    state.diffuse = Some(channel_spec(&map));
                }
            }
            b"specular" if current_material.is_some() => {
                if let Some(state) = current_material.as_mut() {
                    state.specular = Some(channel_spec(&map));
                }
            }
            b"refraction" if current_material.is_some() => {
                if let Some(state) = current_material.as_mut() {
                    state.refraction = Some(channel_spec(&map));
                    if let Some(index) = map.get("index") {
                        state.ior = Some(parse_float(index)?);
                    }
                }
            }
            b"emission" if current_material.is_some() => {
                if let Some(state) = current_material.as_mut() {
                    state.emission = Some(channel_spec(&map));
                }
            }
            b"glossiness" if current_material.is_some() => {
                if let Some(state) = current_material.as_mut() {
                    state.glossiness = Some(attr_value(&map, "glossiness")?);
                }
            }
            b"roughness" if current_material.is_some() => {
                if let Some(state) = current_material.as_mut() {
                    state.roughness = Some(attr_value(&map, "roughness")?);
                }
            }
            b"ior" if current_material.is_some() => {
                if let Some(state) = current_material.as_mut() {
                    state.ior = Some(attr_value(&map, "ior")?);
                }
            }
            b"object" if in_scene => {
                let kind = match map.get("type").map(String::as_str) {
                    Some("sphere") => Some(ObjKind::Sphere),
                    Some("plane") => Some(ObjKind::Plane),
                    Some("obj") => {
                        let path = map
                            .get("path")
                            .or_else(|| map.get("name"))
                            .cloned()
                            .ok_or(SceneLoadError::MissingField("obj path"))?;
                        Some(ObjKind::Mesh(path))
                    }
                    Some(other) => {
                        return Err(SceneLoadError::Parse(format!(
                            "unsupported object type: {}",
                            other
                        )))
                    }
                    // A bare grouping node carrying only a transform.
                    None => None,
                };
                object_stack.push(NodeSpec::new(kind, map.get("material").cloned()));
            }
            b"scale" if !object_stack.is_empty() => {
                let m = if let Some(value) = map.get("value") {
                    Matrix4f::new_scaling(parse_float(value)?)
                } else {
                    let s = attr_vec3_default(&map, 1.0)?;
                    Matrix4f::new_nonuniform_scaling(&s)
                };
                apply_transform(&mut object_stack, m);
            }
            b"rotate" if !object_stack.is_empty() => {
                let angle = attr_float(&map, "angle", 0.0)? * PI / 180.0;
                let axis = attr_vec3(&map)?;
                if axis.norm() > 0.0 {
                    let m = na::Rotation3::from_axis_angle(
                        &na::Unit::new_normalize(axis),
                        angle,
                    )
                    .to_homogeneous();
                    apply_transform(&mut object_stack, m);
                }
            }
            b"translate" if !object_stack.is_empty() => {
                let m = Matrix4f::new_translation(&attr_vec3(&map)?);
                apply_transform(&mut object_stack, m);
            }
            b"light" if in_scene => {
                let light_type = map
                    .get("type")
                    .cloned()
                    .ok_or(SceneLoadError::MissingField("light type"))?;
                current_light = Some(LightState::new(light_type));
            }
            b"position" if current_light.is_some() => {
                if let Some(state) = current_light.as_mut() {
                    state.position = attr_vec3(&map)?;
                }
            }
            b"direction" if current_light.is_some() => {
                if let Some(state) = current_light.as_mut() {
                    state.direction = attr_vec3(&map)?;
                }
            }
            b"intensity" if current_light.is_some() => {
                if let Some(state) = current_light.as_mut() {
                    state.intensity =
                        channel_spec(&map).color.unwrap_or(RGBSpectrum::gray(1.0));
                }
            }
            b"size" if current_light.is_some() => {
                if let Some(state) = current_light.as_mut() {
                    state.size = attr_value(&map, "size")?;
                }
            }
            b"angle" if current_light.is_some() => {
                if let Some(state) = current_light.as_mut() {
                    state.angle_deg = attr_value(&map, "angle")?;
                }
            }
            other => {
                log::warn!(
                    "skipping unknown scene element: {}",
                    String::from_utf8_lossy(other)
                );
            }
        }

        // Self-closing containers never produce an End event, so
        // close them here.
        if is_empty {
            match e.name().as_ref() {
                b"material" => {
                    if let Some(state) = current_material.take() {
                        material_states.push(state);
                    }
                }
                b"object" => finalize_object(&mut object_stack, &mut root_specs),
                b"light" => {
                    if let Some(state) = current_light.take() {
                        lights.push(build_light(state)?);
                    }
                }
                _ => {}
            }
        }
        buf.clear();
    }

    // Materials can be declared anywhere in the file, so objects resolve
    // their references only now.
    let mut materials: HashMap<String, Arc<dyn Material>> = HashMap::new();
    for state in material_states {
        let name = state.name.clone();
        let material = build_material(state, base_dir)?;
        materials.insert(name, material);
    }

    let mut scene = Scene::new();

    if let Some(target) = cam_target {
        let dir = target - camera.pos;
        if dir.norm() > 0.0 {
            camera.dir = dir.normalize();
        }
    }
    scene.set_camera(camera);

    for spec in root_specs {
        let node = build_node(spec, &materials, base_dir)?;
        scene.root_mut().add_child(node);
    }

    for light in lights {
        scene.add_light(light);
    }

    if let Some(medium) = medium {
        scene.set_medium(medium);
    }

    if let Some(spec) = background {
        scene.set_background(channel_texture(spec, base_dir, RGBSpectrum::black())?);
    }
    if let Some(spec) = environment {
        scene.set_environment(channel_texture(spec, base_dir, RGBSpectrum::black())?);
    }

    Ok(scene)
}

fn attribute_map(e: &BytesStart<'_>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().unwrap_or_default().to_string();
        map.insert(key, value);
    }
    map
}

fn parse_float(value: &str) -> Result<Float, SceneLoadError> {
    value
        .trim()
        .parse::<Float>()
        .map_err(|_| SceneLoadError::Parse(format!("invalid number: {}", value)))
}

fn parse_bool(value: &str) -> Result<bool, SceneLoadError> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(SceneLoadError::Parse(format!("invalid bool: {}", other))),
    }
}

/// The element's `value` attribute, required.
fn attr_value(map: &HashMap<String, String>, field: &'static str) -> Result<Float, SceneLoadError> {
    let raw = map.get("value").ok_or(SceneLoadError::MissingField(field))?;
    parse_float(raw)
}

fn attr_float(
    map: &HashMap<String, String>,
    key: &str,
    default: Float,
) -> Result<Float, SceneLoadError> {
    match map.get(key) {
        Some(raw) => parse_float(raw),
        None => Ok(default),
    }
}

fn attr_vec3(map: &HashMap<String, String>) -> Result<Vector3f, SceneLoadError> {
    attr_vec3_default(map, 0.0)
}

fn attr_vec3_default(
    map: &HashMap<String, String>,
    default: Float,
) -> Result<Vector3f, SceneLoadError> {
    Ok(Vector3f::new(
        attr_float(map, "x", default)?,
        attr_float(map, "y", default)?,
        attr_float(map, "z", default)?,
    ))
}

fn channel_spec(map: &HashMap<String, String>) -> ChannelSpec {
    let mut spec = ChannelSpec::default();
    if let Some(texture) = map.get("texture") {
        spec.texture = Some(texture.clone());
    }
    if let Some(value) = map.get("value").and_then(|v| v.trim().parse::<Float>().ok()) {
        spec.color = Some(RGBSpectrum::gray(value));
    } else if map.contains_key("r") || map.contains_key("g") || map.contains_key("b") {
        let r = map.get("r").and_then(|v| v.trim().parse::<Float>().ok()).unwrap_or(0.0);
        let g = map.get("g").and_then(|v| v.trim().parse::<Float>().ok()).unwrap_or(0.0);
        let b = map.get("b").and_then(|v| v.trim().parse::<Float>().ok()).unwrap_or(0.0);
        spec.color = Some(RGBSpectrum::new(r, g, b));
    }
    spec
}

fn channel_texture(
    spec: ChannelSpec,
    base_dir: &Path,
    default: RGBSpectrum,
) -> Result<Arc<dyn Texture>, SceneLoadError> {
    if let Some(file) = spec.texture {
        let full = base_dir.join(&file);
        let tex = ImageTexture::from_file(&full.to_string_lossy())
            .map_err(SceneLoadError::Parse)?;
        return Ok(Arc::new(tex));
    }
    Ok(Arc::new(ConstantTexture::new(spec.color.unwrap_or(default))))
}

fn opt_channel_texture(
    spec: Option<ChannelSpec>,
    base_dir: &Path,
    default: RGBSpectrum,
) -> Result<Option<Arc<dyn Texture>>, SceneLoadError> {
    match spec {
        Some(spec) => channel_texture(spec, base_dir, default).map(Some),
        None => Ok(None),
    }
}

fn apply_transform(stack: &mut [NodeSpec], op: Matrix4f) {
    if let Some(top) = stack.last_mut() {
        // Ops listed first apply first: translate * rotate * scale.
        top.matrix = op * top.matrix;
    }
}

fn finalize_object(stack: &mut Vec<NodeSpec>, roots: &mut Vec<NodeSpec>) {
    if let Some(spec) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(spec);
        } else {
            roots.push(spec);
        }
    }
}

fn build_light(state: LightState) -> Result<Box<dyn Light>, SceneLoadError> {
    match state.light_type.as_str() {
        "point" => Ok(Box::new(PointLight::new(
            state.position,
            state.intensity,
            state.size,
        ))),
        "spot" => Ok(Box::new(SpotLight::new(
            state.position,
            state.intensity,
            state.size,
            state.direction,
            state.angle_deg * PI / 180.0,
        ))),
        other => Err(SceneLoadError::Parse(format!(
            "unsupported light type: {}",
            other
        ))),
    }
}

fn build_material(state: MtlState, base_dir: &Path) -> Result<Arc<dyn Material>, SceneLoadError> {
    match state.mtl_type.as_str() {
        "blinn" => {
            let mut mtl = MtlBlinn::new();
            if let Some(tex) = opt_channel_texture(state.diffuse, base_dir, RGBSpectrum::black())? {
                mtl = mtl.with_diffuse(tex);
            }
            if let Some(tex) = opt_channel_texture(state.specular, base_dir, RGBSpectrum::black())? {
                mtl = mtl.with_specular(tex);
            }
            if let Some(tex) =
                opt_channel_texture(state.refraction, base_dir, RGBSpectrum::black())?
            {
                mtl = mtl.with_refraction(tex);
            }
            if let Some(tex) = opt_channel_texture(state.emission, base_dir, RGBSpectrum::black())? {
                mtl = mtl.with_emission(tex);
            }
            if let Some(gloss) = state.glossiness {
                mtl = mtl.with_glossiness(Arc::new(ConstantTexture::new(RGBSpectrum::gray(gloss))));
            }
            if let Some(ior) = state.ior {
                mtl = mtl.with_ior(ior);
            }
            Ok(Arc::new(mtl))
        }
        "phong" => {
            let mut mtl = MtlPhong::new();
            if let Some(tex) = opt_channel_texture(state.diffuse, base_dir, RGBSpectrum::black())? {
                mtl = mtl.with_diffuse(tex);
            }
            if let Some(tex) = opt_channel_texture(state.specular, base_dir, RGBSpectrum::black())? {
                mtl = mtl.with_specular(tex);
            }
            if let Some(gloss) = state.glossiness {
                mtl = mtl.with_glossiness(Arc::new(ConstantTexture::new(RGBSpectrum::gray(gloss))));
            }
            Ok(Arc::new(mtl))
        }
        "microfacet" => {
            let mut mtl = MtlMicrofacet::new();
            if let Some(tex) = opt_channel_texture(state.diffuse, base_dir, RGBSpectrum::black())? {
                mtl = mtl.with_albedo(tex);
            }
            if let Some(roughness) = state.roughness {
                mtl = mtl.with_roughness(roughness);
            }
            if let Some(ior) = state.ior {
                mtl = mtl.with_ior(ior);
            }
            Ok(Arc::new(mtl))
        }
        other => Err(SceneLoadError::Parse(format!(
            "unsupported material type: {}",
            other
        ))),
    }
}

fn build_node(
    spec: NodeSpec,
    materials: &HashMap<String, Arc<dyn Material>>,
    base_dir: &Path,
) -> Result<crate::core::node::Node, SceneLoadError> {
    let mut node = crate::core::node::Node::new().with_transform(Transform::new(spec.matrix));

    if let Some(kind) = spec.kind {
        let object: Box<dyn Object> = match kind {
            ObjKind::Sphere => Box::new(Sphere),
            ObjKind::Plane => Box::new(Plane),
            ObjKind::Mesh(path) => {
                let full = base_dir.join(&path);
                let mesh = TriMesh::from_obj_file(&full).map_err(|e| {
                    SceneLoadError::Parse(format!("failed to load mesh {}: {}", path, e))
                })?;
                Box::new(mesh)
            }
        };
        node = node.with_object(object);
    }

    if let Some(name) = spec.material_name {
        let material = materials
            .get(&name)
            .ok_or_else(|| SceneLoadError::Parse(format!("unknown material: {}", name)))?;
        node = node.with_material(Arc::clone(material));
    }

    for child in spec.children {
        node.add_child(build_node(child, materials, base_dir)?);
    }

    Ok(node)
}

/* Tests for the scene loader */

#[cfg(test)]
mod tests {
    use super::*;

    const BOX_SCENE: &str = r#"
<xml>
  <scene>
    <background value="0.2"/>
    <medium absorption="0.1" scattering="0.05"/>
    <material type="blinn" name="white">
      <diffuse value="0.8"/>
      <specular value="0.1"/>
      <glossiness value="40"/>
    </material>
    <object type="sphere" name="ball" material="white">
      <scale value="2"/>
      <translate x="0" y="0" z="-5"/>
    </object>
    <object type="plane" name="floor" material="white">
      <scale value="10"/>
      <rotate angle="-90" x="1" y="0" z="0"/>
      <translate y="-2"/>
    </object>
    <light type="point" name="key">
      <intensity value="25"/>
      <position x="0" y="5" z="0"/>
      <size value="0.5"/>
    </light>
    <light type="spot" name="beam">
      <intensity r="5" g="4" b="3"/>
      <position x="2" y="5" z="0"/>
      <direction x="0" y="-1" z="0"/>
      <angle value="30"/>
      <size value="0.25"/>
    </light>
  </scene>
  <camera>
    <position x="0" y="0" z="2"/>
    <target x="0" y="0" z="-5"/>
    <up x="0" y="1" z="0"/>
    <fov value="45"/>
    <focaldist value="7"/>
    <dof value="0.1"/>
    <width value="64"/>
    <height value="48"/>
    <srgb value="true"/>
  </camera>
</xml>
"#;

    #[test]
    fn test_parse_full_scene() {
        let scene = parse_scene(BOX_SCENE, Path::new(".")).expect("scene should parse");

        let cam = scene.camera();
        assert_eq!(cam.img_width, 64);
        assert_eq!(cam.img_height, 48);
        assert!(cam.srgb);
        assert!((cam.fov - 45.0).abs() < 1e-6);
        assert!((cam.dof - 0.1).abs() < 1e-6);
        // dir derived from target - position, normalized.
        assert!((cam.dir - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-6);

        assert_eq!(scene.root().children().len(), 2);
        assert_eq!(scene.lights().len(), 2);
        assert!((scene.medium().sigma_a() - 0.1).abs() < 1e-6);
        assert!((scene.medium().sigma_s() - 0.05).abs() < 1e-6);

        let bg = scene.eval_background(Vector3f::new(0.5, 0.5, 0.5));
        assert!((bg[0] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_transformed_sphere_is_where_the_file_says() {
        use crate::core::hit::{HitInfo, HitSide};
        use crate::math::ray::Ray3f;

        let scene = parse_scene(BOX_SCENE, Path::new(".")).expect("scene should parse");
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 2.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(scene.trace_ray(&ray, &mut hit, HitSide::FrontAndBack));
        // Sphere of radius 2 at z = -5, camera ray from z = 2: front at -3.
        assert!((hit.z - 5.0).abs() < 1e-3);
        assert!(hit.node.is_some());
        assert!(hit.node.unwrap().material().is_some());
    }

    #[test]
    fn test_unknown_material_reference_fails() {
        let xml = r#"
<xml>
  <scene>
    <object type="sphere" name="ball" material="missing"/>
  </scene>
</xml>
"#;
        let err = parse_scene(xml, Path::new(".")).unwrap_err();
        assert!(matches!(err, SceneLoadError::Parse(_)));
    }

    #[test]
    fn test_unsupported_light_type_fails() {
        let xml = r#"
<xml>
  <scene>
    <light type="laser" name="l"><position x="0"/></light>
  </scene>
</xml>
"#;
        assert!(parse_scene(xml, Path::new(".")).is_err());
    }

    #[test]
    fn test_nested_objects_compose_transforms() {
        use crate::core::hit::{HitInfo, HitSide};
        use crate::math::ray::Ray3f;

        let xml = r#"
<xml>
  <scene>
    <material type="blinn" name="m"><diffuse value="0.5"/></material>
    <object name="group">
      <translate x="0" y="0" z="-10"/>
      <object type="sphere" name="inner" material="m">
        <translate x="3"/>
      </object>
    </object>
  </scene>
  <camera>
    <position x="3" y="0" z="0"/>
    <target x="3" y="0" z="-10"/>
    <width value="4"/>
    <height value="4"/>
  </camera>
</xml>
"#;
        let scene = parse_scene(xml, Path::new(".")).expect("scene should parse");
        // The sphere sits at (3, 0, -10) in world space.
        let ray = Ray3f::new(Vector3f::new(3.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(scene.trace_ray(&ray, &mut hit, HitSide::FrontAndBack));
        assert!((hit.z - 9.0).abs() < 1e-3);
    }
}
