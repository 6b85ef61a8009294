//! CPU-side triangle meshes: glTF import and the procedural fallback bouquet.

use std::f32::consts::{PI, TAU};

use glam::{Mat3, Mat4, Vec3};
use gltf::buffer::Source;
use gltf::mesh::Mode;

use crate::config::BouquetConfig;
use crate::{Error, Result};

/// Indexed triangle list with per-vertex color.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// UV sphere centred on the origin.
    pub fn sphere(radius: f32, segments: u32, color: [f32; 3]) -> Self {
        let segments = segments.max(3);
        let rings = (segments / 2).max(2);
        let mut mesh = Self::default();
        for ring in 0..=rings {
            let theta = ring as f32 / rings as f32 * PI;
            for seg in 0..=segments {
                let phi = seg as f32 / segments as f32 * TAU;
                let normal = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                mesh.positions.push((normal * radius).to_array());
                mesh.normals.push(normal.to_array());
                mesh.colors.push(color);
            }
        }
        let stride = segments + 1;
        for ring in 0..rings {
            for seg in 0..segments {
                let a = ring * stride + seg;
                let b = a + stride;
                mesh.indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
            }
        }
        mesh
    }

    /// Open cylinder along +y, base at the origin.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32, color: [f32; 3]) -> Self {
        let segments = segments.max(3);
        let slope = (radius_bottom - radius_top) / height;
        let mut mesh = Self::default();
        for (y, radius) in [(0.0, radius_bottom), (height, radius_top)] {
            for seg in 0..=segments {
                let phi = seg as f32 / segments as f32 * TAU;
                let (sin, cos) = phi.sin_cos();
                mesh.positions.push([radius * cos, y, radius * sin]);
                mesh.normals.push(Vec3::new(cos, slope, sin).normalize().to_array());
                mesh.colors.push(color);
            }
        }
        let stride = segments + 1;
        for seg in 0..segments {
            let a = seg;
            let b = seg + stride;
            mesh.indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
        mesh
    }

    /// Smooth normals from triangle winding, for models that ship without.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if a >= normals.len() || b >= normals.len() || c >= normals.len() {
                continue;
            }
            let pa = Vec3::from(self.positions[a]);
            let face = (Vec3::from(self.positions[b]) - pa).cross(Vec3::from(self.positions[c]) - pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        self.normals = normals
            .into_iter()
            .map(|n| n.normalize_or_zero().to_array())
            .collect();
    }
}

/// A mesh placed in the bouquet root.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub mesh: Mesh,
    pub transform: Mat4,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, mesh: Mesh, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// Everything attached under the bouquet root.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub nodes: Vec<SceneNode>,
}

impl Model {
    /// Parses a binary glTF (GLB) with embedded buffers. Only triangle
    /// primitives are kept; each takes its material's base color.
    pub fn from_glb(bytes: &[u8]) -> Result<Self> {
        let gltf = gltf::Gltf::from_slice(bytes)?;
        let blob = gltf.blob.as_deref();
        let scene = gltf
            .document
            .default_scene()
            .or_else(|| gltf.document.scenes().next())
            .ok_or(Error::EmptyModel)?;

        let mut model = Self::default();
        let mut stack: Vec<(gltf::Node, Mat4)> = scene.nodes().map(|node| (node, Mat4::IDENTITY)).collect();
        while let Some((node, parent)) = stack.pop() {
            let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
            if let Some(mesh) = node.mesh() {
                for (index, primitive) in mesh.primitives().enumerate() {
                    if primitive.mode() != Mode::Triangles {
                        continue;
                    }
                    for (_, accessor) in primitive.attributes() {
                        if let Some(view) = accessor.view() {
                            if let Source::Uri(uri) = view.buffer().source() {
                                return Err(Error::ExternalBuffer(uri.to_string()));
                            }
                        }
                    }
                    let reader = primitive.reader(|buffer| match buffer.source() {
                        Source::Bin => blob,
                        Source::Uri(_) => None,
                    });
                    let Some(positions) = reader.read_positions() else {
                        continue;
                    };
                    let positions: Vec<[f32; 3]> = positions.collect();
                    let indices: Vec<u32> = match reader.read_indices() {
                        Some(indices) => indices.into_u32().collect(),
                        None => (0..positions.len() as u32).collect(),
                    };
                    let [r, g, b, _] = primitive.material().pbr_metallic_roughness().base_color_factor();
                    let mut part = Mesh {
                        colors: vec![[r, g, b]; positions.len()],
                        positions,
                        normals: Vec::new(),
                        indices,
                    };
                    match reader.read_normals() {
                        Some(normals) => part.normals = normals.collect(),
                        None => part.compute_normals(),
                    }
                    let name = match mesh.name() {
                        Some(name) => format!("{name}.{index}"),
                        None => format!("mesh{}.{index}", mesh.index()),
                    };
                    model.nodes.push(SceneNode::new(name, part, world));
                }
            }
            stack.extend(node.children().map(|child| (child, world)));
        }

        if model.nodes.is_empty() {
            return Err(Error::EmptyModel);
        }
        Ok(model)
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes.len()
    }

    /// Pre-multiplies every node with a uniform scale and an offset.
    pub fn place(&mut self, scale: f32, offset: Vec3) {
        let placement = Mat4::from_scale_rotation_translation(Vec3::splat(scale), glam::Quat::IDENTITY, offset);
        for node in &mut self.nodes {
            node.transform = placement * node.transform;
        }
    }

    pub fn mark_shadows(&mut self) {
        for node in &mut self.nodes {
            node.cast_shadow = true;
            node.receive_shadow = true;
        }
    }
}

/// Stem height of the fallback flowers.
const STEM_HEIGHT: f32 = 1.6;
const STEM_COLOR: [f32; 3] = [0.18, 0.55, 0.2];

/// Offsets and blossom colors of the fallback ensemble.
const FALLBACK_FLOWERS: [([f32; 3], [f32; 3]); 5] = [
    ([0.0, 0.0, 0.0], [0.95, 0.3, 0.45]),
    ([0.5, 0.2, 0.3], [1.0, 0.6, 0.75]),
    ([-0.5, 0.1, -0.2], [0.85, 0.15, 0.25]),
    ([0.3, -0.1, -0.5], [1.0, 0.85, 0.35]),
    ([-0.3, 0.15, 0.5], [0.7, 0.45, 0.9]),
];

/// The procedural stand-in for a model that failed to load: a handful of
/// sphere-on-cylinder flowers at fixed offsets, centred around the origin.
pub fn fallback_bouquet(config: &BouquetConfig) -> Model {
    let mut model = Model::default();
    let base = Vec3::new(0.0, -1.0, 0.0);
    for (i, (offset, color)) in FALLBACK_FLOWERS.iter().enumerate() {
        let origin = base + Vec3::from(*offset);
        // Outer stems lean away from the centre a little.
        let lean = Vec3::new(offset[2], 0.0, -offset[0]) * 0.35;
        let rotation = glam::Quat::from_scaled_axis(lean);
        let stem = Mesh::cylinder(0.03, 0.04, STEM_HEIGHT, config.stem_segments, STEM_COLOR);
        let stem_transform = Mat4::from_rotation_translation(rotation, origin);
        model.nodes.push(SceneNode::new(format!("stem{i}"), stem, stem_transform));

        let top = origin + rotation * Vec3::new(0.0, STEM_HEIGHT, 0.0);
        let blossom = Mesh::sphere(0.28, config.sphere_segments, *color);
        model
            .nodes
            .push(SceneNode::new(format!("blossom{i}"), blossom, Mat4::from_translation(top)));
    }
    model.mark_shadows();
    model
}

/// Normal matrix for a node transform.
pub fn normal_matrix(model: Mat4) -> Mat3 {
    Mat3::from_mat4(model).inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    #[test]
    fn sphere_is_closed_and_unit_normal() {
        let mesh = Mesh::sphere(0.5, 8, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertex_count(), 9 * 5);
        assert_eq!(mesh.triangle_count(), 8 * 4 * 2);
        for n in &mesh.normals {
            assert!((Vec3::from(*n).length() - 1.0).abs() < 1e-5);
        }
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn cylinder_spans_height() {
        let mesh = Mesh::cylinder(0.1, 0.2, 2.0, 6, [0.0; 3]);
        let max_y = mesh.positions.iter().map(|p| p[1]).fold(f32::MIN, f32::max);
        assert_eq!(max_y, 2.0);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn fallback_has_stem_and_blossom_per_flower() {
        let model = fallback_bouquet(&SceneConfig::default().bouquet);
        assert_eq!(model.mesh_count(), FALLBACK_FLOWERS.len() * 2);
        assert!(model.nodes.iter().all(|n| n.cast_shadow && n.receive_shadow));
    }

    #[test]
    fn computed_normals_face_out_of_ccw_triangle() {
        let mut mesh = Mesh {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            indices: vec![0, 1, 2],
            ..Mesh::default()
        };
        mesh.compute_normals();
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 3]);
    }

    #[test]
    fn garbage_is_not_a_model() {
        assert!(matches!(Model::from_glb(b"not a glb"), Err(Error::Gltf(_))));
    }

    #[test]
    fn place_scales_then_offsets() {
        let mut model = Model {
            nodes: vec![SceneNode::new("n", Mesh::default(), Mat4::from_translation(Vec3::X))],
        };
        model.place(2.0, Vec3::new(0.0, -1.0, 0.0));
        let origin = model.nodes[0].transform.transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(2.0, -1.0, 0.0), 1e-6));
    }
}
