//! Mesh data and box generation

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex layout shared by every mesh: position then normal
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A mesh with vertex and index data
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub name: String,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            name: name.to_string(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Unit cube (1x1x1) centered at the origin
    pub fn cube() -> Self {
        Self::cuboid(Vec3::ONE)
    }

    /// Axis-aligned box centered at the origin
    ///
    /// Every face gets its own four vertices so normals stay flat. Triangles
    /// wind counter-clockwise when seen from outside.
    pub fn cuboid(size: Vec3) -> Self {
        let mut mesh = Mesh::new("cube");
        let h = size * 0.5;

        // (normal, u axis, v axis): u x v == normal
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        ];

        for (face, (normal, u, v)) in faces.into_iter().enumerate() {
            let center = normal * h;
            let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
            for (su, sv) in corners {
                mesh.vertices.push(Vertex {
                    position: center + u * h * su + v * h * sv,
                    normal,
                });
            }

            let base = face as u32 * 4;
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_flat_faces() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.index_count(), 36);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertex_count()));
    }

    #[test]
    fn cube_spans_unit_extent() {
        let cube = Mesh::cube();
        for v in &cube.vertices {
            assert_eq!(v.position.abs(), Vec3::splat(0.5));
            assert!((v.normal.length() - 1.0).abs() < 1e-6);
            // normal points out of the face the vertex sits on
            assert_eq!(v.position.dot(v.normal), 0.5);
        }
    }

    #[test]
    fn triangles_wind_outward() {
        let cube = Mesh::cube();
        for tri in cube.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| cube.vertices[i as usize]);
            let face_normal = (b.position - a.position).cross(c.position - a.position);
            assert!(face_normal.dot(a.normal) > 0.0);
        }
    }

    #[test]
    fn cuboid_scales_each_axis() {
        let mesh = Mesh::cuboid(Vec3::new(2.0, 1.0, 4.0));
        let max = mesh
            .vertices
            .iter()
            .fold(Vec3::ZERO, |acc, v| acc.max(v.position));
        assert_eq!(max, Vec3::new(1.0, 0.5, 2.0));
    }

    #[test]
    fn vertex_layout_matches_struct() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(Mesh::cube().vertex_bytes().len(), 24 * 24);
    }
}
