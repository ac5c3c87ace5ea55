//! Material definitions

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// Physically based "standard" material
///
/// Defaults match a fully rough, non-metallic white surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Linear RGBA
    pub base_color: Vec4,
    pub metallic: f32,
    pub roughness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "standard".to_string(),
            base_color: Vec4::ONE,
            metallic: 0.0,
            roughness: 1.0,
        }
    }
}

impl Material {
    pub fn standard() -> Self {
        Self::default()
    }

    /// Create a uniform data struct for GPU
    pub fn uniform_data(&self) -> MaterialUniformData {
        MaterialUniformData {
            base_color: self.base_color,
            metallic_roughness: [self.metallic, self.roughness, 0.0, 0.0],
        }
    }
}

/// Material uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniformData {
    pub base_color: Vec4,
    pub metallic_roughness: [f32; 4], // x=metallic, y=roughness, zw=padding
}
