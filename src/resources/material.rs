//! Material definitions

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Metalness/roughness surface description
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Linear RGB base color
    pub color: Vec3,
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            color: Vec3::ONE,
            metalness: 0.0,
            roughness: 1.0,
        }
    }
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Standard material with the given color, metalness and roughness
    pub fn standard(color: Vec3, metalness: f32, roughness: f32) -> Self {
        Self::new("standard")
            .with_color(color)
            .with_metalness(metalness)
            .with_roughness(roughness)
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Create a uniform data struct for GPU
    pub fn uniform_data(&self) -> MaterialUniformData {
        MaterialUniformData {
            color: self.color.extend(1.0),
            metalness_roughness: Vec4::new(self.metalness, self.roughness, 0.0, 0.0),
        }
    }
}

/// Material uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniformData {
    pub color: Vec4,
    pub metalness_roughness: Vec4, // x=metalness, y=roughness, zw=padding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_material_uniform() {
        let material = Material::standard(Vec3::ONE, 0.0, 0.5);
        let data = material.uniform_data();
        assert_eq!(data.color, Vec4::ONE);
        assert_eq!(data.metalness_roughness.y, 0.5);
    }

    #[test]
    fn test_factors_are_clamped() {
        let material = Material::new("m").with_metalness(2.0).with_roughness(-1.0);
        assert_eq!(material.metalness, 1.0);
        assert_eq!(material.roughness, 0.0);
    }
}
