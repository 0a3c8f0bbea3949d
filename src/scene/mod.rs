//! Scene management

mod camera;
mod camera_controller;
mod edit;
mod helpers;
mod light;
mod transform;

pub use camera::*;
pub use camera_controller::*;
pub use edit::*;
pub use helpers::*;
pub use light::*;
pub use transform::*;

use std::fmt;

use glam::Vec3;
use thiserror::Error;

use crate::backend::LineVertex;
use crate::resources::{Material, Mesh};

/// Handle to a light in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub usize);

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "light #{}", self.0)
    }
}

/// Errors raised when modifying a scene
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("{0} does not exist")]
    UnknownLight(LightId),

    #[error("{light} has no property `{property}`")]
    PropertyMismatch {
        light: LightId,
        property: &'static str,
    },
}

/// A renderable object in the scene
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub mesh_id: usize,
    pub material_id: usize,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl SceneObject {
    pub fn new(mesh_id: usize, material_id: usize) -> Self {
        Self {
            mesh_id,
            material_id,
            transform: Transform::default(),
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    pub fn receiving_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }
}

/// The scene containing all renderable content
///
/// Meshes and materials are stored once and referenced by index from
/// [`SceneObject`]s, so the renderer only uploads each of them once.
#[derive(Debug, Clone)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub objects: Vec<SceneObject>,
    lights: Vec<Light>,
    pub helpers: Vec<Helper>,
    pub show_helpers: bool,
    pub background: Vec3,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            meshes: Vec::new(),
            materials: Vec::new(),
            objects: Vec::new(),
            lights: Vec::new(),
            helpers: Vec::new(),
            show_helpers: true,
            background: Vec3::ZERO,
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    pub fn add_light(&mut self, light: Light) -> LightId {
        self.lights.push(light);
        LightId(self.lights.len() - 1)
    }

    pub fn add_helper(&mut self, helper: Helper) {
        self.helpers.push(helper);
    }

    pub fn light(&self, id: LightId) -> Option<&Light> {
        self.lights.get(id.0)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Iterate over lights with their handles
    pub fn lights_with_ids(&self) -> impl Iterator<Item = (LightId, &Light)> {
        self.lights.iter().enumerate().map(|(i, l)| (LightId(i), l))
    }

    /// Apply a panel edit to the addressed light.
    ///
    /// Numeric values are clamped to the range the panel exposes.
    pub fn apply_edit(&mut self, edit: &LightEdit) -> Result<(), SceneError> {
        let light = self
            .lights
            .get_mut(edit.light.0)
            .ok_or(SceneError::UnknownLight(edit.light))?;

        light
            .apply(edit.change)
            .map_err(|property| SceneError::PropertyMismatch {
                light: edit.light,
                property,
            })?;

        log::debug!("Applied {:?} to {}", edit.change, edit.light);
        Ok(())
    }

    /// Line geometry for all helpers, built from current light state
    pub fn helper_lines(&self) -> Vec<LineVertex> {
        if !self.show_helpers {
            return Vec::new();
        }

        let mut batch = LineBatch::new();
        for helper in &self.helpers {
            match *helper {
                Helper::Axes { size } => draw_axes(&mut batch, size),
                Helper::Light { light, size } => {
                    if let Some(light) = self.light(light) {
                        draw_light(&mut batch, light, size);
                    }
                }
            }
        }
        batch.into_vertices()
    }

    /// The first directional light that casts shadows, if any
    pub fn shadow_caster(&self) -> Option<&DirectionalLight> {
        self.lights.iter().find_map(|light| match light {
            Light::Directional(l) if l.cast_shadow => Some(l),
            _ => None,
        })
    }

    /// The first point light that casts shadows, if any
    pub fn point_shadow_caster(&self) -> Option<&PointLight> {
        self.lights.iter().find_map(|light| match light {
            Light::Point(l) if l.cast_shadow => Some(l),
            _ => None,
        })
    }
}
