//! Debug helpers drawn as line lists
//!
//! Helper geometry is rebuilt from current light state every frame, so
//! helpers follow panel edits without any bookkeeping.

use std::f32::consts::TAU;

use glam::Vec3;

use super::light::{DirectionalLight, Light, PointLight, RectAreaLight, SpotLight};
use super::LightId;
use crate::backend::LineVertex;

/// Segments used for circles in helper geometry
const CIRCLE_SEGMENTS: u32 = 32;

/// A debug helper attached to the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Helper {
    /// World axes from the origin: X red, Y green, Z blue
    Axes { size: f32 },
    /// Outline of a light; `size` is used by directional and point lights
    Light { light: LightId, size: f32 },
}

/// Accumulates line segments
#[derive(Debug, Default)]
pub struct LineBatch {
    vertices: Vec<LineVertex>,
}

impl LineBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a single line segment.
    pub fn line(&mut self, start: Vec3, end: Vec3, color: Vec3) {
        let color = color.to_array();
        self.vertices.push(LineVertex {
            position: start.to_array(),
            color,
        });
        self.vertices.push(LineVertex {
            position: end.to_array(),
            color,
        });
    }

    /// Draw a closed polyline through `points`.
    pub fn loop_through(&mut self, points: &[Vec3], color: Vec3) {
        for (i, &p) in points.iter().enumerate() {
            let next = points[(i + 1) % points.len()];
            self.line(p, next, color);
        }
    }

    /// Draw a circle of `radius` around `center` in the plane spanned by `u` and `v`.
    pub fn circle(&mut self, center: Vec3, u: Vec3, v: Vec3, radius: f32, color: Vec3) {
        let points: Vec<Vec3> = (0..CIRCLE_SEGMENTS)
            .map(|i| {
                let a = i as f32 / CIRCLE_SEGMENTS as f32 * TAU;
                center + (u * a.cos() + v * a.sin()) * radius
            })
            .collect();
        self.loop_through(&points, color);
    }

    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    pub fn into_vertices(self) -> Vec<LineVertex> {
        self.vertices
    }

    pub fn segment_count(&self) -> usize {
        self.vertices.len() / 2
    }
}

/// Two unit vectors perpendicular to `dir` and to each other
fn perpendicular_basis(dir: Vec3) -> (Vec3, Vec3) {
    let reference = if dir.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
    let u = dir.cross(reference).normalize();
    let v = u.cross(dir).normalize();
    (u, v)
}

pub fn draw_axes(batch: &mut LineBatch, size: f32) {
    batch.line(Vec3::ZERO, Vec3::X * size, Vec3::X);
    batch.line(Vec3::ZERO, Vec3::Y * size, Vec3::Y);
    batch.line(Vec3::ZERO, Vec3::Z * size, Vec3::Z);
}

/// Square of half-size `size` facing the light direction, plus a line to the target
pub fn draw_directional(batch: &mut LineBatch, light: &DirectionalLight, size: f32) {
    let dir = light.direction();
    if dir == Vec3::ZERO {
        return;
    }
    let (u, v) = perpendicular_basis(dir);
    let p = light.position;
    let corners = [
        p + (-u + v) * size,
        p + (u + v) * size,
        p + (u - v) * size,
        p + (-u - v) * size,
    ];
    batch.loop_through(&corners, light.color);
    batch.line(p, light.target, light.color);
}

/// Wire octahedron of radius `size` around the light
pub fn draw_point(batch: &mut LineBatch, light: &PointLight, size: f32) {
    let p = light.position;
    let ring = [
        p + Vec3::X * size,
        p + Vec3::Z * size,
        p - Vec3::X * size,
        p - Vec3::Z * size,
    ];
    batch.loop_through(&ring, light.color);
    for &r in &ring {
        batch.line(p + Vec3::Y * size, r, light.color);
        batch.line(p - Vec3::Y * size, r, light.color);
    }
}

/// Cone from the light along its direction.
///
/// The cone is `distance` long. An unlimited range has no natural length, so
/// the cone is then drawn up to the target instead of at a fixed length.
pub fn draw_spot(batch: &mut LineBatch, light: &SpotLight) {
    let dir = light.direction();
    if dir == Vec3::ZERO {
        return;
    }
    let length = if light.distance > 0.0 {
        light.distance
    } else {
        (light.target - light.position).length()
    };
    let radius = length * light.angle.tan();
    let base = light.position + dir * length;
    let (u, v) = perpendicular_basis(dir);

    batch.circle(base, u, v, radius, light.color);
    for edge in [u, v, -u, -v] {
        batch.line(light.position, base + edge * radius, light.color);
    }
}

/// Outline of the emitting rectangle plus a short line along its normal
pub fn draw_rect_area(batch: &mut LineBatch, light: &RectAreaLight) {
    let normal = light.normal();
    if normal == Vec3::ZERO {
        return;
    }
    let (u, v) = perpendicular_basis(normal);
    let hw = light.width / 2.0;
    let hh = light.height / 2.0;
    let p = light.position;
    let corners = [
        p + u * hw + v * hh,
        p - u * hw + v * hh,
        p - u * hw - v * hh,
        p + u * hw - v * hh,
    ];
    batch.loop_through(&corners, light.color);
    batch.line(p, p + normal * 0.5, light.color);
}

/// Draw the helper for a light. Ambient and hemisphere lights have none.
pub fn draw_light(batch: &mut LineBatch, light: &Light, size: f32) {
    match light {
        Light::Directional(l) => draw_directional(batch, l, size),
        Light::Point(l) => draw_point(batch, l, size),
        Light::Spot(l) => draw_spot(batch, l),
        Light::RectArea(l) => draw_rect_area(batch, l),
        Light::Ambient(_) | Light::Hemisphere(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_helper() {
        let mut batch = LineBatch::new();
        draw_axes(&mut batch, 5.0);
        assert_eq!(batch.segment_count(), 3);
        assert_eq!(batch.vertices()[1].position, [5.0, 0.0, 0.0]);
        assert_eq!(batch.vertices()[1].color, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_point_helper_is_octahedron() {
        let mut light = PointLight::new(Vec3::ONE, 0.5, 10.0);
        light.position = Vec3::new(3.0, 3.0, 0.0);
        let mut batch = LineBatch::new();
        draw_point(&mut batch, &light, 1.0);

        assert_eq!(batch.segment_count(), 12);
        for vertex in batch.vertices() {
            let d = (Vec3::from_array(vertex.position) - light.position).length();
            assert!((d - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_spot_helper_follows_angle() {
        let mut light = SpotLight::new(Vec3::Z, 0.5);
        light.position = Vec3::new(0.0, 4.0, 0.0);
        light.target = Vec3::ZERO;

        let rim_radius = |light: &SpotLight| {
            let mut batch = LineBatch::new();
            draw_spot(&mut batch, light);
            let rim = Vec3::from_array(batch.vertices()[0].position);
            (rim - Vec3::ZERO).length()
        };

        light.angle = 0.2;
        let narrow = rim_radius(&light);
        light.angle = 0.6;
        let wide = rim_radius(&light);

        assert!((narrow - 4.0 * 0.2f32.tan()).abs() < 1e-4);
        assert!(wide > narrow);
    }

    #[test]
    fn test_spot_helper_uses_distance_when_limited() {
        let mut light = SpotLight::new(Vec3::Z, 0.5);
        light.position = Vec3::new(0.0, 4.0, 0.0);
        light.target = Vec3::ZERO;
        light.distance = 2.0;

        let mut batch = LineBatch::new();
        draw_spot(&mut batch, &light);
        let rim = Vec3::from_array(batch.vertices()[0].position);
        assert!((rim.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_rect_area_helper_matches_size() {
        let mut light = RectAreaLight::new(Vec3::Z, 0.5, 4.0, 2.0);
        light.position = Vec3::new(0.0, 3.0, 0.0);
        light.target = Vec3::ZERO;

        let mut batch = LineBatch::new();
        draw_rect_area(&mut batch, &light);
        assert_eq!(batch.segment_count(), 5);

        let corners: Vec<Vec3> = batch.vertices()[..8]
            .iter()
            .step_by(2)
            .map(|v| Vec3::from_array(v.position))
            .collect();
        let side_a = (corners[0] - corners[1]).length();
        let side_b = (corners[1] - corners[2]).length();
        assert!((side_a - 4.0).abs() < 1e-5);
        assert!((side_b - 2.0).abs() < 1e-5);
        for c in &corners {
            assert!((c.y - 3.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_ambient_has_no_helper() {
        let mut batch = LineBatch::new();
        let ambient = Light::Ambient(crate::scene::AmbientLight::new(Vec3::ONE, 1.0));
        draw_light(&mut batch, &ambient, 1.0);
        assert_eq!(batch.segment_count(), 0);
    }
}
