//! Light types for the scene
//!
//! Six kinds are supported: ambient, hemisphere, directional, point, spot and
//! rectangular area lights. Colors are linear RGB.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Maximum number of lights packed into the GPU light buffer
pub const MAX_LIGHTS: usize = 8;

/// Convert an sRGB hex color (e.g. `0xff8000`) to linear RGB
pub fn hex_color(hex: u32) -> Vec3 {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    Vec3::new(channel(16), channel(8), channel(0))
}

/// Shadow map settings for shadow-casting lights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    /// Shadow map resolution (square)
    pub map_size: u32,
    /// Blur radius in texels for percentage-closer filtering
    pub radius: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 512,
            radius: 1.0,
        }
    }
}

/// Uniform light applied to every surface
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self { color, intensity }
    }
}

/// Sky/ground gradient light, blended by the surface normal's Y component
#[derive(Debug, Clone, PartialEq)]
pub struct HemisphereLight {
    pub sky_color: Vec3,
    pub ground_color: Vec3,
    pub intensity: f32,
}

impl HemisphereLight {
    pub fn new(sky_color: Vec3, ground_color: Vec3, intensity: f32) -> Self {
        Self {
            sky_color,
            ground_color,
            intensity,
        }
    }
}

/// Directional light (like the sun), shining from `position` towards `target`
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub cast_shadow: bool,
    pub shadow: ShadowSettings,
}

impl DirectionalLight {
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self {
            position: Vec3::Y,
            target: Vec3::ZERO,
            color,
            intensity,
            cast_shadow: false,
            shadow: ShadowSettings::default(),
        }
    }

    /// Direction the light travels in
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

/// Point light emitting in all directions
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    /// Range cutoff; zero means unlimited
    pub distance: f32,
    pub decay: f32,
    pub cast_shadow: bool,
    pub shadow: ShadowSettings,
}

impl PointLight {
    pub fn new(color: Vec3, intensity: f32, distance: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            color,
            intensity,
            distance,
            decay: 2.0,
            cast_shadow: false,
            shadow: ShadowSettings::default(),
        }
    }
}

/// Spot light emitting a cone from `position` towards `target`
#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    /// Range cutoff; zero means unlimited
    pub distance: f32,
    /// Cone half-angle in radians
    pub angle: f32,
    /// Fraction of the cone that fades out, 0..1
    pub penumbra: f32,
    pub decay: f32,
}

impl SpotLight {
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self {
            position: Vec3::Y,
            target: Vec3::ZERO,
            color,
            intensity,
            distance: 0.0,
            angle: std::f32::consts::FRAC_PI_3,
            penumbra: 0.0,
            decay: 2.0,
        }
    }

    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

/// Rectangular area light facing from `position` towards `target`
#[derive(Debug, Clone, PartialEq)]
pub struct RectAreaLight {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub width: f32,
    pub height: f32,
}

impl RectAreaLight {
    pub fn new(color: Vec3, intensity: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            color,
            intensity,
            width,
            height,
        }
    }

    /// Facing direction (the emitting side's normal)
    pub fn normal(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

/// Discriminant of [`Light`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Ambient,
    Hemisphere,
    Directional,
    Point,
    Spot,
    RectArea,
}

impl LightKind {
    /// Panel folder title
    pub fn title(self) -> &'static str {
        match self {
            LightKind::Ambient => "Ambient Light",
            LightKind::Hemisphere => "Hemispheric Light",
            LightKind::Directional => "Directional Light",
            LightKind::Point => "Point Light",
            LightKind::Spot => "Spot Light",
            LightKind::RectArea => "Rect Area Light",
        }
    }

    fn gpu_code(self) -> f32 {
        match self {
            LightKind::Ambient => 0.0,
            LightKind::Hemisphere => 1.0,
            LightKind::Directional => 2.0,
            LightKind::Point => 3.0,
            LightKind::Spot => 4.0,
            LightKind::RectArea => 5.0,
        }
    }
}

/// Any light in the scene
#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Ambient(AmbientLight),
    Hemisphere(HemisphereLight),
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
    RectArea(RectAreaLight),
}

impl Light {
    pub fn kind(&self) -> LightKind {
        match self {
            Light::Ambient(_) => LightKind::Ambient,
            Light::Hemisphere(_) => LightKind::Hemisphere,
            Light::Directional(_) => LightKind::Directional,
            Light::Point(_) => LightKind::Point,
            Light::Spot(_) => LightKind::Spot,
            Light::RectArea(_) => LightKind::RectArea,
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Ambient(l) => l.intensity,
            Light::Hemisphere(l) => l.intensity,
            Light::Directional(l) => l.intensity,
            Light::Point(l) => l.intensity,
            Light::Spot(l) => l.intensity,
            Light::RectArea(l) => l.intensity,
        }
    }

    /// Convert to GPU data format
    pub fn to_gpu_data(&self) -> GpuLightData {
        let kind = self.kind().gpu_code();
        match self {
            Light::Ambient(l) => GpuLightData {
                color_intensity: l.color.extend(l.intensity),
                direction_kind: Vec4::new(0.0, 0.0, 0.0, kind),
                ..GpuLightData::zeroed()
            },
            Light::Hemisphere(l) => GpuLightData {
                color_intensity: l.sky_color.extend(l.intensity),
                direction_kind: Vec4::new(0.0, 1.0, 0.0, kind),
                extra: l.ground_color.extend(0.0),
                ..GpuLightData::zeroed()
            },
            Light::Directional(l) => GpuLightData {
                position_range: l.position.extend(0.0),
                color_intensity: l.color.extend(l.intensity),
                direction_kind: l.direction().extend(kind),
                params: Vec4::new(0.0, 0.0, 0.0, if l.cast_shadow { 1.0 } else { 0.0 }),
                ..GpuLightData::zeroed()
            },
            Light::Point(l) => GpuLightData {
                position_range: l.position.extend(l.distance),
                color_intensity: l.color.extend(l.intensity),
                direction_kind: Vec4::new(0.0, 0.0, 0.0, kind),
                params: Vec4::new(0.0, 0.0, l.decay, if l.cast_shadow { 1.0 } else { 0.0 }),
                ..GpuLightData::zeroed()
            },
            Light::Spot(l) => GpuLightData {
                position_range: l.position.extend(l.distance),
                color_intensity: l.color.extend(l.intensity),
                direction_kind: l.direction().extend(kind),
                params: Vec4::new(
                    l.angle.cos(),
                    (l.angle * (1.0 - l.penumbra)).cos(),
                    l.decay,
                    0.0,
                ),
                ..GpuLightData::zeroed()
            },
            Light::RectArea(l) => GpuLightData {
                position_range: l.position.extend(0.0),
                color_intensity: l.color.extend(l.intensity),
                direction_kind: l.normal().extend(kind),
                params: Vec4::new(l.width, l.height, 0.0, 0.0),
                ..GpuLightData::zeroed()
            },
        }
    }
}

/// GPU-friendly light data structure
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuLightData {
    /// xyz = position, w = range (0 = unlimited)
    pub position_range: Vec4,
    /// xyz = color, w = intensity
    pub color_intensity: Vec4,
    /// xyz = direction, w = light kind
    pub direction_kind: Vec4,
    /// spot: cos(outer), cos(inner), decay; point: decay in z;
    /// rect area: width, height; directional and point: w = casts shadow
    pub params: Vec4,
    /// hemisphere: ground color
    pub extra: Vec4,
}

/// All lights of a frame, as uploaded to the GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightsUniform {
    pub lights: [GpuLightData; MAX_LIGHTS],
    /// x = light count
    pub count: [u32; 4],
}

impl LightsUniform {
    /// Pack lights, dropping any beyond [`MAX_LIGHTS`].
    ///
    /// There is one shadow map per kind, so only the first shadow-casting
    /// directional and point light keep their shadow flag.
    pub fn pack<'a>(lights: impl IntoIterator<Item = &'a Light>) -> Self {
        let mut uniform = Self::zeroed();
        let mut count = 0;
        let mut directional_shadow = false;
        let mut point_shadow = false;
        for light in lights.into_iter().take(MAX_LIGHTS) {
            let mut data = light.to_gpu_data();
            let taken = match light.kind() {
                LightKind::Directional => Some(&mut directional_shadow),
                LightKind::Point => Some(&mut point_shadow),
                _ => None,
            };
            if let Some(taken) = taken.filter(|_| data.params.w > 0.5) {
                if *taken {
                    data.params.w = 0.0;
                }
                *taken = true;
            }
            uniform.lights[count] = data;
            count += 1;
        }
        uniform.count[0] = count as u32;
        uniform
    }
}
