//! Light property edits emitted by the debug panel

use std::f32::consts::FRAC_PI_2;
use std::ops::RangeInclusive;

use glam::Vec3;

use super::light::Light;
use super::LightId;

pub const INTENSITY_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const ANGLE_RANGE: RangeInclusive<f32> = 0.0..=FRAC_PI_2;
pub const PENUMBRA_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const DECAY_RANGE: RangeInclusive<f32> = 0.0..=5.0;
pub const DISTANCE_RANGE: RangeInclusive<f32> = 0.0..=10.0;
/// Slider step for every numeric light property
pub const SLIDER_STEP: f64 = 0.01;

/// A new value for one light property
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightChange {
    /// Main color; the sky color for hemisphere lights
    Color(Vec3),
    GroundColor(Vec3),
    Intensity(f32),
    CastShadow(bool),
    Angle(f32),
    Penumbra(f32),
    Decay(f32),
    Distance(f32),
}

impl LightChange {
    pub fn property(&self) -> &'static str {
        match self {
            LightChange::Color(_) => "color",
            LightChange::GroundColor(_) => "groundColor",
            LightChange::Intensity(_) => "intensity",
            LightChange::CastShadow(_) => "castShadow",
            LightChange::Angle(_) => "angle",
            LightChange::Penumbra(_) => "penumbra",
            LightChange::Decay(_) => "decay",
            LightChange::Distance(_) => "distance",
        }
    }

    /// Range the panel exposes for numeric properties
    pub fn range(&self) -> Option<RangeInclusive<f32>> {
        match self {
            LightChange::Intensity(_) => Some(INTENSITY_RANGE),
            LightChange::Angle(_) => Some(ANGLE_RANGE),
            LightChange::Penumbra(_) => Some(PENUMBRA_RANGE),
            LightChange::Decay(_) => Some(DECAY_RANGE),
            LightChange::Distance(_) => Some(DISTANCE_RANGE),
            LightChange::Color(_) | LightChange::GroundColor(_) | LightChange::CastShadow(_) => {
                None
            }
        }
    }
}

/// A change to apply to a specific light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightEdit {
    pub light: LightId,
    pub change: LightChange,
}

impl LightEdit {
    pub fn new(light: LightId, change: LightChange) -> Self {
        Self { light, change }
    }
}

fn clamp(value: f32, range: &RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}

fn clamp_color(color: Vec3) -> Vec3 {
    color.clamp(Vec3::ZERO, Vec3::ONE)
}

impl Light {
    /// Apply a change, clamping to the panel's ranges.
    ///
    /// Returns the property name if this kind of light does not have it.
    pub fn apply(&mut self, change: LightChange) -> Result<(), &'static str> {
        use LightChange as C;

        match (self, change) {
            (Light::Ambient(l), C::Color(c)) => l.color = clamp_color(c),
            (Light::Hemisphere(l), C::Color(c)) => l.sky_color = clamp_color(c),
            (Light::Hemisphere(l), C::GroundColor(c)) => l.ground_color = clamp_color(c),
            (Light::Directional(l), C::Color(c)) => l.color = clamp_color(c),
            (Light::Point(l), C::Color(c)) => l.color = clamp_color(c),
            (Light::Spot(l), C::Color(c)) => l.color = clamp_color(c),
            (Light::RectArea(l), C::Color(c)) => l.color = clamp_color(c),

            (light, C::Intensity(i)) => {
                let i = clamp(i, &INTENSITY_RANGE);
                match light {
                    Light::Ambient(l) => l.intensity = i,
                    Light::Hemisphere(l) => l.intensity = i,
                    Light::Directional(l) => l.intensity = i,
                    Light::Point(l) => l.intensity = i,
                    Light::Spot(l) => l.intensity = i,
                    Light::RectArea(l) => l.intensity = i,
                }
            }

            (Light::Directional(l), C::CastShadow(on)) => l.cast_shadow = on,
            (Light::Point(l), C::CastShadow(on)) => l.cast_shadow = on,

            (Light::Spot(l), C::Angle(a)) => l.angle = clamp(a, &ANGLE_RANGE),
            (Light::Spot(l), C::Penumbra(p)) => l.penumbra = clamp(p, &PENUMBRA_RANGE),
            (Light::Spot(l), C::Decay(d)) => l.decay = clamp(d, &DECAY_RANGE),
            (Light::Spot(l), C::Distance(d)) => l.distance = clamp(d, &DISTANCE_RANGE),

            (_, change) => return Err(change.property()),
        }

        Ok(())
    }
}
