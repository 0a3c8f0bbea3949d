//! The light showcase scene
//!
//! Four white meshes over a large disc, lit by one light of each kind, each
//! with a debug helper where one exists.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use crate::resources::{Material, Mesh};
use crate::scene::{
    hex_color, AmbientLight, Camera, DirectionalLight, HemisphereLight, Helper, Light, LightId,
    OrbitControls, PointLight, RectAreaLight, Scene, SceneObject, ShadowSettings, SpotLight,
    Transform,
};

const RED: u32 = 0xff0000;
const GREEN: u32 = 0x008000;
const BLUE: u32 = 0x0000ff;
const WHITE: u32 = 0xffffff;

pub const CAMERA_FOV: f32 = 35.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 10_000.0;
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 5.0, 10.0);
pub const DAMPING_FACTOR: f32 = 0.05;

const SHADOW: ShadowSettings = ShadowSettings {
    map_size: 1024,
    radius: 10.0,
};

/// Handles to the showcase lights, in panel order
#[derive(Debug, Clone, Copy)]
pub struct ShowcaseLights {
    pub ambient: LightId,
    pub hemisphere: LightId,
    pub directional: LightId,
    pub point: LightId,
    pub spot: LightId,
    pub rect_area: LightId,
}

/// Build the showcase scene
pub fn build_scene() -> (Scene, ShowcaseLights) {
    let mut scene = Scene::new();
    scene.add_helper(Helper::Axes { size: 5.0 });

    let material = scene.add_material(Material::standard(hex_color(WHITE), 0.0, 0.5));

    let cube = scene.add_mesh(Mesh::cuboid(1.0, 1.0, 1.0));
    let sphere = scene.add_mesh(Mesh::sphere(0.75, 32, 32));
    let torus_knot = scene.add_mesh(Mesh::torus_knot(0.5, 0.2, 100, 16, 2, 3));
    let disc = scene.add_mesh(Mesh::circle(0.5, 32));

    scene.add_object(
        SceneObject::new(cube, material)
            .with_position(Vec3::new(-2.0, 0.0, 0.0))
            .casting_shadow(),
    );
    scene.add_object(
        SceneObject::new(sphere, material)
            .with_position(Vec3::ZERO)
            .casting_shadow(),
    );
    scene.add_object(
        SceneObject::new(torus_knot, material)
            .with_position(Vec3::new(2.0, 0.0, 0.0))
            .casting_shadow(),
    );
    scene.add_object(
        SceneObject::new(disc, material)
            .with_transform(
                Transform::from_position(Vec3::new(0.0, -1.0, 0.0))
                    .with_rotation(Quat::from_rotation_x(-FRAC_PI_2))
                    .with_uniform_scale(20.0),
            )
            .receiving_shadow(),
    );

    let ambient = scene.add_light(Light::Ambient(AmbientLight::new(hex_color(WHITE), 0.2)));

    let hemisphere = scene.add_light(Light::Hemisphere(HemisphereLight::new(
        hex_color(RED),
        hex_color(BLUE),
        0.5,
    )));

    let mut directional_light = DirectionalLight::new(hex_color(GREEN), 0.5);
    directional_light.position = Vec3::new(-5.0, 5.0, 0.0);
    directional_light.cast_shadow = true;
    directional_light.shadow = SHADOW;
    let directional = scene.add_light(Light::Directional(directional_light));
    scene.add_helper(Helper::Light {
        light: directional,
        size: 0.5,
    });

    let mut point_light = PointLight::new(hex_color(WHITE), 0.5, 10.0);
    point_light.position = Vec3::new(3.0, 3.0, 0.0);
    point_light.cast_shadow = true;
    point_light.shadow = SHADOW;
    let point = scene.add_light(Light::Point(point_light));
    scene.add_helper(Helper::Light {
        light: point,
        size: 1.0,
    });

    let mut spot_light = SpotLight::new(hex_color(BLUE), 0.5);
    spot_light.position = Vec3::new(-5.0, 7.0, 0.0);
    spot_light.target = Vec3::new(2.0, 0.0, -2.0);
    let spot = scene.add_light(Light::Spot(spot_light));
    scene.add_helper(Helper::Light {
        light: spot,
        size: 1.0,
    });

    let mut rect_light = RectAreaLight::new(hex_color(BLUE), 0.5, 50.0, 2.0);
    rect_light.position = Vec3::new(0.0, 3.0, 0.0);
    rect_light.target = Vec3::ZERO;
    let rect_area = scene.add_light(Light::RectArea(rect_light));
    scene.add_helper(Helper::Light {
        light: rect_area,
        size: 1.0,
    });

    let lights = ShowcaseLights {
        ambient,
        hemisphere,
        directional,
        point,
        spot,
        rect_area,
    };
    (scene, lights)
}

/// Perspective camera above and in front of the meshes, looking at the origin
pub fn build_camera(width: u32, height: u32) -> Camera {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    let mut camera = Camera::perspective(CAMERA_FOV, aspect, CAMERA_NEAR, CAMERA_FAR)
        .with_position(CAMERA_POSITION);
    camera.look_at(Vec3::ZERO);
    camera
}

/// Damped orbit controls around the camera's target
pub fn build_controls(camera: &Camera) -> OrbitControls {
    OrbitControls::new(camera).with_damping(DAMPING_FACTOR)
}
