//! WGSL sources
//!
//! Kept within what WebGL2 can run: uniform buffers only, no storage buffers.

/// Shared declarations for the scene, shadow and line shaders
const COMMON: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
}

struct FrameUniform {
    light_view_proj: mat4x4<f32>,
    // x = enabled, y = depth bias, z = texel size, w = filter radius in texels
    shadow: vec4<f32>,
    // xyz = shadow-casting point light position, w = filter radius in texels
    point_light: vec4<f32>,
    // x = enabled, y = near, z = far, w = face texel size at unit distance
    point_shadow: vec4<f32>,
    // x = encode sRGB in the shader
    output: vec4<f32>,
}

struct ObjectUniform {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    color: vec4<f32>,
    // x = metalness, y = roughness, z = receives shadow
    surface: vec4<f32>,
}

fn encode_output(color: vec3<f32>, srgb: f32) -> vec3<f32> {
    if (srgb > 0.5) {
        let c = clamp(color, vec3<f32>(0.0), vec3<f32>(1.0));
        let lo = c * 12.92;
        let hi = 1.055 * pow(c, vec3<f32>(1.0 / 2.4)) - 0.055;
        return select(hi, lo, c <= vec3<f32>(0.0031308));
    }
    return color;
}
"#;

const SCENE_BODY: &str = r#"
struct Light {
    position_range: vec4<f32>,
    color_intensity: vec4<f32>,
    direction_kind: vec4<f32>,
    params: vec4<f32>,
    extra: vec4<f32>,
}

struct LightsUniform {
    lights: array<Light, 8>,
    count: vec4<u32>,
}

@group(0) @binding(0) var<uniform> camera: CameraUniform;
@group(0) @binding(1) var<uniform> lights: LightsUniform;
@group(0) @binding(2) var<uniform> frame: FrameUniform;
@group(0) @binding(3) var shadow_map: texture_depth_2d;
@group(0) @binding(4) var shadow_sampler: sampler_comparison;
@group(0) @binding(5) var point_shadow_map: texture_depth_cube;

@group(1) @binding(0) var<uniform> object: ObjectUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_pos = object.model * vec4<f32>(in.position, 1.0);
    out.world_position = world_pos.xyz;
    out.clip_position = camera.view_proj * world_pos;
    out.world_normal = normalize((object.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz);
    return out;
}

const KIND_AMBIENT: u32 = 0u;
const KIND_HEMISPHERE: u32 = 1u;
const KIND_DIRECTIONAL: u32 = 2u;
const KIND_POINT: u32 = 3u;
const KIND_SPOT: u32 = 4u;
const KIND_RECT_AREA: u32 = 5u;

fn distance_attenuation(dist: f32, range: f32, decay: f32) -> f32 {
    var atten = 1.0 / max(pow(dist, decay), 0.01);
    if (range > 0.0) {
        let falloff = clamp(1.0 - pow(dist / range, 4.0), 0.0, 1.0);
        atten = atten * falloff * falloff;
    }
    return atten;
}

fn shadow_factor(world_position: vec3<f32>, normal: vec3<f32>, to_light: vec3<f32>) -> f32 {
    if (frame.shadow.x < 0.5 || object.surface.z < 0.5) {
        return 1.0;
    }

    let clip = frame.light_view_proj * vec4<f32>(world_position, 1.0);
    let ndc = clip.xyz / clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
    if (uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 || ndc.z > 1.0) {
        return 1.0;
    }

    let slope = 1.0 - max(dot(normal, to_light), 0.0);
    let depth = ndc.z - frame.shadow.y * (1.0 + 4.0 * slope);
    let texel_step = frame.shadow.z * max(frame.shadow.w, 1.0) * 0.5;

    var lit = 0.0;
    for (var x = -2; x <= 2; x = x + 1) {
        for (var y = -2; y <= 2; y = y + 1) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel_step;
            lit = lit + textureSampleCompareLevel(shadow_map, shadow_sampler, uv + offset, depth);
        }
    }
    return lit / 25.0;
}

// Cube faces store the perspective depth of the major axis distance
fn cube_depth(major: f32) -> f32 {
    let near = frame.point_shadow.y;
    let far = frame.point_shadow.z;
    return far * (major - near) / ((far - near) * major);
}

fn point_shadow_factor(world_position: vec3<f32>, normal: vec3<f32>) -> f32 {
    if (frame.point_shadow.x < 0.5 || object.surface.z < 0.5) {
        return 1.0;
    }

    let light_pos = frame.point_light.xyz;
    let light_dist = length(world_position - light_pos);
    // Push the lookup one and a half texels off the surface
    let texel = frame.point_shadow.w * light_dist;
    let dir = world_position + normal * texel * 1.5 - light_pos;
    let major = max(abs(dir.x), max(abs(dir.y), abs(dir.z)));
    if (major <= frame.point_shadow.y || major >= frame.point_shadow.z) {
        return 1.0;
    }
    let depth = cube_depth(major);

    let n = normalize(dir);
    var up = vec3<f32>(0.0, 1.0, 0.0);
    if (abs(n.y) > 0.99) {
        up = vec3<f32>(1.0, 0.0, 0.0);
    }
    let tangent = normalize(cross(up, n));
    let bitangent = cross(n, tangent);
    let spread = frame.point_shadow.w * max(frame.point_light.w, 1.0) * 0.5 * major;

    var lit = 0.0;
    for (var x = -1; x <= 1; x = x + 1) {
        for (var y = -1; y <= 1; y = y + 1) {
            let offset = (tangent * f32(x) + bitangent * f32(y)) * spread;
            lit = lit + textureSampleCompareLevel(point_shadow_map, shadow_sampler, dir + offset, depth);
        }
    }
    return lit / 9.0;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.world_normal);
    let view_dir = normalize(camera.position.xyz - in.world_position);

    let albedo = object.color.rgb;
    let metalness = object.surface.x;
    let roughness = object.surface.y;
    let diffuse_color = albedo * (1.0 - metalness);
    let specular_color = mix(vec3<f32>(0.04), albedo, metalness);
    let shininess = mix(2.0, 128.0, (1.0 - roughness) * (1.0 - roughness));
    let specular_strength = 1.0 - roughness * 0.9;

    var color = vec3<f32>(0.0);
    let count = min(lights.count.x, 8u);

    for (var i = 0u; i < count; i = i + 1u) {
        let light = lights.lights[i];
        let kind = u32(light.direction_kind.w + 0.5);
        let radiance = light.color_intensity.rgb * light.color_intensity.w;

        if (kind == KIND_AMBIENT) {
            color = color + radiance * albedo;
            continue;
        }
        if (kind == KIND_HEMISPHERE) {
            let w = dot(normal, light.direction_kind.xyz) * 0.5 + 0.5;
            let sky = light.color_intensity.rgb;
            let ground = light.extra.rgb;
            color = color + mix(ground, sky, w) * light.color_intensity.w * albedo;
            continue;
        }

        var to_light = vec3<f32>(0.0, 1.0, 0.0);
        var scale = 1.0;

        if (kind == KIND_DIRECTIONAL) {
            to_light = -light.direction_kind.xyz;
            if (light.params.w > 0.5) {
                scale = shadow_factor(in.world_position, normal, to_light);
            }
        } else {
            let offset = light.position_range.xyz - in.world_position;
            let dist = length(offset);
            to_light = offset / max(dist, 0.0001);

            if (kind == KIND_POINT) {
                scale = distance_attenuation(dist, light.position_range.w, light.params.z);
                if (light.params.w > 0.5) {
                    scale = scale * point_shadow_factor(in.world_position, normal);
                }
            } else if (kind == KIND_SPOT) {
                let cos_angle = dot(-to_light, light.direction_kind.xyz);
                let cone = smoothstep(light.params.x, max(light.params.y, light.params.x + 0.0001), cos_angle);
                scale = cone * distance_attenuation(dist, light.position_range.w, light.params.z);
            } else if (kind == KIND_RECT_AREA) {
                // Disc emitter of the rectangle's area, facing along its normal
                let area = light.params.x * light.params.y;
                let facing = max(dot(-to_light, light.direction_kind.xyz), 0.0);
                scale = facing * area / (area + dist * dist);
            }
        }

        let n_dot_l = max(dot(normal, to_light), 0.0);
        let half_dir = normalize(to_light + view_dir);
        let spec = pow(max(dot(normal, half_dir), 0.0), shininess) * specular_strength;

        color = color + radiance * scale * n_dot_l * (diffuse_color + specular_color * spec);
    }

    return vec4<f32>(encode_output(color, frame.output.x), 1.0);
}
"#;

const SHADOW_BODY: &str = r#"
// One directional view or one cube face per pass
struct ShadowView {
    view_proj: mat4x4<f32>,
}

@group(0) @binding(0) var<uniform> shadow_view: ShadowView;
@group(1) @binding(0) var<uniform> object: ObjectUniform;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return shadow_view.view_proj * object.model * vec4<f32>(position, 1.0);
}
"#;

const LINE_BODY: &str = r#"
@group(0) @binding(0) var<uniform> camera: CameraUniform;
@group(0) @binding(2) var<uniform> frame: FrameUniform;

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec3<f32>) -> LineOutput {
    var out: LineOutput;
    out.clip_position = camera.view_proj * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: LineOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(encode_output(in.color, frame.output.x), 1.0);
}
"#;

pub fn scene_shader() -> String {
    format!("{COMMON}{SCENE_BODY}")
}

pub fn shadow_shader() -> String {
    format!("{COMMON}{SHADOW_BODY}")
}

pub fn line_shader() -> String {
    format!("{COMMON}{LINE_BODY}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_array_matches_capacity() {
        let expected = format!("array<Light, {}>", crate::scene::MAX_LIGHTS);
        assert!(scene_shader().contains(&expected));
    }

    #[test]
    fn test_scene_shader_samples_point_shadow_cube() {
        let source = scene_shader();
        assert!(source.contains("texture_depth_cube"));
        assert!(source.contains("point_shadow_factor(in.world_position, normal)"));
    }

    #[test]
    fn test_shaders_share_declarations() {
        for source in [scene_shader(), shadow_shader(), line_shader()] {
            assert!(source.contains("struct FrameUniform"));
            assert!(source.contains("fn vs_main"));
        }
    }
}
