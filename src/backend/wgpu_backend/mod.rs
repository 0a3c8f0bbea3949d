//! wgpu renderer implementation

mod shaders;

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use parking_lot::Mutex;
use wgpu::util::DeviceExt;

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::egui_integration::{EguiPainter, OverlayFrame};
use crate::resources::{Material, Mesh};
use crate::scene::{
    Camera, CameraUniformData, DirectionalLight, LightsUniform, PointLight, Scene, SceneObject,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MSAA_SAMPLES: u32 = 4;
/// Half-extent of the directional shadow camera's orthographic frustum
const SHADOW_FRUSTUM: f32 = 5.0;
const SHADOW_NEAR: f32 = 0.5;
const SHADOW_FAR: f32 = 500.0;
const SHADOW_BIAS: f32 = 0.0005;
const POINT_SHADOW_NEAR: f32 = 0.5;
const POINT_SHADOW_FAR: f32 = 500.0;
pub const MIN_PIXEL_RATIO: f64 = 0.25;

/// Renderer creation options
#[derive(Debug, Clone, PartialEq)]
pub struct RendererOptions {
    /// Multisample the scene (4x) when the surface format allows it
    pub antialias: bool,
    pub vsync: bool,
    /// Enable shadow maps
    pub shadows: bool,
    /// Upper bound for the device pixel ratio
    pub max_pixel_ratio: f64,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            vsync: true,
            shadows: true,
            max_pixel_ratio: 2.0,
        }
    }
}

/// Per-frame settings shared by the scene, shadow and line shaders
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FrameUniform {
    light_view_proj: Mat4,
    /// x = enabled, y = depth bias, z = texel size, w = filter radius in texels
    shadow: Vec4,
    /// xyz = shadow-casting point light position, w = filter radius in texels
    point_light: Vec4,
    /// x = enabled, y = near, z = far, w = face texel size at unit distance
    point_shadow: Vec4,
    /// x = encode sRGB in the shader
    output: Vec4,
}

/// Light-space transform for one shadow depth pass
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ShadowViewUniform {
    view_proj: Mat4,
}

/// Per-object transform and material
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ObjectUniform {
    model: Mat4,
    normal_matrix: Mat4,
    color: Vec4,
    /// x = metalness, y = roughness, z = receives shadow
    surface: Vec4,
}

impl ObjectUniform {
    fn new(object: &SceneObject, material: Option<&Material>) -> Self {
        let transform = object.transform.uniform_data();
        let fallback = Material::default();
        let material = material.unwrap_or(&fallback).uniform_data();
        Self {
            model: transform.model,
            normal_matrix: transform.normal_matrix,
            color: material.color,
            surface: Vec4::new(
                material.metalness_roughness.x,
                material.metalness_roughness.y,
                if object.receive_shadow { 1.0 } else { 0.0 },
                0.0,
            ),
        }
    }
}

/// GPU resources for a mesh
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Per-object uniform buffer and its bind group
struct GpuObject {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Size-dependent render targets
struct FrameTargets {
    depth_view: wgpu::TextureView,
    /// Multisampled color target, resolved into the surface texture
    msaa_view: Option<wgpu::TextureView>,
}

/// Depth texture rendered from the shadow-casting directional light
struct ShadowMap {
    size: u32,
    view: wgpu::TextureView,
}

/// Depth cube rendered from the shadow-casting point light
struct PointShadowMap {
    size: u32,
    /// Sampled by direction in the scene shader
    cube_view: wgpu::TextureView,
    /// One render attachment per face, in cube layer order
    face_views: [wgpu::TextureView; 6],
}

/// Uniform buffer and bind group for one shadow depth pass
struct ShadowTarget {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Shadow depth passes the current frame needs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ShadowPasses {
    directional: bool,
    point: bool,
}

/// Face axes and up vectors in cube layer order (+X, -X, +Y, -Y, +Z, -Z)
const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y),
    (Vec3::NEG_X, Vec3::Y),
    (Vec3::Y, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::Z),
    (Vec3::Z, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y),
];

/// View-projections for the six faces of a point light's shadow cube.
///
/// Left-handed views put each face in the orientation cube sampling reads it
/// back in, so the scene shader can look the depth up by direction.
pub fn point_shadow_face_matrices(position: Vec3) -> [Mat4; 6] {
    let proj = Mat4::perspective_lh(FRAC_PI_2, 1.0, POINT_SHADOW_NEAR, POINT_SHADOW_FAR);
    CUBE_FACES.map(|(dir, up)| proj * Mat4::look_to_lh(position, dir, up))
}

/// Depth a cube face stores for a point `major` units along the face axis
pub fn cube_shadow_depth(major: f32) -> f32 {
    POINT_SHADOW_FAR * (major - POINT_SHADOW_NEAR)
        / ((POINT_SHADOW_FAR - POINT_SHADOW_NEAR) * major)
}

/// Light view-projection for a directional light's orthographic shadow camera
pub fn directional_shadow_matrix(light: &DirectionalLight) -> Mat4 {
    let dir = light.direction();
    let up = if dir.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let view = Mat4::look_at_rh(light.position, light.target, up);
    let proj = Mat4::orthographic_rh(
        -SHADOW_FRUSTUM,
        SHADOW_FRUSTUM,
        -SHADOW_FRUSTUM,
        SHADOW_FRUSTUM,
        SHADOW_NEAR,
        SHADOW_FAR,
    );
    proj * view
}

/// Screen descriptor for painting the UI overlay onto the drawing buffer.
///
/// egui lays out in logical points, so one point covers as many buffer pixels
/// as the buffer has per logical pixel. That ratio is the capped (or texture
/// limited) pixel ratio, not egui's own native one.
pub fn overlay_screen(
    surface_size: (u32, u32),
    logical_size: (u32, u32),
) -> egui_wgpu::ScreenDescriptor {
    egui_wgpu::ScreenDescriptor {
        size_in_pixels: [surface_size.0, surface_size.1],
        pixels_per_point: surface_size.0 as f32 / logical_size.0.max(1) as f32,
    }
}

/// Device pixel ratio capped at `max`, never below [`MIN_PIXEL_RATIO`]
pub fn clamp_pixel_ratio(ratio: f64, max: f64) -> f64 {
    ratio.min(max).max(MIN_PIXEL_RATIO)
}

/// Scale `(width, height)` down to fit `max_size`, keeping the aspect ratio
pub fn clamp_to_texture_limit(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width > max_size || height > max_size {
        let scale = (max_size as f32 / width as f32).min(max_size as f32 / height as f32);
        (
            ((width as f32 * scale) as u32).max(1),
            ((height as f32 * scale) as u32).max(1),
        )
    } else {
        (width.max(1), height.max(1))
    }
}

/// Forward renderer drawing a [`Scene`] into a window surface
pub struct WgpuRenderer {
    #[allow(dead_code)]
    instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    options: RendererOptions,
    sample_count: u32,
    /// Logical size as passed to `set_size`
    size: (u32, u32),
    pixel_ratio: f64,
    /// Error reported by wgpu callbacks outside of a render call
    device_error: Arc<Mutex<Option<BackendError>>>,

    scene_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,

    frame_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,

    camera_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    frame_buffer: wgpu::Buffer,
    shadow_sampler: wgpu::Sampler,
    frame_bind_group: wgpu::BindGroup,
    directional_target: ShadowTarget,
    cube_face_targets: [ShadowTarget; 6],
    shadow_map: ShadowMap,
    point_shadow_map: PointShadowMap,

    line_buffer: Option<(wgpu::Buffer, u64)>,

    gpu_meshes: Vec<GpuMesh>,
    gpu_objects: Vec<GpuObject>,
    targets: FrameTargets,
    egui: EguiPainter,
}

impl WgpuRenderer {
    /// Blocking initialization for native targets
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(
        window: Arc<winit::window::Window>,
        options: RendererOptions,
    ) -> BackendResult<Self> {
        pollster::block_on(Self::new_async(window, options))
    }

    /// Async initialization - used directly on web, wrapped by `new` on native
    pub async fn new_async(
        window: Arc<winit::window::Window>,
        options: RendererOptions,
    ) -> BackendResult<Self> {
        #[cfg(target_arch = "wasm32")]
        let (instance, surface, adapter, device, queue) = Self::init_web(window.clone()).await?;

        #[cfg(not(target_arch = "wasm32"))]
        let (instance, surface, adapter, device, queue) =
            Self::init_native(window.clone()).await?;

        let device_error = Arc::new(Mutex::new(None));
        {
            let device_error = Arc::clone(&device_error);
            device.on_uncaptured_error(Box::new(move |error: wgpu::Error| {
                log::error!("wgpu error: {}", error);
                if let wgpu::Error::OutOfMemory { .. } = error {
                    *device_error.lock() = Some(BackendError::OutOfMemory);
                }
            }));
        }
        {
            let device_error = Arc::clone(&device_error);
            device.set_device_lost_callback(move |reason, message| {
                log::error!("Device lost ({:?}): {}", reason, message);
                *device_error.lock() = Some(BackendError::DeviceLost);
            });
        }

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| {
                BackendError::SurfaceCreationFailed("Surface reports no formats".into())
            })?;

        let present_mode = if options.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let sample_count = if options.antialias {
            let features = adapter.get_texture_format_features(surface_format);
            if features.flags.sample_count_supported(MSAA_SAMPLES) {
                MSAA_SAMPLES
            } else {
                log::warn!("{:?} does not support {}x MSAA", surface_format, MSAA_SAMPLES);
                1
            }
        } else {
            1
        };

        let pixel_ratio = clamp_pixel_ratio(window.scale_factor(), options.max_pixel_ratio);
        let logical = window
            .inner_size()
            .to_logical::<f64>(window.scale_factor());
        let size = (
            (logical.width.round() as u32).max(1),
            (logical.height.round() as u32).max(1),
        );
        let (width, height) = clamp_to_texture_limit(
            (size.0 as f64 * pixel_ratio).round() as u32,
            (size.1 as f64 * pixel_ratio).round() as u32,
            device.limits().max_texture_dimension_2d,
        );

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        log::info!(
            "Surface configured: {}x{} {:?}, {}x MSAA, pixel ratio {}",
            width,
            height,
            surface_format,
            sample_count,
            pixel_ratio
        );

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                uniform_entry(2, wgpu::ShaderStages::VERTEX_FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });

        let camera_buffer = uniform_buffer::<CameraUniformData>(&device, "Camera Buffer");
        let lights_buffer = uniform_buffer::<LightsUniform>(&device, "Lights Buffer");
        let frame_buffer = uniform_buffer::<FrameUniform>(&device, "Frame Buffer");

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let shadow_map = create_shadow_map(&device, 1);
        let point_shadow_map = create_point_shadow_map(&device, 1);
        let frame_bind_group = create_frame_bind_group(
            &device,
            &frame_layout,
            &camera_buffer,
            &lights_buffer,
            &frame_buffer,
            &shadow_map.view,
            &point_shadow_map.cube_view,
            &shadow_sampler,
        );

        let directional_target = create_shadow_target(&device, &shadow_layout, "Directional");
        let cube_face_targets = std::array::from_fn(|face| {
            create_shadow_target(&device, &shadow_layout, &format!("Cube Face {}", face))
        });

        let scene_pipeline = create_scene_pipeline(
            &device,
            &[&frame_layout, &object_layout],
            surface_format,
            sample_count,
        );
        let shadow_pipeline = create_shadow_pipeline(&device, &[&shadow_layout, &object_layout]);
        let line_pipeline =
            create_line_pipeline(&device, &[&frame_layout], surface_format, sample_count);

        let targets = create_targets(&device, &surface_config, sample_count);
        let egui = EguiPainter::new(&device, surface_format);

        Ok(Self {
            instance,
            surface,
            device,
            queue,
            surface_config,
            options,
            sample_count,
            size,
            pixel_ratio,
            device_error,
            scene_pipeline,
            shadow_pipeline,
            line_pipeline,
            frame_layout,
            object_layout,
            camera_buffer,
            lights_buffer,
            frame_buffer,
            shadow_sampler,
            frame_bind_group,
            directional_target,
            cube_face_targets,
            shadow_map,
            point_shadow_map,
            line_buffer: None,
            gpu_meshes: Vec::new(),
            gpu_objects: Vec::new(),
            targets,
            egui,
        })
    }

    /// Web-specific initialization with WebGL2 default and WebGPU fallback
    #[cfg(target_arch = "wasm32")]
    async fn init_web(
        window: Arc<winit::window::Window>,
    ) -> BackendResult<(
        wgpu::Instance,
        wgpu::Surface<'static>,
        wgpu::Adapter,
        wgpu::Device,
        wgpu::Queue,
    )> {
        log::info!("Trying WebGL2 backend...");
        match Self::try_init_backend(
            window.clone(),
            wgpu::Backends::GL,
            wgpu::Limits::downlevel_webgl2_defaults(),
            "WebGL2",
        )
        .await
        {
            Ok(result) => return Ok(result),
            Err(err) => log::warn!("WebGL2 unavailable: {}", err),
        }

        log::info!("Trying WebGPU backend...");
        Self::try_init_backend(
            window,
            wgpu::Backends::BROWSER_WEBGPU,
            wgpu::Limits::default(),
            "WebGPU",
        )
        .await
        .map_err(|_| {
            BackendError::InitializationFailed(
                "Neither WebGL2 nor WebGPU backends could be initialized".into(),
            )
        })
    }

    /// Try to initialize a specific backend
    #[cfg(target_arch = "wasm32")]
    async fn try_init_backend(
        window: Arc<winit::window::Window>,
        backends: wgpu::Backends,
        limits: wgpu::Limits,
        backend_name: &str,
    ) -> BackendResult<(
        wgpu::Instance,
        wgpu::Surface<'static>,
        wgpu::Adapter,
        wgpu::Device,
        wgpu::Queue,
    )> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| BackendError::SurfaceCreationFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| {
                BackendError::InitializationFailed(format!("No {} adapter found", backend_name))
            })?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Found adapter: {} ({:?} backend)",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Showcase Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: limits,
                },
                None,
            )
            .await
            .map_err(|e| BackendError::DeviceCreationFailed(e.to_string()))?;

        Ok((instance, surface, adapter, device, queue))
    }

    /// Native initialization
    #[cfg(not(target_arch = "wasm32"))]
    async fn init_native(
        window: Arc<winit::window::Window>,
    ) -> BackendResult<(
        wgpu::Instance,
        wgpu::Surface<'static>,
        wgpu::Adapter,
        wgpu::Device,
        wgpu::Queue,
    )> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::util::backend_bits_from_env().unwrap_or_else(wgpu::Backends::all),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| BackendError::SurfaceCreationFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| BackendError::InitializationFailed("No suitable adapter found".into()))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?} backend)",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Showcase Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(|e| BackendError::DeviceCreationFailed(e.to_string()))?;

        Ok((instance, surface, adapter, device, queue))
    }

    /// Drawing buffer size actually configured on the surface
    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Queue a UI overlay to be painted by the next render
    pub fn set_overlay(&mut self, frame: OverlayFrame) {
        self.egui.queue_frame(frame);
    }

    /// Reconfigure the surface and targets for the current size and pixel ratio
    fn configure(&mut self) {
        let (width, height) = self.drawing_buffer_size();
        let (width, height) =
            clamp_to_texture_limit(width, height, self.device.limits().max_texture_dimension_2d);

        if (width, height) == self.surface_size() {
            return;
        }

        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.targets = create_targets(&self.device, &self.surface_config, self.sample_count);
    }

    /// Upload meshes and object buffers added since the last frame
    fn sync_scene(&mut self, scene: &Scene) {
        for (id, mesh) in scene.meshes.iter().enumerate().skip(self.gpu_meshes.len()) {
            self.gpu_meshes.push(upload_mesh(&self.device, id, mesh));
        }

        while self.gpu_objects.len() < scene.objects.len() {
            let buffer = uniform_buffer::<ObjectUniform>(
                &self.device,
                &format!("Object Buffer {}", self.gpu_objects.len()),
            );
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Object Bind Group"),
                layout: &self.object_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            self.gpu_objects.push(GpuObject { buffer, bind_group });
        }

        for (object, gpu) in scene.objects.iter().zip(&self.gpu_objects) {
            let uniform = ObjectUniform::new(object, scene.materials.get(object.material_id));
            self.queue
                .write_buffer(&gpu.buffer, 0, bytemuck::bytes_of(&uniform));
        }
    }

    /// Make sure the shadow map matches the requested resolution
    fn ensure_shadow_map(&mut self, size: u32) {
        let size = size.clamp(1, self.device.limits().max_texture_dimension_2d);
        if self.shadow_map.size == size {
            return;
        }

        self.shadow_map = create_shadow_map(&self.device, size);
        self.rebuild_frame_bind_group();
    }

    /// Make sure the point shadow cube matches the requested face resolution
    fn ensure_point_shadow_map(&mut self, size: u32) {
        let size = size.clamp(1, self.device.limits().max_texture_dimension_2d);
        if self.point_shadow_map.size == size {
            return;
        }

        log::debug!("Point shadow cube resized to {}x{}", size, size);
        self.point_shadow_map = create_point_shadow_map(&self.device, size);
        self.rebuild_frame_bind_group();
    }

    fn rebuild_frame_bind_group(&mut self) {
        self.frame_bind_group = create_frame_bind_group(
            &self.device,
            &self.frame_layout,
            &self.camera_buffer,
            &self.lights_buffer,
            &self.frame_buffer,
            &self.shadow_map.view,
            &self.point_shadow_map.cube_view,
            &self.shadow_sampler,
        );
    }

    fn write_shadow_view(&self, target: &ShadowTarget, view_proj: Mat4) {
        self.queue.write_buffer(
            &target.buffer,
            0,
            bytemuck::bytes_of(&ShadowViewUniform { view_proj }),
        );
    }

    /// Write camera, lights, frame settings and shadow views
    fn write_frame_uniforms(&mut self, scene: &Scene, camera: &Camera) -> ShadowPasses {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&camera.uniform_data()),
        );
        self.queue.write_buffer(
            &self.lights_buffer,
            0,
            bytemuck::bytes_of(&LightsUniform::pack(scene.lights())),
        );

        let (caster, point_caster) = if self.options.shadows {
            (scene.shadow_caster(), scene.point_shadow_caster())
        } else {
            (None, None)
        };

        let mut frame = FrameUniform {
            light_view_proj: Mat4::IDENTITY,
            shadow: Vec4::ZERO,
            point_light: Vec4::ZERO,
            point_shadow: Vec4::ZERO,
            output: Vec4::new(
                if self.surface_config.format.is_srgb() { 0.0 } else { 1.0 },
                0.0,
                0.0,
                0.0,
            ),
        };

        if let Some(light) = caster {
            self.ensure_shadow_map(light.shadow.map_size);
            frame.light_view_proj = directional_shadow_matrix(light);
            frame.shadow = Vec4::new(
                1.0,
                SHADOW_BIAS,
                1.0 / self.shadow_map.size as f32,
                light.shadow.radius,
            );
            self.write_shadow_view(&self.directional_target, frame.light_view_proj);
        }

        if let Some(light) = point_caster {
            self.ensure_point_shadow_map(light.shadow.map_size);
            (frame.point_light, frame.point_shadow) =
                point_shadow_params(light, self.point_shadow_map.size);
            let faces = point_shadow_face_matrices(light.position);
            for (target, view_proj) in self.cube_face_targets.iter().zip(faces) {
                self.write_shadow_view(target, view_proj);
            }
        }

        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));
        ShadowPasses {
            directional: caster.is_some(),
            point: point_caster.is_some(),
        }
    }

    fn write_lines(&mut self, scene: &Scene) -> u32 {
        let lines = scene.helper_lines();
        if lines.is_empty() {
            return 0;
        }

        let bytes: &[u8] = bytemuck::cast_slice(&lines);
        let needs_buffer = self
            .line_buffer
            .as_ref()
            .map_or(true, |(_, capacity)| *capacity < bytes.len() as u64);
        if needs_buffer {
            let capacity = (bytes.len() as u64).next_power_of_two();
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Helper Lines"),
                size: capacity,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.line_buffer = Some((buffer, capacity));
        }

        if let Some((buffer, _)) = &self.line_buffer {
            self.queue.write_buffer(buffer, 0, bytes);
        }
        lines.len() as u32
    }

    /// Render shadow casters into one depth target
    fn depth_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        depth_view: &wgpu::TextureView,
        target: &ShadowTarget,
        scene: &Scene,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.shadow_pipeline);
        pass.set_bind_group(0, &target.bind_group, &[]);

        for (object, gpu) in scene.objects.iter().zip(&self.gpu_objects) {
            if !object.cast_shadow {
                continue;
            }
            let Some(mesh) = self.gpu_meshes.get(object.mesh_id) else {
                continue;
            };
            pass.set_bind_group(1, &gpu.bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    fn main_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        scene: &Scene,
        line_vertices: u32,
    ) {
        let (view, resolve_target) = match &self.targets.msaa_view {
            Some(msaa) => (msaa, Some(surface_view)),
            None => (surface_view, None),
        };

        let bg = scene.background;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: bg.x as f64,
                        g: bg.y as f64,
                        b: bg.z as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.scene_pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for (object, gpu) in scene.objects.iter().zip(&self.gpu_objects) {
            let Some(mesh) = self.gpu_meshes.get(object.mesh_id) else {
                continue;
            };
            pass.set_bind_group(1, &gpu.bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        if line_vertices == 0 {
            return;
        }
        if let Some((buffer, _)) = &self.line_buffer {
            pass.set_pipeline(&self.line_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_vertex_buffer(0, buffer.slice(..));
            pass.draw(0..line_vertices, 0..1);
        }
    }

    fn take_device_error(&self) -> Option<BackendError> {
        self.device_error.lock().take()
    }
}

impl SceneRenderer for WgpuRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera) -> BackendResult<()> {
        if let Some(err) = self.take_device_error() {
            return Err(err);
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring surface texture, skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::Lost) => return Err(BackendError::SurfaceLost),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(BackendError::OutOfMemory),
        };
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.sync_scene(scene);
        let shadows = self.write_frame_uniforms(scene, camera);
        let line_vertices = self.write_lines(scene);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        if shadows.directional {
            self.depth_pass(
                &mut encoder,
                "Shadow Pass",
                &self.shadow_map.view,
                &self.directional_target,
                scene,
            );
        }
        if shadows.point {
            let faces = self.point_shadow_map.face_views.iter();
            for (face_view, target) in faces.zip(&self.cube_face_targets) {
                self.depth_pass(&mut encoder, "Point Shadow Pass", face_view, target, scene);
            }
        }
        self.main_pass(&mut encoder, &surface_view, scene, line_vertices);

        let mut command_buffers = Vec::new();
        if self.egui.has_pending() {
            let screen = overlay_screen(self.surface_size(), self.size);
            command_buffers =
                self.egui
                    .prepare(&self.device, &self.queue, &mut encoder, &screen);
            self.egui.paint(&mut encoder, &surface_view, &screen);
        }

        command_buffers.push(encoder.finish());
        self.queue.submit(command_buffers);
        output.present();

        match self.take_device_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.size = (width, height);
        self.configure();
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        let ratio = clamp_pixel_ratio(ratio, self.options.max_pixel_ratio);
        if ratio == self.pixel_ratio {
            return;
        }
        self.pixel_ratio = ratio;
        self.configure();
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_buffer<T: Pod>(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<T>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn upload_mesh(device: &wgpu::Device, id: usize, mesh: &Mesh) -> GpuMesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("Vertex Buffer {} ({})", id, mesh.name)),
        contents: mesh.vertex_bytes(),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("Index Buffer {} ({})", id, mesh.name)),
        contents: mesh.index_bytes(),
        usage: wgpu::BufferUsages::INDEX,
    });

    GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: mesh.indices.len() as u32,
    }
}

fn create_shadow_map(device: &wgpu::Device, size: u32) -> ShadowMap {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Shadow Map"),
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SHADOW_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });

    ShadowMap {
        size,
        view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
    }
}

fn create_point_shadow_map(device: &wgpu::Device, size: u32) -> PointShadowMap {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Point Shadow Cube"),
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 6,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SHADOW_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });

    let cube_view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Point Shadow Cube View"),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    });
    let face_views = std::array::from_fn(|face| {
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Point Shadow Face"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_array_layer: face as u32,
            array_layer_count: Some(1),
            ..Default::default()
        })
    });

    PointShadowMap {
        size,
        cube_view,
        face_views,
    }
}

/// `(point_light, point_shadow)` frame parameters for a shadow-casting point light
fn point_shadow_params(light: &PointLight, map_size: u32) -> (Vec4, Vec4) {
    (
        light.position.extend(light.shadow.radius),
        Vec4::new(
            1.0,
            POINT_SHADOW_NEAR,
            POINT_SHADOW_FAR,
            2.0 / map_size.max(1) as f32,
        ),
    )
}

fn create_shadow_target(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    name: &str,
) -> ShadowTarget {
    let buffer = uniform_buffer::<ShadowViewUniform>(device, &format!("{} Shadow View", name));
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{} Shadow Bind Group", name)),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    ShadowTarget { buffer, bind_group }
}

fn create_frame_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    camera: &wgpu::Buffer,
    lights: &wgpu::Buffer,
    frame: &wgpu::Buffer,
    shadow_view: &wgpu::TextureView,
    point_shadow_view: &wgpu::TextureView,
    shadow_sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Frame Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: camera.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: lights.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: frame.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(shadow_view),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(shadow_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 5,
                resource: wgpu::BindingResource::TextureView(point_shadow_view),
            },
        ],
    })
}

fn create_targets(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> FrameTargets {
    let size = wgpu::Extent3d {
        width: config.width,
        height: config.height,
        depth_or_array_layers: 1,
    };

    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Buffer"),
        size,
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    let msaa_view = (sample_count > 1).then(|| {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("MSAA Color"),
                size,
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: config.format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    });

    FrameTargets {
        depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
        msaa_view,
    }
}

fn create_scene_pipeline(
    device: &wgpu::Device,
    layouts: &[&wgpu::BindGroupLayout],
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Scene Shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::scene_shader().into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Scene Pipeline Layout"),
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Scene Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            ..Default::default()
        },
        multiview: None,
    })
}

fn create_shadow_pipeline(
    device: &wgpu::Device,
    layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Shadow Shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::shadow_shader().into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Shadow Pipeline Layout"),
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Shadow Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: None,
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: SHADOW_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 2.0,
                clamp: 0.0,
            },
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

fn create_line_pipeline(
    device: &wgpu::Device,
    layouts: &[&wgpu::BindGroupLayout],
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Line Shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::line_shader().into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Line Pipeline Layout"),
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Line Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[LineVertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            ..Default::default()
        },
        multiview: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_to_texture_limit_keeps_aspect() {
        assert_eq!(clamp_to_texture_limit(800, 600, 2048), (800, 600));
        assert_eq!(clamp_to_texture_limit(4096, 2048, 2048), (2048, 1024));
        assert_eq!(clamp_to_texture_limit(0, 0, 2048), (1, 1));
    }

    #[test]
    fn test_pixel_ratio_is_capped() {
        assert_eq!(clamp_pixel_ratio(3.0, 2.0), 2.0);
        assert_eq!(clamp_pixel_ratio(1.5, 2.0), 1.5);
        assert_eq!(clamp_pixel_ratio(1.0, 0.0), MIN_PIXEL_RATIO);
    }

    #[test]
    fn test_shadow_matrix_projects_target_into_view() {
        let mut light = DirectionalLight::new(Vec3::ONE, 0.5);
        light.position = Vec3::new(-5.0, 5.0, 0.0);
        let matrix = directional_shadow_matrix(&light);

        let clip = matrix * light.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_shadow_matrix_handles_vertical_light() {
        let light = DirectionalLight::new(Vec3::ONE, 0.5);
        assert!(directional_shadow_matrix(&light).is_finite());
    }

    fn project(matrix: Mat4, point: Vec3) -> Vec3 {
        let clip = matrix * point.extend(1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn test_cube_faces_match_sampling_orientation() {
        let light = Vec3::new(1.0, 2.0, -3.0);
        let faces = point_shadow_face_matrices(light);

        // Offsets two units along each face axis and where they must land in
        // that face, following the cube sampling convention
        let cases = [
            (0, Vec3::new(2.0, 0.5, 0.4), (-0.2, 0.25)),
            (1, Vec3::new(-2.0, 0.5, 0.4), (0.2, 0.25)),
            (2, Vec3::new(0.4, 2.0, 0.5), (0.2, -0.25)),
            (3, Vec3::new(0.4, -2.0, 0.5), (0.2, 0.25)),
            (4, Vec3::new(0.4, 0.5, 2.0), (0.2, 0.25)),
            (5, Vec3::new(0.4, 0.5, -2.0), (-0.2, 0.25)),
        ];
        for (face, offset, (x, y)) in cases {
            let ndc = project(faces[face], light + offset);
            assert!((ndc.x - x).abs() < 1e-5, "face {face}: x {}", ndc.x);
            assert!((ndc.y - y).abs() < 1e-5, "face {face}: y {}", ndc.y);
            assert!((ndc.z - cube_shadow_depth(2.0)).abs() < 1e-5, "face {face}");
        }
    }

    #[test]
    fn test_cube_shadow_depth_range() {
        assert!(cube_shadow_depth(POINT_SHADOW_NEAR).abs() < 1e-6);
        assert!((cube_shadow_depth(POINT_SHADOW_FAR) - 1.0).abs() < 1e-6);
        assert!(cube_shadow_depth(2.0) < cube_shadow_depth(3.0));
    }

    #[test]
    fn test_point_shadow_params() {
        let mut light = PointLight::new(Vec3::ONE, 0.5, 10.0);
        light.position = Vec3::new(0.0, 2.0, 1.0);
        light.shadow.radius = 3.0;

        let (point_light, point_shadow) = point_shadow_params(&light, 512);
        assert_eq!(point_light, Vec4::new(0.0, 2.0, 1.0, 3.0));
        assert_eq!(point_shadow.x, 1.0);
        assert_eq!(point_shadow.y, POINT_SHADOW_NEAR);
        assert_eq!(point_shadow.z, POINT_SHADOW_FAR);
        assert_eq!(point_shadow.w, 2.0 / 512.0);
    }

    #[test]
    fn test_overlay_fills_capped_buffer_at_higher_native_ratio() {
        // A 3x display with the ratio capped at 2
        let ctx = egui::Context::default();
        let mut input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(1000.0, 600.0),
            )),
            ..Default::default()
        };
        input
            .viewports
            .entry(egui::ViewportId::ROOT)
            .or_default()
            .native_pixels_per_point = Some(3.0);
        let output = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| ui.label("lights"));
        });

        let screen = overlay_screen((2000, 1200), (1000, 600));
        assert_eq!(output.pixels_per_point, 3.0);
        assert_eq!(screen.pixels_per_point, 2.0);

        // The full UI width in points covers exactly the drawing buffer
        let painted = ctx.screen_rect().size() * screen.pixels_per_point;
        assert_eq!(painted.x, screen.size_in_pixels[0] as f32);
        assert_eq!(painted.y, screen.size_in_pixels[1] as f32);
    }

    #[test]
    fn test_uniform_sizes_match_shaders() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 128);
        assert_eq!(std::mem::size_of::<ShadowViewUniform>(), 64);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 160);
    }
}
