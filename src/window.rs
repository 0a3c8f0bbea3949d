//! Window host using winit
//!
//! [`Showcase`] routes window events to egui, the light panel, the orbit
//! controls and the frame loop. It is shared by the native [`run`] and the
//! web entry point.

use std::sync::Arc;

use glam::Vec2;
use winit::{
    dpi::{LogicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{Key, ModifiersState, NamedKey},
    window::Window,
};

use crate::backend::{SceneRenderer, WgpuRenderer};
use crate::egui_integration::EguiIntegration;
use crate::frame_loop::{FrameLoop, FrameLoopError, RenderContext};
use crate::panel::LightPanel;
use crate::scene::{OrbitControls, PointerButton};
use crate::showcase::{build_camera, build_controls, build_scene};
use crate::ShowcaseConfig;

/// Wheel distance reported by one pixel-delta line
const PIXELS_PER_LINE: f64 = 40.0;

pub type ShowcaseLoop = FrameLoop<OrbitControls, WgpuRenderer, Arc<Window>>;

/// Running showcase bound to one window
pub struct Showcase {
    window: Arc<Window>,
    frame_loop: ShowcaseLoop,
    egui: EguiIntegration,
    panel: LightPanel,
    modifiers: ModifiersState,
    /// Last cursor position in logical pixels
    cursor: Vec2,
}

impl Showcase {
    /// Build the scene, start the frame loop and request the first frame
    pub fn new(window: Arc<Window>, renderer: WgpuRenderer, config: &ShowcaseConfig) -> Self {
        let (width, height) = logical_size(&window, window.inner_size());

        let (scene, _) = build_scene();
        let camera = build_camera(width, height);
        let mut controls = build_controls(&camera);
        controls.set_viewport_height(height as f32);

        let egui = EguiIntegration::new(&window);

        let mut frame_loop = FrameLoop::new(Arc::clone(&window)).with_max_frames(config.max_frames);
        frame_loop.start(controls, RenderContext::new(scene, camera, renderer));
        frame_loop.on_resize(width, height);

        Self {
            window,
            frame_loop,
            egui,
            panel: LightPanel::new(config.show_panel),
            modifiers: ModifiersState::empty(),
            cursor: Vec2::ZERO,
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Whether frames are still being produced
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// Handle one window event. Returns `false` once the host should exit.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        let consumed = self.egui.on_window_event(&self.window, event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                self.frame_loop.stop();
                return false;
            }
            WindowEvent::Resized(size) => {
                self.resize(*size);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                self.resize(self.window.inner_size());
            }
            WindowEvent::RedrawRequested => {
                return self.redraw();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if consumed || event.state != ElementState::Pressed || event.repeat {
                    return true;
                }
                return self.on_key(&event.logical_key);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.on_mouse_button(*state, *button, consumed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position: LogicalPosition<f32> =
                    position.to_logical(self.window.scale_factor());
                self.cursor = Vec2::new(position.x, position.y);
                if let Some(controls) = self.frame_loop.controls_mut() {
                    controls.pointer_move(self.cursor);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if consumed {
                    return true;
                }
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
                if let Some(controls) = self.frame_loop.controls_mut() {
                    controls.wheel(delta_y);
                }
            }
            _ => {}
        }

        true
    }

    fn on_key(&mut self, key: &Key) -> bool {
        match key {
            Key::Named(NamedKey::Escape) => {
                log::info!("Escape pressed, exiting");
                self.frame_loop.stop();
                return false;
            }
            Key::Named(NamedKey::F1) => {
                self.panel.toggle();
            }
            Key::Character(c) if c.eq_ignore_ascii_case("h") => {
                if let Some(context) = self.frame_loop.context_mut() {
                    context.scene.show_helpers = !context.scene.show_helpers;
                    log::info!(
                        "Light helpers {}",
                        if context.scene.show_helpers { "shown" } else { "hidden" }
                    );
                }
            }
            Key::Character(c) if c.eq_ignore_ascii_case("r") => {
                self.frame_loop.reset_camera();
            }
            _ => {}
        }
        true
    }

    fn on_mouse_button(&mut self, state: ElementState, button: MouseButton, consumed: bool) {
        let cursor = self.cursor;
        let shift = self.modifiers.shift_key();
        let Some(controls) = self.frame_loop.controls_mut() else {
            return;
        };

        match (state, button) {
            // Drags that start over the panel belong to egui
            (ElementState::Pressed, _) if consumed => {}
            (ElementState::Pressed, MouseButton::Left) if shift => {
                controls.pointer_down(PointerButton::Secondary, cursor);
            }
            (ElementState::Pressed, MouseButton::Left) => {
                controls.pointer_down(PointerButton::Primary, cursor);
            }
            (ElementState::Pressed, MouseButton::Right) => {
                controls.pointer_down(PointerButton::Secondary, cursor);
            }
            (ElementState::Pressed, MouseButton::Middle) => {
                controls.pointer_down(PointerButton::Middle, cursor);
            }
            // Always release, so a drag ending over the panel does not stick.
            // Shift may have changed since the press.
            (ElementState::Released, MouseButton::Left) => {
                controls.pointer_up(PointerButton::Primary);
                controls.pointer_up(PointerButton::Secondary);
            }
            (ElementState::Released, MouseButton::Right) => {
                controls.pointer_up(PointerButton::Secondary);
            }
            (ElementState::Released, MouseButton::Middle) => {
                controls.pointer_up(PointerButton::Middle);
            }
            _ => {}
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let (width, height) = logical_size(&self.window, size);
        if let Some(context) = self.frame_loop.context_mut() {
            context.renderer.set_pixel_ratio(self.window.scale_factor());
        }
        if let Some(controls) = self.frame_loop.controls_mut() {
            controls.set_viewport_height(height as f32);
        }
        self.frame_loop.on_resize(width, height);
    }

    fn redraw(&mut self) -> bool {
        let Some(context) = self.frame_loop.context() else {
            return false;
        };

        let scene = &context.scene;
        let panel = &mut self.panel;
        let mut edits = Vec::new();
        let overlay = self.egui.run(&self.window, |ctx| {
            edits = panel.show(ctx, scene);
        });

        if let Some(context) = self.frame_loop.context_mut() {
            for edit in &edits {
                if let Err(err) = context.scene.apply_edit(edit) {
                    log::warn!("Ignoring light edit: {}", err);
                }
            }
            context.renderer.set_overlay(overlay);
        }

        match self.frame_loop.tick() {
            Ok(()) => self.frame_loop.is_running(),
            Err(FrameLoopError::NotRunning) => false,
            Err(err) => {
                log::error!("{}", err);
                false
            }
        }
    }
}

fn logical_size(window: &Window, size: PhysicalSize<u32>) -> (u32, u32) {
    let logical = size.to_logical::<f64>(window.scale_factor());
    (logical.width.round() as u32, logical.height.round() as u32)
}

/// Open a window and run the showcase until it is closed.
///
/// # Panics
///
/// Panics if the event loop or window cannot be created.
#[cfg(not(target_arch = "wasm32"))]
pub fn run(config: ShowcaseConfig) -> Result<(), crate::backend::BackendError> {
    use winit::{
        dpi::LogicalSize,
        event::Event,
        event_loop::{ControlFlow, EventLoop},
        window::WindowBuilder,
    };

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .build(&event_loop)
            .expect("Failed to create window"),
    );

    let renderer = WgpuRenderer::new(Arc::clone(&window), config.renderer_options())?;
    let mut showcase = Showcase::new(window, renderer, &config);
    if !showcase.is_running() {
        log::info!("Frame budget is empty, nothing to render");
        return Ok(());
    }

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            if let Event::WindowEvent { event, window_id } = event {
                if window_id == showcase.window().id() && !showcase.handle_window_event(&event) {
                    elwt.exit();
                }
            }
        })
        .expect("Event loop failed");

    Ok(())
}
