//! Light showcase - an interactive viewer for the common real-time light kinds
//!
//! Four meshes over a ground disc are lit by one ambient, hemisphere,
//! directional, point, spot and rect area light. An orbit camera with damping
//! moves around the scene and an egui panel edits every light live.
//!
//! # Features
//! - Forward wgpu renderer with a PCF directional shadow map and MSAA
//! - Damped orbit controls driven once per frame by [`FrameLoop`]
//! - Light helpers (direction lines, spot cones, area outlines)
//! - Native (winit window) and web (WebGL2 / WebGPU canvas) hosts

pub mod backend;
pub mod egui_integration;
pub mod frame_loop;
pub mod panel;
pub mod resources;
pub mod scene;
pub mod showcase;
pub mod window;

#[cfg(not(target_arch = "wasm32"))]
pub mod args;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use backend::{BackendError, RendererOptions, SceneRenderer, WgpuRenderer};
pub use frame_loop::{FrameLoop, FrameLoopError, FrameScheduler, LoopState, RenderContext};
pub use panel::LightPanel;
pub use window::Showcase;

/// Configuration for a showcase run
#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseConfig {
    /// Window title
    pub title: String,
    /// Initial window width in logical pixels
    pub width: u32,
    /// Initial window height in logical pixels
    pub height: u32,
    pub vsync: bool,
    /// 4x MSAA when the surface format supports it
    pub antialias: bool,
    pub shadows: bool,
    /// Upper bound for the device pixel ratio
    pub max_pixel_ratio: f64,
    /// Stop after this many frames
    pub max_frames: Option<u64>,
    /// Whether the light panel starts open
    pub show_panel: bool,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            title: "Light Showcase".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            antialias: true,
            shadows: true,
            max_pixel_ratio: 2.0,
            max_frames: None,
            show_panel: true,
        }
    }
}

impl ShowcaseConfig {
    pub fn renderer_options(&self) -> RendererOptions {
        RendererOptions {
            antialias: self.antialias,
            vsync: self.vsync,
            shadows: self.shadows,
            max_pixel_ratio: self.max_pixel_ratio,
        }
    }
}

// Web initialization helper
#[cfg(target_arch = "wasm32")]
pub fn init_web_logging() {
    // Set up panic hook for better error messages in console
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to initialize logger: {}", err).into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_options_follow_config() {
        let config = ShowcaseConfig {
            antialias: false,
            max_pixel_ratio: 1.5,
            ..ShowcaseConfig::default()
        };
        let options = config.renderer_options();
        assert!(!options.antialias);
        assert!(options.vsync);
        assert!(options.shadows);
        assert_eq!(options.max_pixel_ratio, 1.5);
    }
}
