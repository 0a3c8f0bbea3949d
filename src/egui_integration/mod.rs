//! egui GUI integration
//!
//! [`EguiIntegration`] feeds winit input to egui and runs the UI, producing an
//! [`OverlayFrame`]. The renderer paints that frame on top of the scene with
//! [`EguiPainter`].

mod wgpu;

pub use self::wgpu::EguiPainter;

use egui::ViewportId;
use winit::event::WindowEvent;
use winit::window::Window;

/// Tessellated UI ready to be painted
#[derive(Default)]
pub struct OverlayFrame {
    pub paint_jobs: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
}

impl OverlayFrame {
    /// Fold a newer frame into this one.
    ///
    /// Paint jobs are replaced; texture updates accumulate so none are lost
    /// when a frame is skipped.
    pub fn merge(&mut self, newer: OverlayFrame) {
        self.paint_jobs = newer.paint_jobs;
        self.textures_delta.append(newer.textures_delta);
    }
}

/// egui context plus winit input state
pub struct EguiIntegration {
    ctx: egui::Context,
    winit_state: egui_winit::State,
}

impl EguiIntegration {
    pub fn new(window: &Window) -> Self {
        let ctx = egui::Context::default();

        let winit_state = egui_winit::State::new(
            ctx.clone(),
            ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
        );

        Self { ctx, winit_state }
    }

    /// Handle a winit window event. Returns `true` if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    /// Run one UI frame and tessellate the result
    pub fn run(&mut self, window: &Window, ui: impl FnMut(&egui::Context)) -> OverlayFrame {
        let raw_input = self.winit_state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, ui);

        self.winit_state
            .handle_platform_output(window, full_output.platform_output);

        OverlayFrame {
            paint_jobs: self
                .ctx
                .tessellate(full_output.shapes, full_output.pixels_per_point),
            textures_delta: full_output.textures_delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_texture_updates() {
        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| ui.label("lights"));
        });
        // The first frame uploads the font atlas
        assert!(!output.textures_delta.set.is_empty());
        let uploads = output.textures_delta.set.len();

        let mut pending = OverlayFrame {
            paint_jobs: Vec::new(),
            textures_delta: output.textures_delta,
        };
        pending.merge(OverlayFrame::default());

        assert_eq!(pending.textures_delta.set.len(), uploads);
        assert!(pending.paint_jobs.is_empty());
    }
}
