//! wgpu egui painter
//!
//! Paints [`OverlayFrame`]s with egui-wgpu in a load-op pass over the
//! resolved frame.

use egui_wgpu::ScreenDescriptor;

use super::OverlayFrame;

/// Owns the egui-wgpu renderer and the frame waiting to be painted
pub struct EguiPainter {
    renderer: egui_wgpu::Renderer,
    pending: Option<OverlayFrame>,
}

impl EguiPainter {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        Self {
            renderer: egui_wgpu::Renderer::new(device, format, None, 1),
            pending: None,
        }
    }

    /// Queue a frame for the next render
    pub fn queue_frame(&mut self, frame: OverlayFrame) {
        match self.pending.as_mut() {
            Some(pending) => pending.merge(frame),
            None => self.pending = Some(frame),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Upload textures and buffers for the pending frame.
    ///
    /// Returns command buffers that must be submitted before `encoder`.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        screen: &ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        let Some(frame) = self.pending.as_ref() else {
            return Vec::new();
        };

        for (id, image_delta) in &frame.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        self.renderer
            .update_buffers(device, queue, encoder, &frame.paint_jobs, screen)
    }

    /// Draw the pending frame onto `view`, keeping its contents
    pub fn paint(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        screen: &ScreenDescriptor,
    ) {
        let Some(frame) = self.pending.take() else {
            return;
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .render(&mut render_pass, &frame.paint_jobs, screen);
        }

        for id in &frame.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
