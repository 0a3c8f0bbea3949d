//! Frame loop driver
//!
//! Each frame advances the camera controls, renders the scene and asks the
//! host for the next frame slot, in that order. The loop owns everything it
//! touches through [`RenderContext`], so nothing it reads can be dropped
//! while it is running.

use std::sync::Arc;

use thiserror::Error;

use crate::backend::{BackendError, SceneRenderer};
use crate::scene::{Camera, CameraController, Scene};

/// Host primitive that runs the next frame before the next repaint
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// winit turns redraw requests into `requestAnimationFrame` on the web
impl FrameScheduler for Arc<winit::window::Window> {
    fn request_frame(&mut self) {
        self.request_redraw();
    }
}

/// Everything a frame reads: the scene, the camera looking at it and the
/// renderer drawing it
pub struct RenderContext<R> {
    pub scene: Scene,
    pub camera: Camera,
    pub renderer: R,
}

impl<R: SceneRenderer> RenderContext<R> {
    pub fn new(scene: Scene, camera: Camera, renderer: R) -> Self {
        Self {
            scene,
            camera,
            renderer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameLoopError {
    #[error("Frame loop is not running")]
    NotRunning,
    #[error("Render failed: {0}")]
    Render(#[from] BackendError),
}

/// Update the camera projection and renderer output for a new viewport.
///
/// Zero-sized viewports (minimized windows) are ignored. Returns whether the
/// size was applied.
pub fn apply_resize<R: SceneRenderer + ?Sized>(
    camera: &mut Camera,
    renderer: &mut R,
    width: u32,
    height: u32,
) -> bool {
    if width == 0 || height == 0 {
        log::debug!("Ignoring zero-sized viewport {}x{}", width, height);
        return false;
    }

    camera.set_aspect(width as f32 / height as f32);
    camera.update_projection_matrix();
    renderer.set_size(width, height);
    true
}

/// Drives controls update and rendering once per display refresh
pub struct FrameLoop<C, R, S> {
    state: LoopState,
    scheduler: S,
    controls: Option<C>,
    context: Option<RenderContext<R>>,
    frame_count: u64,
    max_frames: Option<u64>,
}

impl<C, R, S> FrameLoop<C, R, S>
where
    C: CameraController,
    R: SceneRenderer,
    S: FrameScheduler,
{
    pub fn new(scheduler: S) -> Self {
        Self {
            state: LoopState::Stopped,
            scheduler,
            controls: None,
            context: None,
            frame_count: 0,
            max_frames: None,
        }
    }

    /// Stop by itself after this many frames
    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Take ownership of the controls and render context and request the
    /// first frame.
    ///
    /// Starting a running loop replaces its context. With a frame limit of
    /// zero the context is kept but the loop stays stopped.
    pub fn start(&mut self, controls: C, context: RenderContext<R>) {
        if self.state == LoopState::Running {
            log::warn!("Frame loop restarted while running");
        }

        log::info!(
            "Starting frame loop with {} controls, {} lights, {} objects",
            controls.name(),
            context.scene.lights().len(),
            context.scene.objects.len()
        );

        self.controls = Some(controls);
        self.context = Some(context);
        self.frame_count = 0;

        if self.max_frames == Some(0) {
            log::info!("Frame limit is zero, not scheduling any frame");
            self.state = LoopState::Stopped;
            return;
        }

        self.state = LoopState::Running;
        self.scheduler.request_frame();
    }

    /// Run one frame: update controls, render, then schedule the next frame.
    ///
    /// A fatal render error stops the loop and is returned. Other render
    /// errors drop the frame and the loop carries on.
    pub fn tick(&mut self) -> Result<(), FrameLoopError> {
        if self.state != LoopState::Running {
            return Err(FrameLoopError::NotRunning);
        }
        let (Some(controls), Some(context)) = (self.controls.as_mut(), self.context.as_mut())
        else {
            return Err(FrameLoopError::NotRunning);
        };

        controls.update(&mut context.camera);

        if let Err(err) = context.renderer.render(&context.scene, &context.camera) {
            if err.is_fatal() {
                self.state = LoopState::Stopped;
                return Err(err.into());
            }
            log::warn!("Dropped frame {}: {}", self.frame_count, err);
        }

        self.frame_count += 1;

        if self.max_frames.is_some_and(|max| self.frame_count >= max) {
            log::info!("Reached frame limit of {}", self.frame_count);
            self.stop();
            return Ok(());
        }

        self.scheduler.request_frame();
        Ok(())
    }

    /// Apply a viewport size change to the camera and renderer
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(context) = self.context.as_mut() {
            if apply_resize(&mut context.camera, &mut context.renderer, width, height) {
                log::info!("Resized to {}x{}", width, height);
            }
        }
    }

    /// Stop the loop. Later ticks do nothing and schedule nothing.
    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            log::info!("Stopping frame loop after {} frames", self.frame_count);
        }
        self.state = LoopState::Stopped;
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Frames rendered since the last `start`
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn context(&self) -> Option<&RenderContext<R>> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut RenderContext<R>> {
        self.context.as_mut()
    }

    pub fn controls_mut(&mut self) -> Option<&mut C> {
        self.controls.as_mut()
    }

    /// Reset the camera to where the controls found it
    pub fn reset_camera(&mut self) {
        if let (Some(controls), Some(context)) = (self.controls.as_mut(), self.context.as_mut()) {
            controls.reset(&mut context.camera);
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Stop the loop and hand back the render context so its resources can
    /// be dropped.
    pub fn into_context(mut self) -> Option<RenderContext<R>> {
        self.stop();
        self.context.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendResult;

    #[derive(Default)]
    struct CountingScheduler(u32);

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&mut self) {
            self.0 += 1;
        }
    }

    struct StillControls;

    impl CameraController for StillControls {
        fn update(&mut self, _camera: &mut Camera) -> bool {
            false
        }

        fn name(&self) -> &'static str {
            "still"
        }

        fn reset(&mut self, _camera: &mut Camera) {}
    }

    #[derive(Default)]
    struct ScriptedRenderer {
        size: (u32, u32),
        renders: u32,
        fail_with: Option<BackendError>,
    }

    impl SceneRenderer for ScriptedRenderer {
        fn render(&mut self, _scene: &Scene, _camera: &Camera) -> BackendResult<()> {
            self.renders += 1;
            match self.fail_with.clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn set_size(&mut self, width: u32, height: u32) {
            self.size = (width, height);
        }

        fn size(&self) -> (u32, u32) {
            self.size
        }

        fn set_pixel_ratio(&mut self, _ratio: f64) {}

        fn pixel_ratio(&self) -> f64 {
            1.0
        }
    }

    fn context(renderer: ScriptedRenderer) -> RenderContext<ScriptedRenderer> {
        RenderContext::new(Scene::new(), Camera::default(), renderer)
    }

    type TestLoop = FrameLoop<StillControls, ScriptedRenderer, CountingScheduler>;

    #[test]
    fn test_start_requests_first_frame() {
        let mut frame_loop = TestLoop::new(CountingScheduler::default());
        assert_eq!(frame_loop.state(), LoopState::Stopped);

        frame_loop.start(StillControls, context(ScriptedRenderer::default()));
        assert!(frame_loop.is_running());
        assert_eq!(frame_loop.scheduler().0, 1);
        assert_eq!(frame_loop.context().unwrap().renderer.renders, 0);
    }

    #[test]
    fn test_tick_before_start() {
        let mut frame_loop = TestLoop::new(CountingScheduler::default());
        assert_eq!(frame_loop.tick(), Err(FrameLoopError::NotRunning));
        assert_eq!(frame_loop.scheduler().0, 0);
    }

    #[test]
    fn test_transient_error_keeps_running() {
        let renderer = ScriptedRenderer {
            fail_with: Some(BackendError::AcquireImageFailed("timeout".into())),
            ..Default::default()
        };
        let mut frame_loop = TestLoop::new(CountingScheduler::default());
        frame_loop.start(StillControls, context(renderer));

        assert_eq!(frame_loop.tick(), Ok(()));
        assert!(frame_loop.is_running());
        assert_eq!(frame_loop.scheduler().0, 2);
    }

    #[test]
    fn test_fatal_error_stops_loop() {
        let renderer = ScriptedRenderer {
            fail_with: Some(BackendError::DeviceLost),
            ..Default::default()
        };
        let mut frame_loop = TestLoop::new(CountingScheduler::default());
        frame_loop.start(StillControls, context(renderer));

        assert_eq!(
            frame_loop.tick(),
            Err(FrameLoopError::Render(BackendError::DeviceLost))
        );
        assert_eq!(frame_loop.state(), LoopState::Stopped);
        // No reschedule after a fatal error
        assert_eq!(frame_loop.scheduler().0, 1);
        assert_eq!(frame_loop.tick(), Err(FrameLoopError::NotRunning));
    }

    #[test]
    fn test_max_frames() {
        let mut frame_loop =
            TestLoop::new(CountingScheduler::default()).with_max_frames(Some(2));
        frame_loop.start(StillControls, context(ScriptedRenderer::default()));

        frame_loop.tick().unwrap();
        assert!(frame_loop.is_running());
        frame_loop.tick().unwrap();
        assert!(!frame_loop.is_running());
        assert_eq!(frame_loop.frame_count(), 2);
        // start + first tick; the final tick does not reschedule
        assert_eq!(frame_loop.scheduler().0, 2);
    }

    #[test]
    fn test_zero_max_frames_never_renders() {
        let mut frame_loop =
            TestLoop::new(CountingScheduler::default()).with_max_frames(Some(0));
        frame_loop.start(StillControls, context(ScriptedRenderer::default()));

        assert!(!frame_loop.is_running());
        assert_eq!(frame_loop.scheduler().0, 0);
        assert_eq!(frame_loop.tick(), Err(FrameLoopError::NotRunning));
        assert_eq!(frame_loop.context().unwrap().renderer.renders, 0);
        assert_eq!(frame_loop.frame_count(), 0);
    }

    #[test]
    fn test_zero_size_resize_is_ignored() {
        let mut camera = Camera::default();
        let mut renderer = ScriptedRenderer::default();
        assert!(apply_resize(&mut camera, &mut renderer, 800, 600));
        assert!(!apply_resize(&mut camera, &mut renderer, 0, 600));
        assert!(!apply_resize(&mut camera, &mut renderer, 800, 0));

        assert_eq!(renderer.size, (800, 600));
        assert_eq!(camera.aspect, 800.0 / 600.0);
    }

    #[test]
    fn test_into_context_stops() {
        let mut frame_loop = TestLoop::new(CountingScheduler::default());
        frame_loop.start(StillControls, context(ScriptedRenderer::default()));
        frame_loop.tick().unwrap();

        let context = frame_loop.into_context().unwrap();
        assert_eq!(context.renderer.renders, 1);
    }
}
