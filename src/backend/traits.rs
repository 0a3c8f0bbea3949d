//! Core backend abstraction traits
//!
//! [`SceneRenderer`] is the seam between the frame loop and the GPU. The wgpu
//! renderer implements it; tests implement it with recording mocks.

use crate::scene::{Camera, Scene};
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to initialize backend: {0}")]
    InitializationFailed(String),
    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Failed to acquire next image: {0}")]
    AcquireImageFailed(String),
    #[error("Surface lost")]
    SurfaceLost,
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

impl BackendError {
    /// Errors after which the render target can no longer be used.
    ///
    /// The frame loop stops on these instead of retrying.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BackendError::SurfaceLost | BackendError::OutOfMemory | BackendError::DeviceLost
        )
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Renders a scene through a camera into an output surface.
pub trait SceneRenderer {
    /// Draw one frame.
    fn render(&mut self, scene: &Scene, camera: &Camera) -> BackendResult<()>;

    /// Resize the output surface.
    ///
    /// `width` and `height` are logical pixels; the drawing buffer is scaled
    /// by [`pixel_ratio`](Self::pixel_ratio).
    fn set_size(&mut self, width: u32, height: u32);

    /// Logical output size as last passed to [`set_size`](Self::set_size).
    fn size(&self) -> (u32, u32);

    /// Set the device pixel ratio used to size the drawing buffer.
    fn set_pixel_ratio(&mut self, ratio: f64);

    fn pixel_ratio(&self) -> f64;

    /// Drawing buffer size in physical pixels.
    fn drawing_buffer_size(&self) -> (u32, u32) {
        let (width, height) = self.size();
        let ratio = self.pixel_ratio();
        (
            ((width as f64 * ratio).round() as u32).max(1),
            ((height as f64 * ratio).round() as u32).max(1),
        )
    }
}

impl<R: SceneRenderer + ?Sized> SceneRenderer for Box<R> {
    fn render(&mut self, scene: &Scene, camera: &Camera) -> BackendResult<()> {
        (**self).render(scene, camera)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        (**self).set_size(width, height)
    }

    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        (**self).set_pixel_ratio(ratio)
    }

    fn pixel_ratio(&self) -> f64 {
        (**self).pixel_ratio()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRenderer {
        size: (u32, u32),
        ratio: f64,
    }

    impl SceneRenderer for FixedRenderer {
        fn render(&mut self, _scene: &Scene, _camera: &Camera) -> BackendResult<()> {
            Ok(())
        }

        fn set_size(&mut self, width: u32, height: u32) {
            self.size = (width, height);
        }

        fn size(&self) -> (u32, u32) {
            self.size
        }

        fn set_pixel_ratio(&mut self, ratio: f64) {
            self.ratio = ratio;
        }

        fn pixel_ratio(&self) -> f64 {
            self.ratio
        }
    }

    #[test]
    fn test_fatal_errors() {
        assert!(BackendError::SurfaceLost.is_fatal());
        assert!(BackendError::OutOfMemory.is_fatal());
        assert!(BackendError::DeviceLost.is_fatal());
        assert!(!BackendError::AcquireImageFailed("timeout".into()).is_fatal());
    }

    #[test]
    fn test_drawing_buffer_scales_with_pixel_ratio() {
        let mut renderer = FixedRenderer {
            size: (800, 600),
            ratio: 1.0,
        };
        assert_eq!(renderer.drawing_buffer_size(), (800, 600));

        renderer.set_pixel_ratio(2.0);
        assert_eq!(renderer.drawing_buffer_size(), (1600, 1200));
        assert_eq!(renderer.size(), (800, 600));

        renderer.set_pixel_ratio(1.5);
        renderer.set_size(101, 33);
        assert_eq!(renderer.drawing_buffer_size(), (152, 50));
    }
}
