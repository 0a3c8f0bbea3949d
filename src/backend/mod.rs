//! Backend abstraction layer
//!
//! [`SceneRenderer`] is what the frame loop draws through; [`WgpuRenderer`]
//! is the GPU implementation.

pub mod traits;
pub mod types;
pub mod wgpu_backend;

pub use traits::*;
pub use types::*;
pub use wgpu_backend::{RendererOptions, WgpuRenderer};
