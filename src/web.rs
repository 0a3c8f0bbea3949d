//! Browser entry point
//!
//! Appends a full-window canvas to the page, initializes the renderer
//! asynchronously (WebGL2 first, then WebGPU) and hands the event loop to the
//! browser.

use std::sync::Arc;

use wasm_bindgen::prelude::*;
use winit::{
    dpi::LogicalSize,
    event::Event,
    event_loop::{ControlFlow, EventLoop},
    platform::web::{EventLoopExtWebSys, WindowExtWebSys},
    window::{Window, WindowBuilder},
};

use crate::{init_web_logging, Showcase, ShowcaseConfig, WgpuRenderer};

/// Browser viewport size in CSS pixels
fn viewport_size() -> Option<(u32, u32)> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some(((width as u32).max(1), (height as u32).max(1)))
}

/// Append the window's canvas to `container_id`, or to the body if there is
/// no such element
fn attach_canvas(window: &Window, container_id: &str) -> Result<(), JsValue> {
    let canvas = window
        .canvas()
        .ok_or_else(|| JsValue::from_str("Window has no canvas"))?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let container: web_sys::Element = match document.get_element_by_id(container_id) {
        Some(element) => element,
        None => document
            .body()
            .ok_or_else(|| JsValue::from_str("No body"))?
            .into(),
    };
    container.append_child(&canvas)?;

    let style = canvas.style();
    style.set_property("display", "block")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    Ok(())
}

#[wasm_bindgen(start)]
pub fn main() {
    init_web_logging();
    log::info!("=== Light Showcase ===");
    wasm_bindgen_futures::spawn_local(run(ShowcaseConfig::default()));
}

async fn run(config: ShowcaseConfig) {
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {}", err);
            return;
        }
    };

    let (width, height) = viewport_size().unwrap_or((config.width, config.height));
    let window = match WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(width, height))
        .build(&event_loop)
    {
        Ok(window) => Arc::new(window),
        Err(err) => {
            log::error!("Failed to create window: {}", err);
            return;
        }
    };

    if let Err(err) = attach_canvas(&window, "canvas-container") {
        log::error!("Failed to attach canvas: {:?}", err);
        return;
    }

    let renderer = match WgpuRenderer::new_async(Arc::clone(&window), config.renderer_options()).await
    {
        Ok(renderer) => renderer,
        Err(err) => {
            log::error!("Failed to create renderer: {}", err);
            return;
        }
    };
    log::info!("Renderer ready");

    let mut showcase = Showcase::new(window, renderer, &config);
    if !showcase.is_running() {
        log::info!("Frame budget is empty, nothing to render");
        return;
    }

    event_loop.spawn(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Wait);

        if let Event::WindowEvent { event, window_id } = event {
            if window_id == showcase.window().id() && !showcase.handle_window_event(&event) {
                elwt.exit();
            }
        }
    });
}
