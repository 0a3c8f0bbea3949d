//! Frame loop integration tests.
//!
//! Drives [`FrameLoop`] with recording controls, renderer and scheduler that
//! write into one shared log, so the order of calls inside a frame can be
//! checked without a window or GPU.
//!
//! ```bash
//! cargo test --test frame_loop
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use rstest::rstest;

use light_showcase::backend::{BackendError, BackendResult, SceneRenderer};
use light_showcase::scene::{Camera, CameraController, OrbitControls, PointerButton, Scene};
use light_showcase::showcase::{build_camera, build_controls, build_scene, CAMERA_POSITION};
use light_showcase::{FrameLoop, FrameLoopError, FrameScheduler, LoopState, RenderContext};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Update,
    Render { aspect: f32 },
    Schedule,
    SetSize(u32, u32),
}

type Log = Rc<RefCell<Vec<Call>>>;

struct RecordingControls {
    log: Log,
}

impl CameraController for RecordingControls {
    fn update(&mut self, _camera: &mut Camera) -> bool {
        self.log.borrow_mut().push(Call::Update);
        false
    }

    fn name(&self) -> &'static str {
        "Recording"
    }

    fn reset(&mut self, _camera: &mut Camera) {}
}

struct RecordingRenderer {
    log: Log,
    size: (u32, u32),
    fail_with: Option<BackendError>,
}

impl SceneRenderer for RecordingRenderer {
    fn render(&mut self, _scene: &Scene, camera: &Camera) -> BackendResult<()> {
        self.log.borrow_mut().push(Call::Render {
            aspect: camera.aspect,
        });
        match self.fail_with.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.log.borrow_mut().push(Call::SetSize(width, height));
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

struct RecordingScheduler {
    log: Log,
}

impl FrameScheduler for RecordingScheduler {
    fn request_frame(&mut self) {
        self.log.borrow_mut().push(Call::Schedule);
    }
}

type TestLoop = FrameLoop<RecordingControls, RecordingRenderer, RecordingScheduler>;

fn started_loop(fail_with: Option<BackendError>) -> (TestLoop, Log) {
    let log: Log = Rc::default();
    let (scene, _) = build_scene();
    let renderer = RecordingRenderer {
        log: Rc::clone(&log),
        size: (1, 1),
        fail_with,
    };

    let mut frame_loop = TestLoop::new(RecordingScheduler {
        log: Rc::clone(&log),
    });
    frame_loop.start(
        RecordingControls {
            log: Rc::clone(&log),
        },
        RenderContext::new(scene, build_camera(1280, 720), renderer),
    );
    log.borrow_mut().clear();
    (frame_loop, log)
}

fn camera(frame_loop: &TestLoop) -> &Camera {
    &frame_loop.context().unwrap().camera
}

#[test]
fn test_resize_updates_camera_and_renderer() {
    let (mut frame_loop, log) = started_loop(None);

    frame_loop.on_resize(800, 600);

    let camera = camera(&frame_loop);
    assert!((camera.aspect - 4.0 / 3.0).abs() < 1e-6);
    let expected = Camera::perspective(camera.fov_y_degrees, 800.0 / 600.0, camera.near, camera.far);
    assert_eq!(camera.projection_matrix(), expected.projection_matrix());
    assert_eq!(frame_loop.context().unwrap().renderer.size(), (800, 600));
    assert_eq!(*log.borrow(), vec![Call::SetSize(800, 600)]);
}

#[test]
fn test_update_runs_before_render_every_frame() {
    let (mut frame_loop, log) = started_loop(None);

    for _ in 0..3 {
        frame_loop.tick().unwrap();
    }

    let aspect = 1280.0 / 720.0;
    let frame = [Call::Update, Call::Render { aspect }, Call::Schedule];
    let expected: Vec<Call> = frame.iter().cloned().cycle().take(9).collect();
    assert_eq!(*log.borrow(), expected);
    assert_eq!(frame_loop.frame_count(), 3);
}

#[rstest]
#[case(&[(800, 600), (1024, 768), (640, 480)])]
#[case(&[(1920, 1080), (1920, 1080)])]
#[case(&[(300, 900)])]
fn test_last_resize_wins(#[case] sizes: &[(u32, u32)]) {
    let (mut frame_loop, log) = started_loop(None);

    for &(width, height) in sizes {
        frame_loop.on_resize(width, height);
    }
    frame_loop.tick().unwrap();

    let &(width, height) = sizes.last().unwrap();
    let aspect = width as f32 / height as f32;
    assert_eq!(frame_loop.context().unwrap().renderer.size(), (width, height));
    assert!(log.borrow().contains(&Call::Render { aspect }));
}

#[test]
fn test_resize_is_idempotent() {
    let (mut frame_loop, _log) = started_loop(None);

    frame_loop.on_resize(1024, 768);
    let once = camera(&frame_loop).projection_matrix();
    frame_loop.on_resize(1024, 768);
    let twice = camera(&frame_loop).projection_matrix();

    assert_eq!(once, twice);
    assert_eq!(frame_loop.context().unwrap().renderer.size(), (1024, 768));
}

#[test]
fn test_zero_size_resize_keeps_previous_size() {
    let (mut frame_loop, log) = started_loop(None);

    frame_loop.on_resize(800, 600);
    frame_loop.on_resize(0, 0);
    frame_loop.on_resize(0, 600);

    assert_eq!(frame_loop.context().unwrap().renderer.size(), (800, 600));
    assert!((camera(&frame_loop).aspect - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(*log.borrow(), vec![Call::SetSize(800, 600)]);
}

#[test]
fn test_stopped_loop_does_nothing() {
    let (mut frame_loop, log) = started_loop(None);
    frame_loop.tick().unwrap();
    frame_loop.stop();
    log.borrow_mut().clear();

    assert_eq!(frame_loop.tick(), Err(FrameLoopError::NotRunning));
    assert_eq!(frame_loop.state(), LoopState::Stopped);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_lost_device_stops_loop() {
    let (mut frame_loop, log) = started_loop(Some(BackendError::DeviceLost));

    let result = frame_loop.tick();

    assert_eq!(result, Err(FrameLoopError::Render(BackendError::DeviceLost)));
    assert!(!frame_loop.is_running());
    // Update and render happened, nothing was scheduled
    assert_eq!(log.borrow().len(), 2);
    assert!(!log.borrow().contains(&Call::Schedule));
}

fn dragged_controls(damping: bool) -> (Camera, OrbitControls) {
    let camera = build_camera(800, 600);
    let mut controls = if damping {
        build_controls(&camera)
    } else {
        OrbitControls::new(&camera)
    };
    controls.set_viewport_height(600.0);
    controls.pointer_down(PointerButton::Primary, glam::Vec2::new(400.0, 300.0));
    controls.pointer_move(glam::Vec2::new(460.0, 300.0));
    controls.pointer_up(PointerButton::Primary);
    (camera, controls)
}

#[test]
fn test_damping_keeps_camera_moving_after_release() {
    let (mut camera, mut controls) = dragged_controls(true);

    let mut steps = Vec::new();
    for _ in 0..5 {
        let before = camera.position;
        assert!(controls.update(&mut camera));
        steps.push(before.distance(camera.position));
    }

    assert!(steps.windows(2).all(|pair| pair[1] < pair[0]));
    // Orbiting keeps the distance to the target
    assert!((camera.position.length() - CAMERA_POSITION.length()).abs() < 1e-3);
}

#[test]
fn test_without_damping_movement_stops_after_one_update() {
    let (mut camera, mut controls) = dragged_controls(false);

    assert!(controls.update(&mut camera));
    let settled = camera.position;
    assert!(!controls.update(&mut camera));
    // Re-deriving the position from spherical coordinates may move it by rounding
    assert!(camera.position.distance(settled) < 1e-4);
    assert!(settled.distance(CAMERA_POSITION) > 0.1);
}

#[test]
fn test_reset_camera_restores_start() {
    let (mut camera, mut controls) = dragged_controls(true);
    controls.update(&mut camera);
    controls.reset(&mut camera);

    assert_eq!(camera.position, CAMERA_POSITION);
    assert_eq!(camera.target, Vec3::ZERO);
    assert!(!controls.update(&mut camera));
}
