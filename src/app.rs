use anyhow::Context;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowAttributes},
};

use crate::{
    config::AppConfig,
    error::InitError,
    gfx::{
        camera::CameraManager,
        lighting::LightRig,
        rendering::{render_frame, RenderEngine, SurfaceErrorAction},
        resources::asset_library::{AssetLibrary, SceneAssets},
        scene::{InstanceLayout, Scene, SceneDescription},
        shading::{FrameRecorder, LightingProgram},
    },
    input::{action_for_key, KeyAction},
    performance::{FpsCounter, FrameClock},
};

/// Mutable state shared by input handling and the per-frame update.
pub struct AppContext {
    pub camera_manager: CameraManager,
    pub light_rig: LightRig,
    pub wireframe: bool,
    pub should_close: bool,
    pub focused: bool,
}

impl AppContext {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            camera_manager: CameraManager::from_config(config),
            light_rig: LightRig::forest(),
            wireframe: false,
            should_close: false,
            focused: true,
        }
    }

    /// Movement keys follow the key state; toggles and quit fire once per press.
    pub fn handle_key(&mut self, action: KeyAction, state: ElementState, repeat: bool) {
        if action.is_held() {
            self.camera_manager.process_key(action, state);
            return;
        }
        if state != ElementState::Pressed || repeat {
            return;
        }

        match action {
            KeyAction::ToggleWireframe => {
                self.wireframe = !self.wireframe;
                log::info!("wireframe {}", if self.wireframe { "on" } else { "off" });
            }
            KeyAction::ToggleFlashlight => {
                let on = self.light_rig.toggle_flashlight();
                log::info!("flashlight {}", if on { "on" } else { "off" });
            }
            KeyAction::Quit => self.should_close = true,
            _ => {}
        }
    }

    /// Losing focus drops held keys so the camera does not keep drifting.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.camera_manager.controller.release_all();
        }
    }

    /// Raw mouse motion turns the camera only while the window has focus.
    pub fn handle_mouse_motion(&mut self, delta: (f64, f64)) {
        if self.focused {
            self.camera_manager.process_mouse_motion(delta);
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.camera_manager.update(dt);
    }
}

pub struct WoodlandApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

/// Everything that only exists once the window and GPU are up
struct GpuState {
    window: Arc<Window>,
    render_engine: RenderEngine,
    assets: AssetLibrary,
    scene: Scene,
    recorder: FrameRecorder,
}

struct AppState {
    config: AppConfig,
    pending: Option<(SceneDescription, InstanceLayout)>,
    gpu: Option<GpuState>,
    context: AppContext,
    clock: FrameClock,
    fps: FpsCounter,
    error: Option<anyhow::Error>,
}

impl WoodlandApp {
    /// Validates the scene and scatters its instances. No window is opened
    /// until `run`.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let description = SceneDescription::forest();
        description
            .validate()
            .context("invalid scene description")?;

        let layout = InstanceLayout::from_seed(&description, config.seed);
        log::info!(
            "scene has {} fixed models and {} scattered instances",
            description.fixed.len(),
            layout.total()
        );

        let event_loop = EventLoop::new().map_err(InitError::from)?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                context: AppContext::new(&config),
                config,
                pending: Some((description, layout)),
                gpu: None,
                clock: FrameClock::new(),
                fps: FpsCounter::new(),
                error: None,
            },
        })
    }

    /// Runs the event loop until the window closes. A startup failure inside
    /// the loop is returned here.
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .map_err(InitError::from)?;

        match self.app_state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<GpuState> {
        let (width, height) = self.config.window_size;
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(self.config.title.clone())
                    .with_inner_size(LogicalSize::new(width, height)),
            )
            .map_err(InitError::from)?;
        let window = Arc::new(window);
        grab_cursor(&window);

        let PhysicalSize { width, height } = window.inner_size();
        let render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.config.clear_color,
        ))?;

        let (description, layout) = self
            .pending
            .take()
            .context("scene already loaded")?;

        let mut assets = AssetLibrary::new(&self.config.asset_root);
        let handles = SceneAssets::resolve(&description, |source| {
            assets.load_model(
                render_engine.device(),
                render_engine.queue(),
                render_engine.material_layout(),
                source,
            )
        })?;
        log::info!(
            "loaded {} meshes and {} textures from {}",
            assets.mesh_count(),
            assets.texture_count(),
            assets.root().display()
        );

        let scene = Scene::new(description, layout, handles)?;
        log::info!("scene ready, {} draws per frame", scene.draw_count());
        let recorder = FrameRecorder::new(&LightingProgram::new(), render_engine.object_alignment());

        Ok(GpuState {
            window,
            render_engine,
            assets,
            scene,
            recorder,
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let dt = self.clock.tick();
        self.context.update(dt);

        let (width, height) = gpu.render_engine.get_surface_size();
        gpu.recorder.reset();
        render_frame(
            &mut gpu.recorder,
            &self.context.camera_manager,
            &mut self.context.light_rig,
            &gpu.scene,
            width,
            height,
        );

        match gpu
            .render_engine
            .render(&gpu.recorder, &gpu.assets, self.context.wireframe)
        {
            Ok(()) => {}
            Err(error) => match SurfaceErrorAction::for_error(&error) {
                SurfaceErrorAction::Reconfigure => gpu.render_engine.reconfigure(),
                SurfaceErrorAction::Skip => log::debug!("skipping frame: {error}"),
                SurfaceErrorAction::Fatal => {
                    let error = anyhow::Error::new(error).context("surface acquisition failed");
                    self.fail(event_loop, error);
                    return;
                }
            },
        }

        if let Some(title) = self.fps.frame(&self.config.title) {
            gpu.window.set_title(&title);
        }
    }
}

/// Hides the cursor and keeps it in the window for mouse look.
fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(e) = grabbed {
        log::warn!("could not grab cursor: {e}");
    }
    window.set_cursor_visible(false);
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() || self.error.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(gpu) => {
                self.clock = FrameClock::new();
                self.gpu = Some(gpu);
            }
            Err(error) => self.fail(event_loop, error),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if let Some(action) = action_for_key(key_code) {
                    self.context.handle_key(action, state, repeat);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.context.camera_manager.process_scroll(&delta);
            }
            WindowEvent::Focused(focused) => {
                self.context.set_focused(focused);
                if let (true, Some(gpu)) = (focused, self.gpu.as_ref()) {
                    grab_cursor(&gpu.window);
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.render_engine.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                self.context.should_close = true;
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }

        if self.context.should_close {
            event_loop.exit();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.context.handle_mouse_motion(delta);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.context.should_close {
            event_loop.exit();
            return;
        }
        if let Some(gpu) = self.gpu.as_ref() {
            gpu.window.request_redraw();
        }
    }
}
