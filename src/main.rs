use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use parallax_hero::cli::Cli;
use parallax_hero::core::{DisplayContext, PointerAdapter, SurfaceRenderer};
use parallax_hero::effect::{Compositor, EffectSettings, FrameParams, PointerFilter};
use parallax_hero::loaders::load_source_images;

// === Constants ===

const FPS_UPDATE_INTERVAL: f32 = 1.0;

// === Type Aliases ===

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

// === Application ===

struct App {
    compositor: Compositor,
    initial_size: (u32, u32),
    window: Option<Arc<Window>>,
    renderer: Option<SurfaceRenderer>,
    pointer: PointerAdapter,
    filter: PointerFilter,
    last_frame_time: Instant,
    frame_count: u32,
    fps_update_timer: f32,
}

impl App {
    fn new(compositor: Compositor, initial_size: (u32, u32)) -> Self {
        let settings = *compositor.settings();
        Self {
            compositor,
            initial_size,
            window: None,
            renderer: None,
            pointer: PointerAdapter::new(initial_size.0, initial_size.1),
            filter: PointerFilter::new(settings.pointer_scale, settings.smoothing),
            last_frame_time: Instant::now(),
            frame_count: 0,
            fps_update_timer: 0.0,
        }
    }

    /// One frame: advance the smoother, recompute the surface, present
    fn tick(&mut self, delta: f32) {
        self.update_fps(delta);

        let raw = self.pointer.ndc();
        let mouse = self.filter.tick(raw);

        if let Some(renderer) = &self.renderer {
            let (width, height) = renderer.dimensions();
            if width == 0 || height == 0 {
                return;
            }

            let ctx = DisplayContext::new(width, height);
            let pixels = self.compositor.render(FrameParams::new(mouse), &ctx);

            // Transient surface errors (lost/outdated) recover on the next frame
            if let Err(e) = renderer.render_pixels(&pixels, width, height) {
                log::error!("Render error: {}", e);
            }
        }
    }

    fn update_fps(&mut self, delta: f32) {
        self.frame_count += 1;
        self.fps_update_timer += delta;

        if self.fps_update_timer >= FPS_UPDATE_INTERVAL {
            let fps = self.frame_count as f32 / self.fps_update_timer;
            log::info!("FPS: {:.1}", fps);
            self.frame_count = 0;
            self.fps_update_timer = 0.0;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window = match event_loop.create_window(
                Window::default_attributes()
                    .with_title("Parallax Hero")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        self.initial_size.0,
                        self.initial_size.1,
                    )),
            ) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let background = self.compositor.settings().background;
            let renderer = match SurfaceRenderer::new(window.clone(), background) {
                Ok(r) => r,
                Err(e) => {
                    log::error!("Failed to initialize presenter: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let size = window.inner_size();
            self.pointer.set_viewport(size.width, size.height);
            self.window = Some(window);
            self.renderer = Some(renderer);
            self.last_frame_time = Instant::now();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
                self.pointer.set_viewport(size.width, size.height);
            }
            WindowEvent::CursorMoved { .. } => self.pointer.process_event(&event),
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta = now.duration_since(self.last_frame_time).as_secs_f32();
                self.last_frame_time = now;

                self.tick(delta);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => EffectSettings::from_path(path)?,
        None => EffectSettings::default(),
    };
    settings.validate()?;
    for warning in settings.warnings() {
        log::warn!("{}", warning);
    }

    // Fail fast: the render loop never starts with partial texture state
    let sources = load_source_images(&cli.color, &cli.depth, cli.alpha.as_deref())?;

    let compositor = Compositor::new(sources, settings);
    let mut app = App::new(compositor, (cli.width, cli.height));

    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
