//! Application event loop.
//!
//! [`App`] is the `winit` handler. It owns the [`AppState`] (GPU context,
//! scene, post-processing chain and the idle spin) once the asynchronous
//! setup has finished, and drives it from window events:
//!
//! 1. pointer events go to the orbit controller
//! 2. `Resized` runs [`AppState::resize`]
//! 3. `RedrawRequested` runs [`AppState::tick`] and asks for the next frame
//!
//! On native targets setup blocks on a Tokio runtime. On the web it is spawned
//! on the browser's executor and handed back through a user event.

use std::sync::Arc;

use anyhow::Context as _;
use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    animation::{InteractionMode, Spin},
    config::AppConfig,
    context::Context,
    render::Composer,
    scene::Scene,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Frames rendered since the last report.
#[derive(Debug)]
struct FrameStats {
    frames: u32,
    since: Instant,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frames: 0,
            since: Instant::now(),
        }
    }

    fn frame(&mut self) {
        self.frames += 1;
        let elapsed = self.since.elapsed();
        if elapsed >= STATS_INTERVAL {
            log::debug!(
                "{:.1} frames per second",
                self.frames as f64 / elapsed.as_secs_f64()
            );
            self.frames = 0;
            self.since = Instant::now();
        }
    }
}

/// Everything the running application owns.
#[derive(Debug)]
pub struct AppState {
    pub ctx: Context,
    pub scene: Scene,
    pub composer: Composer,
    pub spin: Spin,
    stats: FrameStats,
    is_surface_configured: bool,
}

impl AppState {
    pub async fn new(window: Arc<Window>, config: &AppConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config).await?;
        let scene = Scene::assemble(&ctx, &config.book).await?;
        let composer = Composer::new(
            &ctx.device,
            &ctx.queue,
            [ctx.config.width, ctx.config.height],
            ctx.config.format,
            config.pixelate,
        );
        let size = ctx.window.inner_size();
        let mut state = Self {
            ctx,
            scene,
            composer,
            spin: Spin::from(&config.book),
            stats: FrameStats::new(),
            is_surface_configured: false,
        };
        state.resize(size.width, size.height);
        Ok(state)
    }

    pub fn is_surface_configured(&self) -> bool {
        self.is_surface_configured
    }

    /// Interaction mode for the coming frame, taken from the drag signal.
    pub fn mode(&self) -> InteractionMode {
        InteractionMode::from_dragging(self.ctx.camera.controller.is_dragging())
    }

    /// Advance the animation by one frame and draw it.
    ///
    /// Does nothing until the surface has been configured with a real size.
    pub fn tick(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.is_surface_configured {
            return Ok(());
        }
        let mode = self.mode();
        if self.spin.tick(&mut self.scene.book.instance.rotation, mode) {
            self.scene.book.write_to_buffer(&self.ctx.queue);
        }
        self.ctx
            .camera
            .controller
            .update(&mut self.ctx.camera.camera);
        self.ctx.write_camera();

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.composer.render(&self.ctx, &self.scene, &view);
        self.ctx.window.pre_present_notify();
        output.present();
        self.stats.frame();
        Ok(())
    }

    /// Keep projection, surface and render targets in line with the viewport.
    ///
    /// Zero-sized viewports (minimised windows) are ignored; repeating the
    /// current size changes nothing once the surface is configured.
    pub fn resize(&mut self, width: u32, height: u32) {
        let current = [self.ctx.config.width, self.ctx.config.height];
        if !needs_configure(self.is_surface_configured, current, [width, height]) {
            return;
        }
        log::debug!("Resizing to {width}x{height}");
        self.ctx.config.width = width;
        self.ctx.config.height = height;
        self.ctx.surface.configure(&self.ctx.device, &self.ctx.config);
        self.is_surface_configured = true;
        self.ctx.projection.resize(width, height);
        self.ctx.camera.controller.set_viewport_height(height);
        self.composer
            .resize(&self.ctx.device, &self.ctx.queue, width, height);
    }

    /// Surface was lost or outdated: configure it again at the window's size.
    fn reconfigure(&mut self) {
        let size = self.ctx.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }
        if size.width == self.ctx.config.width && size.height == self.ctx.config.height {
            self.ctx.surface.configure(&self.ctx.device, &self.ctx.config);
        } else {
            self.resize(size.width, size.height);
        }
    }

    /// Release every GPU resource the application created.
    pub fn dispose(self) {
        self.composer.destroy();
        self.scene.destroy();
        self.ctx.destroy();
        log::info!("GPU resources released");
    }
}

/// Whether a viewport of `requested` size calls for configuring the surface.
fn needs_configure(is_configured: bool, current: [u32; 2], requested: [u32; 2]) -> bool {
    if requested[0] == 0 || requested[1] == 0 {
        return false;
    }
    !is_configured || current != requested
}

/// Events the event loop receives from outside `winit`.
pub enum FlowEvent {
    #[allow(dead_code)]
    Initialized(Box<AppState>),
    #[allow(dead_code)]
    Failed(anyhow::Error),
}

impl std::fmt::Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    config: AppConfig,
    state: Option<AppState>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: AppConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime =
            tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config,
            state: None,
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("Setup failed: {error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Arc<Window>> {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("pixel-book");

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("failed to create a window")?,
        );

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowExtWebSys;

            let document = web_sys::window()
                .and_then(|w| w.document())
                .context("no browser document")?;
            let container = document
                .get_element_by_id(&self.config.scene.container_id)
                .with_context(|| format!("no element with id {}", self.config.scene.container_id))?;
            let canvas = window.canvas().context("the window has no canvas")?;
            let style = canvas.style();
            style
                .set_property("width", "100%")
                .and_then(|_| style.set_property("height", "100%"))
                .map_err(|e| anyhow::anyhow!("could not size the canvas: {e:?}"))?;
            container
                .append_child(&canvas)
                .map_err(|e| anyhow::anyhow!("could not attach the canvas: {e:?}"))?;
        }

        Ok(window)
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = match self.create_window(event_loop) {
            Ok(window) => window,
            Err(e) => return self.fail(event_loop, e),
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let config = self.config.clone();
            match self
                .async_runtime
                .block_on(async move { AppState::new(window, &config).await })
            {
                Ok(state) => {
                    log::info!("Initialized");
                    state.ctx.window.request_redraw();
                    self.state = Some(state);
                }
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let config = self.config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match AppState::new(window, &config).await {
                    Ok(state) => FlowEvent::Initialized(Box::new(state)),
                    Err(e) => FlowEvent::Failed(e),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("The event loop closed before setup finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized(state) => {
                // The canvas may have been sized while setup was running.
                let mut state = *state;
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.ctx.window.request_redraw();
                log::info!("Initialized");
                self.state = Some(state);
            }
            FlowEvent::Failed(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.ctx.camera.controller.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                match state.tick() {
                    Ok(()) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.reconfigure()
                    }
                    Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timed out, skipping frame"),
                    Err(e) => log::error!("Unable to render {e}"),
                }
                state.ctx.window.request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.take() {
            state.dispose();
        }
    }
}

/// Open the window and render the book with the default configuration.
pub fn run() -> anyhow::Result<()> {
    run_with(AppConfig::default())
}

/// Open the window and render the book with `config`.
pub fn run_with(config: AppConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys_log_fallback(&e.to_string());
        }
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    #[allow(unused_mut)]
    let mut app = App::new(&event_loop, config)?;

    #[cfg(not(target_arch = "wasm32"))]
    {
        event_loop.run_app(&mut app)?;
        if let Some(e) = app.error.take() {
            return Err(e);
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(app);
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn web_sys_log_fallback(message: &str) {
    wasm_bindgen::throw_str(&format!("Could not initialize logger: {message}"));
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_start() -> Result<(), JsValue> {
    run().map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

#[cfg(test)]
mod tests {
    use super::needs_configure;

    #[test]
    fn zero_sized_viewport_never_configures() {
        assert!(!needs_configure(false, [1, 1], [0, 0]));
        assert!(!needs_configure(false, [1, 1], [800, 0]));
        assert!(!needs_configure(true, [800, 600], [0, 600]));
    }

    #[test]
    fn first_real_size_configures_even_if_unchanged() {
        // A window that reported 0x0 at setup leaves the config at 1x1.
        assert!(needs_configure(false, [1, 1], [1, 1]));
        assert!(needs_configure(false, [800, 600], [800, 600]));
    }

    #[test]
    fn configured_surface_only_reconfigures_on_change() {
        assert!(!needs_configure(true, [800, 600], [800, 600]));
        assert!(needs_configure(true, [800, 600], [1024, 768]));
    }
}
