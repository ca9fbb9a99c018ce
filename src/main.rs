use std::sync::Arc;

use winit::{
    event::*,
    event_loop::EventLoop,
    window::Window,
};

// Import from the library crate
use bulbview::{
    logging, view, controller,
    ViewerConfig, ViewerError,
};

use controller::{FrameScheduler, InputState, KeyBindings};
use controller::frame_loop::SystemClock;
use controller::input::native::window_event_to_input;
use view::{GpuContext, GpuFrame, RenderState, ShaderSources, UniformBlock, UniformLayout, UniformSync};

struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,
    uniforms: UniformBlock,
    egui_state: egui_winit::State,

    scheduler: FrameScheduler<SystemClock>,
    uniform_sync: UniformSync,
    input_state: InputState,
    bindings: KeyBindings,
}

impl App {
    async fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self, ViewerError> {
        let layout = &UniformLayout::FRACTAL;
        let uniform_sync = UniformSync::resolve(layout);
        let scheduler = FrameScheduler::new(SystemClock::new(), config, uniform_sync);

        let sources = ShaderSources::load(config).await?;

        let gpu = GpuContext::new_native(window.clone()).await?;
        let mut render_state = RenderState::new(&gpu, &sources).await;
        render_state.egui_dpr = window.scale_factor() as f32;

        let mut uniforms = UniformBlock::new();
        view::uniforms::write_startup_params(
            &mut uniforms,
            layout,
            &uniform_sync,
            config,
            gpu.config.width,
            gpu.config.height,
        );

        let egui_state = egui_winit::State::new(
            render_state.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        Ok(Self {
            window,
            gpu,
            render_state,
            uniforms,
            egui_state,
            scheduler,
            uniform_sync,
            input_state: InputState::new(),
            bindings: KeyBindings::with_step(config.key_step),
        })
    }

    fn input(&mut self, event: &WindowEvent) {
        // The overlay is display-only; egui sees events but never consumes them
        let _ = self.egui_state.on_window_event(self.window.as_ref(), event);

        if let Some(input) = window_event_to_input(event, self.window.inner_size()) {
            self.input_state.process_event(&input, &self.bindings);
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gpu.resize(new_size.width, new_size.height);
            self.render_state.width = new_size.width;
            self.render_state.height = new_size.height;
            self.uniform_sync
                .write_resolution(&mut self.uniforms, new_size.width, new_size.height);
        }
    }

    fn redraw(&mut self) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let input = self.input_state;
        let mut frame = GpuFrame::new(&self.gpu, &mut self.render_state, &mut self.uniforms, raw_input);
        self.scheduler.tick(&input, &mut frame);
        if let Some(output) = frame.platform_output.take() {
            self.egui_state.handle_platform_output(&self.window, output);
        }
    }
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), ViewerError> {
    let config = ViewerConfig::from_env();

    let event_loop = EventLoop::new().map_err(|e| ViewerError::Platform(e.to_string()))?;
    let window_attributes = Window::default_attributes()
        .with_title("bulbview")
        .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height));
    let window = event_loop
        .create_window(window_attributes)
        .map_err(|e| ViewerError::Platform(e.to_string()))?;
    let window = Arc::new(window);

    let mut app = pollster::block_on(App::new(window.clone(), &config))?;
    app.scheduler.begin_running();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { ref event, window_id } if window_id == app.window.id() => {
                app.input(event);
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(physical_size) => app.resize(*physical_size),
                    WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                        app.render_state.egui_dpr = *scale_factor as f32;
                    }
                    WindowEvent::RedrawRequested => app.redraw(),
                    _ => {}
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| ViewerError::Platform(e.to_string()))
}
