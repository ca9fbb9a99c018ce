// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod utils;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::ViewerConfig;
pub use error::ViewerError;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue, prelude::wasm_bindgen};
#[cfg(target_arch = "wasm32")]
use web_sys::{Window, Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, Event};
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;

#[cfg(target_arch = "wasm32")]
use controller::{FrameScheduler, InputEvent, InputState, KeyBindings};
#[cfg(target_arch = "wasm32")]
use controller::frame_loop::PerformanceClock;
#[cfg(target_arch = "wasm32")]
use view::{GpuContext, GpuFrame, RenderState, ShaderSources, UniformBlock, UniformLayout, UniformSync};


#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();
    let config = ViewerConfig::default();
    let (window, document, canvas) = init_canvas(config.width, config.height)?;
    setup_app(&window, &document, &canvas, config).await
}

/// Main application setup for WASM: load, set up, then hand over to the frame loop
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    config: ViewerConfig,
) -> Result<(), JsValue> {
    let clock = PerformanceClock::new(window).ok_or(js_error("no `performance` on window"))?;
    let layout = &UniformLayout::FRACTAL;
    let uniform_sync = UniformSync::resolve(layout);
    let mut scheduler = FrameScheduler::new(clock, &config, uniform_sync);

    // The one suspension point before the loop: both shader texts
    let sources = ShaderSources::load(&config).await?;

    let gpu = GpuContext::new(canvas, config.width, config.height).await?;
    let mut render_state = RenderState::new(&gpu, &sources).await;
    render_state.egui_dpr = window.device_pixel_ratio() as f32;

    let mut uniforms = UniformBlock::new();
    view::uniforms::write_startup_params(
        &mut uniforms,
        layout,
        &uniform_sync,
        &config,
        gpu.config.width,
        gpu.config.height,
    );

    let input_state = Rc::new(RefCell::new(InputState::new()));
    setup_input_listeners(document, window, canvas, input_state.clone(), KeyBindings::with_step(config.key_step))?;

    scheduler.begin_running();

    let f = RcCellCallback::new(window.clone(), move || {
        // Snapshot: events arriving mid-tick land on the next one
        let input = *input_state.borrow();
        let raw_input = egui_input(&render_state);
        let mut frame = GpuFrame::new(&gpu, &mut render_state, &mut uniforms, raw_input);
        scheduler.tick(&input, &mut frame);
    });
    f.start();

    Ok(())
}

/// Screen rect for the readout overlay, in points
#[cfg(target_arch = "wasm32")]
fn egui_input(render_state: &RenderState) -> egui::RawInput {
    let dpr = render_state.egui_dpr.max(1.0);
    egui::RawInput {
        screen_rect: Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(render_state.width as f32 / dpr, render_state.height as f32 / dpr),
        )),
        ..Default::default()
    }
}

/// Register DOM listeners that feed `InputState`
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    canvas: &HtmlCanvasElement,
    input_state: Rc<RefCell<InputState>>,
    bindings: KeyBindings,
) -> Result<(), JsValue> {
    // Keyboard down
    {
        let input_state = input_state.clone();
        let bindings = bindings.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            if bindings.is_bound(&e.key()) {
                e.prevent_default();
            }
            let event = controller::input::wasm::keyboard_event_to_input(&e, true);
            input_state.borrow_mut().process_event(&event, &bindings);
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let input_state = input_state.clone();
        let bindings = bindings.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let event = controller::input::wasm::keyboard_event_to_input(&e, false);
            input_state.borrow_mut().process_event(&event, &bindings);
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss - release held keys
    {
        let input_state = input_state.clone();
        let bindings = bindings.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            input_state.borrow_mut().process_event(&InputEvent::FocusLost, &bindings);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Mouse down / up toggle look
    for (name, event) in [("mousedown", InputEvent::PointerDown), ("mouseup", InputEvent::PointerUp)] {
        let input_state = input_state.clone();
        let bindings = bindings.clone();
        let handler = Closure::wrap(Box::new(move |_e: MouseEvent| {
            input_state.borrow_mut().process_event(&event, &bindings);
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback(name, handler.as_ref().unchecked_ref())?;
        handler.forget();
    }

    // Mouse move - offset from canvas centre
    {
        let input_state = input_state.clone();
        let canvas_for_rect = canvas.clone();
        let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
            let event = controller::input::wasm::mouse_move_to_input(&e, &canvas_for_rect);
            input_state.borrow_mut().process_event(&event, &bindings);
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
        mm.forget();
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn init_canvas(width: u32, height: u32) -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    canvas_el.set_width(width);
    canvas_el.set_height(height);
    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

/// Self-rescheduling `requestAnimationFrame` loop
#[cfg(target_arch = "wasm32")]
struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RcCellCallback {
    fn new(window: Window, f: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            inner.borrow_mut().as_mut()();

            // Schedule the next tick
            if let Some(cb) = callback_clone.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!("requestAnimationFrame failed: {e:?}");
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(cb) = callback.borrow().as_ref() {
            if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                tracing::error!("requestAnimationFrame failed to start: {e:?}");
            }
        }

        // Leak the closure to keep it alive
        std::mem::forget(callback);
    }
}
