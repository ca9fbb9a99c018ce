/// Platform-agnostic input handling for the fly camera
use glam::Vec2;

/// The six digital movement controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    Ascend,
    Descend,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::Forward,
        Control::Backward,
        Control::StrafeLeft,
        Control::StrafeRight,
        Control::Ascend,
        Control::Descend,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// `KeyboardEvent.key` naming, e.g. `"w"`, `" "`, `"Shift"`
    KeyDown(String),
    KeyUp(String),

    PointerDown,
    PointerUp,
    /// Pointer offset from the centre of the rendering surface, in device pixels
    PointerMove { offset: Vec2 },

    FocusLost,
}

/// Signed offset of `pos` from the centre of a `width` x `height` surface.
pub fn pointer_offset(pos: Vec2, width: f32, height: f32) -> Vec2 {
    pos - Vec2::new(width, height) * 0.5
}

/// Maps key names to controls, with the step each held key contributes.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    table: [(Control, &'static str); 6],
    pub step: f64,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::with_step(0.1)
    }
}

impl KeyBindings {
    pub fn with_step(step: f64) -> Self {
        Self {
            table: [
                (Control::Forward, "w"),
                (Control::Backward, "s"),
                (Control::StrafeLeft, "a"),
                (Control::StrafeRight, "d"),
                (Control::Ascend, " "),
                (Control::Descend, "Shift"),
            ],
            step,
        }
    }

    /// Exact `KeyboardEvent.key` match; `"W"` is not `"w"`.
    pub fn control_for(&self, key: &str) -> Option<Control> {
        self.table
            .iter()
            .find(|(_, bound)| *bound == key)
            .map(|(control, _)| *control)
    }

    pub fn key_for(&self, control: Control) -> &'static str {
        self.table[control.slot()].1
    }

    pub fn is_bound(&self, key: &str) -> bool {
        self.control_for(key).is_some()
    }
}

/// Snapshot-able state of every monitored control.
///
/// Written only by event callbacks; the frame loop reads a copy per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputState {
    controls: [f64; 6],
    pub look_enabled: bool,
    pub mouse_offset: Vec2,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            controls: [0.0; 6],
            look_enabled: false,
            mouse_offset: Vec2::ZERO,
        }
    }

    /// Process an input event and update state. Unbound keys are dropped.
    pub fn process_event(&mut self, event: &InputEvent, bindings: &KeyBindings) {
        match event {
            InputEvent::KeyDown(key) => {
                if let Some(control) = bindings.control_for(key) {
                    self.controls[control.slot()] = bindings.step;
                }
            }
            InputEvent::KeyUp(key) => {
                if let Some(control) = bindings.control_for(key) {
                    self.controls[control.slot()] = 0.0;
                }
            }
            InputEvent::PointerDown => self.look_enabled = true,
            InputEvent::PointerUp => self.look_enabled = false,
            InputEvent::PointerMove { offset } => {
                // Not a delta: the last offset is held until the next move
                self.mouse_offset = *offset;
            }
            InputEvent::FocusLost => self.clear_controls(),
        }
    }

    pub fn value(&self, control: Control) -> f64 {
        self.controls[control.slot()]
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.value(control) != 0.0
    }

    pub fn clear_controls(&mut self) {
        self.controls = [0.0; 6];
    }

    /// `forward - backward`
    pub fn forward_axis(&self) -> f64 {
        self.value(Control::Forward) - self.value(Control::Backward)
    }

    /// `left - right`
    pub fn strafe_axis(&self) -> f64 {
        self.value(Control::StrafeLeft) - self.value(Control::StrafeRight)
    }

    /// `up - down`
    pub fn vertical_axis(&self) -> f64 {
        self.value(Control::Ascend) - self.value(Control::Descend)
    }
}

pub mod wasm {
    use super::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    /// Pointer offset from the canvas centre, using the canvas rect at event time.
    pub fn mouse_move_to_input(e: &MouseEvent, canvas: &HtmlCanvasElement) -> InputEvent {
        let rect = canvas.get_bounding_client_rect();
        let pos = Vec2::new(
            (e.client_x() as f64 - rect.left()) as f32,
            (e.client_y() as f64 - rect.top()) as f32,
        );
        InputEvent::PointerMove {
            offset: pointer_offset(pos, rect.width() as f32, rect.height() as f32),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use winit::event::{ElementState, WindowEvent};
    use winit::keyboard::{Key, NamedKey};

    /// Translate a winit logical key into the DOM key naming the bindings use.
    pub fn key_name(key: &Key) -> Option<String> {
        match key {
            Key::Character(s) => Some(s.to_string()),
            Key::Named(NamedKey::Space) => Some(" ".to_string()),
            Key::Named(NamedKey::Shift) => Some("Shift".to_string()),
            _ => None,
        }
    }

    /// Window events the viewer cares about; everything else maps to `None`.
    pub fn window_event_to_input(
        event: &WindowEvent,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> Option<InputEvent> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let key = key_name(&event.logical_key)?;
                Some(match event.state {
                    ElementState::Pressed => InputEvent::KeyDown(key),
                    ElementState::Released => InputEvent::KeyUp(key),
                })
            }
            WindowEvent::MouseInput { state, .. } => Some(match state {
                ElementState::Pressed => InputEvent::PointerDown,
                ElementState::Released => InputEvent::PointerUp,
            }),
            WindowEvent::CursorMoved { position, .. } => Some(InputEvent::PointerMove {
                offset: pointer_offset(
                    Vec2::new(position.x as f32, position.y as f32),
                    size.width as f32,
                    size.height as f32,
                ),
            }),
            WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
            _ => None,
        }
    }
}
