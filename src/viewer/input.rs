use super::camera::DollyDirection;
use super::object::RotationSpace;
use crate::common::ViewerConfig;
use winit::event::{ElementState, MouseScrollDelta, VirtualKeyCode, WindowEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    WheelUp,
    WheelDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(Key),
    Button {
        button: Button,
        state: ButtonState,
        position: na::Point2<f32>,
    },
    Motion(na::Point2<f32>),
    Resize(na::Vector2<u32>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    RotateObject {
        angle: f32,
        axis: glm::Vec3,
        space: RotationSpace,
    },
    TranslateCamera(f32),
    Dolly(DollyDirection),
    BeginDrag(na::Point2<f32>),
    Drag(na::Point2<f32>),
    EndDrag,
    SetViewport(na::Vector2<u32>),
    ToggleWireframe,
    ToggleFrameRate,
    Redraw,
}

/// Maps one input event to the actions it triggers. Has no side effects;
/// the session applies the returned actions in order.
pub fn dispatch(event: &InputEvent, config: &ViewerConfig) -> Vec<Action> {
    let step = config.key_rotation_step;
    match *event {
        InputEvent::Key(key) => {
            let action = match key {
                Key::Up => Action::RotateObject {
                    angle: step,
                    axis: glm::vec3(-1.0, 0.0, 0.0),
                    space: RotationSpace::World,
                },
                Key::Down => Action::RotateObject {
                    angle: step,
                    axis: glm::vec3(1.0, 0.0, 0.0),
                    space: RotationSpace::World,
                },
                Key::Left => Action::RotateObject {
                    angle: step,
                    axis: glm::vec3(0.0, -1.0, 0.0),
                    space: RotationSpace::Local,
                },
                Key::Right => Action::RotateObject {
                    angle: step,
                    axis: glm::vec3(0.0, 1.0, 0.0),
                    space: RotationSpace::Local,
                },
                Key::PageUp => Action::TranslateCamera(-config.key_translation_step),
                Key::PageDown => Action::TranslateCamera(config.key_translation_step),
                Key::Home => Action::ToggleWireframe,
                Key::End => Action::ToggleFrameRate,
            };
            vec![action, Action::Redraw]
        }
        InputEvent::Button {
            button: Button::Primary,
            state,
            position,
        } => match state {
            ButtonState::Down => vec![Action::BeginDrag(position)],
            ButtonState::Up => vec![Action::EndDrag],
        },
        InputEvent::Button {
            button: Button::WheelUp,
            state: ButtonState::Down,
            ..
        } => vec![Action::Dolly(DollyDirection::Closer), Action::Redraw],
        InputEvent::Button {
            button: Button::WheelDown,
            state: ButtonState::Down,
            ..
        } => vec![Action::Dolly(DollyDirection::Away), Action::Redraw],
        InputEvent::Button { .. } => vec![],
        InputEvent::Motion(position) => vec![Action::Drag(position)],
        InputEvent::Resize(size) => vec![Action::SetViewport(size), Action::Redraw],
    }
}

/// Pixel scroll distance counted as one wheel notch.
const PIXELS_PER_NOTCH: f64 = 100.0;

/// Turns winit window events into `InputEvent`s, tracking the cursor so
/// button events carry a position. Pixel scrolling is accumulated until it
/// amounts to whole notches.
#[derive(Debug, Clone, Default)]
pub struct WinitInput {
    cursor: na::Point2<f32>,
    scroll_pixels: f64,
}

impl WinitInput {
    pub fn translate(&mut self, event: &WindowEvent) -> Vec<InputEvent> {
        match event {
            WindowEvent::KeyboardInput { input, .. } if input.state == ElementState::Pressed => {
                let key = match input.virtual_keycode {
                    Some(VirtualKeyCode::Up) => Key::Up,
                    Some(VirtualKeyCode::Down) => Key::Down,
                    Some(VirtualKeyCode::Left) => Key::Left,
                    Some(VirtualKeyCode::Right) => Key::Right,
                    Some(VirtualKeyCode::PageUp) => Key::PageUp,
                    Some(VirtualKeyCode::PageDown) => Key::PageDown,
                    Some(VirtualKeyCode::Home) => Key::Home,
                    Some(VirtualKeyCode::End) => Key::End,
                    _ => return vec![],
                };
                vec![InputEvent::Key(key)]
            }
            WindowEvent::MouseInput {
                state,
                button: winit::event::MouseButton::Left,
                ..
            } => vec![InputEvent::Button {
                button: Button::Primary,
                state: match state {
                    ElementState::Pressed => ButtonState::Down,
                    ElementState::Released => ButtonState::Up,
                },
                position: self.cursor,
            }],
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y.round() as i32,
                    MouseScrollDelta::PixelDelta(offset) => {
                        self.scroll_pixels += offset.y;
                        let whole = (self.scroll_pixels / PIXELS_PER_NOTCH).trunc();
                        self.scroll_pixels -= whole * PIXELS_PER_NOTCH;
                        whole as i32
                    }
                };
                let button = if notches > 0 {
                    Button::WheelUp
                } else {
                    Button::WheelDown
                };
                let position = self.cursor;
                // each notch is a press immediately followed by a release
                (0..notches.unsigned_abs())
                    .flat_map(|_| [ButtonState::Down, ButtonState::Up])
                    .map(|state| InputEvent::Button {
                        button,
                        state,
                        position,
                    })
                    .collect()
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = na::Point2::new(position.x as f32, position.y as f32);
                vec![InputEvent::Motion(self.cursor)]
            }
            WindowEvent::Resized(size) => {
                vec![InputEvent::Resize(na::Vector2::new(size.width, size.height))]
            }
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                vec![InputEvent::Resize(na::Vector2::new(
                    new_inner_size.width,
                    new_inner_size.height,
                ))]
            }
            _ => vec![],
        }
    }
}
