use super::arcball::ArcballController;
use super::camera::CameraRig;
use super::fps::{FrameRateMonitor, FrameRateSample, FrameRateSummary};
use super::input::{dispatch, Action, InputEvent};
use super::object::{RotationSpace, ViewedObject};
use crate::common::ViewerConfig;
use std::fmt;
use std::time::Instant;

/// Console report produced by the frame rate monitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusLine {
    Window(FrameRateSample),
    Average {
        viewport: na::Vector2<u32>,
        summary: FrameRateSummary,
    },
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLine::Window(sample) => write!(
                f,
                "{} frames in {:.3} sec: {:.3} FPS",
                sample.frames, sample.elapsed, sample.fps
            ),
            StatusLine::Average { viewport, summary } => match summary.average_fps {
                Some(fps) => write!(
                    f,
                    "Average FPS on {}x{} from {} measures: {:.3}",
                    viewport.x, viewport.y, summary.measures, fps
                ),
                None => write!(
                    f,
                    "Average FPS on {}x{}: no complete measure",
                    viewport.x, viewport.y
                ),
            },
        }
    }
}

/// Everything the viewer mutates in response to input: the camera, the
/// object orientation, the arcball drag and the frame rate monitor.
pub struct ViewerSession {
    config: ViewerConfig,
    rig: CameraRig,
    arcball: ArcballController,
    object: ViewedObject,
    fps: FrameRateMonitor,
    wireframe: bool,
    redraw_requested: bool,
    log: slog::Logger,
}

impl ViewerSession {
    pub fn new(log: &slog::Logger, config: ViewerConfig) -> Self {
        let log = log.new(o!("component" => "session"));
        ViewerSession {
            rig: CameraRig::from_config(&log, &config),
            arcball: ArcballController::new(&log),
            object: ViewedObject::default(),
            fps: FrameRateMonitor::new(config.fps_window),
            wireframe: false,
            redraw_requested: true,
            config,
            log,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn object(&self) -> &ViewedObject {
        &self.object
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn is_measuring(&self) -> bool {
        self.fps.is_measuring()
    }

    /// Dispatches `event` and applies the resulting actions. Returns the
    /// average report when the frame rate monitor was switched off.
    pub fn handle_event(&mut self, event: &InputEvent, now: Instant) -> Option<StatusLine> {
        let mut status = None;
        for action in dispatch(event, &self.config) {
            if let Some(line) = self.apply(action, now) {
                status = Some(line);
            }
        }
        status
    }

    pub fn apply(&mut self, action: Action, now: Instant) -> Option<StatusLine> {
        trace!(self.log, "applying {:?}", action);
        match action {
            Action::RotateObject { angle, axis, space } => self.object.rotate(angle, &axis, space),
            Action::TranslateCamera(z) => self.rig.translate(z),
            Action::Dolly(direction) => self.rig.dolly(direction),
            Action::BeginDrag(position) => {
                let viewport = *self.rig.viewport();
                self.arcball.on_pointer_down(&position, &viewport);
            }
            Action::Drag(position) => {
                let viewport = *self.rig.viewport();
                if let Some(rotation) = self.arcball.on_pointer_move(&position, &viewport) {
                    self.object
                        .rotate(rotation.angle, &rotation.axis, RotationSpace::Local);
                    self.redraw_requested = true;
                }
            }
            Action::EndDrag => self.arcball.on_pointer_up(),
            Action::SetViewport(size) => self.rig.set_viewport(&size),
            Action::ToggleWireframe => {
                self.wireframe = !self.wireframe;
                info!(self.log, "wireframe {}", if self.wireframe { "on" } else { "off" });
            }
            Action::ToggleFrameRate => {
                let viewport = *self.rig.viewport();
                return self
                    .fps
                    .toggle(now)
                    .map(|summary| StatusLine::Average { viewport, summary });
            }
            Action::Redraw => self.redraw_requested = true,
        }
        None
    }

    /// Records a drawn frame and clears the pending redraw request.
    pub fn frame(&mut self, now: Instant) -> Option<StatusLine> {
        self.redraw_requested = false;
        self.fps.frame(now).map(StatusLine::Window)
    }

    /// Whether another frame should be drawn without waiting for input.
    pub fn wants_redraw(&self) -> bool {
        self.redraw_requested || self.fps.is_measuring()
    }

    pub fn view_proj(&self) -> glm::Mat4 {
        self.rig.camera().view_proj()
    }

    pub fn model(&self) -> glm::Mat4 {
        self.object.model()
    }
}
