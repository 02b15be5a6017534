use crate::crop::session::{CropDragMode, CropSession};
use crate::foundation::core::{Point, Rect, Size, Vec2};
use crate::foundation::ids::LayerId;
use crate::interaction::handles::ResizeHandle;

/// Default movement (display pixels) a press must exceed before it becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 5.0;

/// Pointer press on a layer body that may become a move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragGesture {
    pub target: LayerId,
    pub origin: Point,
    pub current: Point,
}

impl DragGesture {
    /// Total pointer movement since the press, in display pixels.
    pub fn delta(&self) -> Vec2 {
        self.current - self.origin
    }
}

/// Pointer press on a resize handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeGesture {
    pub target: LayerId,
    pub handle: ResizeHandle,
    pub origin: Point,
    pub current: Point,
    /// Layer extent in display pixels when the press started.
    pub start_rect: Rect,
    pub min_size: Size,
    pub bounds: Option<Rect>,
}

impl ResizeGesture {
    pub fn delta(&self) -> Vec2 {
        self.current - self.origin
    }

    /// Display rectangle implied by the current pointer position.
    pub fn proposed_rect(&self) -> Rect {
        self.handle
            .apply(self.start_rect, self.delta(), self.min_size, self.bounds)
    }
}

/// The one interaction in progress.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    PendingDrag(DragGesture),
    Dragging(DragGesture),
    PendingResize(ResizeGesture),
    Resizing(ResizeGesture),
    Cropping(CropSession),
}

impl InteractionState {
    /// Layer targeted by an in-progress drag or resize.
    pub fn target(&self) -> Option<LayerId> {
        match self {
            Self::PendingDrag(g) | Self::Dragging(g) => Some(g.target),
            Self::PendingResize(g) | Self::Resizing(g) => Some(g.target),
            Self::Idle | Self::Cropping(_) => None,
        }
    }

    /// A drag or resize has crossed the threshold and is changing geometry.
    pub fn is_active_gesture(&self) -> bool {
        matches!(self, Self::Dragging(_) | Self::Resizing(_))
    }
}

/// Geometry proposed by a drag or resize.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureUpdate {
    /// Move by `delta` display pixels from the gesture's start.
    Move { target: LayerId, delta: Vec2 },
    /// Resize to `rect` in display pixels.
    Resize { target: LayerId, rect: Rect },
}

impl GestureUpdate {
    pub fn target(&self) -> LayerId {
        match self {
            Self::Move { target, .. } | Self::Resize { target, .. } => *target,
        }
    }
}

/// What the caller should do after feeding an event to the machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    None,
    /// Show transient geometry; nothing is committed.
    Preview(GestureUpdate),
    /// Pointer released after a real drag/resize: commit the final geometry.
    Commit(GestureUpdate),
    /// Pointer released without crossing the threshold on a layer body.
    Click(LayerId),
    /// An active gesture ended without commit; restore the pre-gesture state.
    Canceled(LayerId),
    /// The crop box changed.
    CropChanged(Rect),
}

/// Pointer-driven state machine for drag, resize and crop gestures.
///
/// Pure: it proposes geometry in display pixels and never touches layers itself.
#[derive(Clone, Debug)]
pub struct InteractionMachine {
    state: InteractionState,
    drag_threshold: f64,
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD_PX)
    }
}

impl InteractionMachine {
    pub fn new(drag_threshold: f64) -> Self {
        Self {
            state: InteractionState::Idle,
            drag_threshold: drag_threshold.max(0.0),
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    /// Drop whatever was in progress, reporting a cancel for an active gesture.
    fn reset(&mut self) -> Transition {
        let prev = std::mem::take(&mut self.state);
        match prev {
            InteractionState::Dragging(g) => Transition::Canceled(g.target),
            InteractionState::Resizing(g) => Transition::Canceled(g.target),
            _ => Transition::None,
        }
    }

    /// Press on a layer body. Any previous interaction is fully reset first; the returned
    /// transition reports whether that reset canceled an active gesture.
    pub fn begin_drag(&mut self, target: LayerId, pos: Point) -> Transition {
        let reset = self.reset();
        self.state = InteractionState::PendingDrag(DragGesture {
            target,
            origin: pos,
            current: pos,
        });
        reset
    }

    /// Press on a resize handle of a layer whose display extent is `start_rect`.
    pub fn begin_resize(
        &mut self,
        target: LayerId,
        handle: ResizeHandle,
        pos: Point,
        start_rect: Rect,
        min_size: Size,
        bounds: Option<Rect>,
    ) -> Transition {
        let reset = self.reset();
        self.state = InteractionState::PendingResize(ResizeGesture {
            target,
            handle,
            origin: pos,
            current: pos,
            start_rect,
            min_size,
            bounds,
        });
        reset
    }

    /// Pointer moved. `pressed` is the live primary-button state; a move without the button held
    /// is an implicit release.
    pub fn pointer_move(&mut self, pos: Point, pressed: bool) -> Transition {
        if !pressed {
            return self.pointer_up(pos);
        }
        let threshold = self.drag_threshold;
        match &mut self.state {
            InteractionState::Idle => Transition::None,
            InteractionState::PendingDrag(g) => {
                g.current = pos;
                if g.delta().hypot() > threshold {
                    let g = *g;
                    self.state = InteractionState::Dragging(g);
                    Transition::Preview(GestureUpdate::Move {
                        target: g.target,
                        delta: g.delta(),
                    })
                } else {
                    Transition::None
                }
            }
            InteractionState::Dragging(g) => {
                g.current = pos;
                Transition::Preview(GestureUpdate::Move {
                    target: g.target,
                    delta: g.delta(),
                })
            }
            InteractionState::PendingResize(g) => {
                g.current = pos;
                if g.delta().hypot() > threshold {
                    let g = *g;
                    self.state = InteractionState::Resizing(g);
                    Transition::Preview(GestureUpdate::Resize {
                        target: g.target,
                        rect: g.proposed_rect(),
                    })
                } else {
                    Transition::None
                }
            }
            InteractionState::Resizing(g) => {
                g.current = pos;
                Transition::Preview(GestureUpdate::Resize {
                    target: g.target,
                    rect: g.proposed_rect(),
                })
            }
            InteractionState::Cropping(session) => {
                if session.drag_mode().is_some() {
                    Transition::CropChanged(session.drag_to(pos))
                } else {
                    Transition::None
                }
            }
        }
    }

    /// Pointer released.
    pub fn pointer_up(&mut self, pos: Point) -> Transition {
        match std::mem::take(&mut self.state) {
            InteractionState::Cropping(mut session) => {
                let transition = if session.drag_mode().is_some() {
                    Transition::CropChanged(session.drag_to(pos))
                } else {
                    Transition::None
                };
                session.end_drag();
                self.state = InteractionState::Cropping(session);
                transition
            }
            InteractionState::Idle => Transition::None,
            InteractionState::PendingDrag(g) => Transition::Click(g.target),
            InteractionState::PendingResize(_) => Transition::None,
            InteractionState::Dragging(mut g) => {
                g.current = pos;
                Transition::Commit(GestureUpdate::Move {
                    target: g.target,
                    delta: g.delta(),
                })
            }
            InteractionState::Resizing(mut g) => {
                g.current = pos;
                Transition::Commit(GestureUpdate::Resize {
                    target: g.target,
                    rect: g.proposed_rect(),
                })
            }
        }
    }

    /// Explicit cancel (Escape) or lost pointer capture.
    ///
    /// Drags and resizes are abandoned; inside a crop session only the box drag is dropped, the
    /// session itself stays until [`Self::exit_crop`].
    pub fn cancel(&mut self) -> Transition {
        if let InteractionState::Cropping(session) = &mut self.state {
            session.end_drag();
            return Transition::None;
        }
        self.reset()
    }

    /// Enter crop mode, resetting any gesture in progress.
    pub fn enter_crop(&mut self, session: CropSession) -> Transition {
        let reset = self.reset();
        self.state = InteractionState::Cropping(session);
        reset
    }

    /// Start dragging the crop box. `false` outside crop mode.
    pub fn begin_crop_drag(&mut self, mode: CropDragMode, pos: Point) -> bool {
        match &mut self.state {
            InteractionState::Cropping(session) => {
                session.begin_drag(mode, pos);
                true
            }
            _ => false,
        }
    }

    pub fn crop(&self) -> Option<&CropSession> {
        match &self.state {
            InteractionState::Cropping(session) => Some(session),
            _ => None,
        }
    }

    pub fn crop_mut(&mut self) -> Option<&mut CropSession> {
        match &mut self.state {
            InteractionState::Cropping(session) => Some(session),
            _ => None,
        }
    }

    /// Leave crop mode, handing back the session. `None` outside crop mode.
    pub fn exit_crop(&mut self) -> Option<CropSession> {
        match std::mem::take(&mut self.state) {
            InteractionState::Cropping(session) => Some(session),
            other => {
                self.state = other;
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/machine.rs"]
mod tests;
