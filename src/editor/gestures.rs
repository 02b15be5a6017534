use crate::editor::state::{EditorState, GestureContext};
use crate::foundation::core::{Point, Size};
use crate::foundation::ids::LayerId;
use crate::history::manager::MutationKind;
use crate::interaction::hit::{PointerTarget, resolve_pointer_target};
use crate::interaction::machine::{GestureUpdate, Transition};
use crate::layers::model::{LayerFrame, LayerKind, MoveDelta};

impl EditorState {
    /// Primary button pressed at display point `pos`.
    ///
    /// In crop mode the press grabs the crop box (or one of its handles). Otherwise it selects the
    /// layer under the pointer and arms a drag or resize; a press on empty canvas clears the
    /// selection. Any gesture still in progress is canceled first. Crop-mode presses report
    /// [`PointerTarget::Canvas`].
    pub fn pointer_down(&mut self, pos: Point) -> PointerTarget {
        if let Some(session) = self.machine.crop() {
            if let Some(mode) = session.hit(pos, self.opts.handle_hit_radius_px) {
                self.machine.begin_crop_drag(mode, pos);
            }
            return PointerTarget::Canvas;
        }

        self.cancel_gesture();
        let target = resolve_pointer_target(
            &self.store,
            &self.transform,
            pos,
            self.opts.handle_hit_radius_px,
        );
        match target {
            PointerTarget::Canvas => {
                let _ = self.store.select_layer(None);
            }
            PointerTarget::Body(id) => {
                let _ = self.store.select_layer(Some(id));
                self.arm_gesture(id);
                self.machine.begin_drag(id, pos);
            }
            PointerTarget::Handle(id, handle) => {
                let Some(layer) = self.store.get(id) else {
                    return PointerTarget::Canvas;
                };
                let kind = layer.kind();
                let start_rect = layer.display_rect(&self.transform);
                let min = self.opts.min_layer_size_px;
                // Text lives in percent space and can never leave the canvas.
                let bounds =
                    (kind == LayerKind::Text).then(|| self.transform.canvas_display_rect());
                self.arm_gesture(id);
                self.machine.begin_resize(
                    id,
                    handle,
                    pos,
                    start_rect,
                    Size::new(min, min),
                    bounds,
                );
            }
        }
        target
    }

    /// Pointer moved. `pressed` is the live button state; a move with the button already up
    /// finishes the gesture as if it had been released here.
    pub fn pointer_move(&mut self, pos: Point, pressed: bool) -> Transition {
        let t = self.machine.pointer_move(pos, pressed);
        self.apply_transition(t);
        t
    }

    pub fn pointer_up(&mut self, pos: Point) -> Transition {
        let t = self.machine.pointer_up(pos);
        self.apply_transition(t);
        t
    }

    /// Abandon the drag or resize in progress (Escape, lost pointer capture) and restore the
    /// scene exactly as it was at pointer down. Crop sessions are left to [`Self::cancel_crop`].
    pub fn cancel_gesture(&mut self) -> Transition {
        let t = self.machine.cancel();
        self.apply_transition(t);
        t
    }

    fn arm_gesture(&mut self, id: LayerId) {
        let origins = self.store.move_origins(id).unwrap_or_default();
        self.gesture = Some(GestureContext {
            before: self.store.snapshot(),
            origins,
        });
    }

    fn apply_transition(&mut self, t: Transition) {
        match t {
            Transition::None | Transition::CropChanged(_) => {}
            Transition::Preview(update) => self.apply_update(update),
            Transition::Commit(update) => {
                self.apply_update(update);
                if let Some(ctx) = self.gesture.take() {
                    tracing::debug!(target_id = %update.target(), "gesture committed");
                    self.record_scene(MutationKind::LayerEdit, ctx.before);
                }
            }
            Transition::Click(id) => {
                tracing::debug!(%id, "layer clicked");
                self.gesture = None;
            }
            Transition::Canceled(id) => {
                if let Some(ctx) = self.gesture.take() {
                    tracing::debug!(%id, "gesture canceled");
                    self.store.restore(&ctx.before);
                }
            }
        }
        if self.machine.is_idle() {
            self.gesture = None;
        }
    }

    /// Show a drag or resize frame. Transient: only a commit records history.
    fn apply_update(&mut self, update: GestureUpdate) {
        let Some(layer) = self.store.get(update.target()) else {
            return;
        };
        let kind = layer.kind();
        match update {
            GestureUpdate::Move { delta, .. } => {
                let Some(ctx) = &self.gesture else {
                    return;
                };
                let delta = MoveDelta::from_display(kind, delta, &self.transform);
                self.store.translate_from(&ctx.origins, delta);
            }
            GestureUpdate::Resize { target, rect } => {
                let frame = LayerFrame::from_display(kind, rect, &self.transform);
                if let Err(err) = self.store.set_frame(target, frame) {
                    tracing::warn!(%target, %err, "resize frame rejected");
                }
            }
        }
    }
}
