use crate::assets::pending::OpTarget;
use crate::crop::session::CropTarget;
use crate::editor::state::{EditorState, ImageFilters, Snapshot};
use crate::foundation::core::{Size, Vec2};
use crate::foundation::error::LayerframeResult;
use crate::foundation::ids::LayerId;
use crate::history::manager::MutationKind;
use crate::layers::model::{Layer, MoveDelta};
use crate::layers::order::Reorder;
use crate::layers::patch::LayerPatch;

/// One user-level editing request.
#[derive(Clone, Debug)]
pub enum EditorCommand {
    AddLayer(Layer),
    UpdateLayer { id: LayerId, patch: LayerPatch },
    RemoveLayer(LayerId),
    Reorder { id: LayerId, op: Reorder },
    SetVisibility { id: LayerId, visible: bool },
    Select(Option<LayerId>),
    Duplicate(LayerId),
    /// Move the selected layer by whole nudge steps.
    Nudge { dx: i32, dy: i32 },
    SetFilters(ImageFilters),
    SetDisplaySize(Size),
    Undo,
    Redo,
}

/// What a command did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A layer was created.
    Added(LayerId),
    Changed,
    /// Valid request that left the state as it was (e.g. undo with empty history).
    Unchanged,
}

impl EditorState {
    /// Run one command. Any drag or resize in progress is canceled first so the command never
    /// races a half-applied gesture.
    pub fn execute(&mut self, cmd: EditorCommand) -> LayerframeResult<CommandOutcome> {
        if !matches!(cmd, EditorCommand::SetDisplaySize(_)) {
            self.cancel_gesture();
        }
        tracing::debug!(command = cmd.name(), "execute");
        match cmd {
            EditorCommand::AddLayer(layer) => Ok(CommandOutcome::Added(self.add_layer(layer))),
            EditorCommand::UpdateLayer { id, patch } => {
                changed(self.update_layer(id, patch)?)
            }
            EditorCommand::RemoveLayer(id) => {
                self.remove_layer(id)?;
                Ok(CommandOutcome::Changed)
            }
            EditorCommand::Reorder { id, op } => changed(self.reorder(id, op)?),
            EditorCommand::SetVisibility { id, visible } => {
                changed(self.set_visibility(id, visible)?)
            }
            EditorCommand::Select(id) => {
                self.select(id)?;
                Ok(CommandOutcome::Changed)
            }
            EditorCommand::Duplicate(id) => Ok(CommandOutcome::Added(self.duplicate(id)?)),
            EditorCommand::Nudge { dx, dy } => changed(self.nudge(dx, dy)?),
            EditorCommand::SetFilters(filters) => changed(self.set_filters(filters)),
            EditorCommand::SetDisplaySize(size) => {
                self.set_display_size(size);
                Ok(CommandOutcome::Changed)
            }
            EditorCommand::Undo => changed(self.undo()),
            EditorCommand::Redo => changed(self.redo()),
        }
    }

    /// Add a layer frontmost and select it. Recorded as `layer-add`.
    pub fn add_layer(&mut self, layer: impl Into<Layer>) -> LayerId {
        let before = self.store.snapshot();
        let id = self.store.add_layer(layer);
        // Selecting a freshly added id cannot fail.
        let _ = self.store.select_layer(Some(id));
        self.record_scene(MutationKind::LayerAdd, before);
        id
    }

    /// Apply a partial update. Recorded as `layer-edit` when anything changed.
    pub fn update_layer(&mut self, id: LayerId, patch: LayerPatch) -> LayerframeResult<bool> {
        let before = self.store.snapshot();
        let previous = self.store.require(id)?.clone();
        self.store.update_layer(id, patch)?;
        let is_changed = self.store.get(id) != Some(&previous);
        if is_changed {
            self.record_scene(MutationKind::LayerEdit, before);
        }
        Ok(is_changed)
    }

    /// Delete a layer. In-flight work for it is dropped. Recorded as `layer-delete`.
    pub fn remove_layer(&mut self, id: LayerId) -> LayerframeResult<Layer> {
        let before = self.store.snapshot();
        let removed = self.store.remove_layer(id)?;
        if let Some(kind) = self.pending.forget(OpTarget::Layer(id)) {
            tracing::debug!(%id, ?kind, "dropped pending operation of removed layer");
        }
        self.exit_crop_of_layer(id);
        self.record_scene(MutationKind::LayerDelete, before);
        Ok(removed)
    }

    pub fn reorder(&mut self, id: LayerId, op: Reorder) -> LayerframeResult<bool> {
        let before = self.store.snapshot();
        let moved = self.store.reorder(id, op)?;
        if moved {
            self.record_scene(MutationKind::LayerEdit, before);
        }
        Ok(moved)
    }

    pub fn set_visibility(&mut self, id: LayerId, visible: bool) -> LayerframeResult<bool> {
        let before = self.store.snapshot();
        self.store.set_visibility(id, visible)?;
        let is_changed = before.order != *self.store.order();
        if is_changed {
            self.record_scene(MutationKind::LayerEdit, before);
        }
        Ok(is_changed)
    }

    /// Change the single active layer. Selection alone is not an undoable mutation.
    pub fn select(&mut self, id: Option<LayerId>) -> LayerframeResult<()> {
        self.store.select_layer(id)
    }

    /// Copy a layer ten nudge steps down-right, frontmost and selected. Recorded as `layer-add`.
    pub fn duplicate(&mut self, id: LayerId) -> LayerframeResult<LayerId> {
        let before = self.store.snapshot();
        let kind = self.store.require(id)?.kind();
        let step = self.opts.nudge_px.max(1.0) * 10.0;
        let offset = MoveDelta::from_display(kind, Vec2::new(step, step), &self.transform);
        let copy = self.store.duplicate(id, offset)?;
        self.store.select_layer(Some(copy))?;
        self.record_scene(MutationKind::LayerAdd, before);
        Ok(copy)
    }

    /// Move the selected layer (and its group) by `dx, dy` nudge steps through the same path
    /// as a drag. `Ok(false)` without a selection.
    pub fn nudge(&mut self, dx: i32, dy: i32) -> LayerframeResult<bool> {
        let Some(sel) = self.store.selection() else {
            return Ok(false);
        };
        let before = self.store.snapshot();
        let step = self.opts.nudge_px;
        let delta = Vec2::new(f64::from(dx) * step, f64::from(dy) * step);
        self.store.move_layer(
            sel.id,
            MoveDelta::from_display(sel.kind, delta, &self.transform),
        )?;
        let is_changed = self.store.snapshot() != before;
        if is_changed {
            self.record_scene(MutationKind::LayerEdit, before);
        }
        Ok(is_changed)
    }

    /// Replace the base image filters. Recorded as `filter-change`.
    pub fn set_filters(&mut self, filters: ImageFilters) -> bool {
        let filters = filters.sanitized();
        if filters == self.base.filters {
            return false;
        }
        let before = self.base.clone();
        self.base.filters = filters;
        self.record(
            MutationKind::FilterChange,
            Snapshot::Base(before),
            Snapshot::Base(self.base.clone()),
        );
        true
    }

    /// Step back one history entry. `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let Some((kind, snapshot)) = self.history.undo() else {
            return false;
        };
        self.apply_snapshot(snapshot);
        self.history.finish_replay();
        self.exit_stale_crop();
        tracing::debug!(?kind, "undo applied");
        true
    }

    /// Step forward one history entry. `false` when already at the newest entry.
    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let Some((kind, snapshot)) = self.history.redo() else {
            return false;
        };
        self.apply_snapshot(snapshot);
        self.history.finish_replay();
        self.exit_stale_crop();
        tracing::debug!(?kind, "redo applied");
        true
    }

    fn exit_crop_of_layer(&mut self, id: LayerId) {
        let targets_layer = self.machine.crop().is_some_and(|s| {
            s.target() == CropTarget::Overlay(id)
        });
        if targets_layer {
            self.machine.exit_crop();
        }
    }

    /// Leave crop mode when history removed the layer being cropped.
    fn exit_stale_crop(&mut self) {
        if let Some(CropTarget::Overlay(id)) =
            self.machine.crop().map(|s| s.target())
            && !self.store.contains(id)
        {
            self.machine.exit_crop();
        }
    }
}

fn changed(is_changed: bool) -> LayerframeResult<CommandOutcome> {
    Ok(if is_changed {
        CommandOutcome::Changed
    } else {
        CommandOutcome::Unchanged
    })
}

impl EditorCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddLayer(_) => "add_layer",
            Self::UpdateLayer { .. } => "update_layer",
            Self::RemoveLayer(_) => "remove_layer",
            Self::Reorder { .. } => "reorder",
            Self::SetVisibility { .. } => "set_visibility",
            Self::Select(_) => "select",
            Self::Duplicate(_) => "duplicate",
            Self::Nudge { .. } => "nudge",
            Self::SetFilters(_) => "set_filters",
            Self::SetDisplaySize(_) => "set_display_size",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/commands.rs"]
mod tests;
