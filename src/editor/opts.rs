use crate::foundation::error::{LayerframeError, LayerframeResult};
use crate::geometry::bbox::NORMALIZED_BOX_THRESHOLD;
use crate::history::manager::DEFAULT_HISTORY_LIMIT;
use crate::interaction::machine::DEFAULT_DRAG_THRESHOLD_PX;

/// Tunables for an [`EditorState`](crate::EditorState).
///
/// Every field has a default, so a JSON override file only needs the fields it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorOpts {
    /// Euclidean pointer movement (display px) a press must exceed to become a drag or resize.
    pub drag_threshold_px: f64,
    /// Smallest layer side reachable by resizing, in display px.
    pub min_layer_size_px: f64,
    /// Smallest crop box side, in display px.
    pub min_crop_size_px: f64,
    /// Undo entries kept before the oldest is evicted.
    pub history_limit: usize,
    /// Largest component a document bounding box may have and still be read as normalized.
    pub normalized_box_threshold: f64,
    /// Pick radius around resize handles, in display px.
    pub handle_hit_radius_px: f64,
    /// Side fraction of the centered box a base-image crop starts with.
    pub base_crop_fraction: f64,
    /// Keyboard nudge step and duplicate offset, in display px.
    pub nudge_px: f64,
}

impl Default for EditorOpts {
    fn default() -> Self {
        Self {
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
            min_layer_size_px: 20.0,
            min_crop_size_px: 20.0,
            history_limit: DEFAULT_HISTORY_LIMIT,
            normalized_box_threshold: NORMALIZED_BOX_THRESHOLD,
            handle_hit_radius_px: 8.0,
            base_crop_fraction: 0.6,
            nudge_px: 1.0,
        }
    }
}

impl EditorOpts {
    pub fn from_json(s: &str) -> LayerframeResult<Self> {
        let opts: Self = serde_json::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> LayerframeResult<()> {
        let non_negative = [
            ("drag_threshold_px", self.drag_threshold_px),
            ("min_layer_size_px", self.min_layer_size_px),
            ("min_crop_size_px", self.min_crop_size_px),
            ("handle_hit_radius_px", self.handle_hit_radius_px),
            ("nudge_px", self.nudge_px),
        ];
        for (name, v) in non_negative {
            if !(v.is_finite() && v >= 0.0) {
                return Err(LayerframeError::validation(format!(
                    "{name} must be a non-negative number, got {v}"
                )));
            }
        }
        if self.history_limit == 0 {
            return Err(LayerframeError::validation("history_limit must be >= 1"));
        }
        if !(self.normalized_box_threshold.is_finite() && self.normalized_box_threshold >= 1.0) {
            return Err(LayerframeError::validation(
                "normalized_box_threshold must be >= 1",
            ));
        }
        if !(self.base_crop_fraction > 0.0 && self.base_crop_fraction <= 1.0) {
            return Err(LayerframeError::validation(
                "base_crop_fraction must be in (0, 1]",
            ));
        }
        Ok(())
    }
}
