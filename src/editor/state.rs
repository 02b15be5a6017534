use std::sync::Arc;

use crate::assets::pending::PendingOps;
use crate::crop::session::{CropSession, CropShape, CropTarget};
use crate::editor::opts::EditorOpts;
use crate::foundation::core::{Rect, Size, Vec2};
use crate::foundation::ids::LayerId;
use crate::geometry::transform::CoordinateTransform;
use crate::history::manager::{HistoryManager, MutationKind};
use crate::interaction::machine::InteractionMachine;
use crate::layers::model::{ImageSource, Layer, LayerFrame, ShapeLayer};
use crate::layers::store::{LayerStore, SceneSnapshot};

/// Display adjustments applied to the base image. Identity values leave it unchanged.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ImageFilters {
    /// Multiplier, `1.0` = unchanged.
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub blur_px: f64,
    pub grayscale: bool,
}

impl Default for ImageFilters {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            blur_px: 0.0,
            grayscale: false,
        }
    }
}

impl ImageFilters {
    /// Non-finite values reset to identity; multipliers and blur stay non-negative.
    pub fn sanitized(self) -> Self {
        let fix = |v: f64, identity: f64| if v.is_finite() { v.max(0.0) } else { identity };
        Self {
            brightness: fix(self.brightness, 1.0),
            contrast: fix(self.contrast, 1.0),
            saturation: fix(self.saturation, 1.0),
            blur_px: fix(self.blur_px, 0.0),
            grayscale: self.grayscale,
        }
    }
}

/// The background photograph every layer is placed over.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BaseImage {
    pub source: ImageSource,
    /// Natural resolution; defines the natural-pixel space of shapes and overlays.
    pub natural_size: Size,
    pub filters: ImageFilters,
}

/// Payload stored in the history log. Each mutation kind snapshots only the subsystem it touches.
#[derive(Clone, Debug, PartialEq)]
pub enum Snapshot {
    /// Layers, paint order and selection.
    Scene(SceneSnapshot),
    /// Base image, its natural size and filters.
    Base(BaseImage),
    /// Base image together with the layers placed on it; a base crop moves both.
    Frame { base: BaseImage, scene: SceneSnapshot },
}

/// Data kept with an in-flight asynchronous request until its result arrives.
#[derive(Clone, Debug)]
pub(crate) enum PendingPayload {
    Crop(CropPlan),
    BackgroundRemoval { original: ImageSource },
    ShapeRaster { shape: ShapeLayer },
    ImageLoad { url: String },
}

/// Everything needed to commit a crop once its raster has been uploaded.
#[derive(Clone, Debug)]
pub(crate) struct CropPlan {
    pub target: CropTarget,
    pub shape: CropShape,
    pub bitmap: Arc<image::RgbaImage>,
    /// New natural-pixel frame for an overlay crop.
    pub frame: Option<Rect>,
    /// Natural-pixel origin of a base crop inside the old base image.
    pub origin: Vec2,
}

/// Pre-gesture state captured on pointer down.
#[derive(Clone, Debug)]
pub(crate) struct GestureContext {
    pub before: SceneSnapshot,
    pub origins: Vec<(LayerId, LayerFrame)>,
}

/// One editing session: the scene, its history, the gesture in progress and pending async work.
///
/// All mutation goes through methods on this type; readers get shared references only.
#[derive(Debug)]
pub struct EditorState {
    pub(crate) opts: EditorOpts,
    pub(crate) store: LayerStore,
    pub(crate) history: HistoryManager<Snapshot>,
    pub(crate) machine: InteractionMachine,
    pub(crate) transform: CoordinateTransform,
    pub(crate) base: BaseImage,
    pub(crate) pending: PendingOps<PendingPayload>,
    pub(crate) gesture: Option<GestureContext>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorOpts::default())
    }
}

impl EditorState {
    pub fn new(opts: EditorOpts) -> Self {
        Self::with_store(opts, LayerStore::new())
    }

    /// Session over an existing store (e.g. one with a deterministic id generator).
    pub fn with_store(opts: EditorOpts, store: LayerStore) -> Self {
        Self {
            history: HistoryManager::new(opts.history_limit),
            machine: InteractionMachine::new(opts.drag_threshold_px),
            transform: CoordinateTransform::identity(Size::ZERO),
            store,
            base: BaseImage::default(),
            pending: PendingOps::new(),
            gesture: None,
            opts,
        }
    }

    pub fn opts(&self) -> &EditorOpts {
        &self.opts
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.store.get(id)
    }

    pub fn history(&self) -> &HistoryManager<Snapshot> {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn interaction(&self) -> &InteractionMachine {
        &self.machine
    }

    pub fn crop_session(&self) -> Option<&CropSession> {
        self.machine.crop()
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    pub fn base_image(&self) -> &BaseImage {
        &self.base
    }

    /// Number of asynchronous requests still awaiting a result.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Rendered canvas size changed. Geometry is stored in native spaces, so nothing else moves.
    pub fn set_display_size(&mut self, display: Size) {
        self.transform.set_display_size(display);
    }

    /// Replace the base image directly with an already decoded bitmap. Recorded as `image-load`.
    pub fn load_base_bitmap(&mut self, url: Option<String>, bitmap: image::RgbaImage) {
        let (w, h) = bitmap.dimensions();
        let mut source = ImageSource::from_bitmap(bitmap);
        source.url = url;
        let before = self.base.clone();
        self.base.source = source;
        self.set_natural_size(Size::new(f64::from(w), f64::from(h)));
        if self.transform.display_size().is_zero_area() {
            self.transform.set_display_size(self.base.natural_size);
        }
        self.record(
            MutationKind::ImageLoad,
            Snapshot::Base(before),
            Snapshot::Base(self.base.clone()),
        );
    }

    pub(crate) fn set_natural_size(&mut self, natural: Size) {
        self.base.natural_size = natural;
        self.transform.set_natural_size(natural);
    }

    pub(crate) fn record(&mut self, kind: MutationKind, before: Snapshot, after: Snapshot) {
        if before == after {
            return;
        }
        self.history.record(kind, before, after);
    }

    /// Record a scene mutation whose pre-state is `before`.
    pub(crate) fn record_scene(&mut self, kind: MutationKind, before: SceneSnapshot) {
        let after = self.store.snapshot();
        self.record(kind, Snapshot::Scene(before), Snapshot::Scene(after));
    }

    pub(crate) fn apply_snapshot(&mut self, snapshot: Snapshot) {
        match snapshot {
            Snapshot::Scene(scene) => self.store.restore(&scene),
            Snapshot::Base(base) => {
                let natural = base.natural_size;
                self.base = base;
                self.transform.set_natural_size(natural);
            }
            Snapshot::Frame { base, scene } => {
                self.apply_snapshot(Snapshot::Base(base));
                self.store.restore(&scene);
            }
        }
    }

    /// Patch resolved data into the live layer and every history snapshot of it.
    pub(crate) fn backfill_layer(&mut self, id: LayerId, mut f: impl FnMut(&mut Layer)) {
        self.store.modify_in_place(id, &mut f);
        self.history.amend(|snap| {
            if let Snapshot::Scene(scene) | Snapshot::Frame { scene, .. } = snap {
                for layer in scene.layers.iter_mut().filter(|l| l.id() == id) {
                    f(layer);
                }
            }
        });
    }
}
