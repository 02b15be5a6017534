//! Layerframe is a layer-based frame composition and editing engine.
//!
//! A frame is a base photograph with text, shape and image overlay layers placed over it. The
//! public API is session-oriented:
//!
//! - Create an [`EditorState`] and load a base image or import a [`FrameDocument`]
//! - Drive it with pointer events and [`EditorCommand`]s; every mutation is undoable
//! - Crop, remove backgrounds and rasterize shapes through an [`AssetPipeline`]
//! - Export the scene back to a [`FrameDocument`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod assets;
pub(crate) mod crop;
pub(crate) mod document;
pub(crate) mod editor;
pub(crate) mod geometry;
pub(crate) mod history;
pub(crate) mod interaction;
pub(crate) mod layers;
pub(crate) mod render;

pub use crate::foundation::core::{
    Axis, PERCENT_MAX, PercentRect, Point, Rect, Size, Vec2, clamp_percent, rect_xywh,
};
pub use crate::foundation::error::{LayerframeError, LayerframeResult};
pub use crate::foundation::ids::{LayerId, LayerIdGen};

pub use crate::assets::decode::{decode_image, parse_svg};
pub use crate::assets::pending::{OpKind, OpTarget, OpTicket, PendingOps};
pub use crate::assets::pipeline::{AssetPipeline, InMemoryAssetPipeline, UploadResponse};
pub use crate::assets::shape_raster::{rasterize_shape, raster_size, render_shape, shape_svg};
pub use crate::crop::raster::{PixelRegion, encode_png, rasterize_crop};
pub use crate::crop::session::{CropDragMode, CropSession, CropShape, CropTarget};
pub use crate::document::export::export_document;
pub use crate::document::frame::{
    DocTextEffects, DocTextShadow, ElementLayout, FontWeightValue, FrameDocument, ImageDimensions,
    OverlayElement, OverlayElementKind, OverlayImageRef, TextElement,
};
pub use crate::document::import::{ImportedFrame, import_document};
pub use crate::editor::async_ops::{UploadJob, UrlJob};
pub use crate::editor::commands::{CommandOutcome, EditorCommand};
pub use crate::editor::opts::EditorOpts;
pub use crate::editor::state::{BaseImage, EditorState, ImageFilters, Snapshot};
pub use crate::geometry::bbox::{
    BoundingBox, BoxInterpretation, BoxSpace, NORMALIZED_BOX_THRESHOLD,
};
pub use crate::geometry::transform::CoordinateTransform;
pub use crate::history::manager::{
    DEFAULT_HISTORY_LIMIT, HistoryEntry, HistoryManager, MutationKind,
};
pub use crate::interaction::handles::{ResizeHandle, handles_for, hit_handle};
pub use crate::interaction::hit::{PointerTarget, resolve_pointer_target};
pub use crate::interaction::machine::{
    DEFAULT_DRAG_THRESHOLD_PX, DragGesture, GestureUpdate, InteractionMachine, InteractionState,
    ResizeGesture, Transition,
};
pub use crate::layers::model::{
    Border, BorderStyle, FontStyle, ImageSource, ImageStatus, Layer, LayerFrame, LayerKind,
    MoveDelta, OverlayLayer, ShapeKind, ShapeLayer, TextAlign, TextDecoration, TextEffects,
    TextLayer, TextShadow,
};
pub use crate::layers::order::{LayerOrder, OrderEntry, Reorder};
pub use crate::layers::patch::{LayerPatch, OverlayPatch, ShapePatch, TextPatch};
pub use crate::layers::store::{LayerStore, SceneSnapshot, Selection};
pub use crate::render::paint::{PaintItem, hit_test, paint_list};
