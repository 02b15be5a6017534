use std::sync::Arc;

use crate::assets::decode::decode_image;
use crate::assets::pending::{OpKind, OpTarget, OpTicket};
use crate::assets::pipeline::{AssetPipeline, UploadResponse};
use crate::assets::shape_raster::rasterize_shape;
use crate::crop::raster::{PixelRegion, encode_png, rasterize_crop};
use crate::crop::session::{CropDragMode, CropSession, CropShape, CropTarget};
use crate::document::export::export_document;
use crate::document::frame::FrameDocument;
use crate::document::import::import_document;
use crate::editor::state::{BaseImage, CropPlan, EditorState, PendingPayload, Snapshot};
use crate::foundation::core::{Rect, Size, Vec2};
use crate::foundation::error::{LayerframeError, LayerframeResult};
use crate::foundation::ids::LayerId;
use crate::geometry::transform::CoordinateTransform;
use crate::history::manager::MutationKind;
use crate::layers::model::{ImageSource, ImageStatus, Layer, ShapeLayer};

/// Encoded bytes waiting to be handed to [`AssetPipeline::upload`].
#[derive(Clone, Debug)]
pub struct UploadJob {
    pub ticket: OpTicket,
    pub bytes: Vec<u8>,
}

/// Hosted URL to be handed to [`AssetPipeline::remove_background`] or fetched for decoding.
#[derive(Clone, Debug)]
pub struct UrlJob {
    pub ticket: OpTicket,
    pub url: String,
}

fn to_op_target(target: CropTarget) -> OpTarget {
    match target {
        CropTarget::BaseImage => OpTarget::BaseImage,
        CropTarget::Overlay(id) => OpTarget::Layer(id),
    }
}

impl EditorState {
    // ----- crop -----

    /// Enter crop mode for `target`, seeding the box from the target's display extent.
    ///
    /// The base image starts with a centered box covering `base_crop_fraction` of each side; an
    /// overlay starts with its whole extent. The target's image must be decoded.
    pub fn start_crop(&mut self, target: CropTarget) -> LayerframeResult<()> {
        self.cancel_gesture();
        let min = self.opts.min_crop_size_px;
        let session = match target {
            CropTarget::BaseImage => {
                if self.base.source.bitmap.is_none() {
                    return Err(LayerframeError::validation("base image is not loaded"));
                }
                CropSession::for_base_image(
                    self.transform.canvas_display_rect(),
                    self.opts.base_crop_fraction,
                    min,
                )
            }
            CropTarget::Overlay(id) => {
                let layer = self.store.require(id)?;
                let overlay = layer.as_overlay().ok_or_else(|| {
                    LayerframeError::validation(format!("layer {id} is not an overlay"))
                })?;
                if overlay.source.bitmap.is_none() {
                    return Err(LayerframeError::validation(format!(
                        "overlay {id} image is not decoded"
                    )));
                }
                CropSession::for_overlay(id, layer.display_rect(&self.transform), min)
            }
        };
        tracing::debug!(crop_target = ?target, rect = ?session.rect(), "crop started");
        self.machine.enter_crop(session);
        Ok(())
    }

    fn crop_mut(&mut self) -> LayerframeResult<&mut CropSession> {
        self.machine
            .crop_mut()
            .ok_or_else(|| LayerframeError::validation("not in crop mode"))
    }

    /// Propose a new crop box (display px); returns the clamped box actually kept.
    pub fn update_crop_rect(
        &mut self,
        candidate: Rect,
        mode: Option<CropDragMode>,
    ) -> LayerframeResult<Rect> {
        Ok(self.crop_mut()?.update_crop_rect(candidate, mode))
    }

    pub fn set_crop_shape(&mut self, shape: CropShape) -> LayerframeResult<Rect> {
        let session = self.crop_mut()?;
        session.set_shape(shape);
        Ok(session.rect())
    }

    /// Leave crop mode without touching the image. A crop upload still in flight is dropped.
    pub fn cancel_crop(&mut self) -> Option<CropSession> {
        let session = self.machine.exit_crop()?;
        let target = to_op_target(session.target());
        if self.pending.in_flight(target) == Some(OpKind::CropUpload) {
            self.pending.forget(target);
        }
        tracing::debug!(crop_target = ?session.target(), "crop canceled");
        Some(session)
    }

    /// Rasterize the current crop box and issue an upload ticket.
    ///
    /// Nothing is committed yet; the session stays open until [`Self::complete_crop`] succeeds, so
    /// a failed upload can be retried.
    #[tracing::instrument(skip(self))]
    pub fn begin_apply_crop(&mut self) -> LayerframeResult<UploadJob> {
        let session = self
            .machine
            .crop()
            .cloned()
            .ok_or_else(|| LayerframeError::validation("not in crop mode"))?;
        let natural_rect = self.transform.display_to_natural_rect(session.rect());

        let (source, source_space, frame) = match session.target() {
            CropTarget::BaseImage => {
                let bitmap = self
                    .base
                    .source
                    .bitmap
                    .clone()
                    .ok_or_else(|| LayerframeError::validation("base image is not loaded"))?;
                (bitmap, self.transform.canvas_natural_rect(), None)
            }
            CropTarget::Overlay(id) => {
                let overlay = self.store.require(id)?.as_overlay().ok_or_else(|| {
                    LayerframeError::validation(format!("layer {id} is not an overlay"))
                })?;
                let bitmap = overlay.source.bitmap.clone().ok_or_else(|| {
                    LayerframeError::validation(format!("overlay {id} image is not decoded"))
                })?;
                (bitmap, overlay.frame, Some(natural_rect))
            }
        };

        let (bw, bh) = source.dimensions();
        let bitmap_space = Rect::new(0.0, 0.0, f64::from(bw), f64::from(bh));
        let pixel_rect = CoordinateTransform::map_between(natural_rect, source_space, bitmap_space);
        let region = PixelRegion::from_rect(pixel_rect, bw, bh)?;
        let origin = match session.target() {
            CropTarget::BaseImage => {
                let kept = Rect::new(
                    f64::from(region.x),
                    f64::from(region.y),
                    f64::from(region.x + region.width),
                    f64::from(region.y + region.height),
                );
                CoordinateTransform::map_between(kept, bitmap_space, source_space)
                    .origin()
                    .to_vec2()
            }
            CropTarget::Overlay(_) => Vec2::ZERO,
        };
        let cropped = rasterize_crop(&source, region, session.shape());
        let bytes = encode_png(&cropped)?;

        let plan = CropPlan {
            target: session.target(),
            shape: session.shape(),
            bitmap: Arc::new(cropped),
            frame,
            origin,
        };
        let ticket = self.pending.issue(
            OpKind::CropUpload,
            to_op_target(session.target()),
            PendingPayload::Crop(plan),
        );
        tracing::debug!(?region, bytes = bytes.len(), "crop rasterized");
        Ok(UploadJob { ticket, bytes })
    }

    /// Apply the upload result of a crop. Recorded as `crop-apply`.
    ///
    /// `Ok(false)` when the result is stale (superseded, canceled, or its layer deleted). An upload
    /// error is returned unchanged with the crop session still open.
    #[tracing::instrument(skip(self, result), fields(op = ?ticket.target))]
    pub fn complete_crop(
        &mut self,
        ticket: OpTicket,
        result: LayerframeResult<UploadResponse>,
    ) -> LayerframeResult<bool> {
        let Some(PendingPayload::Crop(plan)) = self.take_payload(&ticket) else {
            return Ok(false);
        };
        let uploaded = match result {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(%err, "crop upload failed; session kept for retry");
                return Err(err);
            }
        };
        let source = ImageSource {
            url: Some(uploaded.url),
            bitmap: Some(plan.bitmap.clone()),
            status: ImageStatus::Ready,
        };

        match plan.target {
            CropTarget::BaseImage => {
                let before = Snapshot::Frame {
                    base: self.base.clone(),
                    scene: self.store.snapshot(),
                };
                let (w, h) = plan.bitmap.dimensions();
                self.base.source = source;
                self.set_natural_size(Size::new(f64::from(w), f64::from(h)));
                // Pixel layers stay over the same photo content.
                self.store.shift_pixel_layers(-plan.origin);
                let after = Snapshot::Frame {
                    base: self.base.clone(),
                    scene: self.store.snapshot(),
                };
                self.record(MutationKind::CropApply, before, after);
            }
            CropTarget::Overlay(id) => {
                if !self.store.contains(id) {
                    tracing::warn!(%id, "crop result for deleted layer ignored");
                    return Ok(false);
                }
                let before = self.store.snapshot();
                let frame = plan.frame;
                self.store.modify_in_place(id, |layer| {
                    if let Layer::Overlay(o) = layer {
                        o.source = source;
                        if let Some(frame) = frame {
                            o.frame = frame;
                        }
                    }
                });
                self.record_scene(MutationKind::CropApply, before);
            }
        }

        if self.machine.crop().is_some_and(|s| s.target() == plan.target) {
            self.machine.exit_crop();
        }
        tracing::debug!(shape = ?plan.shape, "crop applied");
        Ok(true)
    }

    /// Crop synchronously against `pipeline`.
    pub fn apply_crop_with(&mut self, pipeline: &mut dyn AssetPipeline) -> LayerframeResult<bool> {
        let job = self.begin_apply_crop()?;
        let result = pipeline.upload(&job.bytes);
        self.complete_crop(job.ticket, result)
    }

    // ----- background removal -----

    /// Issue a background-removal request for an overlay's hosted image.
    pub fn begin_remove_background(&mut self, id: LayerId) -> LayerframeResult<UrlJob> {
        let overlay = self.store.require(id)?.as_overlay().ok_or_else(|| {
            LayerframeError::validation(format!("layer {id} is not an overlay"))
        })?;
        let url = overlay.source.url.clone().ok_or_else(|| {
            LayerframeError::validation(format!("overlay {id} has no hosted image"))
        })?;
        let original = overlay.source.clone();
        let ticket = self.pending.issue(
            OpKind::BackgroundRemoval,
            OpTarget::Layer(id),
            PendingPayload::BackgroundRemoval { original },
        );
        Ok(UrlJob { ticket, url })
    }

    /// Swap in the background-free image, keeping the original for
    /// [`Self::restore_background`]. Recorded as `layer-edit`.
    ///
    /// The new image starts `Pending`; load it with [`Self::begin_load_layer_image`].
    #[tracing::instrument(skip(self, result), fields(op = ?ticket.target))]
    pub fn complete_remove_background(
        &mut self,
        ticket: OpTicket,
        result: LayerframeResult<UploadResponse>,
    ) -> LayerframeResult<bool> {
        let Some(PendingPayload::BackgroundRemoval { original }) = self.take_payload(&ticket)
        else {
            return Ok(false);
        };
        let OpTarget::Layer(id) = ticket.target else {
            return Ok(false);
        };
        let response = match result {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(%id, %err, "background removal failed; original kept");
                return Err(err);
            }
        };
        if !self.store.contains(id) {
            tracing::warn!(%id, "background removal result for deleted layer ignored");
            return Ok(false);
        }
        let before = self.store.snapshot();
        self.store.modify_in_place(id, |layer| {
            if let Layer::Overlay(o) = layer {
                // Removing twice still restores to the very first original.
                let keep = o.pre_removal.take().unwrap_or(original);
                o.pre_removal = Some(keep);
                o.source = ImageSource::from_url(response.url);
                o.background_removed = true;
            }
        });
        self.record_scene(MutationKind::LayerEdit, before);
        Ok(true)
    }

    /// Remove an overlay's background synchronously and load the result through `pipeline`.
    pub fn remove_background_with(
        &mut self,
        id: LayerId,
        pipeline: &mut dyn AssetPipeline,
    ) -> LayerframeResult<bool> {
        let job = self.begin_remove_background(id)?;
        let result = pipeline.remove_background(&job.url);
        if !self.complete_remove_background(job.ticket, result)? {
            return Ok(false);
        }
        self.load_layer_image_with(id, pipeline)?;
        Ok(true)
    }

    /// Put back the image an overlay had before its background was removed. Recorded as
    /// `layer-edit`; `Ok(false)` when there is nothing to restore.
    pub fn restore_background(&mut self, id: LayerId) -> LayerframeResult<bool> {
        let overlay = self.store.require(id)?.as_overlay().ok_or_else(|| {
            LayerframeError::validation(format!("layer {id} is not an overlay"))
        })?;
        if overlay.pre_removal.is_none() {
            return Ok(false);
        }
        self.cancel_gesture();
        self.pending.forget(OpTarget::Layer(id));
        let before = self.store.snapshot();
        self.store.modify_in_place(id, |layer| {
            if let Layer::Overlay(o) = layer
                && let Some(original) = o.pre_removal.take()
            {
                o.source = original;
                o.background_removed = false;
            }
        });
        self.record_scene(MutationKind::LayerEdit, before);
        Ok(true)
    }

    // ----- shape rasterization -----

    /// Rasterize a shape layer to PNG and issue an upload ticket.
    pub fn begin_rasterize_shape(&mut self, id: LayerId) -> LayerframeResult<UploadJob> {
        let shape = self.store.require(id)?.as_shape().cloned().ok_or_else(|| {
            LayerframeError::validation(format!("layer {id} is not a shape"))
        })?;
        if shape.hosted_raster {
            return Err(LayerframeError::validation(format!(
                "shape {id} already has a hosted raster"
            )));
        }
        let bytes = rasterize_shape(&shape)?;
        let ticket = self.pending.issue(
            OpKind::ShapeRaster,
            OpTarget::Layer(id),
            PendingPayload::ShapeRaster { shape },
        );
        Ok(UploadJob { ticket, bytes })
    }

    /// Store the hosted raster URL on the shape.
    ///
    /// Derived data: no history entry is added, the URL is backfilled into recorded snapshots of
    /// the same appearance instead. A shape edited since the request is left alone (`Ok(false)`).
    #[tracing::instrument(skip(self, result), fields(op = ?ticket.target))]
    pub fn complete_rasterize_shape(
        &mut self,
        ticket: OpTicket,
        result: LayerframeResult<UploadResponse>,
    ) -> LayerframeResult<bool> {
        let Some(PendingPayload::ShapeRaster { shape }) = self.take_payload(&ticket) else {
            return Ok(false);
        };
        let url = result?.url;
        let current = self.store.get(shape.id).and_then(Layer::as_shape);
        if !current.is_some_and(|c| same_appearance(c, &shape)) {
            tracing::warn!(id = %shape.id, "shape changed while rasterizing; raster dropped");
            return Ok(false);
        }
        self.backfill_layer(shape.id, |layer| {
            if let Layer::Shape(s) = layer
                && same_appearance(s, &shape)
            {
                s.raster_url = Some(url.clone());
            }
        });
        Ok(true)
    }

    pub fn rasterize_shape_with(
        &mut self,
        id: LayerId,
        pipeline: &mut dyn AssetPipeline,
    ) -> LayerframeResult<bool> {
        let job = self.begin_rasterize_shape(id)?;
        let result = pipeline.upload(&job.bytes);
        self.complete_rasterize_shape(job.ticket, result)
    }

    // ----- image loading -----

    /// Start loading a new base image from `url`.
    pub fn begin_load_base_image(&mut self, url: impl Into<String>) -> UrlJob {
        let url = url.into();
        let ticket = self.pending.issue(
            OpKind::ImageLoad,
            OpTarget::BaseImage,
            PendingPayload::ImageLoad { url: url.clone() },
        );
        UrlJob { ticket, url }
    }

    /// Start decoding an overlay's hosted image.
    pub fn begin_load_layer_image(&mut self, id: LayerId) -> LayerframeResult<UrlJob> {
        let overlay = self.store.require(id)?.as_overlay().ok_or_else(|| {
            LayerframeError::validation(format!("layer {id} is not an overlay"))
        })?;
        let url = overlay.source.url.clone().ok_or_else(|| {
            LayerframeError::validation(format!("overlay {id} has no image url"))
        })?;
        let ticket = self.pending.issue(
            OpKind::ImageLoad,
            OpTarget::Layer(id),
            PendingPayload::ImageLoad { url: url.clone() },
        );
        Ok(UrlJob { ticket, url })
    }

    /// Decode fetched bytes into the ticket's target.
    ///
    /// A fetch or decode failure marks the image `Broken` (the layer stays) and returns a decode
    /// error. A base image that decodes is recorded as `image-load`; an overlay bitmap is derived
    /// data and is backfilled into history like a shape raster.
    #[tracing::instrument(skip(self, fetched), fields(op = ?ticket.target))]
    pub fn complete_load_image(
        &mut self,
        ticket: OpTicket,
        fetched: LayerframeResult<Vec<u8>>,
    ) -> LayerframeResult<bool> {
        let Some(PendingPayload::ImageLoad { url }) = self.take_payload(&ticket) else {
            return Ok(false);
        };
        let decoded = fetched
            .map_err(|e| match e {
                LayerframeError::Decode(_) => e,
                other => LayerframeError::decode(other.to_string()),
            })
            .and_then(|bytes| decode_image(&bytes));

        match (ticket.target, decoded) {
            (OpTarget::BaseImage, Ok(bitmap)) => {
                self.load_base_bitmap(Some(url), bitmap);
                Ok(true)
            }
            (OpTarget::BaseImage, Err(err)) => {
                tracing::warn!(%url, %err, "base image failed to load");
                self.base.source = ImageSource {
                    url: Some(url),
                    bitmap: None,
                    status: ImageStatus::Broken,
                };
                Err(err)
            }
            (OpTarget::Layer(id), decoded) => {
                if !self.store.contains(id) {
                    tracing::warn!(%id, "image for deleted layer ignored");
                    return Ok(false);
                }
                let (bitmap, status) = match &decoded {
                    Ok(bitmap) => (Some(Arc::new(bitmap.clone())), ImageStatus::Ready),
                    Err(_) => (None, ImageStatus::Broken),
                };
                self.backfill_layer(id, |layer| {
                    if let Layer::Overlay(o) = layer
                        && o.source.url.as_deref() == Some(url.as_str())
                    {
                        o.source.bitmap = bitmap.clone();
                        o.source.status = status;
                    }
                });
                match decoded {
                    Ok(_) => Ok(true),
                    Err(err) => {
                        tracing::warn!(%id, %url, %err, "overlay image failed to load");
                        Err(err)
                    }
                }
            }
        }
    }

    pub fn load_base_image_with(
        &mut self,
        url: impl Into<String>,
        pipeline: &mut dyn AssetPipeline,
    ) -> LayerframeResult<bool> {
        let job = self.begin_load_base_image(url);
        let fetched = pipeline.fetch(&job.url);
        self.complete_load_image(job.ticket, fetched)
    }

    pub fn load_layer_image_with(
        &mut self,
        id: LayerId,
        pipeline: &mut dyn AssetPipeline,
    ) -> LayerframeResult<bool> {
        let job = self.begin_load_layer_image(id)?;
        let fetched = pipeline.fetch(&job.url);
        self.complete_load_image(job.ticket, fetched)
    }

    // ----- documents -----

    /// Replace the whole session with the scene described by `doc`.
    ///
    /// Atomic: a malformed document leaves the current scene untouched. On success history and
    /// pending work are cleared, and the base image is left `Pending` at the document's URL.
    #[tracing::instrument(skip(self, doc), fields(image_url = %doc.image_url))]
    pub fn import_frame(&mut self, doc: &FrameDocument) -> LayerframeResult<()> {
        let imported = import_document(
            doc,
            self.store.fresh(),
            self.opts.normalized_box_threshold,
        )?;
        self.cancel_gesture();
        self.cancel_crop();
        self.store = imported.store;
        self.base = BaseImage {
            source: ImageSource::from_url(imported.image_url),
            natural_size: imported.natural_size,
            ..BaseImage::default()
        };
        self.transform.set_natural_size(imported.natural_size);
        if self.transform.display_size().is_zero_area() {
            self.transform.set_display_size(imported.natural_size);
        }
        self.history.clear();
        self.pending.clear();
        tracing::info!(layers = self.store.len(), "document imported");
        Ok(())
    }

    /// Serialize the visible scene. The base image must have a hosted URL.
    pub fn export_frame(&self) -> LayerframeResult<FrameDocument> {
        let url = self
            .base
            .source
            .url
            .as_deref()
            .ok_or_else(|| LayerframeError::validation("base image has no hosted url"))?;
        export_document(&self.store, url, self.base.natural_size)
    }

    fn take_payload(&mut self, ticket: &OpTicket) -> Option<PendingPayload> {
        let payload = self.pending.resolve(ticket);
        if payload.is_none() {
            tracing::warn!(kind = ?ticket.kind, op = ?ticket.target, "stale result ignored");
        }
        payload
    }
}

/// Everything that shows up in the raster matches.
fn same_appearance(a: &ShapeLayer, b: &ShapeLayer) -> bool {
    a.kind == b.kind
        && a.fill == b.fill
        && a.border == b.border
        && a.corner_radius == b.corner_radius
        && a.rotation_deg == b.rotation_deg
        && a.opacity == b.opacity
        && a.frame.size() == b.frame.size()
}

#[cfg(test)]
#[path = "../../tests/unit/editor/async_ops.rs"]
mod tests;
