use std::collections::BTreeMap;

use crate::assets::decode::decode_image;
use crate::crop::raster::encode_png;
use crate::foundation::error::{LayerframeError, LayerframeResult};

/// Where the pipeline persisted an asset.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// External service that persists rasters and removes image backgrounds.
///
/// Calls may be slow; the editor issues a ticket before calling and applies the response later.
pub trait AssetPipeline {
    /// Persist encoded raster bytes. Fails with [`LayerframeError::Upload`].
    fn upload(&mut self, bytes: &[u8]) -> LayerframeResult<UploadResponse>;

    /// Produce a background-free copy of the image at `url`. Fails with
    /// [`LayerframeError::BackgroundRemoval`]; the original asset stays untouched.
    fn remove_background(&mut self, url: &str) -> LayerframeResult<UploadResponse>;

    /// Download the encoded bytes behind `url`. Failures are decode errors: the image stays
    /// unavailable until retried.
    fn fetch(&mut self, url: &str) -> LayerframeResult<Vec<u8>> {
        Err(LayerframeError::decode(format!(
            "pipeline cannot fetch {url}"
        )))
    }
}

const MEM_SCHEME: &str = "mem://asset/";

/// Per-channel distance under which a pixel counts as background.
const KEY_TOLERANCE: u8 = 24;

/// Pipeline that keeps assets in memory under `mem://asset/<n>` URLs.
///
/// Background removal keys out every pixel close to the top-left pixel's color.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAssetPipeline {
    assets: BTreeMap<String, Vec<u8>>,
    next: u64,
    fail_uploads: bool,
    fail_background_removal: bool,
}

impl InMemoryAssetPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail.
    pub fn fail_uploads(mut self, fail: bool) -> Self {
        self.fail_uploads = fail;
        self
    }

    /// Make every subsequent background removal fail.
    pub fn fail_background_removal(mut self, fail: bool) -> Self {
        self.fail_background_removal = fail;
        self
    }

    pub fn set_fail_uploads(&mut self, fail: bool) {
        self.fail_uploads = fail;
    }

    pub fn set_fail_background_removal(&mut self, fail: bool) {
        self.fail_background_removal = fail;
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Stored bytes for `url`.
    pub fn get(&self, url: &str) -> Option<&[u8]> {
        self.assets.get(url).map(Vec::as_slice)
    }

    fn store(&mut self, bytes: Vec<u8>) -> String {
        self.next += 1;
        let url = format!("{MEM_SCHEME}{}", self.next);
        self.assets.insert(url.clone(), bytes);
        url
    }
}

impl AssetPipeline for InMemoryAssetPipeline {
    fn upload(&mut self, bytes: &[u8]) -> LayerframeResult<UploadResponse> {
        if self.fail_uploads {
            return Err(LayerframeError::upload("asset store rejected the upload"));
        }
        if bytes.is_empty() {
            return Err(LayerframeError::upload("empty payload"));
        }
        let url = self.store(bytes.to_vec());
        tracing::debug!(%url, bytes = bytes.len(), "asset uploaded");
        Ok(UploadResponse { url })
    }

    fn remove_background(&mut self, url: &str) -> LayerframeResult<UploadResponse> {
        if self.fail_background_removal {
            return Err(LayerframeError::background_removal(
                "background removal service unavailable",
            ));
        }
        let bytes = self
            .assets
            .get(url)
            .ok_or_else(|| LayerframeError::background_removal(format!("unknown asset {url}")))?;
        let mut img = decode_image(bytes)
            .map_err(|e| LayerframeError::background_removal(e.to_string()))?;
        let key = img.get_pixel(0, 0).0;
        for px in img.pixels_mut() {
            let close = px.0[..3]
                .iter()
                .zip(&key[..3])
                .all(|(a, b)| a.abs_diff(*b) <= KEY_TOLERANCE);
            if close {
                px.0 = [0, 0, 0, 0];
            }
        }
        let png = encode_png(&img).map_err(|e| LayerframeError::background_removal(e.to_string()))?;
        let url = self.store(png);
        Ok(UploadResponse { url })
    }

    fn fetch(&mut self, url: &str) -> LayerframeResult<Vec<u8>> {
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| LayerframeError::decode(format!("unknown asset {url}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/pipeline.rs"]
mod tests;
