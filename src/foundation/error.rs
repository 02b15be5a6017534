pub type LayerframeResult<T> = Result<T, LayerframeError>;

#[derive(thiserror::Error, Debug)]
pub enum LayerframeError {
    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("upload error: {0}")]
    Upload(String),

    #[error("background removal error: {0}")]
    BackgroundRemoval(String),

    #[error("import parse error: {0}")]
    ImportParse(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayerframeError {
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    pub fn background_removal(msg: impl Into<String>) -> Self {
        Self::BackgroundRemoval(msg.into())
    }

    pub fn import_parse(msg: impl Into<String>) -> Self {
        Self::ImportParse(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Errors the editor reports as a notice while keeping the prior state intact.
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            Self::Upload(_) | Self::BackgroundRemoval(_) | Self::Decode(_)
        )
    }
}

impl From<serde_json::Error> for LayerframeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
