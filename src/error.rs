use crate::resources::ImageHandle;

#[derive(thiserror::Error, Debug)]
pub enum GuiError {
    #[error("failed to load image {path}: {source}")]
    ImageLoad {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("unknown image handle {0:?}")]
    UnknownImage(ImageHandle),
    #[error("font unavailable: {0}")]
    FontUnavailable(String),
    #[error("invalid configuration value {value:?} for {key}")]
    InvalidConfig { key: &'static str, value: String },
}

pub type GuiResult<T> = Result<T, GuiError>;
