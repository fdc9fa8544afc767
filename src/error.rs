//! Error type shared by every stage of the stylization pipeline.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The payload was not valid standard base64.
    #[error("content is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The decoded bytes are not an image in any supported format.
    #[error("content is not a decodable image: {source}")]
    ImageDecode {
        #[source]
        source: image::ImageError,
    },

    #[error("image has zero width or height")]
    EmptyImage,

    /// Scaling the shorter side to the network size would make the longer
    /// side more than `max_ratio` times as long.
    #[error("image {width}x{height} is too elongated: the longer side may be at most {max_ratio} times the shorter")]
    ExtremeAspectRatio { width: u32, height: u32, max_ratio: u32 },

    #[error("failed to encode JPEG: {source}")]
    ImageEncode {
        #[source]
        source: image::ImageError,
    },

    /// Style names are used as file stems, so anything path-like is refused.
    #[error("invalid style name {name:?}")]
    InvalidStyleName { name: String },

    #[error("no weight file for style {name:?} in {}", .dir.display())]
    UnknownStyle { name: String, dir: PathBuf },

    #[error("unsupported weight file {}: expected .pth, .pt or .safetensors", .path.display())]
    UnsupportedWeights { path: PathBuf },

    /// A `.pth`/`.pt` file that is not a zip archive, i.e. written by
    /// PyTorch before 1.6 or with `_use_new_zipfile_serialization=False`.
    #[error(
        "{} is a legacy (non-zip) PyTorch checkpoint: re-save it with torch.save on PyTorch 1.6 or newer, or convert it to .safetensors",
        .path.display()
    )]
    LegacyCheckpoint { path: PathBuf },

    #[error("failed to load style weights from {}: {source}", .path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: candle_core::Error,
    },

    /// Tensor construction or the forward pass failed.
    #[error("inference failed: {0}")]
    Inference(#[from] candle_core::Error),

    #[error("invalid configuration: {name}={value}")]
    InvalidConfig { name: &'static str, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the failure was caused by the request content rather than by
    /// the server (bad base64, bad image, bad or unknown style name).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidBase64(_)
                | Error::ImageDecode { .. }
                | Error::EmptyImage
                | Error::ExtremeAspectRatio { .. }
                | Error::InvalidStyleName { .. }
                | Error::UnknownStyle { .. }
        )
    }
}
