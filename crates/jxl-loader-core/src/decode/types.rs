//! Core types for the decode bridge.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Argument-contract violations.
///
/// These are programmer errors: they are raised before any native call and
/// retrying with the same arguments always fails again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// `extract` was called without a successful `probe` on the same stream.
    #[error("extract called before a successful probe")]
    ProbeRequired,

    /// The last probe was metadata-only, so no buffer size is known.
    #[error("extract called after a metadata-only probe")]
    MetadataOnlyProbe,

    /// `extract` was asked for a different layout than the one sized by `probe`.
    #[error("pixel format mismatch: probed {probed:?}, requested {requested:?}")]
    PixelFormatMismatch {
        probed: PixelFormat,
        requested: PixelFormat,
    },

    /// A caller buffer does not have exactly the probed capacity.
    #[error("{buffer} buffer holds {actual} bytes, probe requires {expected}")]
    BufferSize {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The frame assembler only accepts interleaved 8-bit RGBA.
    #[error("cannot assemble a frame from {0:?} pixels")]
    UnsupportedFrameFormat(PixelFormat),

    /// The scaler needs both target dimensions to be positive.
    #[error("invalid target dimensions {width}x{height}")]
    InvalidTargetDimensions { width: u32, height: u32 },

    /// Requested dimensions must not be negative.
    #[error("requested dimension must not be negative: {0}")]
    NegativeDimension(i64),

    /// Requested dimensions must fit in 32 bits.
    #[error("requested dimension out of range: {0}")]
    DimensionOutOfRange(i64),
}

/// Failure to make the native codec available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// No codec was compiled into this build.
    #[error("no JPEG XL codec is available in this build")]
    Unavailable,
}

/// Error types for decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a valid or supported JPEG XL stream.
    #[error("Invalid or unsupported JPEG XL stream")]
    InvalidStream,

    /// The stream ended before the codec found what it needed.
    #[error("Not enough input: JPEG XL stream is truncated")]
    NotEnoughInput,

    /// The native codec reported a status outside its contract.
    #[error("Native codec returned unknown status code {0}")]
    UnknownStatus(i32),

    /// Cause reported by the codec library alongside a failed call.
    #[error("Native codec failure: {0}")]
    Native(String),

    #[error("Contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("Codec initialization failed: {0}")]
    Init(#[from] InitError),

    /// I/O error while buffering the input stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resampling could not produce an output frame.
    #[error("Scaling failed: {0}")]
    Scale(String),
}

/// Outcome of a native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The call succeeded; outputs are valid.
    Ok,
    /// Malformed or unsupported input.
    InvalidStream,
    /// The input ended too early.
    NotEnoughInput,
}

impl Status {
    pub const OK_CODE: i32 = 0;
    pub const INVALID_STREAM_CODE: i32 = -1;
    pub const NOT_ENOUGH_INPUT_CODE: i32 = 1;

    /// Map a numeric status code from the native codec.
    ///
    /// Any code other than `0`, `-1` and `1` breaks the codec contract and is
    /// reported as [`DecodeError::UnknownStatus`].
    pub fn from_code(code: i32) -> Result<Self, DecodeError> {
        match code {
            Self::OK_CODE => Ok(Status::Ok),
            Self::INVALID_STREAM_CODE => Ok(Status::InvalidStream),
            Self::NOT_ENOUGH_INPUT_CODE => Ok(Status::NotEnoughInput),
            other => Err(DecodeError::UnknownStatus(other)),
        }
    }

    /// Numeric code of this status on the native side.
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => Self::OK_CODE,
            Status::InvalidStream => Self::INVALID_STREAM_CODE,
            Status::NotEnoughInput => Self::NOT_ENOUGH_INPUT_CODE,
        }
    }

    #[inline]
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    /// Turn a non-OK status into the matching decode error.
    pub fn into_result(self) -> Result<(), DecodeError> {
        match self {
            Status::Ok => Ok(()),
            Status::InvalidStream => Err(DecodeError::InvalidStream),
            Status::NotEnoughInput => Err(DecodeError::NotEnoughInput),
        }
    }
}

/// Output sample layout requested from the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Interleaved 8-bit RGBA.
    #[default]
    Rgba8888,
    /// Interleaved 8-bit RGB.
    Rgb888,
}

impl PixelFormat {
    /// Position of the format in the codec's format table.
    pub fn ordinal(self) -> i32 {
        match self {
            PixelFormat::Rgba8888 => 0,
            PixelFormat::Rgb888 => 1,
        }
    }

    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Rgba8888 => 4,
            PixelFormat::Rgb888 => 3,
        }
    }

    /// Bytes per pixel (one byte per channel for every supported format).
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        self.channels()
    }

    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba8888)
    }

    /// Exact pixel buffer length for an image of the given size.
    ///
    /// Returns `None` if the size does not fit in `usize`.
    pub fn buffer_size(self, width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(self.bytes_per_pixel())
    }
}

/// Result of the probe phase.
///
/// Dimensions and sizes are only meaningful when `status` is [`Status::Ok`];
/// they are zero otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub status: Status,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Exact pixel buffer length `extract` needs (0 for a metadata-only probe).
    pub pixels_size: usize,
    /// Exact ICC buffer length `extract` needs (0 if the stream has no profile).
    pub icc_size: usize,
    /// Bit depth of the alpha channel, 0 if there is none.
    pub alpha_bits: u32,
}

impl StreamInfo {
    /// Info for a probe that did not succeed.
    pub fn failed(status: Status) -> Self {
        Self {
            status,
            width: 0,
            height: 0,
            pixels_size: 0,
            icc_size: 0,
            alpha_bits: 0,
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    pub fn has_alpha(&self) -> bool {
        self.alpha_bits > 0
    }

    pub fn has_icc(&self) -> bool {
        self.icc_size > 0
    }
}

/// Fully decoded image as produced by the bridge.
///
/// Owns both buffers exclusively until handed to the frame assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded samples, `width * height * bytes_per_pixel` bytes.
    pub pixels: Vec<u8>,
    /// Embedded ICC profile, empty if the stream carries none.
    pub icc: Vec<u8>,
    pub pixel_format: PixelFormat,
}

impl ImageData {
    /// Create a new ImageData with the given dimensions and buffers.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        icc: Vec<u8>,
        pixel_format: PixelFormat,
    ) -> Self {
        debug_assert_eq!(
            Some(pixels.len()),
            pixel_format.buffer_size(width, height),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
            icc,
            pixel_format,
        }
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * self.pixel_format.bytes_per_pixel()
    }
}
