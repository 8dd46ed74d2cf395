//! Caller-facing decode entry point.
//!
//! Runs the whole pipeline on the calling thread: buffer the stream, probe,
//! extract, assemble, negotiate dimensions, scale.

use std::io::Read;

use log::debug;

use crate::decode::{self, native_codec, ContractViolation, DecodeError, NativeCodec, PixelFormat};
use crate::frame::{self, compute_dimensions, scale_frame, ImageFrame};

/// What size and quality the caller wants the decoded frame in.
///
/// A dimension of 0 leaves that axis unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeRequest {
    /// Requested width in pixels (0 = unconstrained).
    pub width: u32,
    /// Requested height in pixels (0 = unconstrained).
    pub height: u32,
    pub preserve_aspect_ratio: bool,
    /// Smooth (area-weighted) resampling instead of nearest neighbor.
    pub smooth: bool,
}

impl Default for DecodeRequest {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            preserve_aspect_ratio: true,
            smooth: true,
        }
    }
}

impl DecodeRequest {
    /// Create a request for the native size with default quality settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from host-style signed dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::NegativeDimension`] for a negative value
    /// and [`ContractViolation::DimensionOutOfRange`] for one above `u32::MAX`.
    pub fn from_signed(
        width: i64,
        height: i64,
        preserve_aspect_ratio: bool,
        smooth: bool,
    ) -> Result<Self, ContractViolation> {
        Ok(Self {
            width: non_negative(width)?,
            height: non_negative(height)?,
            preserve_aspect_ratio,
            smooth,
        })
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn preserve_aspect_ratio(mut self, preserve: bool) -> Self {
        self.preserve_aspect_ratio = preserve;
        self
    }

    pub fn smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }
}

fn non_negative(value: i64) -> Result<u32, ContractViolation> {
    if value < 0 {
        return Err(ContractViolation::NegativeDimension(value));
    }
    u32::try_from(value).map_err(|_| ContractViolation::DimensionOutOfRange(value))
}

/// Decode a complete JPEG XL stream with the process-wide codec.
///
/// # Errors
///
/// [`DecodeError::Init`] if no codec is available, otherwise as
/// [`decode_with`].
pub fn decode(bytes: &[u8], request: &DecodeRequest) -> Result<ImageFrame, DecodeError> {
    let codec = native_codec()?;
    decode_with(codec, bytes, request)
}

/// Decode a complete JPEG XL stream with an explicit codec.
///
/// # Errors
///
/// Returns an error for any non-OK codec status, contract violation or
/// scaling failure. A frame is only returned after a fully successful
/// extract.
pub fn decode_with(
    codec: &dyn NativeCodec,
    bytes: &[u8],
    request: &DecodeRequest,
) -> Result<ImageFrame, DecodeError> {
    let data = decode::decode(codec, bytes, PixelFormat::Rgba8888)?;
    let frame = frame::assemble(data)?;

    let (width, height) = compute_dimensions(
        frame.width(),
        frame.height(),
        request.width,
        request.height,
        request.preserve_aspect_ratio,
    );
    debug!(
        "decoded {}x{}, delivering {}x{}",
        frame.width(),
        frame.height(),
        width,
        height
    );

    scale_frame(frame, width, height, request.smooth)
}

/// Buffer a whole stream, then decode it.
///
/// # Errors
///
/// I/O errors from `reader` are returned unchanged as [`DecodeError::Io`].
pub fn decode_reader<R: Read>(
    mut reader: R,
    request: &DecodeRequest,
) -> Result<ImageFrame, DecodeError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode(&bytes, request)
}
