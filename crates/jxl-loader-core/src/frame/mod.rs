//! Decoded image frames.
//!
//! The frame assembler wraps bridge output into a self-describing
//! [`ImageFrame`] without copying pixels, and the scaler brings it to the
//! size the caller negotiated.

mod dimensions;
mod scale;

pub use dimensions::compute_dimensions;
pub use scale::{scale_frame, ScaleFilter};

use serde::{Deserialize, Serialize};

use crate::decode::{ContractViolation, DecodeError, ImageData, PixelFormat};

/// Pixel type tag of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageType {
    /// Interleaved 8-bit RGBA, not premultiplied.
    #[default]
    Rgba,
}

impl ImageType {
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ImageType::Rgba => 4,
        }
    }
}

/// Metadata carried alongside a frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    pub has_alpha: bool,
    /// ICC profile embedded in the stream, passed through unmodified.
    pub icc_profile: Option<Vec<u8>>,
}

/// A decoded (and possibly rescaled) image ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFrame {
    image_type: ImageType,
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
    palette: Option<Vec<[u8; 4]>>,
    metadata: FrameMetadata,
}

impl ImageFrame {
    /// Create a frame from an exclusively owned pixel buffer.
    pub(crate) fn new(
        image_type: ImageType,
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        metadata: FrameMetadata,
    ) -> Self {
        let stride = width as usize * image_type.bytes_per_pixel();
        debug_assert_eq!(
            pixels.len(),
            stride * height as usize,
            "Pixel buffer size mismatch"
        );
        Self {
            image_type,
            pixels,
            width,
            height,
            stride,
            palette: None,
            metadata,
        }
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    /// Pixel rows, `stride` bytes each.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Release the pixel buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Always `None`: JPEG XL frames are never palettized here.
    pub fn palette(&self) -> Option<&[[u8; 4]]> {
        self.palette.as_deref()
    }

    pub fn metadata(&self) -> &FrameMetadata {
        &self.metadata
    }
}

/// Wrap successfully extracted image data into a frame.
///
/// The pixel and ICC buffers are moved into the frame; nothing is copied.
///
/// # Errors
///
/// Returns [`ContractViolation::UnsupportedFrameFormat`] for anything other
/// than 8-bit RGBA data.
pub fn assemble(data: ImageData) -> Result<ImageFrame, DecodeError> {
    if data.pixel_format != PixelFormat::Rgba8888 {
        return Err(ContractViolation::UnsupportedFrameFormat(data.pixel_format).into());
    }

    let ImageData {
        width,
        height,
        pixels,
        icc,
        ..
    } = data;

    let metadata = FrameMetadata {
        width,
        height,
        has_alpha: true,
        icc_profile: (!icc.is_empty()).then_some(icc),
    };
    Ok(ImageFrame::new(
        ImageType::Rgba,
        pixels,
        width,
        height,
        metadata,
    ))
}
