//! Frame resampling.
//!
//! Uses the `image` crate's resampling. Color and alpha channels are filtered
//! identically and independently; nothing is premultiplied.

use log::trace;
use serde::{Deserialize, Serialize};

use super::{FrameMetadata, ImageFrame};
use crate::decode::{ContractViolation, DecodeError, PixelFormat};

/// Interpolation quality for scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScaleFilter {
    /// Nearest neighbor: each output pixel copies one source pixel.
    Nearest,
    /// Triangle (bilinear) filter widened to the scale factor when shrinking,
    /// so every output pixel is a weighted average of the source area it covers.
    #[default]
    Smooth,
}

impl ScaleFilter {
    /// Filter selected by the host's `smooth` flag.
    pub fn from_smooth(smooth: bool) -> Self {
        if smooth {
            ScaleFilter::Smooth
        } else {
            ScaleFilter::Nearest
        }
    }

    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            ScaleFilter::Nearest => image::imageops::FilterType::Nearest,
            ScaleFilter::Smooth => image::imageops::FilterType::Triangle,
        }
    }
}

/// Scale a frame to `width` x `height`.
///
/// If the frame already has that size it is returned as-is, buffer
/// included. Otherwise a new frame is produced with stride `width * 4` and
/// the source metadata (alpha flag, ICC profile) carried over.
///
/// # Errors
///
/// Returns [`ContractViolation::InvalidTargetDimensions`] if either target
/// dimension is zero, and [`DecodeError::Scale`] if resampling would need
/// more memory than [`image::Limits::default`] allows.
pub fn scale_frame(
    frame: ImageFrame,
    width: u32,
    height: u32,
    smooth: bool,
) -> Result<ImageFrame, DecodeError> {
    if width == 0 || height == 0 {
        return Err(ContractViolation::InvalidTargetDimensions { width, height }.into());
    }

    if frame.width == width && frame.height == height {
        trace!("scale: {}x{} already at target size", width, height);
        return Ok(frame);
    }

    reserve_resize(frame.width, width, height)?;

    let filter = ScaleFilter::from_smooth(smooth);
    trace!(
        "scale: {}x{} -> {}x{} ({:?})",
        frame.width,
        frame.height,
        width,
        height,
        filter
    );

    let ImageFrame {
        image_type,
        pixels,
        width: src_width,
        height: src_height,
        metadata,
        ..
    } = frame;

    let source = image::RgbaImage::from_raw(src_width, src_height, pixels).ok_or_else(|| {
        DecodeError::Scale(format!(
            "pixel buffer does not hold a {}x{} RGBA image",
            src_width, src_height
        ))
    })?;

    let resized = image::imageops::resize(&source, width, height, filter.to_image_filter());

    let metadata = FrameMetadata {
        width,
        height,
        ..metadata
    };
    Ok(ImageFrame::new(
        image_type,
        resized.into_raw(),
        width,
        height,
        metadata,
    ))
}

/// Check the buffers `imageops::resize` will allocate against the default
/// allocation limit: an f32 RGBA pass of `src_width` x `height`, then the
/// 8-bit output.
fn reserve_resize(src_width: u32, width: u32, height: u32) -> Result<(), DecodeError> {
    let too_large = || {
        DecodeError::Scale(format!(
            "scaling to {}x{} exceeds the allocation limit",
            width, height
        ))
    };

    let mut limits = image::Limits::default();
    let output = PixelFormat::Rgba8888
        .buffer_size(width, height)
        .ok_or_else(too_large)?;
    let intermediate = u64::from(src_width)
        .checked_mul(u64::from(height))
        .and_then(|n| n.checked_mul(16))
        .ok_or_else(too_large)?;

    limits.reserve(intermediate).map_err(|_| too_large())?;
    limits.reserve_usize(output).map_err(|_| too_large())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ImageType;

    fn create_test_frame(width: u32, height: u32) -> ImageFrame {
        // Simple gradient with a varying alpha channel
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8); // R
                pixels.push(((y * 255) / height.max(1)) as u8); // G
                pixels.push(128); // B
                pixels.push(((x + y) % 256) as u8); // A
            }
        }
        uniform_metadata_frame(width, height, pixels)
    }

    fn uniform_metadata_frame(width: u32, height: u32, pixels: Vec<u8>) -> ImageFrame {
        let metadata = FrameMetadata {
            width,
            height,
            has_alpha: true,
            icc_profile: Some(vec![1, 2, 3]),
        };
        ImageFrame::new(ImageType::Rgba, pixels, width, height, metadata)
    }

    fn solid_frame(width: u32, height: u32, color: [u8; 4]) -> ImageFrame {
        let pixels = color.repeat((width * height) as usize);
        uniform_metadata_frame(width, height, pixels)
    }

    #[test]
    fn test_scale_filter_conversion() {
        assert!(matches!(
            ScaleFilter::from_smooth(false).to_image_filter(),
            image::imageops::FilterType::Nearest
        ));
        assert!(matches!(
            ScaleFilter::from_smooth(true).to_image_filter(),
            image::imageops::FilterType::Triangle
        ));
        assert_eq!(ScaleFilter::default(), ScaleFilter::Smooth);
    }

    #[test]
    fn test_identity_is_zero_copy() {
        let frame = create_test_frame(64, 32);
        let ptr = frame.pixels().as_ptr();
        let scaled = scale_frame(frame, 64, 32, true).unwrap();

        assert_eq!(scaled.pixels().as_ptr(), ptr);
        assert_eq!(scaled.width(), 64);
    }

    #[test]
    fn test_downscale_smooth() {
        let frame = create_test_frame(100, 50);
        let scaled = scale_frame(frame, 50, 25, true).unwrap();

        assert_eq!(scaled.width(), 50);
        assert_eq!(scaled.height(), 25);
        assert_eq!(scaled.stride(), 200);
        assert_eq!(scaled.pixels().len(), 50 * 25 * 4);
        assert_eq!(scaled.metadata().width, 50);
        assert_eq!(scaled.metadata().height, 25);
        assert!(scaled.metadata().has_alpha);
        assert_eq!(scaled.metadata().icc_profile.as_deref(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_upscale_nearest_copies_pixels() {
        let pixels = vec![
            10, 20, 30, 40, // (0, 0)
            50, 60, 70, 80, // (1, 0)
        ];
        let frame = uniform_metadata_frame(2, 1, pixels);
        let scaled = scale_frame(frame, 4, 2, false).unwrap();

        assert_eq!(scaled.stride(), 16);
        for row in scaled.pixels().chunks_exact(16) {
            assert_eq!(&row[0..4], &[10, 20, 30, 40]);
            assert_eq!(&row[12..16], &[50, 60, 70, 80]);
        }
    }

    #[test]
    fn test_nearest_never_blends() {
        let frame = create_test_frame(37, 23);
        let source: Vec<[u8; 4]> = frame
            .pixels()
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
            .collect();
        let scaled = scale_frame(frame, 11, 7, false).unwrap();

        for p in scaled.pixels().chunks_exact(4) {
            assert!(source.contains(&[p[0], p[1], p[2], p[3]]));
        }
    }

    #[test]
    fn test_uniform_color_preserved() {
        let color = [200, 100, 50, 180];
        for smooth in [false, true] {
            for (w, h) in [(50, 25), (33, 17), (1, 1), (99, 49)] {
                let scaled = scale_frame(solid_frame(100, 50, color), w, h, smooth).unwrap();
                assert!(
                    scaled.pixels().chunks_exact(4).all(|p| p == color),
                    "smooth={} {}x{}",
                    smooth,
                    w,
                    h
                );
            }
        }
    }

    #[test]
    fn test_zero_target_rejected() {
        let frame = create_test_frame(10, 10);
        assert!(matches!(
            scale_frame(frame.clone(), 0, 10, true),
            Err(DecodeError::Contract(
                ContractViolation::InvalidTargetDimensions { width: 0, height: 10 }
            ))
        ));
        assert!(scale_frame(frame, 10, 0, false).is_err());
    }

    #[test]
    fn test_oversized_target_rejected() {
        for (w, h) in [(u32::MAX, u32::MAX), (100_000, 100_000), (1, u32::MAX)] {
            for smooth in [false, true] {
                match scale_frame(solid_frame(1, 1, [0; 4]), w, h, smooth) {
                    Err(DecodeError::Scale(msg)) => assert!(msg.contains("allocation limit")),
                    other => panic!("{}x{}: expected Scale error, got {:?}", w, h, other.map(|f| f.width())),
                }
            }
        }
    }

    #[test]
    fn test_large_but_allowed_target() {
        // 2048x2048 RGBA is 16 MiB of output, well under the default limit
        let scaled = scale_frame(solid_frame(2, 2, [7; 4]), 2048, 2048, false).unwrap();
        assert_eq!(scaled.pixels().len(), 2048 * 2048 * 4);
    }
}
