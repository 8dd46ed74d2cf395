//! JPEG XL codec backed by `jxl-oxide`.

use jxl_oxide::{InitializeResult, JxlImage};

use super::native::{NativeCodec, RawBasicInfo, RawStatus};
use super::{PixelFormat, Status};

/// Pure-Rust codec behind the native boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxideCodec;

/// Why a stream could not be loaded.
enum Load {
    Truncated,
    Invalid(String),
}

impl Load {
    fn status(&self) -> RawStatus {
        match self {
            Load::Truncated => RawStatus::new(Status::NOT_ENOUGH_INPUT_CODE),
            Load::Invalid(cause) => RawStatus::with_cause(Status::INVALID_STREAM_CODE, cause),
        }
    }
}

/// Feed the complete input and wait for the whole codestream.
///
/// Decoding is single-shot, so a stream that does not contain every frame is
/// reported as truncated even if its header is complete.
fn load(data: &[u8]) -> Result<JxlImage, Load> {
    let mut uninit = JxlImage::builder().build_uninit();
    uninit
        .feed_bytes(data)
        .map_err(|e| Load::Invalid(e.to_string()))?;

    let image = match uninit.try_init().map_err(|e| Load::Invalid(e.to_string()))? {
        InitializeResult::Initialized(image) => image,
        InitializeResult::NeedMoreData(_) => return Err(Load::Truncated),
    };

    if !image.is_loading_done() {
        return Err(Load::Truncated);
    }
    Ok(image)
}

fn alpha_bits(image: &JxlImage) -> u32 {
    image
        .image_header()
        .metadata
        .ec_info
        .iter()
        .find(|ec| ec.is_alpha())
        .map(|ec| ec.bit_depth.bits_per_sample())
        .unwrap_or(0)
}

impl NativeCodec for OxideCodec {
    fn basic_info(&self, data: &[u8], format: Option<PixelFormat>) -> RawBasicInfo {
        let image = match load(data) {
            Ok(image) => image,
            Err(err) => {
                let status = err.status();
                return RawBasicInfo {
                    cause: status.cause,
                    ..RawBasicInfo::with_status(status.status)
                };
            }
        };

        let (width, height) = (image.width(), image.height());
        let pixels_size = match format {
            None => 0,
            Some(format) => match format.buffer_size(width, height) {
                Some(size) => size,
                None => {
                    return RawBasicInfo {
                        cause: Some(format!("image too large: {}x{}", width, height)),
                        ..RawBasicInfo::with_status(Status::INVALID_STREAM_CODE)
                    }
                }
            },
        };

        RawBasicInfo {
            status: Status::OK_CODE,
            width,
            height,
            pixels_size,
            icc_size: image.original_icc().map_or(0, <[u8]>::len),
            alpha_bits: alpha_bits(&image),
            cause: None,
        }
    }

    fn pixels(
        &self,
        data: &[u8],
        format: PixelFormat,
        pixels: &mut [u8],
        icc: &mut [u8],
    ) -> RawStatus {
        let image = match load(data) {
            Ok(image) => image,
            Err(err) => return err.status(),
        };

        let render = match image.render_frame(0) {
            Ok(render) => render,
            Err(e) => return RawStatus::with_cause(Status::INVALID_STREAM_CODE, e.to_string()),
        };

        let mut stream = render.stream();
        let (width, height) = (image.width(), image.height());
        let channels = stream.channels() as usize;
        if channels == 4 && !image.pixel_format().has_alpha() {
            return RawStatus::with_cause(
                Status::INVALID_STREAM_CODE,
                "CMYK images are not supported",
            );
        }

        let Some(pixel_count) = (width as usize).checked_mul(height as usize) else {
            return RawStatus::with_cause(Status::INVALID_STREAM_CODE, "image too large");
        };
        if Some(pixels.len()) != format.buffer_size(width, height) {
            return RawStatus::with_cause(
                Status::INVALID_STREAM_CODE,
                format!("pixel buffer does not fit {}x{} image", width, height),
            );
        }

        let mut samples = vec![0u8; pixel_count * channels];
        let written = stream.write_to_buffer(&mut samples);
        if written != samples.len() {
            return RawStatus::new(Status::NOT_ENOUGH_INPUT_CODE);
        }
        if let Err(cause) = expand_samples(&samples, channels, pixels, format) {
            return RawStatus::with_cause(Status::INVALID_STREAM_CODE, cause);
        }

        if let Some(profile) = image.original_icc() {
            if profile.len() != icc.len() {
                return RawStatus::with_cause(Status::INVALID_STREAM_CODE, "ICC size changed");
            }
            icc.copy_from_slice(profile);
        }

        RawStatus::new(Status::OK_CODE)
    }
}

/// Convert interleaved gray, gray+alpha, RGB or RGBA samples into `format`.
///
/// Missing alpha is filled with 255; missing color is replicated from gray.
pub(crate) fn expand_samples(
    src: &[u8],
    src_channels: usize,
    dst: &mut [u8],
    format: PixelFormat,
) -> Result<(), String> {
    if !(1..=4).contains(&src_channels) {
        return Err(format!("unsupported channel count {}", src_channels));
    }
    let dst_channels = format.channels();
    if src.len() / src_channels != dst.len() / dst_channels {
        return Err("sample count mismatch".to_string());
    }

    for (s, d) in src
        .chunks_exact(src_channels)
        .zip(dst.chunks_exact_mut(dst_channels))
    {
        let (r, g, b, a) = match *s {
            [v] => (v, v, v, 255),
            [v, a] => (v, v, v, a),
            [r, g, b] => (r, g, b, 255),
            [r, g, b, a] => (r, g, b, a),
            _ => unreachable!("channel count checked above"),
        };
        d[0] = r;
        d[1] = g;
        d[2] = b;
        if dst_channels == 4 {
            d[3] = a;
        }
    }
    Ok(())
}
