//! The native codec boundary.
//!
//! The codec is an opaque collaborator with two entry points. Each call
//! returns a plain record with a numeric status code; the bridge alone
//! decides what those codes mean.

use std::sync::OnceLock;

use super::{InitError, PixelFormat};

/// Raw result of the codec's basic-info call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBasicInfo {
    /// `0` ok, `-1` invalid stream, `1` not enough input.
    pub status: i32,
    pub width: u32,
    pub height: u32,
    pub pixels_size: usize,
    pub icc_size: usize,
    pub alpha_bits: u32,
    /// Cause reported by the codec library, if any.
    pub cause: Option<String>,
}

impl RawBasicInfo {
    /// A record carrying only a status code.
    pub fn with_status(status: i32) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }
}

/// Raw result of the codec's pixel call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStatus {
    pub status: i32,
    pub cause: Option<String>,
}

impl RawStatus {
    pub fn new(status: i32) -> Self {
        Self {
            status,
            cause: None,
        }
    }

    pub fn with_cause(status: i32, cause: impl Into<String>) -> Self {
        Self {
            status,
            cause: Some(cause.into()),
        }
    }
}

/// A JPEG XL codec callable from the bridge.
///
/// Both calls receive the complete input. Implementations must not retain
/// any buffer past the call, and must only write through `pixels`/`icc`.
pub trait NativeCodec: Send + Sync {
    /// Read stream metadata.
    ///
    /// With `format == None` only dimensions, ICC size and alpha depth are
    /// reported and `pixels_size` stays 0.
    fn basic_info(&self, data: &[u8], format: Option<PixelFormat>) -> RawBasicInfo;

    /// Decode the whole image into `pixels` and copy the ICC profile into `icc`.
    ///
    /// Both buffers have exactly the sizes reported by `basic_info`.
    fn pixels(&self, data: &[u8], format: PixelFormat, pixels: &mut [u8], icc: &mut [u8])
        -> RawStatus;
}

static NATIVE_CODEC: OnceLock<Result<&'static dyn NativeCodec, InitError>> = OnceLock::new();

/// Make the process-wide codec available.
///
/// Provisioning runs once; success or failure is cached for the lifetime of
/// the process and never retried.
pub fn native_codec() -> Result<&'static dyn NativeCodec, InitError> {
    NATIVE_CODEC.get_or_init(provision).clone()
}

#[cfg(feature = "jxl-oxide")]
fn provision() -> Result<&'static dyn NativeCodec, InitError> {
    static CODEC: super::oxide::OxideCodec = super::oxide::OxideCodec;
    log::info!("JPEG XL codec provisioned (jxl-oxide)");
    Ok(&CODEC)
}

#[cfg(not(feature = "jxl-oxide"))]
fn provision() -> Result<&'static dyn NativeCodec, InitError> {
    log::warn!("JPEG XL codec unavailable: built without the jxl-oxide feature");
    Err(InitError::Unavailable)
}
