//! JPEG XL decode bridge.
//!
//! This module provides:
//! - The status / metadata protocol spoken with the native codec
//! - A two-phase `probe` / `extract` bridge with strict buffer discipline
//! - A one-shot [`decode`] that allocates exactly-sized buffers
//! - Process-wide provisioning of the codec
//!
//! # Architecture
//!
//! The codec is treated as an opaque collaborator behind [`NativeCodec`]. It
//! is invoked at most twice per decode, both times with the complete input
//! in memory. All operations are synchronous; independent decodes with
//! independent buffers may run on separate threads.
//!
//! # Examples
//!
//! ```ignore
//! use jxl_loader_core::decode::{native_codec, DecodeBridge, PixelFormat};
//!
//! let bytes = std::fs::read("photo.jxl").unwrap();
//! let codec = native_codec().unwrap();
//! let mut bridge = DecodeBridge::new(codec, &bytes);
//! let info = bridge.probe(Some(PixelFormat::Rgba8888)).unwrap();
//! let mut pixels = vec![0u8; info.pixels_size];
//! let mut icc = vec![0u8; info.icc_size];
//! let status = bridge.extract(&mut pixels, &mut icc, PixelFormat::Rgba8888).unwrap();
//! ```

mod bridge;
mod native;
#[cfg(feature = "jxl-oxide")]
mod oxide;
mod types;

pub use bridge::{decode, DecodeBridge};
pub use native::{native_codec, NativeCodec, RawBasicInfo, RawStatus};
#[cfg(feature = "jxl-oxide")]
pub use oxide::OxideCodec;
pub use types::{
    ContractViolation, DecodeError, ImageData, InitError, PixelFormat, Status, StreamInfo,
};
