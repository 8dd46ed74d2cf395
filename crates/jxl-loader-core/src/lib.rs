//! JXL Loader Core - JPEG XL integration for image loaders
//!
//! This crate lets an image-loading framework recognize JPEG XL streams,
//! decode them through a two-phase codec bridge, and deliver RGBA frames at
//! a caller-requested size.
//!
//! # Module Structure
//!
//! - `signature` - Byte-signature format detection and format registration data
//! - `decode` - Native codec boundary and the probe / extract bridge
//! - `frame` - Frame assembly, dimension negotiation and scaling
//! - `loader` - The caller-facing `decode` entry point

pub mod decode;
pub mod frame;
pub mod loader;
pub mod signature;

pub use decode::{DecodeError, ImageData, PixelFormat, Status, StreamInfo};
pub use frame::{FrameMetadata, ImageFrame, ImageType};
pub use loader::{decode, decode_reader, decode_with, DecodeRequest};
pub use signature::{is_jxl, FormatDescriptor, Signature, JXL_FORMAT};
