//! WASM-compatible wrapper types for decoded frames.
//!
//! This module provides JavaScript-friendly types that wrap the core loader
//! types, handling the conversion between Rust and JavaScript data
//! representations.

use jxl_loader_core::{ImageFrame, StreamInfo};
use wasm_bindgen::prelude::*;

/// A decoded RGBA frame for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
///
/// The `free()` method can be called to explicitly release WASM memory, but this is
/// optional as wasm-bindgen's finalizer will handle cleanup automatically.
#[wasm_bindgen]
pub struct JsImageFrame {
    inner: ImageFrame,
}

#[wasm_bindgen]
impl JsImageFrame {
    /// Get the frame width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Get the frame height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Get the row stride in bytes (width * 4)
    #[wasm_bindgen(getter)]
    pub fn stride(&self) -> usize {
        self.inner.stride()
    }

    #[wasm_bindgen(getter)]
    pub fn has_alpha(&self) -> bool {
        self.inner.metadata().has_alpha
    }

    /// Get the number of bytes in the pixel buffer
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.pixels().len()
    }

    /// Returns RGBA pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels().to_vec()
    }

    /// Returns the embedded ICC profile, if the stream carried one.
    pub fn icc_profile(&self) -> Option<Vec<u8>> {
        self.inner.metadata().icc_profile.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl From<ImageFrame> for JsImageFrame {
    fn from(inner: ImageFrame) -> Self {
        Self { inner }
    }
}

/// Stream metadata from a metadata-only probe.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsStreamInfo {
    width: u32,
    height: u32,
    icc_size: usize,
    alpha_bits: u32,
}

#[wasm_bindgen]
impl JsStreamInfo {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of the embedded ICC profile in bytes (0 if none)
    #[wasm_bindgen(getter)]
    pub fn icc_size(&self) -> usize {
        self.icc_size
    }

    /// Bit depth of the alpha channel (0 if none)
    #[wasm_bindgen(getter)]
    pub fn alpha_bits(&self) -> u32 {
        self.alpha_bits
    }
}

impl From<StreamInfo> for JsStreamInfo {
    fn from(info: StreamInfo) -> Self {
        Self {
            width: info.width,
            height: info.height,
            icc_size: info.icc_size,
            alpha_bits: info.alpha_bits,
        }
    }
}

/// Decode options as sent from JavaScript.
///
/// Dimensions arrive as plain numbers and may be negative; they are
/// validated when converted into a core `DecodeRequest`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct DecodeOptionsJs {
    pub width: i64,
    pub height: i64,
    pub preserve_aspect_ratio: bool,
    pub smooth: bool,
}

impl Default for DecodeOptionsJs {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            preserve_aspect_ratio: true,
            smooth: true,
        }
    }
}
