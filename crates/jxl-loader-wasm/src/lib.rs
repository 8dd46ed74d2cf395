//! JXL Loader WASM - WebAssembly bindings for the JPEG XL loader
//!
//! This crate provides WASM bindings to expose the jxl-loader-core
//! functionality to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for frames and stream info
//! - `decode` - Signature check, metadata probe and sized decode
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_jxl, JsImageFrame } from '@jxl-loader/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const frame = decode_jxl(bytes, { width: 512 });
//! console.log(`Decoded ${frame.width}x${frame.height}`);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod types;

// Re-export public types
pub use decode::{decode_jxl, is_jxl, probe_jxl};
pub use types::{JsImageFrame, JsStreamInfo};

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
