//! JPEG XL decoding WASM bindings.
//!
//! This module exposes the jxl-loader-core entry points to JavaScript.
//!
//! # Functions
//!
//! - [`decode_jxl`] - Decode a JPEG XL stream to an RGBA frame at a requested size
//! - [`probe_jxl`] - Read dimensions and profile sizes without decoding pixels
//! - [`is_jxl`] - Check whether bytes start with a JPEG XL signature
//!
//! # Example
//!
//! ```typescript
//! import { decode_jxl, is_jxl } from '@jxl-loader/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//!
//! if (is_jxl(bytes)) {
//!   const frame = decode_jxl(bytes, { width: 256, preserveAspectRatio: true });
//!   console.log(`Frame: ${frame.width}x${frame.height}`);
//! }
//! ```

use crate::types::{DecodeOptionsJs, JsImageFrame, JsStreamInfo};
use jxl_loader_core::decode::{native_codec, DecodeBridge, DecodeError};
use jxl_loader_core::{loader, signature, DecodeRequest};
use wasm_bindgen::prelude::*;

/// Decode a JPEG XL stream into an RGBA frame.
///
/// # Arguments
///
/// * `bytes` - The complete JPEG XL file as a `Uint8Array`
/// * `options` - Optional `{ width, height, preserveAspectRatio, smooth }` object.
///   Missing dimensions (or 0) leave that axis unconstrained.
///
/// # Errors
///
/// Returns an error if:
/// - The options object is malformed or holds a negative dimension
/// - The bytes are not a valid JPEG XL stream, or are truncated
///
/// # Example
///
/// ```typescript
/// const frame = decode_jxl(bytes, { width: 200, height: 300, smooth: false });
/// ```
#[wasm_bindgen]
pub fn decode_jxl(bytes: &[u8], options: JsValue) -> Result<JsImageFrame, JsValue> {
    let options: DecodeOptionsJs = if options.is_undefined() || options.is_null() {
        DecodeOptionsJs::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Invalid decode options: {}", e)))?
    };
    let request = request_from_options(options).map_err(|e| JsValue::from_str(&e))?;

    loader::decode(bytes, &request)
        .map(JsImageFrame::from)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Read stream dimensions without decoding pixels.
///
/// # Errors
///
/// Returns an error if the stream is invalid or its header is incomplete.
#[wasm_bindgen]
pub fn probe_jxl(bytes: &[u8]) -> Result<JsStreamInfo, JsValue> {
    probe(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Check if bytes start with a JPEG XL codestream or container signature.
///
/// Only the first 12 bytes are examined.
#[wasm_bindgen]
pub fn is_jxl(bytes: &[u8]) -> bool {
    signature::is_jxl(bytes)
}

pub(crate) fn request_from_options(options: DecodeOptionsJs) -> Result<DecodeRequest, String> {
    DecodeRequest::from_signed(
        options.width,
        options.height,
        options.preserve_aspect_ratio,
        options.smooth,
    )
    .map_err(|e| e.to_string())
}

fn probe(bytes: &[u8]) -> Result<JsStreamInfo, DecodeError> {
    let codec = native_codec()?;
    let info = DecodeBridge::new(codec, bytes).probe(None)?;
    info.status.into_result()?;
    Ok(JsStreamInfo::from(info))
}

/// Tests for decode bindings.
///
/// Functions returning `Result<T, JsValue>` only work on wasm32 targets, so
/// these tests exercise the plain-Rust helpers underneath them.
#[cfg(test)]
mod tests {
    use super::*;
    use jxl_loader_core::frame::assemble;
    use jxl_loader_core::{ImageData, PixelFormat};

    #[test]
    fn test_is_jxl_codestream() {
        assert!(is_jxl(&[0xFF, 0x0A, 0x00]));
    }

    #[test]
    fn test_is_jxl_container() {
        let bytes = [
            0x00, 0x00, 0x00, 0x0C, 0x4A, 0x58, 0x4C, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
        ];
        assert!(is_jxl(&bytes));
    }

    #[test]
    fn test_is_jxl_rejects_jpeg() {
        assert!(!is_jxl(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jxl(&[0xFF]));
    }

    #[test]
    fn test_request_from_options() {
        let request = request_from_options(DecodeOptionsJs {
            width: 200,
            height: 0,
            preserve_aspect_ratio: false,
            smooth: false,
        })
        .unwrap();
        assert_eq!(request, DecodeRequest::new().with_size(200, 0).preserve_aspect_ratio(false).smooth(false));
    }

    #[test]
    fn test_request_from_options_negative() {
        let err = request_from_options(DecodeOptionsJs {
            width: -5,
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.contains("-5"));
    }

    #[test]
    fn test_probe_rejects_garbage() {
        assert!(probe(&[0x12, 0x34, 0x56]).is_err());
    }

    #[test]
    fn test_js_image_frame_from_core() {
        let data = ImageData::new(
            4,
            2,
            vec![255u8; 4 * 2 * 4],
            vec![7, 7],
            PixelFormat::Rgba8888,
        );
        let frame = JsImageFrame::from(assemble(data).unwrap());

        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.stride(), 16);
        assert_eq!(frame.byte_length(), 32);
        assert!(frame.has_alpha());
        assert_eq!(frame.icc_profile(), Some(vec![7, 7]));
        assert!(frame.pixels().iter().all(|&b| b == 255));
    }
}
