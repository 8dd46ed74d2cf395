//! The two-phase decode protocol.
//!
//! `probe` reads stream metadata and reports the exact buffer sizes the
//! image needs; `extract` decodes into caller buffers of exactly those sizes.
//! Both calls see the complete input, there is no incremental state.

use log::{debug, trace, warn};

use super::native::NativeCodec;
use super::{ContractViolation, DecodeError, ImageData, PixelFormat, Status, StreamInfo};

#[derive(Debug, Clone, Copy)]
struct Probed {
    format: Option<PixelFormat>,
    info: StreamInfo,
}

/// Mediates between caller buffers and the codec for one decode request.
///
/// Remembers the most recent successful probe so `extract` can reject
/// buffers or formats that do not match it.
pub struct DecodeBridge<'a> {
    codec: &'a dyn NativeCodec,
    data: &'a [u8],
    probed: Option<Probed>,
}

impl<'a> DecodeBridge<'a> {
    /// Create a bridge over the complete, buffered input stream.
    pub fn new(codec: &'a dyn NativeCodec, data: &'a [u8]) -> Self {
        Self {
            codec,
            data,
            probed: None,
        }
    }

    /// The input bytes this bridge decodes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Info from the most recent successful probe.
    pub fn last_probe(&self) -> Option<&StreamInfo> {
        self.probed.as_ref().map(|p| &p.info)
    }

    /// Read stream metadata.
    ///
    /// `format == None` requests metadata only; `pixels_size` is then 0 and
    /// `extract` stays unavailable until a probe with a format succeeds.
    ///
    /// # Errors
    ///
    /// A non-OK status is not an error here: it is returned inside
    /// [`StreamInfo`]. Errors are reserved for unknown status codes and
    /// codecs reporting a pixel size that contradicts the dimensions.
    pub fn probe(&mut self, format: Option<PixelFormat>) -> Result<StreamInfo, DecodeError> {
        self.probed = None;

        let raw = self.codec.basic_info(self.data, format);
        let status = Status::from_code(raw.status).inspect_err(|_| {
            warn!("probe: codec returned unknown status code {}", raw.status);
        })?;
        debug!(
            "probe: {} input bytes, format {} -> {}",
            self.data.len(),
            format_code(format),
            status.code()
        );

        if !status.is_ok() {
            if let Some(cause) = &raw.cause {
                debug!("probe: {}", cause);
            }
            return Ok(StreamInfo::failed(status));
        }

        if let Some(format) = format {
            let expected = format.buffer_size(raw.width, raw.height);
            if expected != Some(raw.pixels_size) {
                warn!(
                    "probe: codec reported {} pixel bytes for {}x{} {:?}",
                    raw.pixels_size, raw.width, raw.height, format
                );
                return Err(DecodeError::Native(format!(
                    "codec reported {} pixel bytes for a {}x{} {:?} image",
                    raw.pixels_size, raw.width, raw.height, format
                )));
            }
        }

        let info = StreamInfo {
            status,
            width: raw.width,
            height: raw.height,
            pixels_size: if format.is_some() { raw.pixels_size } else { 0 },
            icc_size: raw.icc_size,
            alpha_bits: raw.alpha_bits,
        };
        debug!(
            "probe: {}x{}, {} pixel bytes, {} ICC bytes, {} alpha bits",
            info.width, info.height, info.pixels_size, info.icc_size, info.alpha_bits
        );

        self.probed = Some(Probed { format, info });
        Ok(info)
    }

    /// Decode the image into `pixels` and copy its ICC profile into `icc`.
    ///
    /// Only [`Status::Ok`] means the buffers hold valid data.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Contract`] without calling the codec if no
    /// successful probe with a pixel format preceded this call, if `format`
    /// differs from the probed one, or if a buffer length differs from the
    /// probed size.
    pub fn extract(
        &mut self,
        pixels: &mut [u8],
        icc: &mut [u8],
        format: PixelFormat,
    ) -> Result<Status, DecodeError> {
        let probed = self.probed.ok_or(ContractViolation::ProbeRequired)?;
        let probed_format = probed.format.ok_or(ContractViolation::MetadataOnlyProbe)?;
        if probed_format != format {
            return Err(ContractViolation::PixelFormatMismatch {
                probed: probed_format,
                requested: format,
            }
            .into());
        }
        check_capacity("pixel", probed.info.pixels_size, pixels.len())?;
        check_capacity("ICC", probed.info.icc_size, icc.len())?;

        let raw = self.codec.pixels(self.data, format, pixels, icc);
        let status = Status::from_code(raw.status).inspect_err(|_| {
            warn!("extract: codec returned unknown status code {}", raw.status);
        })?;
        debug!(
            "extract: {} input bytes, format {} -> {}",
            self.data.len(),
            format.ordinal(),
            status.code()
        );
        if let Some(cause) = &raw.cause {
            debug!("extract: {}", cause);
        }
        Ok(status)
    }
}

/// Format code as the codec's format table numbers it; -1 for metadata-only.
fn format_code(format: Option<PixelFormat>) -> i32 {
    format.map_or(-1, PixelFormat::ordinal)
}

fn check_capacity(
    buffer: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ContractViolation> {
    if expected == actual {
        Ok(())
    } else {
        Err(ContractViolation::BufferSize {
            buffer,
            expected,
            actual,
        })
    }
}

/// One-shot decode of a complete stream.
///
/// Probes, allocates exactly-sized buffers, extracts, and hands both buffers
/// over to the returned [`ImageData`]. No partial result is ever returned.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidStream`] or [`DecodeError::NotEnoughInput`]
/// for a non-OK status from either phase, and propagates contract and
/// native-boundary errors unchanged.
pub fn decode(
    codec: &dyn NativeCodec,
    data: &[u8],
    format: PixelFormat,
) -> Result<ImageData, DecodeError> {
    let mut bridge = DecodeBridge::new(codec, data);

    let info = bridge.probe(Some(format))?;
    info.status.into_result()?;

    trace!(
        "allocating {} pixel bytes and {} ICC bytes",
        info.pixels_size,
        info.icc_size
    );
    let mut pixels = vec![0u8; info.pixels_size];
    let mut icc = vec![0u8; info.icc_size];

    bridge
        .extract(&mut pixels, &mut icc, format)?
        .into_result()?;

    Ok(ImageData::new(info.width, info.height, pixels, icc, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::native::{RawBasicInfo, RawStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Codec returning fixed records and counting native calls.
    struct FixedCodec {
        info: RawBasicInfo,
        extract_status: i32,
        fill: u8,
        calls: AtomicUsize,
    }

    impl FixedCodec {
        fn ok(width: u32, height: u32) -> Self {
            Self {
                info: RawBasicInfo {
                    status: 0,
                    width,
                    height,
                    pixels_size: (width * height * 4) as usize,
                    icc_size: 3,
                    alpha_bits: 8,
                    cause: None,
                },
                extract_status: 0,
                fill: 0x7F,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl NativeCodec for FixedCodec {
        fn basic_info(&self, _data: &[u8], format: Option<PixelFormat>) -> RawBasicInfo {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut info = self.info.clone();
            if let Some(format) = format {
                info.pixels_size = (info.width * info.height) as usize * format.bytes_per_pixel();
            } else if info.status == 0 {
                info.pixels_size = 0;
            }
            info
        }

        fn pixels(
            &self,
            _data: &[u8],
            _format: PixelFormat,
            pixels: &mut [u8],
            icc: &mut [u8],
        ) -> RawStatus {
            self.calls.fetch_add(1, Ordering::SeqCst);
            pixels.fill(self.fill);
            icc.copy_from_slice(b"icc");
            RawStatus::new(self.extract_status)
        }
    }

    #[test]
    fn test_probe_reports_sizes() {
        let codec = FixedCodec::ok(4, 2);
        let mut bridge = DecodeBridge::new(&codec, b"stream");

        let info = bridge.probe(Some(PixelFormat::Rgba8888)).unwrap();
        assert!(info.is_ok());
        assert_eq!((info.width, info.height), (4, 2));
        assert_eq!(info.pixels_size, 32);
        assert_eq!(info.icc_size, 3);
        assert!(info.has_alpha());
        assert_eq!(bridge.last_probe(), Some(&info));
    }

    #[test]
    fn test_metadata_only_probe() {
        let codec = FixedCodec::ok(4, 2);
        let mut bridge = DecodeBridge::new(&codec, b"stream");

        let info = bridge.probe(None).unwrap();
        assert!(info.is_ok());
        assert_eq!(info.pixels_size, 0);

        let mut pixels = vec![0u8; 32];
        let mut icc = vec![0u8; 3];
        let err = bridge
            .extract(&mut pixels, &mut icc, PixelFormat::Rgba8888)
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Contract(ContractViolation::MetadataOnlyProbe)
        ));
        assert_eq!(codec.calls(), 1);
    }

    #[test]
    fn test_probe_failure_zeroes_fields() {
        let mut codec = FixedCodec::ok(4, 2);
        codec.info.status = 1;
        let mut bridge = DecodeBridge::new(&codec, b"str");

        let info = bridge.probe(Some(PixelFormat::Rgba8888)).unwrap();
        assert_eq!(info.status, Status::NotEnoughInput);
        assert_eq!(info.width, 0);
        assert_eq!(info.pixels_size, 0);
        assert!(bridge.last_probe().is_none());
    }

    #[test]
    fn test_probe_unknown_status_is_fatal() {
        let mut codec = FixedCodec::ok(4, 2);
        codec.info.status = 5;
        let mut bridge = DecodeBridge::new(&codec, b"stream");

        assert!(matches!(
            bridge.probe(Some(PixelFormat::Rgba8888)),
            Err(DecodeError::UnknownStatus(5))
        ));
    }

    #[test]
    fn test_extract_requires_probe() {
        let codec = FixedCodec::ok(4, 2);
        let mut bridge = DecodeBridge::new(&codec, b"stream");

        let mut pixels = vec![0u8; 32];
        let mut icc = vec![0u8; 3];
        let err = bridge
            .extract(&mut pixels, &mut icc, PixelFormat::Rgba8888)
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Contract(ContractViolation::ProbeRequired)
        ));
        assert_eq!(codec.calls(), 0);
    }

    #[test]
    fn test_extract_rejects_format_mismatch() {
        let codec = FixedCodec::ok(4, 2);
        let mut bridge = DecodeBridge::new(&codec, b"stream");
        bridge.probe(Some(PixelFormat::Rgb888)).unwrap();

        let mut pixels = vec![0u8; 24];
        let mut icc = vec![0u8; 3];
        let err = bridge
            .extract(&mut pixels, &mut icc, PixelFormat::Rgba8888)
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Contract(ContractViolation::PixelFormatMismatch {
                probed: PixelFormat::Rgb888,
                requested: PixelFormat::Rgba8888,
            })
        ));
        assert_eq!(codec.calls(), 1);
    }

    #[test]
    fn test_extract_rejects_wrong_buffer_sizes() {
        let codec = FixedCodec::ok(4, 2);
        let mut bridge = DecodeBridge::new(&codec, b"stream");
        bridge.probe(Some(PixelFormat::Rgba8888)).unwrap();

        let mut icc = vec![0u8; 3];
        for len in [0, 31, 33, 64] {
            let mut pixels = vec![0u8; len];
            let err = bridge
                .extract(&mut pixels, &mut icc, PixelFormat::Rgba8888)
                .unwrap_err();
            assert!(matches!(
                err,
                DecodeError::Contract(ContractViolation::BufferSize { buffer: "pixel", .. })
            ));
        }

        let mut pixels = vec![0u8; 32];
        let mut icc = vec![0u8; 4];
        let err = bridge
            .extract(&mut pixels, &mut icc, PixelFormat::Rgba8888)
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Contract(ContractViolation::BufferSize { buffer: "ICC", .. })
        ));
        assert_eq!(codec.calls(), 1);
    }

    #[test]
    fn test_failed_reprobe_invalidates_previous_probe() {
        struct FlipCodec(AtomicUsize);
        impl NativeCodec for FlipCodec {
            fn basic_info(&self, _data: &[u8], _format: Option<PixelFormat>) -> RawBasicInfo {
                if self.0.fetch_add(1, Ordering::SeqCst) == 0 {
                    RawBasicInfo {
                        status: 0,
                        width: 1,
                        height: 1,
                        pixels_size: 4,
                        ..Default::default()
                    }
                } else {
                    RawBasicInfo::with_status(-1)
                }
            }
            fn pixels(&self, _: &[u8], _: PixelFormat, _: &mut [u8], _: &mut [u8]) -> RawStatus {
                RawStatus::new(0)
            }
        }

        let codec = FlipCodec(AtomicUsize::new(0));
        let mut bridge = DecodeBridge::new(&codec, b"x");
        assert!(bridge.probe(Some(PixelFormat::Rgba8888)).unwrap().is_ok());
        assert!(!bridge.probe(Some(PixelFormat::Rgba8888)).unwrap().is_ok());

        let mut pixels = [0u8; 4];
        assert!(bridge
            .extract(&mut pixels, &mut [], PixelFormat::Rgba8888)
            .is_err());
    }

    #[test]
    fn test_probe_rejects_inconsistent_pixel_size() {
        struct LyingCodec;
        impl NativeCodec for LyingCodec {
            fn basic_info(&self, _data: &[u8], _format: Option<PixelFormat>) -> RawBasicInfo {
                RawBasicInfo {
                    status: 0,
                    width: 2,
                    height: 2,
                    pixels_size: 12,
                    ..Default::default()
                }
            }
            fn pixels(&self, _: &[u8], _: PixelFormat, _: &mut [u8], _: &mut [u8]) -> RawStatus {
                RawStatus::new(0)
            }
        }

        let mut bridge = DecodeBridge::new(&LyingCodec, b"x");
        assert!(matches!(
            bridge.probe(Some(PixelFormat::Rgba8888)),
            Err(DecodeError::Native(_))
        ));
    }

    #[test]
    fn test_decode_one_shot() {
        let codec = FixedCodec::ok(3, 2);
        let data = decode(&codec, b"stream", PixelFormat::Rgba8888).unwrap();

        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(data.pixels.len(), 3 * 2 * 4);
        assert!(data.pixels.iter().all(|&b| b == 0x7F));
        assert_eq!(data.icc, b"icc");
        assert_eq!(data.pixel_format, PixelFormat::Rgba8888);
        assert_eq!(codec.calls(), 2);
    }

    #[test]
    fn test_decode_maps_extract_status() {
        let mut codec = FixedCodec::ok(3, 2);
        codec.extract_status = -1;
        assert!(matches!(
            decode(&codec, b"stream", PixelFormat::Rgba8888),
            Err(DecodeError::InvalidStream)
        ));

        codec.extract_status = 1;
        assert!(matches!(
            decode(&codec, b"stream", PixelFormat::Rgba8888),
            Err(DecodeError::NotEnoughInput)
        ));

        codec.extract_status = 99;
        assert!(matches!(
            decode(&codec, b"stream", PixelFormat::Rgba8888),
            Err(DecodeError::UnknownStatus(99))
        ));
    }

    #[test]
    fn test_decode_stops_after_failed_probe() {
        let mut codec = FixedCodec::ok(3, 2);
        codec.info.status = -1;
        assert!(matches!(
            decode(&codec, b"stream", PixelFormat::Rgba8888),
            Err(DecodeError::InvalidStream)
        ));
        assert_eq!(codec.calls(), 1);
    }

    #[test]
    fn test_format_code() {
        assert_eq!(format_code(None), -1);
        assert_eq!(format_code(Some(PixelFormat::Rgba8888)), 0);
        assert_eq!(format_code(Some(PixelFormat::Rgb888)), 1);
    }
}
