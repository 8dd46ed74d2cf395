//! Byte-signature based format detection.
//!
//! A host image loader asks every registered format whether it claims a
//! stream by handing over the first few bytes. JPEG XL streams start either
//! with the bare codestream marker or with the ISOBMFF `JXL ` signature box.

/// A byte pattern a stream prefix must match at offset 0.
///
/// `None` positions are wildcards and accept any byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    bytes: &'static [Option<u8>],
}

impl Signature {
    /// Create a signature from a pattern that may contain wildcards.
    pub const fn with_wildcards(bytes: &'static [Option<u8>]) -> Self {
        Self { bytes }
    }

    /// Number of bytes a prefix needs before this signature can match.
    #[inline]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the signature has no positions at all.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check whether `prefix` starts with this signature.
    ///
    /// A prefix shorter than the signature never matches.
    pub fn matches(&self, prefix: &[u8]) -> bool {
        if prefix.len() < self.bytes.len() {
            return false;
        }
        self.bytes
            .iter()
            .zip(prefix)
            .all(|(expected, actual)| expected.map_or(true, |b| b == *actual))
    }
}

/// Registration data for an image format.
#[derive(Debug, Clone, Copy)]
pub struct FormatDescriptor {
    /// Human readable format name.
    pub name: &'static str,
    /// File extensions without the leading dot.
    pub extensions: &'static [&'static str],
    /// MIME types the format is served under.
    pub mime_types: &'static [&'static str],
    /// Alternative signatures; matching any one of them is sufficient.
    pub signatures: &'static [Signature],
}

impl FormatDescriptor {
    /// Returns true if any registered signature matches `prefix`.
    pub fn claims(&self, prefix: &[u8]) -> bool {
        self.signatures.iter().any(|sig| sig.matches(prefix))
    }

    /// Longest signature, i.e. how many bytes a host should peek.
    pub fn max_signature_len(&self) -> usize {
        self.signatures.iter().map(Signature::len).max().unwrap_or(0)
    }

    /// Case-insensitive extension lookup. A leading dot is ignored.
    pub fn matches_extension(&self, extension: &str) -> bool {
        let extension = extension.strip_prefix('.').unwrap_or(extension);
        self.extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    pub fn matches_mime_type(&self, mime_type: &str) -> bool {
        self.mime_types
            .iter()
            .any(|mime| mime.eq_ignore_ascii_case(mime_type.trim()))
    }
}

const CODESTREAM_MARKER: [Option<u8>; 2] = [Some(0xFF), Some(0x0A)];

const CONTAINER_MARKER: [Option<u8>; 12] = [
    Some(0x00),
    Some(0x00),
    Some(0x00),
    Some(0x0C),
    Some(b'J'),
    Some(b'X'),
    Some(b'L'),
    Some(b' '),
    Some(0x0D),
    Some(0x0A),
    Some(0x87),
    Some(0x0A),
];

/// Bare JPEG XL codestream (`FF 0A`).
pub const CODESTREAM_SIGNATURE: Signature = Signature::with_wildcards(&CODESTREAM_MARKER);

/// JPEG XL container signature box.
pub const CONTAINER_SIGNATURE: Signature = Signature::with_wildcards(&CONTAINER_MARKER);

/// The JPEG XL format as registered with a host loader.
pub const JXL_FORMAT: FormatDescriptor = FormatDescriptor {
    name: "JpegXL",
    extensions: &["jxl"],
    mime_types: &["image/jxl", "image/jpeg-xl"],
    signatures: &[CODESTREAM_SIGNATURE, CONTAINER_SIGNATURE],
};

/// Check if bytes start like a JPEG XL stream (codestream or container).
pub fn is_jxl(prefix: &[u8]) -> bool {
    JXL_FORMAT.claims(prefix)
}
