use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::DecodeError;

/// First two bytes of any gzip stream, which is what a `.lottie` container is.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// On-disk container for an animation document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Plain UTF-8 JSON (`.json`).
    Plain,
    /// Gzip-compressed JSON (`.lottie`).
    Compressed,
}

impl ContainerFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Plain => "json",
            Self::Compressed => "lottie",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Plain),
            "lottie" => Some(Self::Compressed),
            _ => None,
        }
    }
}

/// Detects the container format of a raw byte blob.
///
/// Magic-byte evidence wins outright; the first non-whitespace character is
/// checked next, and the filename extension only breaks ties when the
/// content itself is ambiguous. Unrecognized content defaults to plain JSON.
pub fn detect_format(bytes: &[u8], filename: Option<&str>) -> ContainerFormat {
    if bytes.len() >= 2 && bytes[..2] == GZIP_MAGIC {
        return ContainerFormat::Compressed;
    }

    if let Some(first) = bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        if *first == b'{' || *first == b'[' {
            return ContainerFormat::Plain;
        }
    }

    if let Some(format) = filename
        .and_then(file_extension)
        .and_then(|ext| ContainerFormat::from_extension(&ext))
    {
        return format;
    }

    ContainerFormat::Plain
}

fn file_extension(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Gzip-decodes a `.lottie` container back to JSON bytes.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Gzip-encodes JSON bytes into a `.lottie` container.
///
/// The compression level is part of the contract: level 9 keeps output
/// byte-identical across runs for identical input.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_gzip_magic_over_json_extension() {
        let bytes = [0x1f, 0x8b, 0x08, 0x00];
        assert_eq!(
            detect_format(&bytes, Some("animation.json")),
            ContainerFormat::Compressed
        );
    }

    #[test]
    fn detects_plain_json_by_leading_brace() {
        assert_eq!(
            detect_format(b"  {\"v\":\"5.9.6\"}", Some("animation.lottie")),
            ContainerFormat::Plain
        );
        assert_eq!(detect_format(b"[1,2,3]", None), ContainerFormat::Plain);
    }

    #[test]
    fn extension_breaks_ties_on_ambiguous_content() {
        assert_eq!(
            detect_format(b"not json at all", Some("anim.lottie")),
            ContainerFormat::Compressed
        );
        assert_eq!(
            detect_format(b"not json at all", Some("anim.json")),
            ContainerFormat::Plain
        );
        assert_eq!(detect_format(b"not json at all", None), ContainerFormat::Plain);
    }

    #[test]
    fn compress_then_decompress_is_identity() {
        let payload = br#"{"v":"5.9.6","fr":30,"w":512,"h":512,"layers":[]}"#;
        let packed = compress(payload).unwrap();
        assert_eq!(packed[..2], GZIP_MAGIC);
        assert_eq!(decompress(&packed).unwrap(), payload);
    }

    #[test]
    fn compress_is_deterministic() {
        let payload = vec![7u8; 4096];
        assert_eq!(compress(&payload).unwrap(), compress(&payload).unwrap());
    }

    #[test]
    fn decompress_rejects_non_gzip() {
        assert!(decompress(b"{\"v\":1}").is_err());
    }
}
