//! Program image decoding and placement.
//!
//! Images come in two encodings, autodetected from the file contents: a raw
//! binary, or an ASCII dump of hex digit pairs with arbitrary whitespace
//! between them. On top of the encoding sits a load convention that decides
//! where the bytes land and where execution starts.

use thiserror::Error;

/// Initial stack pointer, and the minimum size an image is padded to so the
/// stack has backing store.
pub const STACK_TOP: u16 = 0x2000;

const ADDRESS_SPACE: usize = 0x1_0000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("program image is empty")]
    Empty,
    #[error("ASCII hex image has an odd number of digits")]
    DanglingNibble,
    #[error("{len} bytes at origin {origin:#06x} exceed the 64 KiB address space")]
    TooLarge { len: usize, origin: u16 },
    #[error("unknown load format {0:?}, expected raw, com or diag")]
    UnknownFormat(String),
}

/// Load convention applied when placing a decoded image.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LoadFormat {
    /// Image at address 0, execution starts at its first byte.
    #[default]
    Raw,
    /// CP/M style: image at 0x0100 with the low page left clear, execution
    /// starts at 0x0100.
    Com,
    /// Diagnostic style: image at 0x0100 with a JMP to it patched at address
    /// 0, execution starts at 0.
    Diag,
}

impl LoadFormat {
    pub fn origin(self) -> u16 {
        match self {
            LoadFormat::Raw => 0x0000,
            LoadFormat::Com | LoadFormat::Diag => 0x0100,
        }
    }
}

impl std::str::FromStr for LoadFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(LoadFormat::Raw),
            "com" => Ok(LoadFormat::Com),
            "diag" => Ok(LoadFormat::Diag),
            other => Err(ImageError::UnknownFormat(other.to_string())),
        }
    }
}

/// Decode file contents into program bytes.
///
/// A file made up entirely of hex digits and whitespace is read as ASCII
/// hex, two digits per byte. Anything else is taken verbatim as binary.
pub fn decode(data: &[u8]) -> Result<Vec<u8>, ImageError> {
    if !looks_like_hex(data) {
        if data.is_empty() {
            return Err(ImageError::Empty);
        }
        return Ok(data.to_vec());
    }
    let digits: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| b.is_ascii_hexdigit())
        .collect();
    if digits.len() % 2 != 0 {
        return Err(ImageError::DanglingNibble);
    }
    let bytes: Vec<u8> = digits
        .chunks_exact(2)
        .map(|pair| hex_value(pair[0]) << 4 | hex_value(pair[1]))
        .collect();
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }
    log::debug!("decoded {} bytes of ASCII hex", bytes.len());
    Ok(bytes)
}

fn looks_like_hex(data: &[u8]) -> bool {
    !data.is_empty()
        && data
            .iter()
            .all(|b| b.is_ascii_hexdigit() || b.is_ascii_whitespace())
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Place decoded bytes into a memory image per the load convention.
///
/// Returns the image and the entry point. `org` overrides the convention's
/// origin. The image is zero padded to at least [`STACK_TOP`] bytes so the
/// initial stack is addressable.
pub fn build(bytes: &[u8], format: LoadFormat, org: Option<u16>) -> Result<(Vec<u8>, u16), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }
    let origin = org.unwrap_or_else(|| format.origin());
    let end = origin as usize + bytes.len();
    if end > ADDRESS_SPACE {
        return Err(ImageError::TooLarge {
            len: bytes.len(),
            origin,
        });
    }
    let mut image = vec![0u8; end.max(STACK_TOP as usize)];
    image[origin as usize..end].copy_from_slice(bytes);
    let entry = match format {
        LoadFormat::Raw | LoadFormat::Com => origin,
        LoadFormat::Diag => {
            if origin >= 3 {
                image[0] = 0xC3;
                image[1] = origin as u8;
                image[2] = (origin >> 8) as u8;
            }
            0x0000
        }
    };
    log::debug!(
        "placed {} bytes at {:#06x} ({:?}), image size {:#x}, entry {:#06x}",
        bytes.len(),
        origin,
        format,
        image.len(),
        entry
    );
    Ok((image, entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_binary_passthrough() {
        let data = [0xC3, 0x00, 0x01, 0x76];
        assert_eq!(decode(&data).unwrap(), data.to_vec());
    }

    #[test]
    fn test_decode_ascii_hex() {
        let data = b"c3 00 01\n76\n";
        assert_eq!(decode(data).unwrap(), vec![0xC3, 0x00, 0x01, 0x76]);
    }

    #[test]
    fn test_decode_mixed_case_hex() {
        assert_eq!(decode(b"Ff 0a B9").unwrap(), vec![0xFF, 0x0A, 0xB9]);
    }

    #[test]
    fn test_decode_dangling_nibble() {
        assert_eq!(decode(b"c3 0"), Err(ImageError::DanglingNibble));
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(b""), Err(ImageError::Empty));
        assert_eq!(decode(b"  \n "), Err(ImageError::Empty));
    }

    #[test]
    fn test_decode_text_with_non_hex_is_binary() {
        // "start" contains letters outside a..f, so this is raw binary.
        let data = b"start";
        assert_eq!(decode(data).unwrap(), data.to_vec());
    }

    #[test]
    fn test_build_raw() {
        let (image, entry) = build(&[0x76], LoadFormat::Raw, None).unwrap();
        assert_eq!(entry, 0x0000);
        assert_eq!(image.len(), STACK_TOP as usize);
        assert_eq!(image[0], 0x76);
    }

    #[test]
    fn test_build_com() {
        let (image, entry) = build(&[0x3E, 0x42, 0x76], LoadFormat::Com, None).unwrap();
        assert_eq!(entry, 0x0100);
        assert_eq!(&image[0x100..0x103], &[0x3E, 0x42, 0x76]);
        assert_eq!(image[0x0000], 0x00);
    }

    #[test]
    fn test_build_diag_patches_jump() {
        let (image, entry) = build(&[0x76], LoadFormat::Diag, None).unwrap();
        assert_eq!(entry, 0x0000);
        assert_eq!(&image[0..3], &[0xC3, 0x00, 0x01]);
        assert_eq!(image[0x100], 0x76);
    }

    #[test]
    fn test_build_org_override() {
        let (image, entry) = build(&[0x76], LoadFormat::Raw, Some(0x0800)).unwrap();
        assert_eq!(entry, 0x0800);
        assert_eq!(image[0x0800], 0x76);
    }

    #[test]
    fn test_build_pads_to_stack_top() {
        let (image, _) = build(&[0x00; 16], LoadFormat::Raw, None).unwrap();
        assert_eq!(image.len(), 0x2000);
    }

    #[test]
    fn test_build_keeps_large_images() {
        let (image, _) = build(&[0xFF; 0x4000], LoadFormat::Raw, None).unwrap();
        assert_eq!(image.len(), 0x4000);
    }

    #[test]
    fn test_build_too_large() {
        let bytes = vec![0u8; 0x300];
        assert!(matches!(
            build(&bytes, LoadFormat::Raw, Some(0xFF00)),
            Err(ImageError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("raw".parse::<LoadFormat>().unwrap(), LoadFormat::Raw);
        assert_eq!("com".parse::<LoadFormat>().unwrap(), LoadFormat::Com);
        assert_eq!("diag".parse::<LoadFormat>().unwrap(), LoadFormat::Diag);
        assert!("bin".parse::<LoadFormat>().is_err());
    }
}
