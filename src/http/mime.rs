//! Image type detection module
//!
//! Content types come from the leading magic bytes, never from a client-sent
//! file name or header.

pub const PNG: &str = "image/png";

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Detect an image Content-Type from the first bytes of a file
///
/// # Examples
/// ```
/// use movie_gateway::http::mime::sniff_image_type;
/// assert_eq!(sniff_image_type(b"\x89PNG\r\n\x1a\n...."), Some("image/png"));
/// assert_eq!(sniff_image_type(b"\xFF\xD8\xFF\xE0"), Some("image/jpeg"));
/// assert_eq!(sniff_image_type(b"hello"), None);
/// ```
pub fn sniff_image_type(data: &[u8]) -> Option<&'static str> {
    match data {
        [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(PNG),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        _ => None,
    }
}

/// Whether the bytes start with the PNG signature
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}
