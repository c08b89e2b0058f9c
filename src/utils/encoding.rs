// Encoding utilities

use encoding_rs::WINDOWS_1252;

/// Decode a fixed-length, NUL-padded byte field into a string.
///
/// The creation-tool field is nominally ASCII but externally produced, so
/// anything past 0x7F is decoded as Windows-1252 rather than rejected.
pub fn decode_fixed_str(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    WINDOWS_1252.decode(&bytes[..end]).0.to_string()
}
