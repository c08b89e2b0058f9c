// Metadata segment checksum

/// Compute the 8-bit checksum of a segment payload.
///
/// The accumulator is seeded with the payload length, every payload byte
/// is added mod 256, and the result is the two's complement of the running
/// sum. A segment stores this value in the byte directly after its
/// payload, so summing length, payload, and stored checksum yields zero
/// mod 256 for an intact segment.
pub fn segment_checksum(payload: &[u8]) -> u8 {
    let mut sum = payload.len() as u8;
    for &byte in payload {
        sum = sum.wrapping_add(byte);
    }
    sum.wrapping_neg()
}
