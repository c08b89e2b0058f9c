// I/O utilities for reading WAV containers

use std::io::{Read, Seek, SeekFrom};

/// Read a 4-byte chunk tag
pub fn read_tag<R: Read>(reader: &mut R) -> std::io::Result<[u8; 4]> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

/// Read little-endian 16-bit integer
#[allow(dead_code)]
pub fn read_le_u16<R: Read>(reader: &mut R) -> std::io::Result<u16> {
    let mut buffer = [0u8; 2];
    reader.read_exact(&mut buffer)?;
    Ok(u16::from_le_bytes(buffer))
}

/// Read little-endian 32-bit integer
pub fn read_le_u32<R: Read>(reader: &mut R) -> std::io::Result<u32> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(u32::from_le_bytes(buffer))
}

/// Read the next chunk tag and declared size.
///
/// Returns `Ok(None)` when the stream ends cleanly before a full 8-byte
/// chunk header, which is how a chunk scan terminates.
pub fn read_chunk_header<R: Read>(reader: &mut R) -> std::io::Result<Option<([u8; 4], u32)>> {
    let mut buffer = [0u8; 8];
    match reader.read_exact(&mut buffer) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let mut tag = [0u8; 4];
    tag.copy_from_slice(&buffer[0..4]);
    let size = u32::from_le_bytes([buffer[4], buffer[5], buffer[6], buffer[7]]);
    Ok(Some((tag, size)))
}

/// Seek forward past a chunk payload without reading it.
///
/// Payloads may exceed the 32-bit range (64-bit data chunks), so the
/// offset is taken as u64 and seeked in one relative step.
pub fn skip_bytes<R: Seek>(reader: &mut R, count: u64) -> std::io::Result<()> {
    if count > 0 {
        reader.seek(SeekFrom::Current(count as i64))?;
    }
    Ok(())
}
