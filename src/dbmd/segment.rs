// Dolby Atmos metadata segment decoders
//
// Two segment payloads are understood: the Dolby Atmos segment (creation
// tool and rendering metadata) and the Dolby Atmos supplemental segment
// (per-object binaural render modes and trim presets). Each is preceded in
// the chunk by a 1-byte segment ID and 2-byte payload size, and followed
// by a 1-byte checksum; the dispatch loop in the parent module hands the
// decoder a cursor positioned at the first payload byte.

use serde::Serialize;

use crate::dbmd::checksum::segment_checksum;
use crate::dbmd::cursor::ByteCursor;
use crate::error::{MetadataError, SegmentKind};
use crate::utils::encoding::decode_fixed_str;

/// Fixed payload size of the Dolby Atmos segment
pub const ATMOS_SEGMENT_SIZE: u16 = 248;

/// Sync word opening the supplemental segment payload
pub const SUPPLEMENTAL_SYNC: u32 = 0xf872_6fbd;

/// Most objects a supplemental segment may describe
pub const MAX_OBJECT_COUNT: u16 = 128;

/// Number of speaker-layout trim presets carried by the supplemental segment
pub const NUM_TRIM_CONFIGS: usize = 9;

const CREATION_TOOL_LEN: usize = 64;

/// Warp (downmix) mode from the Dolby Atmos segment.
///
/// Only the low 3 bits of the source byte carry the mode. Values 5-7 are
/// reserved by the format but not forbidden, so they are retained raw
/// instead of rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarpMode {
    Normal,
    Warping,
    DownmixProLogicIIx,
    DownmixLoRo,
    NotIndicated,
    Reserved(u8),
}

impl WarpMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits {
            0x0 => WarpMode::Normal,
            0x1 => WarpMode::Warping,
            0x2 => WarpMode::DownmixProLogicIIx,
            0x3 => WarpMode::DownmixLoRo,
            0x4 => WarpMode::NotIndicated,
            other => WarpMode::Reserved(other),
        }
    }
}

/// Per-object binaural render mode from the supplemental segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinauralRenderMode {
    Bypass,
    Near,
    Far,
    Mid,
    NotIndicated,
    Reserved(u8),
}

impl BinauralRenderMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits {
            0x0 => BinauralRenderMode::Bypass,
            0x1 => BinauralRenderMode::Near,
            0x2 => BinauralRenderMode::Far,
            0x3 => BinauralRenderMode::Mid,
            0x4 => BinauralRenderMode::NotIndicated,
            other => BinauralRenderMode::Reserved(other),
        }
    }
}

impl std::fmt::Display for WarpMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarpMode::Normal => write!(f, "normal"),
            WarpMode::Warping => write!(f, "warping"),
            WarpMode::DownmixProLogicIIx => write!(f, "downmix Dolby Pro Logic IIx"),
            WarpMode::DownmixLoRo => write!(f, "downmix LoRo"),
            WarpMode::NotIndicated => write!(f, "not indicated"),
            WarpMode::Reserved(bits) => write!(f, "reserved ({})", bits),
        }
    }
}

impl std::fmt::Display for BinauralRenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinauralRenderMode::Bypass => write!(f, "bypass"),
            BinauralRenderMode::Near => write!(f, "near"),
            BinauralRenderMode::Far => write!(f, "far"),
            BinauralRenderMode::Mid => write!(f, "mid"),
            BinauralRenderMode::NotIndicated => write!(f, "not indicated"),
            BinauralRenderMode::Reserved(bits) => write!(f, "reserved ({})", bits),
        }
    }
}

/// Creation-tool version triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolVersion {
    pub major: u8,
    pub minor: u8,
    pub micro: u8,
}

/// One speaker-layout trim preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrimConfig {
    /// Low bit of the preset's first byte: trims applied automatically
    /// rather than authored manually
    pub auto_trim: bool,
}

/// Decoded Dolby Atmos metadata segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtmosSegment {
    pub creation_tool: String,
    pub tool_version: ToolVersion,
    pub warp_mode: WarpMode,
}

/// Decoded Dolby Atmos supplemental metadata segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtmosSupplementalSegment {
    pub object_count: u16,
    pub trims: [TrimConfig; NUM_TRIM_CONFIGS],
    /// One entry per object, exactly `object_count` long
    pub binaural_render_modes: Vec<BinauralRenderMode>,
}

/// Verify the checksum byte trailing a segment payload.
///
/// The declared size locates the checksum byte; the whole span must still
/// be inside the buffer, so a lying size fails as OutOfBounds before it
/// fails as a bad checksum.
fn verify_checksum(
    cursor: &ByteCursor<'_>,
    size: usize,
    segment: SegmentKind,
) -> Result<(), MetadataError> {
    let span = cursor.view(size + 1)?;
    if span[size] != segment_checksum(&span[..size]) {
        return Err(MetadataError::ChecksumMismatch { segment });
    }
    Ok(())
}

impl AtmosSegment {
    /// Decode a Dolby Atmos segment payload.
    ///
    /// Leaves the cursor on the byte after the segment's checksum.
    pub(crate) fn decode(
        cursor: &mut ByteCursor<'_>,
        declared_size: u16,
    ) -> Result<Self, MetadataError> {
        // This segment has a single fixed layout; any other size is a
        // different revision we do not understand.
        if declared_size != ATMOS_SEGMENT_SIZE {
            return Err(MetadataError::WrongSegmentSize {
                size: declared_size,
            });
        }

        let size = declared_size as usize;
        verify_checksum(cursor, size, SegmentKind::Atmos)?;

        let mut read = 0usize;

        cursor.skip(32)?;
        read += 32;

        // content_information
        let creation_tool = decode_fixed_str(cursor.view(CREATION_TOOL_LEN)?);
        cursor.skip(CREATION_TOOL_LEN)?;
        read += CREATION_TOOL_LEN;

        let tool_version = ToolVersion {
            major: cursor.read_u8()?,
            minor: cursor.read_u8()?,
            micro: cursor.read_u8()?,
        };
        read += 3;

        cursor.skip(53)?;
        read += 53;

        // additional_rendering_metadata: the warp mode shares one byte with
        // reserved bits, followed by 15 more reserved bytes
        let packed = cursor.read_u8()?;
        cursor.skip(15)?;
        read += 1 + 15;
        let warp_mode = WarpMode::from_bits(packed & 0x07);

        cursor.skip(80)?;
        read += 80;

        // Remaining declared bytes plus the checksum, so the cursor lands
        // on the next segment ID
        cursor.skip(size + 1 - read)?;

        Ok(AtmosSegment {
            creation_tool,
            tool_version,
            warp_mode,
        })
    }
}

impl AtmosSupplementalSegment {
    /// Decode a Dolby Atmos supplemental segment payload.
    ///
    /// Leaves the cursor on the byte after the segment's checksum.
    pub(crate) fn decode(
        cursor: &mut ByteCursor<'_>,
        declared_size: u16,
    ) -> Result<Self, MetadataError> {
        let size = declared_size as usize;
        verify_checksum(cursor, size, SegmentKind::Supplemental)?;

        let mut read = 0usize;

        let sync = cursor.read_u32()?;
        read += 4;
        if sync != SUPPLEMENTAL_SYNC {
            return Err(MetadataError::BadSyncWord { found: sync });
        }

        let object_count = cursor.read_u16()?;
        read += 2;
        if object_count > MAX_OBJECT_COUNT {
            return Err(MetadataError::TooManyObjects {
                count: object_count,
            });
        }

        cursor.skip(1)?;
        read += 1;

        let mut trims = [TrimConfig { auto_trim: false }; NUM_TRIM_CONFIGS];
        for trim in trims.iter_mut() {
            let packed = cursor.read_u8()?;
            trim.auto_trim = packed & 0x01 != 0;
            cursor.skip(14)?;
            read += 15;
        }

        // Legacy per-object field, one byte per object, not surfaced
        cursor.skip(object_count as usize)?;
        read += object_count as usize;

        // headphone metadata
        let mut binaural_render_modes = Vec::with_capacity(object_count as usize);
        for _ in 0..object_count {
            let packed = cursor.read_u8()?;
            binaural_render_modes.push(BinauralRenderMode::from_bits(packed & 0x07));
            read += 1;
        }

        // A declared size smaller than the fixed layout already consumed
        // leaves nothing to realign over
        cursor.skip((size + 1).saturating_sub(read))?;

        Ok(AtmosSupplementalSegment {
            object_count,
            trims,
            binaural_render_modes,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;

    fn decode_atmos(buf: &[u8], declared_size: u16) -> Result<AtmosSegment, MetadataError> {
        let mut cursor = ByteCursor::new(buf);
        AtmosSegment::decode(&mut cursor, declared_size)
    }

    fn decode_supplemental(
        buf: &[u8],
        declared_size: u16,
    ) -> Result<AtmosSupplementalSegment, MetadataError> {
        let mut cursor = ByteCursor::new(buf);
        AtmosSupplementalSegment::decode(&mut cursor, declared_size)
    }

    #[test]
    fn test_atmos_round_trip() {
        let payload = atmos_payload("Dolby Atmos Production Suite", (3, 7, 2), 0x01);
        let buf = with_checksum(&payload);

        let segment = decode_atmos(&buf, ATMOS_SEGMENT_SIZE).unwrap();
        assert_eq!(segment.creation_tool, "Dolby Atmos Production Suite");
        assert_eq!(
            segment.tool_version,
            ToolVersion {
                major: 3,
                minor: 7,
                micro: 2
            }
        );
        assert_eq!(segment.warp_mode, WarpMode::Warping);
    }

    #[test]
    fn test_atmos_tool_name_truncated_at_field_width() {
        let long_name = "x".repeat(80);
        let payload = atmos_payload(&long_name, (1, 0, 0), 0x00);
        let buf = with_checksum(&payload);

        let segment = decode_atmos(&buf, ATMOS_SEGMENT_SIZE).unwrap();
        assert_eq!(segment.creation_tool, "x".repeat(64));
    }

    #[test]
    fn test_atmos_warp_mode_masks_high_bits() {
        // 0xf9 carries warp bits 0b001 under reserved high bits
        let payload = atmos_payload("tool", (1, 0, 0), 0xf9);
        let buf = with_checksum(&payload);

        let segment = decode_atmos(&buf, ATMOS_SEGMENT_SIZE).unwrap();
        assert_eq!(segment.warp_mode, WarpMode::Warping);
    }

    #[test]
    fn test_atmos_reserved_warp_values_tolerated() {
        for bits in 5u8..=7 {
            let payload = atmos_payload("tool", (1, 0, 0), bits);
            let buf = with_checksum(&payload);
            let segment = decode_atmos(&buf, ATMOS_SEGMENT_SIZE).unwrap();
            assert_eq!(segment.warp_mode, WarpMode::Reserved(bits));
        }
    }

    #[test]
    fn test_atmos_rejects_off_by_one_sizes() {
        let payload = atmos_payload("tool", (1, 0, 0), 0x00);
        let buf = with_checksum(&payload);

        for size in [247u16, 249] {
            match decode_atmos(&buf, size) {
                Err(MetadataError::WrongSegmentSize { size: found }) => {
                    assert_eq!(found, size)
                }
                other => panic!("expected WrongSegmentSize, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_atmos_checksum_mismatch() {
        let payload = atmos_payload("tool", (1, 0, 0), 0x00);
        let mut buf = with_checksum(&payload);
        *buf.last_mut().unwrap() ^= 0xff;

        match decode_atmos(&buf, ATMOS_SEGMENT_SIZE) {
            Err(MetadataError::ChecksumMismatch { segment }) => {
                assert_eq!(segment, SegmentKind::Atmos)
            }
            other => panic!("expected ChecksumMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_atmos_truncated_buffer_is_out_of_bounds() {
        let payload = atmos_payload("tool", (1, 0, 0), 0x00);
        let buf = with_checksum(&payload);

        // Checksum byte missing entirely
        assert!(matches!(
            decode_atmos(&buf[..buf.len() - 1], ATMOS_SEGMENT_SIZE),
            Err(MetadataError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_atmos_leaves_cursor_on_next_segment() {
        let payload = atmos_payload("tool", (1, 0, 0), 0x00);
        let mut buf = with_checksum(&payload);
        buf.push(0xee);

        let mut cursor = ByteCursor::new(&buf);
        AtmosSegment::decode(&mut cursor, ATMOS_SEGMENT_SIZE).unwrap();
        assert_eq!(cursor.read_u8().unwrap(), 0xee);
    }

    #[test]
    fn test_supplemental_round_trip() {
        let mut auto_trims = [false; NUM_TRIM_CONFIGS];
        auto_trims[0] = true;
        auto_trims[8] = true;
        let payload = supplemental_payload(&[0x00, 0x03, 0x04], auto_trims);
        let buf = with_checksum(&payload);

        let segment = decode_supplemental(&buf, payload.len() as u16).unwrap();
        assert_eq!(segment.object_count, 3);
        assert_eq!(
            segment.binaural_render_modes,
            vec![
                BinauralRenderMode::Bypass,
                BinauralRenderMode::Mid,
                BinauralRenderMode::NotIndicated,
            ]
        );
        assert!(segment.trims[0].auto_trim);
        assert!(!segment.trims[1].auto_trim);
        assert!(segment.trims[8].auto_trim);
    }

    #[test]
    fn test_supplemental_mode_bytes_masked_to_low_bits() {
        // High bits are reserved; 0xfa decodes as mode 2
        let payload = supplemental_payload(&[0xfa], [false; NUM_TRIM_CONFIGS]);
        let buf = with_checksum(&payload);

        let segment = decode_supplemental(&buf, payload.len() as u16).unwrap();
        assert_eq!(segment.binaural_render_modes, vec![BinauralRenderMode::Far]);
    }

    #[test]
    fn test_supplemental_max_object_count_accepted() {
        let modes = vec![0x01u8; MAX_OBJECT_COUNT as usize];
        let payload = supplemental_payload(&modes, [false; NUM_TRIM_CONFIGS]);
        let buf = with_checksum(&payload);

        let segment = decode_supplemental(&buf, payload.len() as u16).unwrap();
        assert_eq!(segment.object_count, MAX_OBJECT_COUNT);
        assert_eq!(segment.binaural_render_modes.len(), 128);
    }

    #[test]
    fn test_supplemental_object_count_above_max_rejected() {
        let modes = vec![0x01u8; MAX_OBJECT_COUNT as usize + 1];
        let payload = supplemental_payload(&modes, [false; NUM_TRIM_CONFIGS]);
        let buf = with_checksum(&payload);

        match decode_supplemental(&buf, payload.len() as u16) {
            Err(MetadataError::TooManyObjects { count }) => assert_eq!(count, 129),
            other => panic!("expected TooManyObjects, got {:?}", other),
        }
    }

    #[test]
    fn test_supplemental_sync_off_by_one_bit() {
        let mut payload = supplemental_payload(&[0x01], [false; NUM_TRIM_CONFIGS]);
        payload[0] ^= 0x01;
        let buf = with_checksum(&payload);

        match decode_supplemental(&buf, payload.len() as u16) {
            Err(MetadataError::BadSyncWord { found }) => {
                assert_eq!(found, SUPPLEMENTAL_SYNC ^ 0x01)
            }
            other => panic!("expected BadSyncWord, got {:?}", other),
        }
    }

    #[test]
    fn test_supplemental_checksum_mismatch() {
        let payload = supplemental_payload(&[0x01], [false; NUM_TRIM_CONFIGS]);
        let mut buf = with_checksum(&payload);
        *buf.last_mut().unwrap() ^= 0x10;

        match decode_supplemental(&buf, payload.len() as u16) {
            Err(MetadataError::ChecksumMismatch { segment }) => {
                assert_eq!(segment, SegmentKind::Supplemental)
            }
            other => panic!("expected ChecksumMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_supplemental_zero_objects() {
        let payload = supplemental_payload(&[], [true; NUM_TRIM_CONFIGS]);
        let buf = with_checksum(&payload);

        let segment = decode_supplemental(&buf, payload.len() as u16).unwrap();
        assert_eq!(segment.object_count, 0);
        assert!(segment.binaural_render_modes.is_empty());
        assert!(segment.trims.iter().all(|t| t.auto_trim));
    }

    #[test]
    fn test_supplemental_leaves_cursor_on_next_segment() {
        // Payload padded beyond the decoded fields still realigns exactly
        let mut payload = supplemental_payload(&[0x01, 0x02], [false; NUM_TRIM_CONFIGS]);
        payload.extend_from_slice(&[0u8; 10]);
        let mut buf = with_checksum(&payload);
        buf.push(0x09);

        let mut cursor = ByteCursor::new(&buf);
        AtmosSupplementalSegment::decode(&mut cursor, payload.len() as u16).unwrap();
        assert_eq!(cursor.read_u8().unwrap(), 0x09);
    }
}
