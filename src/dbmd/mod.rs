// Dolby audio metadata (dbmd) chunk decoding
//
// The dbmd chunk opens with a 4-byte version word and then carries a list
// of checksummed segments, each tagged with a 1-byte ID and a 2-byte size,
// terminated by a zero ID. Segment types we do not know are skipped by
// their declared length so newer files still decode.

pub mod checksum;
pub mod cursor;
pub mod segment;

use serde::Serialize;

use crate::dbmd::cursor::ByteCursor;
use crate::error::MetadataError;
pub use crate::dbmd::segment::{
    AtmosSegment, AtmosSupplementalSegment, BinauralRenderMode, ToolVersion, TrimConfig, WarpMode,
};

/// Highest metadata version this decoder is current to (1.0.0.7)
pub const PARSER_VERSION: u32 = 0x0100_0007;

/// Largest dbmd chunk the container layer will buffer
pub const MAX_DBMD_SIZE: u32 = 6144;

const ATMOS_SEGMENT_ID: u8 = 0x09;
const SUPPLEMENTAL_SEGMENT_ID: u8 = 0x0a;
const END_SEGMENT_ID: u8 = 0x00;

/// Everything decoded from one dbmd chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DolbyMetadata {
    /// Version word from the head of the chunk
    pub version: u32,
    pub atmos: Option<AtmosSegment>,
    pub supplemental: Option<AtmosSupplementalSegment>,
}

impl DolbyMetadata {
    /// Version word rendered as its four packed fields, e.g. "1.0.0.7"
    pub fn version_string(&self) -> String {
        let bytes = self.version.to_be_bytes();
        format!("{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

/// Whether a file's metadata version is not newer than the parser's.
///
/// The packed version words are compared byte-wise from most significant
/// to least: the first differing byte decides, and a lower or equal file
/// version is always accepted.
pub fn version_supported(file_version: u32, parser_version: u32) -> bool {
    for (file, parser) in file_version
        .to_be_bytes()
        .iter()
        .zip(parser_version.to_be_bytes().iter())
    {
        if file > parser {
            return false;
        }
        if file < parser {
            return true;
        }
    }
    true
}

/// Decode a buffered dbmd chunk.
///
/// Fails on the first malformed segment; the partially decoded record is
/// never returned.
pub fn decode(buf: &[u8]) -> Result<DolbyMetadata, MetadataError> {
    let mut cursor = ByteCursor::new(buf);

    let version = cursor.read_u32()?;
    if !version_supported(version, PARSER_VERSION) {
        return Err(MetadataError::UnsupportedVersion { found: version });
    }

    let mut atmos = None;
    let mut supplemental = None;

    loop {
        let segment_id = cursor.read_u8()?;
        if segment_id == END_SEGMENT_ID {
            break;
        }

        let segment_size = cursor.read_u16()?;
        match segment_id {
            ATMOS_SEGMENT_ID => {
                atmos = Some(AtmosSegment::decode(&mut cursor, segment_size)?);
            }
            SUPPLEMENTAL_SEGMENT_ID => {
                supplemental = Some(AtmosSupplementalSegment::decode(&mut cursor, segment_size)?);
            }
            _ => {
                // Unknown segment type: advance past its payload and checksum
                cursor.skip(segment_size as usize + 1)?;
            }
        }
    }

    Ok(DolbyMetadata {
        version,
        atmos,
        supplemental,
    })
}

#[cfg(test)]
mod tests {
    use super::segment::testutil::{atmos_payload, segment_record, supplemental_payload};
    use super::*;

    fn chunk(version: u32, segments: &[Vec<u8>]) -> Vec<u8> {
        let mut buf = version.to_le_bytes().to_vec();
        for segment in segments {
            buf.extend_from_slice(segment);
        }
        buf.push(END_SEGMENT_ID);
        buf
    }

    #[test]
    fn test_version_gate() {
        assert!(version_supported(PARSER_VERSION, PARSER_VERSION));
        // Older in the lowest byte
        assert!(version_supported(0x0100_0006, PARSER_VERSION));
        // Newer in the lowest byte only
        assert!(!version_supported(0x0100_0008, PARSER_VERSION));
        // Newer in the highest byte loses regardless of the rest
        assert!(!version_supported(0x0200_0000, PARSER_VERSION));
        // Older in a high byte wins regardless of the rest
        assert!(version_supported(0x0001_ffff, PARSER_VERSION));
    }

    #[test]
    fn test_decode_atmos_only() {
        let record = segment_record(0x09, &atmos_payload("tool", (1, 2, 3), 0x01));
        let buf = chunk(PARSER_VERSION, &[record]);

        let metadata = decode(&buf).unwrap();
        assert_eq!(metadata.version, PARSER_VERSION);
        assert_eq!(metadata.version_string(), "1.0.0.7");
        let atmos = metadata.atmos.unwrap();
        assert_eq!(atmos.warp_mode, WarpMode::Warping);
        assert!(metadata.supplemental.is_none());
    }

    #[test]
    fn test_decode_both_segments() {
        let buf = chunk(
            PARSER_VERSION,
            &[
                segment_record(0x09, &atmos_payload("tool", (1, 0, 0), 0x00)),
                segment_record(0x0a, &supplemental_payload(&[0x01, 0x01], [false; 9])),
            ],
        );

        let metadata = decode(&buf).unwrap();
        assert!(metadata.atmos.is_some());
        let supplemental = metadata.supplemental.unwrap();
        assert_eq!(supplemental.object_count, 2);
    }

    #[test]
    fn test_unknown_segment_skipped() {
        let buf = chunk(
            PARSER_VERSION,
            &[
                segment_record(0x42, &[0xde, 0xad, 0xbe, 0xef]),
                segment_record(0x09, &atmos_payload("tool", (1, 0, 0), 0x02)),
            ],
        );

        let metadata = decode(&buf).unwrap();
        assert_eq!(
            metadata.atmos.unwrap().warp_mode,
            WarpMode::DownmixProLogicIIx
        );
    }

    #[test]
    fn test_newer_version_rejected_before_segments() {
        // The segment is garbage, but the gate fails first
        let mut buf = 0x0200_0000u32.to_le_bytes().to_vec();
        buf.extend_from_slice(&[0x09, 0xff, 0xff]);

        match decode(&buf) {
            Err(MetadataError::UnsupportedVersion { found }) => {
                assert_eq!(found, 0x0200_0000)
            }
            other => panic!("expected UnsupportedVersion, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_segment_list() {
        let buf = chunk(PARSER_VERSION, &[]);
        let metadata = decode(&buf).unwrap();
        assert!(metadata.atmos.is_none());
        assert!(metadata.supplemental.is_none());
    }

    #[test]
    fn test_missing_terminator_is_out_of_bounds() {
        let mut buf = chunk(PARSER_VERSION, &[]);
        buf.pop();

        assert!(matches!(
            decode(&buf),
            Err(MetadataError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_truncated_version_word() {
        assert!(matches!(
            decode(&[0x07, 0x00]),
            Err(MetadataError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_segment_failure_propagates() {
        let record = segment_record(0x09, &atmos_payload("tool", (1, 0, 0), 0x00));
        let mut buf = chunk(PARSER_VERSION, &[record]);
        // Corrupt a payload byte; the stored checksum no longer matches
        buf[40] ^= 0xff;

        assert!(matches!(
            decode(&buf),
            Err(MetadataError::ChecksumMismatch { .. })
        ));
    }
}
