// Error types for admeta

use thiserror::Error;

/// Which checksummed metadata segment an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Atmos,
    Supplemental,
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentKind::Atmos => write!(f, "Dolby Atmos"),
            SegmentKind::Supplemental => write!(f, "Dolby Atmos supplemental"),
        }
    }
}

/// Errors from walking the RIFF/RF64/BW64 container
#[derive(Error, Debug)]
pub enum ContainerError {
    /// IO error from the underlying reader
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File does not start with a recognized form tag
    #[error("not a RIFF/RF64/BW64 file (found {})", display_tag(.found))]
    UnrecognizedHeader { found: [u8; 4] },

    /// Form type after the header is not WAVE
    #[error("form type is not WAVE (found {})", display_tag(.found))]
    NotWave { found: [u8; 4] },

    /// Chunk size that the walker cannot act on
    #[error("malformed {tag} chunk size: {size}")]
    MalformedChunkSize { tag: String, size: u32 },

    /// Declared dbmd chunk size exceeds the buffering cap
    #[error("Dolby audio metadata chunk too large: {size} bytes")]
    MetadataTooLarge { size: u32 },

    /// Mandatory chunks absent when the stream ended
    #[error("not a valid ADM WAV file, missing chunk(s): {}", .missing.join(", "))]
    MissingChunks { missing: Vec<&'static str> },
}

/// Errors from decoding the dbmd metadata buffer
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Metadata version is newer than this decoder understands
    #[error("unsupported Dolby audio metadata version {found:#010x}")]
    UnsupportedVersion { found: u32 },

    /// Supplemental segment sync word mismatch
    #[error("invalid Dolby Atmos supplemental metadata sync: {found:#010x}")]
    BadSyncWord { found: u32 },

    /// Supplemental object count above the format maximum
    #[error("too many objects: {count}")]
    TooManyObjects { count: u16 },

    /// Atmos segment declared with other than its fixed payload size
    #[error("unsupported segment size for Dolby Atmos: {size}")]
    WrongSegmentSize { size: u16 },

    /// Segment checksum failure
    #[error("checksum failure for {segment} segment")]
    ChecksumMismatch { segment: SegmentKind },

    /// Read or skip past the end of the metadata buffer
    #[error("metadata buffer exhausted: need {needed} more byte(s), have {available}")]
    OutOfBounds { needed: usize, available: usize },
}

fn display_tag(tag: &[u8; 4]) -> String {
    if tag.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        format!("\"{}\"", String::from_utf8_lossy(tag))
    } else {
        format!("{:02x?}", tag)
    }
}
