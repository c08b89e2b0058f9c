// admeta - ADM/BW64 WAV Dolby audio metadata inspection
//
// Walks the RIFF/RF64/BW64 chunk sequence of an ADM WAV file, buffers the
// Dolby audio metadata (dbmd) chunk, and decodes the Dolby Atmos metadata
// segments inside it.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub mod dbmd;
pub mod error;
pub mod wav;

mod utils;

pub use dbmd::{
    AtmosSegment, AtmosSupplementalSegment, BinauralRenderMode, DolbyMetadata, ToolVersion,
    TrimConfig, WarpMode,
};
pub use error::{ContainerError, MetadataError, SegmentKind};
pub use wav::{ChunkInventory, ContainerKind, WavScan};

/// An opened ADM WAV file with its container already scanned.
///
/// Opening walks the whole chunk sequence once and keeps only the scan
/// result; the file handle is released before the constructor returns.
pub struct AdmFile {
    pub path: String,
    scan: WavScan,
}

impl AdmFile {
    /// Open a file and scan its container.
    ///
    /// Fails if the file cannot be read or is not a valid ADM WAV
    /// container (wrong header, malformed chunk, mandatory chunk absent).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let scan = WavScan::read(&mut reader)?;

        Ok(AdmFile {
            path: path.as_ref().display().to_string(),
            scan,
        })
    }

    pub fn container_kind(&self) -> ContainerKind {
        self.scan.kind
    }

    /// The container scan: chunk inventory, resolved data size, buffered
    /// dbmd bytes
    pub fn scan(&self) -> &WavScan {
        &self.scan
    }

    /// Decode the buffered dbmd chunk
    pub fn decode_metadata(&self) -> Result<DolbyMetadata, MetadataError> {
        dbmd::decode(&self.scan.dbmd)
    }
}

/// Identify the container variant from the 12-byte header alone.
///
/// Returns `None` for files that are not RIFF-family WAVE at all; no
/// chunk validation happens here.
pub fn detect_container<P: AsRef<Path>>(path: P) -> std::io::Result<Option<ContainerKind>> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 12];
    if file.read_exact(&mut header).is_err() {
        return Ok(None);
    }

    let mut form_tag = [0u8; 4];
    form_tag.copy_from_slice(&header[0..4]);
    if &header[8..12] != wav::WAVE_TAG {
        return Ok(None);
    }
    Ok(ContainerKind::from_tag(&form_tag))
}
