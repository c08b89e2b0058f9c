// RIFF/RF64/BW64 container support
//
// The container layer walks the outer chunk sequence of an ADM WAV file,
// checks that the chunks a valid file must carry are all present, and
// buffers the Dolby audio metadata (dbmd) chunk for the dbmd decoder.

pub mod walker;

pub use walker::WavScan;

use serde::Serialize;

pub const RIFF_TAG: &[u8; 4] = b"RIFF";
pub const RF64_TAG: &[u8; 4] = b"RF64";
pub const BW64_TAG: &[u8; 4] = b"BW64";
pub const WAVE_TAG: &[u8; 4] = b"WAVE";
pub const FMT_TAG: &[u8; 4] = b"fmt ";
pub const DATA_TAG: &[u8; 4] = b"data";
pub const DBMD_TAG: &[u8; 4] = b"dbmd";
pub const AXML_TAG: &[u8; 4] = b"axml";
pub const DS64_TAG: &[u8; 4] = b"ds64";

/// 32-bit chunk size value meaning "the real size is in the ds64 chunk"
pub const SIZE_SENTINEL: u32 = 0xffff_ffff;

/// Recognized container form tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContainerKind {
    Riff,
    Rf64,
    Bw64,
}

impl ContainerKind {
    pub fn from_tag(tag: &[u8; 4]) -> Option<Self> {
        match tag {
            t if t == RIFF_TAG => Some(ContainerKind::Riff),
            t if t == RF64_TAG => Some(ContainerKind::Rf64),
            t if t == BW64_TAG => Some(ContainerKind::Bw64),
            _ => None,
        }
    }

    /// RF64 and BW64 both use the ds64 64-bit size extension
    pub fn is_64bit(&self) -> bool {
        matches!(self, ContainerKind::Rf64 | ContainerKind::Bw64)
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerKind::Riff => write!(f, "RIFF"),
            ContainerKind::Rf64 => write!(f, "RF64"),
            ContainerKind::Bw64 => write!(f, "BW64"),
        }
    }
}

/// Which chunks a scan has observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChunkInventory {
    pub riff_header: bool,
    pub wave_form: bool,
    pub fmt: bool,
    pub data: bool,
    pub dbmd: bool,
    pub axml: bool,
    pub ds64: bool,
}

impl ChunkInventory {
    /// Mandatory chunks still unseen. A 64-bit container additionally
    /// requires the ds64 size-extension chunk.
    pub fn missing(&self, needs_ds64: bool) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.fmt {
            missing.push("fmt ");
        }
        if !self.data {
            missing.push("data");
        }
        if !self.dbmd {
            missing.push("dbmd");
        }
        if !self.axml {
            missing.push("axml");
        }
        if needs_ds64 && !self.ds64 {
            missing.push("ds64");
        }
        missing
    }
}
