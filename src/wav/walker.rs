// Chunk walker for RIFF/RF64/BW64 WAV containers

use std::io::{Read, Seek};

use crate::dbmd::MAX_DBMD_SIZE;
use crate::error::ContainerError;
use crate::utils::io::{read_chunk_header, read_le_u32, read_tag, skip_bytes};
use crate::wav::{
    ChunkInventory, ContainerKind, AXML_TAG, DATA_TAG, DBMD_TAG, DS64_TAG, FMT_TAG, SIZE_SENTINEL,
    WAVE_TAG,
};

/// Result of scanning one container.
///
/// Audio payloads are skipped by seeking, never buffered; the only bytes a
/// scan retains are the dbmd chunk (capped at [`MAX_DBMD_SIZE`]).
#[derive(Debug)]
pub struct WavScan {
    pub kind: ContainerKind,
    pub chunks: ChunkInventory,
    /// Size of the data chunk, with the ds64 value substituted when the
    /// 32-bit field is saturated
    pub data_size: u64,
    /// Buffered payload of the dbmd chunk
    pub dbmd: Vec<u8>,
}

impl WavScan {
    /// Walk the chunk sequence of a seekable WAV stream.
    ///
    /// The stream is consumed from its current position; data and axml
    /// payloads of any size (including beyond 32-bit offsets) are seeked
    /// over. Acceptance requires every mandatory ADM chunk to have been
    /// seen by end of stream.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, ContainerError> {
        let header = read_tag(reader)?;
        let kind = ContainerKind::from_tag(&header)
            .ok_or(ContainerError::UnrecognizedHeader { found: header })?;

        let mut chunks = ChunkInventory::default();
        chunks.riff_header = true;

        // Overall container size; not used, the chunk list is walked to
        // end of stream instead
        let _container_size = read_le_u32(reader)?;

        let form = read_tag(reader)?;
        if &form != WAVE_TAG {
            return Err(ContainerError::NotWave { found: form });
        }
        chunks.wave_form = true;

        let mut ds64_data_size = 0u64;
        let mut data_size = 0u64;
        let mut dbmd = Vec::new();

        while let Some((tag, declared)) = read_chunk_header(reader)? {
            // Chunks are word-aligned: an odd size is followed by a pad
            // byte. The all-ones sentinel is not a real size.
            let mut size = declared;
            if size % 2 == 1 && size != SIZE_SENTINEL {
                size += 1;
            }
            if size == 0 {
                return Err(ContainerError::MalformedChunkSize {
                    tag: String::from_utf8_lossy(&tag).into_owned(),
                    size,
                });
            }

            match &tag {
                t if t == DS64_TAG => {
                    chunks.ds64 = true;
                    if size < 16 {
                        return Err(ContainerError::MalformedChunkSize {
                            tag: String::from_utf8_lossy(&tag).into_owned(),
                            size,
                        });
                    }
                    let _container_size_low = read_le_u32(reader)?;
                    let _container_size_high = read_le_u32(reader)?;
                    let data_size_low = read_le_u32(reader)?;
                    let data_size_high = read_le_u32(reader)?;
                    ds64_data_size = ((data_size_high as u64) << 32) | data_size_low as u64;
                    skip_bytes(reader, size as u64 - 16)?;
                }
                t if t == FMT_TAG => {
                    // Format fields are not interpreted here
                    chunks.fmt = true;
                    skip_bytes(reader, size as u64)?;
                }
                t if t == DATA_TAG => {
                    chunks.data = true;
                    data_size = if kind.is_64bit() && declared == SIZE_SENTINEL {
                        ds64_data_size
                    } else {
                        size as u64
                    };
                    skip_bytes(reader, data_size)?;
                }
                t if t == DBMD_TAG => {
                    chunks.dbmd = true;
                    if size > MAX_DBMD_SIZE {
                        return Err(ContainerError::MetadataTooLarge { size });
                    }
                    let mut buffer = vec![0u8; size as usize];
                    reader.read_exact(&mut buffer)?;
                    dbmd = buffer;
                }
                t if t == AXML_TAG => {
                    chunks.axml = true;
                    skip_bytes(reader, size as u64)?;
                }
                _ => {
                    skip_bytes(reader, size as u64)?;
                }
            }
        }

        let missing = chunks.missing(kind.is_64bit());
        if !missing.is_empty() {
            return Err(ContainerError::MissingChunks { missing });
        }

        Ok(WavScan {
            kind,
            chunks,
            data_size,
            dbmd,
        })
    }
}
