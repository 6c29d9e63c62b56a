use std::io::{Read, Seek};

use byteorder::{ByteOrder, LittleEndian};

use crate::bpb::BiosParameterBlock;
use crate::error::{FatError, Result};
use crate::sector::SectorReader;

/// Smallest FAT12 value that terminates a chain.
pub const END_OF_CHAIN: u16 = 0xFF8;
/// Value of an unallocated cluster.
pub const FREE_CLUSTER: u16 = 0x000;
/// Number of the first cluster in the data region.
pub const FIRST_DATA_CLUSTER: u16 = 2;

pub fn is_end_of_chain(value: u16) -> bool {
    value >= END_OF_CHAIN
}

/// In-memory copy of the first FAT.
///
/// Entries are 12 bits wide, so two consecutive clusters share three bytes:
///
/// ```text
///  byte 0    byte 1    byte 2
/// [ e0 lo ] [e1|e0 hi] [ e1 hi ]
/// ```
pub struct FatTable {
    bytes: Vec<u8>,
}

impl FatTable {
    pub fn load<R: Read + Seek>(reader: &mut SectorReader<R>, bpb: &BiosParameterBlock) -> Result<Self> {
        let lba = bpb.fat_start_lba();
        let bytes = reader.read_sectors(lba, bpb.sectors_per_fat as u32)?;
        log::debug!(
            "loaded FAT: {} sector(s) at lba {}, {} entries",
            bpb.sectors_per_fat,
            lba,
            bytes.len() * 2 / 3
        );
        Ok(Self::from_bytes(bytes))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        FatTable { bytes }
    }

    /// Number of whole 12-bit entries held by the table.
    pub fn entry_count(&self) -> usize {
        self.bytes.len() * 2 / 3
    }

    /// Returns the FAT entry for `cluster`.
    ///
    /// Fails instead of reading past the loaded table when the FAT is too
    /// small to hold that entry.
    pub fn next_cluster(&self, cluster: u16) -> Result<u16> {
        let offset = cluster as usize * 3 / 2;
        let word = self
            .bytes
            .get(offset..offset + 2)
            .map(LittleEndian::read_u16)
            .ok_or(FatError::CorruptChain {
                cluster,
                reason: "cluster lies outside the FAT",
            })?;

        if cluster % 2 == 0 {
            Ok(word & 0x0FFF)
        } else {
            Ok(word >> 4)
        }
    }
}
