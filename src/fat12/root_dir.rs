use std::io::{Read, Seek};

use crate::bpb::{BiosParameterBlock, DIR_ENTRY_SIZE};
use crate::error::Result;
use crate::sector::SectorReader;

use super::structs::DirectoryEntry;

/// The fixed-size root directory region, decoded slot by slot.
pub struct RootDirectory {
    entries: Vec<DirectoryEntry>,
}

impl RootDirectory {
    /// Loads the root directory and returns it with the LBA just past it,
    /// which is where cluster 2 starts.
    pub fn load<R: Read + Seek>(
        reader: &mut SectorReader<R>,
        bpb: &BiosParameterBlock,
    ) -> Result<(Self, u32)> {
        let lba = bpb.root_dir_start_lba();
        let sectors = bpb.root_dir_sectors();
        let root_dir_end = lba + sectors;

        let bytes = reader.read_sectors(lba, sectors)?;
        let dir = Self::from_bytes(&bytes, bpb.root_entry_count as usize);

        log::debug!(
            "loaded root directory: {} entries in {} sector(s) at lba {}, data starts at lba {}",
            dir.entries.len(),
            sectors,
            lba,
            root_dir_end
        );
        Ok((dir, root_dir_end))
    }

    /// Decodes up to `count` entries from a raw directory region.
    pub fn from_bytes(bytes: &[u8], count: usize) -> Self {
        let entries = bytes
            .chunks_exact(DIR_ENTRY_SIZE as usize)
            .take(count)
            .filter_map(|chunk| <&[u8; 32]>::try_from(chunk).ok())
            .map(DirectoryEntry::parse)
            .collect();
        RootDirectory { entries }
    }

    /// Every slot, including deleted and never-used ones.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Live entries up to the end-of-directory marker, without deleted
    /// entries or the volume label.
    pub fn files(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries
            .iter()
            .take_while(|e| !e.is_end())
            .filter(|e| !e.is_deleted() && !e.is_volume_label())
    }

    /// First slot whose raw 11-byte name equals `name`.
    ///
    /// Comparison is byte-exact with no case folding. Deleted and unused
    /// slots are compared like any other, so a pattern of eleven NUL bytes
    /// matches an empty slot.
    pub fn find_by_name(&self, name: &[u8; 11]) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| &e.name == name)
    }
}
