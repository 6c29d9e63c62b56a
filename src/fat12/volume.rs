use std::io::{Read, Seek};

use crate::bpb::BiosParameterBlock;
use crate::error::{FatError, Result, Stage, StageError, StageExt};
use crate::sector::SectorReader;

use super::chain::ClusterChainReader;
use super::root_dir::RootDirectory;
use super::structs::DirectoryEntry;
use super::table::FatTable;

/// A mounted FAT12 image: boot sector, FAT and root directory, loaded once.
pub struct Fat12Volume<R> {
    reader: SectorReader<R>,
    pub boot_sector: BiosParameterBlock,
    fat: FatTable,
    root_dir: RootDirectory,
    root_dir_end: u32,
}

impl<R: Read + Seek> Fat12Volume<R> {
    /// Decodes the boot sector, then loads the FAT and the root directory.
    ///
    /// The returned error names the step that failed.
    pub fn open(mut image: R) -> std::result::Result<Self, StageError> {
        let boot_sector = BiosParameterBlock::read_from(&mut image).at(Stage::BootSector)?;
        let mut reader = SectorReader::new(image, boot_sector.bytes_per_sector);

        let fat = FatTable::load(&mut reader, &boot_sector).at(Stage::Fat)?;
        let (root_dir, root_dir_end) =
            RootDirectory::load(&mut reader, &boot_sector).at(Stage::RootDirectory)?;

        log::info!(
            "mounted {:?} ({}): {} sectors, {} bytes/cluster",
            boot_sector.volume_label(),
            boot_sector.system_id(),
            boot_sector.total_sectors(),
            boot_sector.cluster_size()
        );

        Ok(Fat12Volume {
            reader,
            boot_sector,
            fat,
            root_dir,
            root_dir_end,
        })
    }

    pub fn root_dir(&self) -> &RootDirectory {
        &self.root_dir
    }

    /// LBA of cluster 2.
    pub fn root_dir_end(&self) -> u32 {
        self.root_dir_end
    }

    pub fn chain_reader(&self) -> ClusterChainReader<'_> {
        ClusterChainReader::new(&self.fat, &self.boot_sector, self.root_dir_end)
    }

    pub fn find(&self, name: &[u8; 11]) -> Result<&DirectoryEntry> {
        self.root_dir
            .find_by_name(name)
            .ok_or_else(|| FatError::NotFound(String::from_utf8_lossy(name).into_owned()))
    }

    /// Reads `entry`'s data, cut to its recorded size.
    pub fn read_entry(&mut self, entry: &DirectoryEntry) -> Result<Vec<u8>> {
        let chain = ClusterChainReader::new(&self.fat, &self.boot_sector, self.root_dir_end);
        let mut data = chain.read_file(&mut self.reader, entry)?;
        data.truncate(entry.size as usize);
        Ok(data)
    }

    /// Looks `name` up in the root directory and reads the file.
    pub fn read_file(&mut self, name: &[u8; 11]) -> std::result::Result<Vec<u8>, StageError> {
        let entry = self.find(name).at(Stage::Lookup)?.clone();
        if entry.is_directory() {
            log::warn!("{} is a directory, reading its raw cluster chain", entry.display_name());
        }
        self.read_entry(&entry).at(Stage::ReadFile)
    }
}
