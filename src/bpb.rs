use std::io::{self, Cursor, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{FatError, Result};

/// Size of the BIOS parameter block plus the extended boot record.
pub const BPB_SIZE: usize = 62;

/// Size of one on-disk directory entry.
pub const DIR_ENTRY_SIZE: u32 = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiosParameterBlock {
    pub jump: [u8; 3],
    pub oem_identifier: [u8; 8],
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_count: u8,
    pub root_entry_count: u16, // 224 on a 1.44M floppy
    pub total_sectors_16: u16,
    pub media_descriptor: u8,
    pub sectors_per_fat: u16,
    pub sectors_per_track: u16,
    pub heads: u16,
    pub hidden_sectors: u32,
    pub total_sectors_32: u32,

    // Extended boot record (offset 36)
    pub drive_number: u8,
    pub reserved: u8,
    pub signature: u8,
    pub volume_id: u32,
    pub volume_label: [u8; 11],
    pub system_id: [u8; 8],
}

impl BiosParameterBlock {
    /// Decodes the header from the start of `buf`.
    ///
    /// Anything at least [`BPB_SIZE`] bytes long is accepted; the jump
    /// instruction and the 0x55AA trailer are not checked.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < BPB_SIZE {
            return Err(FatError::Format(format!(
                "boot sector needs {} bytes, image has {}",
                BPB_SIZE,
                buf.len()
            )));
        }
        let bpb = Self::decode(&mut Cursor::new(&buf[..BPB_SIZE]))?;

        if bpb.bytes_per_sector == 0 {
            return Err(FatError::Format("bytes per sector is 0".into()));
        }
        if bpb.sectors_per_cluster == 0 {
            return Err(FatError::Format("sectors per cluster is 0".into()));
        }
        if bpb.fat_count == 0 {
            log::warn!("boot sector declares no FAT copies");
        }

        log::debug!(
            "BPB: {} bytes/sector, {} sectors/cluster, {} reserved, {} FAT(s) of {} sectors, {} root entries",
            bpb.bytes_per_sector,
            bpb.sectors_per_cluster,
            bpb.reserved_sectors,
            bpb.fat_count,
            bpb.sectors_per_fat,
            bpb.root_entry_count
        );
        Ok(bpb)
    }

    /// Reads and decodes the header at offset 0 of `image`.
    pub fn read_from<R: Read + Seek>(image: &mut R) -> Result<Self> {
        image.seek(SeekFrom::Start(0))?;

        let mut buf = [0u8; BPB_SIZE];
        image.read_exact(&mut buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                FatError::Format("image is shorter than a boot sector header".into())
            }
            _ => FatError::Io(e),
        })?;

        Self::parse(&buf)
    }

    fn decode(rdr: &mut Cursor<&[u8]>) -> io::Result<Self> {
        let mut jump = [0u8; 3];
        rdr.read_exact(&mut jump)?;
        let mut oem_identifier = [0u8; 8];
        rdr.read_exact(&mut oem_identifier)?;

        let bytes_per_sector = rdr.read_u16::<LittleEndian>()?;
        let sectors_per_cluster = rdr.read_u8()?;
        let reserved_sectors = rdr.read_u16::<LittleEndian>()?;
        let fat_count = rdr.read_u8()?;
        let root_entry_count = rdr.read_u16::<LittleEndian>()?;
        let total_sectors_16 = rdr.read_u16::<LittleEndian>()?;
        let media_descriptor = rdr.read_u8()?;
        let sectors_per_fat = rdr.read_u16::<LittleEndian>()?;
        let sectors_per_track = rdr.read_u16::<LittleEndian>()?;
        let heads = rdr.read_u16::<LittleEndian>()?;
        let hidden_sectors = rdr.read_u32::<LittleEndian>()?;
        let total_sectors_32 = rdr.read_u32::<LittleEndian>()?;

        let drive_number = rdr.read_u8()?;
        let reserved = rdr.read_u8()?;
        let signature = rdr.read_u8()?;
        let volume_id = rdr.read_u32::<LittleEndian>()?;
        let mut volume_label = [0u8; 11];
        rdr.read_exact(&mut volume_label)?;
        let mut system_id = [0u8; 8];
        rdr.read_exact(&mut system_id)?;

        Ok(BiosParameterBlock {
            jump,
            oem_identifier,
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sectors,
            fat_count,
            root_entry_count,
            total_sectors_16,
            media_descriptor,
            sectors_per_fat,
            sectors_per_track,
            heads,
            hidden_sectors,
            total_sectors_32,
            drive_number,
            reserved,
            signature,
            volume_id,
            volume_label,
            system_id,
        })
    }

    pub fn fat_start_lba(&self) -> u32 {
        self.reserved_sectors as u32
    }

    pub fn fat_bytes(&self) -> usize {
        self.sectors_per_fat as usize * self.bytes_per_sector as usize
    }

    pub fn root_dir_start_lba(&self) -> u32 {
        self.reserved_sectors as u32 + self.sectors_per_fat as u32 * self.fat_count as u32
    }

    /// Sectors spanned by the root directory, rounded up.
    pub fn root_dir_sectors(&self) -> u32 {
        let size = self.root_entry_count as u32 * DIR_ENTRY_SIZE;
        size.div_ceil(self.bytes_per_sector as u32)
    }

    pub fn cluster_size(&self) -> usize {
        self.sectors_per_cluster as usize * self.bytes_per_sector as usize
    }

    pub fn total_sectors(&self) -> u32 {
        if self.total_sectors_16 != 0 {
            self.total_sectors_16 as u32
        } else {
            self.total_sectors_32
        }
    }

    pub fn oem_id(&self) -> String {
        trimmed(&self.oem_identifier)
    }

    pub fn volume_label(&self) -> String {
        trimmed(&self.volume_label)
    }

    pub fn system_id(&self) -> String {
        trimmed(&self.system_id)
    }
}

fn trimmed(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}
