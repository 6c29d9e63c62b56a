use bitflags::bitflags;
use byteorder::{ByteOrder, LittleEndian};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attributes: u8 {
        const READ_ONLY = 0x01;
        const HIDDEN = 0x02;
        const SYSTEM = 0x04;
        const VOLUME_ID = 0x08;
        const DIRECTORY = 0x10;
        const ARCHIVE = 0x20;

        // Keep whatever else the image stores
        const _ = !0;
    }
}

/// First name byte of a never-used slot; no live entries follow it.
pub const END_OF_DIRECTORY: u8 = 0x00;
/// First name byte of a deleted entry.
pub const DELETED_ENTRY: u8 = 0xE5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: [u8; 11],
    pub attributes: Attributes,
    pub reserved: u8,
    pub creation_time_tenths: u8,
    pub creation_time: u16,
    pub creation_date: u16,
    pub last_access_date: u16,
    pub first_cluster_high: u16, // always 0 on FAT12
    pub modification_time: u16,
    pub modification_date: u16,
    pub first_cluster: u16,
    pub size: u32,
}

impl DirectoryEntry {
    /// Decodes one 32-byte record.
    pub fn parse(bytes: &[u8; 32]) -> Self {
        let mut name = [0u8; 11];
        name.copy_from_slice(&bytes[0..11]);
        DirectoryEntry {
            name,
            attributes: Attributes::from_bits_retain(bytes[11]),
            reserved: bytes[12],
            creation_time_tenths: bytes[13],
            creation_time: LittleEndian::read_u16(&bytes[14..16]),
            creation_date: LittleEndian::read_u16(&bytes[16..18]),
            last_access_date: LittleEndian::read_u16(&bytes[18..20]),
            first_cluster_high: LittleEndian::read_u16(&bytes[20..22]),
            modification_time: LittleEndian::read_u16(&bytes[22..24]),
            modification_date: LittleEndian::read_u16(&bytes[24..26]),
            first_cluster: LittleEndian::read_u16(&bytes[26..28]),
            size: LittleEndian::read_u32(&bytes[28..32]),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.attributes.contains(Attributes::DIRECTORY)
    }

    pub fn is_volume_label(&self) -> bool {
        self.attributes.contains(Attributes::VOLUME_ID)
    }

    pub fn is_deleted(&self) -> bool {
        self.name[0] == DELETED_ENTRY
    }

    pub fn is_end(&self) -> bool {
        self.name[0] == END_OF_DIRECTORY
    }

    /// `NAME.EXT` form of the stored name, case preserved.
    pub fn display_name(&self) -> String {
        let base = String::from_utf8_lossy(&self.name[0..8]).trim_end().to_string();
        let ext = String::from_utf8_lossy(&self.name[8..11]).trim_end().to_string();
        if ext.is_empty() {
            base
        } else {
            format!("{}.{}", base, ext)
        }
    }
}

/// Turns a user-supplied name into the 11-byte on-disk pattern.
///
/// An 11-byte argument without a dot is taken verbatim. Otherwise `BASE.EXT` is split at the
/// last dot and each part is space padded. No case folding happens, so the
/// result only matches entries stored with the same case.
pub fn short_name(name: &str) -> Option<[u8; 11]> {
    let bytes = name.as_bytes();
    let mut out = [b' '; 11];

    if bytes.len() == 11 && !bytes.contains(&b'.') {
        out.copy_from_slice(bytes);
        return Some(out);
    }

    let (base, ext) = match name.rfind('.') {
        Some(i) => (&bytes[..i], &bytes[i + 1..]),
        None => (bytes, &b""[..]),
    };
    if base.is_empty() || base.len() > 8 || ext.len() > 3 {
        return None;
    }
    out[..base.len()].copy_from_slice(base);
    out[8..8 + ext.len()].copy_from_slice(ext);
    Some(out)
}
