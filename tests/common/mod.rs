#![allow(dead_code)]

use std::collections::BTreeMap;

/// Builds small FAT12 images in memory.
pub struct ImageBuilder {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_count: u8,
    pub root_entries: u16,
    pub sectors_per_fat: u16,
    pub data_clusters: u16,
    fat: Vec<u16>,
    entries: Vec<[u8; 32]>,
    clusters: BTreeMap<u16, Vec<u8>>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        ImageBuilder {
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sectors: 1,
            fat_count: 2,
            root_entries: 16,
            sectors_per_fat: 1,
            data_clusters: 32,
            fat: Vec::new(),
            entries: Vec::new(),
            clusters: BTreeMap::new(),
        }
    }

    pub fn cluster_size(&self) -> usize {
        self.bytes_per_sector as usize * self.sectors_per_cluster as usize
    }

    pub fn root_dir_start(&self) -> u32 {
        self.reserved_sectors as u32 + self.fat_count as u32 * self.sectors_per_fat as u32
    }

    pub fn root_dir_end(&self) -> u32 {
        let bytes = self.root_entries as u32 * 32;
        self.root_dir_start() + bytes.div_ceil(self.bytes_per_sector as u32)
    }

    pub fn total_sectors(&self) -> u32 {
        self.root_dir_end() + self.data_clusters as u32 * self.sectors_per_cluster as u32
    }

    pub fn set_fat(&mut self, cluster: u16, value: u16) -> &mut Self {
        let idx = cluster as usize;
        if self.fat.len() <= idx {
            self.fat.resize(idx + 1, 0);
        }
        self.fat[idx] = value;
        self
    }

    pub fn add_entry(&mut self, name: &[u8; 11], attr: u8, first_cluster: u16, size: u32) -> &mut Self {
        let mut raw = [0u8; 32];
        raw[0..11].copy_from_slice(name);
        raw[11] = attr;
        raw[26..28].copy_from_slice(&first_cluster.to_le_bytes());
        raw[28..32].copy_from_slice(&size.to_le_bytes());
        self.entries.push(raw);
        self
    }

    /// Stores `data` across `chain` in that order and links the chain.
    pub fn add_file(&mut self, name: &[u8; 11], data: &[u8], chain: &[u16]) -> &mut Self {
        let cs = self.cluster_size();
        assert!(data.len() <= chain.len() * cs, "chain too short for data");

        for (i, &cluster) in chain.iter().enumerate() {
            let start = (i * cs).min(data.len());
            let end = ((i + 1) * cs).min(data.len());
            let mut bytes = data[start..end].to_vec();
            // Fill the cluster tail so truncation is observable
            bytes.resize(cs, 0xEE);
            self.clusters.insert(cluster, bytes);

            let next = chain.get(i + 1).copied().unwrap_or(0xFFF);
            self.set_fat(cluster, next);
        }
        let first = chain.first().copied().unwrap_or(0);
        self.add_entry(name, 0x20, first, data.len() as u32)
    }

    pub fn fat_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.sectors_per_fat as usize * self.bytes_per_sector as usize];
        let mut entries = self.fat.clone();
        if entries.len() < 2 {
            entries.resize(2, 0);
        }
        entries[0] = 0xFF0;
        entries[1] = 0xFFF;
        for (i, &v) in entries.iter().enumerate() {
            let off = i * 3 / 2;
            if i % 2 == 0 {
                out[off] = v as u8;
                out[off + 1] = (out[off + 1] & 0xF0) | ((v >> 8) as u8 & 0x0F);
            } else {
                out[off] = (out[off] & 0x0F) | ((v << 4) as u8);
                out[off + 1] = (v >> 4) as u8;
            }
        }
        out
    }

    pub fn boot_sector(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.bytes_per_sector as usize];
        buf[0..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
        buf[3..11].copy_from_slice(b"MSWIN4.1");
        buf[11..13].copy_from_slice(&self.bytes_per_sector.to_le_bytes());
        buf[13] = self.sectors_per_cluster;
        buf[14..16].copy_from_slice(&self.reserved_sectors.to_le_bytes());
        buf[16] = self.fat_count;
        buf[17..19].copy_from_slice(&self.root_entries.to_le_bytes());
        buf[19..21].copy_from_slice(&(self.total_sectors() as u16).to_le_bytes());
        buf[21] = 0xF0;
        buf[22..24].copy_from_slice(&self.sectors_per_fat.to_le_bytes());
        buf[24..26].copy_from_slice(&18u16.to_le_bytes());
        buf[26..28].copy_from_slice(&2u16.to_le_bytes());
        buf[38] = 0x29;
        buf[39..43].copy_from_slice(&0xCAFE_F00Du32.to_le_bytes());
        buf[43..54].copy_from_slice(b"TESTDISK   ");
        buf[54..62].copy_from_slice(b"FAT12   ");
        if buf.len() >= 512 {
            buf[510] = 0x55;
            buf[511] = 0xAA;
        }
        buf
    }

    pub fn build(&self) -> Vec<u8> {
        let bps = self.bytes_per_sector as usize;
        let mut img = vec![0u8; self.total_sectors() as usize * bps];

        let boot = self.boot_sector();
        img[..boot.len()].copy_from_slice(&boot);

        let fat = self.fat_bytes();
        for copy in 0..self.fat_count as usize {
            let start = (self.reserved_sectors as usize + copy * self.sectors_per_fat as usize) * bps;
            img[start..start + fat.len()].copy_from_slice(&fat);
        }

        let root = self.root_dir_start() as usize * bps;
        for (i, e) in self.entries.iter().enumerate() {
            img[root + i * 32..root + i * 32 + 32].copy_from_slice(e);
        }

        for (&cluster, bytes) in &self.clusters {
            let lba = self.root_dir_end() as usize
                + (cluster as usize - 2) * self.sectors_per_cluster as usize;
            img[lba * bps..lba * bps + bytes.len()].copy_from_slice(bytes);
        }
        img
    }
}
