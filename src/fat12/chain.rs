use std::io::{Read, Seek};

use crate::bpb::BiosParameterBlock;
use crate::error::{FatError, Result};
use crate::sector::SectorReader;

use super::structs::DirectoryEntry;
use super::table::{is_end_of_chain, FatTable, FIRST_DATA_CLUSTER, FREE_CLUSTER};

/// Walks cluster chains and reads their data.
pub struct ClusterChainReader<'a> {
    fat: &'a FatTable,
    root_dir_end: u32,
    sectors_per_cluster: u8,
    cluster_size: usize,
}

impl<'a> ClusterChainReader<'a> {
    pub fn new(fat: &'a FatTable, bpb: &BiosParameterBlock, root_dir_end: u32) -> Self {
        ClusterChainReader {
            fat,
            root_dir_end,
            sectors_per_cluster: bpb.sectors_per_cluster,
            cluster_size: bpb.cluster_size(),
        }
    }

    /// First sector of a data cluster. Cluster 2 sits right after the root
    /// directory.
    pub fn cluster_to_lba(&self, cluster: u16) -> u32 {
        debug_assert!(cluster >= FIRST_DATA_CLUSTER);
        self.root_dir_end + (cluster - FIRST_DATA_CLUSTER) as u32 * self.sectors_per_cluster as u32
    }

    /// Iterates the clusters of the chain starting at `first`.
    pub fn clusters(&self, first: u16) -> Clusters<'a> {
        Clusters::new(self.fat, first)
    }

    /// Reads every cluster of `entry`'s chain, in chain order.
    ///
    /// The result is a whole number of clusters; the tail past `entry.size`
    /// is whatever the last cluster holds and is left for the caller to cut.
    /// Empty files read nothing.
    pub fn read_file<R: Read + Seek>(
        &self,
        reader: &mut SectorReader<R>,
        entry: &DirectoryEntry,
    ) -> Result<Vec<u8>> {
        let size = entry.size as usize;
        if size == 0 {
            log::debug!("{} is empty, skipping chain walk", entry.display_name());
            return Ok(Vec::new());
        }

        // The FAT bounds the chain length, whatever the entry claims
        let max_chain = self.fat.entry_count().saturating_sub(FIRST_DATA_CLUSTER as usize);
        let clusters = size.div_ceil(self.cluster_size).min(max_chain);
        let mut out = Vec::with_capacity(clusters * self.cluster_size);
        let mut last = entry.first_cluster;

        for cluster in self.clusters(entry.first_cluster) {
            let cluster = cluster?;
            let lba = self.cluster_to_lba(cluster);
            log::trace!("cluster {} -> lba {}", cluster, lba);
            reader.read_sectors_into(lba, self.sectors_per_cluster as u32, &mut out)?;
            last = cluster;
        }

        if out.len() < size {
            log::warn!(
                "{}: chain holds {} bytes, directory says {}",
                entry.display_name(),
                out.len(),
                size
            );
            return Err(FatError::CorruptChain {
                cluster: last,
                reason: "chain ends before the recorded file size",
            });
        }
        Ok(out)
    }
}

/// Iterator over the cluster numbers of one chain.
///
/// Yields an error and stops when the chain starts or continues in a free or
/// reserved cluster, runs off the FAT, or visits more clusters than the FAT
/// can describe.
pub struct Clusters<'a> {
    fat: &'a FatTable,
    pending: Option<Result<u16>>,
    visited: usize,
}

impl<'a> Clusters<'a> {
    fn new(fat: &'a FatTable, first: u16) -> Self {
        let pending = if first < FIRST_DATA_CLUSTER || is_end_of_chain(first) {
            Err(FatError::CorruptChain {
                cluster: first,
                reason: "chain does not start in a data cluster",
            })
        } else {
            Ok(first)
        };
        Clusters {
            fat,
            pending: Some(pending),
            visited: 0,
        }
    }

    fn advance(&mut self, cluster: u16) -> Option<Result<u16>> {
        self.visited += 1;

        let next = match self.fat.next_cluster(cluster) {
            Ok(next) => next,
            Err(e) => return Some(Err(e)),
        };
        if is_end_of_chain(next) {
            return None;
        }
        if next == FREE_CLUSTER {
            return Some(Err(FatError::CorruptChain {
                cluster,
                reason: "chain links to a free cluster",
            }));
        }
        if next < FIRST_DATA_CLUSTER {
            return Some(Err(FatError::CorruptChain {
                cluster,
                reason: "chain links to a reserved cluster",
            }));
        }
        if self.visited >= self.fat.entry_count() {
            return Some(Err(FatError::CorruptChain {
                cluster,
                reason: "chain loops",
            }));
        }
        Some(Ok(next))
    }
}

impl Iterator for Clusters<'_> {
    type Item = Result<u16>;

    fn next(&mut self) -> Option<Self::Item> {
        let cluster = match self.pending.take()? {
            Ok(cluster) => cluster,
            Err(e) => return Some(Err(e)),
        };
        self.pending = self.advance(cluster);
        Some(Ok(cluster))
    }
}
