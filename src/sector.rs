use std::io::{self, Read, Seek, SeekFrom};

use crate::error::Result;

/// Positioned sector reads over a disk image.
///
/// Every read seeks to its own absolute offset first, so no call depends on
/// where a previous one left the cursor.
pub struct SectorReader<R> {
    inner: R,
    bytes_per_sector: u16,
}

impl<R: Read + Seek> SectorReader<R> {
    pub fn new(inner: R, bytes_per_sector: u16) -> Self {
        SectorReader {
            inner,
            bytes_per_sector,
        }
    }

    /// Reads `count` sectors starting at `lba`.
    pub fn read_sectors(&mut self, lba: u32, count: u32) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_sectors_into(lba, count, &mut buf)?;
        Ok(buf)
    }

    /// Appends `count` sectors starting at `lba` to `buf`.
    ///
    /// On failure `buf` is truncated back to its original length.
    pub fn read_sectors_into(&mut self, lba: u32, count: u32, buf: &mut Vec<u8>) -> Result<()> {
        let bps = self.bytes_per_sector as u64;
        let offset = lba as u64 * bps;
        let len = count as u64 * bps;

        // Grow with the data actually read; a corrupt header can ask for
        // gigabytes from a tiny image.
        let start = buf.len();
        let res = self.inner.seek(SeekFrom::Start(offset)).and_then(|_| {
            let got = (&mut self.inner).take(len).read_to_end(buf)? as u64;
            if got < len {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("wanted {} bytes at offset {:#x}, got {}", len, offset, got),
                ));
            }
            Ok(())
        });

        if let Err(e) = res {
            buf.truncate(start);
            log::debug!(
                "read of {} sector(s) at lba {} (offset {:#x}) failed: {}",
                count,
                lba,
                offset,
                e
            );
            return Err(e.into());
        }
        Ok(())
    }
}
