//! Read-only access to FAT12 disk images.
//!
//! [`Fat12Volume::open`] decodes the boot sector and loads the FAT and root
//! directory; files are then looked up by their 11-byte 8.3 name and read by
//! following their cluster chain.

pub mod bpb;
pub mod error;
pub mod fat12;
pub mod render;
pub mod sector;

pub use bpb::BiosParameterBlock;
pub use error::{FatError, Stage, StageError};
pub use fat12::{short_name, DirectoryEntry, Fat12Volume};
