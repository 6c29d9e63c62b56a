pub mod chain;
pub mod root_dir;
pub mod structs;
pub mod table;
pub mod volume;

pub use chain::{ClusterChainReader, Clusters};
pub use root_dir::RootDirectory;
pub use structs::{short_name, Attributes, DirectoryEntry};
pub use table::FatTable;
pub use volume::Fat12Volume;
