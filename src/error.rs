use std::error::Error;
use std::fmt;
use std::io;

/// Errors raised while decoding or walking a FAT12 image.
#[derive(Debug)]
pub enum FatError {
    /// The backing image could not supply the requested bytes.
    Io(io::Error),
    /// The image is too small or its header is unusable.
    Format(String),
    /// No root directory entry carries the requested name.
    NotFound(String),
    /// Following the chain would leave the FAT or hit a free/reserved entry.
    CorruptChain { cluster: u16, reason: &'static str },
}

impl fmt::Display for FatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatError::Io(_) => f.write_str("I/O error"),
            FatError::Format(msg) => write!(f, "bad image format: {}", msg),
            FatError::NotFound(name) => write!(f, "file not found: {}", name),
            FatError::CorruptChain { cluster, reason } => {
                write!(f, "corrupt cluster chain at cluster {}: {}", cluster, reason)
            }
        }
    }
}

impl Error for FatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FatError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FatError {
    fn from(e: io::Error) -> Self {
        FatError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, FatError>;

/// The step of the extraction pipeline that failed.
///
/// Each stage maps to its own process exit code so scripts can tell a missing
/// file apart from a truncated FAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OpenImage,
    BootSector,
    Fat,
    RootDirectory,
    Lookup,
    ReadFile,
}

impl Stage {
    pub fn exit_code(self) -> i32 {
        match self {
            Stage::OpenImage => 1,
            Stage::BootSector => 2,
            Stage::Fat => 3,
            Stage::RootDirectory => 4,
            Stage::Lookup => 5,
            Stage::ReadFile => 6,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::OpenImage => "failed to open disk image",
            Stage::BootSector => "failed to read boot sector",
            Stage::Fat => "failed to read FAT",
            Stage::RootDirectory => "failed to read root directory",
            Stage::Lookup => "failed to find file",
            Stage::ReadFile => "failed to read file",
        };
        f.write_str(s)
    }
}

/// A [`FatError`] tagged with the pipeline stage it came from.
#[derive(Debug)]
pub struct StageError {
    pub stage: Stage,
    pub source: FatError,
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stage)
    }
}

impl Error for StageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

pub trait StageExt<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, StageError>;
}

impl<T> StageExt<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, StageError> {
        self.map_err(|source| StageError { stage, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let stages = [
            Stage::OpenImage,
            Stage::BootSector,
            Stage::Fat,
            Stage::RootDirectory,
            Stage::Lookup,
            Stage::ReadFile,
        ];
        let mut codes: Vec<i32> = stages.iter().map(|s| s.exit_code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), stages.len());
        assert!(codes.iter().all(|&c| c != 0));
    }

    #[test]
    fn stage_error_names_the_stage() {
        let err: Result<()> = Err(FatError::NotFound("FOO     TXT".into()));
        let err = err.at(Stage::Lookup).unwrap_err();
        assert_eq!(err.stage, Stage::Lookup);
        assert_eq!(err.to_string(), "failed to find file");
        assert_eq!(
            err.source().map(|e| e.to_string()),
            Some("file not found: FOO     TXT".to_string())
        );
    }
}
