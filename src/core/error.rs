use crate::core::registry::FileId;
use thiserror::Error;

/// Reasons an allocation request is rejected
///
/// Every variant is produced before any sector or registry entry is
/// touched, so a rejected request leaves the disk unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("File name must not be empty")]
    EmptyName,

    #[error("A file named '{0}' already exists")]
    DuplicateName(String),

    #[error("File content must not be empty")]
    EmptyContent,

    #[error("Preferred sector {requested} out of range (valid: 1-{total})")]
    PreferredSectorOutOfRange { requested: usize, total: usize },

    #[error("Preferred sector {0} is already occupied")]
    PreferredSectorOccupied(usize),

    #[error("Insufficient space: {needed} sectors needed, {free} free")]
    InsufficientSpace { needed: usize, free: usize },

    #[error("Chain policy produced an invalid chain: {0}")]
    PolicyViolation(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("File not found: {0}")]
    FileNotFound(FileId),
}

#[derive(Error, Debug)]
pub enum DiskError {
    #[error("Allocation failed: {0}")]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("Invalid disk configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Disk corrupted: {0}")]
    Corrupted(String),
}

pub type Result<T> = std::result::Result<T, DiskError>;
