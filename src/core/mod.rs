//! Allocation engine
//!
//! - [`sector`] - sector records and the fixed-length store
//! - [`registry`] - live files and their chains
//! - [`allocator`] - chain planning and writing
//! - [`deallocator`] - removal with residual data
//! - [`free_space`] - free sector lists and range formatting
//! - [`integrity`] - invariant checks and chain read-back
//! - [`disk`] - the store object tying it together

pub mod allocator;
pub mod config;
pub mod deallocator;
pub mod disk;
pub mod error;
pub mod free_space;
pub mod integrity;
pub mod registry;
pub mod sector;


pub use disk::{Disk, DiskView};
