//! Filesystem primitives for the repack packaging pipeline.
//!
//! This crate provides the pieces of the pipeline that touch the disk
//! directly: one-shot recursive directory snapshots, small directory
//! helpers, and a reusable two-phase batch relocation that merges one
//! subtree into another without ever overwriting a file that has not
//! yet been moved.

mod fsops;
mod relocate;
mod walk;

// Directory helpers
pub use fsops::{copy_path, empty_dir, ensure_dir, prune_empty_dirs, remove_path};
// Batch relocation
pub use relocate::{Move, Relocation, StagedFile};
// Snapshots
pub use walk::{SnapshotEntry, snapshot};
