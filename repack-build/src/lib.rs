//! The repack build pipeline.
//!
//! One strictly sequenced run: validate the declared entrypoints, hand the
//! build plan to the external transformer, clean up its byproducts, flatten
//! the module-format subtree into the output root with a collision-free
//! two-phase relocation, synthesize the package manifest, and copy assets.
//! The process working directory is scoped to the configured workspace root
//! for the whole run and restored on every exit path.

mod cwd;
mod options;
mod pipeline;
mod transform;

pub use cwd::ScopedCwd;
pub use options::{AssetSpec, BuildOptions, DEFAULT_OUTPUT_DIR};
pub use pipeline::{BuildReport, build};
pub use transform::{CommandTransformer, TransformRequest, Transformer};
