//! Capability detection over the repository file tree

mod detector;
mod submodules;

pub use detector::{
    file_contains, files_matching, Detector, ALWAYS_IGNORED_DIRS, DEFAULT_MAX_DEPTH,
};
pub use submodules::Submodules;
