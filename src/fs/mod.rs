//! File system writes
//!
//! Every file this crate produces is replaced whole. Writes go to a temporary file in
//! the target's directory and are renamed over the target, so a failed run never
//! leaves a half-written file behind.

mod atomic;
mod install;

pub use atomic::{remove_if_exists, symlink_atomic, write_atomic};
pub use install::{install_config, uncomment_lines, ConfigSource, InstallOutcome};
