//! github-build - GitHub Actions build workflow synthesis
//!
//! Scans a repository for languages, linters and deployment descriptors, then rebuilds
//! its `.github/workflows/build.yml` from a rule catalog while keeping every
//! customization found in the previous workflow.
//!
//! # Example Usage
//!
//! ```no_run
//! use github_build::catalog::Catalog;
//! use github_build::config::{default_config_dir, CatalogPaths, Defaults};
//! use github_build::pipeline::{SynthesisOptions, Synthesizer};
//! use github_build::workflow::Workflow;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let paths = CatalogPaths::under(&default_config_dir());
//! let synthesizer = Synthesizer::new(
//!     Defaults::default(),
//!     Catalog::load(&paths)?,
//!     paths.bundled_linter_configs(),
//! );
//!
//! let output = synthesizer.synthesize(Path::new("."), Workflow::default(), SynthesisOptions::default())?;
//! println!("{}", output.workflow.to_yaml()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`workflow`]: document model of a workflow file
//! - [`catalog`]: linter, language and service rule catalogs
//! - [`detection`]: file system probes used by the phases
//! - [`pipeline`]: the synthesizer and its phases
//! - [`status`]: required status checks derived from a workflow
//! - [`application`]: a full run including dependabot, repository settings and .gitignore

pub mod application;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dependabot;
pub mod detection;
pub mod error;
pub mod fs;
pub mod gitignore;
pub mod pipeline;
pub mod repository;
pub mod status;
pub mod util;
pub mod workflow;

pub use application::{Application, RunReport};
pub use config::{CatalogPaths, Defaults};
pub use error::{BuildError, Result};
pub use pipeline::{SynthesisOptions, SynthesisOutput, Synthesizer};
pub use workflow::{Job, Step, Workflow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
