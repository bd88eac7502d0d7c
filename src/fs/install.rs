use super::atomic::{symlink_atomic, write_atomic};
use crate::error::{BuildError, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Where a linter configuration comes from
#[derive(Debug, Clone, Copy)]
pub enum ConfigSource<'a> {
    /// Shared configuration from the scripts submodule, linked in place
    Shared(&'a Path),

    /// Default configuration bundled with this tool, copied and optionally transformed
    Bundled {
        path: &'a Path,
        uncomment: Option<&'a str>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Linked,
    Copied,
    Kept,
}

/// Makes sure the linter configuration at `target` exists
///
/// An existing configuration is kept when `preserve` is set, otherwise it is refreshed
/// from `source`. A dangling symlink counts as missing.
pub fn install_config(target: &Path, source: ConfigSource<'_>, preserve: bool) -> Result<InstallOutcome> {
    if preserve && target.exists() {
        return Ok(InstallOutcome::Kept);
    }

    match source {
        ConfigSource::Shared(shared) => {
            symlink_atomic(shared, target)?;
            info!(config = %target.display(), "Linked shared linter configuration");
            Ok(InstallOutcome::Linked)
        }
        ConfigSource::Bundled { path, uncomment } => {
            let mut content = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
            if let Some(token) = uncomment {
                content = uncomment_lines(&content, token);
            }
            write_atomic(target, content.as_bytes())?;
            info!(config = %target.display(), "Installed default linter configuration");
            Ok(InstallOutcome::Copied)
        }
    }
}

/// Uncomments every commented line containing `token`, keeping its indentation
pub fn uncomment_lines(content: &str, token: &str) -> String {
    let mut result = String::with_capacity(content.len());

    for line in content.split_inclusive('\n') {
        if !line.contains(token) {
            result.push_str(line);
            continue;
        }

        let indent = line.len() - line.trim_start().len();
        let (lead, rest) = line.split_at(indent);
        match rest.strip_prefix('#') {
            Some(uncommented) => {
                result.push_str(lead);
                result.push_str(uncommented.strip_prefix(' ').unwrap_or(uncommented));
            }
            None => result.push_str(line),
        }
    }

    result
}
