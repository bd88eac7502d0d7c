use crate::error::{BuildError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Replaces `path` with `contents`, creating parent directories as needed
///
/// The temporary file lives next to the target and is removed if anything fails before
/// the rename, leaving the previous target untouched.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = parent_dir(path);
    fs::create_dir_all(&dir).map_err(|e| BuildError::io(&dir, e))?;

    let mut temp = NamedTempFile::new_in(&dir).map_err(|e| BuildError::io(&dir, e))?;
    temp.write_all(contents)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| BuildError::io(temp.path(), e))?;

    temp.persist(path)
        .map_err(|e| BuildError::io(path, e.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "Wrote file");
    Ok(())
}

/// Points `link` at `target`, replacing whatever `link` was before
///
/// The link is staged under a unique name next to `link`; a staging link left behind by
/// a failed rename is removed when it is dropped.
#[cfg(unix)]
pub fn symlink_atomic(target: &Path, link: &Path) -> Result<()> {
    let dir = parent_dir(link);
    fs::create_dir_all(&dir).map_err(|e| BuildError::io(&dir, e))?;

    let staging = tempfile::Builder::new()
        .prefix(".link")
        .make_in(&dir, |path| std::os::unix::fs::symlink(target, path))
        .map_err(|e| BuildError::io(&dir, e))?;

    staging
        .persist(link)
        .map_err(|e| BuildError::io(link, e.error))?;

    debug!(link = %link.display(), target = %target.display(), "Linked file");
    Ok(())
}

#[cfg(not(unix))]
pub fn symlink_atomic(target: &Path, link: &Path) -> Result<()> {
    let contents = fs::read(target).map_err(|e| BuildError::io(target, e))?;
    write_atomic(link, &contents)
}

/// Removes a file or symlink; absence is not an error
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::io(path, e)),
    }
}
