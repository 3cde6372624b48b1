//! Atomic file replacement for the settings document.
//!
//! Contents are staged in a hidden sibling file, flushed to disk, then
//! renamed over the target, so readers see either the old document or the
//! new one and never a partial write.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

use crate::error::SettingsError;

static STAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Writes `contents` to `path` inside `dir`, replacing any existing file.
///
/// `path` must be a single file name relative to `dir`.
///
/// # Errors
///
/// Returns [`SettingsError::WriteError`] if the path is not a plain file name
/// or any step of the write fails. The staged file is removed on failure.
pub(crate) fn write_atomic(
    dir: &Dir,
    path: &Utf8Path,
    contents: &str,
) -> Result<(), SettingsError> {
    let file_name = single_file_name(path)?;
    let write_error = |err: io::Error| SettingsError::WriteError {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let staged = StagedFile::create(dir, file_name).map_err(write_error)?;
    staged.fill(contents).map_err(write_error)?;
    staged.commit(file_name).map_err(write_error)?;

    // Directory sync is best effort; the rename has already happened.
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
    Ok(())
}

fn single_file_name(path: &Utf8Path) -> Result<&str, SettingsError> {
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Utf8Component::Normal(name)), None) => Ok(name),
        _ => Err(SettingsError::WriteError {
            path: path.to_path_buf(),
            message: "settings path must be a file name".to_owned(),
        }),
    }
}

/// A hidden temp file that is deleted unless committed.
struct StagedFile<'dir> {
    dir: &'dir Dir,
    name: String,
    committed: bool,
}

impl<'dir> StagedFile<'dir> {
    fn create(dir: &'dir Dir, target: &str) -> io::Result<Self> {
        let counter = STAGE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let name = format!(".{target}.tmp.{}.{counter}", std::process::id());
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        dir.open_with(&name, &options)?;
        Ok(Self {
            dir,
            name,
            committed: false,
        })
    }

    fn fill(&self, contents: &str) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).truncate(true);
        let mut file = self.dir.open_with(&self.name, &options)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    }

    fn commit(mut self, target: &str) -> io::Result<()> {
        replace(self.dir, &self.name, target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile<'_> {
    fn drop(&mut self) {
        if !self.committed {
            drop(self.dir.remove_file(&self.name));
        }
    }
}

#[cfg(windows)]
fn replace(dir: &Dir, staged: &str, target: &str) -> io::Result<()> {
    // Rename does not overwrite on Windows.
    match dir.remove_file(target) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(staged, dir, target)
}

#[cfg(not(windows))]
fn replace(dir: &Dir, staged: &str, target: &str) -> io::Result<()> {
    dir.rename(staged, dir, target)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("nested/rules.json")]
    #[case("../rules.json")]
    #[case("/rules.json")]
    fn rejects_paths_that_are_not_file_names(#[case] raw: &str) {
        let result = single_file_name(Utf8Path::new(raw));
        assert!(matches!(result, Err(SettingsError::WriteError { .. })));
    }

    #[test]
    fn accepts_plain_file_name() {
        let result = single_file_name(Utf8Path::new("rules.json"));
        assert_eq!(result, Ok("rules.json"));
    }
}
