//! Property file access.
//!
//! The runner only needs whole-file reads and writes. [`PropertyStore`]
//! is the seam tests use to observe (or forbid) file access.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub trait PropertyStore {
    fn read(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Local filesystem store.
///
/// Writes land in a sibling temporary file that is renamed over the target,
/// so readers see either the old or the new content. The staged file takes
/// over the target's mode, owner and group. When the directory refuses the
/// staging file, or the owner cannot be carried over, the target is
/// rewritten in place instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FsStore {
    fn staging_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".rss-entrypoint.tmp");
        path.with_file_name(name)
    }

    fn write_in_place(path: &Path, contents: &str, cause: &io::Error) -> io::Result<()> {
        tracing::debug!(path = %path.display(), error = %cause, "Staging refused, writing in place");
        fs::write(path, contents)
    }
}

fn stage_and_rename(
    file: &mut fs::File,
    staging: &Path,
    path: &Path,
    contents: &str,
    existing: Option<&fs::Metadata>,
) -> io::Result<()> {
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    if let Some(meta) = existing {
        fs::set_permissions(staging, meta.permissions())?;
        copy_owner(staging, meta)?;
    }
    fs::rename(staging, path)
}

#[cfg(unix)]
fn copy_owner(staging: &Path, meta: &fs::Metadata) -> io::Result<()> {
    use std::os::unix::fs::{chown, MetadataExt};
    chown(staging, Some(meta.uid()), Some(meta.gid()))
}

#[cfg(not(unix))]
fn copy_owner(_staging: &Path, _meta: &fs::Metadata) -> io::Result<()> {
    Ok(())
}

impl PropertyStore for FsStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let existing = fs::metadata(path).ok();
        let staging = Self::staging_path(path);

        let mut file = match fs::File::create(&staging) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied && existing.is_some() => {
                return Self::write_in_place(path, contents, &e);
            }
            Err(e) => return Err(e),
        };

        match stage_and_rename(&mut file, &staging, path, contents, existing.as_ref()) {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = fs::remove_file(&staging);
                if e.kind() == io::ErrorKind::PermissionDenied && existing.is_some() {
                    Self::write_in_place(path, contents, &e)
                } else {
                    Err(e)
                }
            }
        }
    }
}
