//! Filesystem helpers for the config move: recursive copies that re-create
//! symlinks instead of following them.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating folder {}", dir.display()))
}

pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    fs::copy(src, dest)
        .with_context(|| format!("copying {} to {}", src.display(), dest.display()))?;
    Ok(())
}

pub fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    ensure_dir(dest)?;
    let entries =
        fs::read_dir(src).with_context(|| format!("reading folder {}", src.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("reading folder {}", src.display()))?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let file_type = fs::symlink_metadata(&src_path)
            .with_context(|| format!("inspecting {}", src_path.display()))?
            .file_type();
        if file_type.is_symlink() {
            copy_symlink(&src_path, &dest_path)?;
        } else if file_type.is_dir() {
            copy_dir(&src_path, &dest_path)?;
        } else {
            copy_file(&src_path, &dest_path)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    let target = fs::read_link(src)
        .with_context(|| format!("reading symlink {}", src.display()))?;
    match std::os::unix::fs::symlink(&target, dest) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(err) => {
            Err(err).with_context(|| format!("creating symlink {}", dest.display()))
        }
    }
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    // Symlinks need elevated rights on other platforms; fall back to copying
    // the link target's content.
    copy_file(src, dest)
}
