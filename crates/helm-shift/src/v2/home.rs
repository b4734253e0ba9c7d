//! The local v2 configuration home.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// `HELM_V2_HOME` wins over the conventional `~/.helm`.
pub fn home_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HELM_V2_HOME") {
        return PathBuf::from(home);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".helm")
}

pub fn remove_home_folder(dry_run: bool) -> Result<()> {
    let home = home_dir();
    println!("[Helm 2] Home folder \"{}\" will be deleted.", home.display());
    if !dry_run {
        fs::remove_dir_all(&home)
            .with_context(|| format!("deleting home folder {}", home.display()))?;
        println!("[Helm 2] Home folder \"{}\" deleted.", home.display());
    }
    Ok(())
}
