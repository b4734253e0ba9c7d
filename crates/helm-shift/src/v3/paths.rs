//! The v3 configuration and data locations on the local machine.

use std::path::PathBuf;

pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HELM_V3_CONFIG") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("helm")
}

pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HELM_V3_DATA") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("helm")
}
