//! Copy the local v2 configuration home into the v3 locations. Not a 1-to-1
//! copy: repositories and starters move, caches are recreated by v3 on
//! demand and are left behind.

use std::path::Path;

use anyhow::{Context, Result};

use crate::common::{fs, prompt};
use crate::v2;
use crate::v3;

#[derive(Clone, Debug)]
pub struct MoveOptions {
    pub dry_run: bool,
    pub skip_confirmation: bool,
}

pub fn run(opts: MoveOptions) -> Result<()> {
    if opts.dry_run {
        println!("NOTE: This is in dry-run mode, the following actions will not be executed.");
        println!("Run without --dry-run to take the actions described below:");
        println!();
    }

    println!("WARNING: Helm v2 configuration will be copied to Helm v3 configuration.");
    if !opts.skip_confirmation {
        if !prompt::ask_confirmation("Move Config", "move the v2 configuration")? {
            println!(
                "Move config will not proceed as the user didn't answer (Y|y) in order to continue."
            );
            return Ok(());
        }
    }

    move_home(opts.dry_run)?;
    if !opts.dry_run {
        println!("Helm v2 configuration was moved successfully to Helm v3.");
    }
    Ok(())
}

fn move_home(dry_run: bool) -> Result<()> {
    let v2_home = v2::home::home_dir();
    println!("[Helm 2] Home directory: {}", v2_home.display());
    let v3_config = v3::paths::config_dir();
    println!("[Helm 3] Config directory: {}", v3_config.display());
    let v3_data = v3::paths::data_dir();
    println!("[Helm 3] Data directory: {}", v3_data.display());

    println!("[Helm 3] Create config folder \"{}\".", v3_config.display());
    if !dry_run {
        fs::ensure_dir(&v3_config)
            .with_context(|| format!("creating v3 config folder {}", v3_config.display()))?;
    }

    let v2_repositories = v2_home.join("repository").join("repositories.yaml");
    let v3_repositories = v3_config.join("repositories.yaml");
    println!(
        "[Helm 2] repositories file \"{}\" will copy to [Helm 3] config folder \"{}\".",
        v2_repositories.display(),
        v3_repositories.display()
    );
    if !dry_run {
        fs::copy_file(&v2_repositories, &v3_repositories)
            .context("copying v2 repositories file")?;
    }

    println!("[Helm 3] Create data folder \"{}\".", v3_data.display());
    if !dry_run {
        fs::ensure_dir(&v3_data)
            .with_context(|| format!("creating v3 data folder {}", v3_data.display()))?;
    }

    copy_tree(&v2_home.join("plugins"), &v3_data.join("plugins"), "plugins", dry_run)?;
    copy_tree(&v2_home.join("starters"), &v3_data.join("starters"), "starters", dry_run)?;
    Ok(())
}

fn copy_tree(src: &Path, dest: &Path, what: &str, dry_run: bool) -> Result<()> {
    if !src.exists() {
        println!("[Helm 2] No {what} to copy.");
        return Ok(());
    }
    println!(
        "[Helm 2] {what} \"{}\" will copy to [Helm 3] data folder \"{}\".",
        src.display(),
        dest.display()
    );
    if !dry_run {
        fs::copy_dir(src, dest).with_context(|| format!("copying v2 {what}"))?;
    }
    Ok(())
}
