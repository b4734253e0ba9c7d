//! The cleanup driver: retire the v2 release records, the Tiller workload
//! and the local v2 configuration home. Helm v2 is unusable afterwards.

use anyhow::Result;

use crate::common::prompt;
use crate::v2::{self, RetrieveOptions};

#[derive(Clone, Debug)]
pub struct CleanupOptions {
    pub config_cleanup: bool,
    pub release_cleanup: bool,
    pub tiller_cleanup: bool,
    pub dry_run: bool,
    pub storage_type: String,
    pub tiller_label: String,
    pub tiller_namespace: String,
    pub tiller_out_cluster: bool,
}

pub async fn run(mut opts: CleanupOptions) -> Result<()> {
    apply_default_scope(&mut opts);

    if opts.dry_run {
        println!("NOTE: This is in dry-run mode, the following actions will not be executed.");
        println!("Run without --dry-run to take the actions described below:");
        println!();
    }

    println!("{}", warning_message(&opts));

    if !prompt::ask_confirmation("Cleanup", "cleanup Helm v2 data")? {
        println!("Cleanup will not proceed as the user didn't answer (Y|y) in order to continue.");
        return Ok(());
    }

    println!();
    println!("Helm v2 data will be cleaned up.");

    if opts.release_cleanup {
        println!("[Helm 2] Releases will be deleted.");
        let retrieve = RetrieveOptions {
            release_name: String::new(),
            storage_type: opts.storage_type.clone(),
            tiller_label: opts.tiller_label.clone(),
            tiller_namespace: opts.tiller_namespace.clone(),
            tiller_out_cluster: opts.tiller_out_cluster,
        };
        v2::delete_all_release_versions(&retrieve, opts.dry_run).await?;
        if !opts.dry_run {
            println!("[Helm 2] Releases deleted.");
        }
    }

    if !opts.tiller_out_cluster && opts.tiller_cleanup {
        println!(
            "[Helm 2] Tiller in \"{}\" namespace will be removed.",
            opts.tiller_namespace
        );
        v2::tiller::remove_tiller(&opts.tiller_namespace, opts.dry_run)?;
        if !opts.dry_run {
            println!(
                "[Helm 2] Tiller in \"{}\" namespace was removed.",
                opts.tiller_namespace
            );
        }
    }

    if opts.config_cleanup {
        v2::home::remove_home_folder(opts.dry_run)?;
    }

    if !opts.dry_run {
        println!("Helm v2 data was cleaned up successfully.");
    }
    Ok(())
}

/// With no explicit scope, everything is cleaned up.
fn apply_default_scope(opts: &mut CleanupOptions) {
    if !opts.config_cleanup && !opts.release_cleanup && !opts.tiller_cleanup {
        opts.config_cleanup = true;
        opts.release_cleanup = true;
        opts.tiller_cleanup = true;
    }
}

fn warning_message(opts: &CleanupOptions) -> String {
    let mut message = String::from("WARNING: ");
    if opts.config_cleanup {
        message.push_str("\"Helm v2 Configuration\" ");
    }
    if opts.release_cleanup {
        message.push_str("\"Release Data\" ");
    }
    if opts.tiller_cleanup {
        message.push_str("\"Tiller\" ");
    }
    message.push_str("will be removed.\n");
    if opts.release_cleanup {
        message.push_str(
            "This will clean up all releases managed by Helm v2. It will not be possible to \
             restore them if you haven't made a backup of the releases.\n",
        );
    }
    message.push_str("Helm v2 may not be usable afterwards.");
    message
}
