//! The conversion driver: retrieve every v2 version of a release, map each
//! one, store it on the v3 side, and optionally delete the v2 records.

use crate::errors::Error;
use crate::v2::{self, DeleteOptions, RetrieveOptions, StorageKind};
use crate::v3;

#[derive(Clone, Debug)]
pub struct ConvertOptions {
    pub release_name: String,
    pub dry_run: bool,
    pub delete_v2_releases: bool,
    /// Newest N versions to migrate; 0 means every version.
    pub max_release_versions: usize,
    pub storage_type: String,
    pub tiller_label: String,
    pub tiller_namespace: String,
    pub tiller_out_cluster: bool,
}

/// The underlying Kubernetes workloads are untouched; only release records
/// move. Re-running after a partial failure resumes behind the already
/// written versions, which then surface as duplicates rather than being
/// silently overwritten.
pub async fn run(opts: ConvertOptions) -> Result<(), Error> {
    StorageKind::parse(&opts.storage_type)?;

    if opts.dry_run {
        println!("NOTE: This is in dry-run mode, the following actions will not be executed.");
        println!("Run without --dry-run to take the actions described below:");
        println!();
    }
    println!(
        "Release \"{}\" will be converted from Helm v2 to Helm v3.",
        opts.release_name
    );
    println!("[Helm 3] Release \"{}\" will be created.", opts.release_name);

    let retrieve = RetrieveOptions {
        release_name: opts.release_name.clone(),
        storage_type: opts.storage_type.clone(),
        tiller_label: opts.tiller_label.clone(),
        tiller_namespace: opts.tiller_namespace.clone(),
        tiller_out_cluster: opts.tiller_out_cluster,
    };
    let releases = v2::get_release_versions(&retrieve).await?;
    let versions = convert_versions(
        &opts.release_name,
        releases,
        opts.max_release_versions,
        opts.dry_run,
        opts.delete_v2_releases,
    )
    .await?;
    if !opts.dry_run {
        println!("[Helm 3] Release \"{}\" created.", opts.release_name);
    }

    if opts.delete_v2_releases {
        println!("[Helm 2] Release \"{}\" will be deleted.", opts.release_name);
        let delete = DeleteOptions { dry_run: opts.dry_run, versions };
        v2::delete_release_versions(&retrieve, &delete).await?;
        if !opts.dry_run {
            println!("[Helm 2] Release \"{}\" deleted.", opts.release_name);
            println!(
                "Release \"{}\" was converted successfully from Helm v2 to Helm v3.",
                opts.release_name
            );
        }
    } else if !opts.dry_run {
        println!(
            "Release \"{}\" was converted successfully from Helm v2 to Helm v3. \
             Note: the v2 releases still remain and should be removed to avoid \
             conflicts with the migrated v3 releases.",
            opts.release_name
        );
    }
    Ok(())
}

/// Map and store the selected versions in ascending order, returning the v2
/// versions that were processed (the later deletion list). The first failure
/// aborts; versions already written stay put as the restart point.
async fn convert_versions(
    release_name: &str,
    releases: Vec<hapi::Release>,
    max_versions: usize,
    dry_run: bool,
    delete_after: bool,
) -> Result<Vec<i32>, Error> {
    let (selected, skipped) = newest_versions(releases, max_versions);
    if skipped > 0 {
        println!(
            "Only the {} most recent release versions will be converted; {} older versions remain in v2 storage.",
            selected.len(),
            skipped
        );
        if delete_after {
            println!(
                "NOTE: the older versions will not be deleted and are orphaned after the \
                 conversion; run 'cleanup' to remove them."
            );
        }
    }
    let mut versions = Vec::with_capacity(selected.len());
    for release in &selected {
        let record_name = v2::release_version_name(release_name, release.version);
        println!("[Helm 3] ReleaseVersion \"{record_name}\" will be created.");
        if !dry_run {
            let converted = v3::convert_release(release)?;
            v3::storage::store_release(&converted).await?;
            println!("[Helm 3] ReleaseVersion \"{record_name}\" created.");
        }
        versions.push(release.version);
    }
    Ok(versions)
}

/// Ascending tail of the newest `max` versions; 0 keeps everything. The v2
/// adapter already returns the list sorted ascending by version.
fn newest_versions(mut releases: Vec<hapi::Release>, max: usize) -> (Vec<hapi::Release>, usize) {
    if max == 0 || releases.len() <= max {
        return (releases, 0);
    }
    let skipped = releases.len() - max;
    (releases.split_off(skipped), skipped)
}
