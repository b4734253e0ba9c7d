//! Helm v2 side of the migration: enumerating, decoding and deleting the
//! release records Tiller persisted into the cluster.

pub mod codec;
pub mod home;
pub mod tiller;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::api::{Api, DeleteParams, ListParams};
use kube::ResourceExt;

use crate::cluster;
use crate::errors::Error;

pub const DEFAULT_TILLER_NAMESPACE: &str = "kube-system";
pub const DEFAULT_TILLER_LABEL: &str = "OWNER=TILLER";
const DEFAULT_STORAGE: StorageKind = StorageKind::ConfigMaps;

/// Key under the record object's data map holding the encoded release.
const PAYLOAD_KEY: &str = "release";

/// The two object kinds Tiller can persist release records as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    ConfigMaps,
    Secrets,
}

impl StorageKind {
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "configmaps" => Ok(StorageKind::ConfigMaps),
            "secrets" => Ok(StorageKind::Secrets),
            other => Err(Error::BadStorage(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RetrieveOptions {
    /// Empty selects every release under the label scope.
    pub release_name: String,
    /// Only consulted with `tiller_out_cluster`; otherwise the backend is
    /// discovered from the Tiller deployment.
    pub storage_type: String,
    pub tiller_label: String,
    pub tiller_namespace: String,
    pub tiller_out_cluster: bool,
}

impl RetrieveOptions {
    fn namespace(&self) -> &str {
        if self.tiller_namespace.is_empty() {
            DEFAULT_TILLER_NAMESPACE
        } else {
            &self.tiller_namespace
        }
    }

    fn selector(&self) -> String {
        let mut selector = if self.tiller_label.is_empty() {
            DEFAULT_TILLER_LABEL.to_string()
        } else {
            self.tiller_label.clone()
        };
        if !self.release_name.is_empty() {
            selector.push_str(&format!(",NAME={}", self.release_name));
        }
        selector
    }
}

#[derive(Clone, Debug, Default)]
pub struct DeleteOptions {
    pub dry_run: bool,
    pub versions: Vec<i32>,
}

/// The record naming convention shared by both release managers.
pub fn release_version_name(release: &str, version: impl std::fmt::Display) -> String {
    format!("{release}.v{version}")
}

/// All stored versions of a release, ascending by version. An empty result is
/// an error here: the conversion driver has nothing to work with.
pub async fn get_release_versions(opts: &RetrieveOptions) -> Result<Vec<hapi::Release>, Error> {
    let releases = list_releases(opts).await?;
    if releases.is_empty() {
        return Err(Error::NoReleases(opts.release_name.clone()));
    }
    Ok(releases)
}

/// List and decode every record under the label scope, sorted ascending by
/// version. Objects whose payload does not decode are skipped: the selector
/// can match unrelated objects.
pub async fn list_releases(opts: &RetrieveOptions) -> Result<Vec<hapi::Release>, Error> {
    let storage = resolve_storage(opts).await?;
    let client = cluster::client().await.map_err(Error::ListBackend)?;
    let params = ListParams::default().labels(&opts.selector());
    let mut releases = Vec::new();
    match storage {
        StorageKind::Secrets => {
            let api: Api<Secret> = Api::namespaced(client, opts.namespace());
            let items = api.list(&params).await.map_err(|e| Error::ListBackend(e.into()))?;
            for item in items {
                let payload = item
                    .data
                    .as_ref()
                    .and_then(|data| data.get(PAYLOAD_KEY))
                    .and_then(|bytes| std::str::from_utf8(&bytes.0).ok())
                    .and_then(|text| codec::decode_release(text).ok());
                match payload {
                    Some(release) => releases.push(release),
                    None => tracing::debug!(object = %item.name_any(), "skipping undecodable record"),
                }
            }
        }
        StorageKind::ConfigMaps => {
            let api: Api<ConfigMap> = Api::namespaced(client, opts.namespace());
            let items = api.list(&params).await.map_err(|e| Error::ListBackend(e.into()))?;
            for item in items {
                let payload = item
                    .data
                    .as_ref()
                    .and_then(|data| data.get(PAYLOAD_KEY))
                    .and_then(|text| codec::decode_release(text).ok());
                match payload {
                    Some(release) => releases.push(release),
                    None => tracing::debug!(object = %item.name_any(), "skipping undecodable record"),
                }
            }
        }
    }
    releases.sort_by_key(|release| release.version);
    Ok(releases)
}

/// Delete the named record versions collected by the conversion driver.
/// Issued in list order; the first failure aborts the rest.
pub async fn delete_release_versions(
    opts: &RetrieveOptions,
    delete: &DeleteOptions,
) -> Result<(), Error> {
    for version in &delete.versions {
        let record_name = release_version_name(&opts.release_name, version);
        println!("[Helm 2] ReleaseVersion \"{record_name}\" will be deleted.");
        if !delete.dry_run {
            delete_release_version(opts, &record_name).await?;
            println!("[Helm 2] ReleaseVersion \"{record_name}\" deleted.");
        }
    }
    Ok(())
}

/// Cleanup sweep: delete every record under the label scope. An empty scope
/// is not an error for cleanup.
pub async fn delete_all_release_versions(
    opts: &RetrieveOptions,
    dry_run: bool,
) -> Result<(), Error> {
    let releases = list_releases(opts).await?;
    if releases.is_empty() {
        println!(
            "[Helm 2] no deployed releases for namespace: {}, owner: {}",
            opts.namespace(),
            opts.selector()
        );
        return Ok(());
    }
    for release in &releases {
        let record_name = release_version_name(&release.name, release.version);
        println!("[Helm 2] ReleaseVersion \"{record_name}\" will be deleted.");
        if !dry_run {
            delete_release_version(opts, &record_name).await?;
            println!("[Helm 2] ReleaseVersion \"{record_name}\" deleted.");
        }
    }
    Ok(())
}

/// Delete one labeled record object by name, under the same backend
/// discovery rules as listing.
pub async fn delete_release_version(
    opts: &RetrieveOptions,
    record_name: &str,
) -> Result<(), Error> {
    let storage = resolve_storage(opts).await?;
    let client = cluster::client().await.map_err(Error::DeleteBackend)?;
    let params = DeleteParams::default();
    match storage {
        StorageKind::Secrets => {
            let api: Api<Secret> = Api::namespaced(client, opts.namespace());
            api.delete(record_name, &params)
                .await
                .map_err(|e| Error::DeleteBackend(e.into()))?;
        }
        StorageKind::ConfigMaps => {
            let api: Api<ConfigMap> = Api::namespaced(client, opts.namespace());
            api.delete(record_name, &params)
                .await
                .map_err(|e| Error::DeleteBackend(e.into()))?;
        }
    }
    Ok(())
}

/// With Tiller in-cluster the storage kind is whatever its deployment was
/// started with; only Tillerless setups trust the explicit flag.
async fn resolve_storage(opts: &RetrieveOptions) -> Result<StorageKind, Error> {
    if opts.tiller_out_cluster {
        if opts.storage_type.is_empty() {
            return Ok(DEFAULT_STORAGE);
        }
        return StorageKind::parse(&opts.storage_type);
    }
    let client = cluster::client().await.map_err(Error::ListBackend)?;
    let api: Api<Deployment> = Api::namespaced(client, opts.namespace());
    match api.get_opt(tiller::TILLER_DEPLOY).await {
        Ok(Some(deployment)) => Ok(storage_from_deployment(&deployment)),
        Ok(None) => Ok(DEFAULT_STORAGE),
        Err(err) => Err(Error::ListBackend(err.into())),
    }
}

fn storage_from_deployment(deployment: &Deployment) -> StorageKind {
    let containers = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .map(|pod| pod.containers.as_slice())
        .unwrap_or_default();
    let secret_flag = containers.iter().any(|container| {
        container
            .command
            .iter()
            .flatten()
            .chain(container.args.iter().flatten())
            .any(|arg| arg.contains("--storage=secret"))
    });
    if secret_flag {
        StorageKind::Secrets
    } else {
        StorageKind::ConfigMaps
    }
}
