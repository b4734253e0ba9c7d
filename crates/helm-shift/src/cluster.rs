//! Process-wide cluster access.
//!
//! The kubeconfig (file, context) is fixed once from the CLI flags, loaded
//! lazily on the first cluster call and memoized for the process lifetime.
//! Every storage operation on either side of the migration goes through the
//! same configuration.

use std::path::PathBuf;
use std::sync::RwLock;

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

#[derive(Clone, Debug, Default)]
pub struct ClusterOptions {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

static REQUESTED: RwLock<Option<ClusterOptions>> = RwLock::new(None);
static LOADED: RwLock<Option<Config>> = RwLock::new(None);

/// Record which kubeconfig/context the process should use. Must be called
/// before the first cluster operation; later calls are ignored once a config
/// has been loaded.
pub fn configure(opts: ClusterOptions) {
    *REQUESTED.write().expect("cluster options lock") = Some(opts);
}

pub async fn client() -> Result<Client> {
    let config = config().await?;
    Client::try_from(config).context("building cluster client")
}

async fn config() -> Result<Config> {
    {
        let loaded = LOADED.read().expect("cluster config lock");
        if let Some(config) = loaded.as_ref() {
            return Ok(config.clone());
        }
    }
    let requested = REQUESTED
        .read()
        .expect("cluster options lock")
        .clone()
        .unwrap_or_default();
    let config = load(&requested).await?;
    *LOADED.write().expect("cluster config lock") = Some(config.clone());
    Ok(config)
}

async fn load(opts: &ClusterOptions) -> Result<Config> {
    let kube_opts = KubeConfigOptions {
        context: opts.context.clone(),
        ..Default::default()
    };
    let config = match &opts.kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("reading kubeconfig {}", path.display()))?;
            Config::from_custom_kubeconfig(kubeconfig, &kube_opts)
                .await
                .context("loading kubeconfig")?
        }
        None if opts.context.is_some() => Config::from_kubeconfig(&kube_opts)
            .await
            .context("loading kubeconfig context")?,
        None => Config::infer().await.context("inferring cluster config")?,
    };
    tracing::debug!(context = ?opts.context, "cluster config loaded");
    Ok(config)
}

/// Drops the memoized config so driver tests can swap kubeconfigs.
#[doc(hidden)]
pub fn reset() {
    *LOADED.write().expect("cluster config lock") = None;
    *REQUESTED.write().expect("cluster options lock") = None;
}
