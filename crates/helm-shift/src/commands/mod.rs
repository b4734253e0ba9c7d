use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod cleanup;
pub mod convert;
pub mod move_config;

#[derive(Parser, Debug)]
#[command(
    name = "helm-shift",
    version,
    about = "Migrate Helm v2 releases and configuration in-place to Helm v3"
)]
pub struct Cli {
    /// Log level when RUST_LOG is unset: trace|debug|info|warn|error
    #[arg(long, default_value = "info")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Migrate a Helm v2 release in-place to Helm v3
    Convert {
        /// Name of the release to convert
        release: String,
        #[command(flatten)]
        cluster: ClusterFlags,
        /// Delete the v2 release versions after migration. By default the v2
        /// releases are retained
        #[arg(long = "delete-v2-releases")]
        delete_v2_releases: bool,
        /// Limit migration to the newest N release versions (0 = unlimited)
        #[arg(long = "release-versions-max", default_value_t = 10)]
        release_versions_max: usize,
    },
    /// Clean up Helm v2 configuration, release data and the Tiller deployment
    Cleanup {
        #[command(flatten)]
        cluster: ClusterFlags,
        /// If set, configuration cleanup is performed
        #[arg(long = "config-cleanup")]
        config_cleanup: bool,
        /// If set, release data cleanup is performed
        #[arg(long = "release-cleanup")]
        release_cleanup: bool,
        /// If set, Tiller cleanup is performed
        #[arg(long = "tiller-cleanup")]
        tiller_cleanup: bool,
    },
    /// Migrate Helm v2 configuration in-place to Helm v3
    Move {
        #[command(subcommand)]
        target: MoveTarget,
    },
}

#[derive(Subcommand, Debug)]
pub enum MoveTarget {
    /// Copy the v2 home (repositories, plugins, starters) into the v3 config
    /// and data directories
    Config {
        /// Simulate the copy without writing anything
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Skip the interactive confirmation
        #[arg(long = "skip-confirmation")]
        skip_confirmation: bool,
    },
}

/// The flag block shared by the cluster-facing commands.
#[derive(Args, Debug, Clone)]
pub struct ClusterFlags {
    /// Simulate the actions without executing them
    #[arg(long = "dry-run")]
    pub dry_run: bool,
    /// Path to the kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,
    /// Name of the kubeconfig context to use
    #[arg(long = "kube-context")]
    pub kube_context: Option<String>,
    /// Namespace of Tiller
    #[arg(long = "tiller-ns", short = 't', default_value = "kube-system")]
    pub tiller_ns: String,
    /// Label to select Tiller release records by
    #[arg(long, short = 'l', default_value = "OWNER=TILLER")]
    pub label: String,
    /// Set when Tiller is not running in the cluster (Tillerless)
    #[arg(long = "tiller-out-cluster")]
    pub tiller_out_cluster: bool,
    /// v2 release storage kind, 'secrets' or 'configmaps'; only used with
    /// --tiller-out-cluster
    #[arg(long = "release-storage", short = 's', default_value = "secrets")]
    pub release_storage: String,
}
