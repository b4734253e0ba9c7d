use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use helm_shift::cluster::{self, ClusterOptions};
use helm_shift::commands::{cleanup, convert, move_config, Cli, Commands, MoveTarget};
use helm_shift::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;
    if let Err(err) = dispatch(cli).await {
        eprintln!("{err:#}");
        process::exit(1);
    }
    Ok(())
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert { release, cluster: flags, delete_v2_releases, release_versions_max } => {
            cluster::configure(ClusterOptions {
                kubeconfig: flags.kubeconfig.clone(),
                context: flags.kube_context.clone(),
            });
            convert::run(convert::ConvertOptions {
                release_name: release,
                dry_run: flags.dry_run,
                delete_v2_releases,
                max_release_versions: release_versions_max,
                storage_type: flags.release_storage,
                tiller_label: flags.label,
                tiller_namespace: flags.tiller_ns,
                tiller_out_cluster: flags.tiller_out_cluster,
            })
            .await
            .context("conversion failed")
        }
        Commands::Cleanup { cluster: flags, config_cleanup, release_cleanup, tiller_cleanup } => {
            cluster::configure(ClusterOptions {
                kubeconfig: flags.kubeconfig.clone(),
                context: flags.kube_context.clone(),
            });
            cleanup::run(cleanup::CleanupOptions {
                config_cleanup,
                release_cleanup,
                tiller_cleanup,
                dry_run: flags.dry_run,
                storage_type: flags.release_storage,
                tiller_label: flags.label,
                tiller_namespace: flags.tiller_ns,
                tiller_out_cluster: flags.tiller_out_cluster,
            })
            .await
            .context("cleanup failed")
        }
        Commands::Move { target: MoveTarget::Config { dry_run, skip_confirmation } } => {
            move_config::run(move_config::MoveOptions { dry_run, skip_confirmation })
                .context("config move failed")
        }
    }
}
