//! Removal of the in-cluster Tiller workload.

use std::process::Command;

use anyhow::{bail, Context, Result};

use super::DEFAULT_TILLER_NAMESPACE;

pub const TILLER_DEPLOY: &str = "tiller-deploy";

/// Remove the Tiller deployment and service through the orchestrator CLI.
/// Success is judged from kubectl's stdout; any other output is a failure.
pub fn remove_tiller(namespace: &str, dry_run: bool) -> Result<()> {
    let namespace = if namespace.is_empty() {
        DEFAULT_TILLER_NAMESPACE
    } else {
        namespace
    };
    if !dry_run {
        for kind in ["deploy", "service"] {
            println!("[Helm 2] Tiller \"{kind}\" in \"{namespace}\" namespace will be removed.");
            delete_tiller_object(namespace, kind)?;
            println!("[Helm 2] Tiller \"{kind}\" in \"{namespace}\" namespace was removed successfully.");
        }
    }
    Ok(())
}

fn delete_tiller_object(namespace: &str, kind: &str) -> Result<()> {
    let target = format!("{kind}/{TILLER_DEPLOY}");
    let output = Command::new("kubectl")
        .args(["delete", "--namespace", namespace, &target])
        .output()
        .context("running kubectl delete")?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains("\"tiller-deploy\" deleted") {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("failed to remove Tiller {kind} in namespace {namespace}: {stdout}{stderr}");
    }
    Ok(())
}
