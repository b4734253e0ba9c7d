use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Diagnostic logging only; the migration narrative itself goes to stdout
/// because it is part of the tool's contract (dry-run output in particular).
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
