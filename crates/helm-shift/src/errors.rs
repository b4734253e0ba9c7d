use thiserror::Error;

/// Everything the conversion engine can surface. Nothing here is silently
/// recovered; the only swallowed failure in the whole engine is a per-record
/// decode skip while listing v2 storage (undecodable objects are treated as
/// unrelated).
#[derive(Debug, Error)]
pub enum Error {
    #[error("release storage must be 'secrets' or 'configmaps', got '{0}'")]
    BadStorage(String),
    #[error("{0} has no deployed releases")]
    NoReleases(String),
    #[error("listing v2 releases: {0:#}")]
    ListBackend(anyhow::Error),
    #[error("deleting v2 release record: {0:#}")]
    DeleteBackend(anyhow::Error),
    #[error("storing v3 release: {0:#}")]
    StoreBackend(anyhow::Error),
    #[error("v2 release has no chart or info metadata")]
    MalformedRelease,
    #[error("parsing release values: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
    #[error("unknown release status code {0}")]
    StatusUnknown(i32),
    #[error("unknown hook event code {0}")]
    HookEventUnknown(i32),
    #[error("unknown hook delete policy code {0}")]
    DeletePolicyUnknown(i32),
    #[error("unknown test run status code {0}")]
    TestStatusUnknown(i32),
    #[error("timestamp out of range: seconds={0} nanos={1}")]
    Timestamp(i64, i32),
    #[error("chart dependency tree deeper than {0} levels")]
    ChartDepthExceeded(usize),
    #[error("unsupported HELM_DRIVER value '{0}'")]
    UnknownDriver(String),
    #[error("release record \"{0}\" already exists in v3 storage")]
    AlreadyExists(String),
}
