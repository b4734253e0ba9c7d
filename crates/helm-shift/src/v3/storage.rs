//! v3 storage backends.
//!
//! The backend is selected by `HELM_DRIVER`, scoped to the release's
//! namespace, and only supports create: a duplicate `(release, version)` is
//! an error, never an overwrite. Records are one labeled cluster object each,
//! payload `base64(gzip(json(release)))` under the shared `release` data key.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::write::GzEncoder;
use flate2::Compression;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::ByteString;
use kube::api::{Api, ObjectMeta, PostParams};
use once_cell::sync::Lazy;

use super::release::Release;
use crate::cluster;
use crate::errors::Error;
use crate::v2::release_version_name;

pub const DRIVER_ENV: &str = "HELM_DRIVER";
const PAYLOAD_KEY: &str = "release";
const SECRET_TYPE: &str = "helm.sh/release.v1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverKind {
    Secrets,
    ConfigMaps,
    Memory,
}

impl DriverKind {
    /// `HELM_DRIVER` value mapping; the empty string selects the default.
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "" | "secret" | "secrets" => Ok(DriverKind::Secrets),
            "configmap" | "configmaps" => Ok(DriverKind::ConfigMaps),
            "memory" => Ok(DriverKind::Memory),
            other => Err(Error::UnknownDriver(other.to_string())),
        }
    }

    pub fn from_env() -> Result<Self, Error> {
        Self::parse(&std::env::var(DRIVER_ENV).unwrap_or_default())
    }
}

/// Store one converted release in its namespace.
pub async fn store_release(release: &Release) -> Result<(), Error> {
    let kind = DriverKind::from_env()?;
    let key = release_version_name(&release.name, release.version);
    let record = Record {
        payload: encode_release(release)?,
        labels: record_labels(release),
    };
    let driver: Box<dyn Driver> = match kind {
        DriverKind::Secrets => Box::new(SecretDriver { namespace: release.namespace.clone() }),
        DriverKind::ConfigMaps => {
            Box::new(ConfigMapDriver { namespace: release.namespace.clone() })
        }
        DriverKind::Memory => Box::new(MemoryDriver { namespace: release.namespace.clone() }),
    };
    driver.create(&key, record).await
}

struct Record {
    payload: String,
    labels: BTreeMap<String, String>,
}

#[async_trait]
trait Driver: Send + Sync {
    async fn create(&self, key: &str, record: Record) -> Result<(), Error>;
}

fn record_labels(release: &Release) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("name".to_string(), release.name.clone()),
        ("owner".to_string(), "helm".to_string()),
        ("status".to_string(), release.info.status.clone()),
        ("version".to_string(), release.version.to_string()),
    ])
}

fn encode_release(release: &Release) -> Result<String, Error> {
    let json = serde_json::to_vec(release).map_err(|e| Error::StoreBackend(e.into()))?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| Error::StoreBackend(e.into()))?;
    let compressed = encoder.finish().map_err(|e| Error::StoreBackend(e.into()))?;
    Ok(STANDARD.encode(compressed))
}

struct SecretDriver {
    namespace: String,
}

#[async_trait]
impl Driver for SecretDriver {
    async fn create(&self, key: &str, record: Record) -> Result<(), Error> {
        let client = cluster::client().await.map_err(Error::StoreBackend)?;
        let api: Api<Secret> = Api::namespaced(client, &self.namespace);
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(key.to_string()),
                namespace: Some(self.namespace.clone()),
                labels: Some(record.labels),
                ..Default::default()
            },
            type_: Some(SECRET_TYPE.to_string()),
            data: Some(BTreeMap::from([(
                PAYLOAD_KEY.to_string(),
                ByteString(record.payload.into_bytes()),
            )])),
            ..Default::default()
        };
        match api.create(&PostParams::default(), &secret).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(response)) if response.code == 409 => {
                Err(Error::AlreadyExists(key.to_string()))
            }
            Err(err) => Err(Error::StoreBackend(err.into())),
        }
    }
}

struct ConfigMapDriver {
    namespace: String,
}

#[async_trait]
impl Driver for ConfigMapDriver {
    async fn create(&self, key: &str, record: Record) -> Result<(), Error> {
        let client = cluster::client().await.map_err(Error::StoreBackend)?;
        let api: Api<ConfigMap> = Api::namespaced(client, &self.namespace);
        let config_map = ConfigMap {
            metadata: ObjectMeta {
                name: Some(key.to_string()),
                namespace: Some(self.namespace.clone()),
                labels: Some(record.labels),
                ..Default::default()
            },
            data: Some(BTreeMap::from([(PAYLOAD_KEY.to_string(), record.payload)])),
            ..Default::default()
        };
        match api.create(&PostParams::default(), &config_map).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(response)) if response.code == 409 => {
                Err(Error::AlreadyExists(key.to_string()))
            }
            Err(err) => Err(Error::StoreBackend(err.into())),
        }
    }
}

static MEMORY: Lazy<Mutex<BTreeMap<String, String>>> = Lazy::new(|| Mutex::new(BTreeMap::new()));

/// In-process backend for driver tests; keyed by `namespace/record-name` so
/// concurrent tests stay isolated per namespace.
struct MemoryDriver {
    namespace: String,
}

#[async_trait]
impl Driver for MemoryDriver {
    async fn create(&self, key: &str, record: Record) -> Result<(), Error> {
        let mut store = MEMORY.lock().expect("memory store lock");
        let scoped = format!("{}/{}", self.namespace, key);
        if store.contains_key(&scoped) {
            return Err(Error::AlreadyExists(key.to_string()));
        }
        store.insert(scoped, record.payload);
        Ok(())
    }
}

/// Test hooks for the in-process backend.
#[doc(hidden)]
pub mod memory {
    use std::collections::BTreeMap;

    pub fn clear(namespace: &str) {
        let prefix = format!("{namespace}/");
        super::MEMORY
            .lock()
            .expect("memory store lock")
            .retain(|key, _| !key.starts_with(&prefix));
    }

    /// Record name to payload, for one namespace.
    pub fn snapshot(namespace: &str) -> BTreeMap<String, String> {
        let prefix = format!("{namespace}/");
        super::MEMORY
            .lock()
            .expect("memory store lock")
            .iter()
            .filter_map(|(key, payload)| {
                key.strip_prefix(&prefix)
                    .map(|name| (name.to_string(), payload.clone()))
            })
            .collect()
    }
}

/// Inverse of `encode_release`, for tests that inspect stored payloads.
#[cfg(test)]
pub(crate) fn decode_record(payload: &str) -> Release {
    use std::io::Read;

    let compressed = STANDARD.decode(payload).expect("payload is base64");
    let mut json = Vec::new();
    flate2::read::GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .expect("payload is gzip");
    serde_json::from_slice(&json).expect("payload is a v3 release")
}
