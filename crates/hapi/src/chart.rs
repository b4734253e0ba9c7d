//! `hapi.chart`: the package format embedded inside each release record.

use std::collections::HashMap;

use prost::{Enumeration, Message};

/// A chart is the package bundle rendered into a release. Dependencies are
/// embedded recursively as full child charts, not as metadata references.
#[derive(Clone, PartialEq, Message)]
pub struct Chart {
    #[prost(message, optional, tag = "1")]
    pub metadata: Option<Metadata>,
    #[prost(message, repeated, tag = "2")]
    pub templates: Vec<Template>,
    #[prost(message, repeated, tag = "3")]
    pub dependencies: Vec<Chart>,
    #[prost(message, optional, tag = "4")]
    pub values: Option<Config>,
    /// Miscellaneous chart files; the file path travels in `Any.type_url`.
    #[prost(message, repeated, tag = "5")]
    pub files: Vec<prost_types::Any>,
}

/// Raw values text plus an optional parsed override map. Only `raw` is
/// consulted when converting; the map is kept for wire fidelity.
#[derive(Clone, PartialEq, Message)]
pub struct Config {
    #[prost(string, tag = "1")]
    pub raw: String,
    #[prost(map = "string, message", tag = "2")]
    pub values: HashMap<String, Value>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Value {
    #[prost(string, tag = "1")]
    pub value: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Maintainer {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(string, tag = "3")]
    pub url: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Metadata {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub home: String,
    #[prost(string, repeated, tag = "3")]
    pub sources: Vec<String>,
    #[prost(string, tag = "4")]
    pub version: String,
    #[prost(string, tag = "5")]
    pub description: String,
    #[prost(string, repeated, tag = "6")]
    pub keywords: Vec<String>,
    #[prost(message, repeated, tag = "7")]
    pub maintainers: Vec<Maintainer>,
    /// Render engine; v2-only concept with no v3 counterpart.
    #[prost(enumeration = "Engine", tag = "8")]
    pub engine: i32,
    #[prost(string, tag = "9")]
    pub icon: String,
    #[prost(string, tag = "10")]
    pub api_version: String,
    #[prost(string, tag = "11")]
    pub condition: String,
    #[prost(string, tag = "12")]
    pub tags: String,
    #[prost(string, tag = "13")]
    pub app_version: String,
    #[prost(bool, tag = "14")]
    pub deprecated: bool,
    /// Tiller semver constraint; v2-only concept with no v3 counterpart.
    #[prost(string, tag = "15")]
    pub tiller_version: String,
    #[prost(map = "string, string", tag = "16")]
    pub annotations: HashMap<String, String>,
    #[prost(string, tag = "17")]
    pub kube_version: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum Engine {
    Unknown = 0,
    Gotpl = 1,
}

#[derive(Clone, PartialEq, Message)]
pub struct Template {
    /// Path relative to the chart root, e.g. `templates/deployment.yaml`.
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}
