//! `hapi.release`: one persisted snapshot of a deployed release.

use prost::{Enumeration, Message};

use crate::chart::{Chart, Config};

#[derive(Clone, PartialEq, Message)]
pub struct Release {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub info: Option<Info>,
    #[prost(message, optional, tag = "3")]
    pub chart: Option<Chart>,
    /// Values override supplied for this release version.
    #[prost(message, optional, tag = "4")]
    pub config: Option<Config>,
    #[prost(string, tag = "5")]
    pub manifest: String,
    #[prost(message, repeated, tag = "6")]
    pub hooks: Vec<Hook>,
    /// Monotonically increasing per release, starting at 1.
    #[prost(int32, tag = "7")]
    pub version: i32,
    #[prost(string, tag = "8")]
    pub namespace: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Info {
    #[prost(message, optional, tag = "1")]
    pub status: Option<Status>,
    #[prost(message, optional, tag = "2")]
    pub first_deployed: Option<prost_types::Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub last_deployed: Option<prost_types::Timestamp>,
    /// Zero-valued when the release was never deleted.
    #[prost(message, optional, tag = "4")]
    pub deleted: Option<prost_types::Timestamp>,
    #[prost(string, tag = "5")]
    pub description: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Status {
    #[prost(enumeration = "StatusCode", tag = "1")]
    pub code: i32,
    // tag 2 was `details` (google.protobuf.Any), retired upstream.
    #[prost(string, tag = "3")]
    pub resources: String,
    #[prost(string, tag = "4")]
    pub notes: String,
    #[prost(message, optional, tag = "5")]
    pub last_test_suite_run: Option<TestSuite>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum StatusCode {
    Unknown = 0,
    Deployed = 1,
    Deleted = 2,
    Superseded = 3,
    Failed = 4,
    Deleting = 5,
    PendingInstall = 6,
    PendingUpgrade = 7,
    PendingRollback = 8,
}

impl StatusCode {
    /// Schema name of the code, as spelled in the wire enumeration table.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::Deployed => "DEPLOYED",
            StatusCode::Deleted => "DELETED",
            StatusCode::Superseded => "SUPERSEDED",
            StatusCode::Failed => "FAILED",
            StatusCode::Deleting => "DELETING",
            StatusCode::PendingInstall => "PENDING_INSTALL",
            StatusCode::PendingUpgrade => "PENDING_UPGRADE",
            StatusCode::PendingRollback => "PENDING_ROLLBACK",
        }
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct Hook {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub kind: String,
    #[prost(string, tag = "3")]
    pub path: String,
    #[prost(string, tag = "4")]
    pub manifest: String,
    #[prost(enumeration = "HookEvent", repeated, tag = "5")]
    pub events: Vec<i32>,
    #[prost(message, optional, tag = "6")]
    pub last_run: Option<prost_types::Timestamp>,
    #[prost(int32, tag = "7")]
    pub weight: i32,
    #[prost(enumeration = "HookDeletePolicy", repeated, tag = "8")]
    pub delete_policies: Vec<i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum HookEvent {
    Unknown = 0,
    PreInstall = 1,
    PostInstall = 2,
    PreDelete = 3,
    PostDelete = 4,
    PreUpgrade = 5,
    PostUpgrade = 6,
    PreRollback = 7,
    PostRollback = 8,
    ReleaseTestSuccess = 9,
    ReleaseTestFailure = 10,
}

impl HookEvent {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            HookEvent::Unknown => "UNKNOWN",
            HookEvent::PreInstall => "PRE_INSTALL",
            HookEvent::PostInstall => "POST_INSTALL",
            HookEvent::PreDelete => "PRE_DELETE",
            HookEvent::PostDelete => "POST_DELETE",
            HookEvent::PreUpgrade => "PRE_UPGRADE",
            HookEvent::PostUpgrade => "POST_UPGRADE",
            HookEvent::PreRollback => "PRE_ROLLBACK",
            HookEvent::PostRollback => "POST_ROLLBACK",
            HookEvent::ReleaseTestSuccess => "RELEASE_TEST_SUCCESS",
            HookEvent::ReleaseTestFailure => "RELEASE_TEST_FAILURE",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum HookDeletePolicy {
    Succeeded = 0,
    Failed = 1,
    BeforeHookCreation = 2,
}

impl HookDeletePolicy {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            HookDeletePolicy::Succeeded => "SUCCEEDED",
            HookDeletePolicy::Failed => "FAILED",
            HookDeletePolicy::BeforeHookCreation => "BEFORE_HOOK_CREATION",
        }
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct TestSuite {
    #[prost(message, optional, tag = "1")]
    pub started_at: Option<prost_types::Timestamp>,
    #[prost(message, optional, tag = "2")]
    pub completed_at: Option<prost_types::Timestamp>,
    #[prost(message, repeated, tag = "3")]
    pub results: Vec<TestRun>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TestRun {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "TestRunStatus", tag = "2")]
    pub status: i32,
    #[prost(string, tag = "3")]
    pub info: String,
    #[prost(message, optional, tag = "4")]
    pub started_at: Option<prost_types::Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub completed_at: Option<prost_types::Timestamp>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum TestRunStatus {
    Unknown = 0,
    Success = 1,
    Failure = 2,
    Running = 3,
}

impl TestRunStatus {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            TestRunStatus::Unknown => "UNKNOWN",
            TestRunStatus::Success => "SUCCESS",
            TestRunStatus::Failure => "FAILURE",
            TestRunStatus::Running => "RUNNING",
        }
    }
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;
    use crate::chart::{Maintainer, Metadata, Template};

    fn sample_release() -> Release {
        Release {
            name: "wordpress".into(),
            namespace: "default".into(),
            version: 3,
            manifest: "---\nkind: Service\n".into(),
            info: Some(Info {
                status: Some(Status {
                    code: StatusCode::Deployed as i32,
                    notes: "enjoy".into(),
                    ..Default::default()
                }),
                first_deployed: Some(prost_types::Timestamp { seconds: 1_575_000_000, nanos: 42 }),
                last_deployed: Some(prost_types::Timestamp { seconds: 1_575_000_100, nanos: 0 }),
                deleted: None,
                description: "Upgrade complete".into(),
            }),
            chart: Some(Chart {
                metadata: Some(Metadata {
                    name: "wordpress".into(),
                    version: "5.1.2".into(),
                    api_version: "v1".into(),
                    maintainers: vec![Maintainer {
                        name: "jane".into(),
                        email: "jane@example.com".into(),
                        url: "https://example.com".into(),
                    }],
                    ..Default::default()
                }),
                templates: vec![Template { name: "templates/svc.yaml".into(), data: b"kind: Service".to_vec() }],
                ..Default::default()
            }),
            config: Some(Config { raw: "image: wp\n".into(), ..Default::default() }),
            hooks: vec![Hook {
                name: "pre".into(),
                kind: "Job".into(),
                events: vec![HookEvent::PreInstall as i32],
                weight: -5,
                delete_policies: vec![HookDeletePolicy::BeforeHookCreation as i32],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn release_roundtrips_through_wire_encoding() {
        let rel = sample_release();
        let bytes = rel.encode_to_vec();
        let back = Release::decode(bytes.as_slice()).unwrap();
        assert_eq!(back, rel);
        assert_eq!(back.info.unwrap().status.unwrap().code, 1);
        assert_eq!(back.chart.unwrap().metadata.unwrap().maintainers[0].url, "https://example.com");
    }

    #[test]
    fn status_code_table_matches_schema() {
        for (code, name) in [
            (0, "UNKNOWN"),
            (1, "DEPLOYED"),
            (2, "DELETED"),
            (3, "SUPERSEDED"),
            (4, "FAILED"),
            (5, "DELETING"),
            (6, "PENDING_INSTALL"),
            (7, "PENDING_UPGRADE"),
            (8, "PENDING_ROLLBACK"),
        ] {
            assert_eq!(StatusCode::try_from(code).unwrap().as_str_name(), name);
        }
        assert!(StatusCode::try_from(999).is_err());
    }

    #[test]
    fn hook_enums_cover_schema_range() {
        assert_eq!(HookEvent::try_from(10).unwrap().as_str_name(), "RELEASE_TEST_FAILURE");
        assert_eq!(HookDeletePolicy::try_from(2).unwrap().as_str_name(), "BEFORE_HOOK_CREATION");
        assert_eq!(TestRunStatus::try_from(3).unwrap().as_str_name(), "RUNNING");
        assert!(HookEvent::try_from(11).is_err());
        assert!(HookDeletePolicy::try_from(3).is_err());
        assert!(TestRunStatus::try_from(4).is_err());
    }
}
