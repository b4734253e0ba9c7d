//! The schema mapper: one v2 release record in, one v3 release record out.
//! Pure and side-effect free; storage happens elsewhere.

use chrono::{DateTime, Utc};
use hapi::release::{HookDeletePolicy, HookEvent, StatusCode, TestRunStatus};

use super::release::{
    Chart, File, Hook, Info, Maintainer, Metadata, Release, TestRun, TestSuite, Values,
};
use crate::errors::Error;

/// Real charts nest a handful of levels; exceeding this means the dependency
/// tree is cyclic or corrupt.
const MAX_CHART_DEPTH: usize = 100;

pub fn convert_release(v2: &hapi::Release) -> Result<Release, Error> {
    let (Some(v2_chart), Some(info)) = (v2.chart.as_ref(), v2.info.as_ref()) else {
        return Err(Error::MalformedRelease);
    };
    let status = info.status.as_ref().ok_or(Error::MalformedRelease)?;
    Ok(Release {
        name: v2.name.clone(),
        namespace: v2.namespace.clone(),
        chart: convert_chart(v2_chart, 0)?,
        config: convert_values(v2.config.as_ref())?,
        info: Info {
            first_deployed: convert_timestamp(info.first_deployed.as_ref())?,
            last_deployed: convert_timestamp(info.last_deployed.as_ref())?,
            deleted: convert_timestamp(info.deleted.as_ref())?,
            description: info.description.clone(),
            status: status_name(status.code)?,
            notes: status.notes.clone(),
            resources: status.resources.clone(),
            last_test_suite_run: status
                .last_test_suite_run
                .as_ref()
                .map(convert_test_suite)
                .transpose()?,
        },
        manifest: v2.manifest.clone(),
        hooks: convert_hooks(&v2.hooks)?,
        version: i64::from(v2.version),
    })
}

fn convert_chart(v2: &hapi::Chart, depth: usize) -> Result<Chart, Error> {
    if depth >= MAX_CHART_DEPTH {
        return Err(Error::ChartDepthExceeded(MAX_CHART_DEPTH));
    }
    let mut chart = Chart {
        metadata: v2.metadata.as_ref().map(convert_metadata),
        templates: v2
            .templates
            .iter()
            .map(|template| File { name: template.name.clone(), data: template.data.clone() })
            .collect(),
        values: convert_values(v2.values.as_ref())?,
        // a v2 chart file's path travels in the Any type-url
        files: v2
            .files
            .iter()
            .map(|file| File { name: file.type_url.clone(), data: file.value.clone() })
            .collect(),
        dependencies: Vec::new(),
    };
    for dependency in &v2.dependencies {
        chart.add_dependency(convert_chart(dependency, depth + 1)?);
    }
    Ok(chart)
}

fn convert_metadata(v2: &hapi::Metadata) -> Metadata {
    Metadata {
        name: v2.name.clone(),
        home: v2.home.clone(),
        sources: v2.sources.clone(),
        version: v2.version.clone(),
        description: v2.description.clone(),
        keywords: v2.keywords.clone(),
        maintainers: v2
            .maintainers
            .iter()
            .map(|maintainer| Maintainer {
                name: maintainer.name.clone(),
                email: maintainer.email.clone(),
                url: maintainer.url.clone(),
            })
            .collect(),
        icon: v2.icon.clone(),
        api_version: v2.api_version.clone(),
        condition: v2.condition.clone(),
        tags: v2.tags.clone(),
        app_version: v2.app_version.clone(),
        deprecated: v2.deprecated,
        annotations: v2.annotations.clone(),
        kube_version: v2.kube_version.clone(),
        // v2 has no chart type concept; every migrated chart is an application
        chart_type: "application".to_string(),
    }
    // v2 `engine` and `tiller_version` have no v3 counterpart and are
    // dropped; metadata dependency references stay unset, the chart tree
    // carries the structure.
}

/// Nil config stays nil; an empty raw document is an empty map; anything
/// else must parse as a YAML mapping.
fn convert_values(config: Option<&hapi::Config>) -> Result<Option<Values>, Error> {
    let Some(config) = config else {
        return Ok(None);
    };
    if config.raw.trim().is_empty() {
        return Ok(Some(Values::new()));
    }
    Ok(Some(serde_yaml::from_str(&config.raw)?))
}

/// Absent and zero-valued wire timestamps both collapse to the zero instant.
fn convert_timestamp(timestamp: Option<&prost_types::Timestamp>) -> Result<DateTime<Utc>, Error> {
    let Some(ts) = timestamp else {
        return Ok(DateTime::UNIX_EPOCH);
    };
    if ts.seconds == 0 && ts.nanos == 0 {
        return Ok(DateTime::UNIX_EPOCH);
    }
    u32::try_from(ts.nanos)
        .ok()
        .and_then(|nanos| DateTime::from_timestamp(ts.seconds, nanos))
        .ok_or(Error::Timestamp(ts.seconds, ts.nanos))
}

fn convert_hooks(v2: &[hapi::Hook]) -> Result<Vec<Hook>, Error> {
    v2.iter()
        .map(|hook| {
            Ok(Hook {
                name: hook.name.clone(),
                kind: hook.kind.clone(),
                path: hook.path.clone(),
                manifest: hook.manifest.clone(),
                events: hook
                    .events
                    .iter()
                    .map(|&code| {
                        enum_lower(code, HookEvent::as_str_name)
                            .ok_or(Error::HookEventUnknown(code))
                    })
                    .collect::<Result<_, _>>()?,
                last_run: convert_timestamp(hook.last_run.as_ref())?,
                weight: i64::from(hook.weight),
                delete_policies: hook
                    .delete_policies
                    .iter()
                    .map(|&code| {
                        enum_lower(code, HookDeletePolicy::as_str_name)
                            .ok_or(Error::DeletePolicyUnknown(code))
                    })
                    .collect::<Result<_, _>>()?,
            })
        })
        .collect()
}

fn convert_test_suite(v2: &hapi::TestSuite) -> Result<TestSuite, Error> {
    Ok(TestSuite {
        started_at: convert_timestamp(v2.started_at.as_ref())?,
        completed_at: convert_timestamp(v2.completed_at.as_ref())?,
        results: v2
            .results
            .iter()
            .map(|run| {
                Ok(TestRun {
                    name: run.name.clone(),
                    status: enum_lower(run.status, TestRunStatus::as_str_name)
                        .ok_or(Error::TestStatusUnknown(run.status))?,
                    info: run.info.clone(),
                    started_at: convert_timestamp(run.started_at.as_ref())?,
                    completed_at: convert_timestamp(run.completed_at.as_ref())?,
                })
            })
            .collect::<Result<_, Error>>()?,
    })
}

fn status_name(code: i32) -> Result<String, Error> {
    enum_lower(code, StatusCode::as_str_name).ok_or(Error::StatusUnknown(code))
}

/// Closed-enumeration translation shared by status, hook and test-run
/// mappings: decode the wire code against the schema table, lowercase the
/// schema name.
fn enum_lower<E, F>(code: i32, name: F) -> Option<String>
where
    E: TryFrom<i32>,
    F: Fn(&E) -> &'static str,
{
    E::try_from(code).ok().map(|value| name(&value).to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v2_chart(name: &str) -> hapi::Chart {
        hapi::Chart {
            metadata: Some(hapi::Metadata {
                name: name.into(),
                version: "0.1.0".into(),
                api_version: "v1".into(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn v2_release() -> hapi::Release {
        hapi::Release {
            name: "my-rel".into(),
            namespace: "team-a".into(),
            version: 7,
            manifest: "---\nkind: Service\n".into(),
            chart: Some(v2_chart("c")),
            config: Some(hapi::Config { raw: "a: 1\n".into(), ..Default::default() }),
            info: Some(hapi::Info {
                status: Some(hapi::Status {
                    code: StatusCode::Deployed as i32,
                    notes: "done".into(),
                    resources: "==> v1/Service".into(),
                    ..Default::default()
                }),
                first_deployed: Some(prost_types::Timestamp { seconds: 1_575_000_000, nanos: 42 }),
                last_deployed: Some(prost_types::Timestamp { seconds: 1_575_000_100, nanos: 0 }),
                deleted: Some(prost_types::Timestamp { seconds: 0, nanos: 0 }),
                description: "Install complete".into(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn maps_identity_fields_and_status() {
        let v3 = convert_release(&v2_release()).unwrap();
        assert_eq!(v3.name, "my-rel");
        assert_eq!(v3.namespace, "team-a");
        assert_eq!(v3.version, 7);
        assert_eq!(v3.info.status, "deployed");
        assert_eq!(v3.info.notes, "done");
        assert_eq!(v3.info.resources, "==> v1/Service");
        assert_eq!(v3.manifest, "---\nkind: Service\n");
        assert!(v3.info.last_test_suite_run.is_none());
    }

    #[test]
    fn maps_every_status_code_to_its_lowercase_name() {
        for (code, expected) in [
            (0, "unknown"),
            (1, "deployed"),
            (2, "deleted"),
            (3, "superseded"),
            (4, "failed"),
            (5, "deleting"),
            (6, "pending_install"),
            (7, "pending_upgrade"),
            (8, "pending_rollback"),
        ] {
            assert_eq!(status_name(code).unwrap(), expected);
        }
    }

    #[test]
    fn rejects_missing_chart_or_info() {
        let mut no_chart = v2_release();
        no_chart.chart = None;
        assert!(matches!(convert_release(&no_chart), Err(Error::MalformedRelease)));

        let mut no_info = v2_release();
        no_info.info = None;
        assert!(matches!(convert_release(&no_info), Err(Error::MalformedRelease)));
    }

    #[test]
    fn rejects_unknown_status_code() {
        let mut release = v2_release();
        release.info.as_mut().unwrap().status.as_mut().unwrap().code = 999;
        assert!(matches!(convert_release(&release), Err(Error::StatusUnknown(999))));
    }

    #[test]
    fn chart_gains_application_type_and_keeps_maintainers() {
        let mut release = v2_release();
        release.chart.as_mut().unwrap().metadata.as_mut().unwrap().maintainers =
            vec![hapi::Maintainer {
                name: "jane".into(),
                email: "jane@example.com".into(),
                url: "https://example.com".into(),
            }];
        let v3 = convert_release(&release).unwrap();
        let metadata = v3.chart.metadata.unwrap();
        assert_eq!(metadata.chart_type, "application");
        assert_eq!(metadata.maintainers[0].url, "https://example.com");
        assert_eq!(metadata.api_version, "v1");
    }

    #[test]
    fn chart_dependencies_recurse_preserving_names() {
        let mut release = v2_release();
        let mut child = v2_chart("child");
        child.dependencies.push(v2_chart("grandchild"));
        let chart = release.chart.as_mut().unwrap();
        chart.dependencies.push(child);
        chart.dependencies.push(v2_chart("sibling"));

        let v3 = convert_release(&release).unwrap();
        assert_eq!(v3.chart.dependencies.len(), 2);
        let names: Vec<_> = v3
            .chart
            .dependencies
            .iter()
            .map(|dep| dep.metadata.as_ref().unwrap().name.clone())
            .collect();
        assert_eq!(names, ["child", "sibling"]);
        assert_eq!(
            v3.chart.dependencies[0].dependencies[0].metadata.as_ref().unwrap().name,
            "grandchild"
        );
    }

    #[test]
    fn cyclic_depth_is_bounded() {
        let mut chart = v2_chart("leaf");
        for _ in 0..=MAX_CHART_DEPTH {
            let mut parent = v2_chart("wrap");
            parent.dependencies.push(chart);
            chart = parent;
        }
        let mut release = v2_release();
        release.chart = Some(chart);
        assert!(matches!(convert_release(&release), Err(Error::ChartDepthExceeded(_))));
    }

    #[test]
    fn templates_and_files_collapse_to_file_entries() {
        let mut release = v2_release();
        let chart = release.chart.as_mut().unwrap();
        chart.templates.push(hapi::Template {
            name: "templates/deploy.yaml".into(),
            data: b"kind: Deployment".to_vec(),
        });
        chart.files.push(prost_types::Any {
            type_url: "README.md".into(),
            value: b"docs".to_vec(),
        });
        let v3 = convert_release(&release).unwrap();
        assert_eq!(v3.chart.templates[0].name, "templates/deploy.yaml");
        assert_eq!(v3.chart.templates[0].data, b"kind: Deployment");
        assert_eq!(v3.chart.files[0].name, "README.md");
        assert_eq!(v3.chart.files[0].data, b"docs");
    }

    #[test]
    fn values_parse_and_nil_config_stays_nil() {
        let v3 = convert_release(&v2_release()).unwrap();
        let config = v3.config.unwrap();
        assert_eq!(config.get("a"), Some(&serde_yaml::Value::from(1)));

        let mut no_config = v2_release();
        no_config.config = None;
        assert!(convert_release(&no_config).unwrap().config.is_none());

        let mut empty_raw = v2_release();
        empty_raw.config = Some(hapi::Config::default());
        assert_eq!(convert_release(&empty_raw).unwrap().config, Some(Values::new()));

        let mut bad = v2_release();
        bad.config = Some(hapi::Config { raw: "a: [unclosed".into(), ..Default::default() });
        assert!(matches!(convert_release(&bad), Err(Error::ConfigParse(_))));
    }

    #[test]
    fn timestamps_convert_with_nanosecond_precision() {
        let v3 = convert_release(&v2_release()).unwrap();
        assert_eq!(v3.info.first_deployed.timestamp(), 1_575_000_000);
        assert_eq!(v3.info.first_deployed.timestamp_subsec_nanos(), 42);
        // zero-valued wire timestamp collapses to the zero instant
        assert_eq!(v3.info.deleted, DateTime::UNIX_EPOCH);

        assert_eq!(convert_timestamp(None).unwrap(), DateTime::UNIX_EPOCH);
        let out_of_range = prost_types::Timestamp { seconds: i64::MAX, nanos: 0 };
        assert!(matches!(
            convert_timestamp(Some(&out_of_range)),
            Err(Error::Timestamp(_, _))
        ));
        let negative_nanos = prost_types::Timestamp { seconds: 10, nanos: -1 };
        assert!(matches!(
            convert_timestamp(Some(&negative_nanos)),
            Err(Error::Timestamp(10, -1))
        ));
    }

    #[test]
    fn hooks_map_enums_and_widen_weight() {
        let mut release = v2_release();
        release.hooks.push(hapi::Hook {
            name: "pre".into(),
            kind: "Job".into(),
            path: "templates/hook.yaml".into(),
            manifest: "kind: Job".into(),
            events: vec![HookEvent::PreInstall as i32, HookEvent::PostUpgrade as i32],
            weight: -5,
            delete_policies: vec![HookDeletePolicy::BeforeHookCreation as i32],
            last_run: Some(prost_types::Timestamp { seconds: 1_575_000_050, nanos: 0 }),
        });
        let v3 = convert_release(&release).unwrap();
        let hook = &v3.hooks[0];
        assert_eq!(hook.events, ["pre_install", "post_upgrade"]);
        assert_eq!(hook.delete_policies, ["before_hook_creation"]);
        assert_eq!(hook.weight, -5i64);
        assert_eq!(hook.last_run.timestamp(), 1_575_000_050);

        release.hooks[0].events.push(42);
        assert!(matches!(convert_release(&release), Err(Error::HookEventUnknown(42))));
    }

    #[test]
    fn test_suite_maps_runs_and_statuses() {
        let mut release = v2_release();
        release.info.as_mut().unwrap().status.as_mut().unwrap().last_test_suite_run =
            Some(hapi::TestSuite {
                started_at: Some(prost_types::Timestamp { seconds: 1_575_000_200, nanos: 0 }),
                completed_at: Some(prost_types::Timestamp { seconds: 1_575_000_260, nanos: 0 }),
                results: vec![hapi::TestRun {
                    name: "smoke".into(),
                    status: hapi::release::TestRunStatus::Success as i32,
                    info: "ok".into(),
                    started_at: Some(prost_types::Timestamp { seconds: 1_575_000_210, nanos: 0 }),
                    completed_at: Some(prost_types::Timestamp { seconds: 1_575_000_220, nanos: 0 }),
                }],
            });
        let v3 = convert_release(&release).unwrap();
        let suite = v3.info.last_test_suite_run.unwrap();
        assert_eq!(suite.results[0].status, "success");
        assert_eq!(suite.results[0].name, "smoke");

        let mut bad = release.clone();
        bad.info
            .as_mut()
            .unwrap()
            .status
            .as_mut()
            .unwrap()
            .last_test_suite_run
            .as_mut()
            .unwrap()
            .results[0]
            .status = 9;
        assert!(matches!(convert_release(&bad), Err(Error::TestStatusUnknown(9))));
    }
}
