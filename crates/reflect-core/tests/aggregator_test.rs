#![allow(clippy::unwrap_used)]
// End-to-end tests for `ReflectAggregator` against a mocked Reflect API.
//
// The refresh engine runs on its real 500 ms tick; tests wait on the
// store's refresh stamp instead of sleeping fixed durations.

use std::collections::HashSet;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio::time::timeout;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reflect_core::{AggregatorConfig, CoreError, ReflectAggregator, RefreshState};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer) -> AggregatorConfig {
    AggregatorConfig {
        base_url: Url::parse(&server.uri()).unwrap(),
        api_token: SecretString::from("57cfe39c35d7df9f".to_string()),
        ..AggregatorConfig::default()
    }
}

async fn mount_systems(server: &MockServer) {
    let body = json!([
        {
            "id": 9468,
            "code": "3-440F59FA6034C59670FF3C0928929607",
            "name": "AVISPL Test Core110f",
            "status": {
                "message": "Running",
                "details": { "items": { "normal": 15, "warning": 0, "fault": 0, "unknown": 0 } }
            },
            "design": {
                "name": "CeeSalt_TestCore_v3.1",
                "platform": "Core 110f",
                "uptime": 1_600_000_000_000_i64
            },
            "core": { "name": "CeeSalt-Core110f" }
        },
        {
            "id": 10028,
            "code": "3-06AC3AB31F07DD0118B29EE65183499E",
            "name": "Base Classroom Updated v7",
            "status": {
                "message": "Running",
                "details": { "items": { "normal": 8, "warning": 0, "fault": 2, "unknown": 0 } }
            },
            "design": {
                "name": "Base Classroom Updated v7",
                "platform": "NV-32-H (Core Mode)",
                "uptime": 1_600_000_000_000_i64
            },
            "core": { "name": "nv-32-h-e159" }
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/public/v0/systems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

async fn mount_cores(server: &MockServer) {
    let body = json!([
        {
            "id": 11928,
            "serial": "3-440F59FA6034C59670FF3C0928929607",
            "name": "CeeSalt-Core110f",
            "model": "Core 110f",
            "firmware": "9.2.1-2110.001",
            "site": { "id": 830, "name": "AVI-SPL-LAB" },
            "status": { "message": "Running" },
            "uptime": 1_600_000_000_i64
        },
        {
            "id": 12000,
            "serial": "3-AC32AA07A6C4E22F526A88C3A5B0D217",
            "name": "nv-32-h-e159",
            "model": "NV-32-H (Core Mode)",
            "firmware": "9.2.1-2110.001",
            "site": { "id": 829, "name": "Schaumburg Office" },
            "status": { "message": "Running" },
            "uptime": 1_600_000_000_i64
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/public/v0/cores"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

async fn mount_items(server: &MockServer) {
    let first = json!([
        {
            "id": 20001,
            "serial": "sn-ptz-1",
            "name": "Lab-Camera-01",
            "model": "PTZ-12x72",
            "type": "Camera",
            "firmware": "1.4.0",
            "site": { "id": 830, "name": "AVI-SPL-LAB" },
            "status": { "message": "OK" }
        },
        {
            "id": 20002,
            "serial": "sn-avs-1",
            "name": "Lab-Source-01",
            "model": "Generic AV Source",
            "type": "AV Source",
            "firmware": "1.4.0",
            "site": { "id": 830, "name": "AVI-SPL-LAB" },
            "status": { "message": "Not Present" }
        }
    ]);
    let second = json!([
        {
            "id": 20003,
            "serial": "sn-tsc-1",
            "name": "Classroom-Panel-01",
            "model": "TSC-116-G2",
            "type": "Touch Screen",
            "firmware": "2.0.1",
            "site": { "id": 829, "name": "Schaumburg Office" },
            "status": { "message": "Running" }
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/public/v0/systems/9468/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&first))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/public/v0/systems/10028/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&second))
        .mount(server)
        .await;
}

/// Trigger the engine via a first device call, then wait for one full
/// collection cycle to land.
async fn run_one_cycle(aggregator: &ReflectAggregator) {
    let mut refreshed = aggregator.store().subscribe_refresh();
    aggregator.get_devices(None).unwrap();
    timeout(Duration::from_secs(10), refreshed.wait_for(Option::is_some))
        .await
        .expect("refresh cycle did not complete in time")
        .expect("refresh channel closed");
}

// ── Full-cycle scenario ─────────────────────────────────────────────

#[tokio::test]
async fn full_cycle_populates_summary_and_devices() {
    let server = MockServer::start().await;
    mount_systems(&server).await;
    mount_cores(&server).await;
    mount_items(&server).await;

    let aggregator = ReflectAggregator::new(config_for(&server));
    run_one_cycle(&aggregator).await;

    // Summary: every §6 metric for both systems, nothing else.
    let summary = aggregator.get_summary().unwrap();
    let mut keys: Vec<&str> = summary.keys().map(String::as_str).collect();
    keys.sort_unstable();

    let mut expected: Vec<String> = Vec::new();
    for name in ["AVISPL Test Core110f", "Base Classroom Updated v7"] {
        for metric in [
            "SystemId",
            "SystemCode",
            "SystemStatus",
            "AlertsNormal",
            "AlertsWarning",
            "AlertsFault",
            "AlertsUnknown",
            "DesignName",
            "DesignPlatform",
            "Uptime",
            "CoreName",
            "Model",
        ] {
            expected.push(format!("{name}#{metric}"));
        }
    }
    let mut expected: Vec<&str> = expected.iter().map(String::as_str).collect();
    expected.sort_unstable();
    assert_eq!(keys, expected);

    assert_eq!(summary["AVISPL Test Core110f#SystemId"], "9468");
    assert_eq!(summary["AVISPL Test Core110f#AlertsNormal"], "15");
    assert_eq!(summary["AVISPL Test Core110f#Model"], "Core 110f");
    assert_eq!(summary["Base Classroom Updated v7#AlertsFault"], "2");
    assert_eq!(
        summary["Base Classroom Updated v7#Model"],
        "NV-32-H (Core Mode)"
    );

    // Devices: 2 cores + 3 items, statuses from the side table, cores
    // annotated with the synthetic type.
    let devices = aggregator.get_devices(None).unwrap();
    assert_eq!(devices.len(), 5);

    let core = devices.iter().find(|d| d.id == "11928").unwrap();
    assert_eq!(core.device_type(), Some("Core"));
    assert_eq!(core.status_message(), Some("Running"));
    assert!(core.online);
    // Raw started-at uptime was normalized to the human-readable form.
    assert!(core.properties["deviceUptime"].contains("day(s)"));
    assert!(!core.properties.contains_key("deviceUptimeStartedAt"));

    let camera = devices.iter().find(|d| d.id == "20001").unwrap();
    assert_eq!(camera.device_type(), Some("Camera"));
    assert_eq!(camera.status_message(), Some("OK"));
    assert!(!camera.online);
}

#[tokio::test]
async fn id_filter_restricts_the_snapshot() {
    let server = MockServer::start().await;
    mount_systems(&server).await;
    mount_cores(&server).await;
    mount_items(&server).await;

    let aggregator = ReflectAggregator::new(config_for(&server));
    run_one_cycle(&aggregator).await;

    let ids: HashSet<String> = ["11928".to_owned(), "20003".to_owned()].into();
    let devices = aggregator.get_devices(Some(&ids)).unwrap();

    let mut got: Vec<&str> = devices.iter().map(|d| d.id.as_str()).collect();
    got.sort_unstable();
    assert_eq!(got, ["11928", "20003"]);

    let unknown: HashSet<String> = ["94400".to_owned()].into();
    assert!(aggregator.get_devices(Some(&unknown)).unwrap().is_empty());
}

// ── Filters ─────────────────────────────────────────────────────────

#[tokio::test]
async fn device_filters_shape_the_snapshot() {
    let server = MockServer::start().await;
    mount_systems(&server).await;
    mount_cores(&server).await;
    mount_items(&server).await;

    let aggregator = ReflectAggregator::new(AggregatorConfig {
        filter_type: "Camera,Touch Screen".into(),
        ..config_for(&server)
    });
    run_one_cycle(&aggregator).await;

    let devices = aggregator.get_devices(None).unwrap();
    let mut got: Vec<&str> = devices.iter().map(|d| d.id.as_str()).collect();
    got.sort_unstable();
    assert_eq!(got, ["20001", "20003"]);
}

#[tokio::test]
async fn zero_match_system_filter_empties_devices_without_error() {
    let server = MockServer::start().await;
    mount_systems(&server).await;
    mount_cores(&server).await;
    mount_items(&server).await;

    let aggregator = ReflectAggregator::new(AggregatorConfig {
        filter_system_name: "No Such System".into(),
        ..config_for(&server)
    });
    run_one_cycle(&aggregator).await;

    let devices = aggregator.get_devices(None).unwrap();
    assert!(devices.is_empty());

    // No detail fetch was issued for any system.
    let requests = server.received_requests().await.unwrap();
    assert!(
        requests
            .iter()
            .all(|r| !r.url.path().ends_with("/items"))
    );
}

// ── Pause fail-safe ─────────────────────────────────────────────────

#[tokio::test]
async fn paused_engine_issues_zero_network_calls() {
    let server = MockServer::start().await;
    mount_systems(&server).await;
    mount_cores(&server).await;
    mount_items(&server).await;

    let aggregator = ReflectAggregator::new(config_for(&server));
    aggregator.start().unwrap();

    // Several ticks pass without any consumer liveness signal.
    tokio::time::sleep(Duration::from_millis(1800)).await;

    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(aggregator.refresh_state(), RefreshState::Paused);

    aggregator.stop().await;
    assert_eq!(aggregator.refresh_state(), RefreshState::Stopped);
}

// ── Error surfacing ─────────────────────────────────────────────────

#[tokio::test]
async fn background_errors_surface_once_then_clear() {
    let server = MockServer::start().await;
    mount_systems(&server).await;
    mount_items(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/public/v0/cores"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let aggregator = ReflectAggregator::new(config_for(&server));
    run_one_cycle(&aggregator).await;

    // First consumer call after the failing cycle: one batched error.
    let err = aggregator.get_devices(None).unwrap_err();
    match err {
        CoreError::Unreachable { message } => {
            assert!(message.contains("Device list retrieval failed"));
            assert_eq!(message.lines().count(), 1, "duplicates must collapse");
        }
        other => panic!("expected Unreachable, got: {other:?}"),
    }

    // Next call with no new failures: success again.
    assert!(aggregator.get_devices(None).is_ok());

    // The summary path is unaffected: systems fetched cleanly.
    assert!(aggregator.get_summary().is_ok());
}

#[tokio::test]
async fn system_errors_surface_on_summary_not_devices() {
    let server = MockServer::start().await;
    mount_cores(&server).await;
    mount_items(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/public/v0/systems"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let aggregator = ReflectAggregator::new(config_for(&server));
    run_one_cycle(&aggregator).await;

    let err = aggregator.get_summary().unwrap_err();
    match err {
        CoreError::Unreachable { message } => {
            assert!(message.contains("System information retrieval failed"));
        }
        other => panic!("expected Unreachable, got: {other:?}"),
    }
    assert!(aggregator.get_summary().is_ok());
}

// ── Configuration errors ────────────────────────────────────────────

#[tokio::test]
async fn empty_token_fails_synchronously_without_network() {
    let server = MockServer::start().await;

    let aggregator = ReflectAggregator::new(AggregatorConfig {
        base_url: Url::parse(&server.uri()).unwrap(),
        api_token: SecretString::from(String::new()),
        ..AggregatorConfig::default()
    });

    assert!(matches!(
        aggregator.get_summary(),
        Err(CoreError::Configuration { .. })
    ));
    assert!(matches!(
        aggregator.get_devices(None),
        Err(CoreError::Configuration { .. })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn stop_clears_state_and_get_devices_restarts_lazily() {
    let server = MockServer::start().await;
    mount_systems(&server).await;
    mount_cores(&server).await;
    mount_items(&server).await;

    let aggregator = ReflectAggregator::new(config_for(&server));
    run_one_cycle(&aggregator).await;
    assert_eq!(aggregator.get_devices(None).unwrap().len(), 5);

    aggregator.stop().await;
    assert!(aggregator.store().devices_is_empty());
    assert!(aggregator.store().last_refresh().is_none());

    // A later consumer call restarts the engine and a fresh cycle
    // repopulates the cache.
    let mut refreshed = aggregator.store().subscribe_refresh();
    assert!(aggregator.get_devices(None).unwrap().is_empty());
    timeout(Duration::from_secs(10), refreshed.wait_for(Option::is_some))
        .await
        .expect("restarted engine did not refresh")
        .expect("refresh channel closed");

    assert_eq!(aggregator.get_devices(None).unwrap().len(), 5);
    aggregator.stop().await;
}
