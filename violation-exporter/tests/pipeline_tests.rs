//! End-to-end tests for the violation exporter
//!
//! Drive watch frames through the pipeline and scrape the result through the
//! HTTP router, without a cluster.
//!
//! Run with: cargo test --test pipeline_tests

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use k8s_openapi::api::core::v1::ObjectReference;
use k8s_openapi::api::events::v1::Event;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::WatchEvent;
use tower::ServiceExt;

use violation_exporter::kubernetes::events::admission_events;
use violation_exporter::metrics::ViolationRegistry;
use violation_exporter::server::router;
use violation_exporter::violations::ViolationPipeline;
use violation_exporter::{AppState, WatchStatus};

const DENIED_NOTE: &str = "Admission webhook \"validation.gatekeeper.sh\" denied request, Resource Namespace: shop, Constraint: must-have-owner, Message: All deployments must have an `owner` label";

fn gatekeeper_event(reason: &str, kind: &str, name: &str, note: &str) -> Event {
    Event {
        metadata: ObjectMeta {
            namespace: Some("gatekeeper-system".to_string()),
            annotations: Some(BTreeMap::from([
                ("constraint_kind".to_string(), "K8sRequiredLabels".to_string()),
                ("constraint_name".to_string(), "must-have-owner".to_string()),
            ])),
            ..Default::default()
        },
        reason: Some(reason.to_string()),
        note: Some(note.to_string()),
        regarding: Some(ObjectReference {
            kind: Some(kind.to_string()),
            namespace: Some("shop".to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

async fn scrape(state: AppState, uri: &str) -> (StatusCode, String) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn violation_lines(exposition: &str) -> Vec<&str> {
    exposition
        .lines()
        .filter(|line| line.starts_with("violation{"))
        .collect()
}

#[tokio::test]
async fn test_repeated_violation_is_one_series() {
    let registry = Arc::new(ViolationRegistry::new().unwrap());
    let status = Arc::new(WatchStatus::new());
    let pipeline = ViolationPipeline::new(registry.clone());

    let frames = futures::stream::iter(vec![
        Ok(WatchEvent::Added(gatekeeper_event("FailedAdmission", "Deployment", "nginx", DENIED_NOTE))),
        Ok(WatchEvent::Modified(gatekeeper_event(
            "FailedAdmission",
            "Deployment",
            "nginx",
            &format!("(combined from similar events): {}", DENIED_NOTE),
        ))),
    ]);

    pipeline.run(admission_events(frames), &status).await;

    let (code, body) = scrape(AppState::new(registry, status), "/metrics").await;
    assert_eq!(code, StatusCode::OK);

    let lines = violation_lines(&body);
    assert_eq!(lines.len(), 1, "unexpected series: {:?}", lines);
    assert_eq!(
        lines[0],
        "violation{constraint_kind=\"K8sRequiredLabels\",constraint_name=\"must-have-owner\",kind=\"Deployment\",message=\"All deployments must have an `owner` label\",name=\"nginx\",namespace=\"shop\"} 1"
    );
}

#[tokio::test]
async fn test_only_relevant_events_produce_series() {
    let registry = Arc::new(ViolationRegistry::new().unwrap());
    let status = Arc::new(WatchStatus::new());
    let pipeline = ViolationPipeline::new(registry.clone());

    let frames = futures::stream::iter(vec![
        Ok(WatchEvent::Deleted(gatekeeper_event("FailedAdmission", "Pod", "deleted", DENIED_NOTE))),
        Ok(WatchEvent::Added(gatekeeper_event("Scheduled", "Pod", "scheduled", DENIED_NOTE))),
        Ok(WatchEvent::Added(gatekeeper_event(
            "DryrunViolation",
            "Namespace",
            "audit",
            "Dryrun violation, malformed segment, Message: namespace must have owner",
        ))),
    ]);

    pipeline.run(admission_events(frames), &status).await;

    let (_, body) = scrape(AppState::new(registry, status), "/metrics").await;
    let lines = violation_lines(&body);

    assert_eq!(lines.len(), 1, "unexpected series: {:?}", lines);
    assert!(lines[0].contains("name=\"audit\""));
    assert!(lines[0].contains("message=\"namespace must have owner\""));
    assert!(body.contains("violation_exporter_events_total{outcome=\"ignored\"} 2"));
}

#[tokio::test]
async fn test_event_without_annotations_uses_empty_labels() {
    let registry = Arc::new(ViolationRegistry::new().unwrap());
    let status = Arc::new(WatchStatus::new());
    let pipeline = ViolationPipeline::new(registry.clone());

    let bare = Event {
        reason: Some("FailedAdmission".to_string()),
        ..Default::default()
    };
    pipeline
        .run(admission_events(futures::stream::iter(vec![Ok(WatchEvent::Added(bare))])), &status)
        .await;

    let (_, body) = scrape(AppState::new(registry, status), "/metrics").await;
    assert_eq!(
        violation_lines(&body),
        vec!["violation{constraint_kind=\"\",constraint_name=\"\",kind=\"\",message=\"\",name=\"\",namespace=\"\"} 1"]
    );
}

#[tokio::test]
async fn test_readiness_drops_when_stream_ends() {
    let registry = Arc::new(ViolationRegistry::new().unwrap());
    let status = Arc::new(WatchStatus::new());
    let state = AppState::new(registry.clone(), status.clone());

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<kube::Result<WatchEvent<Event>>>();
    let pipeline = ViolationPipeline::new(registry);
    let pipeline_status = status.clone();
    let task = tokio::spawn(async move {
        let frames = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|frame| (frame, rx))
        });
        pipeline.run(admission_events(frames), &pipeline_status).await;
    });

    tx.send(Ok(WatchEvent::Added(gatekeeper_event(
        "FailedAdmission",
        "Pod",
        "nginx",
        DENIED_NOTE,
    ))))
    .unwrap();

    // Wait until the event has been recorded
    for _ in 0..100 {
        if violation_lines(&scrape(state.clone(), "/metrics").await.1).len() == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let (code, _) = scrape(state.clone(), "/readyz").await;
    assert_eq!(code, StatusCode::OK);

    drop(tx);
    task.await.unwrap();

    let (code, body) = scrape(state.clone(), "/readyz").await;
    assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("Event watch is not running"));

    // Last known state keeps being served
    let (_, metrics) = scrape(state, "/metrics").await;
    assert_eq!(violation_lines(&metrics).len(), 1);
}
