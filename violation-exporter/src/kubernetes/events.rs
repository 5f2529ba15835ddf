//! Kubernetes events
//!
//! Watch `events.k8s.io/v1` events in one namespace and flatten the watch
//! frames into [`AdmissionEvent`] values.

use futures::stream::BoxStream;
use futures::{future, Stream, StreamExt};
use k8s_openapi::api::events::v1::Event;
use kube::api::{Api, WatchEvent, WatchParams};
use tracing::{trace, warn};

use crate::error::ExporterResult;
use crate::kubernetes::client::K8sClient;
use crate::kubernetes::types::{
    AdmissionEvent, ObjectRef, EVENT_TYPE_ADDED, EVENT_TYPE_DELETED, EVENT_TYPE_MODIFIED,
};

/// Server-side lifetime of one watch request. The API server rejects values
/// of 295 seconds or more.
pub const WATCH_TIMEOUT_SECS: u32 = 290;

/// Parameters for the event watch
pub fn watch_params() -> WatchParams {
    WatchParams::default().timeout(WATCH_TIMEOUT_SECS)
}

/// Start a raw watch on events in a namespace.
///
/// The API server closes the stream after [`WATCH_TIMEOUT_SECS`] and the
/// stream is not restarted, so the exporter stops updating metrics and
/// reports not-ready at that point.
pub async fn watch_events(
    client: &K8sClient,
    namespace: &str,
) -> ExporterResult<BoxStream<'static, kube::Result<WatchEvent<Event>>>> {
    let events: Api<Event> = Api::namespaced(client.inner().clone(), namespace);

    let stream = events.watch(&watch_params(), "0").await?;

    Ok(stream.boxed())
}

/// Turn a stream of watch frames into admission events, dropping bookmarks,
/// error frames and undecodable items
pub fn admission_events<S>(frames: S) -> impl Stream<Item = AdmissionEvent>
where
    S: Stream<Item = kube::Result<WatchEvent<Event>>>,
{
    frames.filter_map(|frame| future::ready(frame_to_event(frame)))
}

/// Convert one watch frame; `None` for frames that carry no event
pub fn frame_to_event(frame: kube::Result<WatchEvent<Event>>) -> Option<AdmissionEvent> {
    match frame {
        Ok(WatchEvent::Added(event)) => Some(event_to_admission(EVENT_TYPE_ADDED, event)),
        Ok(WatchEvent::Modified(event)) => Some(event_to_admission(EVENT_TYPE_MODIFIED, event)),
        Ok(WatchEvent::Deleted(event)) => Some(event_to_admission(EVENT_TYPE_DELETED, event)),
        Ok(WatchEvent::Bookmark(bookmark)) => {
            trace!(
                resource_version = %bookmark.metadata.resource_version,
                "Watch bookmark"
            );
            None
        }
        Ok(WatchEvent::Error(status)) => {
            warn!(
                code = status.code,
                reason = %status.reason,
                "Watch returned error frame: {}",
                status.message
            );
            None
        }
        Err(e) => {
            warn!(error = %e, "Failed to read event from watch");
            None
        }
    }
}

fn event_to_admission(event_type: &str, event: Event) -> AdmissionEvent {
    let regarding = event.regarding.unwrap_or_default();

    AdmissionEvent {
        event_type: event_type.to_string(),
        reason: event.reason.unwrap_or_default(),
        regarding: ObjectRef {
            kind: regarding.kind.unwrap_or_default(),
            namespace: regarding.namespace.unwrap_or_default(),
            name: regarding.name.unwrap_or_default(),
        },
        note: event.note.unwrap_or_default(),
        annotations: event.metadata.annotations.unwrap_or_default(),
    }
}
