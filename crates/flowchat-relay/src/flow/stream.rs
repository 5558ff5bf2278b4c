//! Server-sent event subscription for streamed runs.
//!
//! A subscription owns a reader task that decodes the `text/event-stream`
//! body and delivers each event as a [`StreamEvent`] over a channel. The
//! reader stops after the first `Closed` or `Failed` event, or when
//! [`StreamSubscription::close`] is called.

use eventsource_stream::{Event, Eventsource};
use reqwest::header::ACCEPT;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events observed on a run stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The stream responded and is being read.
    Connected,
    /// One `data` payload.
    Message(Value),
    /// The server closed the stream (explicit `close` event or end of body).
    Closed(String),
    /// Transport error, bad status, or an undecodable payload.
    Failed(String),
}

impl StreamEvent {
    const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed(_) | Self::Failed(_))
    }
}

/// A cancellable subscription to a run stream.
#[derive(Debug)]
pub struct StreamSubscription {
    events: mpsc::Receiver<StreamEvent>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl StreamSubscription {
    /// Open `url` with `http` and start reading events in the background.
    pub fn open(http: reqwest::Client, url: String) -> Self {
        let (tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(read_stream(http, url, tx, cancel.clone()));
        Self {
            events,
            cancel,
            handle,
        }
    }

    /// Next event, or `None` once the stream has ended or been closed.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    /// Stop reading. Events already queued can still be drained.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for StreamSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn read_stream(
    http: reqwest::Client,
    url: String,
    tx: mpsc::Sender<StreamEvent>,
    cancel: CancellationToken,
) {
    let request = http.get(&url).header(ACCEPT, "text/event-stream").send();
    let resp = tokio::select! {
        () = cancel.cancelled() => return,
        resp = request => resp,
    };

    let resp = match resp {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            let _ = tx
                .send(StreamEvent::Failed(format!("stream returned {}", r.status())))
                .await;
            return;
        }
        Err(e) => {
            warn!(url = %url, error = %e, "Stream connection failed");
            let _ = tx.send(StreamEvent::Failed(e.to_string())).await;
            return;
        }
    };

    if tx.send(StreamEvent::Connected).await.is_err() {
        return;
    }

    let events = resp.bytes_stream().eventsource();
    tokio::pin!(events);
    loop {
        let next = tokio::select! {
            () = cancel.cancelled() => {
                debug!(url = %url, "Stream closed by subscriber");
                return;
            }
            next = events.next() => next,
        };
        match next {
            Some(Ok(event)) => {
                let Some(event) = stream_event(event) else {
                    continue;
                };
                let terminal = event.is_terminal();
                if tx.send(event).await.is_err() || terminal {
                    return;
                }
            }
            Some(Err(e)) => {
                warn!(url = %url, error = %e, "Stream read failed");
                let _ = tx.send(StreamEvent::Failed(e.to_string())).await;
                return;
            }
            None => {
                let _ = tx.send(StreamEvent::Closed("Stream closed".into())).await;
                return;
            }
        }
    }
}

/// Map a dispatched server-sent event to a stream event. Named events other
/// than `message` and `close` have no listener and are dropped.
fn stream_event(event: Event) -> Option<StreamEvent> {
    match event.event.as_str() {
        "close" => Some(StreamEvent::Closed("Stream closed".into())),
        "" | "message" => {
            if event.data.is_empty() {
                return None;
            }
            Some(match serde_json::from_str(&event.data) {
                Ok(value) => StreamEvent::Message(value),
                Err(e) => StreamEvent::Failed(format!("Invalid stream payload: {e}")),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use serde_json::json;

    /// Decode `chunks` as one event stream and map every event.
    async fn decode(chunks: &[&'static str]) -> Vec<Option<StreamEvent>> {
        let body = tokio_stream::iter(
            chunks
                .iter()
                .map(|c| Ok::<_, Infallible>(c.as_bytes()))
                .collect::<Vec<_>>(),
        );
        body.eventsource()
            .map(|event| stream_event(event.unwrap()))
            .collect::<Vec<_>>()
            .await
    }

    #[tokio::test]
    async fn data_event_maps_to_message() {
        let events = decode(&["data: {\"chunk\":\"Hi\"}\n\n"]).await;
        assert_eq!(events, vec![Some(StreamEvent::Message(json!({"chunk": "Hi"})))]);
    }

    #[tokio::test]
    async fn event_split_across_chunks() {
        let events = decode(&["data: {\"a\"", ":1}\r\n", "\r\n"]).await;
        assert_eq!(events, vec![Some(StreamEvent::Message(json!({"a": 1})))]);
    }

    #[tokio::test]
    async fn close_event_maps_to_closed() {
        let events = decode(&["event: close\ndata: done\n\n"]).await;
        assert_eq!(events, vec![Some(StreamEvent::Closed("Stream closed".into()))]);
    }

    #[tokio::test]
    async fn bad_payload_maps_to_failed() {
        let events = decode(&["event: message\ndata: not json\n\n"]).await;
        assert!(matches!(events.as_slice(), [Some(StreamEvent::Failed(_))]));
    }

    #[tokio::test]
    async fn other_named_events_dropped() {
        let events = decode(&["event: token\ndata: {}\n\n"]).await;
        assert_eq!(events, vec![None]);
    }
}
