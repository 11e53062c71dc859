//! SSE acceptance layer — GET /rooms/{room}/stream
//!
//! Opens one streaming connection per request: a bounded mpsc channel is
//! registered with the realtime core as the connection's sink, and the
//! response body drains the receiver. When the client goes away the body
//! stream is dropped and the guard deregisters the connection — a failed
//! write during a broadcast has the same effect from the core's side.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use mentora_core::config::SINK_BUFFER;
use mentora_core::RoomId;
use mentora_realtime::{ConnectionId, EventSink, SinkError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::app::AppState;

/// mpsc-backed sink. `try_send` keeps broadcast writes non-blocking: a full
/// buffer means the client can't keep up and the connection is dropped
/// rather than buffered further (at-most-once contract).
pub struct ChannelSink(mpsc::Sender<String>);

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self(tx)
    }
}

impl EventSink for ChannelSink {
    fn send_frame(&self, frame: &str) -> Result<(), SinkError> {
        self.0.try_send(frame.to_string()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// Ties connection lifetime to response-body lifetime.
struct StreamGuard {
    handle: ConnectionId,
    state: Arc<AppState>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.state.broadcaster.close_connection(self.handle);
    }
}

pub async fn stream_handler(
    Path(room): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let (tx, rx) = mpsc::channel::<String>(SINK_BUFFER);
    let handle = state
        .broadcaster
        .open_connection(Box::new(ChannelSink::new(tx)), RoomId::from(room));

    let guard = StreamGuard {
        handle,
        state: Arc::clone(&state),
    };
    // the guard rides inside the stream so client disconnect deregisters
    let frames = ReceiverStream::new(rx).map(move |frame| {
        let _keep_open = &guard;
        Ok::<String, std::convert::Infallible>(frame)
    });

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(frames),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_buffer_reports_full() {
        let (tx, _rx) = mpsc::channel::<String>(1);
        let sink = ChannelSink::new(tx);
        assert!(sink.send_frame("data: {}\n\n").is_ok());
        assert!(matches!(sink.send_frame("data: {}\n\n"), Err(SinkError::Full)));
    }

    #[test]
    fn dropped_receiver_reports_closed() {
        let (tx, rx) = mpsc::channel::<String>(4);
        drop(rx);
        let sink = ChannelSink::new(tx);
        assert!(matches!(sink.send_frame("data: {}\n\n"), Err(SinkError::Closed)));
    }

    #[test]
    fn frames_pass_through_untouched() {
        let (tx, mut rx) = mpsc::channel::<String>(4);
        let sink = ChannelSink::new(tx);
        sink.send_frame("data: {\"type\":\"insight:ready\"}\n\n").unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            "data: {\"type\":\"insight:ready\"}\n\n"
        );
    }
}
