use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dto::sse::ServerEvent,
    state::{SharedState, SseHub},
};

/// Subscribe to the shared SSE stream.
pub fn subscribe(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.events().subscribe()
}

/// Convert a broadcast receiver into an SSE response, forwarding events
/// until the client disconnects.
///
/// The optional greeting goes only onto this client's stream; it never
/// touches the shared hub.
pub fn to_sse_stream(
    receiver: broadcast::Receiver<ServerEvent>,
    greeting: Option<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = forward_events(receiver, greeting);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Bridge a broadcast receiver into a per-client stream, seeding an optional
/// greeting event before any broadcast traffic.
fn forward_events(
    mut receiver: broadcast::Receiver<ServerEvent>,
    greeting: Option<ServerEvent>,
) -> ReceiverStream<Result<Event, Infallible>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        if let Some(payload) = greeting {
            if tx.send(Ok(into_event(payload))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(into_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive.
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!("SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    ReceiverStream::new(rx)
}

fn into_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}

/// Serialise a payload onto the shared stream under the given event name.
pub fn broadcast_json<T: Serialize>(hub: &SseHub, name: &str, payload: &T) {
    if let Ok(event) = ServerEvent::json(Some(name.to_string()), payload) {
        hub.broadcast(event);
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;

    fn named_event(name: &str) -> ServerEvent {
        ServerEvent {
            event: Some(name.to_string()),
            data: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn greeting_reaches_only_the_new_stream() {
        let hub = SseHub::new(8);
        let mut earlier_subscriber = hub.subscribe();

        let mut stream = forward_events(hub.subscribe(), Some(named_event("handshake")));

        assert!(stream.next().await.is_some());
        assert!(matches!(
            earlier_subscriber.try_recv(),
            Err(TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn broadcast_events_flow_after_the_greeting() {
        let hub = SseHub::new(8);
        let mut stream = forward_events(hub.subscribe(), Some(named_event("handshake")));

        hub.broadcast(named_event("time_tick"));

        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_some());
    }
}
