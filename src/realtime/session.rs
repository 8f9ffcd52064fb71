use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::realtime::frames::ServerFrame;
use crate::realtime::registry::{ConnectionHandle, ConnectionRegistry};
use crate::types::CustomerId;

/// Drive one authenticated socket until the client goes away.
///
/// The session owns the receiving end of its handle and refers back to the
/// registry only by connection id. If a newer connection supersedes this one
/// the outbound channel closes, but the socket keeps serving inbound frames
/// until the client disconnects.
pub async fn run_session(socket: WebSocket, customer: CustomerId, registry: Arc<ConnectionRegistry>) {
    let (mut sender, mut receiver) = socket.split();
    let (handle, mut outbound) = ConnectionHandle::open();
    let connection = handle.id();
    registry.register(customer.clone(), handle);

    let mut superseded = false;

    loop {
        tokio::select! {
            frame = outbound.recv(), if !superseded => {
                match frame {
                    Some(text) => {
                        if sender.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("Connection {} for customer {} superseded", connection, customer);
                        superseded = true;
                    }
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match echo_frame(&text).map(|frame| frame.to_text()) {
                            Some(Ok(reply)) => {
                                if sender.send(Message::Text(reply)).await.is_err() {
                                    break;
                                }
                            }
                            Some(Err(e)) => tracing::error!("Failed to serialize echo frame: {}", e),
                            None => tracing::debug!("Ignoring non-JSON message from customer {}", customer),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error for customer {}: {}", customer, e);
                        break;
                    }
                }
            }
        }
    }

    drop(outbound);
    registry.unregister(&customer, connection);
}

fn echo_frame(text: &str) -> Option<ServerFrame> {
    serde_json::from_str(text)
        .ok()
        .map(|data| ServerFrame::Echo { data })
}
