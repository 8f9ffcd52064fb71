use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::realtime::frames::ServerFrame;
use crate::types::CustomerId;

pub type ConnectionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closing,
}

/// Registry-owned half of a live connection. The session task keeps the
/// receiving end; once it drops the receiver the handle reports `Closing`.
#[derive(Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<String>,
}

impl ConnectionHandle {
    pub fn open() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbound, receiver) = mpsc::unbounded_channel();
        let handle = Self {
            id: Uuid::new_v4(),
            outbound,
        };
        (handle, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        if self.outbound.is_closed() {
            ConnectionState::Closing
        } else {
            ConnectionState::Open
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    fn send(&self, text: String) -> bool {
        self.outbound.send(text).is_ok()
    }
}

/// At most one live connection per customer. Last writer wins; a superseded
/// handle is dropped without teardown and its session cleans up on its own.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<CustomerId, ConnectionHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handle` for `customer` and greet it with a `connected` frame
    pub fn register(&self, customer: CustomerId, handle: ConnectionHandle) {
        let greeting = ServerFrame::connected(&customer);
        match greeting.to_text() {
            Ok(text) => {
                if !handle.send(text) {
                    tracing::warn!("Connection {} for customer {} closed before greeting", handle.id(), customer);
                }
            }
            Err(e) => tracing::error!("Failed to serialize connected frame: {}", e),
        }

        let id = handle.id();
        match self.connections.insert(customer.clone(), handle) {
            Some(previous) => tracing::info!(
                "Customer {} connection {} supersedes {}",
                customer,
                id,
                previous.id()
            ),
            None => tracing::info!("Customer {} connected ({})", customer, id),
        }
    }

    /// Remove the entry only when it still holds `connection`
    pub fn unregister(&self, customer: &CustomerId, connection: ConnectionId) -> bool {
        let removed = self
            .connections
            .remove_if(customer, |_, handle| handle.id() == connection)
            .is_some();

        if removed {
            tracing::info!("Customer {} disconnected ({})", customer, connection);
        } else {
            tracing::debug!("Ignoring stale unregister of {} for customer {}", connection, customer);
        }
        removed
    }

    /// Directed delivery. `false` means no open connection took the frame.
    pub fn deliver(&self, customer: &CustomerId, frame: &ServerFrame) -> bool {
        let Some(handle) = self.connections.get(customer) else {
            return false;
        };
        if !handle.is_open() {
            return false;
        }

        match frame.to_text() {
            Ok(text) => handle.send(text),
            Err(e) => {
                tracing::error!("Failed to serialize {} frame: {}", frame.frame_type(), e);
                false
            }
        }
    }

    /// Best-effort send to every open entry. Closed entries are skipped and
    /// left for their session to remove.
    pub fn broadcast(&self, frame: &ServerFrame) -> usize {
        let text = match frame.to_text() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to serialize {} frame: {}", frame.frame_type(), e);
                return 0;
            }
        };

        let sent = self
            .connections
            .iter()
            .filter(|entry| entry.value().is_open() && entry.value().send(text.clone()))
            .count();

        tracing::info!("Broadcast {} to {} clients", frame.frame_type(), sent);
        sent
    }

    pub fn liveness(&self, customer: &CustomerId) -> bool {
        self.connections
            .get(customer)
            .map(|handle| handle.is_open())
            .unwrap_or(false)
    }

    pub fn connected_count(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::InsightResult;
    use crate::types::Variant;
    use chrono::Utc;

    fn insights_frame() -> ServerFrame {
        ServerFrame::insights(Variant::FinancialHealth, InsightResult::empty(Utc::now()), Utc::now())
    }

    #[test]
    fn deliver_without_connection_is_false() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.deliver(&CustomerId::from("nobody"), &insights_frame()));
    }

    #[test]
    fn register_sends_connected_frame() {
        let registry = ConnectionRegistry::new();
        let (handle, mut rx) = ConnectionHandle::open();
        registry.register(CustomerId::from("c1"), handle);

        let greeting = rx.try_recv().unwrap();
        assert!(greeting.contains(r#""type":"connected""#));
        assert!(greeting.contains(r#""customerId":"c1""#));
        assert!(registry.liveness(&CustomerId::from("c1")));
    }

    #[test]
    fn deliver_after_unregister_is_false() {
        let registry = ConnectionRegistry::new();
        let customer = CustomerId::from("c1");
        let (handle, _rx) = ConnectionHandle::open();
        let id = handle.id();

        registry.register(customer.clone(), handle);
        assert!(registry.unregister(&customer, id));
        assert!(!registry.deliver(&customer, &insights_frame()));
        assert!(!registry.liveness(&customer));
    }

    #[test]
    fn stale_unregister_keeps_newer_connection() {
        let registry = ConnectionRegistry::new();
        let customer = CustomerId::from("c1");
        let (a, _rx_a) = ConnectionHandle::open();
        let (b, mut rx_b) = ConnectionHandle::open();
        let a_id = a.id();

        registry.register(customer.clone(), a);
        registry.register(customer.clone(), b);
        assert!(!registry.unregister(&customer, a_id));

        assert!(registry.liveness(&customer));
        assert_eq!(registry.connected_count(), 1);

        rx_b.try_recv().unwrap();
        assert!(registry.deliver(&customer, &insights_frame()));
        assert!(rx_b.try_recv().unwrap().contains("agent_insights"));
    }

    #[test]
    fn closed_handle_is_not_live_and_not_removed() {
        let registry = ConnectionRegistry::new();
        let customer = CustomerId::from("c1");
        let (handle, rx) = ConnectionHandle::open();
        registry.register(customer.clone(), handle);
        drop(rx);

        assert!(!registry.liveness(&customer));
        assert!(!registry.deliver(&customer, &insights_frame()));
        assert_eq!(registry.connected_count(), 1);
    }

    #[test]
    fn broadcast_counts_open_entries_only() {
        let registry = ConnectionRegistry::new();
        let (a, mut rx_a) = ConnectionHandle::open();
        let (b, rx_b) = ConnectionHandle::open();
        let (c, mut rx_c) = ConnectionHandle::open();
        registry.register(CustomerId::from("a"), a);
        registry.register(CustomerId::from("b"), b);
        registry.register(CustomerId::from("c"), c);
        drop(rx_b);

        assert_eq!(registry.broadcast(&insights_frame()), 2);
        assert_eq!(registry.connected_count(), 3);

        rx_a.try_recv().unwrap();
        assert!(rx_a.try_recv().unwrap().contains("agent_insights"));
        rx_c.try_recv().unwrap();
        assert!(rx_c.try_recv().unwrap().contains("agent_insights"));
    }
}
