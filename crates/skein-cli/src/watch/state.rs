//! Shared state for the watch server.
//!
//! Holds the latest composed report and the set of connected SSE
//! clients, behind parking_lot locks so both the rebuild loop and the
//! HTTP handlers can reach them.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use skein_graph::DependencyReport;

use crate::watch::WatchEvent;

pub type SharedState = Arc<WatchState>;

/// State shared between the rebuild loop and the HTTP server.
#[derive(Default)]
pub struct WatchState {
    /// Most recent complete report, if any build has finished.
    latest: RwLock<Option<Arc<DependencyReport>>>,
    /// Connected SSE clients, keyed by id.
    clients: RwLock<HashMap<usize, tokio::sync::mpsc::Sender<String>>>,
    next_client_id: RwLock<usize>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current report.
    pub fn set_report(&self, report: DependencyReport) {
        *self.latest.write() = Some(Arc::new(report));
    }

    /// The latest report, if one exists.
    pub fn latest(&self) -> Option<Arc<DependencyReport>> {
        self.latest.read().clone()
    }

    /// Register a new SSE client; returns its id and the receiving end
    /// of its event channel.
    pub fn register_client(&self) -> (usize, tokio::sync::mpsc::Receiver<String>) {
        let id = {
            let mut next_id = self.next_client_id.write();
            let id = *next_id;
            *next_id += 1;
            id
        };
        let (tx, rx) = tokio::sync::mpsc::channel(100);
        self.clients.write().insert(id, tx);
        (id, rx)
    }

    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    /// Send an event to every connected client, dropping clients whose
    /// channel has closed.
    pub async fn broadcast(&self, event: &WatchEvent) {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(%err, "unserializable watch event");
                return;
            }
        };

        let clients: Vec<_> = self
            .clients
            .read()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut disconnected = Vec::new();
        for (id, tx) in clients {
            if tx.send(json.clone()).await.is_err() {
                disconnected.push(id);
            }
        }
        for id in disconnected {
            self.unregister_client(id);
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clients_get_distinct_ids() {
        let state = WatchState::new();
        let (id1, _rx1) = state.register_client();
        let (id2, _rx2) = state.register_client();
        assert_ne!(id1, id2);
        assert_eq!(state.client_count(), 2);

        state.unregister_client(id1);
        assert_eq!(state.client_count(), 1);
    }

    #[tokio::test]
    async fn broadcast_prunes_closed_channels() {
        let state = WatchState::new();
        let (_id1, rx1) = state.register_client();
        let (_id2, mut rx2) = state.register_client();
        drop(rx1);

        state
            .broadcast(&WatchEvent::BuildFailed {
                message: "x".to_string(),
            })
            .await;

        assert_eq!(state.client_count(), 1);
        assert!(rx2.recv().await.is_some());
    }
}
