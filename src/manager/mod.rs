//! Live websocket clients, per-agent status and the interaction log.
//!
//! Mutations never wait on delivery: status and interaction updates are
//! pushed onto a bounded queue that a dispatcher task drains and fans out to
//! every connected client. Delivery is best effort. A client whose channel is
//! closed is dropped during the next sweep.

pub mod events;

pub use events::{
    timestamp, AgentState, ClientMessage, Interaction, InteractionKind, ServerEvent, Snapshot,
    StatusRecord,
};

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Transport handle for one client; the websocket task drains the receiver.
pub type Transport = mpsc::Sender<ServerEvent>;

#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub heartbeat_interval: Duration,
    pub retry_backoff: Duration,
    pub interaction_cap: usize,
    pub snapshot_len: usize,
    pub queue_capacity: usize,
    pub client_buffer: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            retry_backoff: Duration::from_secs(5),
            interaction_cap: 1000,
            snapshot_len: 50,
            queue_capacity: 1024,
            client_buffer: 256,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("event queue is full")]
    QueueFull,
    #[error("event queue is closed")]
    QueueClosed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManagerStats {
    pub active_connections: usize,
    pub agents_monitored: usize,
    pub interactions_recorded: usize,
}

pub struct ConnectionManager {
    config: ManagerConfig,
    connections: Arc<DashMap<String, Transport>>,
    agent_status: RwLock<BTreeMap<String, StatusRecord>>,
    interactions: RwLock<VecDeque<Interaction>>,
    queue: mpsc::Sender<ServerEvent>,
    heartbeat_started: AtomicBool,
}

impl ConnectionManager {
    /// Must be called inside a tokio runtime: spawns the dispatcher task.
    pub fn new(config: ManagerConfig) -> Self {
        let connections: Arc<DashMap<String, Transport>> = Arc::new(DashMap::new());
        let (queue, queue_rx) = mpsc::channel(config.queue_capacity.max(1));

        tokio::spawn(dispatch_loop(queue_rx, connections.clone()));

        Self {
            interactions: RwLock::new(VecDeque::with_capacity(config.interaction_cap)),
            config,
            connections,
            agent_status: RwLock::new(BTreeMap::new()),
            queue,
            heartbeat_started: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Channel pair sized for one client of this manager.
    pub fn transport(&self) -> (Transport, mpsc::Receiver<ServerEvent>) {
        mpsc::channel(self.config.client_buffer.max(1))
    }

    // ── connections ──────────────────────────────────────────────────

    /// Accept a client: sends it the current snapshot, registers it and makes
    /// sure the heartbeat loop is running.
    pub fn connect(&self, transport: Transport) -> String {
        let connection_id = Uuid::now_v7().to_string();

        // Writers are held off until the client is registered, so every
        // update is either in the snapshot or broadcast to this client.
        let statuses = self.agent_status.read();
        let history = self.interactions.read();
        let snapshot = Snapshot {
            agents: statuses.clone(),
            interactions: tail(&history, self.config.snapshot_len),
        };
        if let Err(e) = transport.try_send(ServerEvent::InitialState { data: snapshot }) {
            log::debug!("Initial state not delivered to {}: {}", connection_id, e);
        }
        self.connections.insert(connection_id.clone(), transport);
        drop(history);
        drop(statuses);

        log::info!(
            "Client connected: {} (total: {})",
            connection_id,
            self.connections.len()
        );

        self.ensure_heartbeat();
        connection_id
    }

    pub fn disconnect(&self, connection_id: &str) {
        if self.connections.remove(connection_id).is_some() {
            log::info!("Client disconnected: {}", connection_id);
        }
    }

    pub fn send_personal(&self, event: ServerEvent, connection_id: &str) {
        if let Some(transport) = self.connections.get(connection_id) {
            if let Err(e) = transport.try_send(event) {
                log::debug!("Personal message to {} dropped: {}", connection_id, e);
            }
        }
    }

    /// Deliver to every connected client right now. Returns how many clients
    /// accepted the event.
    pub fn broadcast(&self, event: &ServerEvent) -> usize {
        deliver(&self.connections, event)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_connected(&self, connection_id: &str) -> bool {
        self.connections.contains_key(connection_id)
    }

    // ── agent status ─────────────────────────────────────────────────

    /// Replace the stored record for `agent_id` and queue an `agent_update`.
    pub fn update_agent_status(&self, agent_id: &str, status: StatusRecord) -> StatusRecord {
        let mut record = status;
        record.insert("last_updated".to_string(), Value::String(timestamp()));

        let mut table = self.agent_status.write();
        table.insert(agent_id.to_string(), record.clone());
        // Enqueued under the lock so broadcast order follows write order.
        self.publish(ServerEvent::AgentUpdate {
            agent_id: agent_id.to_string(),
            data: record.clone(),
        });
        drop(table);

        record
    }

    pub fn register_agent(&self, agent_id: &str, metadata: Value) {
        let registered_at = timestamp();

        let mut status = StatusRecord::new();
        status.insert("status".into(), AgentState::Idle.to_string().into());
        status.insert("registered_at".into(), registered_at.clone().into());
        status.insert("metadata".into(), metadata.clone());
        self.update_agent_status(agent_id, status);

        self.record_interaction(
            Interaction::new(agent_id, InteractionKind::AgentRegistered)
                .at(registered_at)
                .with("metadata", metadata),
        );
        log::info!("Agent registered: {}", agent_id);
    }

    pub fn agent_status(&self, agent_id: &str) -> Option<StatusRecord> {
        self.agent_status.read().get(agent_id).cloned()
    }

    pub fn agent_statuses(&self) -> BTreeMap<String, StatusRecord> {
        self.agent_status.read().clone()
    }

    // ── interactions ─────────────────────────────────────────────────

    /// Append to the capped log and queue a `new_interaction`. Returns the
    /// freshly assigned id.
    pub fn record_interaction(&self, mut interaction: Interaction) -> String {
        interaction.strip_reserved();
        if interaction.timestamp.is_none() {
            interaction.timestamp = Some(timestamp());
        }
        let interaction_id = Uuid::now_v7().to_string();
        interaction.id = interaction_id.clone();

        let mut log = self.interactions.write();
        log.push_back(interaction.clone());
        while log.len() > self.config.interaction_cap {
            log.pop_front();
        }
        self.publish(ServerEvent::NewInteraction { data: interaction });
        drop(log);

        interaction_id
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.interactions.read().iter().cloned().collect()
    }

    pub fn recent_interactions(&self, n: usize) -> Vec<Interaction> {
        tail(&self.interactions.read(), n)
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.read().len()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            agents: self.agent_statuses(),
            interactions: self.recent_interactions(self.config.snapshot_len),
        }
    }

    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            active_connections: self.connection_count(),
            agents_monitored: self.agent_status.read().len(),
            interactions_recorded: self.interaction_count(),
        }
    }

    // ── background work ──────────────────────────────────────────────

    pub fn heartbeat_running(&self) -> bool {
        self.heartbeat_started.load(Ordering::SeqCst)
    }

    fn ensure_heartbeat(&self) {
        if self.heartbeat_started.swap(true, Ordering::SeqCst) {
            return;
        }
        log::debug!("Starting heartbeat loop");
        tokio::spawn(heartbeat_loop(
            self.queue.downgrade(),
            self.config.heartbeat_interval,
            self.config.retry_backoff,
        ));
    }

    fn publish(&self, event: ServerEvent) {
        let name = event.name();
        if let Err(e) = enqueue(&self.queue, event) {
            log::debug!("Skipping '{}' broadcast: {}", name, e);
        }
    }
}

fn tail(log: &VecDeque<Interaction>, n: usize) -> Vec<Interaction> {
    let skip = log.len().saturating_sub(n);
    log.iter().skip(skip).cloned().collect()
}

fn enqueue(queue: &mpsc::Sender<ServerEvent>, event: ServerEvent) -> Result<(), ManagerError> {
    queue.try_send(event).map_err(|e| match e {
        mpsc::error::TrySendError::Full(_) => ManagerError::QueueFull,
        mpsc::error::TrySendError::Closed(_) => ManagerError::QueueClosed,
    })
}

/// Fan `event` out to every client. Closed transports are removed after the
/// sweep; a full transport only loses this event.
fn deliver(connections: &DashMap<String, Transport>, event: &ServerEvent) -> usize {
    let mut delivered = 0;
    let mut failed_clients = Vec::new();

    for entry in connections.iter() {
        match entry.value().try_send(event.clone()) {
            Ok(()) => delivered += 1,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!(
                    "Channel full for client {}, dropping '{}' event",
                    entry.key(),
                    event.name()
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                failed_clients.push(entry.key().clone());
            }
        }
    }

    for client_id in failed_clients {
        connections.remove(&client_id);
        log::debug!("Removed disconnected client {}", client_id);
    }

    delivered
}

async fn dispatch_loop(
    mut queue_rx: mpsc::Receiver<ServerEvent>,
    connections: Arc<DashMap<String, Transport>>,
) {
    while let Some(event) = queue_rx.recv().await {
        let delivered = deliver(&connections, &event);
        log::trace!("Dispatched '{}' to {} client(s)", event.name(), delivered);
    }
    log::info!("Event dispatcher shutting down");
}

async fn heartbeat_loop(
    queue: mpsc::WeakSender<ServerEvent>,
    interval: Duration,
    retry_backoff: Duration,
) {
    loop {
        let Some(queue) = queue.upgrade() else {
            log::debug!("Connection manager dropped, stopping heartbeat");
            return;
        };
        let result = enqueue(&queue, ServerEvent::Heartbeat { timestamp: timestamp() });
        drop(queue);

        match result {
            Ok(()) => tokio::time::sleep(interval).await,
            Err(e) => {
                log::error!("Error in periodic updates: {}", e);
                tokio::time::sleep(retry_backoff).await;
            }
        }
    }
}
