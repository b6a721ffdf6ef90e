//! Job transition broadcaster for real-time dashboards.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::workflow::{JobPhase, JobStatus, OrderStatus};

/// Emitted after a job move has been committed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTransitionEvent {
    pub job_id: String,
    pub display_id: String,
    pub order_id: String,
    /// `None` when the job was just created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_status: Option<JobStatus>,
    pub to_status: JobStatus,
    pub phase: JobPhase,
    /// New order status, when the move changed it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_status: Option<OrderStatus>,
    /// Route of the screen now responsible for the job.
    pub route: String,
    pub timestamp: DateTime<Utc>,
}

/// Broadcasts transition events to any number of subscribers.
#[derive(Clone)]
pub struct TransitionBroadcaster {
    sender: Arc<broadcast::Sender<JobTransitionEvent>>,
}

impl TransitionBroadcaster {
    /// Creates a broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: JobTransitionEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobTransitionEvent> {
        self.sender.subscribe()
    }
}

impl Default for TransitionBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}
