use std::{collections::VecDeque, sync::Arc};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::model::Command;
use crate::{config::FanLimitUnit, error::ValidationError};

/// In-memory, insertion-ordered queue of commands waiting for the device.
///
/// Wrapped in `Arc` so it can be cheaply cloned into every handler.
/// At most one `fan_limits` command is live at a time; the queue never holds
/// more than `capacity` commands, evicting the oldest non-`fan_limits` entry
/// first when full.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    inner: Arc<RwLock<VecDeque<Command>>>,
    unit: FanLimitUnit,
    capacity: usize,
}

impl CommandQueue {
    pub fn new(unit: FanLimitUnit, capacity: usize) -> Self {
        Self {
            inner: Arc::default(),
            unit,
            capacity: capacity.max(1),
        }
    }

    pub fn unit(&self) -> FanLimitUnit {
        self.unit
    }

    /// Validates `body` and enqueues it. A rejected command leaves the queue
    /// untouched.
    pub async fn submit(&self, body: Value) -> Result<Command, ValidationError> {
        let command = Command::from_json(body, self.unit)?;
        self.push(command.clone()).await;
        info!(kind = %command.kind, payload = ?command.payload, "Command queued");
        Ok(command)
    }

    /// Appends an already-validated command, applying the replacement and
    /// capacity rules.
    pub async fn push(&self, command: Command) {
        let mut queue = self.inner.write().await;

        if command.is_fan_limits() {
            queue.retain(|queued| !queued.is_fan_limits());
        }

        while queue.len() >= self.capacity {
            let victim = queue
                .iter()
                .position(|queued| !queued.is_fan_limits())
                .unwrap_or(0);
            if let Some(evicted) = queue.remove(victim) {
                debug!(kind = %evicted.kind, "Command queue full; evicted oldest command");
            }
        }

        queue.push_back(command);
    }

    /// Return a copy of every queued command, oldest first. Nothing is removed.
    pub async fn snapshot(&self) -> Vec<Command> {
        self.inner.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}
