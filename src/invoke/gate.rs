//! Admission gate limiting in-flight invocations.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// The gate was closed and admits no further invocations.
#[derive(Debug, Error)]
#[error("admission gate closed")]
pub struct GateClosed;

/// A bounded gate in front of the remote function.
///
/// With one slot, at most one invocation runs at a time process-wide.
/// Waiters are admitted in FIFO order.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    slots: Arc<Semaphore>,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
        }
    }

    /// A gate with a single slot.
    pub fn single() -> Self {
        Self::new(1)
    }

    /// Wait for a free slot.
    ///
    /// The slot is held until the returned permit is dropped, whichever way
    /// the caller exits.
    pub async fn enter(&self) -> Result<AdmissionPermit, GateClosed> {
        let permit = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| GateClosed)?;
        Ok(AdmissionPermit { _permit: permit })
    }

    /// Stop admitting; current and future waiters get [`GateClosed`].
    ///
    /// Permits already handed out stay valid until dropped.
    pub fn close(&self) {
        self.slots.close();
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::single()
    }
}

/// A held gate slot. Released on drop.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}
