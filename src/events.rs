use serde::Serialize;
use std::fmt;

/// A change of lock ownership, in the order it happened.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LockEvent {
    Acquired {
        tick: u64,
        thread_id: usize,
        /// Ticks spent wanting the lock before the grant.
        waited: u64,
    },
    Released {
        tick: u64,
        thread_id: usize,
    },
}

impl LockEvent {
    pub fn tick(&self) -> u64 {
        match self {
            LockEvent::Acquired { tick, .. } | LockEvent::Released { tick, .. } => *tick,
        }
    }

    pub fn thread_id(&self) -> usize {
        match self {
            LockEvent::Acquired { thread_id, .. } | LockEvent::Released { thread_id, .. } => {
                *thread_id
            }
        }
    }

    pub fn is_acquire(&self) -> bool {
        matches!(self, LockEvent::Acquired { .. })
    }
}

impl fmt::Display for LockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockEvent::Acquired {
                tick,
                thread_id,
                waited,
            } => write!(
                f,
                "t={} thread {} acquired (waited {})",
                tick, thread_id, waited
            ),
            LockEvent::Released { tick, thread_id } => {
                write!(f, "t={} thread {} released", tick, thread_id)
            }
        }
    }
}
