use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a single simulation run.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimConfig {
    /// Profile keys, one per simulated thread, in thread-index order.
    pub threads: Vec<String>,
    #[serde(default = "default_timeline_width")]
    pub timeline_width: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            threads: Vec::new(),
            timeline_width: default_timeline_width(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseKind {
    Cpu,
    Io,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseKind::Cpu => write!(f, "cpu"),
            PhaseKind::Io => write!(f, "io"),
        }
    }
}

/// One contiguous unit of work. CPU phases need the lock, IO phases do not.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct Phase {
    pub kind: PhaseKind,
    pub duration: u64,
}

impl Phase {
    pub const fn cpu(duration: u64) -> Self {
        Self {
            kind: PhaseKind::Cpu,
            duration,
        }
    }

    pub const fn io(duration: u64) -> Self {
        Self {
            kind: PhaseKind::Io,
            duration,
        }
    }

    pub fn needs_lock(&self) -> bool {
        matches!(self.kind, PhaseKind::Cpu)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.duration)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct RequestProfile {
    pub key: String,
    pub label: String,
    pub description: String,
    pub phases: Vec<Phase>,
}

impl RequestProfile {
    pub fn new(key: &str, label: &str, description: &str, phases: Vec<Phase>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            phases,
        }
    }

    /// Ticks the profile needs when it never waits for the lock.
    pub fn total_duration(&self) -> u64 {
        self.phases.iter().map(|phase| phase.duration).sum()
    }
}

fn default_timeline_width() -> usize {
    60
}
