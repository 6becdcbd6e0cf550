use serde::Serialize;
use std::fmt;

use crate::events::LockEvent;
use crate::models::{Phase, RequestProfile};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ThreadState {
    Running {
        phase_idx: usize,
        executed_in_phase: u64,
    },
    Finished,
}

#[derive(Clone, Debug)]
pub struct SimThread<'a> {
    pub id: usize,
    pub profile: &'a RequestProfile,
    pub state: ThreadState,
    /// Tick at which the thread started wanting the lock; `None` when not waiting.
    pub waiting_since: Option<u64>,
    pub timeline: Timeline,
}

impl<'a> SimThread<'a> {
    pub fn new(id: usize, profile: &'a RequestProfile) -> Self {
        let state = if profile.phases.is_empty() {
            ThreadState::Finished
        } else {
            ThreadState::Running {
                phase_idx: 0,
                executed_in_phase: 0,
            }
        };
        Self {
            id,
            profile,
            state,
            waiting_since: None,
            timeline: Timeline::default(),
        }
    }

    pub fn current_phase(&self) -> Option<&Phase> {
        match self.state {
            ThreadState::Running { phase_idx, .. } => self.profile.phases.get(phase_idx),
            ThreadState::Finished => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, ThreadState::Finished)
    }

    pub fn wants_lock(&self) -> bool {
        self.current_phase().is_some_and(Phase::needs_lock)
    }

    /// Consumes one tick of the current phase.
    pub fn advance(&mut self) {
        let ThreadState::Running {
            phase_idx,
            executed_in_phase,
        } = self.state
        else {
            return;
        };

        let executed = executed_in_phase + 1;
        let duration = self.profile.phases[phase_idx].duration;
        self.state = if executed < duration {
            ThreadState::Running {
                phase_idx,
                executed_in_phase: executed,
            }
        } else if phase_idx + 1 < self.profile.phases.len() {
            ThreadState::Running {
                phase_idx: phase_idx + 1,
                executed_in_phase: 0,
            }
        } else {
            ThreadState::Finished
        };
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SegmentState {
    Executing,
    WaitingIo,
    Blocked,
}

impl SegmentState {
    pub fn makes_progress(self) -> bool {
        !matches!(self, SegmentState::Blocked)
    }
}

impl fmt::Display for SegmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentState::Executing => write!(f, "EXECUTING"),
            SegmentState::WaitingIo => write!(f, "WAITING_IO"),
            SegmentState::Blocked => write!(f, "BLOCKED"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct TimelineSegment {
    pub state: SegmentState,
    pub start: u64,
    pub duration: u64,
}

impl TimelineSegment {
    pub fn end(&self) -> u64 {
        self.start + self.duration
    }
}

/// Run-length encoded per-thread state history.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    segments: Vec<TimelineSegment>,
    total: u64,
}

impl Timeline {
    pub fn record(&mut self, state: SegmentState, tick: u64) {
        self.total += 1;
        if let Some(last) = self.segments.last_mut() {
            if last.state == state && last.end() == tick {
                last.duration += 1;
                return;
            }
        }
        self.segments.push(TimelineSegment {
            state,
            start: tick,
            duration: 1,
        });
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn into_segments(self) -> Vec<TimelineSegment> {
        self.segments
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ThreadTimeline {
    pub thread_id: usize,
    pub profile: String,
    pub segments: Vec<TimelineSegment>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ThreadMetrics {
    pub thread_id: usize,
    pub profile: String,
    pub blocked: u64,
    pub executing: u64,
    pub io: u64,
    pub active: u64,
    pub total: u64,
    pub finish_tick: u64,
    pub longest_wait: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AggregateMetrics {
    pub total_blocked: u64,
    pub total_active: u64,
    pub total_time: u64,
    pub percent_blocked: f64,
    pub lock_handoffs: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub threads: Vec<ThreadMetrics>,
    pub aggregate: AggregateMetrics,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RunMetadata {
    pub threads: usize,
    pub elapsed_ticks: u64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SimulationResult {
    pub metadata: RunMetadata,
    pub timelines: Vec<ThreadTimeline>,
    pub metrics: Metrics,
    pub lock_events: Vec<LockEvent>,
}
