use crate::catalog::Catalog;
use crate::error::Result;
use crate::events::LockEvent;
use crate::lock::GlobalLock;
use crate::models::{RequestProfile, SimConfig};
use crate::state::{
    AggregateMetrics, Metrics, RunMetadata, SegmentState, SimThread, SimulationResult,
    ThreadMetrics, ThreadTimeline,
};

pub struct SimulationEngine<'a> {
    pub catalog: &'a Catalog,
}

impl<'a> SimulationEngine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn run<S: AsRef<str>>(&self, profile_keys: &[S]) -> Result<SimulationResult> {
        let profiles = self.catalog.resolve(profile_keys)?;
        Ok(simulate_profiles(&profiles))
    }
}

/// Runs the given profile keys against the built-in catalog.
pub fn simulate<S: AsRef<str>>(profile_keys: &[S]) -> Result<SimulationResult> {
    SimulationEngine::new(Catalog::builtin()).run(profile_keys)
}

pub fn run_simulation(config: &SimConfig) -> Result<SimulationResult> {
    simulate(&config.threads)
}

fn simulate_profiles(profiles: &[&RequestProfile]) -> SimulationResult {
    let mut threads: Vec<SimThread> = profiles
        .iter()
        .enumerate()
        .map(|(id, profile)| SimThread::new(id, profile))
        .collect();
    let mut lock = GlobalLock::default();
    let mut lock_events = Vec::new();
    let mut tick = 0u64;

    tracing::debug!(threads = threads.len(), "simulation started");

    while threads.iter().any(|thread| !thread.is_finished()) {
        if let Some(event) = lock.release_if_idle(&threads, tick) {
            lock_events.push(event);
        }
        if let Some(event) = lock.acquire(&mut threads, tick) {
            lock_events.push(event);
        }

        for thread in threads.iter_mut() {
            let Some(phase) = thread.current_phase() else {
                continue;
            };
            let state = if !phase.needs_lock() {
                SegmentState::WaitingIo
            } else if lock.is_held_by(thread.id) {
                SegmentState::Executing
            } else {
                SegmentState::Blocked
            };

            thread.timeline.record(state, tick);
            if state.makes_progress() {
                thread.advance();
                if thread.is_finished() {
                    tracing::debug!(
                        thread = thread.id,
                        profile = %thread.profile.key,
                        finish_tick = tick + 1,
                        "thread finished"
                    );
                }
            }
        }

        tick += 1;
    }

    // A holder that finished on the last tick still owns the lock here.
    if let Some(holder) = lock.holder() {
        lock_events.push(LockEvent::Released {
            tick,
            thread_id: holder,
        });
    }

    let timelines: Vec<ThreadTimeline> = threads
        .into_iter()
        .map(|thread| ThreadTimeline {
            thread_id: thread.id,
            profile: thread.profile.key.clone(),
            segments: thread.timeline.into_segments(),
        })
        .collect();
    let lock_handoffs = lock_events.iter().filter(|event| event.is_acquire()).count() as u64;
    let metrics = compute_metrics(&timelines, lock_handoffs);

    tracing::debug!(
        elapsed_ticks = tick,
        percent_blocked = metrics.aggregate.percent_blocked,
        "simulation finished"
    );

    SimulationResult {
        metadata: RunMetadata {
            threads: timelines.len(),
            elapsed_ticks: tick,
        },
        timelines,
        metrics,
        lock_events,
    }
}

/// Derives per-thread and aggregate metrics from completed timelines.
pub fn compute_metrics(timelines: &[ThreadTimeline], lock_handoffs: u64) -> Metrics {
    let threads: Vec<ThreadMetrics> = timelines
        .iter()
        .map(|timeline| {
            let mut metrics = ThreadMetrics {
                thread_id: timeline.thread_id,
                profile: timeline.profile.clone(),
                ..ThreadMetrics::default()
            };
            for segment in &timeline.segments {
                match segment.state {
                    SegmentState::Executing => metrics.executing += segment.duration,
                    SegmentState::WaitingIo => metrics.io += segment.duration,
                    SegmentState::Blocked => {
                        metrics.blocked += segment.duration;
                        metrics.longest_wait = metrics.longest_wait.max(segment.duration);
                    }
                }
                metrics.finish_tick = metrics.finish_tick.max(segment.end());
            }
            metrics.active = metrics.executing + metrics.io;
            metrics.total = metrics.blocked + metrics.active;
            metrics
        })
        .collect();

    let total_blocked = threads.iter().map(|thread| thread.blocked).sum::<u64>();
    let total_active = threads.iter().map(|thread| thread.active).sum::<u64>();
    let total_time = total_blocked + total_active;
    let percent_blocked = if total_time == 0 {
        0.0
    } else {
        (total_blocked as f64 / total_time as f64) * 100.0
    };

    Metrics {
        threads,
        aggregate: AggregateMetrics {
            total_blocked,
            total_active,
            total_time,
            percent_blocked: round_to(percent_blocked, 2),
            lock_handoffs,
        },
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    if decimals == 0 {
        return value.round();
    }
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}
