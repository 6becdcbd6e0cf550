use std::fmt::Write;

use crate::state::{SegmentState, SimulationResult, ThreadTimeline};

pub trait Formatter {
    fn write(&self, result: &SimulationResult) -> String;
}

pub struct HumanFormatter;

pub struct SummaryFormatter;

pub struct JsonFormatter;

pub struct TimelineFormatter {
    pub width: usize,
}

impl Formatter for HumanFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        let mut out = String::new();
        write_metadata(&mut out, result);
        let _ = writeln!(out, "Timelines:");
        for timeline in &result.timelines {
            let _ = writeln!(out, "{}:", thread_label(timeline));
            for segment in &timeline.segments {
                let _ = writeln!(
                    out,
                    "  {}..{} {} ({})",
                    segment.start,
                    segment.end(),
                    segment.state,
                    segment.duration
                );
            }
        }
        let _ = writeln!(out, "Lock events:");
        for event in &result.lock_events {
            let _ = writeln!(out, "  {}", event);
        }
        write_summary(&mut out, result);
        out
    }
}

impl Formatter for SummaryFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        let mut out = String::new();
        write_metadata(&mut out, result);
        write_summary(&mut out, result);
        out
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        match serde_json::to_string_pretty(result) {
            Ok(json) => format!("{}\n", json),
            Err(err) => format!("{{\"error\":\"{}\"}}\n", err),
        }
    }
}

impl Formatter for TimelineFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        let mut out = String::new();
        let label_width = result
            .timelines
            .iter()
            .map(|timeline| thread_label(timeline).len())
            .max()
            .unwrap_or(0);
        // Shared scale so bars of different threads are comparable.
        let longest = result
            .metrics
            .threads
            .iter()
            .map(|thread| thread.total)
            .max()
            .unwrap_or(0);

        for (timeline, metrics) in result.timelines.iter().zip(&result.metrics.threads) {
            let _ = writeln!(
                out,
                "{:<label_width$} |{}| {}",
                thread_label(timeline),
                render_bar(timeline, longest, self.width),
                metrics.total,
                label_width = label_width
            );
        }
        let _ = writeln!(
            out,
            "Legend: {} executing, {} io wait, {} blocked on lock",
            legend_symbol(SegmentState::Executing),
            legend_symbol(SegmentState::WaitingIo),
            legend_symbol(SegmentState::Blocked)
        );
        let _ = writeln!(
            out,
            "Blocked: {}%",
            result.metrics.aggregate.percent_blocked
        );
        out
    }
}

pub fn legend_symbol(state: SegmentState) -> char {
    match state {
        SegmentState::Executing => '#',
        SegmentState::WaitingIo => '.',
        SegmentState::Blocked => 'x',
    }
}

/// Maps segment boundaries onto `width` columns scaled by `longest` ticks.
pub fn render_bar(timeline: &ThreadTimeline, longest: u64, width: usize) -> String {
    let mut bar = String::with_capacity(width);
    if longest == 0 {
        return bar;
    }
    let column = |tick: u64| -> usize {
        ((tick as f64 / longest as f64) * width as f64).round() as usize
    };
    for segment in &timeline.segments {
        let cols = column(segment.end()) - column(segment.start);
        let symbol = legend_symbol(segment.state);
        bar.extend(std::iter::repeat(symbol).take(cols));
    }
    bar
}

fn thread_label(timeline: &ThreadTimeline) -> String {
    format!("Thread {} ({})", timeline.thread_id, timeline.profile)
}

fn write_metadata(out: &mut String, result: &SimulationResult) {
    let _ = writeln!(out, "Metadata:");
    let _ = writeln!(out, "threads: {}", result.metadata.threads);
    let _ = writeln!(out, "elapsed_ticks: {}", result.metadata.elapsed_ticks);
}

fn write_summary(out: &mut String, result: &SimulationResult) {
    let _ = writeln!(out, "Summary:");
    for thread in &result.metrics.threads {
        let _ = writeln!(
            out,
            "Thread {} ({}): total {} (executing {}, io {}, blocked {})",
            thread.thread_id,
            thread.profile,
            thread.total,
            thread.executing,
            thread.io,
            thread.blocked
        );
    }
    let aggregate = &result.metrics.aggregate;
    let _ = writeln!(
        out,
        "Total: active {}, blocked {}, time {}",
        aggregate.total_active, aggregate.total_blocked, aggregate.total_time
    );
    let _ = writeln!(out, "Blocked: {}%", aggregate.percent_blocked);
    let _ = writeln!(out, "Lock handoffs: {}", aggregate.lock_handoffs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::simulate;

    #[test]
    fn summary_lists_threads_in_input_order() {
        let result = simulate(&["heavy-io", "low-io"]).expect("simulation should succeed");
        let output = SummaryFormatter.write(&result);
        let heavy = output.find("Thread 0 (heavy-io)").unwrap();
        let low = output.find("Thread 1 (low-io)").unwrap();
        assert!(heavy < low);
    }

    #[test]
    fn longest_thread_fills_the_bar() {
        let result = simulate(&["low-io", "heavy-io"]).expect("simulation should succeed");
        let longest = result.metrics.threads[1].total;
        let low_bar = render_bar(&result.timelines[0], longest, 58);
        let heavy_bar = render_bar(&result.timelines[1], longest, 58);

        assert_eq!(heavy_bar.chars().count(), 58);
        assert_eq!(low_bar.chars().count(), 12);
        assert!(heavy_bar.starts_with("xx#"));
        assert!(heavy_bar.ends_with("#####"));
    }

    #[test]
    fn empty_result_renders_legend_only() {
        let keys: [&str; 0] = [];
        let result = simulate(&keys).expect("simulation should succeed");
        let output = TimelineFormatter { width: 40 }.write(&result);
        assert_eq!(
            output,
            "Legend: # executing, . io wait, x blocked on lock\nBlocked: 0%\n"
        );
    }

    #[test]
    fn json_contains_segment_states() {
        let result = simulate(&["low-io"]).expect("simulation should succeed");
        let output = JsonFormatter.write(&result);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["metadata"]["elapsed_ticks"], 120);
        assert_eq!(value["timelines"][0]["segments"][1]["state"], "WAITING_IO");
        assert_eq!(value["metrics"]["aggregate"]["percent_blocked"], 0.0);
    }
}
