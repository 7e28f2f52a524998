use std::collections::HashMap;
use std::time::Instant;

use super::detection_loop::CycleOutcome;

/// Observer for detection loop events.
///
/// Keeps the loop free of any particular output mechanism; the CLI prints
/// a summary, tests stay silent.
pub trait LoopLogger: Send {
    /// How long a named stage (`detect`, `render`) took in one cycle.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Result of one completed cycle.
    fn outcome(&mut self, outcome: CycleOutcome);

    fn info(&mut self, message: &str);

    /// End-of-run report. Default: no-op.
    fn summary(&self) {}
}

pub struct NullLoopLogger;

impl LoopLogger for NullLoopLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn outcome(&mut self, _outcome: CycleOutcome) {}
    fn info(&mut self, _message: &str) {}
}

/// Collects stage timings and outcome counts and reports them through
/// `log` when the run ends.
pub struct StdoutLoopLogger {
    timings: HashMap<String, Vec<f64>>,
    outcomes: HashMap<CycleOutcome, usize>,
    start_time: Instant,
    messages: Vec<String>,
}

impl StdoutLoopLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            outcomes: HashMap::new(),
            start_time: Instant::now(),
            messages: Vec::new(),
        }
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn count(&self, outcome: CycleOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Formatted report, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.outcomes.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let cycles: usize = self.outcomes.values().sum();
        let mut lines = vec![format!(
            "Loop summary ({cycles} cycles, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            let max_ms = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.1}ms  max {max_ms:6.1}ms  ({} samples)",
                durations.len()
            ));
        }

        let mut outcomes: Vec<_> = self.outcomes.iter().collect();
        outcomes.sort_by_key(|(outcome, _)| outcome.name());
        for (outcome, count) in outcomes {
            lines.push(format!("  {:12}: {count}", outcome.name()));
        }

        let detections = self.timings.get("detect").map_or(0, Vec::len);
        if detections > 0 && elapsed_ms > 0.0 {
            let rate = detections as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Detection rate: {rate:.1}/s"));
        }

        Some(lines.join("\n"))
    }
}

impl Default for StdoutLoopLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopLogger for StdoutLoopLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn outcome(&mut self, outcome: CycleOutcome) {
        *self.outcomes.entry(outcome).or_default() += 1;
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
