use std::collections::VecDeque;

use crate::sim::process::Telemetry;

/// Rolling buffer between the tick loop and whatever consumes the rows.
///
/// The simulation core never stores telemetry; a display or exporter owns
/// one of these, pushes every row, and drains on its own cadence. Capacity
/// bounds memory on long sessions: once full, the oldest rows fall off.
#[derive(Debug, Clone)]
pub struct TelemetryLog {
    rows: VecDeque<Telemetry>,
    capacity: usize,
}

impl TelemetryLog {
    /// Default capacity: 30 s of rows at the 50 Hz tick rate.
    pub const DEFAULT_CAPACITY: usize = 1500;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "telemetry log capacity must be positive");
        Self { rows: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append a row, evicting the oldest one if the log is full.
    pub fn push(&mut self, row: Telemetry) {
        if self.rows.len() == self.capacity {
            self.rows.pop_front();
        }
        self.rows.push_back(row);
    }

    /// Take every buffered row, oldest first, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Telemetry> {
        self.rows.drain(..).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Telemetry> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TelemetryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::process::Process;

    fn sample_rows(n: usize) -> Vec<Telemetry> {
        let mut process = Process::new();
        process.set_p(1.0);
        (0..n).map(|_| process.update(0.02)).collect()
    }

    #[test]
    fn log_evicts_oldest_rows_at_capacity() {
        let mut log = TelemetryLog::with_capacity(3);
        let rows = sample_rows(5);
        for row in &rows {
            log.push(*row);
        }

        assert_eq!(log.len(), 3);
        let kept = log.drain();
        assert_eq!(kept.len(), 3);
        // Timestamps 0.06, 0.08, 0.10 survive; the first two ticks are gone.
        assert_eq!(kept[0].ts, rows[2].ts);
        assert_eq!(kept[2].ts, rows[4].ts);
    }

    #[test]
    fn drain_leaves_the_log_empty() {
        let mut log = TelemetryLog::new();
        for row in sample_rows(10) {
            log.push(row);
        }
        assert_eq!(log.len(), 10);

        let rows = log.drain();
        assert_eq!(rows.len(), 10);
        assert!(log.is_empty());
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn zero_capacity_is_rejected() {
        TelemetryLog::with_capacity(0);
    }
}
